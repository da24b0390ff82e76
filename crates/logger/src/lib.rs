/// fixtures-live — Logger
/// JSONL ingest audit stream, one file per day

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ───────────────────────────────────────────────────────────────

/// Outcome of fetching + extracting one competition page.
#[derive(Serialize, Debug)]
pub struct SourceStatusEvent {
    pub ts:          String,
    pub event:       &'static str,   // "SOURCE_STATUS"
    pub source:      String,         // "livesoccertv"
    pub competition: String,
    pub ok:          bool,
    pub fixtures:    usize,
    pub note:        String,         // "" | "challenge_page" | error text
}

/// One full ingestion run, written after the bulk upsert.
#[derive(Serialize, Debug)]
pub struct IngestSummaryEvent {
    pub ts:           String,
    pub event:        &'static str,  // "INGEST_SUMMARY"
    pub source:       String,
    pub competitions: usize,
    pub found:        usize,
    pub inserted:     usize,
    pub updated:      usize,
    pub errors:       usize,
    pub status:       String,        // mirrors the scraping_history status
}
