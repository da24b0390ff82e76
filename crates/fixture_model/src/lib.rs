//! Shared value types for the fixtures pipeline.
//!
//! The extractor produces `Fixture` values, the store persists them and the
//! CLI serializes them back out. Records are fixed-shape: `time` is always
//! present (defaulting to "unknown"), `venue` is optional.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder kick-off time when the markup carries none.
pub const TIME_UNKNOWN: &str = "unknown";

/// Country marker for broadcasters whose channel the classifier can't place.
pub const COUNTRY_UNRESOLVED: &str = "Various";

/// One broadcaster carrying a fixture: (country, channel).
/// `country` may still be the unresolved marker at this point; canonical
/// country resolution happens at report time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcaster {
    pub country: String,
    pub channel: String,
}

impl Broadcaster {
    pub fn new(country: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            channel: channel.into(),
        }
    }
}

/// A scheduled match, keyed by (home_team, away_team, competition, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub home_team:    String,
    pub away_team:    String,
    pub competition:  String,
    pub date:         NaiveDate,
    pub time:         String,
    pub venue:        Option<String>,
    pub broadcasters: Vec<Broadcaster>,
    pub scraped_at:   DateTime<Utc>,
}

impl Fixture {
    /// The natural-key tuple. Two fixtures with equal keys are the same
    /// real-world match and must collapse to one stored row.
    pub fn natural_key(&self) -> (&str, &str, &str, NaiveDate) {
        (
            &self.home_team,
            &self.away_team,
            &self.competition,
            self.date,
        )
    }
}

/// Outcome of one ingestion attempt, recorded append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    NoData,
    Interrupted,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::NoData => "no_data",
            RunStatus::Interrupted => "interrupted",
            RunStatus::Error => "error",
        }
    }
}

/// Audit record for one scrape run. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRun {
    pub date:           NaiveDate,
    pub fixtures_count: i64,
    pub source:         String,
    pub status:         RunStatus,
}

impl ScrapeRun {
    pub fn new(date: NaiveDate, fixtures_count: i64, source: impl Into<String>, status: RunStatus) -> Self {
        Self {
            date,
            fixtures_count,
            source: source.into(),
            status,
        }
    }
}
