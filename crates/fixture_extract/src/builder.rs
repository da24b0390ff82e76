//! Record builder: candidate blocks → validated `Fixture` values.

use std::fmt;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::debug;

use fixture_model::{Fixture, TIME_UNKNOWN};

use crate::normalize::resolve_date;
use crate::strategy::{Candidate, DateHint};

/// Per-ingestion configuration, passed in explicitly — no global state.
#[derive(Debug, Clone, Copy)]
pub struct IngestConfig {
    /// The run's "today", used to resolve relative and partial dates.
    pub reference_date: NaiveDate,
    pub window_start:   NaiveDate,
    pub window_end:     NaiveDate,
}

impl IngestConfig {
    /// The typical window: the reference date's whole calendar month.
    pub fn month_of(reference: NaiveDate) -> Self {
        let start = reference.with_day(1).expect("day 1 always exists");
        let (next_y, next_m) = if reference.month() == 12 {
            (reference.year() + 1, 1)
        } else {
            (reference.year(), reference.month() + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_y, next_m, 1)
            .expect("month start always exists")
            .pred_opt()
            .expect("not representable only at MIN date");

        Self {
            reference_date: reference,
            window_start: start,
            window_end: end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window_start <= date && date <= self.window_end
    }
}

/// Why a candidate was dropped. Skips are expected and non-fatal; they are
/// logged at debug level and never abort the rest of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    BadTeams,
    NoDate,
    BadDate(String),
    OutOfWindow(NaiveDate),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::BadTeams => write!(f, "missing or unsplittable team names"),
            Skip::NoDate => write!(f, "no date in markup"),
            Skip::BadDate(text) => write!(f, "unresolvable date text {text:?}"),
            Skip::OutOfWindow(date) => write!(f, "date {date} outside ingest window"),
        }
    }
}

/// Validate one candidate into a fixture.
pub fn build_fixture(
    candidate: Candidate,
    competition: &str,
    cfg: &IngestConfig,
) -> Result<Fixture, Skip> {
    if candidate.home.is_empty() || candidate.away.is_empty() {
        return Err(Skip::BadTeams);
    }

    let date = match candidate.date {
        DateHint::Resolved(d) => d,
        DateHint::Text(text) => {
            resolve_date(&text, cfg.reference_date).ok_or(Skip::BadDate(text))?
        }
        DateHint::Missing => return Err(Skip::NoDate),
    };

    if !cfg.contains(date) {
        return Err(Skip::OutOfWindow(date));
    }

    Ok(Fixture {
        home_team: candidate.home,
        away_team: candidate.away,
        competition: competition.to_string(),
        date,
        time: candidate.time.unwrap_or_else(|| TIME_UNKNOWN.to_string()),
        venue: candidate.venue,
        broadcasters: candidate.broadcasters,
        scraped_at: Utc::now(),
    })
}

/// Validate a whole batch, aggregating skips instead of aborting.
pub fn build_all(
    candidates: Vec<Candidate>,
    competition: &str,
    cfg: &IngestConfig,
) -> (Vec<Fixture>, Vec<Skip>) {
    let mut fixtures = Vec::new();
    let mut skips = Vec::new();

    for candidate in candidates {
        match build_fixture(candidate, competition, cfg) {
            Ok(fixture) => fixtures.push(fixture),
            Err(skip) => {
                debug!(competition, %skip, "candidate dropped");
                skips.push(skip);
            }
        }
    }

    (fixtures, skips)
}
