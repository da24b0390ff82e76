//! Free-text normalization: team names and fixture dates.

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// NFC-normalize and trim a scraped text fragment.
pub fn clean_text(raw: &str) -> String {
    raw.nfc().collect::<String>().trim().to_string()
}

/// Split a match description into (home, away).
///
/// A live page embeds the running score between the names ("Arsenal 2 - 1
/// Chelsea"); the score is replaced with the neutral separator before
/// splitting. Anything that doesn't come out as exactly two non-empty names
/// is rejected.
pub fn split_teams(text: &str) -> Option<(String, String)> {
    let score = Regex::new(r"\s+\d+\s*-\s*\d+\s+").unwrap();
    let cleaned = score.replace_all(text, " vs ");

    let parts: Vec<&str> = cleaned.split(" vs ").collect();
    if parts.len() != 2 {
        return None;
    }

    let home = clean_text(parts[0]);
    let away = clean_text(parts[1]);
    if home.is_empty() || away.is_empty() {
        return None;
    }

    Some((home, away))
}

/// Resolve free-form date text against a reference date, first match wins:
///
/// 1. "today" / "tomorrow" keywords
/// 2. "13 Jan" — day + month abbreviation, year taken from the reference
/// 3. "Mon 13 Jan" — same, weekday token ignored
/// 4. "13/01/2026" — D/M/Y literal
/// 5. "2026-01-13" — Y-M-D literal
///
/// Returns None when nothing matches or the values don't form a valid
/// calendar date. Callers must reject such candidates rather than guess.
pub fn resolve_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    let lower = text.to_lowercase();

    if lower.contains("today") {
        return Some(reference);
    }
    if lower.contains("tomorrow") {
        return reference.checked_add_days(Days::new(1));
    }

    // Day + month abbreviation also covers the "Mon 13 Jan" form since the
    // weekday prefix is simply not part of the match.
    let day_month = Regex::new(r"(\d{1,2})\s+([A-Za-z]{3})").unwrap();
    if let Some(cap) = day_month.captures(text) {
        let day: u32 = cap[1].parse().ok()?;
        let month = month_from_abbr(&cap[2])?;
        return NaiveDate::from_ymd_opt(reference.year(), month, day);
    }

    let slash = Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap();
    if let Some(cap) = slash.captures(text) {
        let day: u32 = cap[1].parse().ok()?;
        let month: u32 = cap[2].parse().ok()?;
        let year: i32 = cap[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let hyphen = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
    if let Some(cap) = hyphen.captures(text) {
        let year: i32 = cap[1].parse().ok()?;
        let month: u32 = cap[2].parse().ok()?;
        let day: u32 = cap[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn month_from_abbr(abbr: &str) -> Option<u32> {
    let month = match abbr.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
