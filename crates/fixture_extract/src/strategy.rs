//! Ordered markup-parsing strategies.
//!
//! Each strategy targets one structural shape seen on competition pages:
//! tagged match rows, generic schedule tables, generic match containers.
//! They only lift raw candidates out of the DOM; validation and window
//! filtering happen in the record builder.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use fixture_model::{Broadcaster, Fixture, COUNTRY_UNRESOLVED};

use crate::builder::{build_all, IngestConfig};
use crate::normalize::{clean_text, split_teams};

/// What a strategy knows about a candidate's date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateHint {
    /// Already an absolute calendar date (e.g. lifted from a schedules URL).
    Resolved(NaiveDate),
    /// Free text still to be run through the date normalizer.
    Text(String),
    /// The markup carried no date at all.
    Missing,
}

/// Unvalidated fixture block lifted out of the markup.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub home:         String,
    pub away:         String,
    pub date:         DateHint,
    pub time:         Option<String>,
    pub venue:        Option<String>,
    pub broadcasters: Vec<Broadcaster>,
}

/// One self-contained markup-parsing algorithm.
pub trait ExtractStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, doc: &Html) -> Vec<Candidate>;
}

/// Result of running the strategy chain over one document.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub fixtures: Vec<Fixture>,
    /// Name of the strategy that produced the records, if any did.
    pub strategy: Option<&'static str>,
    /// Candidates the winning strategy found that the builder dropped.
    pub skipped:  usize,
}

impl ExtractOutcome {
    fn empty() -> Self {
        Self {
            fixtures: Vec::new(),
            strategy: None,
            skipped: 0,
        }
    }
}

/// Tries strategies in fixed priority order; the first one whose candidates
/// survive the record builder wins and later strategies are never run.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(MatchRows),
                Box::new(ScheduleTables),
                Box::new(MatchDivs),
            ],
        }
    }

    pub fn extract(&self, html: &str, competition: &str, cfg: &IngestConfig) -> ExtractOutcome {
        let doc = Html::parse_document(html);

        for strategy in &self.strategies {
            let candidates = strategy.extract(&doc);
            if candidates.is_empty() {
                debug!(strategy = strategy.name(), competition, "no candidate blocks");
                continue;
            }

            let found = candidates.len();
            let (fixtures, skips) = build_all(candidates, competition, cfg);
            if fixtures.is_empty() {
                debug!(
                    strategy = strategy.name(),
                    competition, found, "all candidates rejected, falling through"
                );
                continue;
            }

            return ExtractOutcome {
                fixtures,
                strategy: Some(strategy.name()),
                skipped: skips.len(),
            };
        }

        ExtractOutcome::empty()
    }
}

fn element_text(el: ElementRef) -> String {
    clean_text(&el.text().collect::<String>())
}

fn has_class(el: ElementRef, class: &str) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|attr| attr.split_whitespace().any(|c| c == class))
}

/// Strategy 1: `<tr class="matchrow">` rows with `/match/` links, the date
/// hanging off the nearest preceding `<tr class="drow">` schedules link.
struct MatchRows;

impl ExtractStrategy for MatchRows {
    fn name(&self) -> &'static str {
        "match_rows"
    }

    fn extract(&self, doc: &Html) -> Vec<Candidate> {
        let row_sel = Selector::parse("tr.matchrow").unwrap();
        let match_link_sel = Selector::parse(r#"a[href*="/match/"]"#).unwrap();
        let sched_link_sel = Selector::parse(r#"a[href*="/schedules/"]"#).unwrap();
        let time_sel = Selector::parse("span.ts").unwrap();
        let channels_sel = Selector::parse("td#channels").unwrap();
        let channel_link_sel = Selector::parse(r#"a[href*="/channels/"]"#).unwrap();
        let sched_date = Regex::new(r"/schedules/(\d{4}-\d{2}-\d{2})/").unwrap();

        let mut out = Vec::new();

        for row in doc.select(&row_sel) {
            let Some(link) = row.select(&match_link_sel).next() else {
                continue;
            };
            let Some((home, away)) = split_teams(&element_text(link)) else {
                continue;
            };

            // Date row is a sibling above the match row, nearest one wins.
            let mut date = DateHint::Missing;
            for sib in row.prev_siblings() {
                let Some(el) = ElementRef::wrap(sib) else {
                    continue;
                };
                if el.value().name() != "tr" || !has_class(el, "drow") {
                    continue;
                }
                date = el
                    .select(&sched_link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| sched_date.captures(href))
                    .and_then(|cap| NaiveDate::parse_from_str(&cap[1], "%Y-%m-%d").ok())
                    .map_or(DateHint::Missing, DateHint::Resolved);
                break;
            }

            let time = row
                .select(&time_sel)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty());

            let mut broadcasters = Vec::new();
            if let Some(cell) = row.select(&channels_sel).next() {
                for ch in cell.select(&channel_link_sel) {
                    let channel = element_text(ch);
                    // Listing pages don't attach a country to the channel
                    // link; classification happens at report time.
                    if channel.len() > 1 {
                        broadcasters.push(Broadcaster::new(COUNTRY_UNRESOLVED, channel));
                    }
                }
            }

            out.push(Candidate {
                home,
                away,
                date,
                time,
                venue: None,
                broadcasters,
            });
        }

        out
    }
}

/// Strategy 2: `<table class="schedules">` rows with `/teams/` links and
/// per-cell broadcaster markup (country comes from the flag image alt).
struct ScheduleTables;

impl ExtractStrategy for ScheduleTables {
    fn name(&self) -> &'static str {
        "schedule_tables"
    }

    fn extract(&self, doc: &Html) -> Vec<Candidate> {
        let table_sel = Selector::parse("table.schedules").unwrap();
        let row_sel = Selector::parse("tr").unwrap();
        let team_link_sel = Selector::parse(r#"a[href*="/teams/"]"#).unwrap();
        let date_sel = Selector::parse("td.date, span.date").unwrap();
        let time_sel = Selector::parse("span.time, td.time").unwrap();
        let venue_sel = Selector::parse("span.venue, td.venue").unwrap();
        let bc_cell_sel = Selector::parse("td.broadcaster").unwrap();
        let flag_sel = Selector::parse("img[alt]").unwrap();
        let link_sel = Selector::parse("a").unwrap();

        let mut out = Vec::new();

        for table in doc.select(&table_sel) {
            for row in table.select(&row_sel) {
                let teams: Vec<String> =
                    row.select(&team_link_sel).map(element_text).collect();
                if teams.len() < 2 {
                    continue;
                }

                let date = row
                    .select(&date_sel)
                    .next()
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .map_or(DateHint::Missing, DateHint::Text);

                let time = row
                    .select(&time_sel)
                    .next()
                    .map(element_text)
                    .filter(|t| !t.is_empty());
                let venue = row
                    .select(&venue_sel)
                    .next()
                    .map(element_text)
                    .filter(|v| !v.is_empty());

                let mut broadcasters = Vec::new();
                for cell in row.select(&bc_cell_sel) {
                    let country = cell
                        .select(&flag_sel)
                        .next()
                        .and_then(|img| img.value().attr("alt"))
                        .map(str::trim)
                        .filter(|alt| !alt.is_empty())
                        .unwrap_or(COUNTRY_UNRESOLVED)
                        .to_string();

                    for ch in cell.select(&link_sel) {
                        let channel = element_text(ch);
                        if channel.len() > 1 {
                            broadcasters.push(Broadcaster::new(country.clone(), channel));
                        }
                    }
                }

                out.push(Candidate {
                    home: teams[0].clone(),
                    away: teams[1].clone(),
                    date,
                    time,
                    venue,
                    broadcasters,
                });
            }
        }

        out
    }
}

/// Strategy 3: generic `<div class="match|fixture|game">` containers with
/// team-name spans. Weakest signal, so it runs last.
struct MatchDivs;

impl ExtractStrategy for MatchDivs {
    fn name(&self) -> &'static str {
        "match_divs"
    }

    fn extract(&self, doc: &Html) -> Vec<Candidate> {
        let div_sel = Selector::parse("div.match, div.fixture, div.game").unwrap();
        let team_sel =
            Selector::parse("span.team, div.team, span.team-name, div.team-name").unwrap();
        let date_sel =
            Selector::parse("span.date, div.date, span.match-date, div.match-date").unwrap();

        let mut out = Vec::new();

        for div in doc.select(&div_sel) {
            let teams: Vec<String> = div.select(&team_sel).map(element_text).collect();
            if teams.len() < 2 {
                continue;
            }

            let date = div
                .select(&date_sel)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
                .map_or(DateHint::Missing, DateHint::Text);

            out.push(Candidate {
                home: teams[0].clone(),
                away: teams[1].clone(),
                date,
                time: None,
                venue: None,
                broadcasters: Vec::new(),
            });
        }

        out
    }
}
