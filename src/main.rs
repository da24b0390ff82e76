/// fixtures-live — Football Fixtures CLI
///
/// What it does:
///   1. `scrape` pulls the configured league pages, extracts fixture blocks
///      with the strategy chain and upserts them idempotently into SQLite
///   2. query commands (`today`, `tomorrow`, `country`, `competition`) read
///      back fixtures with broadcasters grouped per canonical country
///   3. maintenance commands (`stats`, `check`, `clean`, `prune`, `export`)
///      wrap the store's dedup/retention/export operations
///
/// Run:
///   cargo run --bin fixtures -- scrape

use std::env;
use std::fs::File;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use fixture_extract::{Extractor, IngestConfig};
use fixture_model::{Fixture, RunStatus, ScrapeRun};
use fixture_store::{FixtureStore, QueryFilter};
use logger::{now_iso, EventLogger, IngestSummaryEvent, SourceStatusEvent};
use lstv_scraper::{looks_like_challenge_page, LstvClient, LEAGUES, SOURCE_NAME};

mod report;

fn usage() {
    println!(
        r#"Football Fixtures Scraper

Usage:
    fixtures scrape                    - Scrape fixtures from LiveSoccerTV
    fixtures today                     - Show today's fixtures
    fixtures tomorrow                  - Show tomorrow's fixtures
    fixtures country <NAME>            - Show fixtures broadcast in a country
    fixtures competition <NAME>        - Show fixtures for a competition
    fixtures stats                     - Show database statistics
    fixtures check                     - Check for duplicate entries
    fixtures clean                     - Remove duplicate entries
    fixtures prune [DAYS]              - Delete fixtures older than DAYS (default 30)
    fixtures export <FILE> [--country C] [--date YYYY-MM-DD]
                                       - Export fixtures to JSON

Examples:
    fixtures country USA
    fixtures competition "Premier League"
    fixtures export output/fixtures.json --country UK"#
    );
}

fn db_path() -> String {
    env::var("FIXTURES_DB_PATH").unwrap_or_else(|_| "output/fixtures.db".to_string())
}

fn open_store() -> Result<FixtureStore> {
    FixtureStore::open(db_path())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1) else {
        usage();
        return Ok(());
    };

    match command.to_lowercase().as_str() {
        "scrape" => scrape().await?,
        "today" => {
            let store = open_store()?;
            let fixtures = store.query(&QueryFilter::by_date(today()))?;
            report::print_fixtures(&fixtures, &format!("TODAY'S FIXTURES - {}", today()));
        }
        "tomorrow" => {
            let date = today()
                .checked_add_days(Days::new(1))
                .context("tomorrow out of range")?;
            let store = open_store()?;
            let fixtures = store.query(&QueryFilter::by_date(date))?;
            report::print_fixtures(&fixtures, &format!("TOMORROW'S FIXTURES - {date}"));
        }
        "country" => {
            let Some(country) = args.get(2) else {
                println!("Error: please specify a country name");
                return Ok(());
            };
            let store = open_store()?;
            let fixtures = store.query(&QueryFilter::by_country(country.clone()))?;
            report::print_fixtures(
                &fixtures,
                &format!("FIXTURES BROADCASTING IN {}", country.to_uppercase()),
            );
        }
        "competition" => {
            if args.len() < 3 {
                println!("Error: please specify a competition name");
                return Ok(());
            }
            let competition = args[2..].join(" ");
            let store = open_store()?;
            let fixtures = store.query(&QueryFilter::by_competition(competition.clone()))?;
            report::print_fixtures(&fixtures, &format!("{} FIXTURES", competition.to_uppercase()));
        }
        "stats" => {
            let store = open_store()?;
            report::print_stats(&store.stats()?, &store.detect_duplicates()?);
        }
        "check" => {
            let store = open_store()?;
            report::print_duplicate_check(&store.detect_duplicates()?);
        }
        "clean" => {
            let mut store = open_store()?;
            let before = store.detect_duplicates()?;
            if !before.has_duplicates() {
                println!("Database is already clean - no duplicates found");
                return Ok(());
            }
            let removed = store.remove_duplicates()?;
            println!(
                "Removed {} duplicate fixtures and {} duplicate broadcasters",
                removed.fixtures, removed.broadcasters
            );
        }
        "prune" => {
            let days: u64 = args
                .get(2)
                .and_then(|v| v.parse().ok())
                .unwrap_or(30);
            let mut store = open_store()?;
            let deleted = store.prune_older_than(today(), days)?;
            println!("Deleted {deleted} fixtures older than {days} days");
        }
        "export" => {
            let Some(file) = args.get(2) else {
                println!("Error: please specify an output file");
                return Ok(());
            };
            let filter = export_filter(&args[3..])?;
            let store = open_store()?;
            let fixtures = store.query(&filter)?;
            let json = serde_json::to_string_pretty(&fixtures)?;
            std::fs::write(file, json).with_context(|| format!("write {file}"))?;
            println!("Exported {} fixtures to {file}", fixtures.len());
        }
        other => {
            println!("Unknown command: {other}");
            usage();
        }
    }

    Ok(())
}

fn export_filter(args: &[String]) -> Result<QueryFilter> {
    let mut filter = QueryFilter::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--country" => {
                filter.country = Some(
                    args.get(i + 1)
                        .context("--country needs a value")?
                        .clone(),
                );
                i += 2;
            }
            "--date" => {
                let raw = args.get(i + 1).context("--date needs a value")?;
                filter.date =
                    Some(raw.parse().with_context(|| format!("bad date {raw:?}"))?);
                i += 2;
            }
            other => anyhow::bail!("unknown export flag {other:?}"),
        }
    }
    Ok(filter)
}

async fn scrape() -> Result<()> {
    // Single instance lock: two concurrent scrapes would fight over pacing
    // and hammer the source.
    let lock_file_path = env::temp_dir().join("fixtures_live_scrape.lock");
    let lock_file = File::create(&lock_file_path)
        .with_context(|| format!("create lock file at {}", lock_file_path.display()))?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("another scrape is already running, exiting");
            return Ok(());
        }
    };

    let pacing_secs = env::var("SCRAPE_PACING_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let log_dir = env::var("FIXTURES_LOG_DIR").unwrap_or_else(|_| "logs".to_string());

    let reference = today();
    let cfg = IngestConfig::month_of(reference);
    info!(
        "Scraping fixtures from {} to {}",
        cfg.window_start, cfg.window_end
    );

    let mut store = open_store()?;
    let events = EventLogger::new(&log_dir);
    let mut client = LstvClient::new(Duration::from_secs(pacing_secs));
    let extractor = Extractor::new();

    let mut all: Vec<Fixture> = Vec::new();
    let mut interrupted = false;

    for &(slug, competition) in LEAGUES {
        let html = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                warn!("scrape interrupted");
                interrupted = true;
                break;
            }
            fetched = client.fetch_competition(slug) => match fetched {
                Ok(html) => html,
                Err(e) => {
                    warn!(competition, "fetch failed: {e:#}");
                    let _ = events.log(&SourceStatusEvent {
                        ts: now_iso(),
                        event: "SOURCE_STATUS",
                        source: SOURCE_NAME.to_string(),
                        competition: competition.to_string(),
                        ok: false,
                        fixtures: 0,
                        note: format!("{e:#}"),
                    });
                    continue;
                }
            }
        };

        if looks_like_challenge_page(&html) {
            warn!(competition, "challenge page served, skipping");
            let _ = events.log(&SourceStatusEvent {
                ts: now_iso(),
                event: "SOURCE_STATUS",
                source: SOURCE_NAME.to_string(),
                competition: competition.to_string(),
                ok: false,
                fixtures: 0,
                note: "challenge_page".to_string(),
            });
            continue;
        }

        let outcome = extractor.extract(&html, competition, &cfg);
        info!(
            competition,
            strategy = outcome.strategy.unwrap_or("none"),
            skipped = outcome.skipped,
            "found {} fixtures",
            outcome.fixtures.len()
        );
        let _ = events.log(&SourceStatusEvent {
            ts: now_iso(),
            event: "SOURCE_STATUS",
            source: SOURCE_NAME.to_string(),
            competition: competition.to_string(),
            ok: true,
            fixtures: outcome.fixtures.len(),
            note: String::new(),
        });

        all.extend(outcome.fixtures);
    }

    let found = all.len();
    let tally = store.bulk_upsert(&all);

    let status = if interrupted {
        RunStatus::Interrupted
    } else if found == 0 {
        RunStatus::NoData
    } else {
        RunStatus::Success
    };
    store.record_run(&ScrapeRun::new(
        reference,
        tally.total() as i64,
        SOURCE_NAME,
        status,
    ));

    let _ = events.log(&IngestSummaryEvent {
        ts: now_iso(),
        event: "INGEST_SUMMARY",
        source: SOURCE_NAME.to_string(),
        competitions: LEAGUES.len(),
        found,
        inserted: tally.inserted,
        updated: tally.updated,
        errors: tally.errors,
        status: status.as_str().to_string(),
    });

    info!(
        "Stored {} fixtures ({} new, {} updated, {} errors)",
        tally.total(),
        tally.inserted,
        tally.updated,
        tally.errors
    );
    report::print_stats(&store.stats()?, &store.detect_duplicates()?);

    Ok(())
}
