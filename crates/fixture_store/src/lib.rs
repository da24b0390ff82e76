//! SQLite system of record for fixtures and their broadcasters.
//!
//! One row per natural key (home, away, competition, date), enforced by a
//! unique index. Upserts refresh the mutable fields and replace the whole
//! broadcaster set; repeated ingestion of the same listings converges to the
//! same clean dataset. Writes are single-writer; every upsert runs as one
//! transaction so a fixture is never visible with a half-replaced
//! broadcaster set.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use tracing::{info, warn};

use fixture_model::{Broadcaster, Fixture, ScrapeRun};

/// Counts coming out of a bulk upsert. Failed records are tallied, never
/// allowed to abort the rest of the batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertTally {
    pub inserted: usize,
    pub updated:  usize,
    pub errors:   usize,
}

impl UpsertTally {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Natural-key groups with more than one member. Non-empty means the unique
/// indexes were bypassed somehow — report it, don't auto-heal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateReport {
    pub fixture_groups:     i64,
    pub broadcaster_groups: i64,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        self.fixture_groups > 0 || self.broadcaster_groups > 0
    }
}

/// Rows deleted by a dedup cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupCounts {
    pub fixtures:     usize,
    pub broadcasters: usize,
}

/// Optional query filters; all active filters must match.
#[derive(Debug, Default, Clone)]
pub struct QueryFilter {
    pub date:        Option<NaiveDate>,
    pub competition: Option<String>,
    /// Case-insensitive substring match against broadcaster country values.
    pub country:     Option<String>,
}

impl QueryFilter {
    pub fn by_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn by_competition(competition: impl Into<String>) -> Self {
        Self {
            competition: Some(competition.into()),
            ..Self::default()
        }
    }

    pub fn by_country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Self::default()
        }
    }
}

/// A persisted fixture with its full broadcaster set attached. This is also
/// the JSON export shape.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFixture {
    #[serde(skip_serializing)]
    pub id:           i64,
    pub home_team:    String,
    pub away_team:    String,
    pub competition:  String,
    pub date:         NaiveDate,
    pub time:         String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue:        Option<String>,
    pub broadcasters: Vec<Broadcaster>,
}

/// One row of the append-only scrape history.
#[derive(Debug, Clone, Serialize)]
pub struct RunRow {
    pub scrape_date:    String,
    pub scrape_time:    String,
    pub fixtures_count: i64,
    pub source:         String,
    pub status:         String,
}

/// Aggregate counts for the `stats` report.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub total_fixtures:     i64,
    pub total_broadcasters: i64,
    pub unique_countries:   i64,
    pub by_competition:     Vec<(String, i64)>,
    pub date_range:         Option<(String, String)>,
    pub last_run:           Option<RunRow>,
}

pub struct FixtureStore {
    conn: Connection,
}

impl FixtureStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open sqlite db at {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().context("open in-memory db")?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("enable foreign keys")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert-or-update keyed by the natural key; returns the stable row id.
    ///
    /// The broadcaster set is deleted and re-inserted in the same
    /// transaction — replaced, never merged with the previous set.
    pub fn upsert(&mut self, fixture: &Fixture) -> Result<i64> {
        let tx = self.conn.transaction().context("begin upsert tx")?;
        let id = upsert_in_tx(&tx, fixture)?;
        tx.commit().context("commit upsert tx")?;
        Ok(id)
    }

    /// Upsert each record independently; one bad record never blocks the
    /// rest, it just lands in the error tally.
    pub fn bulk_upsert(&mut self, fixtures: &[Fixture]) -> UpsertTally {
        let mut tally = UpsertTally::default();

        for fixture in fixtures {
            let existed = match self.find_id(fixture) {
                Ok(found) => found.is_some(),
                Err(e) => {
                    warn!("natural key lookup failed: {e:#}");
                    tally.errors += 1;
                    continue;
                }
            };

            match self.upsert(fixture) {
                Ok(_) => {
                    if existed {
                        tally.updated += 1;
                    } else {
                        tally.inserted += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        home = %fixture.home_team,
                        away = %fixture.away_team,
                        "upsert failed: {e:#}"
                    );
                    tally.errors += 1;
                }
            }
        }

        info!(
            inserted = tally.inserted,
            updated = tally.updated,
            errors = tally.errors,
            "bulk upsert done ({} fixtures)",
            tally.total()
        );
        tally
    }

    fn find_id(&self, fixture: &Fixture) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM fixtures
                 WHERE home_team = ?1 AND away_team = ?2
                   AND competition = ?3 AND fixture_date = ?4",
                params![
                    fixture.home_team,
                    fixture.away_team,
                    fixture.competition,
                    fixture.date.to_string(),
                ],
                |r| r.get(0),
            )
            .optional()
            .context("look up fixture by natural key")
    }

    /// Fixtures matching the filter, ordered by date then time, each with
    /// its full broadcaster set.
    pub fn query(&self, filter: &QueryFilter) -> Result<Vec<StoredFixture>> {
        let mut sql = String::from(
            "SELECT DISTINCT f.id, f.home_team, f.away_team, f.competition,
                    f.fixture_date, f.fixture_time, f.venue
             FROM fixtures f",
        );
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if filter.country.is_some() {
            sql.push_str(" JOIN broadcasters b ON b.fixture_id = f.id");
        }
        if let Some(date) = filter.date {
            clauses.push("f.fixture_date = ?");
            values.push(date.to_string());
        }
        if let Some(competition) = &filter.competition {
            clauses.push("f.competition = ?");
            values.push(competition.clone());
        }
        if let Some(country) = &filter.country {
            clauses.push("UPPER(b.country) LIKE '%' || UPPER(?) || '%'");
            values.push(country.clone());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY f.fixture_date, f.fixture_time");

        let mut stmt = self.conn.prepare(&sql).context("prepare fixture query")?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |r| {
                Ok(StoredFixture {
                    id: r.get(0)?,
                    home_team: r.get(1)?,
                    away_team: r.get(2)?,
                    competition: r.get(3)?,
                    date: r
                        .get::<_, String>(4)?
                        .parse()
                        .unwrap_or(NaiveDate::MIN),
                    time: r.get(5)?,
                    venue: r.get(6)?,
                    broadcasters: Vec::new(),
                })
            })
            .context("run fixture query")?;

        let mut fixtures = Vec::new();
        for row in rows {
            let mut fixture = row.context("read fixture row")?;
            fixture.broadcasters = self.broadcasters_of(fixture.id)?;
            fixtures.push(fixture);
        }
        Ok(fixtures)
    }

    fn broadcasters_of(&self, fixture_id: i64) -> Result<Vec<Broadcaster>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT country, channel FROM broadcasters
                 WHERE fixture_id = ?1 ORDER BY country, channel",
            )
            .context("prepare broadcaster query")?;
        let rows = stmt
            .query_map(params![fixture_id], |r| {
                Ok(Broadcaster {
                    country: r.get(0)?,
                    channel: r.get(1)?,
                })
            })
            .context("run broadcaster query")?;

        let mut broadcasters = Vec::new();
        for row in rows {
            broadcasters.push(row.context("read broadcaster row")?);
        }
        Ok(broadcasters)
    }

    /// Scan for natural-key groups with more than one member. Always empty
    /// under correct operation; non-empty signals an invariant violation.
    pub fn detect_duplicates(&self) -> Result<DuplicateReport> {
        let fixture_groups: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM (
                     SELECT 1 FROM fixtures
                     GROUP BY home_team, away_team, competition, fixture_date
                     HAVING COUNT(*) > 1
                 )",
                [],
                |r| r.get(0),
            )
            .context("count duplicate fixture groups")?;

        let broadcaster_groups: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM (
                     SELECT 1 FROM broadcasters
                     GROUP BY fixture_id, country, channel
                     HAVING COUNT(*) > 1
                 )",
                [],
                |r| r.get(0),
            )
            .context("count duplicate broadcaster groups")?;

        let report = DuplicateReport {
            fixture_groups,
            broadcaster_groups,
        };
        if report.has_duplicates() {
            warn!(
                fixtures = fixture_groups,
                broadcasters = broadcaster_groups,
                "duplicate natural keys found"
            );
        }
        Ok(report)
    }

    /// For each offending group keep the row with the highest id (most
    /// recently inserted) and delete the rest. Fixture deletion cascades to
    /// broadcasters. Idempotent and safe to re-run.
    pub fn remove_duplicates(&mut self) -> Result<CleanupCounts> {
        let tx = self.conn.transaction().context("begin cleanup tx")?;

        let fixtures = tx
            .execute(
                "DELETE FROM fixtures
                 WHERE id NOT IN (
                     SELECT MAX(id) FROM fixtures
                     GROUP BY home_team, away_team, competition, fixture_date
                 )",
                [],
            )
            .context("remove duplicate fixtures")?;

        let broadcasters = tx
            .execute(
                "DELETE FROM broadcasters
                 WHERE id NOT IN (
                     SELECT MAX(id) FROM broadcasters
                     GROUP BY fixture_id, country, channel
                 )",
                [],
            )
            .context("remove duplicate broadcasters")?;

        tx.commit().context("commit cleanup tx")?;

        if fixtures > 0 || broadcasters > 0 {
            info!(fixtures, broadcasters, "removed duplicate rows");
        }
        Ok(CleanupCounts {
            fixtures,
            broadcasters,
        })
    }

    /// Delete fixtures dated strictly before (today − days), cascading
    /// their broadcasters. Returns the number of fixtures deleted.
    pub fn prune_older_than(&mut self, today: NaiveDate, days: u64) -> Result<usize> {
        let cutoff = today
            .checked_sub_days(Days::new(days))
            .context("retention cutoff out of range")?;
        let deleted = self
            .conn
            .execute(
                "DELETE FROM fixtures WHERE fixture_date < ?1",
                params![cutoff.to_string()],
            )
            .context("prune old fixtures")?;
        info!(deleted, %cutoff, "pruned fixtures older than {days} days");
        Ok(deleted)
    }

    /// Append one scrape-run row. Audit only: an error here is logged and
    /// swallowed so it can never fail the ingestion that produced it.
    pub fn record_run(&self, run: &ScrapeRun) {
        let result = self.conn.execute(
            "INSERT INTO scraping_history (scrape_date, fixtures_count, source, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                run.date.to_string(),
                run.fixtures_count,
                run.source,
                run.status.as_str(),
            ],
        );
        if let Err(e) = result {
            warn!("failed to record scrape run: {e}");
        }
    }

    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT scrape_date, scrape_time, fixtures_count, source, status
                 FROM scraping_history ORDER BY scrape_time DESC, id DESC LIMIT ?1",
            )
            .context("prepare run history query")?;
        let rows = stmt
            .query_map(params![limit as i64], |r| {
                Ok(RunRow {
                    scrape_date: r.get(0)?,
                    scrape_time: r.get(1)?,
                    fixtures_count: r.get(2)?,
                    source: r.get(3)?,
                    status: r.get(4)?,
                })
            })
            .context("run history query")?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row.context("read run row")?);
        }
        Ok(runs)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let total_fixtures: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fixtures", [], |r| r.get(0))
            .context("count fixtures")?;
        let total_broadcasters: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM broadcasters", [], |r| r.get(0))
            .context("count broadcasters")?;
        let unique_countries: i64 = self
            .conn
            .query_row("SELECT COUNT(DISTINCT country) FROM broadcasters", [], |r| {
                r.get(0)
            })
            .context("count countries")?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT competition, COUNT(*) FROM fixtures
                 GROUP BY competition ORDER BY COUNT(*) DESC, competition",
            )
            .context("prepare competition counts")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .context("competition counts")?;
        let mut by_competition = Vec::new();
        for row in rows {
            by_competition.push(row.context("read competition count")?);
        }

        let date_range: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT MIN(fixture_date), MAX(fixture_date) FROM fixtures",
                [],
                |r| {
                    let min: Option<String> = r.get(0)?;
                    let max: Option<String> = r.get(1)?;
                    Ok(min.zip(max))
                },
            )
            .context("read date range")?;

        let last_run = self.recent_runs(1)?.into_iter().next();

        Ok(StoreStats {
            total_fixtures,
            total_broadcasters,
            unique_countries,
            by_competition,
            date_range,
            last_run,
        })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS fixtures (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            competition TEXT NOT NULL,
            fixture_date TEXT NOT NULL,
            fixture_time TEXT NOT NULL,
            venue TEXT,
            scraped_at TEXT NOT NULL,
            last_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_fixture_natural_key
            ON fixtures(home_team, away_team, competition, fixture_date);
        CREATE INDEX IF NOT EXISTS idx_fixture_date ON fixtures(fixture_date);
        CREATE INDEX IF NOT EXISTS idx_competition ON fixtures(competition);

        CREATE TABLE IF NOT EXISTS broadcasters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fixture_id INTEGER NOT NULL REFERENCES fixtures(id) ON DELETE CASCADE,
            country TEXT NOT NULL,
            channel TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_broadcaster_natural_key
            ON broadcasters(fixture_id, country, channel);
        CREATE INDEX IF NOT EXISTS idx_broadcaster_country ON broadcasters(country);

        CREATE TABLE IF NOT EXISTS scraping_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scrape_date TEXT NOT NULL,
            scrape_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            fixtures_count INTEGER,
            source TEXT,
            status TEXT
        );
        "#,
    )
    .context("init schema")?;

    Ok(())
}

fn upsert_in_tx(tx: &Transaction, fixture: &Fixture) -> Result<i64> {
    tx.execute(
        "INSERT INTO fixtures (home_team, away_team, competition, fixture_date,
                               fixture_time, venue, scraped_at, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, CURRENT_TIMESTAMP)
         ON CONFLICT(home_team, away_team, competition, fixture_date)
         DO UPDATE SET
             fixture_time = excluded.fixture_time,
             venue = excluded.venue,
             last_updated = CURRENT_TIMESTAMP",
        params![
            fixture.home_team,
            fixture.away_team,
            fixture.competition,
            fixture.date.to_string(),
            fixture.time,
            fixture.venue,
            fixture.scraped_at.to_rfc3339(),
        ],
    )
    .context("upsert fixture row")?;

    let id: i64 = tx
        .query_row(
            "SELECT id FROM fixtures
             WHERE home_team = ?1 AND away_team = ?2
               AND competition = ?3 AND fixture_date = ?4",
            params![
                fixture.home_team,
                fixture.away_team,
                fixture.competition,
                fixture.date.to_string(),
            ],
            |r| r.get(0),
        )
        .context("read back fixture id")?;

    // Fresh set every time; duplicate (country, channel) pairs inside one
    // incoming record collapse via the unique index.
    tx.execute("DELETE FROM broadcasters WHERE fixture_id = ?1", params![id])
        .context("clear previous broadcasters")?;
    for bc in &fixture.broadcasters {
        tx.execute(
            "INSERT OR IGNORE INTO broadcasters (fixture_id, country, channel)
             VALUES (?1, ?2, ?3)",
            params![id, bc.country, bc.channel],
        )
        .context("insert broadcaster")?;
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fixture_model::RunStatus;

    fn fixture(home: &str, away: &str, date: (i32, u32, u32)) -> Fixture {
        Fixture {
            home_team: home.into(),
            away_team: away.into(),
            competition: "Premier League".into(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: "20:00".into(),
            venue: None,
            broadcasters: vec![
                Broadcaster::new("UK", "Sky Sports"),
                Broadcaster::new("USA", "NBC Sports"),
            ],
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let f = fixture("Arsenal", "Chelsea", (2026, 1, 15));

        let id1 = store.upsert(&f).unwrap();
        let id2 = store.upsert(&f).unwrap();
        assert_eq!(id1, id2);

        let rows = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].broadcasters.len(), 2);
    }

    #[test]
    fn broadcasters_are_replaced_not_merged() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let mut f = fixture("Arsenal", "Chelsea", (2026, 1, 15));
        store.upsert(&f).unwrap();

        f.broadcasters = vec![Broadcaster::new("Spain", "DAZN España")];
        store.upsert(&f).unwrap();

        let rows = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(
            rows[0].broadcasters,
            vec![Broadcaster::new("Spain", "DAZN España")]
        );
    }

    #[test]
    fn duplicate_broadcasters_in_one_record_collapse() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let mut f = fixture("Arsenal", "Chelsea", (2026, 1, 15));
        f.broadcasters = vec![
            Broadcaster::new("UK", "Sky Sports"),
            Broadcaster::new("UK", "Sky Sports"),
        ];
        store.upsert(&f).unwrap();

        let rows = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(rows[0].broadcasters.len(), 1);
    }

    #[test]
    fn reupsert_updates_mutable_fields_and_keeps_id() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let mut f = fixture("Arsenal", "Chelsea", (2026, 1, 15));
        let id1 = store.upsert(&f).unwrap();

        f.venue = Some("Emirates Stadium".into());
        f.time = "17:30".into();
        let id2 = store.upsert(&f).unwrap();
        assert_eq!(id1, id2);

        let rows = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(rows[0].venue.as_deref(), Some("Emirates Stadium"));
        assert_eq!(rows[0].time, "17:30");
    }

    #[test]
    fn bulk_upsert_tallies_new_and_updated() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let a = fixture("Arsenal", "Chelsea", (2026, 1, 15));
        let b = fixture("Liverpool", "Everton", (2026, 1, 16));

        let first = store.bulk_upsert(&[a.clone(), b.clone()]);
        assert_eq!(first, UpsertTally { inserted: 2, updated: 0, errors: 0 });

        let c = fixture("Leeds United", "Burnley", (2026, 1, 17));
        let second = store.bulk_upsert(&[a, b, c]);
        assert_eq!(second, UpsertTally { inserted: 1, updated: 2, errors: 0 });
    }

    #[test]
    fn query_filters_compose_and_order_by_date_then_time() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let mut early = fixture("Arsenal", "Chelsea", (2026, 1, 15));
        early.time = "12:30".into();
        let mut late = fixture("Liverpool", "Everton", (2026, 1, 15));
        late.time = "17:30".into();
        let mut other_day = fixture("Milan", "Inter", (2026, 1, 14));
        other_day.competition = "Serie A".into();
        other_day.broadcasters = vec![Broadcaster::new("Italy", "DAZN Italia")];

        store.bulk_upsert(&[late.clone(), other_day, early]);

        let all = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].home_team, "Milan");
        assert_eq!(all[1].time, "12:30");
        assert_eq!(all[2].time, "17:30");

        let by_date = store
            .query(&QueryFilter::by_date(
                NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            ))
            .unwrap();
        assert_eq!(by_date.len(), 2);

        let by_comp = store.query(&QueryFilter::by_competition("Serie A")).unwrap();
        assert_eq!(by_comp.len(), 1);
        assert_eq!(by_comp[0].home_team, "Milan");

        // Case-insensitive substring match on broadcaster country.
        let by_country = store.query(&QueryFilter::by_country("ital")).unwrap();
        assert_eq!(by_country.len(), 1);
        assert_eq!(by_country[0].home_team, "Milan");

        let none = store.query(&QueryFilter::by_country("Elbonia")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn detect_duplicates_is_empty_under_constraints() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        store.upsert(&fixture("Arsenal", "Chelsea", (2026, 1, 15))).unwrap();
        store.upsert(&fixture("Arsenal", "Chelsea", (2026, 1, 15))).unwrap();

        let report = store.detect_duplicates().unwrap();
        assert!(!report.has_duplicates());
    }

    // Simulates a lower-level write bypassing the unique indexes, which is
    // the only way duplicate natural keys can appear. The indexes stay
    // dropped so the duplicate rows can exist while detect/remove run.
    fn inject_duplicate(store: &mut FixtureStore) {
        store
            .conn
            .execute_batch(
                r#"
                DROP INDEX idx_fixture_natural_key;
                DROP INDEX idx_broadcaster_natural_key;
                INSERT INTO fixtures (home_team, away_team, competition, fixture_date,
                                      fixture_time, venue, scraped_at)
                SELECT home_team, away_team, competition, fixture_date,
                       'unknown', 'Shadow Ground', scraped_at
                FROM fixtures WHERE home_team = 'Arsenal';
                "#,
            )
            .unwrap();
    }

    #[test]
    fn remove_duplicates_keeps_highest_id_and_cascades() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        let f = fixture("Arsenal", "Chelsea", (2026, 1, 15));
        store.upsert(&f).unwrap();
        inject_duplicate(&mut store);

        let report = store.detect_duplicates().unwrap();
        assert_eq!(report.fixture_groups, 1);

        let removed = store.remove_duplicates().unwrap();
        assert_eq!(removed.fixtures, 1);

        let after = store.detect_duplicates().unwrap();
        assert!(!after.has_duplicates());

        // The survivor is the most recently inserted copy.
        let rows = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].venue.as_deref(), Some("Shadow Ground"));

        // No orphaned broadcaster rows for the deleted fixture.
        let orphans: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM broadcasters b
                 WHERE NOT EXISTS (SELECT 1 FROM fixtures f WHERE f.id = b.fixture_id)",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn prune_deletes_strictly_older_fixtures_with_broadcasters() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        store.upsert(&fixture("Arsenal", "Chelsea", (2026, 1, 1))).unwrap();
        let kept_id = store.upsert(&fixture("Liverpool", "Everton", (2026, 1, 20))).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        let deleted = store.prune_older_than(today, 30).unwrap();
        assert_eq!(deleted, 1);

        let rows = store.query(&QueryFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, kept_id);

        let bc_count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM broadcasters", [], |r| r.get(0))
            .unwrap();
        assert_eq!(bc_count, 2);
    }

    #[test]
    fn record_run_appends_history() {
        let store = FixtureStore::open_in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        store.record_run(&ScrapeRun::new(date, 12, "LiveSoccerTV", RunStatus::Success));
        store.record_run(&ScrapeRun::new(date, 0, "LiveSoccerTV", RunStatus::NoData));

        let runs = store.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].status, "no_data");
        assert_eq!(runs[1].fixtures_count, 12);

        let stats = store.stats().unwrap();
        assert_eq!(stats.last_run.unwrap().status, "no_data");
    }

    #[test]
    fn stats_aggregate_counts_and_date_range() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        store.upsert(&fixture("Arsenal", "Chelsea", (2026, 1, 15))).unwrap();
        let mut seria = fixture("Milan", "Inter", (2026, 1, 10));
        seria.competition = "Serie A".into();
        store.upsert(&seria).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_fixtures, 2);
        assert_eq!(stats.total_broadcasters, 4);
        assert_eq!(stats.unique_countries, 2);
        assert_eq!(
            stats.date_range,
            Some(("2026-01-10".to_string(), "2026-01-15".to_string()))
        );
        assert_eq!(stats.by_competition.len(), 2);
    }

    #[test]
    fn export_shape_has_nested_broadcasters_and_no_row_id() {
        let mut store = FixtureStore::open_in_memory().unwrap();
        store.upsert(&fixture("Arsenal", "Chelsea", (2026, 1, 15))).unwrap();

        let rows = store.query(&QueryFilter::default()).unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["date"], "2026-01-15");
        assert_eq!(json[0]["broadcasters"][0]["country"], "UK");
        assert!(json[0].get("id").is_none());
        // venue is optional and omitted when absent
        assert!(json[0].get("venue").is_none());
    }
}
