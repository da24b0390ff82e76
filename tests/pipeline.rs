//! End-to-end: raw competition markup → extraction → idempotent store →
//! filtered queries.

use chrono::NaiveDate;
use fixture_extract::{Extractor, IngestConfig};
use fixture_store::{FixtureStore, QueryFilter};

const PREMIER_LEAGUE_PAGE: &str = r#"
    <html><body><table>
      <tr class="drow"><td><a href="/schedules/2026-01-17/">Sat 17 Jan</a></td></tr>
      <tr class="matchrow">
        <td><span class="ts">15:00</span></td>
        <td><a href="/match/1001/arsenal-vs-chelsea">Arsenal vs Chelsea</a></td>
        <td id="channels">
          <a href="/channels/1/sky">Sky Sports Main Event</a>
          <a href="/channels/2/peacock">Peacock</a>
        </td>
      </tr>
      <tr class="drow"><td><a href="/schedules/2026-01-18/">Sun 18 Jan</a></td></tr>
      <tr class="matchrow">
        <td><span class="ts">16:30</span></td>
        <td><a href="/match/1002/liverpool-vs-everton">Liverpool 1 - 1 Everton</a></td>
        <td id="channels">
          <a href="/channels/3/tnt">TNT Sports 1</a>
        </td>
      </tr>
      <!-- out of the January window, must be dropped -->
      <tr class="drow"><td><a href="/schedules/2026-02-02/">Mon 2 Feb</a></td></tr>
      <tr class="matchrow">
        <td><span class="ts">20:00</span></td>
        <td><a href="/match/1003/spurs-vs-villa">Tottenham vs Aston Villa</a></td>
        <td id="channels"></td>
      </tr>
    </table></body></html>
"#;

const SERIE_A_PAGE: &str = r##"
    <html><body>
    <table class="schedules">
      <tr>
        <td class="date">Mon 13 Jan</td>
        <td><a href="/teams/milan">Milan</a></td>
        <td><a href="/teams/inter">Inter</a></td>
        <td class="time">19:45</td>
        <td class="venue">San Siro</td>
        <td class="broadcaster">
          <img alt="Italy" src="it.png">
          <a href="#">DAZN Italia</a>
        </td>
      </tr>
    </table>
    </body></html>
"##;

fn january() -> IngestConfig {
    IngestConfig::month_of(NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
}

#[test]
fn documents_flow_into_a_clean_queryable_store() {
    let cfg = january();
    let extractor = Extractor::new();

    let pl = extractor.extract(PREMIER_LEAGUE_PAGE, "Premier League", &cfg);
    assert_eq!(pl.strategy, Some("match_rows"));
    assert_eq!(pl.fixtures.len(), 2);
    assert_eq!(pl.skipped, 1); // the February fixture

    let sa = extractor.extract(SERIE_A_PAGE, "Serie A", &cfg);
    assert_eq!(sa.strategy, Some("schedule_tables"));
    assert_eq!(sa.fixtures.len(), 1);

    let mut store = FixtureStore::open_in_memory().unwrap();
    let all: Vec<_> = pl.fixtures.into_iter().chain(sa.fixtures).collect();
    let first = store.bulk_upsert(&all);
    assert_eq!(first.inserted, 3);
    assert_eq!(first.errors, 0);

    // Second ingestion of the same listings converges: no new rows.
    let pl_again = extractor.extract(PREMIER_LEAGUE_PAGE, "Premier League", &cfg);
    let second = store.bulk_upsert(&pl_again.fixtures);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 2);

    let everything = store.query(&QueryFilter::default()).unwrap();
    assert_eq!(everything.len(), 3);
    // Ordered by date then time.
    assert_eq!(everything[0].home_team, "Milan");
    assert_eq!(everything[1].home_team, "Arsenal");
    assert_eq!(everything[2].home_team, "Liverpool");

    // Live score got stripped during extraction.
    assert_eq!(everything[2].away_team, "Everton");

    let on_17th = store
        .query(&QueryFilter::by_date(
            NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
        ))
        .unwrap();
    assert_eq!(on_17th.len(), 1);
    assert_eq!(on_17th[0].broadcasters.len(), 2);

    // Country filter is a substring match against stored broadcaster country.
    let in_italy = store.query(&QueryFilter::by_country("ital")).unwrap();
    assert_eq!(in_italy.len(), 1);
    assert_eq!(in_italy[0].venue.as_deref(), Some("San Siro"));

    let report = store.detect_duplicates().unwrap();
    assert!(!report.has_duplicates());
}

#[test]
fn reingestion_replaces_broadcaster_sets() {
    let cfg = january();
    let extractor = Extractor::new();
    let mut store = FixtureStore::open_in_memory().unwrap();

    let first = extractor.extract(PREMIER_LEAGUE_PAGE, "Premier League", &cfg);
    store.bulk_upsert(&first.fixtures);

    // Same match, channels changed between scrapes.
    let updated_page = PREMIER_LEAGUE_PAGE.replace(
        r#"<a href="/channels/1/sky">Sky Sports Main Event</a>
          <a href="/channels/2/peacock">Peacock</a>"#,
        r#"<a href="/channels/9/espn">ESPN+</a>"#,
    );
    let second = extractor.extract(&updated_page, "Premier League", &cfg);
    store.bulk_upsert(&second.fixtures);

    let on_17th = store
        .query(&QueryFilter::by_date(
            NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
        ))
        .unwrap();
    let channels: Vec<&str> = on_17th[0]
        .broadcasters
        .iter()
        .map(|b| b.channel.as_str())
        .collect();
    assert_eq!(channels, vec!["ESPN+"]);
}
