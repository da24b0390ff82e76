use anyhow::Result;
use fixture_store::FixtureStore;

fn main() -> Result<()> {
    let db_path =
        std::env::var("FIXTURES_DB_PATH").unwrap_or_else(|_| "output/fixtures.db".to_string());
    let store = FixtureStore::open(&db_path)?;

    let stats = store.stats()?;
    println!("db_path={db_path}");
    println!("fixtures: {}", stats.total_fixtures);
    println!("broadcasters: {}", stats.total_broadcasters);
    println!("countries: {}", stats.unique_countries);

    for (competition, count) in &stats.by_competition {
        println!("competition {competition}: {count}");
    }

    match &stats.last_run {
        Some(run) => println!(
            "last_run: ts={} source={} fixtures={} status={}",
            run.scrape_time, run.source, run.fixtures_count, run.status
        ),
        None => println!("last_run: <none>"),
    }

    for run in store.recent_runs(10)? {
        println!(
            "history: ts={} source={} fixtures={} status={}",
            run.scrape_time, run.source, run.fixtures_count, run.status
        );
    }

    Ok(())
}
