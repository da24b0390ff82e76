//! Console rendering for query results and store statistics.

use broadcast_map::group_by_country;
use fixture_store::{DuplicateReport, StoredFixture, StoreStats};

const RULE: &str =
    "================================================================================";

pub fn print_fixtures(fixtures: &[StoredFixture], title: &str) {
    println!("\n{RULE}");
    println!("{title}");
    println!("{RULE}");

    if fixtures.is_empty() {
        println!("\nNo fixtures found");
        return;
    }

    for fixture in fixtures {
        println!(
            "\n{} - {} vs {}",
            fixture.time, fixture.home_team, fixture.away_team
        );
        println!("  Competition: {}", fixture.competition);
        println!("  Date: {}", fixture.date);
        if let Some(venue) = &fixture.venue {
            println!("  Venue: {venue}");
        }

        if !fixture.broadcasters.is_empty() {
            println!("  Broadcasting in:");
            for (country, channels) in group_by_country(&fixture.broadcasters) {
                println!("    {}: {}", country, channels.join(", "));
            }
        }
    }

    println!("\n{RULE}");
}

pub fn print_stats(stats: &StoreStats, dupes: &DuplicateReport) {
    println!("\n{RULE}");
    println!("DATABASE STATISTICS");
    println!("{RULE}");
    println!("\nTotal fixtures: {}", stats.total_fixtures);
    println!("Total broadcast entries: {}", stats.total_broadcasters);
    println!("Countries covered: {}", stats.unique_countries);

    if !stats.by_competition.is_empty() {
        println!("\nFixtures by competition:");
        for (competition, count) in &stats.by_competition {
            println!("  {competition}: {count}");
        }
    }

    if let Some((min, max)) = &stats.date_range {
        println!("\nDate range: {min} to {max}");
    }

    if let Some(run) = &stats.last_run {
        println!(
            "Last scrape: {} ({}, {} fixtures, {})",
            run.scrape_time, run.source, run.fixtures_count, run.status
        );
    }

    if dupes.has_duplicates() {
        println!(
            "\nWARNING: {} duplicate fixture groups, {} duplicate broadcaster groups",
            dupes.fixture_groups, dupes.broadcaster_groups
        );
        println!("Run 'fixtures clean' to remove duplicates");
    }

    println!("{RULE}\n");
}

pub fn print_duplicate_check(dupes: &DuplicateReport) {
    println!("\n{RULE}");
    println!("CHECKING FOR DUPLICATES");
    println!("{RULE}\n");

    if dupes.has_duplicates() {
        println!("Found issues:");
        println!("  Duplicate fixture groups: {}", dupes.fixture_groups);
        println!("  Duplicate broadcaster groups: {}", dupes.broadcaster_groups);
        println!("\nRun 'fixtures clean' to remove duplicates");
    } else {
        println!("No duplicates found - database is clean");
    }

    println!("{RULE}\n");
}
