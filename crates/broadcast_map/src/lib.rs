//! Channel name → broadcast country classifier.
//!
//! Best effort only: exact table hit first, then the first table key found
//! as a case-insensitive substring of the channel name, else "Various".
//! Table declaration order is load-bearing for the substring pass — keep
//! new entries grouped under their country and don't reorder.

use std::collections::BTreeMap;

use fixture_model::Broadcaster;

/// Marker for channels no table entry covers.
pub const VARIOUS: &str = fixture_model::COUNTRY_UNRESOLVED;

const CHANNEL_COUNTRIES: &[(&str, &str)] = &[
    // USA/America
    ("NBC", "USA"),
    ("NBC Sports", "USA"),
    ("Peacock", "USA"),
    ("Peacock Premium", "USA"),
    ("USA Network", "USA"),
    ("Universo", "USA"),
    ("ESPN", "USA"),
    ("ESPN+", "USA"),
    ("ESPN Deportes", "USA"),
    ("CBS Sports", "USA"),
    ("CBS Sports Network", "USA"),
    ("CBS Sports Golazo Network", "USA"),
    ("Paramount+", "USA"),
    ("beIN Sports", "USA"),
    ("beIN Sports USA", "USA"),
    ("beIN Sports en Español", "USA"),
    // UK
    ("Sky Sports", "UK"),
    ("Sky Sports Premier League", "UK"),
    ("Sky Sports Main Event", "UK"),
    ("Sky Sports Ultra HDR", "UK"),
    ("Sky Sports 4K", "UK"),
    ("TNT Sports", "UK"),
    ("TNT Sports 1", "UK"),
    ("TNT Sports 2", "UK"),
    ("TNT Sports 3", "UK"),
    ("TNT Sports 4", "UK"),
    ("LaLigaTV", "UK"),
    ("Premier Sports", "UK"),
    ("Premier Sports 1", "UK"),
    ("Premier Sports 2", "UK"),
    // Spain
    ("DAZN España", "Spain"),
    ("DAZN Spain", "Spain"),
    ("DAZN LaLiga", "Spain"),
    ("DAZN1 Spain", "Spain"),
    ("Movistar", "Spain"),
    ("Movistar+", "Spain"),
    ("Movistar LaLiga", "Spain"),
    ("Movistar+ Deportes", "Spain"),
    ("Movistar+ Deportes 2", "Spain"),
    ("LaLiga TV Bar", "Spain"),
    // Germany
    ("Sky Sport", "Germany"),
    ("Sky Sport Premier League", "Germany"),
    ("DAZN Germany", "Germany"),
    ("WOW", "Germany"),
    // Austria
    ("Sky Sport Austria", "Austria"),
    ("DAZN Austria", "Austria"),
    // Italy
    ("DAZN Italia", "Italy"),
    // Portugal
    ("DAZN Portugal", "Portugal"),
    ("DAZN1 Portugal", "Portugal"),
    // Albania
    ("SuperSport 2 Digitalb", "Albania"),
    ("SuperSport 3 Digitalb", "Albania"),
    ("Tring", "Albania"),
    ("Tring Sport 1", "Albania"),
    // France
    ("Canal+ France", "France"),
    ("Canal+ Sport", "France"),
    // International
    ("Bet365", "International"),
    ("DAZN", "International"),
];

/// Resolve a channel name to its canonical broadcast country.
pub fn country_for_channel(channel: &str) -> &'static str {
    for (key, country) in CHANNEL_COUNTRIES {
        if *key == channel {
            return country;
        }
    }

    let lower = channel.to_lowercase();
    for (key, country) in CHANNEL_COUNTRIES {
        if lower.contains(&key.to_lowercase()) {
            return country;
        }
    }

    VARIOUS
}

/// Group a fixture's broadcasters by canonical country for display.
///
/// The classifier wins over the scraped country label; the scraped label is
/// only kept when classification comes back unresolved. Channel lists come
/// out sorted and de-duplicated.
pub fn group_by_country(broadcasters: &[Broadcaster]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for bc in broadcasters {
        let classified = country_for_channel(&bc.channel);
        let country = if classified == VARIOUS {
            bc.country.clone()
        } else {
            classified.to_string()
        };
        grouped.entry(country).or_default().push(bc.channel.clone());
    }

    for channels in grouped.values_mut() {
        channels.sort();
        channels.dedup();
    }

    grouped
}
