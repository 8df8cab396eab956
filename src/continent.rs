use lazy_static::lazy_static;
use std::collections::HashMap;

/// Label returned for every country missing from the mapping table
pub const OTHER: &str = "Other";

const NORTH_AMERICA: &[&str] = &["United States", "Canada", "Mexico"];

const SOUTH_AMERICA: &[&str] = &[
    "Brazil",
    "Argentina",
    "Chile",
    "Colombia",
    "Peru",
    "Venezuela",
];

const EUROPE: &[&str] = &[
    "United Kingdom",
    "Germany",
    "France",
    "Italy",
    "Spain",
    "Netherlands",
    "Switzerland",
    "Sweden",
    "Belgium",
    "Austria",
    "Poland",
    "Portugal",
    "Greece",
    "Denmark",
    "Norway",
    "Finland",
    "Czech Republic",
    "Hungary",
    "Romania",
    "Ukraine",
    "Ireland",
];

const ASIA: &[&str] = &[
    "China",
    "Japan",
    "South Korea",
    "India",
    "Russia",
    "Thailand",
    "Malaysia",
    "Indonesia",
    "Singapore",
    "Philippines",
    "Vietnam",
    "Israel",
    "Qatar",
    "Saudi Arabia",
    "United Arab Emirates",
];

const OCEANIA: &[&str] = &["Australia", "New Zealand"];

const AFRICA: &[&str] = &["South Africa", "Egypt", "Morocco", "Nigeria", "Kenya"];

lazy_static! {
    static ref CONTINENTS: HashMap<&'static str, &'static str> = {
        let groups: [(&'static str, &[&'static str]); 6] = [
            ("North America", NORTH_AMERICA),
            ("South America", SOUTH_AMERICA),
            ("Europe", EUROPE),
            ("Asia", ASIA),
            ("Oceania", OCEANIA),
            ("Africa", AFRICA),
        ];

        let mut map = HashMap::new();
        for (continent, countries) in groups {
            for country in countries {
                map.insert(*country, continent);
            }
        }
        map
    };
}

/// Resolve a country name to its continent
///
/// Matching is exact (case-sensitive) against the known country table.
/// Unknown names resolve to [`OTHER`]; the function never fails.
///
/// # Examples
/// ```
/// use car_inventory::continent::resolve;
///
/// assert_eq!(resolve("Germany"), "Europe");
/// assert_eq!(resolve("Narnia"), "Other");
/// ```
pub fn resolve(country: &str) -> &'static str {
    CONTINENTS.get(country).copied().unwrap_or(OTHER)
}

/// Every country name the resolver knows, in table order
pub fn known_countries() -> impl Iterator<Item = &'static str> {
    NORTH_AMERICA
        .iter()
        .chain(SOUTH_AMERICA)
        .chain(EUROPE)
        .chain(ASIA)
        .chain(OCEANIA)
        .chain(AFRICA)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_countries() {
        assert_eq!(resolve("Germany"), "Europe");
        assert_eq!(resolve("United States"), "North America");
        assert_eq!(resolve("Peru"), "South America");
        assert_eq!(resolve("Japan"), "Asia");
        assert_eq!(resolve("Russia"), "Asia");
        assert_eq!(resolve("New Zealand"), "Oceania");
        assert_eq!(resolve("Kenya"), "Africa");
    }

    #[test]
    fn unknown_countries_fall_back_to_other() {
        assert_eq!(resolve("Narnia"), OTHER);
        assert_eq!(resolve("Turkey"), OTHER);
        assert_eq!(resolve(""), OTHER);
        // lookups are case-sensitive
        assert_eq!(resolve("germany"), OTHER);
    }

    #[test]
    fn every_known_country_maps_to_a_real_continent() {
        let countries: Vec<_> = known_countries().collect();
        assert_eq!(countries.len(), 52);
        for country in countries {
            assert_ne!(resolve(country), OTHER, "{country} should be mapped");
        }
    }
}
