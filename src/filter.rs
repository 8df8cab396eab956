use crate::error::Error;
use crate::sale::SaleRecord;
use std::fmt;
use std::str::FromStr;

/// Sentinel accepted wherever a filter may be left unconstrained
pub const ALL: &str = "all";

/// A single filter dimension: either unconstrained or pinned to one value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    /// True when the selector is `All` or equals `value`
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(expected) => expected == value,
        }
    }
}

impl<T: FromStr> Selector<T> {
    /// Parse a selector from its query-string form, `"all"` or a concrete value
    ///
    /// `field` names the dimension in the error message.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) {
            return Ok(Selector::All);
        }
        raw.parse::<T>()
            .map(Selector::Only)
            .map_err(|_| Error::InvalidSelection {
                field,
                value: raw.to_string(),
            })
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str(ALL),
            Selector::Only(value) => value.fmt(f),
        }
    }
}

/// Keep the records matching every non-`All` selector
///
/// - year compares against `sale_year`, never `release_year`
/// - continent compares against the resolved continent of `country`
/// - make compares exactly against `make`
///
/// The input slice is left untouched; an empty result is a valid outcome.
///
/// # Arguments
/// * `records` - The full sales snapshot
/// * `year` - Sale year selector
/// * `continent` - Continent selector, matched after resolving `country`
/// * `make` - Make selector
///
/// # Returns
/// * `Vec<SaleRecord>` - Clones of the matching records, in input order
///
/// # Examples
/// ```
/// use car_inventory::filter::{Selector, apply_filters};
/// use car_inventory::sale::SaleRecord;
///
/// let sales = vec![
///     SaleRecord::new("Toyota", "Corolla", "Germany", 2021, 2020, 5),
///     SaleRecord::new("Honda", "Civic", "Japan", 2021, 2021, 10),
/// ];
/// let europe = apply_filters(
///     &sales,
///     &Selector::All,
///     &Selector::Only("Europe".to_string()),
///     &Selector::All,
/// );
/// assert_eq!(europe.len(), 1);
/// assert_eq!(europe[0].make, "Toyota");
/// ```
pub fn apply_filters(
    records: &[SaleRecord],
    year: &Selector<i32>,
    continent: &Selector<String>,
    make: &Selector<String>,
) -> Vec<SaleRecord> {
    records
        .iter()
        .filter(|sale| year.admits(&sale.sale_year))
        .filter(|sale| match continent {
            Selector::All => true,
            Selector::Only(wanted) => crate::continent::resolve(&sale.country) == wanted,
        })
        .filter(|sale| make.admits(&sale.make))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SaleRecord> {
        vec![
            SaleRecord::new("Toyota", "Corolla", "Germany", 2021, 2020, 5),
            SaleRecord::new("Toyota", "Corolla", "Germany", 2022, 2020, 3),
            SaleRecord::new("Honda", "Civic", "Japan", 2021, 2021, 10),
            SaleRecord::new("Honda", "Civic", "Narnia", 2020, 2021, 4),
        ]
    }

    #[test]
    fn all_selectors_keep_everything() {
        let sales = sample();
        let kept = apply_filters(&sales, &Selector::All, &Selector::All, &Selector::All);
        assert_eq!(kept, sales);
    }

    #[test]
    fn year_filter_uses_sale_year() {
        let sales = sample();
        // 2020 is a release year of the Corollas but only a sale year of the Narnia Civic
        let kept = apply_filters(
            &sales,
            &Selector::Only(2020),
            &Selector::All,
            &Selector::All,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].country, "Narnia");
    }

    #[test]
    fn continent_filter_resolves_country() {
        let sales = sample();
        let europe = apply_filters(
            &sales,
            &Selector::All,
            &Selector::Only("Europe".to_string()),
            &Selector::All,
        );
        assert_eq!(europe.len(), 2);

        let other = apply_filters(
            &sales,
            &Selector::All,
            &Selector::Only("Other".to_string()),
            &Selector::All,
        );
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].country, "Narnia");
    }

    #[test]
    fn filters_compose_conjunctively() {
        let sales = sample();
        let kept = apply_filters(
            &sales,
            &Selector::Only(2021),
            &Selector::Only("Asia".to_string()),
            &Selector::Only("Toyota".to_string()),
        );
        assert!(kept.is_empty());
        // input untouched
        assert_eq!(sales.len(), 4);
    }

    #[test]
    fn parses_query_forms() {
        assert_eq!(Selector::<i32>::parse("year", "all").unwrap(), Selector::All);
        assert_eq!(Selector::<i32>::parse("year", "ALL").unwrap(), Selector::All);
        assert_eq!(Selector::<i32>::parse("year", "").unwrap(), Selector::All);
        assert_eq!(
            Selector::<i32>::parse("year", "2021").unwrap(),
            Selector::Only(2021)
        );
        assert!(matches!(
            Selector::<i32>::parse("year", "twenty"),
            Err(Error::InvalidSelection { field: "year", .. })
        ));
        assert_eq!(Selector::Only(2021).to_string(), "2021");
        assert_eq!(Selector::<String>::All.to_string(), "all");
    }
}
