use car_inventory::continent;
use car_inventory::generator::{GeneratorOptions, generate_cars, generate_sales};
use car_inventory::{
    AnnualTotal, CountryTotal, SaleRecord, Selector, Truncation, aggregate, aggregate_with,
    apply_filters,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

fn corolla_and_civic() -> Vec<SaleRecord> {
    vec![
        SaleRecord::new("Toyota", "Corolla", "Germany", 2021, 2020, 5),
        SaleRecord::new("Toyota", "Corolla", "Germany", 2022, 2020, 3),
        SaleRecord::new("Honda", "Civic", "Japan", 2021, 2021, 10),
    ]
}

// A larger, varied data set from the demo generator
fn generated(seed: u64) -> Vec<SaleRecord> {
    let options = GeneratorOptions {
        cars: 60,
        sales: 800,
        seed,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let cars = generate_cars(&mut rng, &options);
    generate_sales(&mut rng, &cars, &options)
}

fn total(records: &[SaleRecord]) -> u64 {
    records.iter().map(|sale| sale.units_sold).sum()
}

#[test]
fn end_to_end_example() {
    let series = aggregate(&corolla_and_civic(), 10);

    assert_eq!(
        series.annual,
        vec![
            AnnualTotal { year: 2021, units: 15 },
            AnnualTotal { year: 2022, units: 3 },
        ]
    );
    assert_eq!(
        series.country,
        vec![
            CountryTotal {
                country: "Germany".to_string(),
                units: 8
            },
            CountryTotal {
                country: "Japan".to_string(),
                units: 10
            },
        ]
    );

    // both Corolla sales share release year 2020, so they form one row
    let labels: Vec<&str> = series.models.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(labels, vec!["Honda Civic (2021)", "Toyota Corolla (2020)"]);
    assert_eq!(series.models[0].model_total, 10);
    assert_eq!(series.models[1].units, 8);
    assert_eq!(series.models[1].model_total, 8);
}

#[test]
fn make_filter_example() {
    let filtered = apply_filters(
        &corolla_and_civic(),
        &Selector::All,
        &Selector::All,
        &Selector::Only("Toyota".to_string()),
    );
    let series = aggregate(&filtered, 10);

    assert_eq!(
        series.annual,
        vec![
            AnnualTotal { year: 2021, units: 5 },
            AnnualTotal { year: 2022, units: 3 },
        ]
    );
    assert_eq!(
        series.country,
        vec![CountryTotal {
            country: "Germany".to_string(),
            units: 8
        }]
    );
}

#[test]
fn totals_are_conserved() {
    for seed in [1, 2, 3] {
        let sales = generated(seed);
        let series = aggregate(&sales, 10);

        let annual: u64 = series.annual.iter().map(|t| t.units).sum();
        let country: u64 = series.country.iter().map(|t| t.units).sum();
        assert_eq!(annual, total(&sales));
        assert_eq!(country, total(&sales));
    }
}

#[test]
fn series_orderings_hold() {
    let sales = generated(11);
    let series = aggregate(&sales, 20);

    let distinct: HashSet<&str> = sales.iter().map(|sale| sale.country.as_str()).collect();
    assert_eq!(series.country.len(), distinct.len());
    assert!(series.country.windows(2).all(|w| w[0].units <= w[1].units));
    assert!(series.annual.windows(2).all(|w| w[0].year < w[1].year));

    assert!(series.models.len() <= 20);
    assert!(
        series
            .models
            .windows(2)
            .all(|w| w[0].model_total >= w[1].model_total)
    );
}

#[test]
fn model_truncation_policies() {
    let sales = generated(5);

    let rows = aggregate_with(&sales, 10, Truncation::Rows);
    assert_eq!(rows.models.len(), 10);

    let models = aggregate_with(&sales, 3, Truncation::Models);
    let keys: HashSet<&str> = models.models.iter().map(|row| row.model_key.as_str()).collect();
    assert_eq!(keys.len(), 3);

    // whole models survive, so each kept model's rows add up to its total
    for key in keys {
        let sum: u64 = models
            .models
            .iter()
            .filter(|row| row.model_key == key)
            .map(|row| row.units)
            .sum();
        let expected = models
            .models
            .iter()
            .find(|row| row.model_key == key)
            .map(|row| row.model_total);
        assert_eq!(Some(sum), expected);
    }
}

#[test]
fn single_year_filter_has_one_annual_entry() {
    let sales = generated(8);
    let year = sales[0].sale_year;
    let filtered = apply_filters(&sales, &Selector::Only(year), &Selector::All, &Selector::All);
    let series = aggregate(&filtered, 10);

    assert_eq!(series.annual.len(), 1);
    assert_eq!(series.annual[0].year, year);
}

#[test]
fn continent_filter_matches_resolver() {
    let sales = generated(9);
    let europe = apply_filters(
        &sales,
        &Selector::All,
        &Selector::Only("Europe".to_string()),
        &Selector::All,
    );
    assert!(!europe.is_empty());
    assert!(europe.iter().all(|sale| continent::resolve(&sale.country) == "Europe"));

    let other = apply_filters(
        &sales,
        &Selector::All,
        &Selector::Only(continent::OTHER.to_string()),
        &Selector::All,
    );
    assert!(other.iter().all(|sale| sale.country == "Turkey"));
}
