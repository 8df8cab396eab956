use crate::sale::{AnnualTotal, CountryTotal, ModelYearRow, SaleRecord, SalesSeries};
use std::collections::{BTreeMap, HashMap};

/// How the model series is cut down to the requested size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Truncation {
    /// Keep the first N `(model, release year)` rows of the ranked list.
    /// A model's rows can be split across the cutoff.
    #[default]
    Rows,

    /// Keep every row of the first N ranked models
    Models,
}

/// Running sums keyed in first-seen order
///
/// Ties in the final sorts fall back to this order, so it has to be stable.
struct OrderedTotals<K> {
    index: HashMap<K, usize>,
    totals: Vec<(K, u64)>,
}

impl<K: std::hash::Hash + Eq + Clone> OrderedTotals<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            totals: Vec::new(),
        }
    }

    fn add(&mut self, key: &K, units: u64) {
        match self.index.get(key) {
            Some(&slot) => {
                let total = &mut self.totals[slot].1;
                *total = total.saturating_add(units);
            }
            None => {
                self.index.insert(key.clone(), self.totals.len());
                self.totals.push((key.clone(), units));
            }
        }
    }

    fn into_vec(self) -> Vec<(K, u64)> {
        self.totals
    }
}

/// Aggregate sale records into the annual, country and model series
///
/// Row-level truncation; see [`aggregate_with`] for the per-model cutoff.
///
/// # Examples
/// ```
/// use car_inventory::aggregator::aggregate;
/// use car_inventory::sale::SaleRecord;
///
/// let sales = vec![
///     SaleRecord::new("Toyota", "Corolla", "Germany", 2021, 2020, 5),
///     SaleRecord::new("Honda", "Civic", "Japan", 2021, 2021, 10),
/// ];
/// let series = aggregate(&sales, 10);
/// assert_eq!(series.annual[0].units, 15);
/// assert_eq!(series.models[0].label, "Honda Civic (2021)");
/// ```
pub fn aggregate(records: &[SaleRecord], top_models_count: usize) -> SalesSeries {
    aggregate_with(records, top_models_count, Truncation::Rows)
}

/// Aggregate sale records with an explicit truncation policy
///
/// - annual: ascending by numeric sale year
/// - country: ascending by units, least-selling first; ties in first-seen order
/// - models: one row per `(make, model, release_year)`, release years ascending
///   within a model, then ranked by the model's total across all release years,
///   highest first, and cut to `top_models_count` per `truncation`
///
/// Empty input yields three empty series.
pub fn aggregate_with(
    records: &[SaleRecord],
    top_models_count: usize,
    truncation: Truncation,
) -> SalesSeries {
    let mut annual: BTreeMap<i32, u64> = BTreeMap::new();
    let mut country: OrderedTotals<String> = OrderedTotals::new();
    let mut models: OrderedTotals<String> = OrderedTotals::new();
    let mut model_years: HashMap<String, BTreeMap<i32, u64>> = HashMap::new();

    for sale in records {
        let year_total = annual.entry(sale.sale_year).or_insert(0);
        *year_total = year_total.saturating_add(sale.units_sold);
        country.add(&sale.country, sale.units_sold);

        let key = sale.model_key();
        models.add(&key, sale.units_sold);
        let release_total = model_years
            .entry(key)
            .or_default()
            .entry(sale.release_year)
            .or_insert(0);
        *release_total = release_total.saturating_add(sale.units_sold);
    }

    let annual = annual
        .into_iter()
        .map(|(year, units)| AnnualTotal { year, units })
        .collect();

    let mut country: Vec<CountryTotal> = country
        .into_vec()
        .into_iter()
        .map(|(country, units)| CountryTotal { country, units })
        .collect();
    country.sort_by_key(|total| total.units);

    let mut ranked = models.into_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    if truncation == Truncation::Models {
        ranked.truncate(top_models_count);
    }

    let mut rows = Vec::new();
    for (model_key, model_total) in ranked {
        let years = model_years.remove(&model_key).unwrap_or_default();
        for (release_year, units) in years {
            rows.push(ModelYearRow {
                label: format!("{} ({})", model_key, release_year),
                units,
                model_key: model_key.clone(),
                release_year,
                model_total,
            });
        }
    }
    if truncation == Truncation::Rows {
        rows.truncate(top_models_count);
    }

    SalesSeries {
        annual,
        country,
        models: rows,
    }
}
