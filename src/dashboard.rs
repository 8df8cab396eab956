use crate::aggregator::aggregate;
use crate::continent;
use crate::error::{Error, Result};
use crate::filter::{Selector, apply_filters};
use crate::sale::{SaleRecord, SalesSeries};
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The model-series sizes offered to users
pub const TOP_MODEL_CHOICES: [usize; 4] = [10, 20, 50, 100];

/// Number of model rows shown; restricted to [`TOP_MODEL_CHOICES`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TopModels(usize);

impl TopModels {
    pub fn new(count: usize) -> Result<Self> {
        if TOP_MODEL_CHOICES.contains(&count) {
            Ok(Self(count))
        } else {
            Err(Error::InvalidSelection {
                field: "top",
                value: count.to_string(),
            })
        }
    }

    /// The number of model rows to keep
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopModels {
    fn default() -> Self {
        Self(TOP_MODEL_CHOICES[0])
    }
}

impl FromStr for TopModels {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let count = raw.trim().parse::<usize>().map_err(|_| Error::InvalidSelection {
            field: "top",
            value: raw.to_string(),
        })?;
        Self::new(count)
    }
}

impl fmt::Display for TopModels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The user's current filter choices
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub year: Selector<i32>,
    pub continent: Selector<String>,
    pub make: Selector<String>,
    pub top_models: TopModels,
}

impl Selection {
    /// Parse the four query-string selectors; `None` means `"all"` / default
    pub fn from_query(
        year: Option<&str>,
        continent: Option<&str>,
        make: Option<&str>,
        top: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            year: year.map_or(Ok(Selector::All), |raw| Selector::parse("year", raw))?,
            continent: continent.map_or(Ok(Selector::All), |raw| {
                Selector::parse("continent", raw)
            })?,
            make: make.map_or(Ok(Selector::All), |raw| Selector::parse("make", raw))?,
            top_models: top.map_or(Ok(TopModels::default()), str::parse)?,
        })
    }
}

/// Filter options derived once from the full snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub makes: Vec<String>,
    pub continents: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[SaleRecord]) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|sale| sale.sale_year).collect();
        let makes: BTreeSet<&str> = records.iter().map(|sale| sale.make.as_str()).collect();
        let continents: BTreeSet<&str> = records
            .iter()
            .map(|sale| continent::resolve(&sale.country))
            .collect();

        Self {
            years: years.into_iter().collect(),
            makes: makes.into_iter().map(str::to_string).collect(),
            continents: continents.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Filter then aggregate one snapshot for one selection
///
/// Pure; the snapshot is only read.
pub fn overview(records: &[SaleRecord], selection: &Selection) -> SalesSeries {
    let filtered = apply_filters(
        records,
        &selection.year,
        &selection.continent,
        &selection.make,
    );
    debug!(
        "aggregating {} of {} sales (year={}, continent={}, make={}, top={})",
        filtered.len(),
        records.len(),
        selection.year,
        selection.continent,
        selection.make,
        selection.top_models
    );
    aggregate(&filtered, selection.top_models.get())
}

/// Sales overview state over an immutable snapshot
///
/// Every selection change recomputes the three series from scratch; nothing
/// carries over between recomputations except the snapshot itself.
pub struct SalesDashboard {
    snapshot: Arc<[SaleRecord]>,
    options: FilterOptions,
    selection: Selection,
    series: SalesSeries,
}

impl SalesDashboard {
    /// Load a snapshot and compute the unfiltered series
    ///
    /// # Errors
    /// * `Error::NoSalesData` if the snapshot holds no records at all
    pub fn new(snapshot: Arc<[SaleRecord]>) -> Result<Self> {
        Self::with_selection(snapshot, Selection::default())
    }

    /// Load a snapshot and compute the series for an initial selection
    ///
    /// # Arguments
    /// * `snapshot` - Shared, immutable sales records
    /// * `selection` - Filters and top-N to apply
    ///
    /// # Errors
    /// * `Error::NoSalesData` if the snapshot holds no records at all
    pub fn with_selection(snapshot: Arc<[SaleRecord]>, selection: Selection) -> Result<Self> {
        if snapshot.is_empty() {
            return Err(Error::NoSalesData);
        }
        let options = FilterOptions::from_records(&snapshot);
        let series = overview(&snapshot, &selection);

        Ok(Self {
            snapshot,
            options,
            selection,
            series,
        })
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn series(&self) -> &SalesSeries {
        &self.series
    }

    /// True when the current filters matched no record
    pub fn no_matching_data(&self) -> bool {
        self.series.annual.is_empty()
    }

    pub fn select_year(&mut self, year: Selector<i32>) -> &SalesSeries {
        self.selection.year = year;
        self.recompute()
    }

    pub fn select_continent(&mut self, continent: Selector<String>) -> &SalesSeries {
        self.selection.continent = continent;
        self.recompute()
    }

    pub fn select_make(&mut self, make: Selector<String>) -> &SalesSeries {
        self.selection.make = make;
        self.recompute()
    }

    pub fn set_top_models(&mut self, top_models: TopModels) -> &SalesSeries {
        self.selection.top_models = top_models;
        self.recompute()
    }

    fn recompute(&mut self) -> &SalesSeries {
        self.series = overview(&self.snapshot, &self.selection);
        &self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Arc<[SaleRecord]> {
        vec![
            SaleRecord::new("Toyota", "Corolla", "Germany", 2021, 2020, 5),
            SaleRecord::new("Toyota", "Corolla", "Germany", 2022, 2020, 3),
            SaleRecord::new("Honda", "Civic", "Japan", 2021, 2021, 10),
        ]
        .into()
    }

    // 25 models, one release year each, so 25 model rows
    fn wide_snapshot() -> Arc<[SaleRecord]> {
        (0..25u64)
            .map(|i| {
                let model = format!("Model {}", i);
                SaleRecord::new("Kia", &model, "Peru", 2018 + (i % 3) as i32, 2017, i + 1)
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn top_models_change_resizes_model_series() {
        let mut dashboard = SalesDashboard::new(wide_snapshot()).unwrap();
        assert_eq!(dashboard.series().models.len(), 10);

        let series = dashboard.set_top_models(TopModels::new(20).unwrap());
        assert_eq!(series.models.len(), 20);
        assert_eq!(series.models[0].label, "Kia Model 24 (2017)");
        assert_eq!(dashboard.selection().top_models.get(), 20);

        let series = dashboard.set_top_models(TopModels::new(50).unwrap());
        assert_eq!(series.models.len(), 25);
    }

    #[test]
    fn selecting_a_year_keeps_one_annual_entry() {
        let mut dashboard = SalesDashboard::new(wide_snapshot()).unwrap();
        assert_eq!(dashboard.series().annual.len(), 3);

        let series = dashboard.select_year(Selector::Only(2019));
        assert_eq!(series.annual.len(), 1);
        assert_eq!(series.annual[0].year, 2019);
        assert!(!dashboard.no_matching_data());
    }

    #[test]
    fn selecting_a_year_without_sales_is_no_match() {
        let mut dashboard = SalesDashboard::new(wide_snapshot()).unwrap();
        let series = dashboard.select_year(Selector::Only(1999));
        assert!(series.annual.is_empty());
        assert!(series.models.is_empty());
        assert!(dashboard.no_matching_data());

        // options still describe the whole snapshot
        assert_eq!(dashboard.options().years, vec![2018, 2019, 2020]);
    }

    #[test]
    fn empty_snapshot_is_no_data() {
        let empty: Arc<[SaleRecord]> = Vec::new().into();
        assert!(matches!(SalesDashboard::new(empty), Err(Error::NoSalesData)));
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let dashboard = SalesDashboard::new(snapshot()).unwrap();
        let options = dashboard.options();
        assert_eq!(options.years, vec![2021, 2022]);
        assert_eq!(options.makes, vec!["Honda", "Toyota"]);
        assert_eq!(options.continents, vec!["Asia", "Europe"]);
    }

    #[test]
    fn narrowing_to_nothing_is_not_an_error() {
        let mut dashboard = SalesDashboard::new(snapshot()).unwrap();
        dashboard.select_make(Selector::Only("Toyota".to_string()));
        let series = dashboard.select_continent(Selector::Only("Asia".to_string()));
        assert!(series.is_empty());
        assert!(dashboard.no_matching_data());

        dashboard.select_continent(Selector::All);
        assert_eq!(dashboard.series().annual.len(), 2);
    }

    #[test]
    fn top_models_only_accepts_offered_sizes() {
        assert_eq!(TopModels::new(20).unwrap().get(), 20);
        assert!(TopModels::new(15).is_err());
        assert_eq!("50".parse::<TopModels>().unwrap().get(), 50);
        assert!("many".parse::<TopModels>().is_err());
        assert_eq!(TopModels::default().get(), 10);
    }

    #[test]
    fn selection_from_query_defaults_to_all() {
        let selection = Selection::from_query(None, Some("all"), Some("Honda"), None).unwrap();
        assert_eq!(selection.year, Selector::All);
        assert_eq!(selection.continent, Selector::All);
        assert_eq!(selection.make, Selector::Only("Honda".to_string()));
        assert_eq!(selection.top_models, TopModels::default());

        assert!(Selection::from_query(Some("abc"), None, None, None).is_err());
        assert!(Selection::from_query(None, None, None, Some("7")).is_err());
    }
}
