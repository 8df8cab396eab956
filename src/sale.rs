use serde::{Deserialize, Serialize};

/// One sales transaction as delivered by the sales store
///
/// `sale_year` and `release_year` are independent axes: a model released in
/// 2020 can have sales recorded in 2023.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_id: Option<u32>,

    pub make: String,
    pub model: String,

    /// Free-text country name, not necessarily known to the continent resolver
    pub country: String,

    pub sale_year: i32,
    pub release_year: i32,
    pub units_sold: u64,
}

impl SaleRecord {
    pub fn new(
        make: &str,
        model: &str,
        country: &str,
        sale_year: i32,
        release_year: i32,
        units_sold: u64,
    ) -> Self {
        Self {
            id: None,
            car_id: None,
            make: make.to_string(),
            model: model.to_string(),
            country: country.to_string(),
            sale_year,
            release_year,
            units_sold,
        }
    }

    /// `"<make> <model>"`, the grouping key of the model series
    pub fn model_key(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

/// Units sold in one sale year
///
/// Serialized positionally as `[year, units]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "(i32, u64)", from = "(i32, u64)")]
pub struct AnnualTotal {
    pub year: i32,
    pub units: u64,
}

impl From<AnnualTotal> for (i32, u64) {
    fn from(total: AnnualTotal) -> Self {
        (total.year, total.units)
    }
}

impl From<(i32, u64)> for AnnualTotal {
    fn from((year, units): (i32, u64)) -> Self {
        Self { year, units }
    }
}

/// Units sold in one country
///
/// Serialized positionally as `[country, units]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "(String, u64)", from = "(String, u64)")]
pub struct CountryTotal {
    pub country: String,
    pub units: u64,
}

impl From<CountryTotal> for (String, u64) {
    fn from(total: CountryTotal) -> Self {
        (total.country, total.units)
    }
}

impl From<(String, u64)> for CountryTotal {
    fn from((country, units): (String, u64)) -> Self {
        Self { country, units }
    }
}

/// One `(make, model, release_year)` bucket of the model series
///
/// Serialized positionally as
/// `[label, units, model_key, release_year, model_total]`; chart and export
/// consumers index these rows by position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "(String, u64, String, i32, u64)",
    from = "(String, u64, String, i32, u64)"
)]
pub struct ModelYearRow {
    /// `"<make> <model> (<release_year>)"`
    pub label: String,
    /// Units of this release year only
    pub units: u64,
    /// `"<make> <model>"`
    pub model_key: String,
    pub release_year: i32,
    /// Units of the model across all of its release years
    pub model_total: u64,
}

impl From<ModelYearRow> for (String, u64, String, i32, u64) {
    fn from(row: ModelYearRow) -> Self {
        (
            row.label,
            row.units,
            row.model_key,
            row.release_year,
            row.model_total,
        )
    }
}

impl From<(String, u64, String, i32, u64)> for ModelYearRow {
    fn from(
        (label, units, model_key, release_year, model_total): (String, u64, String, i32, u64),
    ) -> Self {
        Self {
            label,
            units,
            model_key,
            release_year,
            model_total,
        }
    }
}

/// The three aggregate views derived from one set of sale records
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSeries {
    pub annual: Vec<AnnualTotal>,
    pub country: Vec<CountryTotal>,
    pub models: Vec<ModelYearRow>,
}

impl SalesSeries {
    pub fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.country.is_empty() && self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_rows_serialize_positionally() {
        let row = ModelYearRow {
            label: "Toyota Corolla (2020)".to_string(),
            units: 8,
            model_key: "Toyota Corolla".to_string(),
            release_year: 2020,
            model_total: 8,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["Toyota Corolla (2020)", 8, "Toyota Corolla", 2020, 8])
        );

        let annual = serde_json::to_value(AnnualTotal {
            year: 2021,
            units: 15,
        })
        .unwrap();
        assert_eq!(annual, serde_json::json!([2021, 15]));
    }

    #[test]
    fn sale_record_ignores_extra_store_fields() {
        let raw = r#"{
            "id": 7, "car_id": 3, "make": "Honda", "model": "Civic",
            "release_year": 2021, "sale_year": 2022, "units_sold": 12,
            "country": "Japan"
        }"#;
        let sale: SaleRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(sale.id, Some(7));
        assert_eq!(sale.model_key(), "Honda Civic");
        assert_eq!(sale.units_sold, 12);
    }
}
