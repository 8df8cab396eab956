use crate::error::{Error, Result};
use crate::sale::SaleRecord;
use crate::store::{Database, SALES_FILE};
use serde::Deserialize;

/// Listing limits at or above this value disable pagination
pub const UNPAGED_LIMIT: usize = 1000;

/// Raw `/sales` query parameters, as strings so bad numbers can be reported
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SalesQueryParams {
    pub country: Option<String>,
    pub model: Option<String>,
    pub sale_year: Option<String>,
    pub release_year: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Parsed sales listing query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SalesQuery {
    pub country: Option<String>,
    pub model: Option<String>,
    pub sale_year: Option<i32>,
    pub release_year: Option<i32>,
    pub page: usize,
    pub limit: usize,
}

fn parse_year(field: &str, raw: Option<&str>) -> Result<Option<i32>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            Error::Validation(format!(
                "Invalid {} format. Please provide a valid integer.",
                field
            ))
        }),
    }
}

impl SalesQuery {
    /// Parse raw query parameters, defaulting to page 1 and no pagination
    ///
    /// # Errors
    /// * `Error::Validation` if `sale_year` or `release_year` is not an integer
    pub fn from_params(params: &SalesQueryParams) -> Result<Self> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        Ok(Self {
            country: non_empty(&params.country),
            model: non_empty(&params.model),
            sale_year: parse_year("sale_year", params.sale_year.as_deref())?,
            release_year: parse_year("release_year", params.release_year.as_deref())?,
            page: params.page.unwrap_or(1).max(1),
            limit: params.limit.unwrap_or(UNPAGED_LIMIT),
        })
    }

    fn matches(&self, sale: &SaleRecord) -> bool {
        self.country
            .as_ref()
            .is_none_or(|country| sale.country.eq_ignore_ascii_case(country))
            && self
                .model
                .as_ref()
                .is_none_or(|model| sale.model.eq_ignore_ascii_case(model))
            && self.sale_year.is_none_or(|year| sale.sale_year == year)
            && self.release_year.is_none_or(|year| sale.release_year == year)
    }
}

/// Load the full sales snapshot from the store
pub fn load_sales(db: &Database) -> Result<Vec<SaleRecord>> {
    db.read(SALES_FILE)
}

/// Select sales matching every given criterion
///
/// Country and model compare case-insensitively, years exactly. Pagination
/// is applied only when `limit` is below [`UNPAGED_LIMIT`].
///
/// # Arguments
/// * `records` - The sales snapshot
/// * `query` - Parsed filters and pagination
///
/// # Returns
/// * `Vec<SaleRecord>` - The selected page, or every match when unpaged
pub fn query_sales(records: &[SaleRecord], query: &SalesQuery) -> Vec<SaleRecord> {
    let matching = records.iter().filter(|sale| query.matches(sale));
    if query.limit < UNPAGED_LIMIT {
        matching
            .skip((query.page - 1).saturating_mul(query.limit))
            .take(query.limit)
            .cloned()
            .collect()
    } else {
        matching.cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> Vec<SaleRecord> {
        vec![
            SaleRecord::new("Toyota", "Corolla", "Germany", 2021, 2020, 5),
            SaleRecord::new("Toyota", "Corolla", "Germany", 2022, 2020, 3),
            SaleRecord::new("Honda", "Civic", "Japan", 2021, 2021, 10),
        ]
    }

    #[test]
    fn filters_case_insensitively() {
        let params = SalesQueryParams {
            country: Some("germany".to_string()),
            model: Some("COROLLA".to_string()),
            ..Default::default()
        };
        let query = SalesQuery::from_params(&params).unwrap();
        assert_eq!(query_sales(&sales(), &query).len(), 2);
    }

    #[test]
    fn year_parameters_must_be_integers() {
        let params = SalesQueryParams {
            sale_year: Some("last year".to_string()),
            ..Default::default()
        };
        match SalesQuery::from_params(&params) {
            Err(Error::Validation(msg)) => assert_eq!(
                msg,
                "Invalid sale_year format. Please provide a valid integer."
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn paginates_only_below_the_unpaged_limit() {
        let paged = SalesQueryParams {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let query = SalesQuery::from_params(&paged).unwrap();
        let page = query_sales(&sales(), &query);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].make, "Honda");

        let unpaged = SalesQueryParams {
            page: Some(2),
            ..Default::default()
        };
        let query = SalesQuery::from_params(&unpaged).unwrap();
        assert_eq!(query_sales(&sales(), &query).len(), 3);
    }

    #[test]
    fn release_year_is_separate_from_sale_year() {
        let params = SalesQueryParams {
            release_year: Some("2020".to_string()),
            ..Default::default()
        };
        let query = SalesQuery::from_params(&params).unwrap();
        assert_eq!(query_sales(&sales(), &query).len(), 2);
    }
}
