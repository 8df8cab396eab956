use crate::error::{Error, Result};
use crate::sale::SalesSeries;
use std::fmt;
use std::str::FromStr;

/// The three sales charts that can be exported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Annual,
    Country,
    Model,
}

impl ChartKind {
    /// Suggested download file name for the CSV export
    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Annual => "annual_sales_data.csv",
            ChartKind::Country => "country_sales_data.csv",
            ChartKind::Model => "model_sales_data.csv",
        }
    }

    /// Column headers of the exported table
    pub fn headers(self) -> [&'static str; 2] {
        match self {
            ChartKind::Annual => ["Year", "Units Sold"],
            ChartKind::Country => ["Country", "Units Sold"],
            ChartKind::Model => ["Model", "Units Sold"],
        }
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "annual" => Ok(ChartKind::Annual),
            "country" => Ok(ChartKind::Country),
            "model" => Ok(ChartKind::Model),
            other => Err(Error::InvalidSelection {
                field: "chart",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Annual => "annual",
            ChartKind::Country => "country",
            ChartKind::Model => "model",
        })
    }
}

/// A chart's data as `(label, units)` pairs, in series order
///
/// Model rows contribute their per-release-year units.
pub fn chart_rows(series: &SalesSeries, kind: ChartKind) -> Vec<(String, u64)> {
    match kind {
        ChartKind::Annual => series
            .annual
            .iter()
            .map(|total| (total.year.to_string(), total.units))
            .collect(),
        ChartKind::Country => series
            .country
            .iter()
            .map(|total| (total.country.clone(), total.units))
            .collect(),
        ChartKind::Model => series
            .models
            .iter()
            .map(|row| (row.label.clone(), row.units))
            .collect(),
    }
}

/// Export one chart's series as CSV
///
/// The header row comes first, then one row per series entry, lines joined
/// by `\n`. Labels containing commas, quotes or newlines are quoted with
/// inner quotes doubled.
///
/// # Examples
/// ```
/// use car_inventory::downloader::{ChartKind, to_csv};
/// use car_inventory::sale::{CountryTotal, SalesSeries};
///
/// let series = SalesSeries {
///     country: vec![CountryTotal { country: "Korea, South".to_string(), units: 4 }],
///     ..Default::default()
/// };
/// assert_eq!(
///     to_csv(&series, ChartKind::Country),
///     "Country,Units Sold\n\"Korea, South\",4"
/// );
/// ```
pub fn to_csv(series: &SalesSeries, kind: ChartKind) -> String {
    let mut lines = vec![kind.headers().join(",")];
    for (label, units) in chart_rows(series, kind) {
        lines.push(format!("{},{}", escape_csv_field(&label), units));
    }
    lines.join("\n")
}

fn escape_csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export one chart's series as an XLSX workbook
///
/// Same table as [`to_csv`], with units written as numbers.
#[cfg(feature = "web")]
pub fn to_xlsx(series: &SalesSeries, kind: ChartKind) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let xlsx_err = |e: rust_xlsxwriter::XlsxError| Error::Export(e.to_string());

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (col, header) in kind.headers().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_err)?;
    }

    for (row, (label, units)) in chart_rows(series, kind).into_iter().enumerate() {
        let row = (row + 1) as u32;
        worksheet.write_string(row, 0, &label).map_err(xlsx_err)?;
        worksheet
            .write_number(row, 1, units as f64)
            .map_err(xlsx_err)?;
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer().map_err(xlsx_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::{AnnualTotal, ModelYearRow};

    fn series() -> SalesSeries {
        SalesSeries {
            annual: vec![
                AnnualTotal {
                    year: 2021,
                    units: 15,
                },
                AnnualTotal {
                    year: 2022,
                    units: 3,
                },
            ],
            country: Vec::new(),
            models: vec![ModelYearRow {
                label: "Ram \"Heavy\" 1500 (2020)".to_string(),
                units: 9,
                model_key: "Ram \"Heavy\" 1500".to_string(),
                release_year: 2020,
                model_total: 9,
            }],
        }
    }

    #[test]
    fn annual_csv_matches_export_layout() {
        assert_eq!(
            to_csv(&series(), ChartKind::Annual),
            "Year,Units Sold\n2021,15\n2022,3"
        );
    }

    #[test]
    fn empty_series_exports_header_only() {
        assert_eq!(to_csv(&series(), ChartKind::Country), "Country,Units Sold");
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(
            to_csv(&series(), ChartKind::Model),
            "Model,Units Sold\n\"Ram \"\"Heavy\"\" 1500 (2020)\",9"
        );
    }

    #[test]
    fn chart_kind_round_trips_through_text() {
        for kind in [ChartKind::Annual, ChartKind::Country, ChartKind::Model] {
            assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
        }
        assert!("pie".parse::<ChartKind>().is_err());
        assert_eq!(ChartKind::Model.file_name(), "model_sales_data.csv");
    }

    #[cfg(feature = "web")]
    #[test]
    fn xlsx_export_produces_a_zip_container() {
        let bytes = to_xlsx(&series(), ChartKind::Annual).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }
}
