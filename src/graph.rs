#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use crate::downloader::{ChartKind, chart_rows};
use crate::error::{Error, Result};
use crate::sale::SalesSeries;
use plotters::prelude::*;

/// Chart styles available for sales series
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphType {
    /// One bar per series entry
    Bar,

    /// Entries joined by a line, useful for the annual trend
    Line,
}

/// Configuration options for chart rendering
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,

    pub graph_type: GraphType,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Sales".to_string(),
            x_label: String::new(),
            y_label: "Units Sold".to_string(),
            width: 800,
            height: 600,
            graph_type: GraphType::Bar,
        }
    }
}

impl GraphOptions {
    /// Default title and axis labels for one of the sales charts
    pub fn for_chart(kind: ChartKind) -> Self {
        let (title, x_label, graph_type) = match kind {
            ChartKind::Annual => ("Annual Sales", "Year", GraphType::Line),
            ChartKind::Country => ("Sales by Country", "Country", GraphType::Bar),
            ChartKind::Model => ("Top Models by Sales", "Model", GraphType::Bar),
        };
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            graph_type,
            ..Self::default()
        }
    }
}

/// Render one chart of a sales series as PNG bytes
///
/// The image is drawn into a temporary `.png` file and read back.
///
/// # Errors
/// * `Error::Chart` if plotters fails to draw or encode the image
/// * `Error::Io` if the temporary file cannot be created or read
pub fn create_graph(series: &SalesSeries, kind: ChartKind, options: &GraphOptions) -> Result<Vec<u8>> {
    let rows = chart_rows(series, kind);
    let file = tempfile::Builder::new().suffix(".png").tempfile()?;

    draw_chart(&rows, options, file.path()).map_err(|e| Error::Chart(e.to_string()))?;

    Ok(std::fs::read(file.path())?)
}

fn draw_chart(
    rows: &[(String, u64)],
    options: &GraphOptions,
    path: &std::path::Path,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<&str> = rows.iter().map(|(label, _)| label.as_str()).collect();
    let count = rows.len().max(1) as i32;
    let max_y = rows.iter().map(|(_, units)| *units).max().unwrap_or(0);

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..count, 0u64..max_y + 1)?;

    chart
        .configure_mesh()
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .x_labels(rows.len().max(1))
        .x_label_formatter(&|x: &i32| {
            labels
                .get(*x as usize)
                .map(|label| label.to_string())
                .unwrap_or_default()
        })
        .draw()?;

    match options.graph_type {
        GraphType::Bar => {
            chart.draw_series(rows.iter().enumerate().map(|(i, (_, units))| {
                let x = i as i32;
                Rectangle::new([(x, 0), (x + 1, *units)], BLUE.filled())
            }))?;
        }
        GraphType::Line => {
            chart.draw_series(LineSeries::new(
                rows.iter()
                    .enumerate()
                    .map(|(i, (_, units))| (i as i32, *units)),
                &RED,
            ))?;
        }
    }

    root.present()?;
    Ok(())
}
