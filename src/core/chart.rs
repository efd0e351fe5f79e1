use crate::core::allocation::format_amount;
use crate::domain::model::PerformanceReport;
use crate::utils::error::{PortfolioError, Result};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const PROFITABILITY_LABEL: &str = "Cumulative profitability (%)";
const PROFITABILITY_COLOR: &str = "#FFD700";
const PALETTE: [(u8, u8, u8); 5] = [
    (75, 192, 192),
    (54, 162, 235),
    (153, 102, 255),
    (255, 99, 132),
    (255, 159, 64),
];

pub fn series_color(index: usize, alpha: f32) -> String {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub color: String,
    pub emphasized: bool,
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceChart {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Dates first in calendar order, anything unparseable after them.
fn compare_labels(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn align(labels: &[String], values: &BTreeMap<String, f64>) -> Vec<Option<f64>> {
    labels.iter().map(|label| values.get(label).copied()).collect()
}

impl PerformanceChart {
    pub fn from_report(report: &PerformanceReport) -> Self {
        let mut labels: Vec<String> = report.cumulative_profitability.keys().cloned().collect();
        labels.sort_by(|a, b| compare_labels(a, b));

        let mut series: Vec<ChartSeries> = report
            .assets
            .iter()
            .enumerate()
            .map(|(index, asset)| ChartSeries {
                label: asset.symbol.clone(),
                color: series_color(index, 1.0),
                emphasized: false,
                points: align(&labels, &asset.historical_values),
            })
            .collect();

        series.push(ChartSeries {
            label: PROFITABILITY_LABEL.to_string(),
            color: PROFITABILITY_COLOR.to_string(),
            emphasized: true,
            points: align(&labels, &report.cumulative_profitability),
        });

        tracing::debug!(
            "Built chart with {} labels and {} series",
            labels.len(),
            series.len()
        );

        Self { labels, series }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn render_table(&self, decimals: usize) -> String {
        let mut header = vec!["Date".to_string()];
        header.extend(self.series.iter().map(|s| s.label.clone()));

        let mut rows = vec![header];
        for (i, label) in self.labels.iter().enumerate() {
            let mut row = vec![label.clone()];
            row.extend(self.series.iter().map(|s| match s.points[i] {
                Some(v) => format_amount(v, decimals),
                None => "-".to_string(),
            }));
            rows.push(row);
        }

        let widths: Vec<usize> = (0..rows[0].len())
            .map(|col| rows.iter().map(|r| r[col].len()).max().unwrap_or(0))
            .collect();

        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["date".to_string()];
        header.extend(self.series.iter().map(|s| s.label.clone()));
        writer.write_record(&header)?;

        for (i, label) in self.labels.iter().enumerate() {
            let mut record = vec![label.clone()];
            record.extend(
                self.series
                    .iter()
                    .map(|s| s.points[i].map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PortfolioError::IoError(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
