//! Chart Layout Module
//! Maps every table of a report to the chart that presents it.

use crate::data::{ADVERTISING_EXPENDITURE, AUTOMOBILE_SALES, MONTH, UNEMPLOYMENT_RATE, VEHICLE_TYPE, YEAR};
use crate::report::{AggregateTable, Report};

/// Chart shape used for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    /// Bars per `x` category, one colored bar per `series` value.
    GroupedBar,
}

/// One chart of a report page.
#[derive(Debug, Clone)]
pub struct ChartData<'a> {
    /// File stem for the rendered image.
    pub name: String,
    pub title: String,
    pub kind: ChartKind,
    /// Category axis (or slice names for a pie).
    pub x: &'static str,
    /// Value axis (or slice sizes for a pie).
    pub y: &'static str,
    pub series: Option<&'static str>,
    pub table: &'a AggregateTable,
}

/// The four charts of a report, in page order.
pub fn charts_for(report: &Report) -> Vec<ChartData<'_>> {
    match report {
        Report::Yearly(stats) => {
            let prefix = format!("yearly_{}", stats.year);
            vec![
                ChartData {
                    name: format!("{prefix}_overall_yearly_trend"),
                    title: "Automobile Sales Over Time".to_string(),
                    kind: ChartKind::Line,
                    x: YEAR,
                    y: AUTOMOBILE_SALES,
                    series: None,
                    table: &stats.overall_yearly_trend,
                },
                ChartData {
                    name: format!("{prefix}_monthly_sales"),
                    title: "Automobile Sales by Month".to_string(),
                    kind: ChartKind::Line,
                    x: MONTH,
                    y: AUTOMOBILE_SALES,
                    series: None,
                    table: &stats.monthly_sales,
                },
                ChartData {
                    name: format!("{prefix}_avg_sales_by_type"),
                    title: format!(
                        "Average Vehicles Sold by Vehicle Type in the Year {}",
                        stats.year
                    ),
                    kind: ChartKind::Bar,
                    x: VEHICLE_TYPE,
                    y: AUTOMOBILE_SALES,
                    series: None,
                    table: &stats.avg_sales_by_type,
                },
                ChartData {
                    name: format!("{prefix}_ad_spend_by_type"),
                    title: format!(
                        "Advertising Expenditure by Vehicle Type in the Year {}",
                        stats.year
                    ),
                    kind: ChartKind::Pie,
                    x: VEHICLE_TYPE,
                    y: ADVERTISING_EXPENDITURE,
                    series: None,
                    table: &stats.ad_spend_by_type,
                },
            ]
        }
        Report::Recession(stats) => vec![
            ChartData {
                name: "recession_yearly_trend".to_string(),
                title: "Automobile Sales Over Time".to_string(),
                kind: ChartKind::Line,
                x: YEAR,
                y: AUTOMOBILE_SALES,
                series: None,
                table: &stats.yearly_trend,
            },
            ChartData {
                name: "recession_avg_sales_by_type".to_string(),
                title: "Automobile Sales by Vehicle Type".to_string(),
                kind: ChartKind::Bar,
                x: VEHICLE_TYPE,
                y: AUTOMOBILE_SALES,
                series: None,
                table: &stats.avg_sales_by_type,
            },
            ChartData {
                name: "recession_ad_spend_by_type".to_string(),
                title: "Advertising Expenditure by Vehicle Type".to_string(),
                kind: ChartKind::Pie,
                x: VEHICLE_TYPE,
                y: ADVERTISING_EXPENDITURE,
                series: None,
                table: &stats.ad_spend_by_type,
            },
            ChartData {
                name: "recession_unemployment_effect".to_string(),
                title: "Unemployment Rate Effect on Automobile Sales by Vehicle Type".to_string(),
                kind: ChartKind::GroupedBar,
                x: UNEMPLOYMENT_RATE,
                y: AUTOMOBILE_SALES,
                series: Some(VEHICLE_TYPE),
                table: &stats.unemployment_effect,
            },
        ],
    }
}
