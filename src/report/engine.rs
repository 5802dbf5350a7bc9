//! Report Engine Module
//! Group-by-reduce computations behind the yearly and recession reports.

use super::{AggregateTable, ReportError, ReportKind};
use crate::data::{
    month_index, SalesDataset, ADVERTISING_EXPENDITURE, AUTOMOBILE_SALES, MONTH, MONTH_ORDER,
    RECESSION, UNEMPLOYMENT_RATE, VEHICLE_TYPE, YEAR,
};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// How the target column of a group is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reduction {
    Mean,
    Sum,
}

impl Reduction {
    fn expr(self, target: &str) -> Expr {
        match self {
            Reduction::Mean => col(target).mean(),
            Reduction::Sum => col(target).sum(),
        }
    }
}

/// Tables of the yearly report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStatistics {
    pub year: i64,
    /// Mean sales per year over the whole dataset, independent of `year`.
    pub overall_yearly_trend: AggregateTable,
    /// Total sales per month of `year`, Jan first.
    pub monthly_sales: AggregateTable,
    pub avg_sales_by_type: AggregateTable,
    pub ad_spend_by_type: AggregateTable,
}

/// Tables of the recession report, all restricted to recession rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecessionStatistics {
    pub yearly_trend: AggregateTable,
    pub avg_sales_by_type: AggregateTable,
    pub ad_spend_by_type: AggregateTable,
    /// Total sales per (unemployment_rate, Vehicle_Type) pair.
    pub unemployment_effect: AggregateTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Report {
    Yearly(YearlyStatistics),
    Recession(RecessionStatistics),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Yearly(_) => ReportKind::Yearly,
            Report::Recession(_) => ReportKind::Recession,
        }
    }

    /// Tables in display order, each with its field name.
    pub fn tables(&self) -> Vec<(&'static str, &AggregateTable)> {
        match self {
            Report::Yearly(stats) => vec![
                ("overall_yearly_trend", &stats.overall_yearly_trend),
                ("monthly_sales", &stats.monthly_sales),
                ("avg_sales_by_type", &stats.avg_sales_by_type),
                ("ad_spend_by_type", &stats.ad_spend_by_type),
            ],
            Report::Recession(stats) => vec![
                ("yearly_trend", &stats.yearly_trend),
                ("avg_sales_by_type", &stats.avg_sales_by_type),
                ("ad_spend_by_type", &stats.ad_spend_by_type),
                ("unemployment_effect", &stats.unemployment_effect),
            ],
        }
    }
}

/// Computes report tables from a borrowed, read-only dataset.
///
/// Every method is a pure function of the dataset and its arguments, so one
/// engine (or many) may serve concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct ReportEngine<'a> {
    dataset: &'a SalesDataset,
}

impl<'a> ReportEngine<'a> {
    pub fn new(dataset: &'a SalesDataset) -> Self {
        Self { dataset }
    }

    /// Years a yearly report can be requested for.
    pub fn available_years(&self) -> Vec<i64> {
        self.dataset.years()
    }

    /// Dispatch a report request.
    ///
    /// A yearly request needs a year. The recession report has no parameters,
    /// so a year passed with it is ignored.
    pub fn run(&self, kind: ReportKind, year: Option<i64>) -> Result<Report, ReportError> {
        match (kind, year) {
            (ReportKind::Yearly, Some(year)) => Ok(Report::Yearly(self.yearly_statistics(year)?)),
            (ReportKind::Yearly, None) => Err(ReportError::MissingYear),
            (ReportKind::Recession, year) => {
                if let Some(year) = year {
                    warn!(year, "year is ignored for the recession report");
                }
                Ok(Report::Recession(self.recession_statistics()?))
            }
        }
    }

    /// Yearly report. A year absent from the dataset gives empty filtered tables.
    pub fn yearly_statistics(&self, year: i64) -> Result<YearlyStatistics, ReportError> {
        info!(year, "computing yearly statistics");
        let all = self.frame();
        let selected = all.clone().filter(col(YEAR).eq(lit(year)));

        let overall_yearly_trend = aggregate(all, &[YEAR], AUTOMOBILE_SALES, Reduction::Mean)?;
        let monthly_sales = aggregate(
            selected.clone(),
            &[MONTH],
            AUTOMOBILE_SALES,
            Reduction::Sum,
        )?;
        let monthly_sales = AggregateTable::new(in_calendar_order(monthly_sales.dataframe())?);
        let avg_sales_by_type = aggregate(
            selected.clone(),
            &[VEHICLE_TYPE],
            AUTOMOBILE_SALES,
            Reduction::Mean,
        )?;
        let ad_spend_by_type = aggregate(
            selected,
            &[VEHICLE_TYPE],
            ADVERTISING_EXPENDITURE,
            Reduction::Sum,
        )?;

        debug!(
            years = overall_yearly_trend.height(),
            months = monthly_sales.height(),
            vehicle_types = avg_sales_by_type.height(),
            "yearly statistics ready"
        );

        Ok(YearlyStatistics {
            year,
            overall_yearly_trend,
            monthly_sales,
            avg_sales_by_type,
            ad_spend_by_type,
        })
    }

    /// Recession report over rows whose recession flag is set.
    pub fn recession_statistics(&self) -> Result<RecessionStatistics, ReportError> {
        info!("computing recession statistics");
        let recession = self.frame().filter(col(RECESSION));

        let yearly_trend = aggregate(
            recession.clone(),
            &[YEAR],
            AUTOMOBILE_SALES,
            Reduction::Mean,
        )?;
        let avg_sales_by_type = aggregate(
            recession.clone(),
            &[VEHICLE_TYPE],
            AUTOMOBILE_SALES,
            Reduction::Mean,
        )?;
        let ad_spend_by_type = aggregate(
            recession.clone(),
            &[VEHICLE_TYPE],
            ADVERTISING_EXPENDITURE,
            Reduction::Sum,
        )?;
        let unemployment_effect = aggregate(
            recession,
            &[UNEMPLOYMENT_RATE, VEHICLE_TYPE],
            AUTOMOBILE_SALES,
            Reduction::Sum,
        )?;

        debug!(
            years = yearly_trend.height(),
            rate_type_pairs = unemployment_effect.height(),
            "recession statistics ready"
        );

        Ok(RecessionStatistics {
            yearly_trend,
            avg_sales_by_type,
            ad_spend_by_type,
            unemployment_effect,
        })
    }

    fn frame(&self) -> LazyFrame {
        self.dataset.dataframe().clone().lazy()
    }
}

/// Group `frame` by `keys`, reduce `target`, and sort by the keys ascending.
///
/// Rows with a null in any key column belong to no group and are skipped.
fn aggregate(
    frame: LazyFrame,
    keys: &[&str],
    target: &str,
    reduction: Reduction,
) -> Result<AggregateTable, ReportError> {
    let by: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    let keyed = keys
        .iter()
        .map(|k| col(*k).is_not_null())
        .reduce(|acc, present| acc.and(present))
        .unwrap_or_else(|| lit(true));
    let df = frame
        .filter(keyed)
        .group_by(by)
        .agg([reduction.expr(target)])
        .sort(keys.to_vec(), SortMultipleOptions::default())
        .collect()?;
    Ok(AggregateTable::new(df))
}

/// Reorder a table with a `Month` column into calendar order.
///
/// Labels outside Jan..Dec sort after December, keeping their relative order.
fn in_calendar_order(table: &DataFrame) -> Result<DataFrame, ReportError> {
    let ranks: Vec<usize> = table
        .column(MONTH)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|m| m.and_then(month_index).unwrap_or(MONTH_ORDER.len()))
        .collect();

    let mut order: Vec<IdxSize> = (0..table.height() as IdxSize).collect();
    order.sort_by_key(|&row| ranks[row as usize]);

    let idx = IdxCa::from_vec("order".into(), order);
    Ok(table.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Month, SalesRecord};

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(&[
            SalesRecord::new(1980, Month::Mar, "Sports", 30.0).with_advertising(300.0),
            SalesRecord::new(1980, Month::Jan, "Sports", 10.0).with_advertising(100.0),
            SalesRecord::new(1980, Month::Jan, "Executivecar", 20.0).with_advertising(50.0),
            SalesRecord::new(1981, Month::Dec, "Sports", 40.0)
                .with_advertising(400.0)
                .with_unemployment(7.2)
                .in_recession(),
            SalesRecord::new(1981, Month::Feb, "Sports", 60.0)
                .with_advertising(600.0)
                .with_unemployment(7.2)
                .in_recession(),
            SalesRecord::new(1982, Month::Jun, "Executivecar", 5.0)
                .with_advertising(10.0)
                .with_unemployment(3.1)
                .in_recession(),
        ])
        .unwrap()
    }

    fn lookup(table: &AggregateTable, key_col: &str, key: &str, value_col: &str) -> Option<f64> {
        let keys = table.str_values(key_col);
        let values = table.f64_values(value_col);
        keys.iter()
            .position(|k| k.as_deref() == Some(key))
            .and_then(|i| values[i])
    }

    #[test]
    fn test_overall_trend_ignores_selected_year() {
        let data = dataset();
        let engine = ReportEngine::new(&data);

        for year in [1980, 1981, 1982, 2050] {
            let stats = engine.yearly_statistics(year).unwrap();
            let trend = &stats.overall_yearly_trend;
            assert_eq!(trend.height(), 3);
            assert_eq!(
                trend.i64_values(YEAR),
                vec![Some(1980), Some(1981), Some(1982)]
            );
            assert_eq!(
                trend.f64_values(AUTOMOBILE_SALES),
                vec![Some(20.0), Some(50.0), Some(5.0)]
            );
        }
    }

    #[test]
    fn test_absent_year_gives_empty_tables() {
        let data = dataset();
        let stats = ReportEngine::new(&data).yearly_statistics(1999).unwrap();

        assert!(stats.monthly_sales.is_empty());
        assert!(stats.avg_sales_by_type.is_empty());
        assert!(stats.ad_spend_by_type.is_empty());
        assert_eq!(
            stats.monthly_sales.column_names(),
            vec![MONTH, AUTOMOBILE_SALES]
        );
    }

    #[test]
    fn test_monthly_sales_in_calendar_order() {
        let data = dataset();
        let stats = ReportEngine::new(&data).yearly_statistics(1980).unwrap();

        assert_eq!(
            stats.monthly_sales.str_values(MONTH),
            vec![Some("Jan".to_string()), Some("Mar".to_string())]
        );
        assert_eq!(
            stats.monthly_sales.f64_values(AUTOMOBILE_SALES),
            vec![Some(30.0), Some(30.0)]
        );

        let stats = ReportEngine::new(&data).yearly_statistics(1981).unwrap();
        assert_eq!(
            stats.monthly_sales.str_values(MONTH),
            vec![Some("Feb".to_string()), Some("Dec".to_string())]
        );
    }

    #[test]
    fn test_yearly_per_type_tables() {
        let data = dataset();
        let stats = ReportEngine::new(&data).yearly_statistics(1980).unwrap();

        assert_eq!(
            stats.avg_sales_by_type.str_values(VEHICLE_TYPE),
            vec![Some("Executivecar".to_string()), Some("Sports".to_string())]
        );
        assert_eq!(
            lookup(&stats.avg_sales_by_type, VEHICLE_TYPE, "Sports", AUTOMOBILE_SALES),
            Some(20.0)
        );
        assert_eq!(
            lookup(
                &stats.ad_spend_by_type,
                VEHICLE_TYPE,
                "Sports",
                ADVERTISING_EXPENDITURE
            ),
            Some(400.0)
        );
        assert_eq!(
            lookup(
                &stats.ad_spend_by_type,
                VEHICLE_TYPE,
                "Executivecar",
                ADVERTISING_EXPENDITURE
            ),
            Some(50.0)
        );
    }

    #[test]
    fn test_recession_statistics_only_uses_flagged_rows() {
        let data = dataset();
        let stats = ReportEngine::new(&data).recession_statistics().unwrap();

        assert_eq!(
            stats.yearly_trend.i64_values(YEAR),
            vec![Some(1981), Some(1982)]
        );
        assert_eq!(
            stats.yearly_trend.f64_values(AUTOMOBILE_SALES),
            vec![Some(50.0), Some(5.0)]
        );
        assert_eq!(
            lookup(&stats.avg_sales_by_type, VEHICLE_TYPE, "Sports", AUTOMOBILE_SALES),
            Some(50.0)
        );
        assert_eq!(
            lookup(
                &stats.ad_spend_by_type,
                VEHICLE_TYPE,
                "Sports",
                ADVERTISING_EXPENDITURE
            ),
            Some(1000.0)
        );
    }

    #[test]
    fn test_unemployment_effect_collapses_pairs() {
        let data = SalesDataset::from_records(&[
            SalesRecord::new(2008, Month::Jan, "Car", 100.0)
                .with_unemployment(7.2)
                .in_recession(),
            SalesRecord::new(2009, Month::Feb, "Car", 50.0)
                .with_unemployment(7.2)
                .in_recession(),
            SalesRecord::new(2009, Month::Mar, "Truck", 5.0)
                .with_unemployment(7.2)
                .in_recession(),
            SalesRecord::new(2009, Month::Apr, "Car", 1.0)
                .with_unemployment(8.0)
                .in_recession(),
            SalesRecord::new(2010, Month::Apr, "Car", 999.0).with_unemployment(7.2),
        ])
        .unwrap();

        let effect = ReportEngine::new(&data)
            .recession_statistics()
            .unwrap()
            .unemployment_effect;

        assert_eq!(
            effect.column_names(),
            vec![UNEMPLOYMENT_RATE, VEHICLE_TYPE, AUTOMOBILE_SALES]
        );
        assert_eq!(
            effect.f64_values(UNEMPLOYMENT_RATE),
            vec![Some(7.2), Some(7.2), Some(8.0)]
        );
        assert_eq!(
            effect.str_values(VEHICLE_TYPE),
            vec![
                Some("Car".to_string()),
                Some("Truck".to_string()),
                Some("Car".to_string())
            ]
        );
        assert_eq!(
            effect.f64_values(AUTOMOBILE_SALES),
            vec![Some(150.0), Some(5.0), Some(1.0)]
        );
    }

    #[test]
    fn test_no_recession_rows_gives_empty_tables() {
        let data =
            SalesDataset::from_records(&[SalesRecord::new(2020, Month::Jan, "Car", 10.0)])
                .unwrap();
        let stats = ReportEngine::new(&data).recession_statistics().unwrap();

        assert!(stats.yearly_trend.is_empty());
        assert!(stats.avg_sales_by_type.is_empty());
        assert!(stats.ad_spend_by_type.is_empty());
        assert!(stats.unemployment_effect.is_empty());
    }

    #[test]
    fn test_queries_are_idempotent() {
        let data = dataset();
        let engine = ReportEngine::new(&data);

        assert_eq!(
            engine.yearly_statistics(1980).unwrap(),
            engine.yearly_statistics(1980).unwrap()
        );
        assert_eq!(
            engine.recession_statistics().unwrap(),
            engine.recession_statistics().unwrap()
        );
    }

    #[test]
    fn test_ten_thousand_rows_stay_accurate() {
        let records: Vec<SalesRecord> = (0..10_000)
            .map(|i| {
                let month = Month::ALL[i % 12];
                SalesRecord::new(2000, month, "Car", 0.1)
                    .with_advertising(1.0e9)
                    .with_unemployment(5.0)
                    .in_recession()
            })
            .collect();
        let data = SalesDataset::from_records(&records).unwrap();
        let engine = ReportEngine::new(&data);

        let yearly = engine.yearly_statistics(2000).unwrap();
        let total: f64 = yearly
            .monthly_sales
            .f64_values(AUTOMOBILE_SALES)
            .into_iter()
            .flatten()
            .sum();
        assert!((total - 1000.0).abs() < 1e-6, "total = {total}");
        assert_eq!(yearly.monthly_sales.height(), 12);

        let mean = lookup(&yearly.avg_sales_by_type, VEHICLE_TYPE, "Car", AUTOMOBILE_SALES)
            .unwrap();
        assert!((mean - 0.1).abs() < 1e-12);

        let spend = lookup(
            &yearly.ad_spend_by_type,
            VEHICLE_TYPE,
            "Car",
            ADVERTISING_EXPENDITURE,
        )
        .unwrap();
        assert_eq!(spend, 1.0e13);

        let recession = engine.recession_statistics().unwrap();
        let effect = recession.unemployment_effect.f64_values(AUTOMOBILE_SALES);
        assert_eq!(effect.len(), 1);
        assert!((effect[0].unwrap() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_end_to_end_monthly_sum() {
        let data = SalesDataset::from_records(&[
            SalesRecord::new(2020, Month::Jan, "Car", 10.0).with_advertising(100.0),
            SalesRecord::new(2020, Month::Jan, "Car", 20.0).with_advertising(200.0),
        ])
        .unwrap();

        let stats = ReportEngine::new(&data).yearly_statistics(2020).unwrap();
        assert_eq!(
            stats.monthly_sales.json_rows(),
            vec![serde_json::json!({"Month": "Jan", "Automobile_Sales": 30.0})]
        );
    }

    #[test]
    fn test_run_dispatch() {
        let data = dataset();
        let engine = ReportEngine::new(&data);

        let report = engine.run(ReportKind::Yearly, Some(1980)).unwrap();
        assert_eq!(report.kind(), ReportKind::Yearly);
        assert_eq!(report.tables().len(), 4);

        assert!(matches!(
            engine.run(ReportKind::Yearly, None),
            Err(ReportError::MissingYear)
        ));

        let report = engine.run(ReportKind::Recession, Some(1980)).unwrap();
        assert_eq!(
            report,
            Report::Recession(engine.recession_statistics().unwrap())
        );
        assert_eq!(engine.available_years(), vec![1980, 1981, 1982]);
    }

    fn dataset_with_gaps() -> SalesDataset {
        let df = DataFrame::new(vec![
            Column::new(YEAR.into(), vec![Some(1980i64), None, Some(1980), Some(1980)]),
            Column::new(MONTH.into(), vec![Some("Jan"), Some("Feb"), Some(" Jan"), None]),
            Column::new(
                VEHICLE_TYPE.into(),
                vec![Some("Car"), None, Some("Car"), Some("Car")],
            ),
            Column::new(AUTOMOBILE_SALES.into(), vec![1.0f64, 2.0, 3.0, 8.0]),
            Column::new(ADVERTISING_EXPENDITURE.into(), vec![10.0f64, 20.0, 30.0, 40.0]),
            Column::new(
                UNEMPLOYMENT_RATE.into(),
                vec![Some(5.0f64), Some(5.0), Some(5.0), None],
            ),
            Column::new(RECESSION.into(), vec![true, true, true, true]),
        ])
        .unwrap();
        SalesDataset::from_dataframe(df).unwrap()
    }

    #[test]
    fn test_yearly_tables_skip_null_keys() {
        let data = dataset_with_gaps();
        let stats = ReportEngine::new(&data).yearly_statistics(1980).unwrap();

        assert_eq!(stats.overall_yearly_trend.i64_values(YEAR), vec![Some(1980)]);
        assert_eq!(
            stats.overall_yearly_trend.f64_values(AUTOMOBILE_SALES),
            vec![Some(4.0)]
        );
        assert_eq!(
            stats.monthly_sales.str_values(MONTH),
            vec![Some("Jan".to_string())]
        );
        assert_eq!(
            stats.monthly_sales.f64_values(AUTOMOBILE_SALES),
            vec![Some(4.0)]
        );
        assert_eq!(
            stats.avg_sales_by_type.str_values(VEHICLE_TYPE),
            vec![Some("Car".to_string())]
        );
        assert_eq!(
            stats.ad_spend_by_type.f64_values(ADVERTISING_EXPENDITURE),
            vec![Some(80.0)]
        );
    }

    #[test]
    fn test_recession_tables_skip_null_keys() {
        let data = dataset_with_gaps();
        let stats = ReportEngine::new(&data).recession_statistics().unwrap();

        assert_eq!(stats.yearly_trend.i64_values(YEAR), vec![Some(1980)]);
        assert_eq!(
            stats.avg_sales_by_type.str_values(VEHICLE_TYPE),
            vec![Some("Car".to_string())]
        );
        assert_eq!(
            stats.avg_sales_by_type.f64_values(AUTOMOBILE_SALES),
            vec![Some(4.0)]
        );
        assert_eq!(
            stats.ad_spend_by_type.f64_values(ADVERTISING_EXPENDITURE),
            vec![Some(80.0)]
        );
        assert_eq!(stats.unemployment_effect.height(), 1);
        assert_eq!(
            stats.unemployment_effect.str_values(VEHICLE_TYPE),
            vec![Some("Car".to_string())]
        );
        assert_eq!(
            stats.unemployment_effect.f64_values(AUTOMOBILE_SALES),
            vec![Some(4.0)]
        );
    }

    #[test]
    fn test_calendar_order_keeps_unknown_labels_last() {
        let df = DataFrame::new(vec![
            Column::new(MONTH.into(), vec!["Nov", "Smarch", "Feb"]),
            Column::new(AUTOMOBILE_SALES.into(), vec![1.0f64, 2.0, 3.0]),
        ])
        .unwrap();

        let ordered = AggregateTable::new(in_calendar_order(&df).unwrap());
        assert_eq!(
            ordered.str_values(MONTH),
            vec![
                Some("Feb".to_string()),
                Some("Nov".to_string()),
                Some("Smarch".to_string())
            ]
        );
    }
}
