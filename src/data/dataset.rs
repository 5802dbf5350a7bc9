//! Sales Dataset Module
//! The immutable, schema-checked sales table every report is computed from.

use super::month::{month_index, Month};
use polars::prelude::*;
use thiserror::Error;

pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const VEHICLE_TYPE: &str = "Vehicle_Type";
pub const AUTOMOBILE_SALES: &str = "Automobile_Sales";
pub const ADVERTISING_EXPENDITURE: &str = "Advertising_Expenditure";
pub const UNEMPLOYMENT_RATE: &str = "unemployment_rate";
pub const RECESSION: &str = "Recession";

/// Columns a source table must provide, in the order the dataset keeps them.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    YEAR,
    MONTH,
    VEHICLE_TYPE,
    AUTOMOBILE_SALES,
    ADVERTISING_EXPENDITURE,
    UNEMPLOYMENT_RATE,
    RECESSION,
];

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("Dataset does not match the sales schema: {0}")]
    Schema(#[from] PolarsError),
    #[error("Month column holds {0:?}, expected one of Jan..Dec")]
    UnknownMonth(String),
}

/// One row of the source dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub year: i64,
    pub month: Month,
    pub vehicle_type: String,
    pub automobile_sales: f64,
    pub advertising_expenditure: f64,
    pub unemployment_rate: f64,
    pub recession: bool,
}

impl SalesRecord {
    /// Record with zero advertising spend and unemployment, outside a recession.
    pub fn new(year: i64, month: Month, vehicle_type: &str, automobile_sales: f64) -> Self {
        Self {
            year,
            month,
            vehicle_type: vehicle_type.to_string(),
            automobile_sales,
            advertising_expenditure: 0.0,
            unemployment_rate: 0.0,
            recession: false,
        }
    }

    pub fn with_advertising(mut self, advertising_expenditure: f64) -> Self {
        self.advertising_expenditure = advertising_expenditure;
        self
    }

    pub fn with_unemployment(mut self, unemployment_rate: f64) -> Self {
        self.unemployment_rate = unemployment_rate;
        self
    }

    pub fn in_recession(mut self) -> Self {
        self.recession = true;
        self
    }
}

/// Read-only sales table with a fixed schema.
///
/// Cloning is cheap: polars shares column buffers, so one loaded dataset can
/// be handed to any number of report engines or threads.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    frame: DataFrame,
}

impl SalesDataset {
    /// Validate a raw table and narrow it to the sales schema.
    ///
    /// Extra columns are dropped. Each required column is strictly cast to its
    /// schema type, so malformed values fail here instead of inside a report.
    /// Month and Vehicle_Type labels are stored without surrounding whitespace.
    /// Empty cells stay null; reports skip them when grouping.
    pub fn from_dataframe(df: DataFrame) -> Result<Self, DatasetError> {
        for name in REQUIRED_COLUMNS {
            if df.get_column_index(name).is_none() {
                return Err(DatasetError::MissingColumn(name));
            }
        }

        let frame = df
            .lazy()
            .select([
                col(YEAR).strict_cast(DataType::Int64),
                col(MONTH)
                    .strict_cast(DataType::String)
                    .str()
                    .strip_chars(lit(NULL)),
                col(VEHICLE_TYPE)
                    .strict_cast(DataType::String)
                    .str()
                    .strip_chars(lit(NULL)),
                col(AUTOMOBILE_SALES).strict_cast(DataType::Float64),
                col(ADVERTISING_EXPENDITURE).strict_cast(DataType::Float64),
                col(UNEMPLOYMENT_RATE).strict_cast(DataType::Float64),
                col(RECESSION).strict_cast(DataType::Boolean),
            ])
            .collect()?;

        let months = frame.column(MONTH)?.as_materialized_series().str()?;
        if let Some(bad) = months.into_iter().flatten().find(|m| month_index(m).is_none()) {
            return Err(DatasetError::UnknownMonth(bad.to_string()));
        }

        Ok(Self { frame })
    }

    /// Build a dataset from in-memory records.
    pub fn from_records(records: &[SalesRecord]) -> Result<Self, DatasetError> {
        let df = DataFrame::new(vec![
            Column::new(
                YEAR.into(),
                records.iter().map(|r| r.year).collect::<Vec<i64>>(),
            ),
            Column::new(
                MONTH.into(),
                records.iter().map(|r| r.month.label()).collect::<Vec<&str>>(),
            ),
            Column::new(
                VEHICLE_TYPE.into(),
                records
                    .iter()
                    .map(|r| r.vehicle_type.as_str())
                    .collect::<Vec<&str>>(),
            ),
            Column::new(
                AUTOMOBILE_SALES.into(),
                records
                    .iter()
                    .map(|r| r.automobile_sales)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                ADVERTISING_EXPENDITURE.into(),
                records
                    .iter()
                    .map(|r| r.advertising_expenditure)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                UNEMPLOYMENT_RATE.into(),
                records
                    .iter()
                    .map(|r| r.unemployment_rate)
                    .collect::<Vec<f64>>(),
            ),
            Column::new(
                RECESSION.into(),
                records.iter().map(|r| r.recession).collect::<Vec<bool>>(),
            ),
        ])?;

        Self::from_dataframe(df)
    }

    /// The underlying table. Columns follow [`REQUIRED_COLUMNS`].
    pub fn dataframe(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i64> {
        let mut years: Vec<i64> = self
            .frame
            .column(YEAR)
            .ok()
            .and_then(|col| {
                col.as_materialized_series()
                    .i64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().collect())
            })
            .unwrap_or_default();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Distinct vehicle types, sorted.
    pub fn vehicle_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .frame
            .column(VEHICLE_TYPE)
            .ok()
            .and_then(|col| {
                col.as_materialized_series()
                    .str()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().map(str::to_string).collect())
            })
            .unwrap_or_default();
        types.sort();
        types.dedup();
        types
    }

    /// Number of rows carrying the recession flag.
    pub fn recession_row_count(&self) -> usize {
        self.frame
            .column(RECESSION)
            .ok()
            .and_then(|col| {
                col.as_materialized_series()
                    .bool()
                    .ok()
                    .map(|ca| ca.into_iter().filter(|v| *v == Some(true)).count())
            })
            .unwrap_or(0)
    }
}
