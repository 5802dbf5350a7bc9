//! Report module - yearly and recession aggregations

mod engine;
mod kind;
mod table;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use engine::{RecessionStatistics, Report, ReportEngine, YearlyStatistics};
pub use kind::ReportKind;
pub use table::AggregateTable;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Aggregation failed: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unknown report kind {0:?}; expected \"Yearly Statistics\" or \"Recession Period Statistics\"")]
    UnknownReportKind(String),
    #[error("The yearly report needs a year")]
    MissingYear,
}
