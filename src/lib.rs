//! Automobile Sales Dashboard
//!
//! Yearly and recession-period statistics over the historical automobile
//! sales dataset, computed with Polars and rendered as tables, JSON or charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod output;
pub mod report;

pub use data::{DataLoader, DatasetSource, SalesDataset, SalesRecord};
pub use report::{Report, ReportEngine, ReportError, ReportKind};
