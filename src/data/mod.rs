//! Data module - dataset loading and schema

mod dataset;
mod loader;
mod month;

pub use dataset::{
    DatasetError, SalesDataset, SalesRecord, ADVERTISING_EXPENDITURE, AUTOMOBILE_SALES, MONTH,
    RECESSION, REQUIRED_COLUMNS, UNEMPLOYMENT_RATE, VEHICLE_TYPE, YEAR,
};
pub use loader::{
    DataLoader, DatasetSource, LoaderError, DEFAULT_DATASET_URL, DEFAULT_INFER_SCHEMA_LENGTH,
};
pub use month::{month_index, Month, UnknownMonth, MONTH_ORDER};
