//! Aggregate Table Module
//! Ordered summary rows produced by one group-and-reduce operation.

use polars::prelude::*;
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Result of one group-by-reduce over the sales dataset.
///
/// Key columns come first, followed by the single reduced value column.
/// The table is detached from the dataset it was computed from.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    frame: DataFrame,
}

impl AggregateTable {
    pub(crate) fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Values of a numeric column as `f64`. Missing column yields an empty list.
    pub fn f64_values(&self, column: &str) -> Vec<Option<f64>> {
        self.frame
            .column(column)
            .ok()
            .and_then(|col| col.cast(&DataType::Float64).ok())
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    pub fn i64_values(&self, column: &str) -> Vec<Option<i64>> {
        self.frame
            .column(column)
            .ok()
            .and_then(|col| {
                col.as_materialized_series()
                    .i64()
                    .ok()
                    .map(|ca| ca.into_iter().collect())
            })
            .unwrap_or_default()
    }

    pub fn str_values(&self, column: &str) -> Vec<Option<String>> {
        self.frame
            .column(column)
            .ok()
            .and_then(|col| {
                col.as_materialized_series()
                    .str()
                    .ok()
                    .map(|ca| ca.into_iter().map(|v| v.map(str::to_string)).collect())
            })
            .unwrap_or_default()
    }

    /// Rows as JSON objects keyed by column name.
    pub fn json_rows(&self) -> Vec<Value> {
        let columns = self.frame.get_columns();
        (0..self.frame.height())
            .map(|i| {
                let mut row = Map::new();
                for column in columns {
                    let value = column
                        .get(i)
                        .map(json_value)
                        .unwrap_or(Value::Null);
                    row.insert(column.name().to_string(), value);
                }
                Value::Object(row)
            })
            .collect()
    }
}

impl PartialEq for AggregateTable {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl fmt::Display for AggregateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)
    }
}

impl Serialize for AggregateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.json_rows())
    }
}

fn json_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_value(v as f64),
        AnyValue::Float64(v) => float_value(v),
        AnyValue::String(s) => Value::from(s),
        AnyValue::StringOwned(s) => Value::from(s.as_str()),
        other => Value::String(other.to_string()),
    }
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
