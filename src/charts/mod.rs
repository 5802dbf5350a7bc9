//! Charts module - Chart layout and rendering

mod layout;
mod renderer;

pub use layout::{charts_for, ChartData, ChartKind};
pub use renderer::{ChartError, StaticChartRenderer, DEFAULT_HEIGHT, DEFAULT_WIDTH, PALETTE};
