//! Report kinds offered by the dashboard.

use super::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Per-year breakdown; needs a year.
    Yearly,
    /// Recession-period breakdown over the whole dataset.
    Recession,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Yearly, ReportKind::Recession];

    /// Label shown in the report selector.
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Yearly => "Yearly Statistics",
            ReportKind::Recession => "Recession Period Statistics",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            ReportKind::Yearly => "yearly",
            ReportKind::Recession => "recession",
        }
    }

    /// Whether a request for this kind must carry a year.
    pub fn requires_year(self) -> bool {
        matches!(self, ReportKind::Yearly)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    /// Accepts the selector label or the short name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportKind::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(wanted)
                    || kind.short_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ReportError::UnknownReportKind(s.to_string()))
    }
}
