//! Calendar month labels used by the `Month` column.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Month labels in calendar order. The position of a label is its sort key.
pub const MONTH_ORDER: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown month label: {0:?}")]
pub struct UnknownMonth(pub String);

/// Calendar month as stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Zero-based calendar position (Jan = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        MONTH_ORDER[self.index()]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        month_index(s)
            .map(|idx| Month::ALL[idx])
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

/// Calendar position of a month label, `None` for anything outside Jan..Dec.
pub fn month_index(label: &str) -> Option<usize> {
    let label = label.trim();
    MONTH_ORDER.iter().position(|m| *m == label)
}
