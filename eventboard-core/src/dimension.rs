//! Filterable dimensions of an event.
//!
//! The set is closed: every dimension is known at compile time, and its kind
//! decides how selections are parsed, matched and written back to the URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independent facet events can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Location,
    Host,
    Topic,
    Access,
    Mode,
    Featured,
    Dates,
}

/// How a dimension's selection is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionKind {
    /// Any number of values; an event matches if it shares at least one.
    MultiSelect,
    /// At most one value; an event matches on equality.
    SingleSelect,
    /// A flag that narrows the list when on.
    Toggle,
    /// A `{start, end}` day range.
    DateRange,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Location,
        Dimension::Host,
        Dimension::Topic,
        Dimension::Access,
        Dimension::Mode,
        Dimension::Featured,
        Dimension::Dates,
    ];

    /// Identifier used in mutation calls and configuration.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Location => "location",
            Dimension::Host => "host",
            Dimension::Topic => "topic",
            Dimension::Access => "access",
            Dimension::Mode => "mode",
            Dimension::Featured => "featured",
            Dimension::Dates => "dates",
        }
    }

    pub fn kind(self) -> DimensionKind {
        match self {
            Dimension::Location | Dimension::Host | Dimension::Topic => DimensionKind::MultiSelect,
            Dimension::Access | Dimension::Mode => DimensionKind::SingleSelect,
            Dimension::Featured => DimensionKind::Toggle,
            Dimension::Dates => DimensionKind::DateRange,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }

    /// Dimensions whose options are a list of distinct string values.
    pub fn has_options(self) -> bool {
        matches!(
            self.kind(),
            DimensionKind::MultiSelect | DimensionKind::SingleSelect
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(|d| d.key()).collect();
            format!("Unknown dimension '{}'. Expected one of: {}", s, known.join(", "))
        })
    }
}
