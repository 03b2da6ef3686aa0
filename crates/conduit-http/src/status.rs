//! Accepted response status ranges.

use std::fmt;

/// Range used by every request helper unless the caller overrides it.
pub const DEFAULT_STATUS_RANGE: StatusRange = StatusRange { min: 200, max: 400 };

/// Half-open interval `[min, max)` of status codes considered a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusRange {
    min: u16,
    max: u16,
}

/// Returned when a range would have `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status range: min {min} is greater than max {max}")]
pub struct InvalidStatusRange {
    pub min: u16,
    pub max: u16,
}

impl StatusRange {
    /// Create a range accepting `min <= code < max`.
    pub fn new(min: u16, max: u16) -> Result<Self, InvalidStatusRange> {
        if min > max {
            return Err(InvalidStatusRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range accepting exactly one status code.
    pub fn exact(code: u16) -> Self {
        Self {
            min: code,
            max: code.saturating_add(1),
        }
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Exclusive upper bound.
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Whether `code` falls inside the range.
    pub fn contains(&self, code: u16) -> bool {
        self.min <= code && code < self.max
    }
}

impl Default for StatusRange {
    fn default() -> Self {
        DEFAULT_STATUS_RANGE
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}
