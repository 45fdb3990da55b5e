use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A closed integer interval `[min, max]`, e.g. `1-5` on a d20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    min: i64,
    max: i64,
}

#[derive(Deserialize)]
struct RawRange {
    min: i64,
    max: i64,
}

impl TryFrom<RawRange> for Range {
    type Error = CoreError;

    fn try_from(raw: RawRange) -> CoreResult<Self> {
        Range::new(raw.min, raw.max)
    }
}

impl Range {
    /// Create a range. Fails if `min > max`.
    pub fn new(min: i64, max: i64) -> CoreResult<Self> {
        if min > max {
            return Err(CoreError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Inclusive upper bound.
    pub fn max(&self) -> i64 {
        self.max
    }

    /// True iff `min <= value <= max`.
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for Range {
    type Err = CoreError;

    /// Parse `min-max`. Negative bounds are not representable in this form.
    fn from_str(s: &str) -> CoreResult<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 2 {
            return Err(CoreError::RangeFormat(s.to_string()));
        }
        let min = parts[0]
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::RangeFormat(s.to_string()))?;
        let max = parts[1]
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::RangeFormat(s.to_string()))?;
        Range::new(min, max)
    }
}
