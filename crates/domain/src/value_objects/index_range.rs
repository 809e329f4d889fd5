use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position range in native index units (bin ids or ticks).
///
/// `lower <= current <= upper` is what the range engine aims for, but a range
/// may legitimately sit entirely on one side of the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub lower: i32,
    pub upper: i32,
}

impl Range {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    /// Returns the range if `lower < upper`, otherwise `InvalidRange`.
    pub fn validated(self) -> DomainResult<Self> {
        if self.lower >= self.upper {
            return Err(DomainError::invalid_range(format!(
                "lower {} must be below upper {}",
                self.lower, self.upper
            )));
        }
        Ok(self)
    }

    pub fn contains(&self, index: i32) -> bool {
        index >= self.lower && index <= self.upper
    }

    /// Distance between the bounds in index units.
    pub fn width(&self) -> i64 {
        i64::from(self.upper) - i64::from(self.lower)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated() {
        assert!(Range::new(-10, 10).validated().is_ok());
        assert!(matches!(
            Range::new(10, 10).validated(),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(Range::new(11, 10).validated().is_err());
    }

    #[test]
    fn test_contains_and_width() {
        let range = Range::new(-64, 128);
        assert!(range.contains(-64));
        assert!(range.contains(128));
        assert!(!range.contains(129));
        assert_eq!(range.width(), 192);
        assert_eq!(range.to_string(), "[-64, 128]");
    }
}
