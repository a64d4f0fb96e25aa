//! Integer cycling: points are signed sequence numbers, intervals are `P<n>`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use super::{CycleError, CyclingDomain};

const DOMAIN: &str = "integer";

/// A point in integer cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntegerPoint(pub i64);

impl fmt::Display for IntegerPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for IntegerPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A positive step in integer cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerInterval(pub i64);

impl fmt::Display for IntegerInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// The integer cycling domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerDomain;

impl CyclingDomain for IntegerDomain {
    type Point = IntegerPoint;
    type Interval = IntegerInterval;

    fn name(&self) -> &'static str {
        DOMAIN
    }

    fn parse_point(&self, raw: &str) -> Result<IntegerPoint, CycleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CycleError::point(raw, DOMAIN, "empty point"));
        }
        trimmed
            .parse::<i64>()
            .map(IntegerPoint)
            .map_err(|e| CycleError::point(raw, DOMAIN, e.to_string()))
    }

    fn parse_interval(&self, raw: &str) -> Result<IntegerInterval, CycleError> {
        let trimmed = raw.trim();
        let Some(digits) = trimmed
            .strip_prefix('P')
            .or_else(|| trimmed.strip_prefix('p'))
        else {
            return Err(CycleError::interval(raw, DOMAIN, "expected P<n>"));
        };
        let step = digits
            .parse::<i64>()
            .map_err(|e| CycleError::interval(raw, DOMAIN, e.to_string()))?;
        if step <= 0 {
            return Err(CycleError::interval(raw, DOMAIN, "interval must be positive"));
        }
        Ok(IntegerInterval(step))
    }

    fn compare(&self, a: &IntegerPoint, b: &IntegerPoint) -> Ordering {
        a.cmp(b)
    }

    fn add(
        &self,
        point: &IntegerPoint,
        interval: &IntegerInterval,
    ) -> Result<IntegerPoint, CycleError> {
        point
            .0
            .checked_add(interval.0)
            .map(IntegerPoint)
            .ok_or_else(|| CycleError::PointOverflow {
                point: point.to_string(),
                interval: interval.to_string(),
            })
    }

    fn default_interval(&self) -> IntegerInterval {
        IntegerInterval(1)
    }

    fn first_at_or_after(
        &self,
        anchor: &IntegerPoint,
        interval: &IntegerInterval,
        target: &IntegerPoint,
    ) -> Result<IntegerPoint, CycleError> {
        if anchor >= target {
            return Ok(*anchor);
        }
        let gap = i128::from(target.0) - i128::from(anchor.0);
        let step = i128::from(interval.0);
        let steps = (gap + step - 1) / step;
        i64::try_from(i128::from(anchor.0) + steps * step)
            .map(IntegerPoint)
            .map_err(|_| CycleError::PointOverflow {
                point: anchor.to_string(),
                interval: interval.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_points() {
        let d = IntegerDomain;
        assert_eq!(d.parse_point("3").ok(), Some(IntegerPoint(3)));
        assert_eq!(d.parse_point("+10").ok(), Some(IntegerPoint(10)));
        assert_eq!(d.parse_point(" -2 ").ok(), Some(IntegerPoint(-2)));
    }

    #[test]
    fn rejects_garbage_points() {
        let d = IntegerDomain;
        for raw in ["", "  ", "1.5", "abc", "20200101T00Z"] {
            let err = d.parse_point(raw).expect_err(raw);
            assert!(matches!(err, CycleError::InvalidCyclePoint { .. }), "{raw}");
        }
    }

    #[test]
    fn first_at_or_after_jumps_to_the_recurrence() {
        let d = IntegerDomain;
        let at = |anchor, step, target| {
            d.first_at_or_after(&IntegerPoint(anchor), &IntegerInterval(step), &IntegerPoint(target))
        };
        assert_eq!(at(1, 1, 2_000_000).ok(), Some(IntegerPoint(2_000_000)));
        assert_eq!(at(1, 3, 8).ok(), Some(IntegerPoint(10)));
        assert_eq!(at(1, 3, 7).ok(), Some(IntegerPoint(7)));
        assert_eq!(at(5, 2, -10).ok(), Some(IntegerPoint(5)));
        assert_eq!(at(-7, 4, 0).ok(), Some(IntegerPoint(1)));
        assert!(matches!(
            at(0, i64::MAX / 2 + 1, i64::MAX),
            Err(CycleError::PointOverflow { .. })
        ));
    }

    #[test]
    fn compares_numerically_not_lexically() {
        let d = IntegerDomain;
        let nine = d.parse_point("9").expect("9");
        let ten = d.parse_point("10").expect("10");
        assert_eq!(d.compare(&nine, &ten), Ordering::Less);
        assert!("9" > "10", "lexical order disagrees");
    }

    #[test]
    fn parses_intervals() {
        let d = IntegerDomain;
        assert_eq!(d.parse_interval("P1").ok(), Some(IntegerInterval(1)));
        assert_eq!(d.parse_interval("P12").ok(), Some(IntegerInterval(12)));
        assert!(d.parse_interval("P0").is_err());
        assert!(d.parse_interval("P-1").is_err());
        assert!(d.parse_interval("3").is_err());
        assert!(d.parse_interval("PT1H").is_err());
    }

    #[test]
    fn add_steps_and_detects_overflow() {
        let d = IntegerDomain;
        let p = d.add(&IntegerPoint(4), &IntegerInterval(3)).expect("add");
        assert_eq!(p, IntegerPoint(7));

        let err = d
            .add(&IntegerPoint(i64::MAX), &IntegerInterval(1))
            .expect_err("overflow");
        assert!(matches!(err, CycleError::PointOverflow { .. }));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let d = IntegerDomain;
        assert_eq!(IntegerPoint(-4).to_string(), "-4");
        assert_eq!(d.default_interval().to_string(), "P1");
    }
}
