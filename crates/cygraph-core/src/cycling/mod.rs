//! Cycling domains: the ordered value spaces workflow tasks repeat over.
//!
//! # Overview
//!
//! A [`CyclingDomain`] knows how to parse cycle points and intervals, how to
//! order two points, and how to step a point forward by an interval. The
//! bounds resolver and the suite graph expander are generic over this trait,
//! so integer and calendar cycling share the same code paths.
//!
//! | Domain              | Point example        | Interval example |
//! |---------------------|----------------------|------------------|
//! | [`IntegerDomain`]   | `3`, `+10`, `-2`     | `P1`, `P3`       |
//! | [`GregorianDomain`] | `20200101T0000Z`, `2020-01-01T06:00+06` | `PT6H`, `P1D`, `P1M` |
//!
//! Ordering is always domain-aware. Extended and basic ISO 8601 encodings of
//! the same instant compare equal, and integer points compare numerically.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

pub mod integer;
pub mod iso8601;

pub use integer::{IntegerDomain, IntegerInterval, IntegerPoint};
pub use iso8601::{GregorianDomain, IsoInterval, IsoPoint};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while parsing or stepping cycle points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    /// A raw point string could not be parsed in the given domain.
    #[error("invalid {domain} cycle point {raw:?}: {reason}")]
    InvalidCyclePoint {
        raw: String,
        domain: &'static str,
        reason: String,
    },

    /// A raw interval string could not be parsed in the given domain.
    #[error("invalid {domain} cycle interval {raw:?}: {reason}")]
    InvalidInterval {
        raw: String,
        domain: &'static str,
        reason: String,
    },

    /// Adding an interval moved a point outside the representable range.
    #[error("cycle point {point} + {interval} is out of range")]
    PointOverflow { point: String, interval: String },

    /// The suite time zone is not a valid UTC offset.
    #[error("invalid cycle point time zone {0:?}")]
    InvalidTimeZone(String),
}

impl CycleError {
    /// Stable error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidCyclePoint { .. } => ErrorCode::InvalidCyclePoint,
            Self::InvalidInterval { .. } => ErrorCode::InvalidInterval,
            Self::PointOverflow { .. } => ErrorCode::PointOverflow,
            Self::InvalidTimeZone(_) => ErrorCode::InvalidTimeZone,
        }
    }

    pub(crate) fn point(raw: &str, domain: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidCyclePoint {
            raw: raw.to_string(),
            domain,
            reason: reason.into(),
        }
    }

    pub(crate) fn interval(raw: &str, domain: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInterval {
            raw: raw.to_string(),
            domain,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CyclingDomain
// ---------------------------------------------------------------------------

/// A cycling domain: point parsing, ordering, and interval arithmetic.
///
/// `compare` is the only ordering callers should rely on. Point types are
/// free to keep their original text for display.
pub trait CyclingDomain {
    /// A point in this domain.
    type Point: Clone + fmt::Debug + fmt::Display;
    /// A positive step between points.
    type Interval: Clone + fmt::Debug + fmt::Display;

    /// Short domain name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Parse a raw cycle point.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidCyclePoint`] if `raw` is not a point in
    /// this domain.
    fn parse_point(&self, raw: &str) -> Result<Self::Point, CycleError>;

    /// Parse a raw interval.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidInterval`] if `raw` is not a positive
    /// interval in this domain.
    fn parse_interval(&self, raw: &str) -> Result<Self::Interval, CycleError>;

    /// Domain-aware total ordering of two points.
    fn compare(&self, a: &Self::Point, b: &Self::Point) -> Ordering;

    /// Step `point` forward by `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::PointOverflow`] if the result is not representable.
    fn add(&self, point: &Self::Point, interval: &Self::Interval)
    -> Result<Self::Point, CycleError>;

    /// Interval used by graph sections that do not declare one.
    fn default_interval(&self) -> Self::Interval;

    /// First point of the recurrence `anchor + k * interval` (`k >= 0`) that
    /// is not before `target`.
    ///
    /// The default walks the recurrence one step at a time. Domains with
    /// fixed-size intervals should jump straight there.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::PointOverflow`] if that point is not representable.
    fn first_at_or_after(
        &self,
        anchor: &Self::Point,
        interval: &Self::Interval,
        target: &Self::Point,
    ) -> Result<Self::Point, CycleError> {
        step_until(self, anchor, interval, target)
    }
}

/// Walk `anchor` forward by `interval` until it is no longer before `target`.
pub(crate) fn step_until<D: CyclingDomain + ?Sized>(
    domain: &D,
    anchor: &D::Point,
    interval: &D::Interval,
    target: &D::Point,
) -> Result<D::Point, CycleError> {
    let mut point = anchor.clone();
    while domain.compare(&point, target) == Ordering::Less {
        point = domain.add(&point, interval)?;
    }
    Ok(point)
}

// ---------------------------------------------------------------------------
// CyclingMode
// ---------------------------------------------------------------------------

/// Which cycling domain a suite uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclingMode {
    /// Integer sequence cycling.
    Integer,
    /// Calendar cycling with ISO 8601 points and durations.
    #[default]
    Gregorian,
}

impl fmt::Display for CyclingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Gregorian => f.write_str("gregorian"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_mode_defaults_to_gregorian() {
        assert_eq!(CyclingMode::default(), CyclingMode::Gregorian);
    }

    #[test]
    fn cycling_mode_display_matches_serde_name() {
        assert_eq!(CyclingMode::Integer.to_string(), "integer");
        assert_eq!(CyclingMode::Gregorian.to_string(), "gregorian");
    }

    #[test]
    fn error_codes_map() {
        let err = CycleError::point("x", "integer", "not a number");
        assert_eq!(err.error_code(), ErrorCode::InvalidCyclePoint);
        assert_eq!(
            err.to_string(),
            "invalid integer cycle point \"x\": not a number"
        );
        assert_eq!(
            CycleError::InvalidTimeZone("Q".into()).error_code(),
            ErrorCode::InvalidTimeZone
        );
    }
}
