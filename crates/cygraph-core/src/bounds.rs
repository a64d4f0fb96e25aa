//! Cycle-range resolution for graphing a suite.
//!
//! The effective range is built from explicit `START`/`STOP` overrides and
//! the suite's configured defaults. A stop point earlier than the start is
//! silently clamped to the start; it never raises.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::cycling::{CycleError, CyclingDomain};

/// Raw default points supplied by the suite configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointDefaults {
    /// Default start point. Always required.
    pub initial_point: String,
    /// Default stop point. `None` means unbounded.
    pub final_point: Option<String>,
}

/// A resolved cycle range.
///
/// When `stop` is present it is never before `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bounds<P> {
    pub start: P,
    pub stop: Option<P>,
}

impl<P> Bounds<P> {
    /// Return `true` if `point` lies within `[start, stop]`.
    ///
    /// An unbounded range contains every point at or after `start`.
    pub fn contains<D>(&self, domain: &D, point: &P) -> bool
    where
        D: CyclingDomain<Point = P>,
    {
        domain.compare(point, &self.start) != Ordering::Less
            && self
                .stop
                .as_ref()
                .is_none_or(|stop| domain.compare(point, stop) != Ordering::Greater)
    }
}

/// Treat blank overrides the same as missing ones.
fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Determine the start and stop points for graphing a suite.
///
/// - `start_override` replaces `defaults.initial_point`.
/// - `stop_override` replaces `defaults.final_point`.
/// - A stop before the start is clamped to the start.
///
/// # Errors
///
/// Returns [`CycleError::InvalidCyclePoint`] if any point that is used
/// cannot be parsed in `domain`.
#[instrument(level = "debug", skip(domain), fields(domain = domain.name()))]
pub fn resolve_bounds<D: CyclingDomain>(
    domain: &D,
    defaults: &PointDefaults,
    start_override: Option<&str>,
    stop_override: Option<&str>,
) -> Result<Bounds<D::Point>, CycleError> {
    let start_raw = non_blank(start_override).unwrap_or(defaults.initial_point.as_str());
    let stop_raw = non_blank(stop_override).or_else(|| non_blank(defaults.final_point.as_deref()));

    let start = domain.parse_point(start_raw)?;
    let stop = match stop_raw {
        None => None,
        Some(raw) => {
            let stop = domain.parse_point(raw)?;
            if domain.compare(&stop, &start) == Ordering::Less {
                debug!(%stop, %start, "stop point before start point; clamping to start");
                Some(start.clone())
            } else {
                Some(stop)
            }
        }
    };

    Ok(Bounds { start, stop })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycling::{GregorianDomain, IntegerDomain, IntegerPoint};

    fn defaults(initial: &str, final_point: Option<&str>) -> PointDefaults {
        PointDefaults {
            initial_point: initial.to_string(),
            final_point: final_point.map(str::to_string),
        }
    }

    #[test]
    fn uses_defaults_when_no_overrides() {
        let b = resolve_bounds(&IntegerDomain, &defaults("1", Some("5")), None, None)
            .expect("bounds");
        assert_eq!(b.start, IntegerPoint(1));
        assert_eq!(b.stop, Some(IntegerPoint(5)));
    }

    #[test]
    fn missing_final_point_is_unbounded() {
        let b = resolve_bounds(&IntegerDomain, &defaults("1", None), None, None).expect("bounds");
        assert_eq!(b.stop, None);
    }

    #[test]
    fn overrides_replace_defaults() {
        let b = resolve_bounds(&IntegerDomain, &defaults("1", Some("5")), Some("2"), Some("3"))
            .expect("bounds");
        assert_eq!(b.start, IntegerPoint(2));
        assert_eq!(b.stop, Some(IntegerPoint(3)));
    }

    #[test]
    fn blank_overrides_fall_back_to_defaults() {
        let b = resolve_bounds(&IntegerDomain, &defaults("1", Some("5")), Some(""), Some("  "))
            .expect("bounds");
        assert_eq!(b.start, IntegerPoint(1));
        assert_eq!(b.stop, Some(IntegerPoint(5)));
    }

    #[test]
    fn stop_before_start_is_clamped() {
        let b = resolve_bounds(&IntegerDomain, &defaults("1", None), Some("9"), Some("3"))
            .expect("bounds");
        assert_eq!(b.start, IntegerPoint(9));
        assert_eq!(b.stop, Some(IntegerPoint(9)));
    }

    #[test]
    fn default_stop_before_override_start_is_clamped() {
        let b = resolve_bounds(&IntegerDomain, &defaults("1", Some("4")), Some("7"), None)
            .expect("bounds");
        assert_eq!(b.stop, Some(IntegerPoint(7)));
    }

    #[test]
    fn clamping_uses_domain_ordering_not_text() {
        // "2020-01-02" sorts before "20200101T12Z" as text, but is later.
        let d = GregorianDomain::default();
        let b = resolve_bounds(&d, &defaults("20200101T12Z", Some("2020-01-02")), None, None)
            .expect("bounds");
        assert_eq!(b.stop.map(|p| p.to_string()).as_deref(), Some("20200102T0000Z"));

        // Same instant in a different zone is not "before".
        let b = resolve_bounds(
            &d,
            &defaults("20200101T00Z", Some("2019-12-31T19:00-05:00")),
            None,
            None,
        )
        .expect("bounds");
        assert_eq!(b.stop, Some(b.start));
    }

    #[test]
    fn invalid_points_are_reported() {
        let err = resolve_bounds(&IntegerDomain, &defaults("x", None), None, None)
            .expect_err("bad start");
        assert!(matches!(err, CycleError::InvalidCyclePoint { ref raw, .. } if raw == "x"));

        let err = resolve_bounds(&IntegerDomain, &defaults("1", None), None, Some("nope"))
            .expect_err("bad stop");
        assert!(matches!(err, CycleError::InvalidCyclePoint { ref raw, .. } if raw == "nope"));
    }

    #[test]
    fn contains_respects_both_ends() {
        let d = IntegerDomain;
        let bounded = Bounds {
            start: IntegerPoint(2),
            stop: Some(IntegerPoint(4)),
        };
        assert!(!bounded.contains(&d, &IntegerPoint(1)));
        assert!(bounded.contains(&d, &IntegerPoint(2)));
        assert!(bounded.contains(&d, &IntegerPoint(4)));
        assert!(!bounded.contains(&d, &IntegerPoint(5)));

        let open = Bounds {
            start: IntegerPoint(2),
            stop: None,
        };
        assert!(open.contains(&d, &IntegerPoint(1_000)));
    }
}
