//! Gregorian cycling: ISO 8601 date-time points and durations.
//!
//! # Accepted point forms
//!
//! ```text
//! date  := YYYY | YYYYMM | YYYY-MM | YYYYMMDD | YYYY-MM-DD
//! time  := HH | HHMM | HH:MM | HHMMSS | HH:MM:SS
//! zone  := Z | ±HH | ±HHMM | ±HH:MM
//! point := date [ "T" time [ zone ] ]
//! ```
//!
//! Points without a zone take the suite's cycle point time zone (UTC unless
//! configured). Every point is normalised to a UTC instant, so
//! `2020-01-01T06:00+06` and `20200101T00Z` are the same point.
//!
//! # Accepted durations
//!
//! `P[nY][nM][nW][nD][T[nH][nM][nS]]`. Years and months are calendar
//! months; everything else is an exact number of seconds.

use std::cmp::Ordering;
use std::fmt;

use chrono::{
    DateTime, FixedOffset, Months, NaiveDate, Offset, TimeDelta, TimeZone, Timelike, Utc,
};
use serde::{Serialize, Serializer};

use super::{CycleError, CyclingDomain, step_until};

const DOMAIN: &str = "gregorian";
const SECONDS_PER_DAY: u64 = 86_400;

// ---------------------------------------------------------------------------
// IsoPoint
// ---------------------------------------------------------------------------

/// A calendar cycle point, held as a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoPoint {
    instant: DateTime<Utc>,
}

impl IsoPoint {
    /// Wrap a UTC instant.
    #[must_use]
    pub const fn from_utc(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// The UTC instant this point denotes.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl fmt::Display for IsoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instant.second() == 0 {
            write!(f, "{}", self.instant.format("%Y%m%dT%H%MZ"))
        } else {
            write!(f, "{}", self.instant.format("%Y%m%dT%H%M%SZ"))
        }
    }
}

impl Serialize for IsoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// IsoInterval
// ---------------------------------------------------------------------------

/// A positive ISO 8601 duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoInterval {
    months: u32,
    exact: TimeDelta,
    text: String,
}

impl fmt::Display for IsoInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// GregorianDomain
// ---------------------------------------------------------------------------

/// The Gregorian calendar cycling domain.
#[derive(Debug, Clone, Copy)]
pub struct GregorianDomain {
    time_zone: FixedOffset,
}

impl Default for GregorianDomain {
    fn default() -> Self {
        Self {
            time_zone: utc_offset(),
        }
    }
}

impl GregorianDomain {
    /// Build a domain whose zoneless points are read in `time_zone`.
    ///
    /// `None` means UTC.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidTimeZone`] if `time_zone` is not
    /// `Z`, `±HH`, `±HHMM` or `±HH:MM`.
    pub fn from_time_zone(time_zone: Option<&str>) -> Result<Self, CycleError> {
        let Some(raw) = time_zone else {
            return Ok(Self::default());
        };
        parse_offset(raw.trim())
            .map(|time_zone| Self { time_zone })
            .ok_or_else(|| CycleError::InvalidTimeZone(raw.to_string()))
    }
}

impl CyclingDomain for GregorianDomain {
    type Point = IsoPoint;
    type Interval = IsoInterval;

    fn name(&self) -> &'static str {
        DOMAIN
    }

    fn parse_point(&self, raw: &str) -> Result<IsoPoint, CycleError> {
        parse_instant(raw.trim(), self.time_zone)
            .map(IsoPoint::from_utc)
            .map_err(|reason| CycleError::point(raw, DOMAIN, reason))
    }

    fn parse_interval(&self, raw: &str) -> Result<IsoInterval, CycleError> {
        parse_duration(raw.trim()).map_err(|reason| CycleError::interval(raw, DOMAIN, reason))
    }

    fn compare(&self, a: &IsoPoint, b: &IsoPoint) -> Ordering {
        a.instant.cmp(&b.instant)
    }

    fn add(&self, point: &IsoPoint, interval: &IsoInterval) -> Result<IsoPoint, CycleError> {
        point
            .instant
            .checked_add_months(Months::new(interval.months))
            .and_then(|instant| instant.checked_add_signed(interval.exact))
            .map(IsoPoint::from_utc)
            .ok_or_else(|| CycleError::PointOverflow {
                point: point.to_string(),
                interval: interval.to_string(),
            })
    }

    fn default_interval(&self) -> IsoInterval {
        IsoInterval {
            months: 0,
            exact: TimeDelta::days(1),
            text: "P1D".to_string(),
        }
    }

    fn first_at_or_after(
        &self,
        anchor: &IsoPoint,
        interval: &IsoInterval,
        target: &IsoPoint,
    ) -> Result<IsoPoint, CycleError> {
        // Calendar months vary in length, so only exact intervals can jump.
        let step = i128::from(interval.exact.num_seconds());
        if interval.months != 0 || step <= 0 || anchor.instant >= target.instant {
            return step_until(self, anchor, interval, target);
        }
        let gap = i128::from((target.instant - anchor.instant).num_seconds());
        let steps = (gap + step - 1) / step;
        let overflow = || CycleError::PointOverflow {
            point: anchor.to_string(),
            interval: interval.to_string(),
        };
        let offset = i64::try_from(steps * step)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(overflow)?;
        let mut point = anchor
            .instant
            .checked_add_signed(offset)
            .map(IsoPoint::from_utc)
            .ok_or_else(overflow)?;
        // Sub-second remainders can leave the jump one step short.
        while point.instant < target.instant {
            point = self.add(&point, interval)?;
        }
        Ok(point)
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parse `digits` of exactly `len` ASCII digits.
fn fixed_digits(digits: &str, len: usize) -> Option<u32> {
    if digits.len() == len && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw == "Z" {
        return Some(utc_offset());
    }
    if !raw.is_ascii() {
        return None;
    }
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.len() {
        2 => (fixed_digits(rest, 2)?, 0),
        4 => (fixed_digits(&rest[..2], 2)?, fixed_digits(&rest[2..], 2)?),
        5 if rest.as_bytes()[2] == b':' => {
            (fixed_digits(&rest[..2], 2)?, fixed_digits(&rest[3..], 2)?)
        }
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    FixedOffset::east_opt(sign * seconds)
}

fn parse_date(raw: &str) -> Result<(i32, u32, u32), String> {
    let fields: Vec<&str> = if raw.contains('-') {
        raw.split('-').collect()
    } else {
        match raw.len() {
            4 => vec![raw],
            6 => vec![&raw[..4], &raw[4..]],
            8 => vec![&raw[..4], &raw[4..6], &raw[6..]],
            _ => return Err(format!("unrecognised date {raw:?}")),
        }
    };
    if fields.is_empty() || fields.len() > 3 {
        return Err(format!("unrecognised date {raw:?}"));
    }
    let year = fixed_digits(fields[0], 4).ok_or_else(|| format!("bad year in {raw:?}"))?;
    let month = match fields.get(1) {
        Some(f) => fixed_digits(f, 2).ok_or_else(|| format!("bad month in {raw:?}"))?,
        None => 1,
    };
    let day = match fields.get(2) {
        Some(f) => fixed_digits(f, 2).ok_or_else(|| format!("bad day in {raw:?}"))?,
        None => 1,
    };
    let year = i32::try_from(year).map_err(|e| e.to_string())?;
    Ok((year, month, day))
}

fn parse_time(raw: &str) -> Result<(u32, u32, u32), String> {
    let fields: Vec<&str> = if raw.contains(':') {
        raw.split(':').collect()
    } else {
        match raw.len() {
            2 => vec![raw],
            4 => vec![&raw[..2], &raw[2..]],
            6 => vec![&raw[..2], &raw[2..4], &raw[4..]],
            _ => return Err(format!("unrecognised time {raw:?}")),
        }
    };
    if fields.is_empty() || fields.len() > 3 {
        return Err(format!("unrecognised time {raw:?}"));
    }
    let mut parts = [0_u32; 3];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        *slot = fixed_digits(field, 2).ok_or_else(|| format!("bad time field in {raw:?}"))?;
    }
    Ok((parts[0], parts[1], parts[2]))
}

fn parse_instant(raw: &str, default_zone: FixedOffset) -> Result<DateTime<Utc>, String> {
    if raw.is_empty() {
        return Err("empty point".to_string());
    }
    if !raw.is_ascii() {
        return Err("non-ASCII characters".to_string());
    }
    let (date_part, time_part) = match raw.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (raw, None),
    };

    let (year, month, day) = parse_date(date_part)?;
    let ((hour, minute, second), zone) = match time_part {
        None => ((0, 0, 0), default_zone),
        Some(time) => {
            let (clock, zone) = match time.find(['Z', '+', '-']) {
                Some(idx) => {
                    let zone = parse_offset(&time[idx..])
                        .ok_or_else(|| format!("bad time zone {:?}", &time[idx..]))?;
                    (&time[..idx], zone)
                }
                None => (time, default_zone),
            };
            (parse_time(clock)?, zone)
        }
    };

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| format!("no such date-time {raw:?}"))?;
    zone.from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("ambiguous local time {raw:?}"))
}

/// Split `P1Y2M`-style text into `(value, designator)` pairs.
fn duration_components(raw: &str) -> Result<Vec<(u64, char)>, String> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return Err(format!("designator {c} has no value"));
            }
            let value = digits.parse::<u64>().map_err(|e| e.to_string())?;
            out.push((value, c));
            digits.clear();
        }
    }
    if !digits.is_empty() {
        return Err(format!("trailing value {digits} has no designator"));
    }
    Ok(out)
}

fn parse_duration(raw: &str) -> Result<IsoInterval, String> {
    let text = raw.to_ascii_uppercase();
    let body = text
        .strip_prefix('P')
        .ok_or_else(|| "duration must start with P".to_string())?;
    let (date, time) = match body.split_once('T') {
        Some((_, "")) => return Err("empty time component".to_string()),
        Some((date, time)) => (date, time),
        None => (body, ""),
    };
    if date.is_empty() && time.is_empty() {
        return Err("empty duration".to_string());
    }

    let overflow = || "duration too large".to_string();
    let mut months: u64 = 0;
    let mut seconds: u64 = 0;
    for (value, unit) in duration_components(date)? {
        let (month_scale, second_scale) = match unit {
            'Y' => (12, 0),
            'M' => (1, 0),
            'W' => (0, 7 * SECONDS_PER_DAY),
            'D' => (0, SECONDS_PER_DAY),
            other => return Err(format!("unknown date designator {other}")),
        };
        months = value
            .checked_mul(month_scale)
            .and_then(|m| months.checked_add(m))
            .ok_or_else(overflow)?;
        seconds = value
            .checked_mul(second_scale)
            .and_then(|s| seconds.checked_add(s))
            .ok_or_else(overflow)?;
    }
    for (value, unit) in duration_components(time)? {
        let scale = match unit {
            'H' => 3600,
            'M' => 60,
            'S' => 1,
            other => return Err(format!("unknown time designator {other}")),
        };
        seconds = value
            .checked_mul(scale)
            .and_then(|s| seconds.checked_add(s))
            .ok_or_else(overflow)?;
    }

    if months == 0 && seconds == 0 {
        return Err("duration must be positive".to_string());
    }
    let months = u32::try_from(months).map_err(|_| overflow())?;
    let exact = i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(overflow)?;
    Ok(IsoInterval {
        months,
        exact,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(raw: &str) -> IsoPoint {
        GregorianDomain::default()
            .parse_point(raw)
            .unwrap_or_else(|e| panic!("{raw}: {e}"))
    }

    #[test]
    fn basic_and_extended_forms_agree() {
        let forms = [
            "20200101T00Z",
            "20200101T0000Z",
            "2020-01-01T00:00Z",
            "2020-01-01T00:00:00Z",
            "2020-01-01",
            "20200101",
            "2020-01",
            "2020",
        ];
        let expected = point("20200101T0000Z");
        for raw in forms {
            assert_eq!(point(raw), expected, "{raw}");
        }
    }

    #[test]
    fn offsets_normalise_to_utc() {
        assert_eq!(point("2020-01-01T06:00+06"), point("20200101T00Z"));
        assert_eq!(point("20200101T0530+0530"), point("20200101T00Z"));
        assert_eq!(point("20191231T1900-05:00"), point("20200101T00Z"));
    }

    #[test]
    fn ordering_is_by_instant_not_text() {
        let d = GregorianDomain::default();
        // Lexically "2020-01-02" < "20200101", but it is the later instant.
        let later = point("2020-01-02");
        let earlier = point("20200101T12Z");
        assert_eq!(d.compare(&earlier, &later), Ordering::Less);
        assert_eq!(d.compare(&later, &earlier), Ordering::Greater);
    }

    #[test]
    fn zoneless_points_use_suite_time_zone() {
        let d = GregorianDomain::from_time_zone(Some("+01:00")).expect("tz");
        let p = d.parse_point("20200101T0100").expect("point");
        assert_eq!(p, point("20200101T00Z"));
        // An explicit zone wins over the suite zone.
        let q = d.parse_point("20200101T0100Z").expect("point");
        assert_eq!(q, point("20200101T01Z"));
    }

    #[test]
    fn rejects_bad_points() {
        let d = GregorianDomain::default();
        for raw in [
            "",
            "abc",
            "202",
            "2020-13-01",
            "2020-02-30",
            "20200101T25Z",
            "20200101T00Q",
            "20200101T00+2",
            "2020-1-1",
        ] {
            let err = d.parse_point(raw).expect_err(raw);
            assert!(matches!(err, CycleError::InvalidCyclePoint { .. }), "{raw}");
        }
    }

    #[test]
    fn rejects_bad_time_zones() {
        for raw in ["UTC", "+25", "+0160", "1", "+01:0", "+0:100", "+010:0", "+01::0"] {
            assert!(
                GregorianDomain::from_time_zone(Some(raw)).is_err(),
                "{raw}"
            );
        }
        assert!(GregorianDomain::from_time_zone(Some("Z")).is_ok());
        assert!(GregorianDomain::from_time_zone(Some("-0930")).is_ok());
    }

    #[test]
    fn display_is_basic_utc() {
        assert_eq!(point("2020-01-01T06:00+06").to_string(), "20200101T0000Z");
        assert_eq!(point("2020-01-01T06:00:30Z").to_string(), "20200101T060030Z");
    }

    #[test]
    fn durations_step_points() {
        let d = GregorianDomain::default();
        let start = point("20200131T00Z");
        let cases = [
            ("PT6H", "20200131T0600Z"),
            ("P1D", "20200201T0000Z"),
            ("P1W", "20200207T0000Z"),
            ("P1M", "20200229T0000Z"),
            ("P1Y", "20210131T0000Z"),
            ("P1DT12H30M", "20200201T1230Z"),
            ("pt90m", "20200131T0130Z"),
        ];
        for (raw, expected) in cases {
            let interval = d.parse_interval(raw).unwrap_or_else(|e| panic!("{raw}: {e}"));
            let next = d.add(&start, &interval).expect("add");
            assert_eq!(next.to_string(), expected, "{raw}");
        }
    }

    #[test]
    fn rejects_bad_durations() {
        let d = GregorianDomain::default();
        for raw in ["", "P", "PT", "P0D", "PT0H", "1D", "P1X", "PT1D", "P1", "PD"] {
            let err = d.parse_interval(raw).expect_err(raw);
            assert!(matches!(err, CycleError::InvalidInterval { .. }), "{raw}");
        }
    }

    #[test]
    fn first_at_or_after_skips_ahead_on_exact_intervals() {
        let d = GregorianDomain::default();
        let minute = d.parse_interval("PT1M").expect("interval");
        let anchor = point("2000-01-01T00:00Z");
        let next = d
            .first_at_or_after(&anchor, &minute, &point("2020-06-01T00:00:30Z"))
            .expect("align");
        assert_eq!(next, point("2020-06-01T00:01Z"));

        let six_hours = d.parse_interval("PT6H").expect("interval");
        let on_grid = d
            .first_at_or_after(&anchor, &six_hours, &point("2010-03-04T12Z"))
            .expect("align");
        assert_eq!(on_grid, point("2010-03-04T12Z"));
    }

    #[test]
    fn first_at_or_after_walks_calendar_months() {
        let d = GregorianDomain::default();
        let month = d.parse_interval("P1M").expect("interval");
        let next = d
            .first_at_or_after(&point("2020-01-31"), &month, &point("2020-03-15"))
            .expect("align");
        // Jan 31 -> Feb 29 -> Mar 29: month steps clamp and stay clamped.
        assert_eq!(next, point("2020-03-29"));
    }

    #[test]
    fn first_at_or_after_keeps_a_later_anchor() {
        let d = GregorianDomain::default();
        let anchor = point("2021");
        let next = d
            .first_at_or_after(&anchor, &d.default_interval(), &point("2020"))
            .expect("align");
        assert_eq!(next, anchor);
    }

    #[test]
    fn default_interval_is_one_day() {
        let d = GregorianDomain::default();
        let next = d.add(&point("2020"), &d.default_interval()).expect("add");
        assert_eq!(next, point("2020-01-02"));
        assert_eq!(d.default_interval().to_string(), "P1D");
    }
}
