//! Civil deadline resolution.
//!
//! Turns a calendar date, a wall-clock time and an IANA zone identifier into
//! an absolute UTC instant using the zone's offset history from `chrono-tz`.
//!
//! ## Transition handling
//! - **Spring-forward gap**: the wall time never occurs. This is detected
//!   structurally: no UTC offset the zone uses near that date maps the
//!   candidate instant back onto the requested calendar fields.
//! - **Fall-back overlap**: the wall time occurs more than once. Every
//!   matching offset is kept, sorted by instant, and the tie-break picks one.
//!
//! The target minute-of-day always comes from the requested wall clock, so
//! both readings of an ambiguous 02:30 track the same civil time.

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{OFFSET_PROBE_SPAN_MINUTES, OFFSET_PROBE_STEP_MINUTES};

const DATE_PATTERN: &str = r"^\s*(\d+)-(\d+)-(\d+)\s*$";
const TIME_PATTERN: &str = r"^\s*(\d{1,2}):(\d{1,2})\s*$";

/// Which instant to pick when a wall time occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    #[default]
    Earlier,
    Later,
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::Earlier => "earlier",
            TieBreak::Later => "later",
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earlier" => Ok(TieBreak::Earlier),
            "later" => Ok(TieBreak::Later),
            other => Err(format!("tie break must be 'earlier' or 'later' (got '{}')", other)),
        }
    }
}

/// Classification of a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineErrorKind {
    InvalidFormat,
    InvalidZone,
    NonexistentWallTime,
}

/// Why a deadline could not be resolved. None of these are fatal; the
/// caller is expected to re-prompt or shift the requested time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeadlineError {
    #[error("Invalid date or time: {0}")]
    InvalidFormat(String),

    #[error("Unknown timezone: {0}")]
    InvalidZone(String),

    #[error("{date} {time} does not exist in {zone} (clocks skip over it)")]
    NonexistentWallTime {
        date: String,
        time: String,
        zone: String,
    },
}

impl DeadlineError {
    pub fn kind(&self) -> DeadlineErrorKind {
        match self {
            DeadlineError::InvalidFormat(_) => DeadlineErrorKind::InvalidFormat,
            DeadlineError::InvalidZone(_) => DeadlineErrorKind::InvalidZone,
            DeadlineError::NonexistentWallTime { .. } => DeadlineErrorKind::NonexistentWallTime,
        }
    }

    pub fn is_nonexistent_wall_time(&self) -> bool {
        self.kind() == DeadlineErrorKind::NonexistentWallTime
    }
}

/// A deadline request as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineInput {
    pub date: String,
    pub time: String,
    pub zone_id: String,
    pub tie_break: TieBreak,
}

impl DeadlineInput {
    pub fn resolve(&self) -> Result<ResolvedDeadline, DeadlineError> {
        resolve(&self.date, &self.time, &self.zone_id, self.tie_break)
    }
}

/// A successfully resolved deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeadline {
    /// The selected absolute instant.
    pub deadline_utc: DateTime<Utc>,
    /// Requested wall clock as minutes after local midnight (0–1439).
    pub target_minutes_of_day: u32,
    /// More than one instant shows this wall clock reading.
    pub ambiguous: bool,
    /// UTC offset of the selected instant, minutes east of UTC.
    pub offset_minutes: i32,
    /// Offsets of every candidate instant, in instant order.
    pub candidate_offsets_minutes: Vec<i32>,
}

impl ResolvedDeadline {
    pub fn deadline_utc_ms(&self) -> i64 {
        self.deadline_utc.timestamp_millis()
    }
}

fn capture_numbers(pattern: &str, input: &str, what: &str) -> Result<Vec<u64>, DeadlineError> {
    let re = Regex::new(pattern).map_err(|e| DeadlineError::InvalidFormat(e.to_string()))?;
    let caps = re
        .captures(input)
        .ok_or_else(|| DeadlineError::InvalidFormat(format!("{} '{}'", what, input)))?;

    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| {
            m.as_str()
                .parse::<u64>()
                .map_err(|_| DeadlineError::InvalidFormat(format!("{} '{}'", what, input)))
        })
        .collect()
}

/// Parse "YYYY-MM-DD" into a calendar date.
fn parse_date(date: &str) -> Result<NaiveDate, DeadlineError> {
    let parts = capture_numbers(DATE_PATTERN, date, "date")?;
    let invalid = || DeadlineError::InvalidFormat(format!("date '{}'", date));

    let (year, month, day) = match parts.as_slice() {
        [y, m, d] if *y > 0 && *m > 0 && *d > 0 => (*y, *m, *d),
        _ => return Err(invalid()),
    };
    let year = i32::try_from(year).map_err(|_| invalid())?;
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let day = u32::try_from(day).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse "HH:MM" into a wall-clock time.
fn parse_time(time: &str) -> Result<NaiveTime, DeadlineError> {
    let parts = capture_numbers(TIME_PATTERN, time, "time")?;
    match parts.as_slice() {
        [h, m] if *h <= 23 && *m <= 59 => NaiveTime::from_hms_opt(*h as u32, *m as u32, 0)
            .ok_or_else(|| DeadlineError::InvalidFormat(format!("time '{}'", time))),
        _ => Err(DeadlineError::InvalidFormat(format!("time '{}'", time))),
    }
}

fn offset_seconds_at(tz: &Tz, instant: &DateTime<Utc>) -> i32 {
    instant.with_timezone(tz).offset().fix().local_minus_utc()
}

/// Every UTC instant at which `tz` shows exactly `local`, ascending.
///
/// Offsets are gathered from the library's own lookup plus a sweep of the
/// zone's offsets around the date, so zones with more than two overlapping
/// readings are handled too.
fn candidate_instants(tz: &Tz, local: NaiveDateTime) -> Vec<DateTime<Utc>> {
    let mut offsets: Vec<i32> = tz
        .from_local_datetime(&local)
        .earliest()
        .into_iter()
        .chain(tz.from_local_datetime(&local).latest())
        .map(|dt| dt.offset().fix().local_minus_utc())
        .collect();

    let span = Duration::minutes(OFFSET_PROBE_SPAN_MINUTES);
    let step = Duration::minutes(OFFSET_PROBE_STEP_MINUTES);
    if let (Some(first), Some(last)) = (local.checked_sub_signed(span), local.checked_add_signed(span)) {
        let mut probe = Utc.from_utc_datetime(&first);
        let probe_end = Utc.from_utc_datetime(&last);
        while probe <= probe_end {
            let offset = offset_seconds_at(tz, &probe);
            if !offsets.contains(&offset) {
                offsets.push(offset);
            }
            match probe.checked_add_signed(step) {
                Some(next) => probe = next,
                None => break,
            }
        }
    }

    let mut instants: Vec<DateTime<Utc>> = offsets
        .into_iter()
        .filter_map(|offset| local.checked_sub_signed(Duration::seconds(offset as i64)))
        .map(|utc| Utc.from_utc_datetime(&utc))
        .filter(|instant| instant.with_timezone(tz).naive_local() == local)
        .collect();
    instants.sort();
    instants.dedup();
    instants
}

/// Resolve a civil deadline to an absolute instant.
///
/// # Arguments
/// * `date` - "YYYY-MM-DD"
/// * `time` - "HH:MM", 24-hour clock
/// * `zone_id` - IANA zone identifier, e.g. "Europe/Prague"
/// * `tie_break` - Which instant to choose inside a fall-back overlap
///
/// # Examples
/// ```
/// use deadline_meridian::deadline::{resolve, TieBreak};
/// let resolved = resolve("2026-03-15", "22:00", "Europe/Prague", TieBreak::Earlier).unwrap();
/// assert_eq!(resolved.target_minutes_of_day, 1320);
/// assert_eq!(resolved.deadline_utc.to_rfc3339(), "2026-03-15T21:00:00+00:00");
/// ```
pub fn resolve(
    date: &str,
    time: &str,
    zone_id: &str,
    tie_break: TieBreak,
) -> Result<ResolvedDeadline, DeadlineError> {
    let calendar_date = parse_date(date)?;
    let wall_time = parse_time(time)?;
    let tz: Tz = zone_id
        .trim()
        .parse()
        .map_err(|_| DeadlineError::InvalidZone(zone_id.to_string()))?;

    let local = calendar_date.and_time(wall_time);
    let instants = candidate_instants(&tz, local);

    let selected = match tie_break {
        TieBreak::Earlier => instants.first(),
        TieBreak::Later => instants.last(),
    }
    .copied()
    .ok_or_else(|| DeadlineError::NonexistentWallTime {
        date: date.trim().to_string(),
        time: time.trim().to_string(),
        zone: zone_id.trim().to_string(),
    })?;

    let offset_minutes = |instant: &DateTime<Utc>| offset_seconds_at(&tz, instant) / 60;
    let target_minutes_of_day = wall_time.hour() * 60 + wall_time.minute();

    Ok(ResolvedDeadline {
        deadline_utc: selected,
        target_minutes_of_day,
        ambiguous: instants.len() > 1,
        offset_minutes: offset_minutes(&selected),
        candidate_offsets_minutes: instants.iter().map(offset_minutes).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test_constants::*;

    #[test]
    fn test_resolve_standard_time() {
        let resolved = resolve(TEST_DATE, TEST_TIME, TEST_ZONE, TieBreak::Earlier).unwrap();
        assert_eq!(resolved.target_minutes_of_day, 1320);
        assert!(!resolved.ambiguous);
        assert_eq!(resolved.offset_minutes, 60);
        assert_eq!(resolved.candidate_offsets_minutes, vec![60]);
        assert_eq!(
            resolved.deadline_utc,
            Utc.with_ymd_and_hms(2026, 3, 15, 21, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_spring_forward_gap_is_nonexistent() {
        let err = resolve(TEST_SPRING_FORWARD_DATE, TEST_OVERLAP_TIME, TEST_ZONE, TieBreak::Earlier)
            .unwrap_err();
        assert!(err.is_nonexistent_wall_time());
        assert_eq!(err.kind(), DeadlineErrorKind::NonexistentWallTime);
    }

    #[test]
    fn test_fall_back_overlap_is_ambiguous() {
        let earlier =
            resolve(TEST_FALL_BACK_DATE, TEST_OVERLAP_TIME, TEST_ZONE, TieBreak::Earlier).unwrap();
        let later =
            resolve(TEST_FALL_BACK_DATE, TEST_OVERLAP_TIME, TEST_ZONE, TieBreak::Later).unwrap();

        assert!(earlier.ambiguous && later.ambiguous);
        assert_eq!(earlier.candidate_offsets_minutes, vec![120, 60]);
        assert_eq!(earlier.offset_minutes, 120);
        assert_eq!(later.offset_minutes, 60);
        assert_eq!(
            later.deadline_utc - earlier.deadline_utc,
            Duration::hours(1)
        );
        // Both choices track the same civil clock reading
        assert_eq!(earlier.target_minutes_of_day, 150);
        assert_eq!(later.target_minutes_of_day, 150);
    }

    #[test]
    fn test_invalid_formats() {
        for (date, time) in [
            ("2026/03/15", "22:00"),
            ("2026-03", "22:00"),
            ("0-03-15", "22:00"),
            ("2026-00-15", "22:00"),
            ("2026-02-30", "22:00"),
            ("2026-03-15", "24:00"),
            ("2026-03-15", "12:60"),
            ("2026-03-15", "noon"),
            ("99999999999-03-15", "22:00"),
        ] {
            let err = resolve(date, time, TEST_ZONE, TieBreak::Earlier).unwrap_err();
            assert_eq!(err.kind(), DeadlineErrorKind::InvalidFormat, "{} {}", date, time);
        }
    }

    #[test]
    fn test_format_checked_before_zone() {
        let err = resolve("bad", "22:00", "Not/AZone", TieBreak::Earlier).unwrap_err();
        assert_eq!(err.kind(), DeadlineErrorKind::InvalidFormat);
    }

    #[test]
    fn test_unknown_zone() {
        let err = resolve(TEST_DATE, TEST_TIME, "Mars/Olympus_Mons", TieBreak::Earlier).unwrap_err();
        assert_eq!(err.kind(), DeadlineErrorKind::InvalidZone);
        assert_eq!(err.to_string(), "Unknown timezone: Mars/Olympus_Mons");
    }

    #[test]
    fn test_single_digit_time_and_whitespace() {
        let resolved = resolve(" 2026-07-01 ", "9:05", " America/New_York ", TieBreak::Later).unwrap();
        assert_eq!(resolved.target_minutes_of_day, 545);
        assert_eq!(resolved.offset_minutes, -240);
    }

    #[test]
    fn test_half_hour_zone() {
        let resolved = resolve("2026-01-10", "08:00", "Asia/Kolkata", TieBreak::Earlier).unwrap();
        assert_eq!(resolved.offset_minutes, 330);
        assert_eq!(
            resolved.deadline_utc,
            Utc.with_ymd_and_hms(2026, 1, 10, 2, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_tie_break_parsing() {
        assert_eq!("Later".parse::<TieBreak>(), Ok(TieBreak::Later));
        assert_eq!(" earlier ".parse::<TieBreak>(), Ok(TieBreak::Earlier));
        assert!("latest".parse::<TieBreak>().is_err());
        assert_eq!(TieBreak::default(), TieBreak::Earlier);
    }

    #[test]
    fn test_input_struct_resolves() {
        let input = DeadlineInput {
            date: TEST_FALL_BACK_DATE.to_string(),
            time: TEST_OVERLAP_TIME.to_string(),
            zone_id: TEST_ZONE.to_string(),
            tie_break: TieBreak::Later,
        };
        let resolved = input.resolve().unwrap();
        assert_eq!(resolved.deadline_utc_ms(), resolved.deadline_utc.timestamp_millis());
        assert!(resolved.candidate_offsets_minutes.len() >= 2);
    }
}
