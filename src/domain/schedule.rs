//! Scheduling primitives: time ranges, work-day masks and slot generation.
//!
//! Everything here is pure and works on UTC wall-clock values.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::DEFAULT_WORK_DAYS;
use crate::errors::{AppError, AppResult};

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range starting at `start` and lasting `minutes`.
    ///
    /// Fails when the end falls outside the representable calendar.
    pub fn starting_at(start: DateTime<Utc>, minutes: i32) -> AppResult<Self> {
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(minutes)))
            .ok_or_else(|| AppError::validation("Appointment end is out of range"))?;
        Ok(Self { start, end })
    }

    /// Touching ranges (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// The UTC day `[date 00:00, date+1 00:00)`.
pub fn day_range(date: NaiveDate) -> TimeRange {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    TimeRange::new(start, start + Duration::days(1))
}

/// Inclusive date span as a half-open instant range.
pub fn date_span(from: NaiveDate, to: NaiveDate) -> TimeRange {
    TimeRange::new(day_range(from).start, day_range(to).end)
}

/// Seven-day work mask, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkDays([bool; 7]);

impl WorkDays {
    /// Parse a 7-character `0`/`1` mask.
    pub fn parse(mask: &str) -> Option<Self> {
        if mask.len() != 7 {
            return None;
        }

        let mut days = [false; 7];
        for (slot, ch) in days.iter_mut().zip(mask.chars()) {
            *slot = match ch {
                '1' => true,
                '0' => false,
                _ => return None,
            };
        }
        Some(Self(days))
    }

    /// Lenient parse for stored values: malformed masks fall back to the default.
    pub fn from_stored(mask: &str) -> Self {
        Self::parse(mask).unwrap_or_default()
    }

    pub fn works_on(&self, weekday: Weekday) -> bool {
        self.0[weekday.num_days_from_monday() as usize]
    }

    pub fn works_on_date(&self, date: NaiveDate) -> bool {
        self.works_on(date.weekday())
    }

    pub fn as_mask(&self) -> String {
        self.0.iter().map(|d| if *d { '1' } else { '0' }).collect()
    }
}

impl Default for WorkDays {
    fn default() -> Self {
        Self::parse(DEFAULT_WORK_DAYS).unwrap_or(Self([true, true, true, true, true, false, false]))
    }
}

impl Serialize for WorkDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_mask())
    }
}

impl<'de> Deserialize<'de> for WorkDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        WorkDays::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom("work days must be 7 characters of 0/1, Monday first")
        })
    }
}

/// Parse `HH:MM` (seconds are accepted and ignored).
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Serde adapter for optional `HH:MM` fields.
pub mod hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&format_hhmm(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_hhmm(s.trim())
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", s))),
        }
    }
}

/// Start times on `date` where a `duration`-minute slot fits in the working
/// window and overlaps none of `busy`.
pub fn available_slots(
    date: NaiveDate,
    work_start: NaiveTime,
    work_end: NaiveTime,
    interval_minutes: i32,
    duration_minutes: i32,
    busy: &[TimeRange],
) -> Vec<NaiveTime> {
    if interval_minutes <= 0 || duration_minutes <= 0 || work_start >= work_end {
        return Vec::new();
    }

    let day_start = Utc.from_utc_datetime(&date.and_time(work_start));
    let day_end = Utc.from_utc_datetime(&date.and_time(work_end));
    let step = Duration::minutes(i64::from(interval_minutes));

    let mut slots = Vec::new();
    let mut cursor = day_start;
    loop {
        let Ok(candidate) = TimeRange::starting_at(cursor, duration_minutes) else {
            break;
        };
        if candidate.end > day_end {
            break;
        }
        if !busy.iter().any(|b| b.overlaps(&candidate)) {
            slots.push(cursor.time());
        }
        cursor += step;
    }
    slots
}

/// Number of `interval`-minute slots in a working window.
pub fn slot_capacity(work_start: NaiveTime, work_end: NaiveTime, interval_minutes: i32) -> u64 {
    if interval_minutes <= 0 || work_start >= work_end {
        return 0;
    }
    let minutes = (work_end - work_start).num_minutes();
    (minutes / i64::from(interval_minutes)) as u64
}
