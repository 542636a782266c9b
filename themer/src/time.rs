//! Time and date tags
//!
//! Posts carry a Unix timestamp; themes print it through tags such as `{Month}` or
//! `{TimeAgo}`. [`TimeTags`] is the table from tag name to formatter. Build it once and
//! pass it to whoever renders dates. All timestamps are formatted in UTC.

use chrono::{DateTime, Datelike, Timelike, Utc};
use indexmap::IndexMap;

use crate::data::{Map, Value};
use crate::error::{Result, ThemerError};

/// How one tag renders a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// A `strftime` pattern
    Pattern(&'static str),
    /// English ordinal suffix of the day of the month
    DaySuffix,
    /// Zero-based day of the year
    DayOfYear,
    /// Swatch Internet time
    Beats,
    Timestamp,
    /// Relative to the time of rendering
    TimeAgo,
}

/// Table of time/date tags
#[derive(Debug, Clone)]
pub struct TimeTags {
    formats: IndexMap<&'static str, Format>,
}

impl Default for TimeTags {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeTags {
    pub fn new() -> Self {
        let formats = IndexMap::from([
            ("DayOfMonth", Format::Pattern("%-d")),
            ("DayOfMonthWithZero", Format::Pattern("%d")),
            ("DayOfWeek", Format::Pattern("%A")),
            ("ShortDayOfWeek", Format::Pattern("%a")),
            ("DayOfWeekNumber", Format::Pattern("%u")),
            ("DayOfMonthSuffix", Format::DaySuffix),
            ("DayOfYear", Format::DayOfYear),
            ("WeekOfYear", Format::Pattern("%V")),
            ("Month", Format::Pattern("%B")),
            ("ShortMonth", Format::Pattern("%b")),
            ("MonthNumber", Format::Pattern("%-m")),
            ("MonthNumberWithZero", Format::Pattern("%m")),
            ("Year", Format::Pattern("%Y")),
            ("ShortYear", Format::Pattern("%y")),
            ("AmPm", Format::Pattern("%P")),
            ("CapitalAmPm", Format::Pattern("%p")),
            ("12Hour", Format::Pattern("%-I")),
            ("24Hour", Format::Pattern("%-H")),
            ("12HourWithZero", Format::Pattern("%I")),
            ("24HourWithZero", Format::Pattern("%H")),
            ("Minutes", Format::Pattern("%M")),
            ("Seconds", Format::Pattern("%S")),
            ("Beats", Format::Beats),
            ("Timestamp", Format::Timestamp),
            ("TimeAgo", Format::TimeAgo),
        ]);
        Self { formats }
    }

    /// Tag names, in table order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.keys().copied()
    }

    /// Formats a timestamp for one tag
    pub fn tag(&self, timestamp: i64, name: &str, now: i64) -> Result<String> {
        let format = self
            .formats
            .get(name)
            .ok_or_else(|| ThemerError::InvalidTimeTag(name.to_string()))?;
        Ok(render(*format, timestamp, now))
    }

    /// Formats a timestamp for every tag
    pub fn tags(&self, timestamp: i64, now: i64) -> Map {
        self.formats
            .iter()
            .map(|(name, format)| (name.to_string(), Value::Text(render(*format, timestamp, now))))
            .collect()
    }
}

/// Whether the timestamp falls in the range dates can be formatted for
pub fn is_formattable(timestamp: i64) -> bool {
    DateTime::from_timestamp(timestamp, 0).is_some()
}

fn datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

fn render(format: Format, timestamp: i64, now: i64) -> String {
    let time = datetime(timestamp);
    match format {
        Format::Pattern(pattern) => time.format(pattern).to_string(),
        Format::DaySuffix => day_suffix(time.day()).to_string(),
        Format::DayOfYear => time.ordinal0().to_string(),
        Format::Beats => {
            // Biel Mean Time is UTC+1
            let seconds = (time.num_seconds_from_midnight() + 3600) % 86_400;
            format!("{:03}", (f64::from(seconds) / 86.4) as u32)
        }
        Format::Timestamp => timestamp.to_string(),
        Format::TimeAgo => relative(timestamp, now),
    }
}

fn day_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Describes how long before `now` the timestamp was.
///
/// Each step rounds to the nearest unit; four weeks and beyond print the date instead.
pub fn relative(timestamp: i64, now: i64) -> String {
    let diff = now.saturating_sub(timestamp);
    if diff < 60 {
        return format!("{diff} second{} ago", plural(diff));
    }

    let mut diff = diff as f64;
    let steps = [
        ("minute", 60.0, 60.0),
        ("hour", 60.0, 24.0),
        ("day", 24.0, 7.0),
        ("week", 7.0, 4.0),
    ];
    for (unit, size, limit) in steps {
        diff = (diff / size).round();
        if diff < limit {
            let n = diff as i64;
            return format!("{n} {unit}{} ago", plural(n));
        }
    }

    format!("on {}", datetime(timestamp).format("%B %-d, %Y"))
}
