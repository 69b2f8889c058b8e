//! Date recognition and ISO-8601 rendering
//!
//! Strings become Date/Time cells only when they match one of the configured
//! patterns. A pattern is a regular expression with named groups `year`,
//! `month` and `day`, plus optional `hour`, `minute`, `second` and
//! `fraction`. The match must also be a real calendar date/time.

use crate::error::{BridgeError, BridgeResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use regex::Regex;

/// `YYYY-MM-DD`
pub const ISO_DATE_PATTERN: &str = r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})$";

/// `YYYY-MM-DD[T ]HH:MM[:SS[.fff]][Z]`
pub const ISO_DATETIME_PATTERN: &str = r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})[T ](?P<hour>\d{2}):(?P<minute>\d{2})(?::(?P<second>\d{2})(?:\.(?P<fraction>\d+))?)?Z?$";

const REQUIRED_GROUPS: [&str; 3] = ["year", "month", "day"];

/// Ordered set of date patterns; the first pattern that yields a valid
/// date/time wins.
#[derive(Debug, Clone)]
pub struct DatePatterns {
    patterns: Vec<Regex>,
}

impl Default for DatePatterns {
    fn default() -> Self {
        // Both defaults are constant and known to compile.
        let patterns = [ISO_DATE_PATTERN, ISO_DATETIME_PATTERN]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }
}

impl DatePatterns {
    /// Build a pattern set from regular expressions.
    ///
    /// Each pattern must compile and declare the `year`, `month` and `day`
    /// named groups.
    pub fn from_patterns<I, S>(patterns: I) -> BridgeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|e| {
                BridgeError::Validation(format!("Invalid date pattern '{}': {}", pattern, e))
            })?;
            let names: Vec<&str> = regex.capture_names().flatten().collect();
            for group in REQUIRED_GROUPS {
                if !names.contains(&group) {
                    return Err(BridgeError::Validation(format!(
                        "Date pattern '{}' is missing the named group '{}'",
                        pattern, group
                    )));
                }
            }
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// A pattern set that recognizes nothing (every string stays text)
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Parse `text` as a date/time, rounded to the nearest second
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        self.patterns
            .iter()
            .find_map(|regex| parse_with(regex, text))
    }

    pub fn is_date(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }
}

fn parse_with(regex: &Regex, text: &str) -> Option<NaiveDateTime> {
    let caps = regex.captures(text)?;
    let field = |name: &str| -> Option<u32> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)?;
    let time = NaiveTime::from_hms_opt(field("hour")?, field("minute")?, field("second")?)?;
    let mut datetime = date.and_time(time);

    if let Some(fraction) = caps.name("fraction") {
        let digits: String = fraction.as_str().chars().take(9).collect();
        let nanos: i64 = format!("{:0<9}", digits).parse().ok()?;
        datetime = datetime.checked_add_signed(TimeDelta::nanoseconds(nanos))?;
    }

    Some(round_to_second(datetime))
}

/// Round to the nearest whole second
pub fn round_to_second(datetime: NaiveDateTime) -> NaiveDateTime {
    let nanos = datetime.nanosecond();
    let truncated = datetime.with_nanosecond(0).unwrap_or(datetime);
    if nanos >= 500_000_000 {
        truncated
            .checked_add_signed(TimeDelta::seconds(1))
            .unwrap_or(truncated)
    } else {
        truncated
    }
}

/// True when the time part is exactly midnight
pub fn is_date_only(datetime: &NaiveDateTime) -> bool {
    datetime.time() == NaiveTime::MIN
}

/// ISO-8601 rendering: `YYYY-MM-DD` at midnight, `YYYY-MM-DDTHH:MM:SS` otherwise
pub fn format_iso(datetime: &NaiveDateTime) -> String {
    if is_date_only(datetime) {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
