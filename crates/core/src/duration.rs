#![forbid(unsafe_code)]

//! RFC 5545 `DURATION` values.
//!
//! A duration has a nominal part (weeks and days, which follow the wall clock
//! of the task's timezone) and an exact part (hours, minutes, seconds).

use chrono::{DateTime, Days};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_DAY: i64 = 86_400_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Duration {
    negative: bool,
    weeks: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("duration must start with 'P'")]
    MissingDesignator,
    #[error("duration has no components")]
    NoComponents,
    #[error("unexpected character {ch:?} at {index}")]
    UnexpectedChar { ch: char, index: usize },
    #[error("duration component out of order: {unit}")]
    OutOfOrder { unit: char },
    #[error("duration value overflows")]
    Overflow,
}

impl Duration {
    pub fn from_parts(days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            negative: false,
            weeks: 0,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Weeks and days, in days.
    pub fn nominal_days(&self) -> i64 {
        i64::from(self.weeks) * 7 + i64::from(self.days)
    }

    /// Hours, minutes and seconds, in milliseconds.
    pub fn exact_ms(&self) -> i64 {
        (i64::from(self.hours) * 3_600 + i64::from(self.minutes) * 60 + i64::from(self.seconds))
            * MS_PER_SECOND
    }

    fn sign(&self) -> i64 {
        if self.negative { -1 } else { 1 }
    }

    /// Adds this duration to an instant.
    ///
    /// With a zone, the nominal part advances the local calendar date so a
    /// one-day duration spans 23 or 25 hours across a DST change. Without a
    /// zone (floating and all-day values) every day is 24 hours. `None` when
    /// the result leaves the `i64` millisecond range.
    pub fn add_to(&self, start_ms: i64, zone: Option<Tz>) -> Option<i64> {
        let days = self.nominal_days().checked_mul(self.sign())?;
        let fixed_days = || days.checked_mul(MS_PER_DAY)?.checked_add(start_ms);
        let shifted = match zone {
            Some(zone) if days != 0 => match add_local_days(start_ms, days, zone) {
                Some(shifted) => shifted,
                None => fixed_days()?,
            },
            _ => fixed_days()?,
        };
        shifted.checked_add(self.exact_ms().checked_mul(self.sign())?)
    }
}

fn add_local_days(start_ms: i64, days: i64, zone: Tz) -> Option<i64> {
    use chrono::TimeZone;

    let local = DateTime::from_timestamp_millis(start_ms)?
        .with_timezone(&zone)
        .naive_local();
    let magnitude = Days::new(days.unsigned_abs());
    let moved = if days >= 0 {
        local.checked_add_days(magnitude)?
    } else {
        local.checked_sub_days(magnitude)?
    };
    zone.from_local_datetime(&moved)
        .earliest()
        .map(|value| value.timestamp_millis())
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DurationError::Empty);
        }

        let mut out = Duration::default();
        let mut chars = value.char_indices().peekable();

        match chars.peek() {
            Some((_, '-')) => {
                out.negative = true;
                chars.next();
            }
            Some((_, '+')) => {
                chars.next();
            }
            _ => {}
        }

        match chars.next() {
            Some((_, 'P' | 'p')) => {}
            _ => return Err(DurationError::MissingDesignator),
        }

        // Units in the order they may appear; 'T' switches from date to time units.
        const DATE_UNITS: [char; 2] = ['W', 'D'];
        const TIME_UNITS: [char; 3] = ['H', 'M', 'S'];

        let mut in_time = false;
        let mut last_rank: Option<usize> = None;
        let mut digits = String::new();
        let mut components = 0usize;
        let mut saw_weeks = false;

        for (index, ch) in chars {
            let ch = ch.to_ascii_uppercase();
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            if ch == 'T' {
                if in_time || !digits.is_empty() {
                    return Err(DurationError::UnexpectedChar { ch, index });
                }
                in_time = true;
                last_rank = None;
                continue;
            }

            let units: &[char] = if in_time { &TIME_UNITS } else { &DATE_UNITS };
            let Some(rank) = units.iter().position(|unit| *unit == ch) else {
                return Err(DurationError::UnexpectedChar { ch, index });
            };
            if digits.is_empty() {
                return Err(DurationError::UnexpectedChar { ch, index });
            }
            if last_rank.is_some_and(|last| last >= rank) {
                return Err(DurationError::OutOfOrder { unit: ch });
            }
            last_rank = Some(rank);

            let amount = digits.parse::<u32>().map_err(|_| DurationError::Overflow)?;
            digits.clear();
            components += 1;

            match (in_time, ch) {
                (false, 'W') => {
                    out.weeks = amount;
                    saw_weeks = true;
                }
                (false, 'D') => out.days = amount,
                (true, 'H') => out.hours = amount,
                (true, 'M') => out.minutes = amount,
                (true, 'S') => out.seconds = amount,
                _ => return Err(DurationError::UnexpectedChar { ch, index }),
            }
        }

        if !digits.is_empty() {
            return Err(DurationError::UnexpectedChar {
                ch: digits.chars().last().unwrap_or('0'),
                index: value.len() - 1,
            });
        }
        if components == 0 {
            return Err(DurationError::NoComponents);
        }
        // dur-week stands alone.
        if saw_weeks && components > 1 {
            return Err(DurationError::OutOfOrder { unit: 'W' });
        }

        Ok(out)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            f.write_str("T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 {
            f.write_str("0D")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_time_and_week_forms() {
        let d: Duration = "P1DT2H30M".parse().unwrap();
        assert_eq!(d.nominal_days(), 1);
        assert_eq!(d.exact_ms(), (2 * 3_600 + 30 * 60) * 1_000);
        assert!(!d.is_negative());

        let w: Duration = "P2W".parse().unwrap();
        assert_eq!(w.nominal_days(), 14);
        assert_eq!(w.exact_ms(), 0);

        let neg: Duration = "-PT15M".parse().unwrap();
        assert!(neg.is_negative());
        assert_eq!(neg.exact_ms(), 15 * 60 * 1_000);

        let plus: Duration = "+PT45S".parse().unwrap();
        assert_eq!(plus.exact_ms(), 45_000);
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!("".parse::<Duration>(), Err(DurationError::Empty));
        assert_eq!("1H".parse::<Duration>(), Err(DurationError::MissingDesignator));
        assert_eq!("P".parse::<Duration>(), Err(DurationError::NoComponents));
        assert_eq!("PT".parse::<Duration>(), Err(DurationError::NoComponents));
        assert!("P1H".parse::<Duration>().is_err());
        assert!("PT1M1H".parse::<Duration>().is_err());
        assert!("P1W2D".parse::<Duration>().is_err());
        assert!("PT1".parse::<Duration>().is_err());
        assert!("P1DX".parse::<Duration>().is_err());
    }

    #[test]
    fn display_matches_input_for_canonical_values() {
        for raw in ["P1DT2H30M", "P2W", "-PT15M", "P0D", "PT1H0M5S"] {
            let parsed: Duration = raw.parse().unwrap();
            let reparsed: Duration = parsed.to_string().parse().unwrap();
            assert_eq!(parsed, reparsed, "{raw}");
        }
    }

    #[test]
    fn add_to_without_zone_uses_fixed_days() {
        let d: Duration = "P1DT1H".parse().unwrap();
        assert_eq!(d.add_to(0, None), Some(MS_PER_DAY + 3_600_000));
    }

    #[test]
    fn add_to_follows_wall_clock_across_dst() {
        // 2024-03-30T12:00:00+01:00 (Europe/Berlin); DST starts the next night.
        let start = 1_711_796_400_000;
        let d: Duration = "P1D".parse().unwrap();
        let zone: Tz = "Europe/Berlin".parse().unwrap();
        assert_eq!(d.add_to(start, Some(zone)), Some(start + 23 * 3_600_000));
        assert_eq!(d.add_to(start, None), Some(start + 24 * 3_600_000));
    }

    #[test]
    fn add_to_reports_overflow_as_none() {
        let hour: Duration = "PT1H".parse().unwrap();
        assert_eq!(hour.add_to(i64::MAX - 1_000, None), None);
        assert_eq!(hour.add_to(i64::MAX - 1_000, Some(chrono_tz::UTC)), None);

        let back: Duration = "-P1W".parse().unwrap();
        assert_eq!(back.add_to(i64::MIN + 1_000, None), None);
    }
}
