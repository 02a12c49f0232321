//! Conversion between 24-hour and 12-hour clock representations.
//!
//! Times travel through the system as `"HH:MM"` strings in 24-hour form and
//! are presented to clients in 12-hour form with an AM/PM period. All
//! conversions validate their input and reject out-of-range or malformed
//! strings instead of clamping.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Half-day marker for 12-hour clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Am => write!(f, "AM"),
            Period::Pm => write!(f, "PM"),
        }
    }
}

impl FromStr for Period {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AM" => Ok(Period::Am),
            "PM" => Ok(Period::Pm),
            _ => Err(TimeFormatError::InvalidDisplayTime),
        }
    }
}

/// A clock time in 12-hour form.
///
/// `time` is zero-padded `"HH:MM"` with hours 01-12, and `display` is the
/// ready-to-render `"HH:MM AM"` string clients show verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFormat12Hour {
    pub time: String,
    pub period: Period,
    pub display: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TimeFormatError {
    #[error("Invalid time format")]
    Invalid24Hour,

    #[error("Invalid 12-hour time format")]
    Invalid12Hour,

    #[error("Invalid display time format. Expected format: \"HH:MM AM/PM\"")]
    InvalidDisplayTime,
}

/// Splits `"HH:MM"` into numeric hour and minute components.
///
/// Returns `None` for anything that is not exactly two `:`-separated
/// unsigned integers.
fn split_hhmm(value: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hours = parts[0].parse::<u32>().ok()?;
    let minutes = parts[1].parse::<u32>().ok()?;
    Some((hours, minutes))
}

/// Converts a 24-hour `"HH:MM"` time into its 12-hour representation.
///
/// Midnight maps to `12:00 AM` and noon to `12:00 PM`. Hours above 23 or
/// minutes above 59 are rejected.
pub fn to_12_hour(time24: &str) -> Result<TimeFormat12Hour, TimeFormatError> {
    let (hours, minutes) = split_hhmm(time24).ok_or(TimeFormatError::Invalid24Hour)?;
    if hours > 23 || minutes > 59 {
        return Err(TimeFormatError::Invalid24Hour);
    }

    let period = if hours >= 12 { Period::Pm } else { Period::Am };
    let mut display_hours = hours % 12;
    if display_hours == 0 {
        display_hours = 12;
    }

    let time = format!("{:02}:{:02}", display_hours, minutes);
    let display = format!("{} {}", time, period);

    Ok(TimeFormat12Hour {
        time,
        period,
        display,
    })
}

/// Converts a 12-hour `"HH:MM"` time plus period back into 24-hour form.
///
/// `12:XX AM` maps to `00:XX` and `12:XX PM` stays `12:XX`. Hours outside
/// 1-12 or minutes above 59 are rejected.
pub fn to_24_hour(time12: &str, period: Period) -> Result<String, TimeFormatError> {
    let (hours, minutes) = split_hhmm(time12).ok_or(TimeFormatError::Invalid12Hour)?;
    if !(1..=12).contains(&hours) || minutes > 59 {
        return Err(TimeFormatError::Invalid12Hour);
    }

    let hours24 = match period {
        Period::Am if hours == 12 => 0,
        Period::Pm if hours != 12 => hours + 12,
        _ => hours,
    };

    Ok(format!("{:02}:{:02}", hours24, minutes))
}

/// Parses a display string like `"02:30 PM"` into its time and period parts.
///
/// The period is matched case-insensitively and a single-digit hour is
/// accepted; the time component is not range-checked here, callers feed it
/// through [`to_24_hour`] for that.
pub fn parse_display_time(display: &str) -> Result<(String, Period), TimeFormatError> {
    let re = Regex::new(r"(?i)^(\d{1,2}:\d{2})\s+(AM|PM)$").unwrap();
    let captures = re
        .captures(display.trim())
        .ok_or(TimeFormatError::InvalidDisplayTime)?;

    let time = captures[1].to_string();
    let period = captures[2].parse::<Period>()?;
    Ok((time, period))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_becomes_twelve_am() {
        let converted = to_12_hour("00:00").unwrap();
        assert_eq!(converted.time, "12:00");
        assert_eq!(converted.period, Period::Am);
        assert_eq!(converted.display, "12:00 AM");
    }

    #[test]
    fn noon_becomes_twelve_pm() {
        let converted = to_12_hour("12:00").unwrap();
        assert_eq!(converted.time, "12:00");
        assert_eq!(converted.period, Period::Pm);
        assert_eq!(converted.display, "12:00 PM");
    }

    #[test]
    fn afternoon_times_wrap_past_twelve() {
        let converted = to_12_hour("13:05").unwrap();
        assert_eq!(converted.time, "01:05");
        assert_eq!(converted.period, Period::Pm);
        assert_eq!(converted.display, "01:05 PM");
    }

    #[test]
    fn to_12_hour_rejects_out_of_range_input() {
        assert_eq!(to_12_hour("24:00"), Err(TimeFormatError::Invalid24Hour));
        assert_eq!(to_12_hour("12:60"), Err(TimeFormatError::Invalid24Hour));
    }

    #[test]
    fn to_12_hour_rejects_malformed_input() {
        assert_eq!(to_12_hour("aa:bb"), Err(TimeFormatError::Invalid24Hour));
        assert_eq!(to_12_hour("0930"), Err(TimeFormatError::Invalid24Hour));
        assert_eq!(to_12_hour("09:30:00"), Err(TimeFormatError::Invalid24Hour));
        assert_eq!(to_12_hour(""), Err(TimeFormatError::Invalid24Hour));
    }

    #[test]
    fn twelve_am_maps_back_to_zero_hours() {
        assert_eq!(to_24_hour("12:00", Period::Am).unwrap(), "00:00");
        assert_eq!(to_24_hour("12:30", Period::Pm).unwrap(), "12:30");
    }

    #[test]
    fn pm_hours_shift_by_twelve() {
        assert_eq!(to_24_hour("01:05", Period::Pm).unwrap(), "13:05");
        assert_eq!(to_24_hour("09:30", Period::Am).unwrap(), "09:30");
        assert_eq!(to_24_hour("11:59", Period::Pm).unwrap(), "23:59");
    }

    #[test]
    fn to_24_hour_rejects_out_of_range_input() {
        assert_eq!(
            to_24_hour("13:00", Period::Pm),
            Err(TimeFormatError::Invalid12Hour)
        );
        assert_eq!(
            to_24_hour("00:30", Period::Am),
            Err(TimeFormatError::Invalid12Hour)
        );
        assert_eq!(
            to_24_hour("10:60", Period::Am),
            Err(TimeFormatError::Invalid12Hour)
        );
    }

    #[test]
    fn round_trip_preserves_every_hour() {
        for hours in 0..24 {
            for minutes in [0, 1, 30, 59] {
                let original = format!("{:02}:{:02}", hours, minutes);
                let twelve = to_12_hour(&original).unwrap();
                let back = to_24_hour(&twelve.time, twelve.period).unwrap();
                assert_eq!(back, original);
            }
        }
    }

    #[test]
    fn parse_display_time_splits_time_and_period() {
        assert_eq!(
            parse_display_time("02:30 PM").unwrap(),
            ("02:30".to_string(), Period::Pm)
        );
        assert_eq!(
            parse_display_time("9:05 am").unwrap(),
            ("9:05".to_string(), Period::Am)
        );
    }

    #[test]
    fn parse_display_time_rejects_missing_period() {
        assert_eq!(
            parse_display_time("02:30"),
            Err(TimeFormatError::InvalidDisplayTime)
        );
        assert_eq!(
            parse_display_time("02:30PM"),
            Err(TimeFormatError::InvalidDisplayTime)
        );
        assert_eq!(
            parse_display_time("02:30 XM"),
            Err(TimeFormatError::InvalidDisplayTime)
        );
    }
}
