//! Parsing of the compact date inputs accepted on the command line.
//!
//! Accepted forms, distinguished by shape: `MMDDYYYY-HHmm`, `MMDD-HHmm`,
//! `MMDDYYYY`, `MMDD`, `:HHmm`, and `0` (clear the date). Fields that are
//! omitted default to today at 23:59 local time.

use chrono::{DateTime, Datelike, Local, TimeZone};

pub const DATE_FORMAT_HELP: &str =
    "MMDDYYYY-HHmm, MMDD-HHmm, MMDDYYYY, MMDD, :HHmm ([M]onth, [D]ate, [Y]ear, [H]our, [m]inute), 0 = none | Defaults: today at 11:59pm";

/// Parse a date input relative to `now`. Returns `Ok(None)` for the empty
/// string or `"0"`, both of which mean "no date".
pub fn parse_datetime_input(s: &str, now: DateTime<Local>) -> Result<Option<DateTime<Local>>, String> {
    let s = s.trim();
    if s.is_empty() || s == "0" {
        return Ok(None);
    }

    // Defaults for fields the input leaves out.
    let mut year = now.year();
    let mut month = now.month();
    let mut day = now.day();
    let mut hour = 23;
    let mut minute = 59;

    match s.len() {
        4 => {
            // MMDD
            month = field(s, 0..2)?;
            day = field(s, 2..4)?;
        }
        5 => {
            // :HHmm
            if !s.starts_with(':') {
                return Err(bad_input(s));
            }
            hour = field(s, 1..3)?;
            minute = field(s, 3..5)?;
        }
        8 => {
            // MMDDYYYY
            month = field(s, 0..2)?;
            day = field(s, 2..4)?;
            year = field::<i32>(s, 4..8)?;
        }
        9 => {
            // MMDD-HHmm
            if s.as_bytes()[4] != b'-' {
                return Err(bad_input(s));
            }
            month = field(s, 0..2)?;
            day = field(s, 2..4)?;
            hour = field(s, 5..7)?;
            minute = field(s, 7..9)?;
        }
        13 => {
            // MMDDYYYY-HHmm
            if s.as_bytes()[8] != b'-' {
                return Err(bad_input(s));
            }
            month = field(s, 0..2)?;
            day = field(s, 2..4)?;
            year = field::<i32>(s, 4..8)?;
            hour = field(s, 9..11)?;
            minute = field(s, 11..13)?;
        }
        _ => return Err(bad_input(s)),
    }

    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .map(Some)
        .ok_or_else(|| bad_input(s))
}

fn field<T: std::str::FromStr>(s: &str, range: std::ops::Range<usize>) -> Result<T, String> {
    s.get(range)
        .and_then(|part| part.parse().ok())
        .ok_or_else(|| bad_input(s))
}

fn bad_input(s: &str) -> String {
    format!("Invalid date: {s} | Formats: {DATE_FORMAT_HELP}")
}
