//! Time utilities: combine separate date/time inputs into a due instant and
//! format it back in the user's zone.

use anyhow::Result;
use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use std::fmt;

use crate::error::TaskError;

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Where wall-clock inputs are interpreted and where due times are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// System local time.
    #[default]
    Local,
    /// A fixed IANA zone like "America/Chicago".
    Named(Tz),
}

impl Zone {
    pub fn parse(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {name}"))?;
        Ok(Zone::Named(tz))
    }

    /// Map a wall-clock time to an instant.
    ///
    /// Ambiguous times (fall-back) take the earlier instant. Times inside a
    /// spring-forward gap move one hour later.
    pub fn resolve(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Local => resolve_in(&Local, local),
            Zone::Named(tz) => resolve_in(tz, local),
        }
    }

    pub fn format(&self, at: DateTime<Utc>) -> String {
        match self {
            Zone::Local => at.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
            Zone::Named(tz) => at.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        }
    }

    /// Calendar date of `now` in this zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => now.with_timezone(&Local).date_naive(),
            Zone::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local time"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

fn resolve_in<Z: TimeZone>(tz: &Z, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Combine optional date + time inputs into a due instant.
///
/// No date means no due time (a lone time is ignored). A date without a time
/// means the start of that day.
pub fn combine_due(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    zone: Zone,
) -> Result<Option<DateTime<Utc>>, TaskError> {
    let Some(date) = date else {
        return Ok(None);
    };
    let local = date.and_time(time.unwrap_or(NaiveTime::MIN));
    zone.resolve(local)
        .map(Some)
        .ok_or_else(|| TaskError::InvalidDueTime {
            local: local.format(DISPLAY_FORMAT).to_string(),
            zone: zone.to_string(),
        })
}

/// Parse a date field ("2026-02-20"). Blank input means "no date".
pub fn parse_date_input(input: &str) -> Result<Option<NaiveDate>> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let d = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))?;
    Ok(Some(d))
}

/// Parse a time field ("23:59"). Blank input means "no time".
pub fn parse_time_input(input: &str) -> Result<Option<NaiveTime>> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let t = NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid time '{s}' (expected HH:MM): {e}"))?;
    Ok(Some(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago() -> Zone {
        Zone::parse("America/Chicago").unwrap()
    }

    #[test]
    fn test_combine_chicago_deadline() {
        // Feb is CST (UTC-6)
        let date = NaiveDate::from_ymd_opt(2026, 2, 20);
        let time = NaiveTime::from_hms_opt(23, 59, 0);
        let utc = combine_due(date, time, chicago()).unwrap().unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn date_without_time_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 4);
        let utc = combine_due(date, None, chicago()).unwrap().unwrap();
        // July is CDT (UTC-5)
        assert_eq!(utc.to_rfc3339(), "2026-07-04T05:00:00+00:00");
        assert_eq!(chicago().format(utc), "2026-07-04 00:00");
    }

    #[test]
    fn time_without_date_is_ignored() {
        let time = NaiveTime::from_hms_opt(9, 0, 0);
        assert_eq!(combine_due(None, time, chicago()).unwrap(), None);
    }

    #[test]
    fn spring_forward_gap_moves_later() {
        // 2026-03-08 02:30 does not exist in Chicago; 03:30 CDT is 08:30 UTC.
        let date = NaiveDate::from_ymd_opt(2026, 3, 8);
        let time = NaiveTime::from_hms_opt(2, 30, 0);
        let utc = combine_due(date, time, chicago()).unwrap().unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-03-08T08:30:00+00:00");
    }

    #[test]
    fn fall_back_overlap_takes_earlier_instant() {
        // 2026-11-01 01:30 happens twice in Chicago; the CDT one is 06:30 UTC.
        let date = NaiveDate::from_ymd_opt(2026, 11, 1);
        let time = NaiveTime::from_hms_opt(1, 30, 0);
        let utc = combine_due(date, time, chicago()).unwrap().unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-11-01T06:30:00+00:00");
    }

    #[test]
    fn blank_inputs_are_absent() {
        assert_eq!(parse_date_input("  ").unwrap(), None);
        assert_eq!(parse_time_input("").unwrap(), None);
        assert!(parse_date_input("20/02/2026").is_err());
        assert!(parse_time_input("7pm").is_err());
    }

    #[test]
    fn invalid_zone_name_is_rejected() {
        assert!(Zone::parse("Mars/Olympus_Mons").is_err());
    }
}
