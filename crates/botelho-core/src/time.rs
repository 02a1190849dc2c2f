//! Local-time helpers.
//!
//! Events and sensor readings are stored as UTC instants. Everything shown
//! to people is rendered in the space's timezone, which defaults to
//! [`DEFAULT_TIMEZONE`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

/// Timezone of the space.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Layout used for "since" timestamps (`Mon Jan  2 15:04:05 2006`).
pub const ANSIC_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Errors from timezone handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The name is not in the IANA database.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, TimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(name.to_string()))
}

/// Portuguese weekday name, as used in event announcements.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Domingo",
        Weekday::Mon => "Segunda",
        Weekday::Tue => "Terça",
        Weekday::Wed => "Quarta",
        Weekday::Thu => "Quinta",
        Weekday::Fri => "Sexta",
        Weekday::Sat => "Sábado",
    }
}

/// Formats an instant in `tz` using [`ANSIC_FORMAT`].
pub fn ansic(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format(ANSIC_FORMAT).to_string()
}

/// Resolves a wall-clock date and time in `tz` to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
/// that do not exist (DST gap) yield `None`.
pub fn local_datetime(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// First instant of `date` in `tz`.
///
/// Where clocks jump forward at midnight the day starts at the end of the
/// gap, not at a midnight that never happened.
pub fn start_of_day(tz: Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    (0..24 * 60).find_map(|minute| {
        let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)?;
        local_datetime(tz, date, time)
    })
}

/// Returns true if both instants fall on the same calendar day in `tz`.
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
    let (a, b) = (a.with_timezone(&tz), b.with_timezone(&tz));
    a.year() == b.year() && a.ordinal() == b.ordinal()
}
