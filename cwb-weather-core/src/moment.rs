//! Day/night resolution from the sun-times table.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::MomentError, sun_times::SunTimesTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moment {
    Day,
    Night,
}

impl Moment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Moment::Day => "day",
            Moment::Night => "night",
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `now` as day or night for `location_name`.
///
/// The location is matched exactly. Returns `Ok(None)` when the table has no
/// such location, so the caller can choose a fallback. The table's wall-clock
/// times are interpreted in `now`'s timezone. Both boundaries count as day.
pub fn resolve_moment<Tz: TimeZone>(
    table: &SunTimesTable,
    location_name: &str,
    now: &DateTime<Tz>,
) -> Result<Option<Moment>, MomentError> {
    let Some(location) = table.location(location_name) else {
        return Ok(None);
    };

    let today = now.date_naive().format("%Y-%m-%d").to_string();

    let entry = location
        .on(&today)
        .ok_or_else(|| MomentError::MissingDateEntry {
            location: location_name.to_string(),
            date: today.clone(),
        })?;

    let malformed = |reason: String| MomentError::MalformedEntry {
        location: location_name.to_string(),
        date: today.clone(),
        reason,
    };

    let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
        .map_err(|e| malformed(format!("date '{}': {e}", entry.date)))?;
    let sunrise = parse_clock(&entry.sunrise).map_err(|r| malformed(format!("sunrise {r}")))?;
    let sunset = parse_clock(&entry.sunset).map_err(|r| malformed(format!("sunset {r}")))?;

    let tz = now.timezone();
    let sunrise_at = localize(&tz, date, sunrise)?;
    let sunset_at = localize(&tz, date, sunset)?;

    let moment = if sunrise_at <= *now && *now <= sunset_at {
        Moment::Day
    } else {
        Moment::Night
    };

    Ok(Some(moment))
}

/// [`resolve_moment`] with unknown locations treated as day.
pub fn resolve_moment_or_day<Tz: TimeZone>(
    table: &SunTimesTable,
    location_name: &str,
    now: &DateTime<Tz>,
) -> Result<Moment, MomentError> {
    Ok(resolve_moment(table, location_name, now)?.unwrap_or_else(|| {
        warn!(location_name, "no sun-times for location, assuming day");
        Moment::Day
    }))
}

/// Parse `HH:MM` or `HH:MM:SS`.
fn parse_clock(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("is empty".to_string());
    }

    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| format!("'{value}': {e}"))
}

fn localize<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<DateTime<Tz>, MomentError> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| MomentError::NonexistentLocalTime {
            date: date.to_string(),
            time: time.to_string(),
        })
}
