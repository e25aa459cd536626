//! Offline builder for the sun-times table.
//!
//! Input is CWB dataset `A-B0062-001`, nested as
//! `cwbopendata.dataset.locations.location[].time[].parameter[]`. The
//! builder groups by location, keeps dates strictly after a cutoff and copies
//! the sunrise/sunset parameters into named fields. Malformed input fails
//! the whole build.

use std::{collections::HashMap, fs, path::Path};

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::TableError,
    sun_times::{DateSunTimes, LocationSunTimes, SunTimesTable},
};

/// Published parameter name for sunrise time.
pub const SUNRISE_PARAMETER: &str = "日出時刻";
/// Published parameter name for sunset time.
pub const SUNSET_PARAMETER: &str = "日沒時刻";

#[derive(Debug, Deserialize)]
struct RawDocument {
    cwbopendata: RawOpenData,
}

#[derive(Debug, Deserialize)]
struct RawOpenData {
    dataset: RawDataset,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    locations: RawLocations,
}

#[derive(Debug, Deserialize)]
struct RawLocations {
    location: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    location_name: String,
    time: Vec<RawTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTime {
    data_time: String,
    parameter: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameter {
    parameter_name: String,
    parameter_value: String,
}

/// Build a table from the raw dataset JSON, keeping dates after `cutoff`.
pub fn build_table(raw_json: &str, cutoff: NaiveDate) -> Result<SunTimesTable, TableError> {
    let document: RawDocument = serde_json::from_str(raw_json)?;

    let mut grouped: Vec<LocationSunTimes> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw in document.cwbopendata.dataset.locations.location {
        let slot = *index.entry(raw.location_name.clone()).or_insert_with(|| {
            grouped.push(LocationSunTimes {
                location_name: raw.location_name.clone(),
                dates: Vec::new(),
            });
            grouped.len() - 1
        });

        for time in &raw.time {
            let date = parse_data_time(&time.data_time).ok_or_else(|| TableError::InvalidDate {
                location: raw.location_name.clone(),
                value: time.data_time.clone(),
            })?;

            if date <= cutoff {
                continue;
            }

            grouped[slot]
                .dates
                .push(extract_sun_times(&raw.location_name, date, &time.parameter)?);
        }
    }

    debug!(locations = grouped.len(), %cutoff, "built sun-times table");
    SunTimesTable::new(grouped)
}

/// Read the raw dataset from `input`, build, and write the table to `output`.
pub fn build_table_file(
    input: &Path,
    output: &Path,
    cutoff: NaiveDate,
) -> Result<SunTimesTable, TableError> {
    let raw = fs::read_to_string(input).map_err(|source| TableError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let table = build_table(&raw, cutoff)?;
    table.save(output)?;
    Ok(table)
}

fn extract_sun_times(
    location: &str,
    date: NaiveDate,
    parameters: &[RawParameter],
) -> Result<DateSunTimes, TableError> {
    let date = date.format("%Y-%m-%d").to_string();

    let value_of = |parameter: &'static str| {
        parameters
            .iter()
            .find(|p| p.parameter_name == parameter)
            .map(|p| p.parameter_value.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TableError::MissingParameter {
                location: location.to_string(),
                date: date.clone(),
                parameter,
            })
    };

    Ok(DateSunTimes {
        sunrise: value_of(SUNRISE_PARAMETER)?,
        sunset: value_of(SUNSET_PARAMETER)?,
        date,
    })
}

/// `dataTime` is a plain date in current datasets; older ones carry a full timestamp.
fn parse_data_time(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}
