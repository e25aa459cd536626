use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{Endpoint, FetchError},
    model::{Forecast, Observation},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://opendata.cwb.gov.tw/api/v1/rest/datastore";

const OBSERVATION_DATASET: &str = "O-A0003-001";
const FORECAST_DATASET: &str = "F-C0032-001";

const WIND_SPEED: &str = "WDSD";
const TEMPERATURE: &str = "TEMP";
const HUMIDITY: &str = "HUMD";
const OBSERVATION_ELEMENTS: &[&str] = &[WIND_SPEED, TEMPERATURE, HUMIDITY];

const WEATHER: &str = "Wx";
const RAIN_PROBABILITY: &str = "PoP";
const COMFORT: &str = "CI";
const FORECAST_ELEMENTS: &[&str] = &[WEATHER, RAIN_PROBABILITY, COMFORT];

/// Stations report a dead or absent sensor as `-99`.
const NO_DATA: f64 = -99.0;

/// Central Weather Bureau open-data client.
#[derive(Debug, Clone)]
pub struct CwbProvider {
    api_token: String,
    base_url: String,
    tz: Tz,
    http: Client,
}

impl CwbProvider {
    /// `tz` is the zone CWB's naive observation timestamps are read in.
    pub fn new(api_token: String, tz: Tz) -> Self {
        Self {
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            tz,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        dataset: &str,
        location_name: &str,
    ) -> Result<String, FetchError> {
        let url = format!("{}/{dataset}", self.base_url);
        debug!(%endpoint, location_name, "requesting CWB {dataset}");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("Authorization", self.api_token.as_str()),
                ("locationName", location_name),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Http { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Http { endpoint, source })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        debug!(%endpoint, bytes = body.len(), "CWB {dataset} responded");
        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for CwbProvider {
    async fn current_observation(&self, station_name: &str) -> Result<Observation, FetchError> {
        let body = self
            .fetch(Endpoint::Observation, OBSERVATION_DATASET, station_name)
            .await?;
        parse_observation(&body, station_name, &self.tz)
    }

    async fn forecast(&self, city_name: &str) -> Result<Forecast, FetchError> {
        let body = self
            .fetch(Endpoint::Forecast, FORECAST_DATASET, city_name)
            .await?;
        parse_forecast(&body, city_name)
    }
}

#[derive(Debug, Deserialize)]
struct CwbResponse<L> {
    records: CwbRecords<L>,
}

#[derive(Debug, Deserialize)]
struct CwbRecords<L> {
    #[serde(default = "Vec::new")]
    location: Vec<L>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsLocation {
    location_name: String,
    time: ObsTime,
    weather_element: Vec<ObsElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsTime {
    obs_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsElement {
    element_name: String,
    element_value: RawValue,
}

/// CWB ships numbers as strings; accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }

    fn to_text(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcLocation {
    weather_element: Vec<FcElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcElement {
    element_name: String,
    time: Vec<FcPeriod>,
}

#[derive(Debug, Deserialize)]
struct FcPeriod {
    parameter: FcParameter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcParameter {
    parameter_name: String,
    parameter_value: Option<String>,
}

/// Decode the envelope and take `records.location[0]`.
fn first_location<L: DeserializeOwned>(
    body: &str,
    endpoint: Endpoint,
    query: &str,
) -> Result<L, FetchError> {
    let parsed: CwbResponse<L> =
        serde_json::from_str(body).map_err(|source| FetchError::Payload { endpoint, source })?;

    parsed
        .records
        .location
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NoRecords {
            endpoint,
            query: query.to_string(),
        })
}

/// Keep only whitelisted elements; every whitelisted one must be present.
fn pick_elements<'a, E>(
    elements: &'a [E],
    name_of: impl Fn(&E) -> &str,
    wanted: &[&'static str],
    endpoint: Endpoint,
) -> Result<HashMap<&'static str, &'a E>, FetchError> {
    let picked: HashMap<&'static str, &E> = wanted
        .iter()
        .filter_map(|&name| elements.iter().find(|&e| name_of(e) == name).map(|e| (name, e)))
        .collect();

    let missing: Vec<&'static str> = wanted
        .iter()
        .copied()
        .filter(|name| !picked.contains_key(name))
        .collect();

    if missing.is_empty() {
        Ok(picked)
    } else {
        Err(FetchError::MalformedElementSet { endpoint, missing })
    }
}

pub(crate) fn parse_observation(
    body: &str,
    station_name: &str,
    tz: &Tz,
) -> Result<Observation, FetchError> {
    let endpoint = Endpoint::Observation;
    let location: ObsLocation = first_location(body, endpoint, station_name)?;

    let elements = pick_elements(
        &location.weather_element,
        |e| e.element_name.as_str(),
        OBSERVATION_ELEMENTS,
        endpoint,
    )?;

    let number = |element: &'static str| {
        let value = &elements[element].element_value;
        value
            .as_f64()
            .filter(|v| *v > NO_DATA)
            .ok_or_else(|| FetchError::InvalidValue {
                endpoint,
                element,
                value: value.to_text(),
            })
    };

    let observation_time =
        parse_obs_time(&location.time.obs_time, tz).ok_or_else(|| FetchError::InvalidValue {
            endpoint,
            element: "obsTime",
            value: location.time.obs_time.clone(),
        })?;

    Ok(Observation {
        observation_time,
        location_name: location.location_name,
        temperature: number(TEMPERATURE)?,
        wind_speed: number(WIND_SPEED)?,
        humid: number(HUMIDITY)?,
    })
}

pub(crate) fn parse_forecast(body: &str, city_name: &str) -> Result<Forecast, FetchError> {
    let endpoint = Endpoint::Forecast;
    let location: FcLocation = first_location(body, endpoint, city_name)?;

    // An element with no forecast periods carries nothing to copy.
    let populated: Vec<&FcElement> = location
        .weather_element
        .iter()
        .filter(|e| !e.time.is_empty())
        .collect();

    let elements = pick_elements(
        &populated,
        |e| e.element_name.as_str(),
        FORECAST_ELEMENTS,
        endpoint,
    )?;

    let first = |element: &'static str| &elements[element].time[0].parameter;

    let wx = first(WEATHER);
    let weather_code = wx
        .parameter_value
        .as_deref()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .ok_or_else(|| FetchError::InvalidValue {
            endpoint,
            element: WEATHER,
            value: wx.parameter_value.clone().unwrap_or_default(),
        })?;

    let pop = first(RAIN_PROBABILITY);
    let rain_possibility = pop
        .parameter_name
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| (0.0..=100.0).contains(p))
        .ok_or_else(|| FetchError::InvalidValue {
            endpoint,
            element: RAIN_PROBABILITY,
            value: pop.parameter_name.clone(),
        })?;

    Ok(Forecast {
        description: wx.parameter_name.clone(),
        weather_code,
        rain_possibility,
        comfortability: first(COMFORT).parameter_name.clone(),
    })
}

/// CWB stamps observations as naive local time; newer payloads carry an offset.
fn parse_obs_time(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S").ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
