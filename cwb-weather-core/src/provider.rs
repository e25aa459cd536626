use crate::{
    Config, FetchError,
    model::{Forecast, Observation},
    provider::cwb::CwbProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

pub mod cwb;

/// Source of the two halves of a weather snapshot.
///
/// The two calls take differently spelled place names; see
/// [`crate::location::Location`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current observation for an observation-station token, e.g. `臺北`.
    async fn current_observation(&self, station_name: &str) -> Result<Observation, FetchError>;

    /// Short-term forecast for a fully-qualified city name, e.g. `臺北市`.
    async fn forecast(&self, city_name: &str) -> Result<Forecast, FetchError>;
}

/// Construct the CWB provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_token = config.api_token()?;
    let tz = config.timezone()?;

    let http = Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("cwb-weather/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let provider = CwbProvider::new(api_token.to_owned(), tz)
        .with_base_url(config.api_base_url())
        .with_http_client(http);

    Ok(Box::new(provider))
}
