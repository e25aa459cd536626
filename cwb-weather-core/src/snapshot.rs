//! Joining the observation and forecast calls into one snapshot.

use std::time::Duration;

use tracing::debug;

use crate::{
    error::FetchError, location::Location, model::WeatherSnapshot, provider::WeatherProvider,
};

/// Fetch both halves concurrently and merge them.
///
/// Fails as a unit: if either call fails no snapshot is produced.
pub async fn fetch_snapshot(
    provider: &dyn WeatherProvider,
    location: &Location,
) -> Result<WeatherSnapshot, FetchError> {
    debug!(city = location.city_name, "fetching weather snapshot");

    let (observation, forecast) = tokio::try_join!(
        provider.current_observation(location.station_name),
        provider.forecast(location.city_name),
    )?;

    Ok(WeatherSnapshot::merge(observation, forecast))
}

/// [`fetch_snapshot`] bounded by `timeout`; running out of time is a fetch failure.
pub async fn fetch_snapshot_within(
    provider: &dyn WeatherProvider,
    location: &Location,
    timeout: Duration,
) -> Result<WeatherSnapshot, FetchError> {
    tokio::time::timeout(timeout, fetch_snapshot(provider, location))
        .await
        .map_err(|_| FetchError::Timeout(timeout))?
}


#[cfg(test)]
mod tests {
    use super::testing::FakeProvider;
    use super::*;
    use crate::{error::Endpoint, location::find_location};

    fn taipei() -> &'static Location {
        find_location("臺北市").unwrap()
    }

    #[tokio::test]
    async fn merges_both_halves() {
        let provider = FakeProvider::ok(24.0);
        let snapshot = fetch_snapshot(&provider, taipei()).await.unwrap();

        assert_eq!(snapshot.location_name, "臺北");
        assert_eq!(snapshot.temperature, 24.0);
        assert_eq!(snapshot.description, "晴時多雲");
        assert_eq!(snapshot.weather_code, 2);
        assert!(!snapshot.is_loading);
        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_forecast_fails_the_join() {
        let provider = FakeProvider {
            fail_forecast: true,
            ..FakeProvider::ok(24.0)
        };

        let err = fetch_snapshot(&provider, taipei()).await.unwrap_err();
        assert_eq!(err.endpoint(), Some(Endpoint::Forecast));
    }

    #[tokio::test]
    async fn failed_observation_fails_the_join() {
        let provider = FakeProvider {
            fail_observation: true,
            ..FakeProvider::ok(24.0)
        };

        let err = fetch_snapshot(&provider, taipei()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_times_out() {
        let provider = FakeProvider {
            delay: Some(Duration::from_secs(60)),
            ..FakeProvider::ok(24.0)
        };

        let err = fetch_snapshot_within(&provider, taipei(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(d) if d == Duration::from_secs(5)));
    }
}
