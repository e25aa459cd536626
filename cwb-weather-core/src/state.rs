//! View-state container for the dashboard.
//!
//! Owns the current snapshot. Every refresh takes a ticket; only the result
//! for the newest ticket is applied, so a slow response can never overwrite
//! a newer one. A failed refresh keeps the previous snapshot.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    error::FetchError,
    location::Location,
    model::WeatherSnapshot,
    provider::WeatherProvider,
    snapshot::fetch_snapshot_within,
};

/// Identifies one refresh attempt. Tickets increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug)]
pub enum RefreshOutcome {
    /// The snapshot was replaced.
    Applied,
    /// The newest refresh failed; the previous snapshot is still shown.
    Failed(FetchError),
    /// A newer refresh had started; this result was dropped.
    Stale,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied)
    }
}

#[derive(Debug, Clone)]
pub struct WeatherState {
    snapshot: WeatherSnapshot,
    latest: u64,
    last_error: Option<String>,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherState {
    pub fn new() -> Self {
        Self {
            snapshot: WeatherSnapshot::placeholder(),
            latest: 0,
            last_error: None,
        }
    }

    pub fn snapshot(&self) -> &WeatherSnapshot {
        &self.snapshot
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_loading
    }

    /// Message of the most recent failed refresh, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mark loading and hand out a ticket newer than all previous ones.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.latest += 1;
        self.snapshot.is_loading = true;
        RefreshTicket(self.latest)
    }

    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<WeatherSnapshot, FetchError>,
    ) -> RefreshOutcome {
        if ticket.0 != self.latest {
            warn!(
                ticket = ticket.0,
                latest = self.latest,
                "discarding response for superseded refresh"
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(mut snapshot) => {
                debug!(ticket = ticket.0, "applying weather snapshot");
                snapshot.is_loading = false;
                self.snapshot = snapshot;
                self.last_error = None;
                RefreshOutcome::Applied
            }
            Err(err) => {
                self.snapshot.is_loading = false;
                self.last_error = Some(err.to_string());
                RefreshOutcome::Failed(err)
            }
        }
    }

    /// Run one complete refresh cycle against `provider`.
    pub async fn refresh(
        &mut self,
        provider: &dyn WeatherProvider,
        location: &Location,
        timeout: Duration,
    ) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let result = fetch_snapshot_within(provider, location, timeout).await;
        self.finish_refresh(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{location::find_location, snapshot::testing::FakeProvider};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn taipei() -> &'static Location {
        find_location("臺北市").unwrap()
    }

    fn snapshot(temperature: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature,
            is_loading: false,
            ..WeatherSnapshot::placeholder()
        }
    }

    #[test]
    fn starts_loading_with_placeholder() {
        let state = WeatherState::new();
        assert!(state.is_loading());
        assert_eq!(state.snapshot().temperature, 0.0);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn tickets_increase() {
        let mut state = WeatherState::new();
        let a = state.begin_refresh();
        let b = state.begin_refresh();
        assert!(b > a);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut state = WeatherState::new();
        let older = state.begin_refresh();
        let newer = state.begin_refresh();

        assert!(state.finish_refresh(newer, Ok(snapshot(20.0))).is_applied());

        // The slower, older request resolves afterwards.
        let outcome = state.finish_refresh(older, Ok(snapshot(99.0)));
        assert!(matches!(outcome, RefreshOutcome::Stale));
        assert_eq!(state.snapshot().temperature, 20.0);
        assert!(!state.is_loading());
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let mut state = WeatherState::new();
        let older = state.begin_refresh();
        let _newer = state.begin_refresh();

        state.finish_refresh(older, Ok(snapshot(99.0)));
        assert!(state.is_loading());
    }

    #[tokio::test]
    async fn refresh_applies_snapshot() {
        let mut state = WeatherState::new();
        let outcome = state.refresh(&FakeProvider::ok(21.5), taipei(), TIMEOUT).await;

        assert!(outcome.is_applied());
        assert_eq!(state.snapshot().temperature, 21.5);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let mut state = WeatherState::new();
        state.refresh(&FakeProvider::ok(21.5), taipei(), TIMEOUT).await;
        let before = state.snapshot().clone();

        let half_broken = FakeProvider {
            fail_forecast: true,
            ..FakeProvider::ok(30.0)
        };
        let outcome = state.refresh(&half_broken, taipei(), TIMEOUT).await;

        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert_eq!(*state.snapshot(), before);
        assert!(!state.is_loading());
        assert!(state.last_error().unwrap().contains("Wx"));

        state.refresh(&FakeProvider::ok(22.0), taipei(), TIMEOUT).await;
        assert!(state.last_error().is_none());
    }
}
