//! Core library for the `cwb-weather` dashboard.
//!
//! This crate defines:
//! - The sun-times table, its offline builder and the day/night resolver
//! - Abstraction over the weather source, with the CWB open-data client
//! - The snapshot fetcher and the view-state container that owns it
//! - Derived presentation: icon, theme and the weather card
//! - Configuration, including the persisted city preference
//!
//! It is used by `cwb-weather-cli`, but can also be reused by other front ends.

pub mod card;
pub mod config;
pub mod dataset;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod moment;
pub mod provider;
pub mod snapshot;
pub mod state;
pub mod sun_times;

pub use card::WeatherCard;
pub use config::Config;
pub use error::{Endpoint, FetchError, MomentError, TableError};
pub use icon::{Theme, WeatherIcon, WeatherKind};
pub use location::Location;
pub use model::{Forecast, Observation, WeatherSnapshot};
pub use moment::{Moment, resolve_moment, resolve_moment_or_day};
pub use provider::WeatherProvider;
pub use snapshot::{fetch_snapshot, fetch_snapshot_within};
pub use state::{RefreshOutcome, RefreshTicket, WeatherState};
pub use sun_times::{DateSunTimes, LocationSunTimes, SunTimesTable};
