//! Weather-code classification and the derived icon and theme.

use std::fmt;

use serde::Serialize;

use crate::moment::Moment;

/// Coarse weather type behind a CWB `Wx` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WeatherKind {
    Thunderstorm,
    Clear,
    CloudyFog,
    Cloudy,
    Fog,
    PartiallyClearWithRain,
    Snowing,
    Unrecognized(u16),
}

impl WeatherKind {
    pub fn from_code(code: u16) -> Self {
        match code {
            15..=18 | 21 | 22 | 33..=36 | 41 => WeatherKind::Thunderstorm,
            1 => WeatherKind::Clear,
            25..=28 => WeatherKind::CloudyFog,
            2..=7 => WeatherKind::Cloudy,
            24 => WeatherKind::Fog,
            8..=14 | 19 | 20 | 29..=32 | 38 | 39 => WeatherKind::PartiallyClearWithRain,
            23 | 37 | 42 => WeatherKind::Snowing,
            other => WeatherKind::Unrecognized(other),
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            WeatherKind::Thunderstorm => "thunderstorm",
            WeatherKind::Clear => "clear",
            WeatherKind::CloudyFog => "cloudy-fog",
            WeatherKind::Cloudy => "cloudy",
            WeatherKind::Fog => "fog",
            WeatherKind::PartiallyClearWithRain => "partially-clear-with-rain",
            WeatherKind::Snowing => "snowing",
            WeatherKind::Unrecognized(_) => "unknown",
        }
    }
}

/// Icon for a weather kind drawn in the day or night variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherIcon {
    pub moment: Moment,
    pub kind: WeatherKind,
}

impl WeatherIcon {
    pub fn new(moment: Moment, weather_code: u16) -> Self {
        Self {
            moment,
            kind: WeatherKind::from_code(weather_code),
        }
    }

    /// Terminal glyph; unrecognized codes get a neutral marker.
    pub fn glyph(&self) -> &'static str {
        match (self.moment, self.kind) {
            (_, WeatherKind::Thunderstorm) => "⛈",
            (Moment::Day, WeatherKind::Clear) => "☀",
            (Moment::Night, WeatherKind::Clear) => "☾",
            (_, WeatherKind::CloudyFog) | (_, WeatherKind::Fog) => "🌫",
            (Moment::Day, WeatherKind::Cloudy) => "⛅",
            (Moment::Night, WeatherKind::Cloudy) => "☁",
            (Moment::Day, WeatherKind::PartiallyClearWithRain) => "🌦",
            (Moment::Night, WeatherKind::PartiallyClearWithRain) => "🌧",
            (_, WeatherKind::Snowing) => "❄",
            (_, WeatherKind::Unrecognized(_)) => "?",
        }
    }
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.moment, self.kind.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl From<Moment> for Theme {
    fn from(moment: Moment) -> Self {
        match moment {
            Moment::Day => Theme::Light,
            Moment::Night => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}
