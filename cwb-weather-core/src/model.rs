use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reduced payload of the current-observation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub observation_time: DateTime<Utc>,
    pub location_name: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub humid: f64,
}

/// Reduced payload of the short-term forecast endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub description: String,
    pub weather_code: u16,
    pub rain_possibility: f64,
    pub comfortability: String,
}

/// The complete merged record produced by one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub observation_time: DateTime<Utc>,
    pub location_name: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Metres per second.
    pub wind_speed: f64,
    /// Relative humidity as reported by the source (CWB reports a 0..1 fraction).
    pub humid: f64,
    pub description: String,
    pub weather_code: u16,
    /// Percent, 0..=100.
    pub rain_possibility: f64,
    pub comfortability: String,
    pub is_loading: bool,
}

impl WeatherSnapshot {
    /// Zero-valued snapshot shown before the first fetch completes.
    pub fn placeholder() -> Self {
        Self {
            observation_time: Utc::now(),
            location_name: String::new(),
            temperature: 0.0,
            wind_speed: 0.0,
            humid: 0.0,
            description: String::new(),
            weather_code: 0,
            rain_possibility: 0.0,
            comfortability: String::new(),
            is_loading: true,
        }
    }

    pub fn merge(observation: Observation, forecast: Forecast) -> Self {
        Self {
            observation_time: observation.observation_time,
            location_name: observation.location_name,
            temperature: observation.temperature,
            wind_speed: observation.wind_speed,
            humid: observation.humid,
            description: forecast.description,
            weather_code: forecast.weather_code,
            rain_possibility: forecast.rain_possibility,
            comfortability: forecast.comfortability,
            is_loading: false,
        }
    }

    /// Humidity as a percentage.
    ///
    /// CWB reports a fraction, so values in `0..=1` are scaled; `1.0` is
    /// saturation (100%), not 1%. Anything above 1 is taken as percent already.
    pub fn humidity_pct(&self) -> f64 {
        if (0.0..=1.0).contains(&self.humid) {
            self.humid * 100.0
        } else {
            self.humid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn merge_takes_fields_from_both_halves() {
        let observed = Utc.with_ymd_and_hms(2021, 3, 9, 4, 0, 0).unwrap();
        let snapshot = WeatherSnapshot::merge(
            Observation {
                observation_time: observed,
                location_name: "臺北".into(),
                temperature: 23.4,
                wind_speed: 1.2,
                humid: 0.71,
            },
            Forecast {
                description: "多雲".into(),
                weather_code: 4,
                rain_possibility: 20.0,
                comfortability: "舒適".into(),
            },
        );

        assert_eq!(snapshot.observation_time, observed);
        assert_eq!(snapshot.location_name, "臺北");
        assert_eq!(snapshot.weather_code, 4);
        assert_eq!(snapshot.comfortability, "舒適");
        assert!(!snapshot.is_loading);
    }

    #[test]
    fn placeholder_is_loading_and_zeroed() {
        let p = WeatherSnapshot::placeholder();
        assert!(p.is_loading);
        assert_eq!(p.temperature, 0.0);
        assert!(p.description.is_empty());
    }

    #[test]
    fn humidity_pct_handles_fraction_and_raw() {
        let mut s = WeatherSnapshot::placeholder();
        s.humid = 0.65;
        assert!((s.humidity_pct() - 65.0).abs() < 1e-9);
        s.humid = 82.0;
        assert_eq!(s.humidity_pct(), 82.0);
    }

    #[test]
    fn saturated_fraction_is_full_humidity() {
        let mut s = WeatherSnapshot::placeholder();
        s.humid = 1.0;
        assert_eq!(s.humidity_pct(), 100.0);
        s.humid = 0.0;
        assert_eq!(s.humidity_pct(), 0.0);
    }
}
