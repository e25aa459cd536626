//! The weather card: everything the view shows, derived from state.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::{
    icon::{Theme, WeatherIcon},
    location::Location,
    model::WeatherSnapshot,
    moment::Moment,
};

#[derive(Debug, Clone)]
pub struct WeatherCard {
    pub city_name: String,
    pub station_name: String,
    pub description: String,
    pub temperature_c: i64,
    pub wind_speed_mps: f64,
    pub humidity_pct: i64,
    pub rain_possibility_pct: i64,
    pub comfortability: String,
    pub observed_at: DateTime<Tz>,
    pub moment: Moment,
    pub theme: Theme,
    pub icon: WeatherIcon,
    pub is_loading: bool,
}

impl WeatherCard {
    /// `tz` is used only to present the observation time.
    pub fn new(snapshot: &WeatherSnapshot, location: &Location, moment: Moment, tz: &Tz) -> Self {
        Self {
            city_name: location.city_name.to_string(),
            station_name: snapshot.location_name.clone(),
            description: snapshot.description.clone(),
            temperature_c: snapshot.temperature.round() as i64,
            wind_speed_mps: snapshot.wind_speed,
            humidity_pct: snapshot.humidity_pct().round() as i64,
            rain_possibility_pct: snapshot.rain_possibility.round() as i64,
            comfortability: snapshot.comfortability.clone(),
            observed_at: snapshot.observation_time.with_timezone(tz),
            moment,
            theme: Theme::from(moment),
            icon: WeatherIcon::new(moment, snapshot.weather_code),
            is_loading: snapshot.is_loading,
        }
    }
}

impl fmt::Display for WeatherCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  [{} theme]", self.city_name, self.theme)?;
        writeln!(f, "{} {}", self.description, self.comfortability)?;
        writeln!(f)?;
        writeln!(f, "  {} {}°C   ({})", self.icon.glyph(), self.temperature_c, self.icon)?;
        writeln!(f)?;
        writeln!(f, "  wind      {:.1} m/s", self.wind_speed_mps)?;
        writeln!(f, "  rain      {}%", self.rain_possibility_pct)?;
        writeln!(f, "  humidity  {}%", self.humidity_pct)?;
        writeln!(f)?;
        write!(
            f,
            "observed {} at {}",
            self.observed_at.format("%Y-%m-%d %H:%M"),
            self.station_name
        )?;
        if self.is_loading {
            write!(f, " (refreshing...)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{icon::WeatherKind, location::find_location};
    use chrono::{TimeZone, Utc};
    use chrono_tz::Asia::Taipei;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            observation_time: Utc.with_ymd_and_hms(2021, 3, 9, 12, 30, 0).unwrap(),
            location_name: "臺北".into(),
            temperature: 23.6,
            wind_speed: 2.4,
            humid: 0.714,
            description: "多雲時陰".into(),
            weather_code: 27,
            rain_possibility: 30.0,
            comfortability: "舒適".into(),
            is_loading: false,
        }
    }

    #[test]
    fn derives_display_values() {
        let loc = find_location("臺北市").unwrap();
        let card = WeatherCard::new(&snapshot(), loc, Moment::Night, &Taipei);

        assert_eq!(card.temperature_c, 24);
        assert_eq!(card.humidity_pct, 71);
        assert_eq!(card.rain_possibility_pct, 30);
        assert_eq!(card.theme, Theme::Dark);
        assert_eq!(card.icon.kind, WeatherKind::CloudyFog);
        assert_eq!(card.observed_at.format("%H:%M").to_string(), "20:30");
    }

    #[test]
    fn renders_card_text() {
        let loc = find_location("臺北市").unwrap();
        let text = WeatherCard::new(&snapshot(), loc, Moment::Day, &Taipei).to_string();

        assert!(text.starts_with("臺北市  [light theme]"));
        assert!(text.contains("24°C"));
        assert!(text.contains("(day-cloudy-fog)"));
        assert!(text.contains("wind      2.4 m/s"));
        assert!(text.contains("observed 2021-03-09 20:30 at 臺北"));
        assert!(!text.contains("refreshing"));
    }
}
