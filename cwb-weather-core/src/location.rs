//! Cities the dashboard can observe.
//!
//! The observation endpoint, the forecast endpoint and the sun-times table
//! each spell a place differently, so every entry carries all three names.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Fully-qualified city name; the forecast endpoint's `locationName`.
    pub city_name: &'static str,
    /// Observation station token; the observation endpoint's `locationName`.
    pub station_name: &'static str,
    /// Key into the sun-times table.
    pub sun_times_name: &'static str,
}

const fn loc(
    city_name: &'static str,
    station_name: &'static str,
    sun_times_name: &'static str,
) -> Location {
    Location {
        city_name,
        station_name,
        sun_times_name,
    }
}

pub const DEFAULT_CITY: &str = "臺北市";

pub static AVAILABLE_LOCATIONS: &[Location] = &[
    loc("宜蘭縣", "宜蘭", "宜蘭縣"),
    loc("嘉義市", "嘉義", "嘉義市"),
    loc("屏東縣", "恆春", "屏東縣"),
    loc("雲林縣", "古坑", "雲林縣"),
    loc("臺東縣", "臺東", "臺東縣"),
    loc("臺北市", "臺北", "臺北市"),
    loc("金門縣", "金門", "金門縣"),
    loc("桃園市", "新屋", "桃園市"),
    loc("彰化縣", "彰師大", "彰化縣"),
    loc("嘉義縣", "阿里山", "嘉義縣"),
    loc("高雄市", "高雄", "高雄市"),
    loc("基隆市", "基隆", "基隆市"),
    loc("臺南市", "南區中心", "臺南市"),
    loc("南投縣", "日月潭", "南投縣"),
    loc("臺中市", "臺中", "臺中市"),
    loc("新竹縣", "新竹", "新竹縣"),
    loc("花蓮縣", "花蓮", "花蓮縣"),
    loc("連江縣", "馬祖", "連江縣"),
    loc("澎湖縣", "澎湖", "澎湖縣"),
    loc("新北市", "板橋", "新北市"),
];

/// Exact match on the fully-qualified city name.
pub fn find_location(city_name: &str) -> Option<&'static Location> {
    AVAILABLE_LOCATIONS
        .iter()
        .find(|l| l.city_name == city_name.trim())
}

pub fn city_names() -> impl Iterator<Item = &'static str> {
    AVAILABLE_LOCATIONS.iter().map(|l| l.city_name)
}
