//! Precomputed per-location, per-date sunrise/sunset reference data.
//!
//! The table is produced offline by [`crate::dataset`] and read-only at
//! runtime. Times are wall-clock strings (`HH:MM` or `HH:MM:SS`) without a
//! timezone; the resolver pairs them with an explicit zone.

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::TableError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSunTimes {
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(alias = "dataTime")]
    pub date: String,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSunTimes {
    pub location_name: String,
    #[serde(alias = "time")]
    pub dates: Vec<DateSunTimes>,
}

impl LocationSunTimes {
    pub fn on(&self, date: &str) -> Option<&DateSunTimes> {
        self.dates.iter().find(|d| d.date == date)
    }
}

/// Ordered sequence of locations; names and per-location dates are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LocationSunTimes>", into = "Vec<LocationSunTimes>")]
pub struct SunTimesTable {
    locations: Vec<LocationSunTimes>,
}

impl TryFrom<Vec<LocationSunTimes>> for SunTimesTable {
    type Error = TableError;

    fn try_from(locations: Vec<LocationSunTimes>) -> Result<Self, Self::Error> {
        Self::new(locations)
    }
}

impl From<SunTimesTable> for Vec<LocationSunTimes> {
    fn from(table: SunTimesTable) -> Self {
        table.locations
    }
}

impl SunTimesTable {
    /// Build a table, rejecting duplicate location names or dates.
    pub fn new(locations: Vec<LocationSunTimes>) -> Result<Self, TableError> {
        let mut names = HashSet::new();
        for location in &locations {
            if !names.insert(location.location_name.as_str()) {
                return Err(TableError::DuplicateLocation(location.location_name.clone()));
            }

            let mut dates = HashSet::new();
            for entry in &location.dates {
                if !dates.insert(entry.date.as_str()) {
                    return Err(TableError::DuplicateDate {
                        location: location.location_name.clone(),
                        date: entry.date.clone(),
                    });
                }
            }
        }

        Ok(Self { locations })
    }

    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let locations: Vec<LocationSunTimes> = serde_json::from_str(json)?;
        Self::new(locations)
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let contents = fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&contents)
    }

    /// Write the table as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let write_err = |source| TableError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }

    /// Exact match on the location name.
    pub fn location(&self, name: &str) -> Option<&LocationSunTimes> {
        self.locations.iter().find(|l| l.location_name == name)
    }

    pub fn locations(&self) -> &[LocationSunTimes] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str) -> DateSunTimes {
        DateSunTimes {
            date: date.to_string(),
            sunrise: "06:00".to_string(),
            sunset: "18:00".to_string(),
        }
    }

    #[test]
    fn lookup_is_exact() {
        let table = SunTimesTable::new(vec![
            LocationSunTimes {
                location_name: "臺北市".to_string(),
                dates: vec![entry("2021-03-09")],
            },
            LocationSunTimes {
                location_name: "臺中市".to_string(),
                dates: vec![],
            },
        ])
        .unwrap();

        assert!(table.location("臺北市").is_some());
        assert!(table.location("臺北").is_none());
        assert!(table.location("臺").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rejects_duplicate_location() {
        let loc = LocationSunTimes {
            location_name: "花蓮縣".to_string(),
            dates: vec![],
        };
        let err = SunTimesTable::new(vec![loc.clone(), loc]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateLocation(name) if name == "花蓮縣"));
    }

    #[test]
    fn rejects_duplicate_date() {
        let err = SunTimesTable::new(vec![LocationSunTimes {
            location_name: "澎湖縣".to_string(),
            dates: vec![entry("2021-03-09"), entry("2021-03-09")],
        }])
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateDate { .. }));
    }

    #[test]
    fn accepts_legacy_keys() {
        let json = r#"[
            {"locationName": "宜蘭縣", "time": [
                {"dataTime": "2021-03-09", "sunrise": "06:05", "sunset": "17:58"}
            ]}
        ]"#;

        let table = SunTimesTable::from_json_str(json).unwrap();
        let day = table.location("宜蘭縣").and_then(|l| l.on("2021-03-09")).unwrap();
        assert_eq!(day.sunrise, "06:05");
    }

    #[test]
    fn entry_missing_sunset_fails_to_load() {
        let json = r#"[{"locationName": "基隆市", "dates": [{"date": "2021-03-09", "sunrise": "06:05"}]}]"#;
        assert!(matches!(SunTimesTable::from_json_str(json), Err(TableError::Json(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sun-times.json");

        let table = SunTimesTable::new(vec![LocationSunTimes {
            location_name: "金門縣".to_string(),
            dates: vec![entry("2021-03-10")],
        }])
        .unwrap();
        table.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"locationName\""));
        assert!(raw.contains("\"dates\""));
        assert_eq!(SunTimesTable::load(&path).unwrap(), table);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = SunTimesTable::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
