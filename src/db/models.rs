use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::seeing::{HourlyReading, ParsedForecast};

// Database entity models
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeeingMeasurement {
    pub id: i64,
    pub location_id: String,
    pub timestamp: DateTime<Utc>,
    pub day_index: i32,
    pub hour: i32,
    pub cloud_low: Option<i32>,
    pub cloud_mid: Option<i32>,
    pub cloud_high: Option<i32>,
    pub arc_seconds: Option<f64>,
    pub seeing_index_one: Option<i32>,
    pub seeing_index_two: Option<i32>,
    pub jet_stream: Option<f64>,
    pub bad_layer_bottom: Option<f64>,
    pub bad_layer_top: Option<f64>,
    pub bad_layer_gradient: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
    pub celestial: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DaySummary {
    pub id: i64,
    pub location_id: String,
    pub day_index: i32,
    pub day_date: NaiveDate,
    pub weekday: Option<String>,
    pub meta: Option<String>,
}

// Rows about to be written, already stamped with their location
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeasurement {
    pub location_id: String,
    pub reading: HourlyReading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDaySummary {
    pub location_id: String,
    pub day_index: i32,
    pub day_date: NaiveDate,
    pub weekday: Option<String>,
    pub meta: Option<String>,
}

/// A complete replacement dataset for one location
#[derive(Debug, Clone)]
pub struct LocationDataset {
    pub location_id: String,
    pub measurements: Vec<NewMeasurement>,
    pub days: Vec<NewDaySummary>,
}

impl LocationDataset {
    /// Stamp `location_id` onto every reading and day of a parse result
    pub fn from_parsed(location_id: &str, parsed: ParsedForecast) -> Self {
        let measurements = parsed
            .readings
            .into_iter()
            .map(|reading| NewMeasurement {
                location_id: location_id.to_string(),
                reading,
            })
            .collect();
        let days = parsed
            .days
            .into_iter()
            .map(|(day_index, info)| NewDaySummary {
                location_id: location_id.to_string(),
                day_index,
                day_date: info.date,
                weekday: info.weekday,
                meta: info.meta,
            })
            .collect();

        Self {
            location_id: location_id.to_string(),
            measurements,
            days,
        }
    }
}

/// A location's stored rows, read from one snapshot
#[derive(Debug, Clone, Default)]
pub struct StoredForecast {
    pub measurements: Vec<SeeingMeasurement>,
    pub days: Vec<DaySummary>,
}

// API response DTOs (to avoid circular dependency between services and api modules)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourEntry {
    /// Local hour, zero padded ("21")
    pub hour: String,
    /// Local time in RFC 3339 with offset
    pub datetime: String,
    pub cloud_low: Option<i32>,
    pub cloud_mid: Option<i32>,
    pub cloud_high: Option<i32>,
    pub arc_seconds: Option<f64>,
    pub seeing_index_one: Option<i32>,
    pub seeing_index_two: Option<i32>,
    pub jet_stream: Option<f64>,
    pub bad_layer_bottom: Option<f64>,
    pub bad_layer_top: Option<f64>,
    pub bad_layer_gradient: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
    pub celestial: Option<String>,
    pub quality_label: String,
    pub quality_class: String,
    pub super_good: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayCard {
    pub date: NaiveDate,
    pub label: String,
    pub meta: Option<String>,
    pub rows: Vec<HourEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastView {
    pub location_id: String,
    pub location: String,
    pub source_url: String,
    pub timezone: String,
    pub days: Vec<DayCard>,
    pub super_good_slots: Vec<String>,
    pub legend: Vec<crate::seeing::quality::LegendEntry>,
    pub last_updated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeing::DayInfo;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn reading(day_index: i32, hour: i32) -> HourlyReading {
        HourlyReading {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, hour as u32, 0, 0).unwrap(),
            day_index,
            hour,
            cloud_low: None,
            cloud_mid: None,
            cloud_high: None,
            arc_seconds: Some(1.0),
            seeing_index_one: None,
            seeing_index_two: None,
            jet_stream: None,
            bad_layer_bottom: None,
            bad_layer_top: None,
            bad_layer_gradient: None,
            temperature: None,
            humidity: None,
            celestial: String::new(),
        }
    }

    #[test]
    fn test_from_parsed_stamps_location_everywhere() {
        let mut days = BTreeMap::new();
        days.insert(
            0,
            DayInfo {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                weekday: Some("Saturday".to_string()),
                meta: None,
            },
        );
        let parsed = ParsedForecast {
            readings: vec![reading(0, 1), reading(0, 2)],
            days,
            skipped_rows: 0,
        };

        let dataset = LocationDataset::from_parsed("glyfada", parsed);
        assert_eq!(dataset.location_id, "glyfada");
        assert_eq!(dataset.measurements.len(), 2);
        assert!(dataset.measurements.iter().all(|m| m.location_id == "glyfada"));
        assert_eq!(dataset.days.len(), 1);
        assert_eq!(dataset.days[0].location_id, "glyfada");
        assert_eq!(dataset.days[0].weekday.as_deref(), Some("Saturday"));
    }
}
