#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use seeing_forecast_service::config::{Location, Locations};
use seeing_forecast_service::db::{
    DaySummary, DbError, ForecastStore, LocationDataset, SeeingMeasurement, StoredForecast,
};

type Rows = (Vec<SeeingMeasurement>, Vec<DaySummary>);

/// In-memory store with the same replace semantics as the Postgres repository
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<HashMap<String, Rows>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measurement_count(&self, location_id: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .get(location_id)
            .map(|(m, _)| m.len())
            .unwrap_or(0)
    }

    pub fn day_count(&self, location_id: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .get(location_id)
            .map(|(_, d)| d.len())
            .unwrap_or(0)
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }
}

impl ForecastStore for MemoryStore {
    async fn replace_location(&self, dataset: &LocationDataset) -> Result<usize, DbError> {
        let measurements: Vec<SeeingMeasurement> = dataset
            .measurements
            .iter()
            .map(|m| {
                let r = &m.reading;
                SeeingMeasurement {
                    id: self.next_id(),
                    location_id: m.location_id.clone(),
                    timestamp: r.timestamp,
                    day_index: r.day_index,
                    hour: r.hour,
                    cloud_low: r.cloud_low,
                    cloud_mid: r.cloud_mid,
                    cloud_high: r.cloud_high,
                    arc_seconds: r.arc_seconds,
                    seeing_index_one: r.seeing_index_one,
                    seeing_index_two: r.seeing_index_two,
                    jet_stream: r.jet_stream,
                    bad_layer_bottom: r.bad_layer_bottom,
                    bad_layer_top: r.bad_layer_top,
                    bad_layer_gradient: r.bad_layer_gradient,
                    temperature: r.temperature,
                    humidity: r.humidity,
                    celestial: Some(r.celestial.clone()),
                    created_at: Utc::now(),
                }
            })
            .collect();
        let days: Vec<DaySummary> = dataset
            .days
            .iter()
            .map(|d| DaySummary {
                id: self.next_id(),
                location_id: d.location_id.clone(),
                day_index: d.day_index,
                day_date: d.day_date,
                weekday: d.weekday.clone(),
                meta: d.meta.clone(),
            })
            .collect();

        let count = measurements.len();
        self.rows
            .lock()
            .unwrap()
            .insert(dataset.location_id.clone(), (measurements, days));
        Ok(count)
    }

    async fn find_measurements(&self, location_id: &str) -> Result<Vec<SeeingMeasurement>, DbError> {
        let mut rows = self
            .rows
            .lock()
            .unwrap()
            .get(location_id)
            .map(|(m, _)| m.clone())
            .unwrap_or_default();
        rows.sort_by_key(|m| m.timestamp);
        Ok(rows)
    }

    async fn find_day_summaries(&self, location_id: &str) -> Result<Vec<DaySummary>, DbError> {
        let mut days = self
            .rows
            .lock()
            .unwrap()
            .get(location_id)
            .map(|(_, d)| d.clone())
            .unwrap_or_default();
        days.sort_by_key(|d| d.day_index);
        Ok(days)
    }

    async fn find_dataset(&self, location_id: &str) -> Result<StoredForecast, DbError> {
        let (mut measurements, mut days) = self
            .rows
            .lock()
            .unwrap()
            .get(location_id)
            .cloned()
            .unwrap_or_default();
        measurements.sort_by_key(|m| m.timestamp);
        days.sort_by_key(|d| d.day_index);
        Ok(StoredForecast { measurements, days })
    }
}

/// Two Athens locations served from a mock server
pub fn test_locations(base_url: &str) -> Locations {
    Locations::new(
        vec![
            Location::new(
                "alpha",
                "Alpha, Greece",
                &format!("{}/seeing/alpha", base_url),
                "Europe/Athens",
            ),
            Location::new(
                "beta",
                "Beta, Greece",
                &format!("{}/seeing/beta", base_url),
                "Europe/Athens",
            ),
        ],
        "alpha",
    )
    .expect("default location is listed")
}

pub fn sample_page() -> &'static str {
    include_str!("fixtures/seeing_sample.html")
}

/// Minimal page: one marker for `date` and one 14-cell hour row per hour
pub fn single_day_page(date: &str, hours: &[u32]) -> String {
    let rows: String = hours
        .iter()
        .map(|h| {
            format!(
                r#"<tr class="hour-row" data-day="0"><td class="time">{h:02}</td>
                <td>5</td><td>0</td><td>10</td><td>1.6</td><td>3</td><td>3</td>
                <td>25</td><td>8</td><td>9</td><td>0.5</td><td>20</td><td>50</td><td>Clear</td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><table class="table-seeing"><tbody>
        <tr><td class="new-day" colspan="14">{date}</td></tr>{rows}
        </tbody></table></body></html>"#
    )
}
