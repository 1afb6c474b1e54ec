use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::debug;

use super::day_tracker::DayBoundaryTracker;
use super::{cell_text, element_text};
use super::numeric::{parse_float, parse_int};
use super::time::local_hour_to_utc;

/// Minimum number of direct cells in an hour row
pub const HOUR_ROW_CELLS: usize = 14;

/// One hourly forecast row, before it is tied to a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyReading {
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
    pub celestial: String,
}

/// Extracts readings from `tr.hour-row` rows.
///
/// Rows that cannot be tied to a recorded day or that are too short are
/// dropped and `extract` returns `None`; individual unparsable cells become
/// `None` fields instead.
pub struct HourlyRowExtractor {
    tz: Tz,
    time_selector: Selector,
    pre_selector: Selector,
}

impl HourlyRowExtractor {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            time_selector: Selector::parse("td.time").expect("valid selector"),
            pre_selector: Selector::parse("pre").expect("valid selector"),
        }
    }

    pub fn extract(&self, row: &ElementRef, days: &DayBoundaryTracker) -> Option<HourlyReading> {
        let Some(time_cell) = row.select(&self.time_selector).next() else {
            debug!("Hour row without a time cell, skipping");
            return None;
        };
        let hour = match parse_int(&cell_text(&time_cell)) {
            Some(h) if (0..24).contains(&h) => h,
            other => {
                debug!("Hour row with unusable hour {:?}, skipping", other);
                return None;
            }
        };

        let Some(day_index) = row
            .value()
            .attr("data-day")
            .and_then(|v| v.trim().parse::<i32>().ok())
        else {
            debug!("Hour row at hour {} without a valid data-day, skipping", hour);
            return None;
        };
        let Some(day) = days.lookup(day_index) else {
            debug!("Hour row references unknown day {}, skipping", day_index);
            return None;
        };

        let cells: Vec<ElementRef> = self.direct_cells(row);
        if cells.len() < HOUR_ROW_CELLS {
            debug!(
                "Hour row has {} cells, expected at least {}, skipping",
                cells.len(),
                HOUR_ROW_CELLS
            );
            return None;
        }

        let timestamp = local_hour_to_utc(day.date, hour as u32, &self.tz)?;
        let text = |i: usize| cell_text(&cells[i]);

        let celestial = match cells[13].select(&self.pre_selector).next() {
            Some(pre) => element_text(&pre),
            None => element_text(&cells[13]),
        };

        Some(HourlyReading {
            timestamp,
            day_index,
            hour,
            cloud_low: parse_int(&text(1)),
            cloud_mid: parse_int(&text(2)),
            cloud_high: parse_int(&text(3)),
            arc_seconds: parse_float(&text(4)),
            seeing_index_one: parse_int(&text(5)),
            seeing_index_two: parse_int(&text(6)),
            jet_stream: parse_float(&text(7)),
            bad_layer_bottom: parse_float(&text(8)),
            bad_layer_top: parse_float(&text(9)),
            bad_layer_gradient: parse_float(&text(10)),
            temperature: parse_float(&text(11)),
            humidity: parse_int(&text(12)),
            celestial,
        })
    }

    fn direct_cells<'a>(&self, row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect()
    }
}
