use std::collections::BTreeMap;

use chrono_tz::Tz;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use super::day_tracker::{DayBoundaryTracker, DayInfo};
use super::hour_row::{HourlyReading, HourlyRowExtractor};
use crate::fetch_error::FetchError;

/// Everything one parse of a forecast page produced
#[derive(Debug, Clone, Serialize)]
pub struct ParsedForecast {
    /// Readings in document order
    pub readings: Vec<HourlyReading>,
    /// Day index -> day info, indices dense from 0
    pub days: BTreeMap<i32, DayInfo>,
    /// Hour rows dropped as unusable
    pub skipped_rows: usize,
}

/// Parse the `table.table-seeing` forecast table of a page.
///
/// Rows are visited once, in order. A row holding a `td.new-day` cell opens a
/// new day; a `tr.hour-row` row becomes a reading for an already opened day.
/// Other rows are ignored. Unusable hour rows are dropped, but a page that
/// yields no readings at all is an error so that callers never replace good
/// data with nothing.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn parse_seeing_table(html: &str, tz: Tz) -> Result<ParsedForecast, FetchError> {
    debug!("Parsing HTML document");
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table.table-seeing").expect("valid selector");
    let new_day_selector = Selector::parse("td.new-day").expect("valid selector");

    let table = document.select(&table_selector).next().ok_or_else(|| {
        error!("No seeing table found in HTML");
        debug!(
            "HTML preview (first 500 chars): {}",
            html.chars().take(500).collect::<String>()
        );
        FetchError::TableNotFound
    })?;

    let tbody = child_elements(&table, "tbody").next().ok_or_else(|| {
        error!("Seeing table has no body");
        FetchError::TableBodyMissing
    })?;

    let mut tracker = DayBoundaryTracker::new();
    let extractor = HourlyRowExtractor::new(tz);
    let mut readings = Vec::new();
    let mut hour_rows = 0;

    for row in child_elements(&tbody, "tr") {
        if let Some(marker) = row.select(&new_day_selector).next() {
            tracker.record_marker(&marker);
            continue;
        }
        if !row.value().classes().any(|c| c == "hour-row") {
            continue;
        }

        hour_rows += 1;
        if let Some(reading) = extractor.extract(&row, &tracker) {
            readings.push(reading);
        }
    }

    let skipped_rows = hour_rows - readings.len();
    if skipped_rows > 0 {
        warn!("Skipped {} unusable hour rows out of {}", skipped_rows, hour_rows);
    }

    if readings.is_empty() {
        error!("No hourly rows were parsed from the seeing table");
        return Err(FetchError::NoReadings);
    }

    debug!(
        "Parsed {} readings across {} days",
        readings.len(),
        tracker.len()
    );

    Ok(ParsedForecast {
        readings,
        days: tracker.into_days(),
        skipped_rows,
    })
}

fn child_elements<'a>(
    parent: &ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour_row(day: i32, hour: u32) -> String {
        format!(
            r#"<tr class="hour-row" data-day="{day}"><td class="time">{hour:02}</td>
            <td>10</td><td>20</td><td>30</td><td>1.4</td><td>4</td><td>3</td>
            <td>18</td><td>8.1</td><td>9.3</td><td>0.4</td><td>21.5</td><td>55%</td>
            <td><pre>Moon</pre></td></tr>"#
        )
    }

    fn marker(text: &str) -> String {
        format!(r#"<tr><td class="new-day" colspan="14">{text}</td></tr>"#)
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body><table class="table-seeing"><thead><tr><th>h</th></tr></thead>
            <tbody>{}</tbody></table></body></html>"#,
            rows.concat()
        )
    }

    fn athens() -> Tz {
        "Europe/Athens".parse().unwrap()
    }

    #[test]
    fn test_one_day_two_hours() {
        let html = page(&[
            marker(r#"<span class="date-day">Saturday</span> 2024-06-01"#),
            hour_row(0, 0),
            hour_row(0, 1),
        ]);

        let parsed = parse_seeing_table(&html, athens()).unwrap();
        assert_eq!(parsed.readings.len(), 2);
        assert_eq!(parsed.days.len(), 1);
        assert_eq!(parsed.skipped_rows, 0);

        let day = &parsed.days[&0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(day.weekday.as_deref(), Some("Saturday"));
        assert_eq!(parsed.readings[0].hour, 0);
        assert_eq!(parsed.readings[1].hour, 1);
    }

    #[test]
    fn test_row_for_unseen_day_is_dropped() {
        let html = page(&[
            marker("2024-06-01"),
            hour_row(0, 0),
            hour_row(0, 1),
            hour_row(1, 2),
        ]);

        let parsed = parse_seeing_table(&html, athens()).unwrap();
        assert_eq!(parsed.readings.len(), 2);
        assert_eq!(parsed.skipped_rows, 1);
    }

    #[test]
    fn test_row_before_its_marker_is_dropped() {
        let html = page(&[
            marker("2024-06-01"),
            hour_row(1, 0),
            marker("2024-06-02"),
            hour_row(1, 1),
        ]);

        let parsed = parse_seeing_table(&html, athens()).unwrap();
        assert_eq!(parsed.readings.len(), 1);
        assert_eq!(parsed.readings[0].hour, 1);
    }

    #[test]
    fn test_day_indices_dense_and_every_reading_has_a_day() {
        let html = page(&[
            marker("2024-06-01"),
            hour_row(0, 22),
            r#"<tr class="spacer"><td>ad</td></tr>"#.to_string(),
            marker("no date here"),
            marker("2024-06-02"),
            hour_row(1, 0),
            marker("2024-06-03"),
            hour_row(2, 0),
        ]);

        let parsed = parse_seeing_table(&html, athens()).unwrap();
        let keys: Vec<i32> = parsed.days.keys().copied().collect();
        assert_eq!(keys, vec![0, 1, 2]);
        assert_eq!(
            parsed.days[&2].date,
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
        for reading in &parsed.readings {
            assert!(parsed.days.contains_key(&reading.day_index));
        }
    }

    #[test]
    fn test_missing_table() {
        let result = parse_seeing_table("<html><body><p>maintenance</p></body></html>", athens());
        assert!(matches!(result, Err(FetchError::TableNotFound)));
    }

    #[test]
    fn test_missing_body() {
        let html = r#"<table class="table-seeing"><thead><tr><th>x</th></tr></thead></table>"#;
        let result = parse_seeing_table(html, athens());
        assert!(matches!(result, Err(FetchError::TableBodyMissing)));
    }

    #[test]
    fn test_no_matching_rows_is_an_error() {
        let html = page(&[r#"<tr><td>nothing</td></tr>"#.to_string()]);
        let result = parse_seeing_table(&html, athens());
        assert!(matches!(result, Err(FetchError::NoReadings)));
    }

    #[test]
    fn test_markers_only_is_an_error() {
        let html = page(&[marker("2024-06-01"), marker("2024-06-02")]);
        let result = parse_seeing_table(&html, athens());
        assert!(matches!(result, Err(FetchError::NoReadings)));
    }
}
