use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::debug;

use super::element_text;

/// One forecast day as announced by a marker row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayInfo {
    pub date: NaiveDate,
    pub weekday: Option<String>,
    pub meta: Option<String>,
}

fn date_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid date pattern"))
}

/// Accumulates day markers in document order.
///
/// Each marker with a date token gets the next index, starting at 0. Markers
/// without a usable date are skipped and never consume an index.
pub struct DayBoundaryTracker {
    days: BTreeMap<i32, DayInfo>,
    next_index: i32,
    weekday_selector: Selector,
    pre_selector: Selector,
}

impl Default for DayBoundaryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DayBoundaryTracker {
    pub fn new() -> Self {
        Self {
            days: BTreeMap::new(),
            next_index: 0,
            weekday_selector: Selector::parse("span.date-day").expect("valid selector"),
            pre_selector: Selector::parse("pre").expect("valid selector"),
        }
    }

    /// Record a new day, returning its index
    pub fn record(&mut self, day: DayInfo) -> i32 {
        let index = self.next_index;
        self.days.insert(index, day);
        self.next_index += 1;
        index
    }

    /// Read a `td.new-day` cell and record it if it carries a date
    pub fn record_marker(&mut self, cell: &ElementRef) -> Option<i32> {
        let text = element_text(cell);
        let Some(token) = date_token().find(&text) else {
            debug!("Day marker without a date token, skipping: '{}'", text);
            return None;
        };
        let Ok(date) = NaiveDate::parse_from_str(token.as_str(), "%Y-%m-%d") else {
            debug!("Day marker with invalid date '{}', skipping", token.as_str());
            return None;
        };

        let weekday = cell
            .select(&self.weekday_selector)
            .next()
            .map(|span| element_text(&span))
            .filter(|s| !s.is_empty());
        let meta = cell
            .select(&self.pre_selector)
            .next()
            .map(|pre| element_text(&pre))
            .filter(|s| !s.is_empty());

        let index = self.record(DayInfo {
            date,
            weekday,
            meta,
        });
        debug!("Recorded day {} as {}", index, date);
        Some(index)
    }

    pub fn lookup(&self, index: i32) -> Option<&DayInfo> {
        self.days.get(&index)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn into_days(self) -> BTreeMap<i32, DayInfo> {
        self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn with_marker_cells(html: &str, f: impl FnOnce(Vec<ElementRef>)) {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("td.new-day").unwrap();
        f(doc.select(&sel).collect());
    }

    #[test]
    fn test_marker_with_weekday_and_meta() {
        let html = r#"<table><tbody><tr><td class="new-day">
            <span class="date-day">Saturday</span> 2024-06-01
            <pre>Sunrise 06:02
            Sunset 20:45</pre>
        </td></tr></tbody></table>"#;

        with_marker_cells(html, |cells| {
            let mut tracker = DayBoundaryTracker::new();
            assert_eq!(tracker.record_marker(&cells[0]), Some(0));

            let day = tracker.lookup(0).unwrap();
            assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
            assert_eq!(day.weekday.as_deref(), Some("Saturday"));
            assert_eq!(day.meta.as_deref(), Some("Sunrise 06:02 Sunset 20:45"));
        });
    }

    #[test]
    fn test_marker_without_date_does_not_allocate_index() {
        let html = r#"<table><tbody>
            <tr><td class="new-day">Forecast</td></tr>
            <tr><td class="new-day">2024-06-02</td></tr>
        </tbody></table>"#;

        with_marker_cells(html, |cells| {
            let mut tracker = DayBoundaryTracker::new();
            assert_eq!(tracker.record_marker(&cells[0]), None);
            assert_eq!(tracker.record_marker(&cells[1]), Some(0));
            assert_eq!(tracker.len(), 1);

            let day = tracker.lookup(0).unwrap();
            assert!(day.weekday.is_none());
            assert!(day.meta.is_none());
        });
    }

    #[test]
    fn test_impossible_date_is_skipped() {
        let html = r#"<table><tbody><tr><td class="new-day">2024-13-45</td></tr></tbody></table>"#;

        with_marker_cells(html, |cells| {
            let mut tracker = DayBoundaryTracker::new();
            assert_eq!(tracker.record_marker(&cells[0]), None);
            assert!(tracker.is_empty());
        });
    }

    #[test]
    fn test_indices_are_dense() {
        let mut tracker = DayBoundaryTracker::new();
        for d in 1..=3 {
            tracker.record(DayInfo {
                date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
                weekday: None,
                meta: None,
            });
        }
        let keys: Vec<i32> = tracker.into_days().into_keys().collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }
}
