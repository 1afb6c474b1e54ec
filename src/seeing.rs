// Seeing forecast extraction
//
// Turns a forecast page's seeing table into typed hourly readings:
// - day marker rows (td.new-day) allocate day indices in document order
// - hour rows (tr.hour-row) carry a data-day attribute and 14 positional cells
// Local forecast hours are converted to UTC using the location's timezone.

pub mod day_tracker;
pub mod hour_row;
pub mod numeric;
pub mod quality;
pub mod table_parser;
pub mod time;

pub use day_tracker::{DayBoundaryTracker, DayInfo};
pub use hour_row::{HourlyReading, HourlyRowExtractor};
pub use quality::Quality;
pub use table_parser::{parse_seeing_table, ParsedForecast};

use scraper::ElementRef;

/// Text of an element with whitespace runs collapsed and trimmed
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of a numeric cell: text nodes trimmed of ASCII whitespace and joined
/// by a space. Non-breaking spaces are kept so the numeric parser can drop
/// them from inside a token ("1\u{a0}200" -> 1200).
pub(crate) fn cell_text(element: &ElementRef) -> String {
    element
        .text()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
