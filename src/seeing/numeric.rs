/// Numeric text parsing for forecast cells
///
/// Cells mix numbers with units and spacing ("12%", "-3.4 °C", "1.2\u{a0}km").
/// The first numeric token wins; anything unparsable is `None`.
use regex::Regex;
use std::sync::OnceLock;

fn int_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+").expect("valid integer pattern"))
}

fn float_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid float pattern"))
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\u{a0}')
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect()
}

/// First integer in `text`, e.g. `"85%"` -> `Some(85)`
///
/// ```
/// use seeing_forecast_service::seeing::numeric::parse_int;
///
/// assert_eq!(parse_int("85%"), Some(85));
/// assert_eq!(parse_int("n/a"), None);
/// ```
pub fn parse_int(text: &str) -> Option<i32> {
    if text.is_empty() {
        return None;
    }
    let cleaned = normalize(text);
    int_pattern()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
}

/// First decimal number in `text`, e.g. `"-3.40 °C"` -> `Some(-3.4)`
pub fn parse_float(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let cleaned = normalize(text);
    float_pattern()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
}
