use serde::Serialize;
use utoipa::ToSchema;

/// Seeing quality tier derived from the arc-second metric.
///
/// Computed when readings are served, never stored, so thresholds can change
/// without touching persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Quality {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl Quality {
    /// Upper bounds are inclusive: a value on a threshold gets the better tier
    pub fn classify(arc_seconds: Option<f64>) -> Self {
        match arc_seconds {
            None => Quality::Unknown,
            Some(v) if v <= 1.1 => Quality::Excellent,
            Some(v) if v <= 1.7 => Quality::Good,
            Some(v) if v <= 2.5 => Quality::Fair,
            Some(_) => Quality::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Excellent => "Excellent",
            Quality::Good => "Good",
            Quality::Fair => "Fair",
            Quality::Poor => "Poor",
            Quality::Unknown => "Unknown",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Quality::Excellent => "quality-excellent",
            Quality::Good => "quality-good",
            Quality::Fair => "quality-fair",
            Quality::Poor => "quality-poor",
            Quality::Unknown => "quality-unknown",
        }
    }
}

/// Seeing index value marking the best possible conditions
pub const MAX_SEEING_INDEX: i32 = 5;
/// Jet stream speed (m/s) below which the upper atmosphere counts as calm
pub const CALM_JET_STREAM: f64 = 20.0;

/// Highlight for hours where both seeing indices are at their maximum and
/// the jet stream is calm. Like `Quality`, derived when served, never stored.
pub fn is_super_good(
    seeing_index_one: Option<i32>,
    seeing_index_two: Option<i32>,
    jet_stream: Option<f64>,
) -> bool {
    seeing_index_one == Some(MAX_SEEING_INDEX)
        && seeing_index_two == Some(MAX_SEEING_INDEX)
        && jet_stream.is_some_and(|j| j < CALM_JET_STREAM)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegendEntry {
    pub label: String,
    pub css_class: String,
}

pub fn legend() -> Vec<LegendEntry> {
    [
        ("Excellent (≤1.1)", Quality::Excellent),
        ("Good (≤1.7)", Quality::Good),
        ("Fair (≤2.5)", Quality::Fair),
        ("Poor (>2.5)", Quality::Poor),
    ]
    .into_iter()
    .map(|(label, q)| LegendEntry {
        label: label.to_string(),
        css_class: q.css_class().to_string(),
    })
    .collect()
}
