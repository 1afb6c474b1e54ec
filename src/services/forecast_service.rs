use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, instrument};

use crate::config::Locations;
use crate::db::{
    DayCard, DaySummary, DbError, ForecastStore, ForecastView, HourEntry, SeeingMeasurement,
    StoredForecast,
};
use crate::seeing::quality::{is_super_good, legend, Quality};
use crate::seeing::time::{local_date, resolve_timezone};

/// Read side of the stored forecasts.
///
/// Readings are grouped by the local day re-derived from their UTC instant
/// and the location's timezone. Quality tiers and highlights are computed
/// here on every read.
#[derive(Clone)]
pub struct ForecastService<S> {
    store: S,
    locations: Arc<Locations>,
}

impl<S: ForecastStore> ForecastService<S> {
    pub fn new(store: S, locations: Arc<Locations>) -> Self {
        Self { store, locations }
    }

    #[instrument(skip(self))]
    pub async fn get_forecast(&self, requested: Option<&str>) -> Result<ForecastView, DbError> {
        let location = self.locations.resolve(requested);
        let tz = resolve_timezone(&location.timezone);

        let StoredForecast {
            measurements,
            days: summaries,
        } = self.store.find_dataset(&location.id).await?;
        debug!(
            "Building view from {} measurements and {} day summaries",
            measurements.len(),
            summaries.len()
        );

        let days = Self::build_day_cards(&measurements, &summaries, &tz);
        let super_good_slots = Self::super_good_slots(&days);
        let last_updated = measurements
            .last()
            .map(|m| m.timestamp.with_timezone(&tz).to_rfc3339());

        Ok(ForecastView {
            location_id: location.id.clone(),
            location: location.name.clone(),
            source_url: location.url.clone(),
            timezone: location.timezone.clone(),
            days,
            super_good_slots,
            legend: legend(),
            last_updated,
        })
    }

    fn build_day_cards(
        measurements: &[SeeingMeasurement],
        summaries: &[DaySummary],
        tz: &Tz,
    ) -> Vec<DayCard> {
        let mut groups: BTreeMap<NaiveDate, Vec<HourEntry>> = BTreeMap::new();
        for m in measurements {
            groups
                .entry(local_date(m.timestamp, tz))
                .or_default()
                .push(Self::hour_entry(m, tz));
        }

        let by_date: HashMap<NaiveDate, &DaySummary> =
            summaries.iter().map(|s| (s.day_date, s)).collect();

        groups
            .into_iter()
            .map(|(date, rows)| {
                let summary = by_date.get(&date);
                let label = match summary.and_then(|s| s.weekday.as_deref()) {
                    Some(weekday) if !weekday.is_empty() => {
                        format!("{} {}", weekday, date.format("%Y-%m-%d"))
                    }
                    _ => date.format("%a, %b %d").to_string(),
                };
                DayCard {
                    date,
                    label,
                    meta: summary.and_then(|s| s.meta.clone()),
                    rows,
                }
            })
            .collect()
    }

    fn hour_entry(m: &SeeingMeasurement, tz: &Tz) -> HourEntry {
        let local = m.timestamp.with_timezone(tz);
        let quality = Quality::classify(m.arc_seconds);

        HourEntry {
            hour: local.format("%H").to_string(),
            datetime: local.to_rfc3339(),
            cloud_low: m.cloud_low,
            cloud_mid: m.cloud_mid,
            cloud_high: m.cloud_high,
            arc_seconds: m.arc_seconds,
            seeing_index_one: m.seeing_index_one,
            seeing_index_two: m.seeing_index_two,
            jet_stream: m.jet_stream,
            bad_layer_bottom: m.bad_layer_bottom,
            bad_layer_top: m.bad_layer_top,
            bad_layer_gradient: m.bad_layer_gradient,
            temperature: m.temperature,
            humidity: m.humidity,
            celestial: m.celestial.clone(),
            quality_label: quality.label().to_string(),
            quality_class: quality.css_class().to_string(),
            super_good: is_super_good(m.seeing_index_one, m.seeing_index_two, m.jet_stream),
        }
    }

    fn super_good_slots(days: &[DayCard]) -> Vec<String> {
        days.iter()
            .flat_map(|card| {
                card.rows
                    .iter()
                    .filter(|row| row.super_good)
                    .map(move |row| format!("{} {}:00", card.label, row.hour))
            })
            .collect()
    }
}
