use std::future::Future;

use crate::db::{DaySummary, DbError, LocationDataset, SeeingMeasurement, StoredForecast};

/// Storage seam for forecast data.
///
/// `replace_location` must swap a location's whole dataset atomically:
/// concurrent readers see either the old rows or the new rows, never a mix
/// and never an empty gap. Rows of other locations are not touched.
pub trait ForecastStore: Clone + Send + Sync + 'static {
    /// Replace all rows of `dataset.location_id`, returning the number of
    /// measurements written
    fn replace_location(
        &self,
        dataset: &LocationDataset,
    ) -> impl Future<Output = Result<usize, DbError>> + Send;

    /// Measurements of a location ordered by timestamp
    fn find_measurements(
        &self,
        location_id: &str,
    ) -> impl Future<Output = Result<Vec<SeeingMeasurement>, DbError>> + Send;

    /// Day summaries of a location ordered by day index
    fn find_day_summaries(
        &self,
        location_id: &str,
    ) -> impl Future<Output = Result<Vec<DaySummary>, DbError>> + Send;

    /// Measurements and day summaries of a location read from one snapshot,
    /// so a concurrent replace is seen entirely or not at all
    fn find_dataset(
        &self,
        location_id: &str,
    ) -> impl Future<Output = Result<StoredForecast, DbError>> + Send;
}
