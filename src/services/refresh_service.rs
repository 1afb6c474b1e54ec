use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::config::{Location, Locations};
use crate::db::{ForecastStore, LocationDataset};
use crate::fetch_error::FetchError;
use crate::fetcher::SeeingFetcher;
use crate::seeing::parse_seeing_table;
use crate::seeing::time::resolve_timezone;

/// Result of one refresh, with a message meant for people
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshOutcome {
    pub success: bool,
    pub location: String,
    pub message: String,
}

/// Fetches, parses and stores forecasts for configured locations.
///
/// A successful refresh replaces the location's stored dataset wholesale.
/// A failed one leaves it untouched. Refreshes of the same location are
/// serialized; different locations proceed independently.
#[derive(Clone)]
pub struct RefreshService<S> {
    store: S,
    fetcher: SeeingFetcher,
    locations: Arc<Locations>,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl<S: ForecastStore> RefreshService<S> {
    pub fn new(store: S, fetcher: SeeingFetcher, locations: Arc<Locations>) -> Self {
        Self {
            store,
            fetcher,
            locations,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    /// Refresh one location; unknown or missing ids refresh the default
    #[instrument(skip(self))]
    pub async fn refresh(&self, requested: Option<&str>) -> RefreshOutcome {
        let location = self.locations.resolve(requested).clone();

        let lock = self.lock_for(&location.id);
        let _guard = lock.lock().await;
        debug!("Acquired refresh lock for {}", location.id);

        let dataset = match self.fetch_dataset(&location).await {
            Ok(dataset) => dataset,
            Err(e) => {
                let message = if e.is_transport() {
                    format!("Unable to reach forecast source: {}", e)
                } else {
                    format!("Parsing error: {}", e)
                };
                error!("Refresh of {} failed: {}", location.id, message);
                return RefreshOutcome {
                    success: false,
                    location: location.id,
                    message,
                };
            }
        };

        match self.store.replace_location(&dataset).await {
            Ok(stored) => {
                info!("Stored {} hourly observations for {}", stored, location.id);
                RefreshOutcome {
                    success: true,
                    location: location.id,
                    message: format!("Stored {} hourly observations", stored),
                }
            }
            Err(e) => {
                error!("Failed to store dataset for {}: {}", location.id, e);
                RefreshOutcome {
                    success: false,
                    location: location.id,
                    message: format!("Storage error: {}", e),
                }
            }
        }
    }

    /// Refresh every configured location concurrently
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> Vec<RefreshOutcome> {
        let ids: Vec<String> = self.locations.iter().map(|l| l.id.clone()).collect();
        futures::future::join_all(ids.iter().map(|id| self.refresh(Some(id.as_str())))).await
    }

    async fn fetch_dataset(&self, location: &Location) -> Result<LocationDataset, FetchError> {
        let tz = resolve_timezone(&location.timezone);
        let html = self.fetcher.fetch_page(&location.url).await?;
        let parsed = parse_seeing_table(&html, tz)?;
        debug!(
            "Parsed {} readings and {} days for {}",
            parsed.readings.len(),
            parsed.days.len(),
            location.id
        );
        Ok(LocationDataset::from_parsed(&location.id, parsed))
    }

    fn lock_for(&self, location_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(location_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
