use std::time::Duration;
use tokio::time;
use tracing::{debug, info, instrument, warn};

use crate::db::ForecastStore;
use crate::services::RefreshService;

/// Refresh every configured location on a fixed interval.
///
/// The first tick fires immediately. Failed refreshes are only logged and
/// picked up again on the next tick; there is no retry in between.
#[instrument(skip(refresh_service), fields(interval_minutes = %interval_minutes))]
pub async fn start_refresh_scheduler<S: ForecastStore>(
    refresh_service: RefreshService<S>,
    interval_minutes: u64,
) {
    let mut interval = time::interval(Duration::from_secs(interval_minutes.max(1) * 60));

    info!(
        "Refresh scheduler started with {} minute interval",
        interval_minutes
    );

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing all locations");

        let outcomes = refresh_service.refresh_all().await;
        let failed = outcomes.iter().filter(|o| !o.success).count();
        for outcome in outcomes.iter().filter(|o| !o.success) {
            warn!("Scheduled refresh of {} failed: {}", outcome.location, outcome.message);
        }
        info!(
            "Scheduled refresh finished: {} succeeded, {} failed",
            outcomes.len() - failed,
            failed
        );
    }
}
