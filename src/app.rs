use std::sync::Arc;

use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::db::{DbPool, SeeingRepository};
use crate::fetcher::SeeingFetcher;
use crate::scheduler;
use crate::services::{ForecastService, RefreshService};

/// Application with all spawned background tasks and server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub refresh_scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// This creates the repository, services and fetcher, and spawns:
    /// - HTTP API server (Axum)
    /// - Refresh scheduler (all locations, configurable interval)
    pub async fn build(config: Config, pool: DbPool) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let locations = Arc::new(config.locations());
        let repo = SeeingRepository::new(pool.pool().clone());
        let fetcher = SeeingFetcher::new(&config.user_agent, config.fetch_timeout())?;

        let refresh_service = RefreshService::new(repo.clone(), fetcher, locations.clone());
        let forecast_service = ForecastService::new(repo, locations);

        let refresh_scheduler_handle = {
            let refresh_service = refresh_service.clone();
            let interval = config.refresh_interval_minutes;
            tokio::spawn(async move {
                scheduler::start_refresh_scheduler(refresh_service, interval).await;
            })
        };

        let app_state = AppState {
            refresh_service,
            forecast_service,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            refresh_scheduler_handle,
        })
    }

    /// Run until the server stops; the scheduler runs in the background
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
