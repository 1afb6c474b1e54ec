pub mod forecast_service;
pub mod refresh_service;

pub use forecast_service::ForecastService;
pub use refresh_service::{RefreshOutcome, RefreshService};
