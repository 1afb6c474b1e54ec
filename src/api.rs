use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::db::{DayCard, ForecastStore, ForecastView, HourEntry};
use crate::seeing::quality::LegendEntry;
use crate::services::{ForecastService, RefreshOutcome, RefreshService};

#[derive(Clone)]
pub struct AppState<S> {
    pub refresh_service: RefreshService<S>,
    pub forecast_service: ForecastService<S>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct LocationInfo {
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
    pub is_default: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationQuery {
    /// Location id; unknown or missing ids use the default location
    pub location: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_locations, get_seeing, refresh),
    components(schemas(
        HealthResponse,
        LocationInfo,
        ForecastView,
        DayCard,
        HourEntry,
        LegendEntry,
        RefreshOutcome
    ))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router<S: ForecastStore>(state: AppState<S>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/locations", get(list_locations::<S>))
        .route("/seeing", get(get_seeing::<S>))
        .route("/refresh", post(refresh::<S>))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument]
async fn health() -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses((status = 200, description = "Configured locations", body = [LocationInfo]))
)]
#[instrument(skip(state))]
async fn list_locations<S: ForecastStore>(
    State(state): State<AppState<S>>,
) -> Json<Vec<LocationInfo>> {
    let locations = state.refresh_service.locations();
    let default_id = locations.default_id();
    let list: Vec<LocationInfo> = locations
        .iter()
        .map(|l| LocationInfo {
            id: l.id.clone(),
            name: l.name.clone(),
            url: l.url.clone(),
            timezone: l.timezone.clone(),
            is_default: l.id == default_id,
        })
        .collect();
    Json(list)
}

#[utoipa::path(
    get,
    path = "/api/v1/seeing",
    params(LocationQuery),
    responses(
        (status = 200, description = "Stored forecast grouped by local day", body = ForecastView),
        (status = 500, description = "Storage failure")
    )
)]
#[instrument(skip(state))]
async fn get_seeing<S: ForecastStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ForecastView>, StatusCode> {
    debug!("Fetching forecast view for {:?}", query.location);
    let view = state
        .forecast_service
        .get_forecast(query.location.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to build forecast view for {:?}: {}", query.location, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!(
        "Retrieved forecast for {} with {} days",
        view.location_id,
        view.days.len()
    );
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    params(LocationQuery),
    responses(
        (status = 200, description = "Dataset replaced", body = RefreshOutcome),
        (status = 502, description = "Fetch, parse or storage failed; stored data unchanged", body = RefreshOutcome)
    )
)]
#[instrument(skip(state))]
async fn refresh<S: ForecastStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<LocationQuery>,
) -> (StatusCode, Json<RefreshOutcome>) {
    let outcome = state
        .refresh_service
        .refresh(query.location.as_deref())
        .await;

    if outcome.success {
        info!("Refresh of {} succeeded: {}", outcome.location, outcome.message);
        (StatusCode::OK, Json(outcome))
    } else {
        warn!("Refresh of {} failed: {}", outcome.location, outcome.message);
        (StatusCode::BAD_GATEWAY, Json(outcome))
    }
}
