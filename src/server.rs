//! HTTP trigger surface for the import pipeline.
//!
//! A single authenticated endpoint starts a synchronous import run and
//! answers with the run's stats. The endpoint always returns a stats object
//! once work has begun, even when the run was partial; only the
//! fatal/configuration class (bad secret, missing or unknown brand) is
//! rejected up front with an error body and no stats.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/import` | Run an import for one brand, or "all" |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Error responses use `{ "error": { "code": "...", "message": "..." } }`.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::cms::{CmsClient, VehicleStore};
use crate::config::Config;
use crate::images::{HttpImageDownloader, ImageDownloader};
use crate::import::{import_all_brands, import_brand};
use crate::models::{find_brand, ImportStats};
use crate::scrapers::source::HttpPageFetcher;
use crate::scrapers::traits::{Clock, PageFetcher, SystemClock};

/// Shared state for all route handlers. The pipeline collaborators are
/// trait objects so tests can assemble the router around fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub store: Arc<dyn VehicleStore>,
    pub images: Arc<dyn ImageDownloader>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub brand: Option<String>,
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub download_images: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub stats: ImportStats,
}

/// Starts the trigger server. Runs until the process is terminated.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let bind = config.bind.clone();
    let state = AppState {
        fetcher: Arc::new(HttpPageFetcher::new(&config.source_base_url)?),
        store: Arc::new(CmsClient::new(&config.cms_base_url)?),
        images: Arc::new(HttpImageDownloader::new()?),
        clock: Arc::new(SystemClock),
        config: Arc::new(config),
    };

    let app = router(state);

    info!("Import trigger listening on http://{}", bind);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/import", post(handle_import))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn handle_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    check_bearer(&headers, &state.config.import_secret)?;

    let brand_key = request
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| bad_request("brand is required"))?;

    let settings = state.config.import_settings(request.max_pages);
    let images: Option<&dyn ImageDownloader> =
        request.download_images.then(|| state.images.as_ref());

    info!("Import triggered for '{}', up to {} pages", brand_key, settings.max_pages);

    let stats = if brand_key.eq_ignore_ascii_case("all") {
        import_all_brands(
            state.fetcher.as_ref(),
            state.store.as_ref(),
            state.clock.as_ref(),
            &settings,
            images,
        )
        .await
    } else {
        let brand = find_brand(brand_key)
            .ok_or_else(|| bad_request(format!("unknown brand '{}'", brand_key)))?;
        import_brand(
            state.fetcher.as_ref(),
            state.store.as_ref(),
            state.clock.as_ref(),
            brand,
            &settings,
            images,
        )
        .await
    };

    Ok(Json(ImportResponse { stats }))
}

/// Validates the bearer token by exact string equality against the
/// configured secret.
fn check_bearer(headers: &HeaderMap, secret: &str) -> Result<(), AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("missing bearer token"))?;

    if token != secret {
        return Err(unauthorized("invalid token"));
    }
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error type that converts into an HTTP response with a JSON body.
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail { code: self.code, message: self.message },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn unauthorized(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNAUTHORIZED,
        code: "unauthorized".to_string(),
        message: message.into(),
    }
}
