//! Defines the Axum API routes and handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::config::{Config, Printer};
use crate::octoprint::{OctoPrintClient, PrinterStatus};
use crate::spoolman::SpoolmanClient;
use crate::upstream::{ClientError, InventoryApi, PrinterApi, DEFAULT_TOOL};
use crate::web::cors::cors_middleware;
use crate::web::models::{
    AssignRequest, AssignResponse, ErrorResponse, HealthResponse, PrinterView, PrintersResponse,
    SpoolView, SpoolsResponse,
};
use crate::web::pages::{home_page, is_valid_spool_id, select_page};
use crate::web::view::{current_spool, printer_view, spool_view};

/// Helper to create a JSON error response with a message and status code
fn json_error(message: &str, status: StatusCode) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message.to_string() })).into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        json_error(&self.to_string(), self.status())
    }
}

pub struct AppStateInner {
    pub config: Config,
    /// Printer id -> client. Built once at startup and never mutated.
    pub printer_clients: HashMap<String, Arc<dyn PrinterApi>>,
    pub inventory: Arc<dyn InventoryApi>,
    pub static_dir: PathBuf,
}
pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    /// Wire real OctoPrint and Spoolman clients for every configured service.
    pub fn from_config(config: Config, static_dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let mut printer_clients: HashMap<String, Arc<dyn PrinterApi>> = HashMap::new();
        for printer in &config.printers {
            let client = OctoPrintClient::new(&printer.octoprint_url, &printer.api_key, config.request_timeout)?;
            printer_clients.insert(printer.id.clone(), Arc::new(client));
        }
        let inventory = Arc::new(SpoolmanClient::new(&config.spoolman_url, config.request_timeout)?);
        Ok(Self {
            config,
            printer_clients,
            inventory,
            static_dir: static_dir.into(),
        })
    }
}

/// Creates the Axum router with all the endpoints.
pub fn create_router(config: Config, static_dir: impl Into<PathBuf>) -> Result<Router, ClientError> {
    let state = AppStateInner::from_config(config, static_dir)?;
    Ok(create_router_with_state(Arc::new(state)))
}

pub fn create_router_with_state(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(home_handler))
        .route("/select/{spool_id}", get(select_handler))
        .route("/api/printers", get(list_printers))
        .route("/api/spool/{spool_id}", get(get_spool))
        .route("/api/spools", get(list_spools))
        .route("/api/assign", post(assign_spool).fallback(method_not_allowed))
        .route("/api/health", get(health))
        .nest_service("/static", static_files)
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn home_handler() -> Html<&'static str> {
    Html(home_page())
}

async fn select_handler(Path(spool_id): Path<String>) -> axum::response::Response {
    if !is_valid_spool_id(&spool_id) {
        return (StatusCode::BAD_REQUEST, "Invalid spool ID").into_response();
    }
    Html(select_page(&spool_id)).into_response()
}

/// Status and loaded spool for one printer. Never fails: upstream errors
/// degrade to "Unknown" and no spool summary.
async fn printer_entry(state: &AppStateInner, printer: &Printer) -> PrinterView {
    let Some(client) = state.printer_clients.get(&printer.id) else {
        return printer_view(printer, PrinterStatus::Unknown, None);
    };

    let status = match client.get_state().await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("Failed to get state of printer {}: {}", printer.id, e);
            PrinterStatus::Unknown
        }
    };

    let current = match client.get_current_spool(DEFAULT_TOOL).await {
        Ok(Some(spool_id)) if !is_valid_spool_id(&spool_id) => {
            tracing::warn!("Printer {} reported malformed spool id {:?}", printer.id, spool_id);
            None
        }
        Ok(Some(spool_id)) => match state.inventory.get_spool(&spool_id).await {
            Ok(spool) => Some(current_spool(&spool_id, &spool)),
            Err(e) => {
                tracing::warn!("Failed to resolve spool {} loaded on printer {}: {}", spool_id, printer.id, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to get current spool of printer {}: {}", printer.id, e);
            None
        }
    };

    printer_view(printer, status, current)
}

/// GET /api/printers
async fn list_printers(State(state): State<AppState>) -> Json<PrintersResponse> {
    let printers = join_all(state.config.printers.iter().map(|p| printer_entry(&state, p))).await;
    Json(PrintersResponse { printers })
}

/// GET /api/spool/{spool_id}
async fn get_spool(
    State(state): State<AppState>,
    Path(spool_id): Path<String>,
) -> Result<Json<SpoolView>, ApiError> {
    if !is_valid_spool_id(&spool_id) {
        return Err(ApiError::InvalidRequest("Invalid spool ID".to_string()));
    }
    match state.inventory.get_spool(&spool_id).await {
        Ok(spool) => {
            let view = spool_view(&spool_id, &spool);
            tracing::debug!("Spool {} resolved: {:?}", spool_id, view);
            Ok(Json(view))
        }
        Err(ClientError::NotFound) => Err(ApiError::NotFound("Spool not found".to_string())),
        Err(e) => {
            tracing::error!("Failed to fetch spool {}: {}", spool_id, e);
            Err(ApiError::Upstream("Failed to fetch spool".to_string()))
        }
    }
}

/// GET /api/spools -- every non-archived spool in the inventory
async fn list_spools(State(state): State<AppState>) -> Result<Json<SpoolsResponse>, ApiError> {
    let spools = state.inventory.list_spools().await.map_err(|e| {
        tracing::error!("Failed to list spools: {}", e);
        ApiError::Upstream("Failed to list spools".to_string())
    })?;
    let spools = spools
        .iter()
        .filter(|s| !s.archived)
        .map(|s| spool_view(&s.id.to_string(), s))
        .collect();
    Ok(Json(SpoolsResponse { spools }))
}

/// POST /api/assign
async fn assign_spool(
    State(state): State<AppState>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<AssignResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected assign body: {}", e);
        ApiError::InvalidRequest("Invalid request body".to_string())
    })?;

    let client = state
        .printer_clients
        .get(&req.printer_id)
        .ok_or_else(|| ApiError::InvalidRequest("Invalid printer ID".to_string()))?;

    if let Err(e) = client.set_active_spool(&req.spool_id, DEFAULT_TOOL).await {
        tracing::error!("Failed to set spool {} on printer {}: {}", req.spool_id, req.printer_id, e);
        return Err(ApiError::Upstream("Failed to set spool".to_string()));
    }

    tracing::info!("Spool {} assigned to printer {}", req.spool_id, req.printer_id);
    Ok(Json(AssignResponse {
        success: true,
        message: format!("Spool {} assigned to printer {}", req.spool_id, req.printer_id),
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        printers: state.config.printers.len(),
    })
}
