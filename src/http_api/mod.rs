use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    Clock, ItemStatus, LibraryError, SchedulerConfig, SystemClock, TrainingCadence, TrainingItem,
    TrainingLibrary,
};

#[derive(Clone)]
pub struct AppState {
    library: Arc<RwLock<TrainingLibrary>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(library: TrainingLibrary) -> Self {
        Self::with_clock(library, Arc::new(SystemClock))
    }

    pub fn with_clock(library: TrainingLibrary, clock: Arc<dyn Clock>) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
            clock,
        }
    }

    fn library(&self) -> Arc<RwLock<TrainingLibrary>> {
        self.library.clone()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<LibraryError> for ApiError {
    fn from(value: LibraryError) -> Self {
        match value {
            LibraryError::NotFound(_) => ApiError::NotFound(value.to_string()),
            LibraryError::DuplicateId(_) => ApiError::Conflict(value.to_string()),
            LibraryError::Validation(_) => ApiError::Invalid(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        }
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Body for creating an item. Scheduling fields are owned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemPayload {
    pub name: String,
    #[serde(default)]
    pub cadence: TrainingCadence,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub assigned_tags: Vec<String>,
}

impl From<NewItemPayload> for TrainingItem {
    fn from(payload: NewItemPayload) -> Self {
        let mut item = TrainingItem::new(payload.name, payload.cadence);
        item.topic = payload.topic;
        item.team_id = payload.team_id;
        item.assigned_tags = payload.assigned_tags;
        item
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompletionPayload {
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config))
        .route("/items", get(list_items).post(create_item))
        .route("/items/bulk", post(create_items))
        .route("/items/:id", get(get_item).delete(delete_item))
        .route("/items/:id/complete", post(complete_item))
        .route("/status", get(list_statuses))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, library: TrainingLibrary) -> std::io::Result<()> {
    let state = AppState::new(library);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_config(State(state): State<AppState>) -> Json<SchedulerConfig> {
    let library = state.library();
    let config = library.read().config().clone();
    Json(config)
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<TrainingItem>> {
    let library = state.library();
    let items = library.read().items().to_vec();
    Json(items)
}

async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<TrainingItem>, ApiError> {
    let library = state.library();
    let item = library.read().find_item(&item_id).cloned();
    match item {
        Some(item) => Ok(Json(item)),
        None => Err(ApiError::not_found(format!("item {item_id} not found"))),
    }
}

async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItemPayload>,
) -> Result<(StatusCode, Json<TrainingItem>), ApiError> {
    let now = state.now();
    let library = state.library();
    let created = {
        let mut guard = library.write();
        guard.add_item(payload.into(), now)?.clone()
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn create_items(
    State(state): State<AppState>,
    Json(payloads): Json<Vec<NewItemPayload>>,
) -> Result<(StatusCode, Json<Vec<TrainingItem>>), ApiError> {
    let now = state.now();
    let library = state.library();
    let created = {
        let mut guard = library.write();
        let ids = guard.add_items(payloads.into_iter().map(Into::into).collect(), now)?;
        ids.iter()
            .map(|id| {
                guard
                    .find_item(id)
                    .cloned()
                    .ok_or_else(|| ApiError::internal(format!("item {id} missing after insert")))
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn complete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    payload: Option<Json<CompletionPayload>>,
) -> Result<Json<TrainingItem>, ApiError> {
    let completed_at = payload
        .and_then(|Json(body)| body.completed_at)
        .unwrap_or_else(|| state.now());
    let library = state.library();
    let updated = {
        let mut guard = library.write();
        guard.record_completion(&item_id, completed_at)?.clone()
    };
    Ok(Json(updated))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let library = state.library();
    let removed = library.write().remove_item(&item_id);
    if !removed {
        return Err(ApiError::not_found(format!("item {item_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_statuses(State(state): State<AppState>) -> Json<Vec<ItemStatus>> {
    let now = state.now();
    let library = state.library();
    let statuses = library.read().statuses(now);
    Json(statuses)
}
