use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use newsradar_core::{Error, MatchResult, PublishedState, Record, RefreshMonitor, RefreshStatus};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub generation: u64,
    pub built_at: String,
    pub num_docs: usize,
    pub num_terms: usize,
    #[serde(flatten)]
    pub refresh: RefreshStatus,
}

#[derive(Clone)]
pub struct AppState {
    pub published: PublishedState,
    pub refresh: RefreshMonitor,
}

impl AppState {
    pub fn new(published: PublishedState, refresh: RefreshMonitor) -> Self {
        Self { published, refresh }
    }
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/predict", post(predict_handler))
        .route("/records", get(records_handler))
        .route("/status", get(status_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn predict_handler(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<MatchResult>, (StatusCode, Json<ErrorBody>)> {
    state
        .published
        .query(req.keyword.as_deref(), req.location.as_deref())
        .map(Json)
        .map_err(error_response)
}

pub async fn records_handler(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.published.current().corpus().records().to_vec())
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let snap = state.published.current();
    Json(StatusResponse {
        generation: snap.generation,
        built_at: snap.built_at.clone(),
        num_docs: snap.index().num_docs(),
        num_terms: snap.index().num_terms(),
        refresh: state.refresh.status(),
    })
}

fn error_response(err: Error) -> (StatusCode, Json<ErrorBody>) {
    if !err.is_client_visible() {
        tracing::error!(error = %err, "query failed");
    }
    let status = match &err {
        Error::MissingKeyword => StatusCode::BAD_REQUEST,
        Error::NoData => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody { error: err.to_string() }))
}
