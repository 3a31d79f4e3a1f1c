use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::MonitorError;
use crate::logging::{ErrorLogger, LogContext};
use crate::models::Address;
use crate::monitor::{MonitorEngine, Observation};
use crate::store::{AddOutcome, WatchlistStore};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server error: {0}")]
    Server(String),
}

/// Response structure for the health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rpc_endpoint: String,
    pub head_block: u64,
    pub history_entries: usize,
}

/// Response structure for watchlist endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct WatchlistResponse {
    pub user_id: String,
    pub addresses: Vec<Address>,
    pub using_defaults: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddAddressRequest {
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddAddressResponse {
    pub user_id: String,
    pub address: Address,
    pub added: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub cleared: bool,
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ErrorResponse>)>;

/// Application state shared across handlers. The engine lock serializes every
/// observation so history diffs never interleave.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<MonitorEngine>>,
    pub watchlist: Arc<Mutex<WatchlistStore>>,
    pub rpc_endpoint: String,
}

impl AppState {
    pub fn new(engine: MonitorEngine, watchlist: WatchlistStore, rpc_endpoint: String) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            watchlist: Arc::new(Mutex::new(watchlist)),
            rpc_endpoint,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, MonitorError> {
        let engine = MonitorEngine::from_config(config)?;
        let watchlist = WatchlistStore::load(&config.storage.watchlist_path, config.default_watchlist()?)?;
        Ok(Self::new(engine, watchlist, config.rpc.endpoint.clone()))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/addresses/:address", get(get_address))
        .route("/watchlists/:user", get(get_watchlist).post(add_address))
        .route("/watchlists/:user/observations", get(get_watchlist_observations))
        .route("/history", delete(reset_history))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// HTTP API server
pub struct ApiServer {
    state: AppState,
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    pub fn new(state: AppState, host: String, port: u16) -> Self {
        Self { state, host, port }
    }

    pub async fn start(&self) -> Result<(), ApiError> {
        let app = create_router(self.state.clone());

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        LogContext::new("api", "start")
            .with_metadata("addr", json!(addr))
            .info("HTTP API server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

fn status_for(error: &MonitorError) -> StatusCode {
    match error {
        MonitorError::Validation(_) => StatusCode::BAD_REQUEST,
        MonitorError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
        MonitorError::Fetch(_) => StatusCode::BAD_GATEWAY,
        MonitorError::Store(_) | MonitorError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: MonitorError, operation: &str) -> (StatusCode, Json<ErrorResponse>) {
    ErrorLogger::log_error(&error, Some(LogContext::new("api", operation)));
    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.code().to_string(),
            message: error.to_string(),
        }),
    )
}

/// GET /health - probe the RPC endpoint
pub async fn get_health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let engine = state.engine.lock().await;
    let head_block = engine
        .ensure_connected()
        .await
        .map_err(|e| reject(e, "get_health"))?;

    Ok((
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            rpc_endpoint: state.rpc_endpoint.clone(),
            head_block,
            history_entries: engine.history().len(),
        }),
    ))
}

/// GET /addresses/:address - observe a single address
pub async fn get_address(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Observation> {
    let address = Address::parse(&address).map_err(|e| reject(e.into(), "get_address"))?;
    let mut engine = state.engine.lock().await;
    let observation = engine
        .observe(&address)
        .await
        .map_err(|e| reject(e, "get_address"))?;
    Ok((StatusCode::OK, Json(observation)))
}

/// GET /watchlists/:user - configured addresses, or the defaults
pub async fn get_watchlist(Path(user): Path<String>, State(state): State<AppState>) -> ApiResult<WatchlistResponse> {
    let watchlist = state.watchlist.lock().await;
    let configured = watchlist.list(&user).map(<[Address]>::to_vec);
    let using_defaults = configured.is_none();

    Ok((
        StatusCode::OK,
        Json(WatchlistResponse {
            addresses: configured.unwrap_or_else(|| watchlist.defaults().to_vec()),
            user_id: user,
            using_defaults,
        }),
    ))
}

/// POST /watchlists/:user - add an address; 201 when added, 200 when already present
pub async fn add_address(
    Path(user): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AddAddressRequest>,
) -> ApiResult<AddAddressResponse> {
    let address = Address::parse(&request.address).map_err(|e| reject(e.into(), "add_address"))?;
    let outcome = state
        .watchlist
        .lock()
        .await
        .add_address(&user, address.clone())
        .map_err(|e| reject(e, "add_address"))?;

    let added = outcome == AddOutcome::Added;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(AddAddressResponse {
            user_id: user,
            address,
            added,
        }),
    ))
}

/// GET /watchlists/:user/observations - observe every address on the watchlist
pub async fn get_watchlist_observations(
    Path(user): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<Observation>> {
    let addresses = state.watchlist.lock().await.addresses_for(&user);
    let mut engine = state.engine.lock().await;
    let observations = engine
        .observe_all(&addresses)
        .await
        .map_err(|e| reject(e, "get_watchlist_observations"))?;
    Ok((StatusCode::OK, Json(observations)))
}

/// DELETE /history - clear all recorded balances
pub async fn reset_history(State(state): State<AppState>) -> ApiResult<ResetResponse> {
    state
        .engine
        .lock()
        .await
        .reset_history()
        .map_err(|e| reject(e, "reset_history"))?;
    Ok((StatusCode::OK, Json(ResetResponse { cleared: true })))
}
