//! Main webserver implementation
//!
//! Exposes the search engine over HTTP: jobs are submitted with a POST and
//! polled by id until they reach a terminal state.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use engine::SearchEngine;
use serde::Deserialize;
use serde_json::json;
use shared::{logging, process_info, JobId, LeaderboardQuery, ProcessId, SearchJob, SearchRequest, SortMode};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;

/// Largest leaderboard page a poll may ask for
pub const MAX_PAGE_SIZE: usize = 500;

/// HTTP front end for a shared search engine
#[derive(Clone)]
pub struct WebServer {
    engine: SearchEngine,
    state: Arc<WebServerState>,
}

impl WebServer {
    pub fn new(engine: SearchEngine, bind_address: SocketAddr) -> Self {
        Self {
            engine,
            state: Arc::new(WebServerState::new(bind_address)),
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            // API routes
            .route("/api/search", post(create_search_handler))
            .route("/api/search/:id", get(get_search_handler))
            // Health check
            .route("/health", get(health_check))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Serve until Ctrl+C, sweeping expired jobs in the background
    pub async fn run(&self) -> WebServerResult<()> {
        let router = self.build_router();
        let address = self.state.bind_address;

        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {address}: {e}")))?;

        let sweeper = self
            .engine
            .registry()
            .spawn_sweeper(self.engine.config().sweep_interval);

        process_info!(ProcessId::current(), "🌐 Web server listening on http://{}", address);

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();
        served?;

        Ok(())
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<WebServerState> {
        &self.state
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal"),
        Err(err) => logging::log_error(ProcessId::current(), "Signal handling", &err),
    }
}

/// Leaderboard options accepted on the poll endpoint
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
    pub max_price: Option<f64>,
}

impl LeaderboardParams {
    pub fn into_query(self) -> WebServerResult<LeaderboardQuery> {
        let sort = match self.sort.as_deref() {
            None | Some("") => SortMode::default(),
            Some(raw) => raw.parse::<SortMode>().map_err(WebServerError::invalid)?,
        };
        if self.limit == Some(0) {
            return Err(WebServerError::invalid("limit must be at least 1"));
        }
        Ok(LeaderboardQuery {
            sort,
            limit: self.limit.map(|limit| limit.min(MAX_PAGE_SIZE)),
            min_score: self.min_score,
            max_price: self.max_price,
        })
    }
}

// HTTP Handlers

/// Submit a search; answers immediately with the queued job id
async fn create_search_handler(
    State(webserver): State<WebServer>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> WebServerResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|rejection| WebServerError::invalid(rejection.body_text()))?;
    let job_id = webserver.engine.submit(request).await?;

    process_info!(ProcessId::current(), "✅ Accepted search job {}", job_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "job_id": job_id,
            "status": "queued",
        })),
    ))
}

/// Poll a job, re-querying its leaderboard with the given options
async fn get_search_handler(
    State(webserver): State<WebServer>,
    Path(id): Path<String>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> WebServerResult<Json<SearchJob>> {
    let Query(params) = params.map_err(|rejection| WebServerError::invalid(rejection.body_text()))?;
    let query = params.into_query()?;

    let not_found = || WebServerError::JobNotFound { job_id: id.clone() };
    let job_id: JobId = id.parse().map_err(|_| not_found())?;
    let job = webserver.engine.job(job_id, &query).await.ok_or_else(not_found)?;

    Ok(Json(job))
}

/// Health check endpoint
async fn health_check(State(webserver): State<WebServer>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": webserver.state.get_uptime_seconds(),
        "jobs": webserver.engine.registry().len().await,
    }))
}
