use crate::app::dto::*;
use crate::app::engine::TraceEngine;
use crate::domain::error::GraphError;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct HttpState {
    pub engine: TraceEngine,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DepthQuery {
    #[serde(default)]
    max_depth: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

/// Unknown signatures are 404, bad parameters 400, everything else 500.
fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<GraphError>() {
        Some(GraphError::UnknownSignature(_)) => StatusCode::NOT_FOUND,
        Some(GraphError::InvalidParameter(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn build_router(engine: TraceEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/summary", get(summary))
        .route("/entry-points", get(entry_points))
        .route("/tree", post(tree))
        .route("/trees", get(trees))
        .route("/cycles", get(cycles))
        .route("/relations", get(relations))
        .route("/snapshot", get(snapshot))
        .route("/reload", post(reload))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: TraceEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run a blocking engine call off the async runtime and map its outcome to a response.
async fn blocking_json<T, F>(f: F) -> axum::response::Response
where
    T: serde::Serialize + Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match spawn_blocking(f).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(status_for(&e), format!("{e:#}")).into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("task join error: {e}"),
        )
        .into_response(),
    }
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn summary(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.summary())
}

async fn entry_points(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.entry_points())
}

async fn tree(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<TreeRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking_json(move || engine.tree(req)).await
}

async fn trees(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<DepthQuery>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking_json(move || engine.trees(q.max_depth)).await
}

async fn cycles(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking_json(move || Ok(engine.cycles())).await
}

async fn relations(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.relations())
}

async fn snapshot(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<DepthQuery>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking_json(move || engine.snapshot(q.max_depth)).await
}

async fn reload(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking_json(move || engine.reload()).await
}
