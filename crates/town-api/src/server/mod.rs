use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ActionPayload, ActionResult, ActionType, ApiError, CheckpointMeta, ErrorCode, Event,
    PlayerAction, SimConfig, SimStatus, SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{
    inline_failure, CheckpointError, EngineApi, HttpNarrator, NarrativeBackend,
};

const DEFAULT_PAGE_SIZE: usize = 200;
const MAX_PAGE_SIZE: usize = 2000;
const DEFAULT_CHECKPOINT_DIR: &str = "town_checkpoints";

include!("error.rs");
include!("state.rs");
include!("routes/control.rs");
include!("routes/query.rs");
include!("routes/actions.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr) -> Result<(), ServerError> {
    let state = AppState::new(Arc::new(HttpNarrator::from_env()));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/sims", post(create_sim))
        .route("/api/v1/sims/{sim_id}/start", post(start_sim))
        .route("/api/v1/sims/{sim_id}/pause", post(pause_sim))
        .route("/api/v1/sims/{sim_id}/step", post(step_sim))
        .route("/api/v1/sims/{sim_id}/run_to_tick", post(run_to_tick))
        .route("/api/v1/sims/{sim_id}/status", get(get_status))
        .route("/api/v1/sims/{sim_id}/npc/{npc_name}", get(get_npc))
        .route("/api/v1/sims/{sim_id}/events", get(get_events))
        .route("/api/v1/sims/{sim_id}/snapshot", get(get_snapshot))
        .route("/api/v1/sims/{sim_id}/logs", get(get_logs))
        .route("/api/v1/sims/{sim_id}/actions/talk", post(action_talk))
        .route("/api/v1/sims/{sim_id}/actions/flirt", post(action_flirt))
        .route("/api/v1/sims/{sim_id}/actions/gift", post(action_gift))
        .route(
            "/api/v1/sims/{sim_id}/checkpoints",
            post(save_checkpoint).get(list_checkpoints),
        )
        .route(
            "/api/v1/sims/{sim_id}/checkpoints/{name}/restore",
            post(restore_checkpoint),
        )
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

#[cfg(test)]
mod tests;
