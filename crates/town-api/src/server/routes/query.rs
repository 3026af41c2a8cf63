async fn get_npc(
    Path((sim_id, npc_name)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Value>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_sim(&inner, &sim_id)?;
    engine
        .npc_view(&npc_name)
        .map(Json)
        .ok_or_else(|| HttpApiError::npc_not_found(&npc_name))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    offset: Option<usize>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EventsResponse {
    schema_version: String,
    sim_id: String,
    total: usize,
    offset: usize,
    events: Vec<Event>,
}

async fn get_events(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_sim(&inner, &sim_id)?;

    let (_, total) = engine.events_page(0, 0);
    let (offset, limit) = paginate(total, query.offset, query.limit)?;
    let (page, total) = engine.events_page(offset, limit);

    Ok(Json(EventsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        total,
        offset,
        events: page.into_iter().cloned().collect(),
    }))
}

#[derive(Debug, Serialize)]
struct SnapshotResponse {
    schema_version: String,
    sim_id: String,
    tick: u64,
    snapshot: String,
}

async fn get_snapshot(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SnapshotResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let tick = engine.status().current_tick;
    let snapshot = engine.narrative_snapshot();

    Ok(Json(SnapshotResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        tick,
        snapshot,
    }))
}

async fn get_logs(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_sim(&inner, &sim_id)?;
    Ok(Json(engine.rolling_logs()))
}

#[derive(Debug, Deserialize)]
struct SaveCheckpointRequest {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckpointResponse {
    schema_version: String,
    sim_id: String,
    checkpoint: CheckpointMeta,
}

async fn save_checkpoint(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SaveCheckpointRequest>,
) -> Result<Json<CheckpointResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let meta = engine
        .save_checkpoint(&request.name, request.description.as_deref().unwrap_or(""))
        .map_err(HttpApiError::from_checkpoint)?;

    Ok(Json(CheckpointResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        checkpoint: meta,
    }))
}

#[derive(Debug, Serialize)]
struct CheckpointListResponse {
    schema_version: String,
    sim_id: String,
    checkpoints: Vec<CheckpointMeta>,
}

async fn list_checkpoints(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CheckpointListResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_sim(&inner, &sim_id)?;
    let checkpoints = engine
        .list_checkpoints()
        .map_err(HttpApiError::from_checkpoint)?;

    Ok(Json(CheckpointListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        checkpoints,
    }))
}

async fn restore_checkpoint(
    Path((sim_id, name)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<CheckpointResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let meta = engine
        .restore_checkpoint(&name)
        .map_err(HttpApiError::from_checkpoint)?;

    Ok(Json(CheckpointResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        checkpoint: meta,
    }))
}
