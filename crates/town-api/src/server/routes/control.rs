#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateSimRequest {
    Config(SimConfig),
    WithOptions(CreateSimOptions),
}

#[derive(Debug, Deserialize)]
struct CreateSimOptions {
    config: SimConfig,
    auto_start: Option<bool>,
    checkpoint_dir: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateSimResponse {
    schema_version: String,
    sim_id: String,
    status: SimStatus,
    npc_count: usize,
    roster_error: Option<String>,
    replaced_existing_sim: bool,
    started: bool,
}

async fn create_sim(
    State(state): State<AppState>,
    Json(request): Json<CreateSimRequest>,
) -> Result<Json<CreateSimResponse>, HttpApiError> {
    let (config, auto_start, checkpoint_dir) = match request {
        CreateSimRequest::Config(config) => (config, false, default_checkpoint_dir()),
        CreateSimRequest::WithOptions(options) => (
            options.config,
            options.auto_start.unwrap_or(false),
            options
                .checkpoint_dir
                .filter(|dir| !dir.trim().is_empty())
                .unwrap_or_else(default_checkpoint_dir),
        ),
    };

    let mut inner = state.inner.lock().await;
    let replaced_existing_sim = inner.engine.is_some();

    let mut engine = EngineApi::from_config(config);
    engine
        .attach_checkpoint_store(&checkpoint_dir)
        .map_err(HttpApiError::from_checkpoint)?;

    if auto_start {
        engine.start();
    }

    let response = CreateSimResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id: engine.sim_id().to_string(),
        status: engine.status().clone(),
        npc_count: engine.world().npcs.len(),
        roster_error: engine.world().roster_error().map(str::to_string),
        replaced_existing_sim,
        started: auto_start,
    };
    inner.engine = Some(engine);

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct SimControlResponse {
    schema_version: String,
    sim_id: String,
    status: SimStatus,
    committed: Option<u64>,
}

async fn start_sim(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SimControlResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let status = engine.start().clone();

    Ok(Json(SimControlResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id: status.sim_id.clone(),
        status,
        committed: None,
    }))
}

async fn pause_sim(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SimControlResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let status = engine.pause().clone();

    Ok(Json(SimControlResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id: status.sim_id.clone(),
        status,
        committed: None,
    }))
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    ticks: Option<u64>,
}

async fn step_sim(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> Result<Json<SimControlResponse>, HttpApiError> {
    let ticks = request.ticks.unwrap_or(1);
    if ticks == 0 {
        return Err(HttpApiError::invalid_query(
            "ticks must be >= 1",
            Some("ticks=0".to_string()),
        ));
    }

    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let (status, committed) = engine.step(ticks);
    let status = status.clone();

    Ok(Json(SimControlResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id: status.sim_id.clone(),
        status,
        committed: Some(committed),
    }))
}

#[derive(Debug, Deserialize)]
struct RunToTickRequest {
    target_tick: u64,
}

async fn run_to_tick(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<RunToTickRequest>,
) -> Result<Json<SimControlResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;
    let (status, committed) = engine.run_to_tick(request.target_tick);
    let status = status.clone();

    Ok(Json(SimControlResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id: status.sim_id.clone(),
        status,
        committed: Some(committed),
    }))
}

async fn get_status(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_sim(&inner, &sim_id)?;
    let mut view = engine.status_view();
    if let Some(error) = engine.last_checkpoint_error() {
        view["last_checkpoint_error"] = Value::String(error.to_string());
    }
    Ok(Json(view))
}
