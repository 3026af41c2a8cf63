#[derive(Clone)]
struct AppState {
    inner: Arc<Mutex<ServerInner>>,
    narrator: Arc<dyn NarrativeBackend>,
}

impl AppState {
    fn new(narrator: Arc<dyn NarrativeBackend>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServerInner::default())),
            narrator,
        }
    }
}

#[derive(Debug, Default)]
struct ServerInner {
    engine: Option<EngineApi>,
}

fn require_sim<'a>(inner: &'a ServerInner, sim_id: &str) -> Result<&'a EngineApi, HttpApiError> {
    let Some(engine) = inner.engine.as_ref() else {
        return Err(HttpApiError::sim_not_found(sim_id, None));
    };

    if engine.sim_id() != sim_id {
        return Err(HttpApiError::sim_not_found(sim_id, Some(engine.sim_id())));
    }

    Ok(engine)
}

fn require_sim_mut<'a>(
    inner: &'a mut ServerInner,
    sim_id: &str,
) -> Result<&'a mut EngineApi, HttpApiError> {
    let active_sim_id = inner
        .engine
        .as_ref()
        .map(|engine| engine.sim_id().to_string());
    let Some(engine) = inner.engine.as_mut() else {
        return Err(HttpApiError::sim_not_found(sim_id, None));
    };

    if engine.sim_id() != sim_id {
        return Err(HttpApiError::sim_not_found(sim_id, active_sim_id.as_deref()));
    }

    Ok(engine)
}
