#[derive(Debug, Deserialize)]
struct TalkRequest {
    npc: String,
    line: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlirtRequest {
    npc: String,
}

#[derive(Debug, Deserialize)]
struct GiftRequest {
    npc: String,
    item: String,
}

#[derive(Debug, Serialize)]
struct ActionResponse {
    schema_version: String,
    sim_id: String,
    result: ActionResult,
    /// Talk only: the NPC's generated reply, or an inline error string when
    /// the narrator is unreachable.
    reply: Option<String>,
}

async fn action_talk(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<TalkRequest>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    // Queue the action and render the scene prompt under the lock; the
    // narrator call happens after the lock is released so a slow endpoint
    // cannot stall the whole API.
    let (result, prompt) = {
        let mut inner = state.inner.lock().await;
        let engine = require_sim_mut(&mut inner, &sim_id)?;

        let action = PlayerAction::new(
            next_action_id(engine),
            sim_id.clone(),
            engine.status().current_tick,
            ActionType::Talk,
            ActionPayload::Talk {
                npc: request.npc.clone(),
                line: request.line.clone(),
            },
        );
        let result = engine.submit_action(action);
        let prompt = if result.accepted {
            engine.scene_prompt(&request.npc, request.line.as_deref())
        } else {
            None
        };
        (result, prompt)
    };

    let reply = match prompt {
        Some(prompt) => Some(match state.narrator.complete(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(npc = %request.npc, error = %err, "narrator call failed");
                inline_failure(&err)
            }
        }),
        None => None,
    };

    Ok(Json(ActionResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        result,
        reply,
    }))
}

async fn action_flirt(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<FlirtRequest>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;

    let action = PlayerAction::new(
        next_action_id(engine),
        sim_id.clone(),
        engine.status().current_tick,
        ActionType::Flirt,
        ActionPayload::Flirt {
            npc: request.npc,
        },
    );
    let result = engine.submit_action(action);

    Ok(Json(ActionResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        result,
        reply: None,
    }))
}

async fn action_gift(
    Path(sim_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<GiftRequest>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_sim_mut(&mut inner, &sim_id)?;

    let action = PlayerAction::new(
        next_action_id(engine),
        sim_id.clone(),
        engine.status().current_tick,
        ActionType::Gift,
        ActionPayload::Gift {
            npc: request.npc,
            item: request.item,
        },
    );
    let result = engine.submit_action(action);

    Ok(Json(ActionResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        sim_id,
        result,
        reply: None,
    }))
}
