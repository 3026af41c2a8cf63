use super::*;

use contracts::roster::NpcSeed;

fn test_state() -> AppState {
    AppState::new(Arc::new(crate::ScriptedNarrator::new("Morning to you too.")))
}

fn temp_path(name: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("maplemere_api_{name}_{nanos}"))
}

fn seed(name: &str, age: u32, occupation: &str) -> NpcSeed {
    NpcSeed {
        name: name.to_string(),
        age,
        gender: "female".to_string(),
        occupation: occupation.to_string(),
        traits: Vec::new(),
        relationships: Default::default(),
        background: String::new(),
        secrets: Vec::new(),
        goals: Vec::new(),
    }
}

fn write_temp_roster() -> std::path::PathBuf {
    let seeds = vec![
        seed("Mara Voss", 34, "barista"),
        seed("Jonas Hale", 41, "barista"),
    ];
    let path = temp_path("roster").with_extension("json");
    std::fs::write(&path, serde_json::to_string(&seeds).expect("serialize"))
        .expect("write roster");
    path
}

async fn create_test_sim(state: &AppState, roster: Option<&std::path::Path>) -> String {
    let config = SimConfig {
        roster_path: roster.map(|p| p.display().to_string()),
        ..SimConfig::default()
    };
    let response = create_sim(
        State(state.clone()),
        Json(CreateSimRequest::WithOptions(CreateSimOptions {
            config,
            auto_start: Some(true),
            checkpoint_dir: Some(temp_path("ckpt").display().to_string()),
        })),
    )
    .await
    .expect("create sim");
    response.0.sim_id
}

#[tokio::test]
async fn create_step_and_status_flow() {
    let state = test_state();
    let sim_id = create_test_sim(&state, None).await;

    let response = step_sim(
        Path(sim_id.clone()),
        State(state.clone()),
        Json(StepRequest { ticks: Some(3) }),
    )
    .await
    .expect("step");
    assert_eq!(response.0.committed, Some(3));
    assert_eq!(response.0.status.current_tick, 3);

    let status = get_status(Path(sim_id), State(state))
        .await
        .expect("status");
    assert_eq!(status.0["status"]["current_tick"], 3);
}

#[tokio::test]
async fn unknown_sim_returns_not_found() {
    let state = test_state();
    let err = start_sim(Path("ghost_sim".to_string()), State(state))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn talk_action_returns_scripted_reply_and_applies_next_tick() {
    let state = test_state();
    let roster = write_temp_roster();
    let sim_id = create_test_sim(&state, Some(&roster)).await;

    let response = action_talk(
        Path(sim_id.clone()),
        State(state.clone()),
        Json(TalkRequest {
            npc: "Mara Voss".to_string(),
            line: Some("morning!".to_string()),
        }),
    )
    .await
    .expect("talk");
    assert!(response.0.result.accepted);
    assert_eq!(response.0.reply.as_deref(), Some("Morning to you too."));

    let _ = step_sim(
        Path(sim_id.clone()),
        State(state.clone()),
        Json(StepRequest { ticks: Some(1) }),
    )
    .await
    .expect("step");

    let events = get_events(
        Path(sim_id),
        State(state),
        Query(EventsQuery {
            offset: None,
            limit: None,
        }),
    )
    .await
    .expect("events");
    assert!(events
        .0
        .events
        .iter()
        .any(|event| event.event_type == contracts::EventType::PlayerTalked));

    let _ = std::fs::remove_file(&roster);
}

#[tokio::test]
async fn rejected_action_is_reported_not_errored() {
    let state = test_state();
    let sim_id = create_test_sim(&state, None).await;

    let response = action_gift(
        Path(sim_id),
        State(state),
        Json(GiftRequest {
            npc: "Nobody Here".to_string(),
            item: "wildflowers".to_string(),
        }),
    )
    .await
    .expect("gift route should answer");
    assert!(!response.0.result.accepted);
    assert!(response.0.reply.is_none());
}

#[tokio::test]
async fn checkpoint_routes_round_trip() {
    let state = test_state();
    let roster = write_temp_roster();
    let sim_id = create_test_sim(&state, Some(&roster)).await;

    let _ = step_sim(
        Path(sim_id.clone()),
        State(state.clone()),
        Json(StepRequest { ticks: Some(10) }),
    )
    .await
    .expect("step");

    let saved = save_checkpoint(
        Path(sim_id.clone()),
        State(state.clone()),
        Json(SaveCheckpointRequest {
            name: "ten ticks in".to_string(),
            description: None,
        }),
    )
    .await
    .expect("save");
    assert_eq!(saved.0.checkpoint.tick, 10);

    let _ = step_sim(
        Path(sim_id.clone()),
        State(state.clone()),
        Json(StepRequest { ticks: Some(5) }),
    )
    .await
    .expect("step");

    let restored = restore_checkpoint(
        Path((sim_id.clone(), "ten ticks in".to_string())),
        State(state.clone()),
    )
    .await
    .expect("restore");
    assert_eq!(restored.0.checkpoint.tick, 10);

    let status = get_status(Path(sim_id), State(state)).await.expect("status");
    assert_eq!(status.0["status"]["current_tick"], 10);

    let _ = std::fs::remove_file(&roster);
}

#[test]
fn paginate_enforces_bounds() {
    let (offset, limit) = paginate(100, Some(10), Some(20)).expect("page");
    assert_eq!(offset, 10);
    assert_eq!(limit, 20);

    let (_, clamped) = paginate(100, None, Some(1_000_000)).expect("page");
    assert_eq!(clamped, MAX_PAGE_SIZE);

    assert!(paginate(5, Some(10), Some(1)).is_err());
}
