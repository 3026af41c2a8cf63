//! In-process engine facade: owns the town world, composes the checkpoint
//! store beside it, validates and forwards player actions, and hosts the
//! HTTP server and text-generation client boundary.

mod checkpoint;
mod narrator;
mod server;

use contracts::{ActionResult, CheckpointMeta, Event, PlayerAction, SimConfig, SimStatus};
use serde_json::Value;
use town_core::TownWorld;

pub use checkpoint::{CheckpointError, CheckpointStore};
pub use narrator::{
    inline_failure, HttpNarrator, NarrativeBackend, NarratorError, ScriptedNarrator,
};
pub use server::{serve, ServerError};

#[derive(Debug)]
pub struct EngineApi {
    world: TownWorld,
    checkpoints: Option<CheckpointStore>,
    last_checkpoint_error: Option<String>,
    action_audit: Vec<ActionResult>,
}

impl EngineApi {
    pub fn from_config(config: SimConfig) -> Self {
        Self {
            world: TownWorld::new(config),
            checkpoints: None,
            last_checkpoint_error: None,
            action_audit: Vec::new(),
        }
    }

    /// Attach a checkpoint directory. The store is composed here, beside the
    /// world — the world itself knows nothing about persistence.
    pub fn attach_checkpoint_store(
        &mut self,
        dir: impl AsRef<std::path::Path>,
    ) -> Result<(), CheckpointError> {
        self.checkpoints = Some(CheckpointStore::open(dir)?);
        Ok(())
    }

    pub fn sim_id(&self) -> &str {
        &self.world.config.sim_id
    }

    pub fn config(&self) -> &SimConfig {
        &self.world.config
    }

    pub fn status(&self) -> &SimStatus {
        &self.world.status
    }

    pub fn events(&self) -> &[Event] {
        self.world.events()
    }

    /// Read access to the underlying world for inspection.
    pub fn world(&self) -> &TownWorld {
        &self.world
    }

    pub fn start(&mut self) -> &SimStatus {
        self.world.start();
        &self.world.status
    }

    pub fn pause(&mut self) -> &SimStatus {
        self.world.pause();
        &self.world.status
    }

    /// Advance the requested number of ticks. Auto-starts a paused sim so an
    /// explicit step request always advances.
    pub fn step(&mut self, ticks: u64) -> (&SimStatus, u64) {
        self.world.start();
        let committed = self.world.step_n(ticks.max(1));
        (&self.world.status, committed)
    }

    pub fn run_to_tick(&mut self, tick: u64) -> (&SimStatus, u64) {
        self.world.start();
        let committed = self.world.run_to_tick(tick);
        (&self.world.status, committed)
    }

    pub fn submit_action(&mut self, action: PlayerAction) -> ActionResult {
        let result = self.world.queue_action(action);
        self.action_audit.push(result.clone());
        result
    }

    pub fn action_audit(&self) -> &[ActionResult] {
        &self.action_audit
    }

    pub fn narrative_snapshot(&mut self) -> String {
        self.world.narrative_snapshot()
    }

    pub fn scene_prompt(&self, npc: &str, player_line: Option<&str>) -> Option<String> {
        self.world.scene_prompt(npc, player_line)
    }

    pub fn status_view(&self) -> Value {
        self.world.status_view()
    }

    pub fn npc_view(&self, name: &str) -> Option<Value> {
        self.world.npc_view(name)
    }

    pub fn events_page(&self, offset: usize, limit: usize) -> (Vec<&Event>, usize) {
        self.world.events_page(offset, limit)
    }

    pub fn rolling_logs(&self) -> Value {
        self.world.rolling_logs()
    }

    // --- checkpoints ---

    /// Serialize the current clock + roster + subsystem state under `name`.
    pub fn save_checkpoint(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<CheckpointMeta, CheckpointError> {
        let Some(store) = self.checkpoints.as_ref() else {
            return Err(CheckpointError::NotAttached);
        };

        let meta = CheckpointMeta {
            name: name.to_string(),
            description: description.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sim_id: self.world.config.sim_id.clone(),
            tick: self.world.status.current_tick,
            day: self.world.clock.day,
            hour: self.world.clock.hour(),
            npc_count: self.world.npcs.len(),
        };

        let state = self.world.checkpoint_state();
        match store.save(meta.clone(), &state) {
            Ok(()) => {
                self.last_checkpoint_error = None;
                tracing::info!(name, tick = meta.tick, "checkpoint saved");
                Ok(meta)
            }
            Err(err) => {
                self.last_checkpoint_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Restore a named checkpoint, overwriting the equivalent in-memory
    /// fields of the world.
    pub fn restore_checkpoint(&mut self, name: &str) -> Result<CheckpointMeta, CheckpointError> {
        let Some(store) = self.checkpoints.as_ref() else {
            return Err(CheckpointError::NotAttached);
        };

        match store.load(name) {
            Ok((meta, state)) => {
                self.world.restore_state(state);
                self.last_checkpoint_error = None;
                tracing::info!(name, tick = meta.tick, "checkpoint restored");
                Ok(meta)
            }
            Err(err) => {
                self.last_checkpoint_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn list_checkpoints(&self) -> Result<Vec<CheckpointMeta>, CheckpointError> {
        let Some(store) = self.checkpoints.as_ref() else {
            return Err(CheckpointError::NotAttached);
        };
        store.list()
    }

    pub fn last_checkpoint_error(&self) -> Option<&str> {
        self.last_checkpoint_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ActionPayload, ActionType};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("maplemere_engine_{name}_{nanos}"))
    }

    fn test_config() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn step_returns_committed_count() {
        let mut api = EngineApi::from_config(test_config());
        let (_, committed) = api.step(3);
        assert_eq!(committed, 3);
        assert_eq!(api.status().current_tick, 3);
    }

    #[test]
    fn checkpoint_save_and_restore_round_trips_the_clock() {
        let dir = temp_dir("roundtrip");
        let mut api = EngineApi::from_config(test_config());
        api.attach_checkpoint_store(&dir).expect("attach");

        api.run_to_tick(53);
        let saved_clock = api.world().clock;
        let saved_hour_bits = saved_clock.hour().to_bits();
        api.save_checkpoint("mid_morning", "before the festival")
            .expect("save");

        // Drift forward, then restore.
        api.run_to_tick(90);
        assert_ne!(api.world().clock, saved_clock);

        let meta = api.restore_checkpoint("mid_morning").expect("restore");
        assert_eq!(meta.tick, 53);
        assert_eq!(api.world().clock, saved_clock);
        assert_eq!(api.world().clock.hour().to_bits(), saved_hour_bits);
        assert_eq!(api.status().current_tick, 53);

        let listed = api.list_checkpoints().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "mid_morning");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn checkpoint_without_store_is_not_attached() {
        let mut api = EngineApi::from_config(test_config());
        let err = api.save_checkpoint("x", "").unwrap_err();
        assert!(matches!(err, CheckpointError::NotAttached));
        assert!(api.restore_checkpoint("x").is_err());
    }

    #[test]
    fn rejected_actions_are_audited() {
        let mut api = EngineApi::from_config(test_config());
        let action = PlayerAction::new(
            "act_1",
            api.sim_id().to_string(),
            0,
            ActionType::Talk,
            ActionPayload::Talk {
                npc: "Nobody".to_string(),
                line: None,
            },
        );
        let result = api.submit_action(action);
        assert!(!result.accepted);
        assert_eq!(api.action_audit().len(), 1);
    }
}
