//! v1 cross-boundary contracts for the town kernel, HTTP API, checkpoint
//! store, and CLI.

pub mod roster;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION_V1: &str = "1.0";
pub const MINUTES_PER_DAY: u64 = 24 * 60;
pub const DAYS_PER_YEAR: u64 = 365;

// ---------------------------------------------------------------------------
// Simulation config and status
// ---------------------------------------------------------------------------

/// Tuning knobs for the simulation. Every probability and rate the tick
/// pipeline consults lives here so that behavior is configured, not baked in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub schema_version: String,
    pub sim_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub town_name: String,
    /// Name used for relationship records created by talk/flirt/gift actions.
    pub player_name: String,
    pub minutes_per_tick: u64,
    pub max_days: u32,
    pub days_per_season: u64,
    /// Path to the roster JSON file; `None` starts with an empty roster.
    pub roster_path: Option<String>,

    // Per-hour pressure growth for each need (0 = satisfied, 100 = critical).
    pub hunger_rate_per_hour: f32,
    pub energy_rate_per_hour: f32,
    pub hygiene_rate_per_hour: f32,
    pub bladder_rate_per_hour: f32,
    pub social_rate_per_hour: f32,
    pub fun_rate_per_hour: f32,
    pub libido_rate_per_hour: f32,
    /// Energy pressure relieved per hour while asleep at home.
    pub sleep_recovery_per_hour: f32,

    // Percent chances rolled per tick (or per day where noted).
    pub micro_interaction_percent: u32,
    pub contagion_percent: u32,
    pub gossip_spawn_percent: u32,
    pub gossip_spread_percent: u32,
    pub school_drama_percent: u32,
    pub crime_percent_per_day: u32,
    pub weather_shift_percent: u32,

    // Thresholds and windows.
    pub need_alert_threshold: f32,
    pub relationship_decay_per_day: f32,
    pub friendship_milestone: f32,
    pub romance_milestone: f32,
    pub memory_capacity: usize,
    pub memory_forget_threshold: f32,
    pub gossip_shelf_life_days: u64,
    pub snapshot_need_threshold: f32,
    pub snapshot_affinity_threshold: f32,
    pub recent_event_window: usize,

    pub notes: Option<String>,
}

impl SimConfig {
    pub fn ticks_per_day(&self) -> u64 {
        MINUTES_PER_DAY / self.minutes_per_tick.max(1)
    }

    pub fn max_ticks(&self) -> u64 {
        u64::from(self.max_days) * self.ticks_per_day()
    }

    pub fn hours_per_tick(&self) -> f32 {
        self.minutes_per_tick.max(1) as f32 / 60.0
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            sim_id: "sim_local_001".to_string(),
            seed: 1337,
            town_name: "Maplemere".to_string(),
            player_name: "player".to_string(),
            minutes_per_tick: 30,
            max_days: 30,
            days_per_season: 28,
            roster_path: None,
            hunger_rate_per_hour: 2.5,
            energy_rate_per_hour: 1.8,
            hygiene_rate_per_hour: 1.2,
            bladder_rate_per_hour: 3.0,
            social_rate_per_hour: 1.0,
            fun_rate_per_hour: 1.4,
            libido_rate_per_hour: 0.6,
            sleep_recovery_per_hour: 12.0,
            micro_interaction_percent: 15,
            contagion_percent: 10,
            gossip_spawn_percent: 2,
            gossip_spread_percent: 20,
            school_drama_percent: 4,
            crime_percent_per_day: 6,
            weather_shift_percent: 8,
            need_alert_threshold: 70.0,
            relationship_decay_per_day: 1.5,
            friendship_milestone: 40.0,
            romance_milestone: 30.0,
            memory_capacity: 128,
            memory_forget_threshold: 5.0,
            gossip_shelf_life_days: 7,
            snapshot_need_threshold: 70.0,
            snapshot_affinity_threshold: 40.0,
            recent_event_window: 12,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimStatus {
    pub schema_version: String,
    pub sim_id: String,
    pub current_tick: u64,
    pub max_ticks: u64,
    pub mode: SimMode,
    pub npc_count: usize,
    pub queued_actions: usize,
}

impl SimStatus {
    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.max_ticks
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sim_id={} tick={}/{} mode={:?} npcs={} queued_actions={}",
            self.sim_id,
            self.current_tick,
            self.max_ticks,
            self.mode,
            self.npc_count,
            self.queued_actions
        )
    }
}

// ---------------------------------------------------------------------------
// Derived calendar labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn from_day_index(day: u64) -> Self {
        match day % 7 {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            _ => Self::Sunday,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    pub fn is_school_day(self) -> bool {
        !matches!(self, Self::Saturday | Self::Sunday)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn from_day_index(day: u64, days_per_season: u64) -> Self {
        match (day / days_per_season.max(1)) % 4 {
            0 => Self::Spring,
            1 => Self::Summer,
            2 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorRef {
    pub actor_id: String,
    pub actor_kind: String,
}

impl ActorRef {
    pub fn npc(name: impl Into<String>) -> Self {
        Self {
            actor_id: name.into(),
            actor_kind: "npc".to_string(),
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self {
            actor_id: name.into(),
            actor_kind: "player".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    InteractionOccurred,
    MoodSpread,
    RumorStarted,
    RumorSpread,
    ReputationShifted,
    WeatherShifted,
    EnvironmentStirred,
    SchoolDramaErupted,
    CrimeCommitted,
    ConsequenceLanded,
    BirthdayCelebrated,
    LifeStageAdvanced,
    SkillImproved,
    FriendshipFormed,
    RomanceKindled,
    PlayerTalked,
    PlayerFlirted,
    PlayerGifted,
}

impl EventType {
    /// Rolling-log channel the event is mirrored into for debug display
    /// and the narrative prompt.
    pub fn channel(self) -> &'static str {
        match self {
            Self::InteractionOccurred | Self::MoodSpread => "social",
            Self::RumorStarted | Self::RumorSpread | Self::ReputationShifted => "gossip",
            Self::WeatherShifted | Self::EnvironmentStirred => "environment",
            Self::SchoolDramaErupted => "school",
            Self::CrimeCommitted | Self::ConsequenceLanded => "crime",
            Self::BirthdayCelebrated
            | Self::LifeStageAdvanced
            | Self::SkillImproved
            | Self::FriendshipFormed
            | Self::RomanceKindled => "milestone",
            Self::PlayerTalked | Self::PlayerFlirted | Self::PlayerGifted => "player",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub schema_version: String,
    pub sim_id: String,
    pub tick: u64,
    pub created_at: String,
    pub event_id: String,
    pub sequence_in_tick: u64,
    pub event_type: EventType,
    pub location_id: String,
    pub actors: Vec<ActorRef>,
    /// One-line human-readable summary used by the rolling logs and prompt.
    pub summary: String,
    pub details: Option<Value>,
}

// ---------------------------------------------------------------------------
// API errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SimNotFound,
    NpcNotFound,
    InvalidAction,
    InvalidQuery,
    CheckpointNotFound,
    ContractVersionUnsupported,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

// ---------------------------------------------------------------------------
// Player actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Talk,
    Flirt,
    Gift,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    Talk { npc: String, line: Option<String> },
    Flirt { npc: String },
    Gift { npc: String, item: String },
}

impl ActionPayload {
    pub fn target_npc(&self) -> &str {
        match self {
            Self::Talk { npc, .. } | Self::Flirt { npc } | Self::Gift { npc, .. } => npc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerAction {
    pub schema_version: String,
    pub action_id: String,
    pub sim_id: String,
    pub issued_at_tick: u64,
    pub action_type: ActionType,
    pub payload: ActionPayload,
}

impl PlayerAction {
    pub fn new(
        action_id: impl Into<String>,
        sim_id: impl Into<String>,
        issued_at_tick: u64,
        action_type: ActionType,
        payload: ActionPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            action_id: action_id.into(),
            sim_id: sim_id.into(),
            issued_at_tick,
            action_type,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResult {
    pub schema_version: String,
    pub action_id: String,
    pub sim_id: String,
    pub accepted: bool,
    pub error: Option<ApiError>,
}

impl ActionResult {
    pub fn accepted(action: &PlayerAction) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            action_id: action.action_id.clone(),
            sim_id: action.sim_id.clone(),
            accepted: true,
            error: None,
        }
    }

    pub fn rejected(action: &PlayerAction, error: ApiError) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            action_id: action.action_id.clone(),
            sim_id: action.sim_id.clone(),
            accepted: false,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Checkpoint metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointMeta {
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub sim_id: String,
    pub tick: u64,
    pub day: u64,
    pub hour: f64,
    pub npc_count: usize,
}

/// Shape of `index.json` in a checkpoint directory: name → metadata.
pub type CheckpointIndex = BTreeMap<String, CheckpointMeta>;

// ---------------------------------------------------------------------------
// u64 seeds as JSON strings
// ---------------------------------------------------------------------------

pub mod serde_u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_tick_arithmetic() {
        let config = SimConfig::default();
        assert_eq!(config.ticks_per_day(), 48);
        assert_eq!(config.max_ticks(), 30 * 48);
        assert!((config.hours_per_tick() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn seed_round_trips_as_string() {
        let config = SimConfig {
            seed: u64::MAX,
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(json.contains(&format!("\"{}\"", u64::MAX)));
        let decoded: SimConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.seed, u64::MAX);
    }

    #[test]
    fn weekday_cycles_every_seven_days() {
        assert_eq!(Weekday::from_day_index(0), Weekday::Monday);
        assert_eq!(Weekday::from_day_index(6), Weekday::Sunday);
        assert_eq!(Weekday::from_day_index(7), Weekday::Monday);
        assert!(!Weekday::from_day_index(5).is_school_day());
    }

    #[test]
    fn season_cycles_with_configured_length() {
        assert_eq!(Season::from_day_index(0, 28), Season::Spring);
        assert_eq!(Season::from_day_index(28, 28), Season::Summer);
        assert_eq!(Season::from_day_index(4 * 28, 28), Season::Spring);
    }

    #[test]
    fn action_payload_names_target() {
        let payload = ActionPayload::Gift {
            npc: "mara_voss".to_string(),
            item: "wildflowers".to_string(),
        };
        assert_eq!(payload.target_npc(), "mara_voss");
    }
}
