//! The town world: the shared NPC roster plus everything the tick pipeline
//! mutates — clock, relationships, gossip, event logs, and queued player
//! actions. Constructed once by the process entry point and passed by
//! reference; there is no global state.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

mod commands;
mod drama;
mod init;
mod inspect;
mod passes;
mod snapshot;
mod step;

use contracts::{
    ActorRef, Event, EventType, PlayerAction, SimConfig, SimStatus, SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::TownClock;
use crate::npc::Npc;
use crate::social::{GossipBoard, RelationshipBook, RelationshipRecord};

pub use step::{PassOutcome, PassStatus, TickReport};

/// Per-channel rolling log cap; FIFO eviction.
const ROLLING_LOG_CAP: usize = 50;

/// How many trailing events a checkpoint carries.
const CHECKPOINT_EVENT_TAIL: usize = 200;

#[derive(Debug, Clone)]
struct QueuedAction {
    effective_tick: u64,
    insertion_sequence: u64,
    action: PlayerAction,
}

#[derive(Debug, Clone)]
struct SnapshotCache {
    day: u64,
    hour_block: u64,
    text: String,
}

#[derive(Debug)]
pub struct TownWorld {
    pub config: SimConfig,
    pub status: SimStatus,
    pub clock: TownClock,
    pub npcs: BTreeMap<String, Npc>,
    pub relationships: RelationshipBook,
    pub gossip: GossipBoard,
    weather: String,
    event_log: Vec<Event>,
    recent_by_channel: BTreeMap<String, VecDeque<String>>,
    queued_actions: Vec<QueuedAction>,
    next_action_sequence: u64,
    next_gossip_serial: u64,
    /// Pairs whose friendship/romance milestone already fired, so threshold
    /// crossings narrate once.
    fired_friendships: BTreeSet<(String, String)>,
    fired_romances: BTreeSet<(String, String)>,
    /// Gossip items whose social fallout already landed.
    consequenced_gossip: BTreeSet<String>,
    /// Roster load failure, reported once at startup and kept for inspection.
    roster_error: Option<String>,
    snapshot_cache: Option<SnapshotCache>,
    last_tick_report: Option<TickReport>,
}

impl TownWorld {
    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn weather(&self) -> &str {
        &self.weather
    }

    pub fn roster_error(&self) -> Option<&str> {
        self.roster_error.as_deref()
    }

    pub fn last_tick_report(&self) -> Option<&TickReport> {
        self.last_tick_report.as_ref()
    }

    /// Rolling log lines for one channel, oldest first.
    pub fn recent_channel(&self, channel: &str) -> Vec<String> {
        self.recent_by_channel
            .get(channel)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn channels(&self) -> Vec<&str> {
        self.recent_by_channel.keys().map(String::as_str).collect()
    }

    /// Append an event to the global ordered log and mirror its summary into
    /// the per-channel rolling log (capped, FIFO).
    pub(crate) fn push_event(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
        event_type: EventType,
        location_id: String,
        actors: Vec<ActorRef>,
        summary: String,
        details: Option<Value>,
    ) {
        let event = Event {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            sim_id: self.config.sim_id.clone(),
            tick,
            created_at: format!("day{:03}-{}", self.clock.day, self.clock.time_label()),
            event_id: format!("evt_{tick:06}_{sequence_in_tick:03}"),
            sequence_in_tick: *sequence_in_tick,
            event_type,
            location_id,
            actors,
            summary: summary.clone(),
            details,
        };
        *sequence_in_tick += 1;

        let log = self
            .recent_by_channel
            .entry(event_type.channel().to_string())
            .or_default();
        log.push_back(summary);
        while log.len() > ROLLING_LOG_CAP {
            log.pop_front();
        }

        self.event_log.push(event);
    }

    /// Names grouped by current location, deterministic order.
    pub(crate) fn colocated_groups(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, npc) in &self.npcs {
            groups.entry(npc.location.clone()).or_default().push(name.clone());
        }
        groups
    }

    pub(crate) fn sync_status(&mut self) {
        self.status.npc_count = self.npcs.len();
        self.status.queued_actions = self.queued_actions.len();
    }

    // --- checkpoint state ---

    /// Point-in-time serialization of clock + roster + minimal subsystem
    /// state. Restoring overwrites the equivalent in-memory fields.
    pub fn checkpoint_state(&self) -> WorldState {
        let tail_start = self.event_log.len().saturating_sub(CHECKPOINT_EVENT_TAIL);
        WorldState {
            status: self.status.clone(),
            clock: self.clock,
            weather: self.weather.clone(),
            npcs: self.npcs.clone(),
            relationships: self.relationships.to_records(),
            gossip: self.gossip.clone(),
            event_tail: self.event_log[tail_start..].to_vec(),
            recent_by_channel: self
                .recent_by_channel
                .iter()
                .map(|(channel, log)| (channel.clone(), log.iter().cloned().collect()))
                .collect(),
            next_gossip_serial: self.next_gossip_serial,
            fired_friendships: self.fired_friendships.iter().cloned().collect(),
            fired_romances: self.fired_romances.iter().cloned().collect(),
            consequenced_gossip: self.consequenced_gossip.iter().cloned().collect(),
        }
    }

    pub fn restore_state(&mut self, state: WorldState) {
        self.status = state.status;
        self.clock = state.clock;
        self.weather = state.weather;
        self.npcs = state.npcs;
        self.relationships = RelationshipBook::from_records(state.relationships);
        self.gossip = state.gossip;
        self.event_log = state.event_tail;
        self.recent_by_channel = state
            .recent_by_channel
            .into_iter()
            .map(|(channel, log)| (channel, log.into_iter().collect()))
            .collect();
        self.next_gossip_serial = state.next_gossip_serial;
        self.fired_friendships = state.fired_friendships.into_iter().collect();
        self.fired_romances = state.fired_romances.into_iter().collect();
        self.consequenced_gossip = state.consequenced_gossip.into_iter().collect();
        self.queued_actions.clear();
        self.snapshot_cache = None;
        self.last_tick_report = None;
        self.sync_status();
    }
}

/// Serialized world state inside a checkpoint blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub status: SimStatus,
    pub clock: TownClock,
    pub weather: String,
    pub npcs: BTreeMap<String, Npc>,
    pub relationships: Vec<RelationshipRecord>,
    pub gossip: GossipBoard,
    pub event_tail: Vec<Event>,
    pub recent_by_channel: BTreeMap<String, Vec<String>>,
    pub next_gossip_serial: u64,
    pub fired_friendships: Vec<(String, String)>,
    pub fired_romances: Vec<(String, String)>,
    pub consequenced_gossip: Vec<String>,
}

#[cfg(test)]
mod tests;
