use super::*;

use contracts::roster::{load_roster_file, NpcSeed};
use contracts::SimMode;

impl TownWorld {
    /// Build a world from config, loading the roster file if one is
    /// configured. A missing or malformed roster is reported once and leaves
    /// the roster empty — fatal to that subsystem, never to the process.
    pub fn new(config: SimConfig) -> Self {
        let (seeds, roster_error) = match &config.roster_path {
            Some(path) => match load_roster_file(path) {
                Ok(seeds) => (seeds, None),
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "roster load failed; starting empty");
                    (Vec::new(), Some(err.to_string()))
                }
            },
            None => (Vec::new(), None),
        };

        let mut world = Self::from_seeds(config, &seeds);
        world.roster_error = roster_error;
        world
    }

    /// Build a world from an in-memory roster.
    pub fn from_seeds(config: SimConfig, seeds: &[NpcSeed]) -> Self {
        let status = SimStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            sim_id: config.sim_id.clone(),
            current_tick: 0,
            max_ticks: config.max_ticks(),
            mode: SimMode::Paused,
            npc_count: 0,
            queued_actions: 0,
        };

        let mut npcs = BTreeMap::new();
        for seed in seeds {
            if npcs.contains_key(&seed.name) {
                tracing::warn!(name = %seed.name, "duplicate roster entry ignored");
                continue;
            }
            npcs.insert(seed.name.clone(), Npc::from_seed(seed, config.memory_capacity));
        }

        // Seed relationships symmetrically from the roster's declared edges.
        let mut relationships = RelationshipBook::new();
        for seed in seeds {
            for (other, declared) in &seed.relationships {
                if !npcs.contains_key(other) {
                    continue;
                }
                let record = relationships.entry(&seed.name, other);
                // When both sides declare the edge, the stronger claim wins.
                if declared.friendship.abs() > record.friendship.abs() {
                    record.friendship = declared.friendship.clamp(-100.0, 100.0);
                }
                if declared.romance.abs() > record.romance.abs() {
                    record.romance = declared.romance.clamp(-100.0, 100.0);
                }
            }
        }

        let mut world = Self {
            config,
            status,
            clock: TownClock::new(),
            npcs,
            relationships,
            gossip: GossipBoard::new(),
            weather: "clear".to_string(),
            event_log: Vec::new(),
            recent_by_channel: BTreeMap::new(),
            queued_actions: Vec::new(),
            next_action_sequence: 0,
            next_gossip_serial: 0,
            fired_friendships: BTreeSet::new(),
            fired_romances: BTreeSet::new(),
            consequenced_gossip: BTreeSet::new(),
            roster_error: None,
            snapshot_cache: None,
            last_tick_report: None,
        };
        world.sync_status();
        world
    }
}
