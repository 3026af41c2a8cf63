//! Checkpoint store: a directory of named, gzip-compressed JSON blobs plus
//! one `index.json` mapping checkpoint name → metadata.
//!
//! The store is composed beside the engine; it holds no reference into the
//! world and the world knows nothing about it. No delta save, no
//! transactional guarantee — a blob either reads back whole or the load
//! fails.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use contracts::{CheckpointIndex, CheckpointMeta};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use town_core::world::WorldState;

const INDEX_FILE: &str = "index.json";

#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    NotAttached,
    NotFound(String),
    InvalidName(String),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "checkpoint io error: {err}"),
            Self::Serde(err) => write!(f, "checkpoint serde error: {err}"),
            Self::NotAttached => write!(f, "checkpoint store is not attached"),
            Self::NotFound(name) => write!(f, "no checkpoint named {name}"),
            Self::InvalidName(name) => write!(f, "invalid checkpoint name: {name:?}"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open (creating if needed) a checkpoint directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the blob, then update the index.
    pub fn save(&self, meta: CheckpointMeta, state: &WorldState) -> Result<(), CheckpointError> {
        let file_name = sanitize_name(&meta.name)?;

        let file = File::create(self.dir.join(format!("{file_name}.json.gz")))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        let json = serde_json::to_string(state)?;
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;

        let mut index = self.read_index()?;
        index.insert(meta.name.clone(), meta);
        self.write_index(&index)?;
        Ok(())
    }

    /// Load a named checkpoint: metadata from the index, state from the blob.
    pub fn load(&self, name: &str) -> Result<(CheckpointMeta, WorldState), CheckpointError> {
        let index = self.read_index()?;
        let meta = index
            .get(name)
            .cloned()
            .ok_or_else(|| CheckpointError::NotFound(name.to_string()))?;

        let file_name = sanitize_name(name)?;
        let path = self.dir.join(format!("{file_name}.json.gz"));
        if !path.exists() {
            return Err(CheckpointError::NotFound(name.to_string()));
        }

        let file = File::open(path)?;
        let mut decoder = GzDecoder::new(file);
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded)?;
        let state: WorldState = serde_json::from_slice(&decoded)?;
        Ok((meta, state))
    }

    /// All checkpoint metadata, sorted by name.
    pub fn list(&self) -> Result<Vec<CheckpointMeta>, CheckpointError> {
        Ok(self.read_index()?.into_values().collect())
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn read_index(&self) -> Result<CheckpointIndex, CheckpointError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_index(&self, index: &CheckpointIndex) -> Result<(), CheckpointError> {
        let json = serde_json::to_string_pretty(index)?;
        std::fs::write(self.index_path(), json)?;
        Ok(())
    }
}

/// Blob file names come from the checkpoint name: lowercased, with anything
/// outside `[a-z0-9_-]` replaced. Empty names are rejected.
fn sanitize_name(name: &str) -> Result<String, CheckpointError> {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        return Err(CheckpointError::InvalidName(name.to_string()));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SimConfig;
    use town_core::TownWorld;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("maplemere_ckpt_{name}_{nanos}"))
    }

    fn meta(name: &str) -> CheckpointMeta {
        CheckpointMeta {
            name: name.to_string(),
            description: "test".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            sim_id: "sim_local_001".to_string(),
            tick: 7,
            day: 0,
            hour: 11.5,
            npc_count: 0,
        }
    }

    #[test]
    fn save_load_round_trip() {
        let dir = temp_dir("roundtrip");
        let store = CheckpointStore::open(&dir).expect("open");

        let mut world = TownWorld::from_seeds(SimConfig::default(), &[]);
        world.run_to_tick(7);
        let state = world.checkpoint_state();

        store.save(meta("morning run"), &state).expect("save");
        let (loaded_meta, loaded_state) = store.load("morning run").expect("load");

        assert_eq!(loaded_meta.tick, 7);
        assert_eq!(loaded_state.clock, state.clock);
        assert_eq!(loaded_state.status, state.status);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn index_lists_saved_checkpoints() {
        let dir = temp_dir("list");
        let store = CheckpointStore::open(&dir).expect("open");
        let world = TownWorld::from_seeds(SimConfig::default(), &[]);
        let state = world.checkpoint_state();

        store.save(meta("alpha"), &state).expect("save");
        store.save(meta("beta"), &state).expect("save");

        let listed = store.list().expect("list");
        let names: Vec<&str> = listed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_checkpoint_is_not_found() {
        let dir = temp_dir("missing");
        let store = CheckpointStore::open(&dir).expect("open");
        let err = store.load("ghost").unwrap_err();
        assert!(matches!(err, CheckpointError::NotFound(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_names_are_rejected() {
        let dir = temp_dir("names");
        let store = CheckpointStore::open(&dir).expect("open");
        let world = TownWorld::from_seeds(SimConfig::default(), &[]);
        let err = store
            .save(meta("   "), &world.checkpoint_state())
            .unwrap_err();
        assert!(matches!(err, CheckpointError::InvalidName(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
