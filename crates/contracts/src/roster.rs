//! Roster input format: the JSON list of NPC records consumed once at
//! startup to populate the entity roster.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Initial relationship values a seed declares toward another NPC by name.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SeedRelationship {
    #[serde(default)]
    pub friendship: f32,
    #[serde(default)]
    pub romance: f32,
}

/// One entry in the roster file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NpcSeed {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub occupation: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub relationships: BTreeMap<String, SeedRelationship>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub secrets: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
}

#[derive(Debug)]
pub enum RosterError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "roster file error: {err}"),
            Self::Parse(err) => write!(f, "roster parse error: {err}"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<std::io::Error> for RosterError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Parse a roster from raw JSON text.
pub fn parse_roster(raw: &str) -> Result<Vec<NpcSeed>, RosterError> {
    Ok(serde_json::from_str(raw)?)
}

/// Load a roster file from disk.
pub fn load_roster_file(path: impl AsRef<Path>) -> Result<Vec<NpcSeed>, RosterError> {
    let raw = std::fs::read_to_string(path)?;
    parse_roster(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_roster() {
        let raw = r#"[
            {"name": "Mara Voss", "age": 34, "gender": "female", "occupation": "barista"},
            {"name": "Elio Trent", "age": 16, "gender": "male", "occupation": "student",
             "traits": ["restless"],
             "relationships": {"Mara Voss": {"friendship": 20.0}},
             "background": "Grew up above the general store.",
             "secrets": ["failed the spring exam"]}
        ]"#;
        let roster = parse_roster(raw).expect("roster should parse");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].name, "Mara Voss");
        assert!(roster[0].traits.is_empty());
        let rel = roster[1].relationships.get("Mara Voss").expect("seed edge");
        assert!((rel.friendship - 20.0).abs() < f32::EPSILON);
        assert!(rel.romance.abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_roster_is_a_parse_error() {
        let err = parse_roster("{\"not\": \"a list\"}").unwrap_err();
        assert!(matches!(err, RosterError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_roster_file("/nonexistent/roster.json").unwrap_err();
        assert!(matches!(err, RosterError::Io(_)));
    }
}
