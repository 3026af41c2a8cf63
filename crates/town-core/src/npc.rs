//! NPC entity: identity from the roster seed plus mutable runtime state —
//! location, mood, task, the bounded needs vector, psyche scalars, skills,
//! reputation, and the memory log. Owned exclusively by the roster and
//! mutated in place by whichever pass runs each tick.

use std::collections::{BTreeMap, BTreeSet};

use contracts::roster::NpcSeed;
use contracts::SimConfig;
use serde::{Deserialize, Serialize};

use crate::memory::MemoryLog;

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
    Hunger,
    Energy,
    Hygiene,
    Bladder,
    Social,
    Fun,
    Libido,
}

impl NeedKind {
    pub const ALL: [NeedKind; 7] = [
        NeedKind::Hunger,
        NeedKind::Energy,
        NeedKind::Hygiene,
        NeedKind::Bladder,
        NeedKind::Social,
        NeedKind::Fun,
        NeedKind::Libido,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Energy => "energy",
            Self::Hygiene => "hygiene",
            Self::Bladder => "bladder",
            Self::Social => "social",
            Self::Fun => "fun",
            Self::Libido => "libido",
        }
    }

    /// Needs-driven descriptor used in the narrative snapshot.
    pub fn strain_label(self) -> &'static str {
        match self {
            Self::Hunger => "hungry",
            Self::Energy => "exhausted",
            Self::Hygiene => "disheveled",
            Self::Bladder => "fidgeting",
            Self::Social => "starved for company",
            Self::Fun => "bored stiff",
            Self::Libido => "wistful",
        }
    }

    /// Mood label an NPC drifts into when this need goes critical.
    pub fn strain_mood(self) -> &'static str {
        match self {
            Self::Hunger => "irritable",
            Self::Energy => "weary",
            Self::Hygiene => "self-conscious",
            Self::Bladder => "antsy",
            Self::Social => "lonely",
            Self::Fun => "restless",
            Self::Libido => "distracted",
        }
    }
}

/// The bounded per-NPC pressure vector. Every scalar lives in `[0, 100]`;
/// 0 = fully satisfied, 100 = critical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NeedSet {
    pub hunger: f32,
    pub energy: f32,
    pub hygiene: f32,
    pub bladder: f32,
    pub social: f32,
    pub fun: f32,
    pub libido: f32,
}

impl Default for NeedSet {
    fn default() -> Self {
        Self {
            hunger: 25.0,
            energy: 20.0,
            hygiene: 15.0,
            bladder: 20.0,
            social: 30.0,
            fun: 25.0,
            libido: 10.0,
        }
    }
}

impl NeedSet {
    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Energy => self.energy,
            NeedKind::Hygiene => self.hygiene,
            NeedKind::Bladder => self.bladder,
            NeedKind::Social => self.social,
            NeedKind::Fun => self.fun,
            NeedKind::Libido => self.libido,
        }
    }

    fn get_mut(&mut self, kind: NeedKind) -> &mut f32 {
        match kind {
            NeedKind::Hunger => &mut self.hunger,
            NeedKind::Energy => &mut self.energy,
            NeedKind::Hygiene => &mut self.hygiene,
            NeedKind::Bladder => &mut self.bladder,
            NeedKind::Social => &mut self.social,
            NeedKind::Fun => &mut self.fun,
            NeedKind::Libido => &mut self.libido,
        }
    }

    /// Grow every pressure by its configured per-hour rate scaled by elapsed
    /// hours, then clamp. While asleep, energy recovers instead of accruing.
    pub fn accrue(&mut self, config: &SimConfig, hours: f32, asleep: bool) {
        let hours = hours.max(0.0);
        let rates = [
            (NeedKind::Hunger, config.hunger_rate_per_hour),
            (NeedKind::Energy, config.energy_rate_per_hour),
            (NeedKind::Hygiene, config.hygiene_rate_per_hour),
            (NeedKind::Bladder, config.bladder_rate_per_hour),
            (NeedKind::Social, config.social_rate_per_hour),
            (NeedKind::Fun, config.fun_rate_per_hour),
            (NeedKind::Libido, config.libido_rate_per_hour),
        ];
        for (kind, rate) in rates {
            let delta = if asleep && kind == NeedKind::Energy {
                -config.sleep_recovery_per_hour * hours
            } else {
                rate * hours
            };
            let value = self.get_mut(kind);
            *value = (*value + delta).clamp(0.0, 100.0);
        }
    }

    /// Reduce a pressure (satisfying an activity), clamped at 0.
    pub fn relieve(&mut self, kind: NeedKind, amount: f32) {
        let value = self.get_mut(kind);
        *value = (*value - amount.max(0.0)).clamp(0.0, 100.0);
    }

    pub fn most_pressing(&self) -> (NeedKind, f32) {
        let mut top = (NeedKind::Hunger, self.hunger);
        for kind in NeedKind::ALL {
            let value = self.get(kind);
            if value > top.1 {
                top = (kind, value);
            }
        }
        top
    }

    pub fn any_above(&self, threshold: f32) -> bool {
        NeedKind::ALL.iter().any(|kind| self.get(*kind) >= threshold)
    }

    /// Descriptors for every need past the threshold, in fixed order.
    pub fn strain_descriptors(&self, threshold: f32) -> Vec<&'static str> {
        NeedKind::ALL
            .iter()
            .filter(|kind| self.get(**kind) >= threshold)
            .map(|kind| kind.strain_label())
            .collect()
    }

    pub fn average_pressure(&self) -> f32 {
        NeedKind::ALL.iter().map(|kind| self.get(*kind)).sum::<f32>() / NeedKind::ALL.len() as f32
    }
}

// ---------------------------------------------------------------------------
// Psyche and mood
// ---------------------------------------------------------------------------

/// Slow-moving bounded scalars alongside the needs vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Psyche {
    pub loneliness: f32,
    pub stress: f32,
    pub confidence: f32,
}

impl Default for Psyche {
    fn default() -> Self {
        Self {
            loneliness: 30.0,
            stress: 20.0,
            confidence: 50.0,
        }
    }
}

impl Psyche {
    pub fn clamp_all(&mut self) {
        self.loneliness = self.loneliness.clamp(0.0, 100.0);
        self.stress = self.stress.clamp(0.0, 100.0);
        self.confidence = self.confidence.clamp(0.0, 100.0);
    }
}

/// Free-form mood label with an intensity — deliberately not a closed enum;
/// contagion and events write arbitrary labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mood {
    pub label: String,
    pub intensity: f32,
}

impl Default for Mood {
    fn default() -> Self {
        Self {
            label: "settled".to_string(),
            intensity: 30.0,
        }
    }
}

impl Mood {
    pub fn set(&mut self, label: impl Into<String>, intensity: f32) {
        self.label = label.into();
        self.intensity = intensity.clamp(0.0, 100.0);
    }
}

// ---------------------------------------------------------------------------
// Life stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Child,
    Teen,
    Adult,
    Elder,
}

impl LifeStage {
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=12 => Self::Child,
            13..=17 => Self::Teen,
            18..=64 => Self::Adult,
            _ => Self::Elder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Teen => "teen",
            Self::Adult => "adult",
            Self::Elder => "elder",
        }
    }
}

// ---------------------------------------------------------------------------
// Npc
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Npc {
    // Identity.
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub occupation: String,
    pub traits: Vec<String>,
    pub background: String,
    pub goals: Vec<String>,
    pub secrets: BTreeSet<String>,

    // Runtime state.
    pub location: String,
    pub mood: Mood,
    pub task: String,
    pub needs: NeedSet,
    pub psyche: Psyche,
    pub health: f32,
    pub reputation: f32,
    pub skills: BTreeMap<String, f32>,
    pub memory: MemoryLog,

    /// Days lived since the run started, for birthday progression.
    pub days_since_birthday: u64,
}

impl Npc {
    pub fn from_seed(seed: &NpcSeed, memory_capacity: usize) -> Self {
        let home = home_location_for(&seed.name);
        Self {
            name: seed.name.clone(),
            age: seed.age,
            gender: seed.gender.clone(),
            occupation: seed.occupation.clone(),
            traits: seed.traits.clone(),
            background: seed.background.clone(),
            goals: seed.goals.clone(),
            secrets: seed.secrets.iter().cloned().collect(),
            location: home,
            mood: Mood::default(),
            task: "settling in".to_string(),
            needs: NeedSet::default(),
            psyche: Psyche::default(),
            health: 100.0,
            reputation: 0.0,
            skills: BTreeMap::new(),
            memory: MemoryLog::new(memory_capacity),
            days_since_birthday: 0,
        }
    }

    pub fn life_stage(&self) -> LifeStage {
        LifeStage::from_age(self.age)
    }

    pub fn is_school_age(&self) -> bool {
        matches!(self.life_stage(), LifeStage::Child | LifeStage::Teen) && self.age >= 6
    }

    pub fn home_location(&self) -> String {
        home_location_for(&self.name)
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Asleep when at home during the night window.
    pub fn is_asleep(&self, night: bool) -> bool {
        night && self.location == self.home_location()
    }
}

/// Location id for an NPC's home, slugged from the name.
pub fn home_location_for(name: &str) -> String {
    format!("home:{}", slug(name))
}

pub fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::roster::NpcSeed;

    fn seed(name: &str, age: u32, occupation: &str) -> NpcSeed {
        NpcSeed {
            name: name.to_string(),
            age,
            gender: "female".to_string(),
            occupation: occupation.to_string(),
            traits: vec!["patient".to_string()],
            relationships: Default::default(),
            background: String::new(),
            secrets: Vec::new(),
            goals: Vec::new(),
        }
    }

    #[test]
    fn needs_accrue_scales_with_elapsed_hours_and_clamps() {
        let config = SimConfig::default();
        let mut needs = NeedSet {
            hunger: 80.0,
            ..NeedSet::default()
        };

        needs.accrue(&config, 10.0, false);

        // 80 + 2.5/h * 10h = 105, clamped to the ceiling.
        assert!((needs.hunger - 100.0).abs() < f32::EPSILON);
        for kind in NeedKind::ALL {
            let value = needs.get(kind);
            assert!((0.0..=100.0).contains(&value), "{:?} = {}", kind, value);
        }
    }

    #[test]
    fn sleep_recovers_energy_while_other_needs_accrue() {
        let config = SimConfig::default();
        let mut needs = NeedSet {
            energy: 60.0,
            hunger: 10.0,
            ..NeedSet::default()
        };

        needs.accrue(&config, 2.0, true);

        assert!(needs.energy < 60.0);
        assert!(needs.hunger > 10.0);
    }

    #[test]
    fn zero_elapsed_hours_changes_nothing() {
        let config = SimConfig::default();
        let mut needs = NeedSet::default();
        let before = needs;
        needs.accrue(&config, 0.0, false);
        assert_eq!(needs, before);
    }

    #[test]
    fn most_pressing_finds_the_peak() {
        let needs = NeedSet {
            bladder: 90.0,
            ..NeedSet::default()
        };
        let (kind, value) = needs.most_pressing();
        assert_eq!(kind, NeedKind::Bladder);
        assert!((value - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn life_stage_bands() {
        assert_eq!(LifeStage::from_age(8), LifeStage::Child);
        assert_eq!(LifeStage::from_age(15), LifeStage::Teen);
        assert_eq!(LifeStage::from_age(40), LifeStage::Adult);
        assert_eq!(LifeStage::from_age(70), LifeStage::Elder);
    }

    #[test]
    fn npc_from_seed_starts_at_home() {
        let npc = Npc::from_seed(&seed("Mara Voss", 34, "barista"), 64);
        assert_eq!(npc.location, "home:mara_voss");
        assert_eq!(npc.life_stage(), LifeStage::Adult);
        assert!(npc.has_trait("Patient"));
        assert!(npc.is_asleep(true));
        assert!(!npc.is_asleep(false));
    }

    #[test]
    fn strain_descriptors_follow_threshold() {
        let needs = NeedSet {
            hunger: 75.0,
            fun: 71.0,
            ..NeedSet::default()
        };
        let descriptors = needs.strain_descriptors(70.0);
        assert_eq!(descriptors, vec!["hungry", "bored stiff"]);
    }
}
