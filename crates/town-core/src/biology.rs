//! Daily biology pass: age and birthday progression, life-stage advancement,
//! health drift under chronic need pressure, and occupational skill practice.

use contracts::DAYS_PER_YEAR;

use crate::npc::{LifeStage, Npc};

/// Skill gained per practiced day.
const PRACTICE_PER_DAY: f32 = 0.8;

/// Proficiency thresholds that emit a milestone when crossed.
const SKILL_THRESHOLDS: [f32; 3] = [25.0, 50.0, 75.0];

/// Notable outcomes of one NPC's daily biology tick, translated into events
/// by the world pass.
#[derive(Debug, Clone, PartialEq)]
pub enum BioOutcome {
    Birthday { new_age: u32 },
    LifeStageAdvanced { stage: LifeStage },
    SkillImproved { skill: String, level: f32 },
}

/// Advance one NPC by one day. Mutates age, health, and skills in place and
/// returns the outcomes worth narrating.
pub fn daily_tick(npc: &mut Npc) -> Vec<BioOutcome> {
    let mut outcomes = Vec::new();

    // Birthday and life-stage progression.
    npc.days_since_birthday += 1;
    if npc.days_since_birthday >= DAYS_PER_YEAR {
        npc.days_since_birthday = 0;
        let old_stage = npc.life_stage();
        npc.age += 1;
        outcomes.push(BioOutcome::Birthday { new_age: npc.age });
        let new_stage = npc.life_stage();
        if new_stage != old_stage {
            outcomes.push(BioOutcome::LifeStageAdvanced { stage: new_stage });
        }
    }

    // Health drifts with chronic need pressure and recovers with rest.
    if npc.needs.average_pressure() >= 70.0 {
        npc.health = (npc.health - 0.8).clamp(0.0, 100.0);
    } else {
        npc.health = (npc.health + 0.4).clamp(0.0, 100.0);
    }

    // Occupational skill practice.
    if let Some(skill) = skill_for_occupation(&npc.occupation) {
        let level = npc.skills.entry(skill.to_string()).or_insert(0.0);
        let before = *level;
        *level = (*level + PRACTICE_PER_DAY).min(100.0);
        if SKILL_THRESHOLDS
            .iter()
            .any(|threshold| before < *threshold && *level >= *threshold)
        {
            outcomes.push(BioOutcome::SkillImproved {
                skill: skill.to_string(),
                level: *level,
            });
        }
    }

    outcomes
}

/// Keyword match from occupation text to the skill it practices.
pub fn skill_for_occupation(occupation: &str) -> Option<&'static str> {
    let text = occupation.to_lowercase();
    let rules: [(&[&str], &str); 8] = [
        (&["farm", "rancher"], "farming"),
        (&["teach", "principal"], "teaching"),
        (&["barista", "cafe", "baker", "cook"], "hospitality"),
        (&["bartender", "tavern", "brewer"], "hospitality"),
        (&["shop", "store", "clerk", "grocer"], "trade"),
        (&["doctor", "nurse", "medic"], "medicine"),
        (&["smith", "mechanic", "carpenter", "plumber"], "craftsmanship"),
        (&["student"], "studies"),
    ];
    for (keywords, skill) in rules {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return Some(skill);
        }
    }
    None
}
