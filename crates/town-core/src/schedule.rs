//! Location/schedule resolution: a pure function of (life stage, occupation
//! keyword match, weekday, hour) returning a location id from a static rule
//! table, with a weighted-random fallback among the generic hangouts. No
//! intent persists beyond the current tick.

use contracts::Weekday;

use crate::npc::{home_location_for, LifeStage};
use crate::rng::{mix_seed, pick_weighted, stable_hash};

/// Generic hangout locations with pick weights for the fallback rule.
const HANGOUTS: [(&str, u64); 4] = [
    ("cafe", 3),
    ("tavern", 4),
    ("park", 2),
    ("town_square", 1),
];

pub const SCHOOL: &str = "school";

/// Inputs to one schedule resolution. `hour_block` is the whole hour so a
/// fallback draw is stable within the hour.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleContext<'a> {
    pub npc_name: &'a str,
    pub occupation: &'a str,
    pub life_stage: LifeStage,
    pub weekday: Weekday,
    pub hour_block: u64,
    pub day: u64,
    pub seed: u64,
}

pub fn resolve_location(ctx: &ScheduleContext<'_>) -> String {
    let hour = ctx.hour_block;

    // Night: everyone home.
    if !(6..22).contains(&hour) {
        return home_location_for(ctx.npc_name);
    }

    // School-age NPCs attend school on school days.
    if matches!(ctx.life_stage, LifeStage::Child | LifeStage::Teen)
        && ctx.weekday.is_school_day()
        && (8..15).contains(&hour)
    {
        return SCHOOL.to_string();
    }

    // Working adults at their matched workplace during work hours.
    if ctx.life_stage == LifeStage::Adult && ctx.weekday.is_school_day() && (9..17).contains(&hour)
    {
        if let Some(workplace) = workplace_for(ctx.occupation) {
            return workplace.to_string();
        }
    }

    // Early evening meal window pulls people home before going out.
    if (17..19).contains(&hour) {
        return home_location_for(ctx.npc_name);
    }

    // Otherwise: weighted-random hangout, stable within the hour.
    let stream = mix_seed(stable_hash(ctx.npc_name), ctx.day * 24 + hour);
    pick_weighted(ctx.seed, stream, &HANGOUTS)
        .map(|loc| loc.to_string())
        .unwrap_or_else(|| home_location_for(ctx.npc_name))
}

/// Keyword match from occupation text to a workplace id. `None` means no
/// rule matches and the hangout fallback applies.
pub fn workplace_for(occupation: &str) -> Option<&'static str> {
    let text = occupation.to_lowercase();
    let rules: [(&[&str], &str); 9] = [
        (&["farm", "rancher"], "farm"),
        (&["teach", "principal"], SCHOOL),
        (&["barista", "cafe", "baker"], "cafe"),
        (&["bartender", "tavern", "brewer"], "tavern"),
        (&["shop", "store", "clerk", "grocer"], "general_store"),
        (&["doctor", "nurse", "medic"], "clinic"),
        (&["mayor", "official", "librarian"], "town_hall"),
        (&["smith", "mechanic", "carpenter", "plumber"], "workshop"),
        (&["priest", "pastor", "chaplain"], "church"),
    ];
    for (keywords, place) in rules {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return Some(place);
        }
    }
    None
}
