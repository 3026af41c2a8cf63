use super::*;

use crate::emotion::{caught_intensity, dominant_mood};
use crate::npc::{LifeStage, NeedKind};
use crate::rng::{mix_seed, percent_roll, pick_index, sample_range_i64, stable_hash,
    stable_pair_hash};
use crate::schedule::{resolve_location, ScheduleContext};
use crate::social::canonical_pair;
use crate::world::step::{PassNote, PassResult};

// Stream salts keep each pass's rolls decorrelated from the others.
const SALT_INTERACT: u64 = 1;
const SALT_FLAVOR: u64 = 3;
const SALT_CONTAGION: u64 = 4;
const SALT_GOSSIP_SPAWN: u64 = 5;
const SALT_GOSSIP_SPREAD: u64 = 7;

const RUMOR_TEMPLATES: [&str; 6] = [
    "was seen slipping out after midnight",
    "hasn't paid their tab at the tavern",
    "is sweet on someone and won't say who",
    "got a letter with no return address",
    "quarreled with the postman over nothing",
    "has been burying something in the garden",
];

pub(super) fn stream(tick: u64, salt: u64, extra: u64) -> u64 {
    mix_seed(mix_seed(tick, salt), extra)
}

impl TownWorld {
    // -- needs -------------------------------------------------------------

    pub(super) fn pass_needs(&mut self, _tick: u64) -> PassResult {
        let hours = self.config.hours_per_tick();
        let night = self.clock.is_night();
        let alert = self.config.need_alert_threshold;

        for npc in self.npcs.values_mut() {
            let asleep = npc.is_asleep(night);
            npc.needs.accrue(&self.config, hours, asleep);

            // Psyche follows the needs vector slowly.
            if npc.needs.social >= alert {
                npc.psyche.loneliness += 0.4 * hours;
            } else {
                npc.psyche.loneliness -= 0.2 * hours;
            }
            if npc.needs.any_above(alert) {
                npc.psyche.stress += 0.3 * hours;
            } else {
                npc.psyche.stress -= 0.3 * hours;
            }
            npc.psyche.clamp_all();

            // Critical pressure colors the mood unless something stronger
            // already holds it.
            let (kind, pressure) = npc.needs.most_pressing();
            if pressure >= alert && npc.mood.intensity < pressure * 0.6 {
                npc.mood.set(kind.strain_mood(), pressure * 0.6);
            }
        }

        Ok(PassNote::Applied)
    }

    // -- schedule ----------------------------------------------------------

    pub(super) fn pass_schedule(&mut self, _tick: u64) -> PassResult {
        let weekday = self.clock.weekday();
        let hour_block = self.clock.hour_block();
        let day = self.clock.day;
        let night = self.clock.is_night();
        let seed = self.config.seed;

        let mut moved = 0_usize;
        let names: Vec<String> = self.npcs.keys().cloned().collect();
        for name in names {
            let Some(npc) = self.npcs.get_mut(&name) else {
                continue;
            };
            let target = {
                let ctx = ScheduleContext {
                    npc_name: &name,
                    occupation: &npc.occupation,
                    life_stage: npc.life_stage(),
                    weekday,
                    hour_block,
                    day,
                    seed,
                };
                resolve_location(&ctx)
            };
            if npc.location != target {
                npc.location = target;
                moved += 1;
            }
            npc.task = task_label(&npc.location, &npc.occupation, night);
        }

        Ok(PassNote::Detail(format!("{moved} moved")))
    }

    // -- micro-interactions ------------------------------------------------

    pub(super) fn pass_micro_interactions(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) -> PassResult {
        let seed = self.config.seed;
        let percent = self.config.micro_interaction_percent;

        let mut planned: Vec<(String, String, String)> = Vec::new();
        for (location, names) in self.colocated_groups() {
            if names.len() < 2 {
                continue;
            }
            for i in 0..names.len() {
                for j in (i + 1)..names.len() {
                    let pair = stable_pair_hash(&names[i], &names[j]);
                    if percent_roll(seed, stream(tick, SALT_INTERACT, pair), percent) {
                        planned.push((names[i].clone(), names[j].clone(), location.clone()));
                    }
                }
            }
        }

        let count = planned.len();
        for (a, b, location) in planned {
            self.apply_interaction(tick, sequence_in_tick, &a, &b, &location);
        }

        Ok(PassNote::Detail(format!("{count} interactions")))
    }

    fn apply_interaction(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
        a: &str,
        b: &str,
        location: &str,
    ) {
        let seed = self.config.seed;
        let pair = stable_pair_hash(a, b);
        let affinity = self
            .relationships
            .get(a, b)
            .map(|record| record.affinity())
            .unwrap_or(0.0);
        let both_adult = [a, b].iter().all(|name| {
            self.npcs
                .get(*name)
                .map(|npc| matches!(npc.life_stage(), LifeStage::Adult | LifeStage::Elder))
                .unwrap_or(false)
        });

        let (verb, friendship_delta, romance_delta) = if affinity < -20.0 {
            ("traded barbed remarks", -2.5, 0.0)
        } else if affinity > 30.0
            && both_adult
            && percent_roll(seed, stream(tick, SALT_FLAVOR, pair), 20)
        {
            ("lingered in conversation a little too long", 2.0, 1.5)
        } else if affinity > 30.0 {
            ("swapped stories", 2.5, 0.0)
        } else {
            ("made small talk", 1.5, 0.0)
        };

        let record = self
            .relationships
            .adjust(a, b, friendship_delta, romance_delta, tick);
        let friendship = record.friendship;
        let romance = record.romance;

        let day = self.clock.day;
        for (name, other) in [(a, b), (b, a)] {
            if let Some(npc) = self.npcs.get_mut(name) {
                npc.needs.relieve(NeedKind::Social, 12.0);
                npc.needs.relieve(NeedKind::Fun, 6.0);
                npc.psyche.loneliness = (npc.psyche.loneliness - 8.0).max(0.0);
                npc.memory.record(
                    tick,
                    day,
                    "interaction",
                    format!("{verb} with {other} at {location}"),
                    25.0 + friendship_delta.abs() * 4.0,
                );
            }
        }

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::InteractionOccurred,
            location.to_string(),
            vec![ActorRef::npc(a), ActorRef::npc(b)],
            format!("{a} and {b} {verb} at {location}"),
            Some(serde_json::json!({
                "friendship": friendship,
                "romance": romance,
                "verb": verb,
            })),
        );

        // Threshold milestones narrate once per pair.
        let key = canonical_pair(a, b);
        if friendship >= self.config.friendship_milestone
            && self.fired_friendships.insert(key.clone())
        {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::FriendshipFormed,
                location.to_string(),
                vec![ActorRef::npc(a), ActorRef::npc(b)],
                format!("{a} and {b} have become real friends"),
                None,
            );
        }
        if romance >= self.config.romance_milestone && self.fired_romances.insert(key) {
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::RomanceKindled,
                location.to_string(),
                vec![ActorRef::npc(a), ActorRef::npc(b)],
                format!("something is kindling between {a} and {b}"),
                None,
            );
        }
    }

    // -- emotional contagion -----------------------------------------------

    pub(super) fn pass_contagion(&mut self, tick: u64, sequence_in_tick: &mut u64) -> PassResult {
        let seed = self.config.seed;
        let percent = self.config.contagion_percent;

        let mut flips: Vec<(String, String, f32, String)> = Vec::new();
        for (location, names) in self.colocated_groups() {
            if names.len() < 2 {
                continue;
            }
            let members: Vec<(&str, &str, f32)> = names
                .iter()
                .filter_map(|name| {
                    self.npcs
                        .get(name)
                        .map(|npc| (name.as_str(), npc.mood.label.as_str(), npc.mood.intensity))
                })
                .collect();
            let Some((label, peak)) = dominant_mood(&members) else {
                continue;
            };
            let label = label.to_string();
            for (name, current, _) in &members {
                if *current == label {
                    continue;
                }
                if percent_roll(seed, stream(tick, SALT_CONTAGION, stable_hash(name)), percent) {
                    flips.push((
                        (*name).to_string(),
                        label.clone(),
                        caught_intensity(peak),
                        location.clone(),
                    ));
                }
            }
        }

        let count = flips.len();
        for (name, label, intensity, location) in flips {
            if let Some(npc) = self.npcs.get_mut(&name) {
                npc.mood.set(label.clone(), intensity);
            }
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::MoodSpread,
                location,
                vec![ActorRef::npc(&name)],
                format!("{name} catches the {label} mood"),
                None,
            );
        }

        Ok(PassNote::Detail(format!("{count} moods spread")))
    }

    // -- gossip ------------------------------------------------------------

    pub(super) fn pass_gossip(&mut self, tick: u64, sequence_in_tick: &mut u64) -> PassResult {
        let seed = self.config.seed;
        let day = self.clock.day;
        let shelf_life = self.config.gossip_shelf_life_days;

        // Spawn: occasionally someone starts a rumor about someone else.
        let mut spawned = 0_usize;
        if self.npcs.len() >= 2
            && percent_roll(
                seed,
                stream(tick, SALT_GOSSIP_SPAWN, 0),
                self.config.gossip_spawn_percent,
            )
        {
            let names: Vec<String> = self.npcs.keys().cloned().collect();
            let originator_idx = pick_index(seed, stream(tick, SALT_GOSSIP_SPAWN, 1), names.len())
                .unwrap_or(0);
            let mut subject_idx =
                pick_index(seed, stream(tick, SALT_GOSSIP_SPAWN, 2), names.len() - 1)
                    .unwrap_or(0);
            if subject_idx >= originator_idx {
                subject_idx += 1;
            }
            let originator = names[originator_idx].clone();
            let subject = names[subject_idx].clone();

            let content = self.rumor_content(&subject, seed, tick);
            let juiciness =
                sample_range_i64(seed, stream(tick, SALT_GOSSIP_SPAWN, 4), 25, 90);
            let gossip_id = format!("rumor_{:04}", self.next_gossip_serial);
            self.next_gossip_serial += 1;

            let location = self
                .npcs
                .get(&originator)
                .map(|npc| npc.location.clone())
                .unwrap_or_else(|| "town_square".to_string());
            self.gossip.start(
                gossip_id,
                subject.clone(),
                content.clone(),
                tick,
                day,
                juiciness,
                [originator.clone()],
            );
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::RumorStarted,
                location,
                vec![ActorRef::npc(&originator), ActorRef::npc(&subject)],
                format!("{originator} starts a rumor that {subject} {content}"),
                Some(serde_json::json!({ "juiciness": juiciness })),
            );
            spawned = 1;
        }

        // Spread: a knower and a non-knower sharing a location.
        let groups = self.colocated_groups();
        let mut planned: Vec<(String, String, String, String, String, String)> = Vec::new();
        for item in self.gossip.active(day, shelf_life) {
            for (location, names) in &groups {
                let tellers: Vec<&String> =
                    names.iter().filter(|name| item.knows(name)).collect();
                if tellers.is_empty() {
                    continue;
                }
                let teller = tellers[0].clone();
                for name in names {
                    if item.knows(name) {
                        continue;
                    }
                    let extra = stable_hash(name) ^ stable_hash(&item.gossip_id);
                    if percent_roll(
                        seed,
                        stream(tick, SALT_GOSSIP_SPREAD, extra),
                        self.config.gossip_spread_percent,
                    ) {
                        planned.push((
                            item.gossip_id.clone(),
                            item.subject.clone(),
                            item.content.clone(),
                            name.clone(),
                            teller.clone(),
                            location.clone(),
                        ));
                    }
                }
            }
        }

        let spread = planned.len();
        for (gossip_id, subject, content, listener, teller, location) in planned {
            if let Some(item) = self.gossip.get_mut(&gossip_id) {
                item.knowers.insert(listener.clone());
            }
            if let Some(npc) = self.npcs.get_mut(&listener) {
                npc.memory.record(
                    tick,
                    day,
                    "gossip",
                    format!("heard from {teller} that {subject} {content}"),
                    35.0,
                );
            }
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::RumorSpread,
                location,
                vec![ActorRef::npc(&teller), ActorRef::npc(&listener)],
                format!("{teller} whispers to {listener} about {subject}"),
                Some(serde_json::json!({ "gossip_id": gossip_id })),
            );
        }

        Ok(PassNote::Detail(format!("{spawned} started, {spread} spread")))
    }

    fn rumor_content(&self, subject: &str, seed: u64, tick: u64) -> String {
        // Half-glimpsed secrets make better rumors than invented ones.
        if let Some(npc) = self.npcs.get(subject) {
            if !npc.secrets.is_empty()
                && percent_roll(seed, stream(tick, SALT_GOSSIP_SPAWN, 3), 40)
            {
                let secrets: Vec<&String> = npc.secrets.iter().collect();
                let idx = pick_index(seed, stream(tick, SALT_GOSSIP_SPAWN, 6), secrets.len())
                    .unwrap_or(0);
                return format!("might be hiding that they {}", secrets[idx]);
            }
        }
        let idx = pick_index(
            seed,
            stream(tick, SALT_GOSSIP_SPAWN, 5),
            RUMOR_TEMPLATES.len(),
        )
        .unwrap_or(0);
        RUMOR_TEMPLATES[idx].to_string()
    }

    // -- memory consolidation ----------------------------------------------

    pub(super) fn pass_memory(&mut self) -> PassResult {
        let hours = self.config.hours_per_tick();
        let forget = self.config.memory_forget_threshold;
        for npc in self.npcs.values_mut() {
            npc.memory.decay(hours, forget);
        }
        Ok(PassNote::Applied)
    }

    // -- daily relationship decay -------------------------------------------

    pub(super) fn pass_relationship_decay(&mut self, tick: u64) -> PassResult {
        let stale_before = tick.saturating_sub(self.config.ticks_per_day());
        self.relationships
            .decay_unmaintained(stale_before, self.config.relationship_decay_per_day);
        Ok(PassNote::Applied)
    }
}

/// Free-form task label for what an NPC is doing at a location.
fn task_label(location: &str, occupation: &str, night: bool) -> String {
    if location.starts_with("home:") {
        return if night {
            "asleep".to_string()
        } else {
            "puttering at home".to_string()
        };
    }
    match location {
        "school" => {
            if occupation.to_lowercase().contains("teach") {
                "teaching".to_string()
            } else {
                "in class".to_string()
            }
        }
        "cafe" => "lingering over coffee".to_string(),
        "tavern" => "nursing a drink".to_string(),
        "park" => "taking the air".to_string(),
        "town_square" => "people-watching".to_string(),
        other => format!("busy at the {}", other.replace('_', " ")),
    }
}
