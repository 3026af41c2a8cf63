use super::*;

use contracts::Season;

use crate::biology::{daily_tick, BioOutcome};
use crate::npc::LifeStage;
use crate::rng::{percent_roll, pick_index, pick_weighted, sample_range_i64, stable_hash};
use crate::schedule::SCHOOL;
use crate::world::passes::stream;
use crate::world::step::{PassNote, PassResult};

const SALT_WEATHER: u64 = 8;
const SALT_FLAVOR: u64 = 9;
const SALT_SCHOOL: u64 = 10;
const SALT_CRIME: u64 = 11;
const SALT_BIOLOGY: u64 = 12;

/// Fraction of the roster that must know a crime rumor before consequences
/// land.
const CONSEQUENCE_SATURATION: f32 = 0.5;

fn seasonal_weather(season: Season) -> &'static [(&'static str, u64)] {
    match season {
        Season::Spring => &[("clear", 4), ("rain", 3), ("overcast", 2), ("storm", 1)],
        Season::Summer => &[("clear", 5), ("sweltering", 2), ("storm", 1), ("overcast", 1)],
        Season::Autumn => &[("overcast", 3), ("rain", 3), ("clear", 2), ("fog", 2)],
        Season::Winter => &[("snow", 3), ("overcast", 3), ("clear", 2), ("sleet", 1)],
    }
}

fn weather_flavor(weather: &str) -> Option<&'static str> {
    match weather {
        "storm" => Some("thunder rattles every window on the square"),
        "snow" => Some("fresh snow muffles the town to a hush"),
        "sweltering" => Some("the heat drives everyone toward shade and cold drinks"),
        "fog" => Some("fog swallows the far end of the main street"),
        _ => None,
    }
}

impl TownWorld {
    // -- environmental triggers ----------------------------------------------

    pub(super) fn pass_environment(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) -> PassResult {
        let seed = self.config.seed;

        if percent_roll(
            seed,
            stream(tick, SALT_WEATHER, 0),
            self.config.weather_shift_percent,
        ) {
            let season = self.clock.season(self.config.days_per_season);
            let table = seasonal_weather(season);
            if let Some(next) = pick_weighted(seed, stream(tick, SALT_WEATHER, 1), table) {
                if *next != self.weather {
                    self.weather = (*next).to_string();
                    self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::WeatherShifted,
                        "town_square".to_string(),
                        Vec::new(),
                        format!("the sky over {} turns {}", self.config.town_name, next),
                        None,
                    );
                }
            }
        }

        if let Some(flavor) = weather_flavor(&self.weather) {
            if percent_roll(seed, stream(tick, SALT_FLAVOR, 0), 5) {
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::EnvironmentStirred,
                    "town_square".to_string(),
                    Vec::new(),
                    flavor.to_string(),
                    None,
                );
            }
        }

        Ok(PassNote::Applied)
    }

    // -- school drama --------------------------------------------------------

    pub(super) fn pass_school_drama(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) -> PassResult {
        let seed = self.config.seed;
        let students: Vec<String> = self
            .npcs
            .values()
            .filter(|npc| npc.location == SCHOOL && npc.is_school_age())
            .map(|npc| npc.name.clone())
            .collect();
        if students.len() < 2 {
            return Ok(PassNote::Skipped("fewer than two students present".to_string()));
        }

        if !percent_roll(
            seed,
            stream(tick, SALT_SCHOOL, 0),
            self.config.school_drama_percent,
        ) {
            return Ok(PassNote::Detail("quiet classroom".to_string()));
        }

        let first_idx = pick_index(seed, stream(tick, SALT_SCHOOL, 1), students.len())
            .unwrap_or(0);
        let mut second_idx =
            pick_index(seed, stream(tick, SALT_SCHOOL, 2), students.len() - 1).unwrap_or(0);
        if second_idx >= first_idx {
            second_idx += 1;
        }
        let first = students[first_idx].clone();
        let second = students[second_idx].clone();

        self.relationships.adjust(&first, &second, -4.0, 0.0, tick);
        let day = self.clock.day;
        for (name, other) in [(&first, &second), (&second, &first)] {
            if let Some(npc) = self.npcs.get_mut(name.as_str()) {
                npc.psyche.stress = (npc.psyche.stress + 8.0).min(100.0);
                npc.memory.record(
                    tick,
                    day,
                    "drama",
                    format!("fell out with {other} in front of everyone"),
                    45.0,
                );
            }
        }

        let gossip_id = format!("rumor_{:04}", self.next_gossip_serial);
        self.next_gossip_serial += 1;
        self.gossip.start(
            gossip_id,
            first.clone(),
            format!("had a blow-up with {second} at school"),
            tick,
            day,
            sample_range_i64(seed, stream(tick, SALT_SCHOOL, 3), 40, 80),
            students.iter().cloned().collect::<Vec<_>>(),
        );

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::SchoolDramaErupted,
            SCHOOL.to_string(),
            vec![ActorRef::npc(&first), ActorRef::npc(&second)],
            format!("{first} and {second} have a blow-up in front of the whole class"),
            None,
        );

        Ok(PassNote::Detail("drama erupted".to_string()))
    }

    // -- crime ---------------------------------------------------------------

    pub(super) fn pass_crime(
        &mut self,
        tick: u64,
        rolled_day: bool,
        sequence_in_tick: &mut u64,
    ) -> PassResult {
        if !rolled_day {
            return Ok(PassNote::Skipped("daily pass, not due".to_string()));
        }

        let seed = self.config.seed;
        if !percent_roll(
            seed,
            stream(self.clock.day, SALT_CRIME, 0),
            self.config.crime_percent_per_day,
        ) {
            return Ok(PassNote::Detail("law-abiding day".to_string()));
        }

        let adults: Vec<(String, u64)> = self
            .npcs
            .values()
            .filter(|npc| matches!(npc.life_stage(), LifeStage::Adult | LifeStage::Elder))
            .map(|npc| {
                let weight = if npc.has_trait("reckless")
                    || npc.has_trait("greedy")
                    || npc.has_trait("desperate")
                {
                    4
                } else {
                    1
                };
                (npc.name.clone(), weight)
            })
            .collect();
        if adults.len() < 2 {
            return Ok(PassNote::Skipped("not enough adults".to_string()));
        }

        let perpetrator = match pick_weighted(seed, stream(self.clock.day, SALT_CRIME, 1), &adults)
        {
            Some(name) => name.clone(),
            None => return Ok(PassNote::Skipped("no candidate".to_string())),
        };
        let victims: Vec<&(String, u64)> = adults
            .iter()
            .filter(|(name, _)| *name != perpetrator)
            .collect();
        let victim_idx = pick_index(
            seed,
            stream(self.clock.day, SALT_CRIME, 2),
            victims.len(),
        )
        .unwrap_or(0);
        let victim = victims[victim_idx].0.clone();

        let day = self.clock.day;
        let location = self
            .npcs
            .get(&victim)
            .map(|npc| npc.location.clone())
            .unwrap_or_else(|| "town_square".to_string());

        if let Some(npc) = self.npcs.get_mut(&perpetrator) {
            npc.secrets
                .insert(format!("lifted something from {victim}"));
            npc.reputation = (npc.reputation - 5.0).clamp(-100.0, 100.0);
            npc.memory.record(tick, day, "crime", "did something they regret", 55.0);
        }
        if let Some(npc) = self.npcs.get_mut(&victim) {
            npc.psyche.stress = (npc.psyche.stress + 12.0).min(100.0);
            npc.memory.record(
                tick,
                day,
                "crime",
                "something of theirs went missing",
                60.0,
            );
        }

        let gossip_id = format!("crime_{:04}", self.next_gossip_serial);
        self.next_gossip_serial += 1;
        self.gossip.start(
            gossip_id,
            perpetrator.clone(),
            format!("took something that wasn't theirs from {victim}"),
            tick,
            day,
            sample_range_i64(seed, stream(self.clock.day, SALT_CRIME, 3), 70, 95),
            [victim.clone()],
        );

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::CrimeCommitted,
            location,
            vec![ActorRef::npc(&perpetrator), ActorRef::npc(&victim)],
            format!("something of {victim}'s goes missing, and {perpetrator} was seen nearby"),
            None,
        );

        Ok(PassNote::Detail("petty crime committed".to_string()))
    }

    // -- consequences --------------------------------------------------------

    pub(super) fn pass_consequences(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) -> PassResult {
        let day = self.clock.day;
        let shelf_life = self.config.gossip_shelf_life_days;
        let population = self.npcs.len();
        if population == 0 {
            return Ok(PassNote::Skipped("empty roster".to_string()));
        }

        let due: Vec<(String, String, Vec<String>)> = self
            .gossip
            .active(day, shelf_life)
            .into_iter()
            .filter(|item| {
                item.gossip_id.starts_with("crime_")
                    && !self.consequenced_gossip.contains(&item.gossip_id)
                    && item.knowers.len() as f32 / population as f32 >= CONSEQUENCE_SATURATION
            })
            .map(|item| {
                (
                    item.gossip_id.clone(),
                    item.subject.clone(),
                    item.knowers.iter().cloned().collect(),
                )
            })
            .collect();

        let count = due.len();
        for (gossip_id, subject, knowers) in due {
            self.consequenced_gossip.insert(gossip_id);

            let location = self
                .npcs
                .get(&subject)
                .map(|npc| npc.location.clone())
                .unwrap_or_else(|| "town_square".to_string());
            if let Some(npc) = self.npcs.get_mut(&subject) {
                npc.reputation = (npc.reputation - 15.0).clamp(-100.0, 100.0);
                npc.psyche.stress = (npc.psyche.stress + 15.0).min(100.0);
                npc.psyche.confidence = (npc.psyche.confidence - 10.0).max(0.0);
            }
            for knower in &knowers {
                if knower != &subject {
                    self.relationships.adjust(knower, &subject, -3.0, 0.0, tick);
                }
            }

            self.push_event(
                tick,
                sequence_in_tick,
                EventType::ReputationShifted,
                location.clone(),
                vec![ActorRef::npc(&subject)],
                format!("{subject}'s standing in town takes a hit"),
                None,
            );
            self.push_event(
                tick,
                sequence_in_tick,
                EventType::ConsequenceLanded,
                location,
                vec![ActorRef::npc(&subject)],
                format!("half the town now gives {subject} the cold shoulder"),
                None,
            );
        }

        Ok(PassNote::Detail(format!("{count} consequences landed")))
    }

    // -- daily biology -------------------------------------------------------

    pub(super) fn pass_biology(&mut self, tick: u64, sequence_in_tick: &mut u64) -> PassResult {
        let seed = self.config.seed;
        let day = self.clock.day;
        let names: Vec<String> = self.npcs.keys().cloned().collect();

        let mut milestones = 0_usize;
        for name in names {
            let (outcomes, location) = match self.npcs.get_mut(&name) {
                Some(npc) => {
                    let outcomes = daily_tick(npc);
                    if outcomes
                        .iter()
                        .any(|o| matches!(o, BioOutcome::Birthday { .. }))
                    {
                        npc.psyche.confidence = (npc.psyche.confidence + 5.0).min(100.0);
                        npc.memory.record(tick, day, "milestone", "another year older", 50.0);
                    }
                    (outcomes, npc.location.clone())
                }
                None => continue,
            };

            for outcome in outcomes {
                milestones += 1;
                match outcome {
                    BioOutcome::Birthday { new_age } => {
                        let cake = sample_range_i64(
                            seed,
                            stream(day, SALT_BIOLOGY, stable_hash(&name)),
                            0,
                            1,
                        ) == 0;
                        let summary = if cake {
                            format!("{name} turns {new_age}; there is cake at {location}")
                        } else {
                            format!("{name} turns {new_age} without much fuss")
                        };
                        self.push_event(
                            tick,
                            sequence_in_tick,
                            EventType::BirthdayCelebrated,
                            location.clone(),
                            vec![ActorRef::npc(&name)],
                            summary,
                            Some(serde_json::json!({ "age": new_age })),
                        );
                    }
                    BioOutcome::LifeStageAdvanced { stage } => {
                        self.push_event(
                            tick,
                            sequence_in_tick,
                            EventType::LifeStageAdvanced,
                            location.clone(),
                            vec![ActorRef::npc(&name)],
                            format!("{name} is a {} now", stage.as_str()),
                            None,
                        );
                    }
                    BioOutcome::SkillImproved { skill, level } => {
                        if let Some(npc) = self.npcs.get_mut(&name) {
                            let note = match npc.goals.first() {
                                Some(goal) => {
                                    format!("getting better at {skill}; a step closer to \"{goal}\"")
                                }
                                None => format!("getting better at {skill}"),
                            };
                            npc.memory.record(tick, day, "milestone", note, 40.0);
                        }
                        self.push_event(
                            tick,
                            sequence_in_tick,
                            EventType::SkillImproved,
                            location.clone(),
                            vec![ActorRef::npc(&name)],
                            format!("{name} is getting noticeably better at {skill}"),
                            Some(serde_json::json!({ "skill": skill, "level": level })),
                        );
                    }
                }
            }
        }

        Ok(PassNote::Detail(format!("{milestones} milestones")))
    }
}
