use super::*;

use std::fmt::Write as _;

use crate::npc::slug;

impl TownWorld {
    /// The filtered textual summary handed to the text-generation client.
    ///
    /// Memoized per simulated (day, whole hour): two requests within the
    /// same hour return the identical cached string; once the hour changes
    /// the snapshot is rebuilt.
    pub fn narrative_snapshot(&mut self) -> String {
        let day = self.clock.day;
        let hour_block = self.clock.hour_block();
        if let Some(cache) = &self.snapshot_cache {
            if cache.day == day && cache.hour_block == hour_block {
                return cache.text.clone();
            }
        }

        let text = self.build_snapshot_text();
        self.snapshot_cache = Some(SnapshotCache {
            day,
            hour_block,
            text: text.clone(),
        });
        text
    }

    fn build_snapshot_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "[{}] Day {} ({}), {}, {} — weather: {}",
            self.config.town_name,
            self.clock.day + 1,
            self.clock.weekday().as_str(),
            self.clock.time_label(),
            self.clock.season(self.config.days_per_season).as_str(),
            self.weather,
        );

        // Narratively relevant subset: strained needs, marked psyche, or a
        // strong tie to the player.
        let mut by_location: BTreeMap<&str, Vec<&Npc>> = BTreeMap::new();
        for npc in self.npcs.values() {
            if self.is_narratively_relevant(npc) {
                by_location.entry(npc.location.as_str()).or_default().push(npc);
            }
        }

        if by_location.is_empty() {
            let _ = writeln!(out, "\n[Scene] {} drifts through a quiet hour.", self.config.town_name);
        } else {
            for (location, npcs) in by_location {
                let _ = writeln!(out, "\n[Scene] {}", self.location_label(location));
                for npc in npcs {
                    let mut descriptors = npc
                        .needs
                        .strain_descriptors(self.config.snapshot_need_threshold)
                        .join(", ");
                    if npc.psyche.loneliness >= 60.0 {
                        if !descriptors.is_empty() {
                            descriptors.push_str(", ");
                        }
                        descriptors.push_str("lonely");
                    }
                    if descriptors.is_empty() {
                        descriptors.push_str("holding up fine");
                    }
                    let _ = writeln!(
                        out,
                        "- {} ({}, {}) — mood: {}; {}; {}",
                        npc.name, npc.age, npc.occupation, npc.mood.label, descriptors, npc.task,
                    );
                }
            }
        }

        let recent: Vec<&str> = self
            .event_log
            .iter()
            .rev()
            .take(self.config.recent_event_window)
            .map(|event| event.summary.as_str())
            .collect();
        if !recent.is_empty() {
            let _ = writeln!(out, "\n[Recent]");
            for line in recent.into_iter().rev() {
                let _ = writeln!(out, "- {line}");
            }
        }

        out
    }

    fn is_narratively_relevant(&self, npc: &Npc) -> bool {
        if npc.needs.any_above(self.config.snapshot_need_threshold) {
            return true;
        }
        if npc.psyche.loneliness >= 60.0 || npc.psyche.stress >= 70.0 {
            return true;
        }
        self.relationships
            .get(&self.config.player_name, &npc.name)
            .map(|record| record.affinity() >= self.config.snapshot_affinity_threshold)
            .unwrap_or(false)
    }

    /// Scene prompt for one NPC, used when the player talks to them: the
    /// time header, who they are, how they feel, what they remember, and
    /// what just happened around town.
    pub fn scene_prompt(&self, npc_name: &str, player_line: Option<&str>) -> Option<String> {
        let npc = self.npcs.get(npc_name)?;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "You are {}, a {}-year-old {} in the small town of {}.",
            npc.name, npc.age, npc.occupation, self.config.town_name,
        );
        if !npc.background.is_empty() {
            let _ = writeln!(out, "Background: {}", npc.background);
        }
        let _ = writeln!(
            out,
            "It is Day {} ({}), {}, {}. You are at {}, {}.",
            self.clock.day + 1,
            self.clock.weekday().as_str(),
            self.clock.time_label(),
            self.clock.season(self.config.days_per_season).as_str(),
            self.location_label(&npc.location),
            npc.task,
        );

        let descriptors = npc.needs.strain_descriptors(self.config.need_alert_threshold);
        let _ = writeln!(
            out,
            "You feel {} (mood: {}).",
            if descriptors.is_empty() {
                "more or less yourself".to_string()
            } else {
                descriptors.join(" and ")
            },
            npc.mood.label,
        );

        let memories = npc.memory.recall_top(3);
        if !memories.is_empty() {
            let _ = writeln!(out, "On your mind:");
            for memory in memories {
                let _ = writeln!(out, "- {}", memory.text);
            }
        }

        if let Some(record) = self.relationships.get(&self.config.player_name, npc_name) {
            let _ = writeln!(
                out,
                "Your relationship with {}: friendship {:.0}, romance {:.0}.",
                self.config.player_name, record.friendship, record.romance,
            );
        }

        let recent: Vec<&str> = self
            .event_log
            .iter()
            .rev()
            .take(5)
            .map(|event| event.summary.as_str())
            .collect();
        if !recent.is_empty() {
            let _ = writeln!(out, "Lately around town:");
            for line in recent.into_iter().rev() {
                let _ = writeln!(out, "- {line}");
            }
        }

        match player_line {
            Some(line) => {
                let _ = writeln!(
                    out,
                    "{} says to you: \"{}\". Reply in one or two sentences, in character.",
                    self.config.player_name, line,
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{} stops to talk with you. Greet them in one or two sentences, in character.",
                    self.config.player_name,
                );
            }
        }

        Some(out)
    }

    /// Human label for a location id.
    pub fn location_label(&self, location_id: &str) -> String {
        if let Some(home_slug) = location_id.strip_prefix("home:") {
            if let Some(npc) = self
                .npcs
                .values()
                .find(|npc| slug(&npc.name) == home_slug)
            {
                return format!("{}'s home", npc.name);
            }
            return "a quiet house".to_string();
        }
        format!("the {}", location_id.replace('_', " "))
    }
}
