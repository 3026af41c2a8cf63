use super::*;

use serde_json::json;

use crate::npc::NeedKind;

impl TownWorld {
    /// Status detail for the API and CLI: run status plus derived calendar
    /// fields and the last tick report.
    pub fn status_view(&self) -> Value {
        json!({
            "status": self.status,
            "calendar": {
                "day": self.clock.day,
                "hour": self.clock.hour(),
                "time": self.clock.time_label(),
                "weekday": self.clock.weekday().as_str(),
                "season": self.clock.season(self.config.days_per_season).as_str(),
            },
            "weather": self.weather,
            "roster_error": self.roster_error,
            "last_tick": self.last_tick_report,
        })
    }

    /// Full inspector view of one NPC.
    pub fn npc_view(&self, name: &str) -> Option<Value> {
        let npc = self.npcs.get(name)?;

        let needs: BTreeMap<&str, f32> = NeedKind::ALL
            .iter()
            .map(|kind| (kind.as_str(), npc.needs.get(*kind)))
            .collect();

        let relationships: Vec<Value> = self
            .relationships
            .partners_of(name)
            .into_iter()
            .map(|(partner, record)| {
                json!({
                    "with": partner,
                    "friendship": record.friendship,
                    "romance": record.romance,
                    "interactions": record.interactions,
                    "last_interaction_tick": record.last_interaction_tick,
                })
            })
            .collect();

        let memories: Vec<Value> = npc
            .memory
            .recall_top(8)
            .into_iter()
            .map(|memory| {
                json!({
                    "tick": memory.tick,
                    "kind": memory.kind,
                    "text": memory.text,
                    "salience": memory.salience,
                })
            })
            .collect();

        let known_gossip = self
            .gossip
            .active(self.clock.day, self.config.gossip_shelf_life_days)
            .into_iter()
            .filter(|item| item.knows(name))
            .count();

        Some(json!({
            "name": npc.name,
            "age": npc.age,
            "gender": npc.gender,
            "occupation": npc.occupation,
            "life_stage": npc.life_stage().as_str(),
            "traits": npc.traits,
            "goals": npc.goals,
            "location": npc.location,
            "location_label": self.location_label(&npc.location),
            "task": npc.task,
            "mood": { "label": npc.mood.label, "intensity": npc.mood.intensity },
            "needs": needs,
            "psyche": npc.psyche,
            "health": npc.health,
            "reputation": npc.reputation,
            "skills": npc.skills,
            "memories": memories,
            "relationships": relationships,
            "known_gossip": known_gossip,
        }))
    }

    /// A page of the global event log, newest last.
    pub fn events_page(&self, offset: usize, limit: usize) -> (Vec<&Event>, usize) {
        let total = self.event_log.len();
        let page = self
            .event_log
            .iter()
            .skip(offset)
            .take(limit)
            .collect();
        (page, total)
    }

    /// Rolling debug logs, one list per channel.
    pub fn rolling_logs(&self) -> Value {
        let logs: BTreeMap<&str, Vec<String>> = self
            .channels()
            .into_iter()
            .map(|channel| (channel, self.recent_channel(channel)))
            .collect();
        json!(logs)
    }
}
