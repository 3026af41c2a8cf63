use super::*;

use contracts::{ActionPayload, ActionResult, ActionType, ApiError, ErrorCode};

use crate::npc::{LifeStage, NeedKind};
use crate::world::step::{PassNote, PassResult};

impl TownWorld {
    /// Validate and queue a player action. Accepted actions apply at the top
    /// of the next tick, in submission order.
    pub fn queue_action(&mut self, action: PlayerAction) -> ActionResult {
        if let Some(error) = self.validate_action(&action) {
            return ActionResult::rejected(&action, error);
        }

        let effective_tick = self.status.current_tick + 1;
        let result = ActionResult::accepted(&action);
        self.queued_actions.push(QueuedAction {
            effective_tick,
            insertion_sequence: self.next_action_sequence,
            action,
        });
        self.next_action_sequence += 1;
        self.sync_status();
        result
    }

    fn validate_action(&self, action: &PlayerAction) -> Option<ApiError> {
        if action.schema_version != SCHEMA_VERSION_V1 {
            return Some(ApiError::new(
                ErrorCode::ContractVersionUnsupported,
                "Unsupported schema_version",
                Some(format!(
                    "got={} expected={}",
                    action.schema_version, SCHEMA_VERSION_V1
                )),
            ));
        }

        if action.sim_id != self.config.sim_id {
            return Some(ApiError::new(
                ErrorCode::SimNotFound,
                "action.sim_id does not match active sim",
                None,
            ));
        }

        if !action_type_matches_payload(action.action_type, &action.payload) {
            return Some(ApiError::new(
                ErrorCode::InvalidAction,
                "action_type does not match payload variant",
                None,
            ));
        }

        let target = action.payload.target_npc();
        let Some(npc) = self.npcs.get(target) else {
            return Some(ApiError::new(
                ErrorCode::NpcNotFound,
                "target NPC is not in the roster",
                Some(format!("npc={target}")),
            ));
        };

        match &action.payload {
            ActionPayload::Flirt { .. }
                if !matches!(npc.life_stage(), LifeStage::Adult | LifeStage::Elder) =>
            {
                Some(ApiError::new(
                    ErrorCode::InvalidAction,
                    "flirt target must be an adult",
                    None,
                ))
            }
            ActionPayload::Gift { item, .. } if item.trim().is_empty() => Some(ApiError::new(
                ErrorCode::InvalidAction,
                "gift requires an item",
                None,
            )),
            ActionPayload::Talk { line: Some(line), .. } if line.len() > 500 => {
                Some(ApiError::new(
                    ErrorCode::InvalidAction,
                    "talk line is too long",
                    Some(format!("len={}", line.len())),
                ))
            }
            _ => None,
        }
    }

    /// Apply every queued action whose effective tick has arrived, in
    /// (tick, submission) order.
    pub(super) fn apply_due_actions(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) -> PassResult {
        let mut due = Vec::new();
        let mut remaining = Vec::new();
        for queued in self.queued_actions.drain(..) {
            if queued.effective_tick <= tick {
                due.push(queued);
            } else {
                remaining.push(queued);
            }
        }
        self.queued_actions = remaining;
        due.sort_by_key(|queued| (queued.effective_tick, queued.insertion_sequence));

        let count = due.len();
        for queued in due {
            self.apply_action(tick, sequence_in_tick, queued.action);
        }
        self.sync_status();

        Ok(PassNote::Detail(format!("{count} applied")))
    }

    fn apply_action(&mut self, tick: u64, sequence_in_tick: &mut u64, action: PlayerAction) {
        let player = self.config.player_name.clone();
        let day = self.clock.day;

        match action.payload {
            ActionPayload::Talk { npc, line } => {
                let Some(target) = self.npcs.get_mut(&npc) else {
                    return;
                };
                let location = target.location.clone();
                target.needs.relieve(NeedKind::Social, 10.0);
                target.psyche.loneliness = (target.psyche.loneliness - 6.0).max(0.0);
                target.memory.record(
                    tick,
                    day,
                    "player",
                    match &line {
                        Some(line) => format!("{player} said: \"{line}\""),
                        None => format!("chatted with {player}"),
                    },
                    30.0,
                );

                self.relationships.adjust(&player, &npc, 2.0, 0.0, tick);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::PlayerTalked,
                    location,
                    vec![ActorRef::player(&player), ActorRef::npc(&npc)],
                    format!("{player} stops to talk with {npc}"),
                    line.map(|line| serde_json::json!({ "line": line })),
                );
            }
            ActionPayload::Flirt { npc } => {
                let Some(target) = self.npcs.get_mut(&npc) else {
                    return;
                };
                let location = target.location.clone();
                target.needs.relieve(NeedKind::Social, 5.0);
                target.needs.relieve(NeedKind::Libido, 5.0);
                target.psyche.confidence = (target.psyche.confidence + 2.0).min(100.0);
                target.memory.record(
                    tick,
                    day,
                    "player",
                    format!("{player} was flirting, and it was not unwelcome"),
                    35.0,
                );

                self.relationships.adjust(&player, &npc, 0.5, 3.0, tick);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::PlayerFlirted,
                    location,
                    vec![ActorRef::player(&player), ActorRef::npc(&npc)],
                    format!("{player} flirts with {npc}"),
                    None,
                );
            }
            ActionPayload::Gift { npc, item } => {
                let Some(target) = self.npcs.get_mut(&npc) else {
                    return;
                };
                let location = target.location.clone();
                target.needs.relieve(NeedKind::Fun, 8.0);
                target.memory.record(
                    tick,
                    day,
                    "player",
                    format!("received {item} from {player}"),
                    40.0,
                );

                self.relationships.adjust(&player, &npc, 4.0, 0.0, tick);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::PlayerGifted,
                    location,
                    vec![ActorRef::player(&player), ActorRef::npc(&npc)],
                    format!("{player} gives {npc} {item}"),
                    Some(serde_json::json!({ "item": item })),
                );
            }
        }
    }
}

fn action_type_matches_payload(action_type: ActionType, payload: &ActionPayload) -> bool {
    matches!(
        (action_type, payload),
        (ActionType::Talk, ActionPayload::Talk { .. })
            | (ActionType::Flirt, ActionPayload::Flirt { .. })
            | (ActionType::Gift, ActionPayload::Gift { .. })
    )
}
