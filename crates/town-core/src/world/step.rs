use super::*;

use contracts::SimMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    Applied,
    Skipped,
    Failed,
}

/// Explicit per-subsystem result, aggregated by the tick driver. A failed
/// pass is observable here instead of being silently swallowed, and never
/// aborts the tick.
#[derive(Debug, Clone, Serialize)]
pub struct PassOutcome {
    pub pass: &'static str,
    pub status: PassStatus,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub rolled_day: bool,
    pub events_emitted: usize,
    pub outcomes: Vec<PassOutcome>,
}

impl TickReport {
    pub fn failed_passes(&self) -> Vec<&PassOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == PassStatus::Failed)
            .collect()
    }
}

/// What one pass reports back to the driver.
pub(super) enum PassNote {
    Applied,
    Detail(String),
    Skipped(String),
}

pub(super) type PassResult = Result<PassNote, String>;

impl TownWorld {
    pub fn start(&mut self) {
        if !self.status.is_complete() {
            self.status.mode = SimMode::Running;
        }
    }

    pub fn pause(&mut self) {
        self.status.mode = SimMode::Paused;
    }

    /// Advance the simulation by one tick: advance the clock, then run the
    /// fixed-order subsystem pipeline over the roster. Returns false once
    /// the run is complete.
    pub fn step(&mut self) -> bool {
        if self.status.is_complete() {
            self.status.mode = SimMode::Paused;
            return false;
        }
        self.status.mode = SimMode::Running;

        let tick = self.status.current_tick + 1;
        self.status.current_tick = tick;
        let advance = self.clock.advance(self.config.minutes_per_tick);
        let rolled_day = advance.rolled_day;

        let events_before = self.event_log.len();
        let mut sequence_in_tick = 0_u64;
        let mut outcomes = Vec::new();

        // Fixed pipeline order; source order is the only ordering guarantee.
        let result = self.apply_due_actions(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("player_actions", result));

        let result = self.pass_needs(tick);
        outcomes.push(Self::outcome("needs", result));

        let result = self.pass_schedule(tick);
        outcomes.push(Self::outcome("schedule", result));

        let result = self.pass_micro_interactions(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("micro_interactions", result));

        let result = self.pass_contagion(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("contagion", result));

        let result = self.pass_gossip(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("gossip", result));

        let result = self.pass_memory();
        outcomes.push(Self::outcome("memory", result));

        let result = self.pass_environment(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("environment", result));

        let result = self.pass_school_drama(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("school_drama", result));

        let result = self.pass_crime(tick, rolled_day, &mut sequence_in_tick);
        outcomes.push(Self::outcome("crime", result));

        let result = self.pass_consequences(tick, &mut sequence_in_tick);
        outcomes.push(Self::outcome("consequences", result));

        if rolled_day {
            let result = self.pass_biology(tick, &mut sequence_in_tick);
            outcomes.push(Self::outcome("biology", result));

            let result = self.pass_relationship_decay(tick);
            outcomes.push(Self::outcome("relationship_decay", result));
        }

        let report = TickReport {
            tick,
            rolled_day,
            events_emitted: self.event_log.len() - events_before,
            outcomes,
        };
        for failed in report.failed_passes() {
            tracing::warn!(
                tick,
                pass = failed.pass,
                detail = failed.detail.as_deref().unwrap_or(""),
                "subsystem pass failed; tick continued"
            );
        }
        self.last_tick_report = Some(report);

        if self.status.current_tick >= self.status.max_ticks {
            self.status.mode = SimMode::Paused;
        }
        self.sync_status();

        true
    }

    pub fn step_n(&mut self, n: u64) -> u64 {
        let mut committed = 0_u64;
        for _ in 0..n {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub fn run_to_tick(&mut self, tick: u64) -> u64 {
        let mut committed = 0_u64;
        while self.status.current_tick < tick {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    fn outcome(pass: &'static str, result: PassResult) -> PassOutcome {
        match result {
            Ok(PassNote::Applied) => PassOutcome {
                pass,
                status: PassStatus::Applied,
                detail: None,
            },
            Ok(PassNote::Detail(detail)) => PassOutcome {
                pass,
                status: PassStatus::Applied,
                detail: Some(detail),
            },
            Ok(PassNote::Skipped(reason)) => PassOutcome {
                pass,
                status: PassStatus::Skipped,
                detail: Some(reason),
            },
            Err(reason) => PassOutcome {
                pass,
                status: PassStatus::Failed,
                detail: Some(reason),
            },
        }
    }
}
