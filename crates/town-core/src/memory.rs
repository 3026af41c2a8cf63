//! Per-NPC memory: an append-only list of timestamped, typed, salience-scored
//! entries, pruned by a decay-and-forget threshold rather than explicit
//! deletion.

use serde::{Deserialize, Serialize};

/// Salience lost per simulated hour. Vivid memories survive days; idle
/// chatter fades within one.
const SALIENCE_DECAY_PER_HOUR: f32 = 0.35;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEntry {
    pub tick: u64,
    pub day: u64,
    pub kind: String,
    pub text: String,
    pub salience: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryLog {
    entries: Vec<MemoryEntry>,
    capacity: usize,
}

impl MemoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(
        &mut self,
        tick: u64,
        day: u64,
        kind: impl Into<String>,
        text: impl Into<String>,
        salience: f32,
    ) {
        self.entries.push(MemoryEntry {
            tick,
            day,
            kind: kind.into(),
            text: text.into(),
            salience: salience.clamp(0.0, 100.0),
        });
        self.enforce_capacity();
    }

    /// Decay every entry by elapsed hours and forget what falls below the
    /// threshold.
    pub fn decay(&mut self, elapsed_hours: f32, forget_threshold: f32) {
        let loss = SALIENCE_DECAY_PER_HOUR * elapsed_hours.max(0.0);
        for entry in &mut self.entries {
            entry.salience = (entry.salience - loss).max(0.0);
        }
        self.entries.retain(|entry| entry.salience > forget_threshold);
    }

    /// Most salient entries, ties broken by recency.
    pub fn recall_top(&self, n: usize) -> Vec<&MemoryEntry> {
        let mut ranked: Vec<&MemoryEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            b.salience
                .total_cmp(&a.salience)
                .then(b.tick.cmp(&a.tick))
        });
        ranked.truncate(n);
        ranked
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn enforce_capacity(&mut self) {
        if self.entries.len() <= self.capacity {
            return;
        }

        // Drop the least salient, oldest-first on ties.
        self.entries.sort_by(|a, b| {
            a.salience
                .total_cmp(&b.salience)
                .then(a.tick.cmp(&b.tick))
        });
        let over = self.entries.len() - self.capacity;
        self.entries.drain(0..over);
        self.entries.sort_by_key(|entry| entry.tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_appended_with_clamped_salience() {
        let mut log = MemoryLog::new(8);
        log.record(1, 0, "interaction", "shared coffee with Mara", 250.0);
        assert_eq!(log.len(), 1);
        assert!((log.entries()[0].salience - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_forgets_below_threshold() {
        let mut log = MemoryLog::new(8);
        log.record(1, 0, "interaction", "small talk", 6.0);
        log.record(2, 0, "milestone", "birthday party", 90.0);

        log.decay(10.0, 5.0); // 3.5 salience lost

        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].kind, "milestone");
    }

    #[test]
    fn capacity_evicts_least_salient_first() {
        let mut log = MemoryLog::new(2);
        log.record(1, 0, "interaction", "a", 10.0);
        log.record(2, 0, "interaction", "b", 80.0);
        log.record(3, 0, "interaction", "c", 50.0);

        assert_eq!(log.len(), 2);
        let texts: Vec<&str> = log.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn recall_ranks_by_salience_then_recency() {
        let mut log = MemoryLog::new(8);
        log.record(1, 0, "interaction", "old strong", 70.0);
        log.record(5, 0, "interaction", "new strong", 70.0);
        log.record(3, 0, "interaction", "weak", 20.0);

        let top = log.recall_top(2);
        assert_eq!(top[0].text, "new strong");
        assert_eq!(top[1].text, "old strong");
    }
}
