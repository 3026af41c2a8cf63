//! Simulated calendar: a single mutable clock advancing in fractional-hour
//! increments, with hour/day/weekday/season derived fields.
//!
//! Time is stored as integer minutes so that repeated advances stay exact;
//! the fractional `hour()` view is derived. Invariant: `minute_of_day` is
//! always in `[0, 1440)`, so `hour()` is always in `[0, 24)`.

use contracts::{Season, Weekday, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TownClock {
    pub day: u64,
    minute_of_day: u64,
}

/// Outcome of one clock advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAdvance {
    pub rolled_day: bool,
    pub days_rolled: u64,
}

impl TownClock {
    pub fn new() -> Self {
        Self {
            day: 0,
            minute_of_day: 8 * 60,
        }
    }

    /// Start at an explicit day and minute-of-day (wrapped into range).
    pub fn at(day: u64, minute_of_day: u64) -> Self {
        Self {
            day: day + minute_of_day / MINUTES_PER_DAY,
            minute_of_day: minute_of_day % MINUTES_PER_DAY,
        }
    }

    /// Advance by `minutes`, rolling the day counter as needed.
    pub fn advance(&mut self, minutes: u64) -> ClockAdvance {
        let total = self.minute_of_day + minutes;
        let days_rolled = total / MINUTES_PER_DAY;
        self.minute_of_day = total % MINUTES_PER_DAY;
        self.day += days_rolled;
        ClockAdvance {
            rolled_day: days_rolled > 0,
            days_rolled,
        }
    }

    /// Fractional hour in `[0, 24)`.
    pub fn hour(&self) -> f64 {
        self.minute_of_day as f64 / 60.0
    }

    pub fn minute_of_day(&self) -> u64 {
        self.minute_of_day
    }

    /// Whole hour in `[0, 24)`, the snapshot-cache key granularity.
    pub fn hour_block(&self) -> u64 {
        self.minute_of_day / 60
    }

    pub fn weekday(&self) -> Weekday {
        Weekday::from_day_index(self.day)
    }

    pub fn season(&self, days_per_season: u64) -> Season {
        Season::from_day_index(self.day, days_per_season)
    }

    /// Night window used by the schedule resolver and sleep recovery.
    pub fn is_night(&self) -> bool {
        let hour = self.hour_block();
        !(6..22).contains(&hour)
    }

    /// "14:30"-style label for prompts and logs.
    pub fn time_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.minute_of_day / 60,
            self.minute_of_day % 60
        )
    }
}

impl Default for TownClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_stays_in_range() {
        let mut clock = TownClock::new();
        for _ in 0..1_000 {
            clock.advance(37);
            assert!(clock.hour() >= 0.0 && clock.hour() < 24.0);
            assert!(clock.minute_of_day() < MINUTES_PER_DAY);
        }
    }

    #[test]
    fn twenty_four_hours_rolls_exactly_one_day() {
        let mut clock = TownClock::at(3, 9 * 60 + 30);
        let start_hour = clock.hour();
        let start_day = clock.day;

        // 48 half-hour ticks = exactly 24 hours.
        let mut rolls = 0;
        for _ in 0..48 {
            if clock.advance(30).rolled_day {
                rolls += 1;
            }
        }

        assert_eq!(clock.day, start_day + 1);
        assert_eq!(rolls, 1);
        assert_eq!(clock.hour().to_bits(), start_hour.to_bits());
    }

    #[test]
    fn multi_day_advance_counts_rolls() {
        let mut clock = TownClock::at(0, 0);
        let advance = clock.advance(3 * MINUTES_PER_DAY + 15);
        assert!(advance.rolled_day);
        assert_eq!(advance.days_rolled, 3);
        assert_eq!(clock.day, 3);
        assert_eq!(clock.minute_of_day(), 15);
    }

    #[test]
    fn weekday_tracks_day_counter() {
        let clock = TownClock::at(0, 0);
        assert_eq!(clock.weekday(), Weekday::Monday);
        let clock = TownClock::at(12, 0);
        assert_eq!(clock.weekday(), Weekday::Saturday);
    }

    #[test]
    fn night_window_wraps_midnight() {
        assert!(TownClock::at(0, 23 * 60).is_night());
        assert!(TownClock::at(0, 2 * 60).is_night());
        assert!(!TownClock::at(0, 12 * 60).is_night());
        assert!(!TownClock::at(0, 6 * 60).is_night());
        assert!(TownClock::at(0, 5 * 60 + 59).is_night());
    }

    #[test]
    fn serde_round_trip_is_bit_identical() {
        let mut clock = TownClock::new();
        clock.advance(12_345);
        let json = serde_json::to_string(&clock).expect("serialize");
        let restored: TownClock = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, clock);
        assert_eq!(restored.hour().to_bits(), clock.hour().to_bits());
    }
}
