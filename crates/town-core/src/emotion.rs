//! Emotional contagion: within a same-location group, the dominant mood
//! spreads to the rest with a configured chance and dampened intensity.

use std::collections::BTreeMap;

/// Minimum intensity for a mood to count toward dominance.
const DOMINANCE_FLOOR: f32 = 40.0;

/// Fraction of the source intensity a catcher adopts.
const CATCH_DAMPING: f32 = 0.7;

/// Determine the dominant mood of a location group: the most common label
/// among members whose intensity clears the floor, ties broken by total
/// intensity then label order. Returns the label and its peak intensity.
pub fn dominant_mood<'a>(members: &[(&'a str, &'a str, f32)]) -> Option<(&'a str, f32)> {
    let mut tally: BTreeMap<&str, (usize, f32, f32)> = BTreeMap::new();
    for (_, label, intensity) in members {
        if *intensity < DOMINANCE_FLOOR {
            continue;
        }
        let entry = tally.entry(label).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += intensity;
        entry.2 = entry.2.max(*intensity);
    }

    tally
        .into_iter()
        .max_by(|(_, (count_a, total_a, _)), (_, (count_b, total_b, _))| {
            count_a
                .cmp(count_b)
                .then(total_a.total_cmp(total_b))
        })
        .map(|(label, (_, _, peak))| (label, peak))
}

/// Intensity an NPC adopts when catching a mood.
pub fn caught_intensity(source_intensity: f32) -> f32 {
    (source_intensity * CATCH_DAMPING).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurality_wins() {
        let members = [
            ("a", "gloomy", 60.0),
            ("b", "gloomy", 55.0),
            ("c", "cheerful", 80.0),
        ];
        let (label, peak) = dominant_mood(&members).expect("dominant mood");
        assert_eq!(label, "gloomy");
        assert!((peak - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn low_intensity_moods_do_not_dominate() {
        let members = [("a", "settled", 20.0), ("b", "settled", 30.0)];
        assert_eq!(dominant_mood(&members), None);
    }

    #[test]
    fn total_intensity_breaks_count_ties() {
        let members = [
            ("a", "giddy", 90.0),
            ("b", "gloomy", 50.0),
        ];
        let (label, _) = dominant_mood(&members).expect("dominant mood");
        assert_eq!(label, "giddy");
    }

    #[test]
    fn caught_intensity_is_dampened() {
        assert!((caught_intensity(80.0) - 56.0).abs() < 1e-3);
        assert!(caught_intensity(90.0) < 90.0);
        assert_eq!(caught_intensity(0.0), 0.0);
    }
}
