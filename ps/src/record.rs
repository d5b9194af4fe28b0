//! The per-user preference record

use serde::{Deserialize, Serialize};

/// What we remember about a traveler between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    /// Last-seen trip style description
    #[serde(default)]
    pub preferences: String,

    /// Last-seen interests
    #[serde(default)]
    pub hobbies: String,

    /// Most recent destinations, oldest first
    #[serde(default)]
    pub past_destinations: Vec<String>,

    /// Last write time (unix ms), stamped by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl PreferenceRecord {
    pub fn new(preferences: impl Into<String>, hobbies: impl Into<String>) -> Self {
        Self {
            preferences: preferences.into(),
            hobbies: hobbies.into(),
            ..Default::default()
        }
    }

    pub fn with_destinations<I, S>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.past_destinations = destinations.into_iter().map(Into::into).collect();
        self
    }

    /// Append a destination unless it is already present, then keep only the
    /// `limit` most recent entries.
    pub fn remember_destination(&mut self, destination: &str, limit: usize) {
        let destination = destination.trim();
        if !destination.is_empty() && !self.past_destinations.iter().any(|d| d == destination) {
            self.past_destinations.push(destination.to_string());
        }
        self.normalize(limit);
    }

    /// Drop duplicates (first occurrence wins) and evict the oldest entries
    /// beyond `limit`.
    pub fn normalize(&mut self, limit: usize) {
        let mut seen: Vec<String> = Vec::with_capacity(self.past_destinations.len());
        for destination in self.past_destinations.drain(..) {
            if !destination.is_empty() && !seen.contains(&destination) {
                seen.push(destination);
            }
        }
        let overflow = seen.len().saturating_sub(limit);
        self.past_destinations = seen.split_off(overflow);
    }

    /// Render the record as the free-text summary fed into prompts
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if !self.preferences.is_empty() {
            lines.push(format!("Previous travel preferences: {}", self.preferences));
        }
        if !self.hobbies.is_empty() {
            lines.push(format!("Previous interests: {}", self.hobbies));
        }
        if !self.past_destinations.is_empty() {
            lines.push(format!("Past destinations: {}", self.past_destinations.join(", ")));
        }
        if lines.is_empty() {
            return "No saved preferences.".to_string();
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_remember_appends_new_destination() {
        let mut record = PreferenceRecord::new("budget", "hiking").with_destinations(["Lisbon"]);
        record.remember_destination("Kyoto", 5);
        assert_eq!(record.past_destinations, vec!["Lisbon", "Kyoto"]);
    }

    #[test]
    fn test_remember_keeps_existing_position() {
        let mut record = PreferenceRecord::default().with_destinations(["Lisbon", "Kyoto"]);
        record.remember_destination("Lisbon", 5);
        assert_eq!(record.past_destinations, vec!["Lisbon", "Kyoto"]);
    }

    #[test]
    fn test_sixth_destination_evicts_oldest() {
        let mut record = PreferenceRecord::default().with_destinations(["A", "B", "C", "D", "E"]);
        record.remember_destination("F", 5);
        assert_eq!(record.past_destinations, vec!["B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_normalize_dedupes_in_order() {
        let mut record = PreferenceRecord::default().with_destinations(["Rome", "Oslo", "Rome", "Cairo", "Oslo"]);
        record.normalize(5);
        assert_eq!(record.past_destinations, vec!["Rome", "Oslo", "Cairo"]);
    }

    #[test]
    fn test_summary_empty_record() {
        assert_eq!(PreferenceRecord::default().summary(), "No saved preferences.");
    }

    #[test]
    fn test_summary_lists_everything() {
        let record = PreferenceRecord::new("luxury", "food").with_destinations(["Paris", "Tokyo"]);
        let summary = record.summary();
        assert!(summary.contains("luxury"));
        assert!(summary.contains("food"));
        assert!(summary.contains("Paris, Tokyo"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_bounded_and_unique(
            destinations in proptest::collection::vec("[a-e]", 0..20),
            limit in 1usize..8,
        ) {
            let mut record = PreferenceRecord::default().with_destinations(destinations.clone());
            record.normalize(limit);

            prop_assert!(record.past_destinations.len() <= limit);
            for (i, d) in record.past_destinations.iter().enumerate() {
                prop_assert!(!record.past_destinations[i + 1..].contains(d));
            }

            // Survivors appear in the same relative order as their first occurrence
            let firsts: Vec<&String> = destinations
                .iter()
                .enumerate()
                .filter(|(i, d)| !destinations[..*i].contains(*d))
                .map(|(_, d)| d)
                .collect();
            let tail = &firsts[firsts.len().saturating_sub(limit)..];
            prop_assert_eq!(record.past_destinations.iter().collect::<Vec<_>>(), tail.to_vec());
        }
    }
}
