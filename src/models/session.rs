// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session and set models for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One performed set within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutSet {
    /// Per-session-unique set ID
    pub id: String,
    /// Repetitions performed
    #[serde(default)]
    pub reps: u32,
    /// Weight in pounds. For time-based exercises this holds minutes.
    #[serde(default)]
    pub weight: f64,
    /// Duration in seconds (optional, 0 when unused)
    #[serde(default)]
    pub time: f64,
}

impl WorkoutSet {
    /// Volume contribution of this set (reps × weight).
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }
}

/// Stored workout session: one exercise on one calendar date.
///
/// Document ID is the composite key `{exercise_id}--{date}`, which
/// makes repeated writes and re-imports idempotent upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutSession {
    /// Exercise slug (e.g. "seated-cable-row")
    pub exercise_id: String,
    /// Display name of the exercise
    pub exercise_name: String,
    /// Canonical muscle group label, or empty when unknown
    #[serde(default)]
    pub muscle_group: String,
    /// Routine this session was logged under ("" for free workouts)
    #[serde(default)]
    pub routine_id: String,
    #[serde(default)]
    pub routine_name: String,
    /// Workout day, "YYYY-MM-DD"
    pub date: String,
    /// Ordered set list
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
    /// Σ reps×weight over sets. Maintained by the writer; readers
    /// never re-derive it. Any mutation of `sets` must call
    /// `recompute_volume`.
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Where this session came from ("app", "notion-import")
    #[serde(default)]
    pub source: String,
}

/// Build the composite document key for a session.
pub fn session_key(exercise_id: &str, date: &str) -> String {
    format!("{}--{}", exercise_id, date)
}

/// Lower-case slug for an exercise name ("EZ-Bar Curl" -> "ez-bar-curl").
pub fn exercise_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress leading dash
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

impl WorkoutSession {
    /// Composite document key for this session.
    pub fn key(&self) -> String {
        session_key(&self.exercise_id, &self.date)
    }

    /// Whether the session counts for activity-based statistics.
    ///
    /// Sessions with zero sets are an exercise page visited but not
    /// completed, and are excluded everywhere.
    pub fn has_sets(&self) -> bool {
        !self.sets.is_empty()
    }

    /// Restore the `total_volume == Σ reps×weight` invariant.
    pub fn recompute_volume(&mut self) {
        self.total_volume = self.sets.iter().map(WorkoutSet::volume).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_set(id: &str, reps: u32, weight: f64) -> WorkoutSet {
        WorkoutSet {
            id: id.to_string(),
            reps,
            weight,
            time: 0.0,
        }
    }

    #[test]
    fn test_session_key_format() {
        assert_eq!(session_key("squat", "2025-05-09"), "squat--2025-05-09");
    }

    #[test]
    fn test_exercise_slug() {
        assert_eq!(exercise_slug("EZ-Bar Curl"), "ez-bar-curl");
        assert_eq!(exercise_slug("  Ab Crunch Machine "), "ab-crunch-machine");
        assert_eq!(exercise_slug("Push Ups!!"), "push-ups");
    }

    #[test]
    fn test_recompute_volume_after_mutation() {
        let mut session = WorkoutSession {
            exercise_id: "squat".to_string(),
            exercise_name: "Squat".to_string(),
            muscle_group: "Legs".to_string(),
            routine_id: String::new(),
            routine_name: String::new(),
            date: "2025-05-09".to_string(),
            sets: vec![make_set("a", 10, 135.0), make_set("b", 8, 145.0)],
            total_volume: 0.0,
            created_at: String::new(),
            updated_at: String::new(),
            source: "app".to_string(),
        };

        session.recompute_volume();
        assert_eq!(session.total_volume, 10.0 * 135.0 + 8.0 * 145.0);

        // Editing a set and recomputing keeps the invariant
        session.sets[0].reps = 12;
        session.recompute_volume();
        assert_eq!(session.total_volume, 12.0 * 135.0 + 8.0 * 145.0);

        session.sets.clear();
        session.recompute_volume();
        assert_eq!(session.total_volume, 0.0);
        assert!(!session.has_sets());
    }
}
