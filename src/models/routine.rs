// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine model: a named ordered collection of exercise references.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Reference to an exercise inside a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseRef {
    /// Exercise slug
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
}

/// Stored routine document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub name: String,
    /// Ordered exercise list. Mutated as whole-value set operations;
    /// duplicates by `id` are not allowed.
    #[serde(default)]
    pub exercises: Vec<ExerciseRef>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Routine {
    /// Append an exercise, deduplicating by `id` (array-union semantics).
    ///
    /// Returns `true` if the exercise was added.
    pub fn add_exercise(&mut self, exercise: ExerciseRef) -> bool {
        if self.exercises.iter().any(|e| e.id == exercise.id) {
            return false;
        }
        self.exercises.push(exercise);
        true
    }

    /// Remove an exercise by `id` (array-remove semantics).
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != exercise_id);
        self.exercises.len() != before
    }
}
