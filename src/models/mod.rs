// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod metrics;
pub mod profile;
pub mod routine;
pub mod session;

pub use metrics::BodyMetricEntry;
pub use profile::Profile;
pub use routine::{ExerciseRef, Routine};
pub use session::{exercise_slug, session_key, WorkoutSession, WorkoutSet};
