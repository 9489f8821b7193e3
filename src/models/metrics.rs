// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body-composition metric entries.
//!
//! Entries are append-only: one is written per logging action and
//! never mutated afterward. Trend deltas are derived at read time
//! from the two most recent entries.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One body-composition log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BodyMetricEntry {
    /// Log day, "YYYY-MM-DD"
    pub date: String,
    /// Body weight in pounds
    pub weight: f64,
    #[serde(default)]
    pub body_fat_pct: f64,
    #[serde(default)]
    pub muscle_mass: f64,
    #[serde(default)]
    pub visceral_fat: f64,
    #[serde(default)]
    pub body_water_pct: f64,
    #[serde(default)]
    pub skeletal_muscle_pct: f64,
    #[serde(default)]
    pub subcutaneous_fat_pct: f64,
    #[serde(default)]
    pub bone_mass: f64,
    #[serde(default)]
    pub fat_free_weight: f64,
    #[serde(default)]
    pub bmr: f64,
    #[serde(default)]
    pub protein_pct: f64,
    #[serde(default)]
    pub metabolic_age: f64,
    /// Derived from weight and height at write time
    #[serde(default)]
    pub bmi: f64,
    /// Height in inches, carried forward from the profile once set
    #[serde(default)]
    pub height_inches: f64,
    /// Optional progress photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Write timestamp (ISO 8601); breaks same-day ordering ties
    #[serde(default)]
    pub created_at: String,
}

impl BodyMetricEntry {
    /// BMI from weight in pounds and height in inches.
    /// Returns 0.0 when height is unknown.
    pub fn derive_bmi(weight_lbs: f64, height_inches: f64) -> f64 {
        if height_inches <= 0.0 {
            return 0.0;
        }
        703.0 * weight_lbs / (height_inches * height_inches)
    }
}

/// Field deltas between the two most recent entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrendDeltas {
    pub weight: f64,
    pub body_fat_pct: f64,
    pub muscle_mass: f64,
    pub bmi: f64,
}

/// Deltas between the two most recent entries.
///
/// Entries are ordered by `(date, created_at)` so multiple entries on
/// the same day tie-break to the latest write.
pub fn trend_deltas(entries: &[BodyMetricEntry]) -> Option<TrendDeltas> {
    let mut sorted: Vec<&BodyMetricEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| (&a.date, &a.created_at).cmp(&(&b.date, &b.created_at)));

    match sorted.as_slice() {
        [.., prev, latest] => Some(TrendDeltas {
            weight: latest.weight - prev.weight,
            body_fat_pct: latest.body_fat_pct - prev.body_fat_pct,
            muscle_mass: latest.muscle_mass - prev.muscle_mass,
            bmi: latest.bmi - prev.bmi,
        }),
        _ => None,
    }
}
