// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notion workout-log CSV import.
//!
//! Parses the exported tabular log into [`WorkoutSession`] records.
//! The column contract is positional, not header-based:
//! `Machine, Date, HeartRate, IsCurrentYear, Miles, MultiSelect,
//! Reps, Sets, Time, Volume, Weight, Year`.
//!
//! Sessions are merged by the composite key `{exercise_id}--{date}`
//! and per-set ids are derived from the key plus a running index, so
//! re-importing the same file produces byte-identical documents and
//! the Firestore upsert stays idempotent.

use crate::models::{exercise_slug, session_key, WorkoutSession, WorkoutSet};
use std::collections::BTreeMap;

/// Positional column indexes in the exported CSV.
const COL_MACHINE: usize = 0;
const COL_DATE: usize = 1;
const COL_REPS: usize = 6;
const COL_SETS: usize = 7;
const COL_TIME: usize = 8;
const COL_WEIGHT: usize = 10;

/// Source tag written on imported sessions.
pub const IMPORT_SOURCE: &str = "notion-import";

/// Static slug → muscle group table for the known exercise library.
/// Unknown slugs import with an empty muscle group; the runtime
/// classifier still picks most of them up by name.
const SLUG_MUSCLE_GROUPS: &[(&str, &str)] = &[
    ("ab-crunch-hammer", "Abs"),
    ("ab-crunch-machine", "Abs"),
    ("vertical-leg-raises", "Abs"),
    ("cable-bicep-curl", "Biceps"),
    ("ez-bar-curl", "Biceps"),
    ("lat-pulldown", "Biceps"),
    ("machine-bicep-curl", "Biceps"),
    ("push-ups", "Biceps"),
    ("cable-face-pull", "Triceps"),
    ("cable-overhead-triceps-extension", "Triceps"),
    ("assisted-dips", "Triceps"),
    ("dips", "Triceps"),
    ("triceps-pushdown-machine", "Triceps"),
    ("triceps-pull-down", "Triceps"),
    ("cable-lateral-raise", "Shoulders"),
    ("dumbbell-front-raises", "Shoulders"),
    ("dumbbell-lateral-raise", "Shoulders"),
    ("dumbbell-shoulder-press", "Shoulders"),
    ("machine-shoulder-pulldown", "Shoulders"),
    ("upright-row", "Shoulders"),
    ("bench-press-machine", "Chest"),
    ("chest-press", "Chest"),
    ("dumbbell-bench-press", "Chest"),
    ("incline-bench-press", "Chest"),
    ("incline-press-machine", "Chest"),
    ("machine-fly", "Chest"),
    ("cable-row", "Back"),
    ("dead-hang", "Back"),
    ("seated-back-extension", "Back"),
    ("seated-row", "Back"),
    ("wall-sit", "Back"),
    ("calf-extension", "Legs"),
    ("calf-raise", "Legs"),
    ("hamstring-curls", "Legs"),
    ("leg-extension", "Legs"),
    ("leg-press", "Legs"),
    ("leg-press-machine", "Legs"),
    ("outer-thigh", "Legs"),
    ("squat", "Legs"),
    ("step-ups", "Legs"),
    ("bridge", "Glutes"),
    ("deadlift", "Glutes"),
    ("glute-machine", "Glutes"),
    ("hip-abductor", "Glutes"),
    ("hip-thrust", "Glutes"),
    ("single-leg-glute-bridge", "Glutes"),
    ("smith-machine-squat", "Glutes"),
    ("stair-climber", "Glutes"),
    ("sumo-squat", "Glutes"),
    ("walking-lunges", "Glutes"),
    ("elliptical-machine", "Cardio"),
    ("fitness-bike", "Cardio"),
    ("walking", "Cardio"),
    ("walking-treadmill", "Cardio"),
    ("hydro-massage-bed", "Recovery"),
];

fn muscle_group_for_slug(slug: &str) -> &'static str {
    SLUG_MUSCLE_GROUPS
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, g)| *g)
        .unwrap_or("")
}

/// Split one CSV line, tolerating quoted fields containing commas.
///
/// Minimal state machine: a `"` toggles the in-quotes flag; commas
/// split only outside quotes. Fields are trimmed.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(cur.trim().to_string());
                cur.clear();
            }
            _ => cur.push(ch),
        }
    }
    fields.push(cur.trim().to_string());
    fields
}

/// Parse `"M/D/YYYY[ time]"` into zero-padded `"YYYY-MM-DD"`.
/// Returns `None` for anything that isn't a real calendar date.
fn parse_source_date(raw: &str) -> Option<String> {
    let date_part = raw.split(' ').next()?;
    let parts: Vec<&str> = date_part.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let month: u32 = parts[0].parse().ok()?;
    let day: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    // Reject impossible dates like 13/40/2025
    chrono::NaiveDate::from_ymd_opt(year, month, day)?;

    Some(format!("{:04}-{:02}-{:02}", year, month, day))
}

/// Parse a numeric field, stripping thousands separators.
/// Parse failure is 0, never an error.
fn parse_number(raw: &str) -> f64 {
    raw.replace(',', "").parse().unwrap_or(0.0)
}

fn field<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Parse the raw CSV text into merged workout sessions.
///
/// Rows with a missing exercise name or unparseable date are skipped.
/// A row's "Sets" count expands into that many individual sets
/// sharing the row's reps/weight/time.
pub fn parse_csv(raw: &str) -> Vec<WorkoutSession> {
    let clean = raw.trim_start_matches('\u{feff}').replace('\r', "");
    let mut lines = clean.trim().lines();
    lines.next(); // header row

    let mut sessions: BTreeMap<String, WorkoutSession> = BTreeMap::new();
    let mut skipped = 0usize;

    for line in lines {
        let row = split_csv_line(line);

        let machine_name = field(&row, COL_MACHINE);
        let date_raw = field(&row, COL_DATE);
        if machine_name.is_empty() || date_raw.is_empty() {
            skipped += 1;
            continue;
        }

        let Some(date) = parse_source_date(date_raw) else {
            skipped += 1;
            continue;
        };

        let exercise_id = exercise_slug(machine_name);
        let key = session_key(&exercise_id, &date);

        let session = sessions.entry(key.clone()).or_insert_with(|| {
            let midnight = format!("{}T00:00:00Z", date);
            WorkoutSession {
                exercise_id: exercise_id.clone(),
                exercise_name: machine_name.to_string(),
                muscle_group: muscle_group_for_slug(&exercise_id).to_string(),
                routine_id: String::new(),
                routine_name: String::new(),
                date: date.clone(),
                sets: Vec::new(),
                total_volume: 0.0,
                created_at: midnight.clone(),
                updated_at: midnight,
                source: IMPORT_SOURCE.to_string(),
            }
        });

        let reps = parse_number(field(&row, COL_REPS)).max(0.0) as u32;
        let num_sets = parse_number(field(&row, COL_SETS)).max(1.0) as u32;
        let weight = parse_number(field(&row, COL_WEIGHT));
        let time = parse_number(field(&row, COL_TIME));

        // Expand grouped sets into individual set rows with
        // deterministic ids (required for idempotent re-imports)
        for _ in 0..num_sets {
            let id = format!("{}-{}", key, session.sets.len());
            session.sets.push(WorkoutSet {
                id,
                reps,
                weight,
                time,
            });
        }
        session.recompute_volume();
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped malformed CSV rows during import");
    }

    sessions.into_values().collect()
}
