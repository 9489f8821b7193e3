// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session aggregation: pure folds over a user's workout sessions.
//!
//! Everything here runs against an already-fetched in-memory
//! snapshot. Sessions with zero sets (an exercise page visited but
//! not completed) are excluded from all activity-based statistics,
//! and sessions with malformed dates are skipped, never an error.

use crate::models::{WorkoutSession, WorkoutSet};
use crate::time_utils::{format_day, month_key, parse_day};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routine label used for sessions logged outside any routine.
pub const FREE_WORKOUT_LABEL: &str = "Free Workout";

/// Week boundary convention. The dashboard volume series uses
/// Monday-start weeks; the calendar view uses Sunday-start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStart {
    Monday,
    Sunday,
}

impl WeekStart {
    /// First day of the week containing `date`.
    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        let weekday = match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        };
        date.week(weekday).first_day()
    }
}

/// Distinct workout days, sorted, for sessions with at least one set.
pub fn unique_dates(sessions: &[WorkoutSession]) -> BTreeSet<NaiveDate> {
    sessions
        .iter()
        .filter(|s| s.has_sets())
        .filter_map(|s| parse_day(&s.date))
        .collect()
}

/// One exercise entry inside a day/routine group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub exercise_id: String,
    pub exercise_name: String,
    pub muscle_group: String,
    pub set_count: usize,
    pub total_volume: f64,
}

/// Sessions of one routine on one day.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoutineGroup {
    pub exercises: Vec<ExerciseEntry>,
    pub total_volume: f64,
}

/// Group sessions by date, then by routine name within the date.
///
/// Keys are `"YYYY-MM-DD"` date strings; sessions without a routine
/// fall under [`FREE_WORKOUT_LABEL`].
pub fn group_by_date(
    sessions: &[WorkoutSession],
) -> BTreeMap<String, BTreeMap<String, RoutineGroup>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, RoutineGroup>> = BTreeMap::new();

    for session in sessions {
        if !session.has_sets() || parse_day(&session.date).is_none() {
            continue;
        }

        let routine = if session.routine_name.is_empty() {
            FREE_WORKOUT_LABEL.to_string()
        } else {
            session.routine_name.clone()
        };

        let group = grouped
            .entry(session.date.clone())
            .or_default()
            .entry(routine)
            .or_default();

        group.exercises.push(ExerciseEntry {
            exercise_id: session.exercise_id.clone(),
            exercise_name: session.exercise_name.clone(),
            muscle_group: session.muscle_group.clone(),
            set_count: session.sets.len(),
            total_volume: session.total_volume,
        });
        group.total_volume += session.total_volume;
    }

    grouped
}

/// Total volume per week, keyed by the week-start date string.
pub fn weekly_volume(sessions: &[WorkoutSession], week_start: WeekStart) -> BTreeMap<String, f64> {
    let mut volumes: BTreeMap<String, f64> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.has_sets()) {
        let Some(date) = parse_day(&session.date) else {
            continue;
        };
        let key = format_day(week_start.start_of(date));
        *volumes.entry(key).or_insert(0.0) += session.total_volume;
    }

    volumes
}

/// Total volume per month, keyed `"YYYY-MM"`.
pub fn monthly_volume(sessions: &[WorkoutSession]) -> BTreeMap<String, f64> {
    let mut volumes: BTreeMap<String, f64> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.has_sets()) {
        if parse_day(&session.date).is_none() {
            continue;
        }
        let Some(key) = month_key(&session.date) else {
            continue;
        };
        *volumes.entry(key).or_insert(0.0) += session.total_volume;
    }

    volumes
}

/// Personal record for one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PersonalRecord {
    /// Max single-set weight (pounds)
    Weight(f64),
    /// Max single-set duration (seconds); reported only when the
    /// exercise never recorded a nonzero weight
    Duration(f64),
}

/// Max single-set record across all of an exercise's sessions.
///
/// Weight-based PRs take priority; a duration PR is reported only
/// when no weight was ever recorded for the exercise.
pub fn personal_record(sessions: &[WorkoutSession], exercise_id: &str) -> Option<PersonalRecord> {
    let sets = sessions
        .iter()
        .filter(|s| s.exercise_id == exercise_id)
        .flat_map(|s| s.sets.iter());

    let (max_weight, max_time) = sets.fold((0.0f64, 0.0f64), |(w, t), set: &WorkoutSet| {
        (w.max(set.weight), t.max(set.time))
    });

    if max_weight > 0.0 {
        Some(PersonalRecord::Weight(max_weight))
    } else if max_time > 0.0 {
        Some(PersonalRecord::Duration(max_time))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(id: &str, reps: u32, weight: f64, time: f64) -> WorkoutSet {
        WorkoutSet {
            id: id.to_string(),
            reps,
            weight,
            time,
        }
    }

    fn session(
        exercise_id: &str,
        date: &str,
        routine: &str,
        sets: Vec<WorkoutSet>,
    ) -> WorkoutSession {
        let mut s = WorkoutSession {
            exercise_id: exercise_id.to_string(),
            exercise_name: exercise_id.to_string(),
            muscle_group: String::new(),
            routine_id: String::new(),
            routine_name: routine.to_string(),
            date: date.to_string(),
            sets,
            total_volume: 0.0,
            created_at: String::new(),
            updated_at: String::new(),
            source: "test".to_string(),
        };
        s.recompute_volume();
        s
    }

    #[test]
    fn test_unique_dates_skips_empty_and_malformed() {
        let sessions = vec![
            session("squat", "2025-05-09", "", vec![set("a", 10, 135.0, 0.0)]),
            session("bench", "2025-05-09", "", vec![set("b", 8, 155.0, 0.0)]),
            // Zero sets: page visited, never completed
            session("curl", "2025-05-10", "", vec![]),
            // Malformed date
            session("row", "garbage", "", vec![set("c", 8, 90.0, 0.0)]),
        ];

        let dates = unique_dates(&sessions);
        assert_eq!(dates.len(), 1);
        assert!(dates.contains(&NaiveDate::from_ymd_opt(2025, 5, 9).unwrap()));
    }

    #[test]
    fn test_group_by_date_free_workout_default() {
        let sessions = vec![
            session("squat", "2025-05-09", "Leg Day", vec![set("a", 10, 135.0, 0.0)]),
            session("curl", "2025-05-09", "", vec![set("b", 12, 30.0, 0.0)]),
        ];

        let grouped = group_by_date(&sessions);
        let day = grouped.get("2025-05-09").unwrap();
        assert_eq!(day.get("Leg Day").unwrap().total_volume, 1350.0);
        assert_eq!(day.get(FREE_WORKOUT_LABEL).unwrap().total_volume, 360.0);
    }

    #[test]
    fn test_weekly_volume_monday_vs_sunday() {
        // 2025-05-11 is a Sunday, 2025-05-12 a Monday
        let sessions = vec![
            session("squat", "2025-05-11", "", vec![set("a", 10, 100.0, 0.0)]),
            session("bench", "2025-05-12", "", vec![set("b", 10, 100.0, 0.0)]),
        ];

        let monday = weekly_volume(&sessions, WeekStart::Monday);
        // Sunday belongs to the week of Mon 05-05; Monday starts a new week
        assert_eq!(monday.get("2025-05-05"), Some(&1000.0));
        assert_eq!(monday.get("2025-05-12"), Some(&1000.0));

        let sunday = weekly_volume(&sessions, WeekStart::Sunday);
        // Both fall in the week starting Sun 05-11
        assert_eq!(sunday.get("2025-05-11"), Some(&2000.0));
    }

    #[test]
    fn test_monthly_volume() {
        let sessions = vec![
            session("squat", "2025-04-30", "", vec![set("a", 10, 100.0, 0.0)]),
            session("squat", "2025-05-01", "", vec![set("b", 10, 100.0, 0.0)]),
            session("bench", "2025-05-20", "", vec![set("c", 5, 200.0, 0.0)]),
        ];

        let monthly = monthly_volume(&sessions);
        assert_eq!(monthly.get("2025-04"), Some(&1000.0));
        assert_eq!(monthly.get("2025-05"), Some(&2000.0));
    }

    #[test]
    fn test_personal_record_weight_priority() {
        let sessions = vec![
            session(
                "bench",
                "2025-05-09",
                "",
                vec![set("a", 8, 155.0, 0.0), set("b", 5, 185.0, 0.0)],
            ),
            session("bench", "2025-05-16", "", vec![set("c", 8, 165.0, 0.0)]),
        ];

        assert_eq!(
            personal_record(&sessions, "bench"),
            Some(PersonalRecord::Weight(185.0))
        );
        assert_eq!(personal_record(&sessions, "squat"), None);
    }

    #[test]
    fn test_personal_record_duration_fallback() {
        // Plank never records weight, only time
        let sessions = vec![session(
            "plank",
            "2025-05-09",
            "",
            vec![set("a", 1, 0.0, 60.0), set("b", 1, 0.0, 90.0)],
        )];

        assert_eq!(
            personal_record(&sessions, "plank"),
            Some(PersonalRecord::Duration(90.0))
        );
    }
}
