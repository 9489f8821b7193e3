// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly set-target tracking per muscle group.
//!
//! Every read re-derives a full classification pass over the window's
//! sessions, so the report is idempotent and can be computed for
//! arbitrary historical weeks (the frontend renders a 4-week trend).

use crate::models::WorkoutSession;
use crate::services::classify::{classify_ppl, PplGroup, SubMuscle};
use crate::time_utils::parse_day;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Per-sub-muscle weekly set targets.
///
/// Every leaf target must be ≥1: a zero target would divide by zero
/// in the percent calculation.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    targets: BTreeMap<SubMuscle, u32>,
}

/// Invalid target configuration.
#[derive(Debug, thiserror::Error)]
pub enum TargetConfigError {
    #[error("Target for {0} must be at least 1")]
    ZeroTarget(&'static str),

    #[error("Missing target for {0}")]
    MissingTarget(&'static str),
}

impl TargetConfig {
    /// Build a config, rejecting missing or zero leaf targets.
    pub fn new(targets: BTreeMap<SubMuscle, u32>) -> Result<Self, TargetConfigError> {
        for sub in SubMuscle::ALL {
            match targets.get(&sub) {
                None => return Err(TargetConfigError::MissingTarget(sub.label())),
                Some(0) => return Err(TargetConfigError::ZeroTarget(sub.label())),
                Some(_) => {}
            }
        }
        Ok(Self { targets })
    }

    pub fn target(&self, sub: SubMuscle) -> u32 {
        self.targets[&sub]
    }

    pub fn group_target(&self, group: PplGroup) -> u32 {
        SubMuscle::ALL
            .iter()
            .filter(|s| s.group() == group)
            .map(|s| self.targets[s])
            .sum()
    }

    pub fn grand_total(&self) -> u32 {
        self.targets.values().sum()
    }
}

impl Default for TargetConfig {
    /// Reference configuration: Push=27, Pull=15, Legs=21 (total 63).
    fn default() -> Self {
        let targets = BTreeMap::from([
            (SubMuscle::Chest, 7),
            (SubMuscle::Shoulders, 12),
            (SubMuscle::Triceps, 8),
            (SubMuscle::Back, 10),
            (SubMuscle::Biceps, 5),
            (SubMuscle::Quads, 8),
            (SubMuscle::Hamstrings, 6),
            (SubMuscle::Glutes, 7),
        ]);
        Self::new(targets).expect("reference targets are valid")
    }
}

/// Actual vs target for one sub-muscle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubMuscleProgress {
    pub sub_muscle: SubMuscle,
    pub group: PplGroup,
    pub target: u32,
    pub actual: u32,
    /// Sets still to go this week, floored at 0
    pub remainder: u32,
}

/// Actual vs target for one top-level group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GroupProgress {
    pub group: PplGroup,
    pub target: u32,
    pub actual: u32,
    /// Completion ratio, clamped to 1.0
    pub percent: f64,
}

/// Full weekly set-target report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyTargetReport {
    pub week_start: String,
    pub week_end: String,
    pub sub_muscles: Vec<SubMuscleProgress>,
    pub groups: Vec<GroupProgress>,
    /// Total sets across all sub-muscles over the grand total target
    pub overall_percent: f64,
}

/// Compute the weekly report for sessions in `[week_start, week_end]`
/// inclusive.
///
/// Sessions the PPL classifier cannot place contribute to no
/// sub-muscle (classification miss is not an error).
pub fn weekly_report(
    sessions: &[WorkoutSession],
    week_start: NaiveDate,
    week_end: NaiveDate,
    config: &TargetConfig,
) -> WeeklyTargetReport {
    let mut set_counts: BTreeMap<SubMuscle, u32> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.has_sets()) {
        let Some(date) = parse_day(&session.date) else {
            continue;
        };
        if date < week_start || date > week_end {
            continue;
        }
        let Some(sub) = classify_ppl(&session.muscle_group, &session.exercise_name) else {
            continue;
        };
        *set_counts.entry(sub).or_insert(0) += session.sets.len() as u32;
    }

    let sub_muscles: Vec<SubMuscleProgress> = SubMuscle::ALL
        .iter()
        .map(|&sub| {
            let target = config.target(sub);
            let actual = set_counts.get(&sub).copied().unwrap_or(0);
            SubMuscleProgress {
                sub_muscle: sub,
                group: sub.group(),
                target,
                actual,
                remainder: target.saturating_sub(actual),
            }
        })
        .collect();

    let groups: Vec<GroupProgress> = [PplGroup::Push, PplGroup::Pull, PplGroup::Legs]
        .iter()
        .map(|&group| {
            let target = config.group_target(group);
            let actual = sub_muscles
                .iter()
                .filter(|p| p.group == group)
                .map(|p| p.actual)
                .sum::<u32>();
            GroupProgress {
                group,
                target,
                actual,
                percent: (f64::from(actual) / f64::from(target)).min(1.0),
            }
        })
        .collect();

    let total_actual: u32 = sub_muscles.iter().map(|p| p.actual).sum();
    let overall_percent =
        (f64::from(total_actual) / f64::from(config.grand_total())).min(1.0);

    WeeklyTargetReport {
        week_start: crate::time_utils::format_day(week_start),
        week_end: crate::time_utils::format_day(week_end),
        sub_muscles,
        groups,
        overall_percent,
    }
}
