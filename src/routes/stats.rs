// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived statistics: dashboard summary, calendar log, per-exercise
//! PRs, body-part set distribution, and the weekly target report.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::aggregate::{
    self, PersonalRecord, RoutineGroup, WeekStart,
};
use crate::services::classify::{classify_body_part, BodyPart};
use crate::services::streak;
use crate::services::targets::{weekly_report, WeeklyTargetReport};
use crate::time_utils::{format_day, parse_day};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How many weekly reports the trend view gets (current week included).
const TREND_WEEKS: usize = 4;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stats/dashboard", get(get_dashboard))
        .route("/api/stats/calendar", get(get_calendar))
        .route("/api/stats/muscles", get(get_muscle_split))
        .route("/api/stats/pr/{exercise_id}", get(get_personal_record))
        .route("/api/stats/targets", get(get_targets))
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LastSessionSummary {
    pub date: String,
    pub exercise_names: Vec<String>,
    pub total_volume: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    /// Whole days since the most recent workout (None: no workouts yet)
    pub days_since_last: Option<i64>,
    /// Consecutive-day run ending at the most recent workout date
    pub streak: u32,
    pub total_workout_days: usize,
    pub last_session: Option<LastSessionSummary>,
    /// Volume per Monday-start week, keyed by week-start date
    pub weekly_volume: BTreeMap<String, f64>,
    /// Volume per month, keyed "YYYY-MM"
    pub monthly_volume: BTreeMap<String, f64>,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let sessions = state.db.get_sessions(&user.uid).await?;
    let today = Utc::now().date_naive();

    let dates = aggregate::unique_dates(&sessions);
    let days_since_last = streak::days_since_last(&dates, today);
    let current_streak = streak::streak(&dates, today);

    let last_session = dates.iter().next_back().map(|last| {
        let key = format_day(*last);
        let on_last_day: Vec<_> = sessions
            .iter()
            .filter(|s| s.date == key && s.has_sets())
            .collect();
        LastSessionSummary {
            date: key,
            exercise_names: on_last_day.iter().map(|s| s.exercise_name.clone()).collect(),
            total_volume: on_last_day.iter().map(|s| s.total_volume).sum(),
        }
    });

    Ok(Json(DashboardResponse {
        days_since_last,
        streak: current_streak,
        total_workout_days: dates.len(),
        last_session,
        weekly_volume: aggregate::weekly_volume(&sessions, WeekStart::Monday),
        monthly_volume: aggregate::monthly_volume(&sessions),
    }))
}

// ─── Calendar Log ────────────────────────────────────────────

#[derive(Deserialize)]
struct CalendarQuery {
    /// Restrict to one month, "YYYY-MM"
    month: Option<String>,
}

/// Sessions grouped by date, then routine within each date.
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<BTreeMap<String, BTreeMap<String, RoutineGroup>>>> {
    if let Some(month) = &params.month {
        let valid = month.len() == 7 && parse_day(&format!("{}-01", month)).is_some();
        if !valid {
            return Err(crate::error::AppError::BadRequest(
                "Invalid 'month': must be YYYY-MM".to_string(),
            ));
        }
    }

    let sessions = state.db.get_sessions(&user.uid).await?;
    let mut grouped = aggregate::group_by_date(&sessions);

    if let Some(month) = &params.month {
        let prefix = format!("{}-", month);
        grouped.retain(|date, _| date.starts_with(&prefix));
    }

    Ok(Json(grouped))
}

// ─── Body-Part Split ─────────────────────────────────────────

#[derive(Deserialize)]
struct RangeQuery {
    /// "YYYY-MM-DD", inclusive
    from: Option<String>,
    /// "YYYY-MM-DD", inclusive
    to: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MuscleSplitResponse {
    /// Set counts per body part, keyed by display label
    pub set_counts: BTreeMap<String, u32>,
    /// Sets the classifier could not place
    pub unclassified: u32,
}

/// Set distribution across body parts, optionally windowed by date.
async fn get_muscle_split(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<MuscleSplitResponse>> {
    let parse_bound = |raw: &Option<String>, name: &str| -> Result<Option<chrono::NaiveDate>> {
        match raw {
            None => Ok(None),
            Some(s) => parse_day(s).map(Some).ok_or_else(|| {
                crate::error::AppError::BadRequest(format!(
                    "Invalid '{}': must be YYYY-MM-DD",
                    name
                ))
            }),
        }
    };
    let from = parse_bound(&params.from, "from")?;
    let to = parse_bound(&params.to, "to")?;

    let sessions = state.db.get_sessions(&user.uid).await?;

    let mut set_counts: BTreeMap<BodyPart, u32> = BTreeMap::new();
    let mut unclassified = 0u32;

    for session in sessions.iter().filter(|s| s.has_sets()) {
        let Some(date) = parse_day(&session.date) else {
            continue;
        };
        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }
        let sets = session.sets.len() as u32;
        match classify_body_part(&session.muscle_group, &session.exercise_name) {
            Some(part) => *set_counts.entry(part).or_insert(0) += sets,
            None => unclassified += sets,
        }
    }

    Ok(Json(MuscleSplitResponse {
        set_counts: set_counts
            .into_iter()
            .map(|(part, n)| (part.label().to_string(), n))
            .collect(),
        unclassified,
    }))
}

// ─── Personal Records ────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PersonalRecordResponse {
    pub exercise_id: String,
    pub record: Option<PersonalRecord>,
}

async fn get_personal_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
) -> Result<Json<PersonalRecordResponse>> {
    let sessions = state
        .db
        .get_sessions_for_exercise(&user.uid, &exercise_id)
        .await?;
    let record = aggregate::personal_record(&sessions, &exercise_id);
    Ok(Json(PersonalRecordResponse {
        exercise_id,
        record,
    }))
}

// ─── Weekly Targets ──────────────────────────────────────────

#[derive(Deserialize)]
struct TargetsQuery {
    /// Any date inside the week to report on; defaults to today
    week: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TargetsResponse {
    pub current: WeeklyTargetReport,
    /// Older weeks first, current week last
    pub trend: Vec<WeeklyTargetReport>,
}

/// Weekly set-target report (Monday-start weeks) plus the trailing
/// 4-week trend.
async fn get_targets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TargetsQuery>,
) -> Result<Json<TargetsResponse>> {
    let anchor = match &params.week {
        Some(raw) => parse_day(raw).ok_or_else(|| {
            crate::error::AppError::BadRequest("Invalid 'week': must be YYYY-MM-DD".to_string())
        })?,
        None => Utc::now().date_naive(),
    };

    let sessions = state.db.get_sessions(&user.uid).await?;
    let week_start = WeekStart::Monday.start_of(anchor);

    let mut trend = Vec::with_capacity(TREND_WEEKS);
    for weeks_back in (0..TREND_WEEKS).rev() {
        let start = week_start - Duration::weeks(weeks_back as i64);
        let end = start + Duration::days(6);
        trend.push(weekly_report(&sessions, start, end, &state.targets));
    }

    let current = weekly_report(
        &sessions,
        week_start,
        week_start + Duration::days(6),
        &state.targets,
    );

    Ok(Json(TargetsResponse { current, trend }))
}
