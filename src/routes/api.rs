// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profile, sessions, routines,
//! body metrics, and the exercise cascade delete.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{
    exercise_slug, BodyMetricEntry, ExerciseRef, Profile, Routine, WorkoutSession, WorkoutSet,
};
use crate::time_utils::{format_utc_rfc3339, parse_day};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_PER_PAGE: u32 = 200;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/sessions", get(get_sessions).put(put_session))
        .route("/api/sessions/flush", post(flush_sessions))
        .route("/api/sessions/{session_key}", delete(delete_session))
        .route("/api/exercises/{exercise_id}", delete(delete_exercise))
        .route("/api/routines", get(get_routines).post(create_routine))
        .route(
            "/api/routines/{routine_id}",
            put(rename_routine).delete(delete_routine),
        )
        .route("/api/routines/{routine_id}/exercises", post(add_routine_exercise))
        .route(
            "/api/routines/{routine_id}/exercises/{exercise_id}",
            delete(remove_routine_exercise),
        )
        .route("/api/metrics", get(get_metrics).post(add_metric))
}

// ─── Profile ─────────────────────────────────────────────────

/// Profile update request.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Height in inches
    #[validate(range(min = 0.0, max = 120.0))]
    pub height_inches: Option<f64>,
    #[validate(length(max = 8))]
    pub weight_unit: Option<String>,
    pub gym_qr_url: Option<String>,
}

/// Get current user profile (defaults for first-time users).
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Profile>> {
    let profile = state.db.get_profile(&user.uid).await?.unwrap_or_default();
    Ok(Json(profile))
}

/// Update profile fields (fetch-modify-write to preserve the rest).
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<Profile>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::BadRequest(e.to_string()))?;

    let mut profile = state.db.get_profile(&user.uid).await?.unwrap_or_default();

    if let Some(name) = request.display_name {
        profile.display_name = name;
    }
    if let Some(url) = request.photo_url {
        profile.photo_url = Some(url);
    }
    if let Some(height) = request.height_inches {
        profile.height_inches = height;
    }
    if let Some(unit) = request.weight_unit {
        profile.weight_unit = unit;
    }
    if let Some(qr) = request.gym_qr_url {
        profile.gym_qr_url = Some(qr);
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    if profile.created_at.is_empty() {
        profile.created_at = now.clone();
    }
    profile.updated_at = now;

    state.db.set_profile(&user.uid, &profile).await?;
    Ok(Json(profile))
}

// ─── Sessions ────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionsQuery {
    /// Filter by exercise slug (per-exercise history view)
    exercise: Option<String>,
    /// Cursor for forward pagination (opaque token)
    cursor: Option<String>,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

/// Cursor over the (date, exerciseId) sort key.
fn parse_cursor(cursor: Option<&str>) -> Result<Option<(String, String)>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || crate::error::AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let (date, exercise_id) = decoded_str.split_once(':').ok_or_else(invalid_cursor)?;
            if parse_day(date).is_none() {
                return Err(invalid_cursor());
            }
            Ok((date.to_string(), exercise_id.to_string()))
        })
        .transpose()
}

fn encode_cursor(date: &str, exercise_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}:{}", date, exercise_id))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionsResponse {
    pub sessions: Vec<WorkoutSession>,
    pub next_cursor: Option<String>,
}

/// List sessions, newest first, with optional per-exercise filter.
async fn get_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SessionsQuery>,
) -> Result<Json<SessionsResponse>> {
    if let Some(exercise) = &params.exercise {
        if exercise.len() > 100 {
            return Err(crate::error::AppError::BadRequest(
                "Exercise filter too long".to_string(),
            ));
        }
    }
    let limit = params.per_page.min(MAX_PER_PAGE).max(1) as usize;
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let mut sessions = match &params.exercise {
        Some(exercise_id) => {
            state
                .db
                .get_sessions_for_exercise(&user.uid, exercise_id)
                .await?
        }
        None => state.db.get_sessions(&user.uid).await?,
    };

    // Client-side sort: newest date first, exercise id as tie-break
    sessions.sort_by(|a, b| {
        (&b.date, &b.exercise_id).cmp(&(&a.date, &a.exercise_id))
    });

    if let Some((date, exercise_id)) = cursor {
        sessions.retain(|s| {
            (s.date.as_str(), s.exercise_id.as_str()) < (date.as_str(), exercise_id.as_str())
        });
    }

    let next_cursor = if sessions.len() > limit {
        sessions.truncate(limit);
        sessions
            .last()
            .map(|s| encode_cursor(&s.date, &s.exercise_id))
    } else {
        None
    };

    Ok(Json(SessionsResponse {
        sessions,
        next_cursor,
    }))
}

/// One set in an upsert request.
#[derive(Deserialize)]
pub struct SetInput {
    pub id: String,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub time: f64,
}

/// Session upsert request (set edits from the workout page).
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpsertRequest {
    #[validate(length(min = 1, max = 100))]
    pub exercise_name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default)]
    pub routine_id: String,
    #[serde(default)]
    pub routine_name: String,
    /// "YYYY-MM-DD"
    pub date: String,
    pub sets: Vec<SetInput>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUpsertResponse {
    pub key: String,
    pub total_volume: f64,
    /// Write is debounced; `/api/sessions/flush` forces it through
    pub pending: bool,
}

/// Upsert a session's set list.
///
/// The write is debounced (~900ms quiet period) so rapid consecutive
/// edits collapse into one Firestore write. Callers must hit
/// `/api/sessions/flush` before navigating away.
async fn put_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SessionUpsertRequest>,
) -> Result<Json<SessionUpsertResponse>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::BadRequest(e.to_string()))?;

    if parse_day(&request.date).is_none() {
        return Err(crate::error::AppError::BadRequest(
            "Invalid 'date': must be YYYY-MM-DD".to_string(),
        ));
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    let mut session = WorkoutSession {
        exercise_id: exercise_slug(&request.exercise_name),
        exercise_name: request.exercise_name,
        muscle_group: request.muscle_group,
        routine_id: request.routine_id,
        routine_name: request.routine_name,
        date: request.date,
        sets: request
            .sets
            .into_iter()
            .map(|s| WorkoutSet {
                id: s.id,
                reps: s.reps,
                weight: s.weight,
                time: s.time,
            })
            .collect(),
        total_volume: 0.0,
        created_at: now.clone(),
        updated_at: now,
        source: "app".to_string(),
    };
    session.recompute_volume();

    let response = SessionUpsertResponse {
        key: session.key(),
        total_volume: session.total_volume,
        pending: true,
    };

    state.saver.enqueue(&user.uid, session).await;
    Ok(Json(response))
}

/// Remove one session document (clearing a logged day).
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_key): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if session_key.is_empty() || session_key.len() > 200 {
        return Err(crate::error::AppError::BadRequest(
            "Invalid session key".to_string(),
        ));
    }
    state.db.delete_session(&user.uid, &session_key).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FlushResponse {
    pub flushed: u32,
}

/// Force all pending debounced writes through (called before
/// navigation so the last edit is never dropped).
async fn flush_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FlushResponse>> {
    let flushed = state.saver.flush_user(&user.uid).await?;
    Ok(Json(FlushResponse { flushed }))
}

// ─── Exercise Cascade Delete ─────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteExerciseResponse {
    pub deleted_sessions: u32,
}

/// Remove an exercise from the library: cascade-deletes every session
/// with that exercise ID. Other exercises' sessions are untouched.
async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
) -> Result<Json<DeleteExerciseResponse>> {
    if exercise_id.is_empty() || exercise_id.len() > 100 {
        return Err(crate::error::AppError::BadRequest(
            "Invalid exercise id".to_string(),
        ));
    }

    tracing::info!(uid = %user.uid, exercise_id, "Deleting exercise");
    let deleted_sessions = state
        .db
        .delete_sessions_for_exercise(&user.uid, &exercise_id)
        .await?;

    Ok(Json(DeleteExerciseResponse { deleted_sessions }))
}

// ─── Routines ────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RoutineSummary {
    pub id: String,
    pub name: String,
    pub exercises: Vec<ExerciseRef>,
}

async fn get_routines(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<RoutineSummary>>> {
    let routines = state.db.get_routines(&user.uid).await?;
    Ok(Json(
        routines
            .into_iter()
            .map(|(id, r)| RoutineSummary {
                id,
                name: r.name,
                exercises: r.exercises,
            })
            .collect(),
    ))
}

#[derive(Deserialize, Validate)]
pub struct RoutineNameRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Create an empty routine. The document ID is the name's slug.
async fn create_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RoutineNameRequest>,
) -> Result<Json<RoutineSummary>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::BadRequest(e.to_string()))?;

    let id = exercise_slug(&request.name);
    if id.is_empty() {
        return Err(crate::error::AppError::BadRequest(
            "Routine name must contain letters or digits".to_string(),
        ));
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    let routine = Routine {
        name: request.name,
        exercises: vec![],
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.set_routine(&user.uid, &id, &routine).await?;

    Ok(Json(RoutineSummary {
        id,
        name: routine.name,
        exercises: routine.exercises,
    }))
}

async fn rename_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(routine_id): Path<String>,
    Json(request): Json<RoutineNameRequest>,
) -> Result<Json<RoutineSummary>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::BadRequest(e.to_string()))?;

    let mut routine = state
        .db
        .get_routine(&user.uid, &routine_id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Routine {}", routine_id)))?;

    routine.name = request.name;
    routine.updated_at = format_utc_rfc3339(chrono::Utc::now());
    state.db.set_routine(&user.uid, &routine_id, &routine).await?;

    Ok(Json(RoutineSummary {
        id: routine_id,
        name: routine.name,
        exercises: routine.exercises,
    }))
}

/// Delete a routine. Sessions are independent of routine existence,
/// so nothing cascades.
async fn delete_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(routine_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.db.delete_routine(&user.uid, &routine_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
}

/// Append an exercise to a routine (array-union: duplicates by id
/// are rejected silently).
async fn add_routine_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(routine_id): Path<String>,
    Json(request): Json<AddExerciseRequest>,
) -> Result<Json<RoutineSummary>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::BadRequest(e.to_string()))?;

    let mut routine = state
        .db
        .get_routine(&user.uid, &routine_id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Routine {}", routine_id)))?;

    let added = routine.add_exercise(ExerciseRef {
        id: exercise_slug(&request.name),
        name: request.name,
        muscle_group: request.muscle_group,
    });

    if added {
        routine.updated_at = format_utc_rfc3339(chrono::Utc::now());
        state.db.set_routine(&user.uid, &routine_id, &routine).await?;
    }

    Ok(Json(RoutineSummary {
        id: routine_id,
        name: routine.name,
        exercises: routine.exercises,
    }))
}

async fn remove_routine_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((routine_id, exercise_id)): Path<(String, String)>,
) -> Result<Json<RoutineSummary>> {
    let mut routine = state
        .db
        .get_routine(&user.uid, &routine_id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Routine {}", routine_id)))?;

    if routine.remove_exercise(&exercise_id) {
        routine.updated_at = format_utc_rfc3339(chrono::Utc::now());
        state.db.set_routine(&user.uid, &routine_id, &routine).await?;
    }

    Ok(Json(RoutineSummary {
        id: routine_id,
        name: routine.name,
        exercises: routine.exercises,
    }))
}

// ─── Body Metrics ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricsResponse {
    pub entries: Vec<BodyMetricEntry>,
    /// Deltas of the latest entry vs the previous one
    pub trend: Option<crate::models::metrics::TrendDeltas>,
}

/// List body-metric history, oldest first, with the latest trend deltas.
async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MetricsResponse>> {
    let mut entries = state.db.get_body_metrics(&user.uid).await?;
    entries.sort_by(|a, b| (&a.date, &a.created_at).cmp(&(&b.date, &b.created_at)));
    let trend = crate::models::metrics::trend_deltas(&entries);
    Ok(Json(MetricsResponse { entries, trend }))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetricRequest {
    /// "YYYY-MM-DD"
    pub date: String,
    #[validate(range(min = 1.0, max = 2000.0))]
    pub weight: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub body_fat_pct: f64,
    #[serde(default)]
    pub muscle_mass: f64,
    #[serde(default)]
    pub visceral_fat: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub body_water_pct: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub skeletal_muscle_pct: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub subcutaneous_fat_pct: f64,
    #[serde(default)]
    pub bone_mass: f64,
    #[serde(default)]
    pub fat_free_weight: f64,
    #[serde(default)]
    pub bmr: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub protein_pct: f64,
    #[serde(default)]
    pub metabolic_age: f64,
    pub photo_url: Option<String>,
}

/// Append a body-metric entry. Height is carried forward from the
/// profile for the BMI derivation; entries are never mutated.
async fn add_metric(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<MetricRequest>,
) -> Result<Json<BodyMetricEntry>> {
    request
        .validate()
        .map_err(|e| crate::error::AppError::BadRequest(e.to_string()))?;

    if parse_day(&request.date).is_none() {
        return Err(crate::error::AppError::BadRequest(
            "Invalid 'date': must be YYYY-MM-DD".to_string(),
        ));
    }

    let height_inches = state
        .db
        .get_profile(&user.uid)
        .await?
        .map(|p| p.height_inches)
        .unwrap_or(0.0);

    let entry = BodyMetricEntry {
        date: request.date,
        weight: request.weight,
        body_fat_pct: request.body_fat_pct,
        muscle_mass: request.muscle_mass,
        visceral_fat: request.visceral_fat,
        body_water_pct: request.body_water_pct,
        skeletal_muscle_pct: request.skeletal_muscle_pct,
        subcutaneous_fat_pct: request.subcutaneous_fat_pct,
        bone_mass: request.bone_mass,
        fat_free_weight: request.fat_free_weight,
        bmr: request.bmr,
        protein_pct: request.protein_pct,
        metabolic_age: request.metabolic_age,
        bmi: BodyMetricEntry::derive_bmi(request.weight, height_inches),
        height_inches,
        photo_url: request.photo_url,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.add_body_metric(&user.uid, &entry).await?;
    Ok(Json(entry))
}
