// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV workout-log import.
//!
//! The body is the raw CSV text. `?preview=true` parses and reports
//! the summary without writing anything.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::import::parse_csv;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// 5 MB cap on the raw CSV body; larger bodies get 413. Raised above
/// the framework default, which caps at 2 MB.
const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/import", post(import_csv))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES))
}

#[derive(Deserialize)]
struct ImportQuery {
    /// Parse only; report the summary without writing
    #[serde(default)]
    preview: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ImportResponse {
    pub sessions: u32,
    pub exercises: u32,
    pub days: u32,
    /// False for previews
    pub written: bool,
}

/// Parse an exported workout log and upsert the resulting sessions.
///
/// Re-importing the same file is idempotent: session keys are derived
/// from exercise and date, so existing documents are overwritten.
async fn import_csv(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>> {
    let sessions = parse_csv(&body);
    if sessions.is_empty() {
        return Err(AppError::Import(
            "No parsable workout rows found".to_string(),
        ));
    }

    let exercises: BTreeSet<&str> = sessions.iter().map(|s| s.exercise_id.as_str()).collect();
    let days: BTreeSet<&str> = sessions.iter().map(|s| s.date.as_str()).collect();

    let response = ImportResponse {
        sessions: sessions.len() as u32,
        exercises: exercises.len() as u32,
        days: days.len() as u32,
        written: !params.preview,
    };

    if params.preview {
        tracing::info!(
            uid = %user.uid,
            sessions = response.sessions,
            "Import preview"
        );
        return Ok(Json(response));
    }

    let written = state
        .db
        .batch_upsert_sessions(&user.uid, &sessions)
        .await?;
    tracing::info!(
        uid = %user.uid,
        written,
        exercises = response.exercises,
        days = response.days,
        "Import complete"
    );

    Ok(Json(response))
}
