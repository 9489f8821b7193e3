// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (the `users/{uid}` document itself)
//! - Sessions (`users/{uid}/sessions`, keyed `{exerciseId}--{date}`)
//! - Routines (`users/{uid}/routines`)
//! - Body metrics (`users/{uid}/bodyMetrics`, append-only)
//!
//! Session writes are upserts on the deterministic composite key, so
//! repeated imports and debounced saves never create duplicates.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{BodyMetricEntry, Profile, Routine, WorkoutSession};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Parent path for a user's subcollections.
    fn user_path(&self, uid: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, uid)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user's profile document.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user's profile document.
    pub async fn set_profile(&self, uid: &str, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Fetch all of a user's workout sessions.
    ///
    /// Full collection scan; ordering and filtering happen
    /// client-side over the in-memory snapshot.
    pub async fn get_sessions(&self, uid: &str) -> Result<Vec<WorkoutSession>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .parent(parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch all sessions for one exercise (history view, cascade delete).
    pub async fn get_sessions_for_exercise(
        &self,
        uid: &str,
        exercise_id: &str,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let parent = self.user_path(uid)?;
        let exercise_id = exercise_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .parent(parent)
            .filter(move |q| q.field("exerciseId").eq(exercise_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one session by its composite key.
    pub async fn get_session(
        &self,
        uid: &str,
        session_key: &str,
    ) -> Result<Option<WorkoutSession>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .parent(parent)
            .obj()
            .one(session_key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upsert a session by its composite key (idempotent).
    pub async fn upsert_session(
        &self,
        uid: &str,
        session: &WorkoutSession,
    ) -> Result<(), AppError> {
        let parent = self.user_path(uid)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(session.key())
            .parent(parent)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Upsert many sessions in chunks (used by CSV import).
    ///
    /// Chunked to stay under the store's batch-write cap, with
    /// concurrent writes inside each chunk and progress logging
    /// between chunks. Safe to re-run after partial failure: session
    /// identity is deterministic, so a retry overwrites rather than
    /// duplicates.
    pub async fn batch_upsert_sessions(
        &self,
        uid: &str,
        sessions: &[WorkoutSession],
    ) -> Result<u32, AppError> {
        let client = self.get_client()?;
        let parent = self.user_path(uid)?;

        let total = sessions.len();
        let mut written = 0u32;

        for chunk in sessions.chunks(BATCH_SIZE) {
            stream::iter(chunk.to_vec())
                .map(|session| {
                    let parent = parent.clone();
                    async move {
                        let _: () = client
                            .fluent()
                            .update()
                            .in_col(collections::SESSIONS)
                            .document_id(session.key())
                            .parent(parent)
                            .object(&session)
                            .execute()
                            .await
                            .map_err(|e| AppError::Database(e.to_string()))?;
                        Ok::<_, AppError>(())
                    }
                })
                .buffer_unordered(MAX_CONCURRENT_DB_OPS)
                .collect::<Vec<Result<(), AppError>>>()
                .await
                .into_iter()
                .collect::<Result<Vec<()>, AppError>>()?;

            written += chunk.len() as u32;
            tracing::info!(uid, written, total, "Import progress");
        }

        Ok(written)
    }

    /// Delete one session by its composite key.
    pub async fn delete_session(&self, uid: &str, session_key: &str) -> Result<(), AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SESSIONS)
            .parent(parent)
            .document_id(session_key)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Cascade delete: remove every session for one exercise.
    ///
    /// Used when an exercise is removed from the library. Sessions of
    /// other exercises are untouched. Returns the number deleted.
    pub async fn delete_sessions_for_exercise(
        &self,
        uid: &str,
        exercise_id: &str,
    ) -> Result<u32, AppError> {
        let sessions = self.get_sessions_for_exercise(uid, exercise_id).await?;
        let client = self.get_client()?;
        let parent = self.user_path(uid)?;

        let mut deleted = 0u32;
        for chunk in sessions.chunks(BATCH_SIZE) {
            let keys: Vec<String> = chunk.iter().map(|s| s.key()).collect();
            stream::iter(keys)
                .map(|key| {
                    let parent = parent.clone();
                    async move {
                        client
                            .fluent()
                            .delete()
                            .from(collections::SESSIONS)
                            .parent(parent)
                            .document_id(&key)
                            .execute()
                            .await
                            .map_err(|e| AppError::Database(e.to_string()))?;
                        Ok::<_, AppError>(())
                    }
                })
                .buffer_unordered(MAX_CONCURRENT_DB_OPS)
                .collect::<Vec<Result<(), AppError>>>()
                .await
                .into_iter()
                .collect::<Result<Vec<()>, AppError>>()?;

            deleted += chunk.len() as u32;
        }

        tracing::info!(uid, exercise_id, deleted, "Cascade-deleted exercise sessions");
        Ok(deleted)
    }

    // ─── Routine Operations ──────────────────────────────────────

    /// Fetch all of a user's routines as (id, routine) pairs.
    pub async fn get_routines(&self, uid: &str) -> Result<Vec<(String, Routine)>, AppError> {
        let parent = self.user_path(uid)?;
        let docs: Vec<firestore::FirestoreDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ROUTINES)
            .parent(parent)
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        docs.into_iter()
            .map(|doc| {
                let id = doc
                    .name
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let routine: Routine = firestore::FirestoreDb::deserialize_doc_to(&doc)
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok((id, routine))
            })
            .collect()
    }

    /// Get one routine by ID.
    pub async fn get_routine(&self, uid: &str, routine_id: &str) -> Result<Option<Routine>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ROUTINES)
            .parent(parent)
            .obj()
            .one(routine_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a routine.
    pub async fn set_routine(
        &self,
        uid: &str,
        routine_id: &str,
        routine: &Routine,
    ) -> Result<(), AppError> {
        let parent = self.user_path(uid)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ROUTINES)
            .document_id(routine_id)
            .parent(parent)
            .object(routine)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a routine. Sessions are independent of routine
    /// existence, so there is no cascade.
    pub async fn delete_routine(&self, uid: &str, routine_id: &str) -> Result<(), AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::ROUTINES)
            .parent(parent)
            .document_id(routine_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Body Metric Operations ──────────────────────────────────

    /// Fetch all body-metric entries for a user.
    pub async fn get_body_metrics(&self, uid: &str) -> Result<Vec<BodyMetricEntry>, AppError> {
        let parent = self.user_path(uid)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BODY_METRICS)
            .parent(parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append one body-metric entry (entries are never mutated).
    ///
    /// The document ID combines date and write timestamp, so several
    /// entries on the same day coexist.
    pub async fn add_body_metric(
        &self,
        uid: &str,
        entry: &BodyMetricEntry,
    ) -> Result<(), AppError> {
        let parent = self.user_path(uid)?;
        let doc_id = format!("{}--{}", entry.date, entry.created_at);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BODY_METRICS)
            .document_id(doc_id)
            .parent(parent)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
