// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fittrack_api::config::Config;
use fittrack_api::db::FirestoreDb;
use fittrack_api::routes::create_router;
use fittrack_api::services::{SessionSaver, TargetConfig};
use fittrack_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test JWT for a user.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    fittrack_api::middleware::auth::create_jwt(uid, signing_key).expect("Failed to create JWT")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let saver = SessionSaver::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        saver,
        targets: TargetConfig::default(),
    });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app_with_emulator() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db().await;
    let saver = SessionSaver::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        saver,
        targets: TargetConfig::default(),
    });

    (create_router(state.clone()), state)
}
