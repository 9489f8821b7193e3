//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
///
/// All user data lives in subcollections under `users/{uid}`.
pub mod collections {
    pub const USERS: &str = "users";
    pub const SESSIONS: &str = "sessions";
    pub const ROUTINES: &str = "routines";
    pub const BODY_METRICS: &str = "bodyMetrics";
}
