// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Debounced session persistence.
//!
//! Rapid consecutive set edits collapse into one Firestore write
//! after a quiet period (~900ms). The debounce is an explicit state
//! machine — Idle, PendingSave(deadline), Saving, Error — with a
//! `flush` operation that cancels the pending timer and forces the
//! write through before navigation, so the last edit is never
//! silently dropped.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::WorkoutSession;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Quiet period before a pending edit is persisted.
pub const QUIET_PERIOD: Duration = Duration::from_millis(900);

/// How often the driver checks for due saves.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Debounce state for one session document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing to persist
    Idle,
    /// An edit is buffered; the write fires at `deadline` unless a
    /// newer edit pushes it out or `flush` forces it early
    PendingSave { deadline: Instant },
    /// A write is in flight
    Saving,
    /// The last write failed; the snapshot is retained and the next
    /// edit or flush retries
    Error { retryable: bool },
}

/// Per-session debounce machine. Pure: all transitions take `now`
/// explicitly, so tests never sleep.
#[derive(Debug)]
pub struct SaveMachine {
    quiet_period: Duration,
    state: SaveState,
    snapshot: Option<WorkoutSession>,
    edited_during_save: bool,
}

impl SaveMachine {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            state: SaveState::Idle,
            snapshot: None,
            edited_during_save: false,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Record an edit. Restarts the quiet-period timer; an edit that
    /// lands during an in-flight save is buffered for the next write.
    pub fn note_edit(&mut self, session: WorkoutSession, now: Instant) {
        self.snapshot = Some(session);
        match self.state {
            SaveState::Saving => self.edited_during_save = true,
            _ => {
                self.state = SaveState::PendingSave {
                    deadline: now + self.quiet_period,
                }
            }
        }
    }

    /// Take the snapshot for writing if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<WorkoutSession> {
        match self.state {
            SaveState::PendingSave { deadline } if now >= deadline => self.begin_save(),
            _ => None,
        }
    }

    /// Cancel the timer and take the snapshot for an immediate write.
    /// Also retries from the error state.
    pub fn flush(&mut self) -> Option<WorkoutSession> {
        match self.state {
            SaveState::PendingSave { .. } => self.begin_save(),
            SaveState::Error { retryable: true } if self.snapshot.is_some() => self.begin_save(),
            _ => None,
        }
    }

    fn begin_save(&mut self) -> Option<WorkoutSession> {
        self.state = SaveState::Saving;
        self.edited_during_save = false;
        self.snapshot.clone()
    }

    /// The in-flight write landed.
    pub fn save_succeeded(&mut self, now: Instant) {
        if self.edited_during_save {
            // A newer snapshot is waiting; schedule it
            self.state = SaveState::PendingSave {
                deadline: now + self.quiet_period,
            };
            self.edited_during_save = false;
        } else {
            self.snapshot = None;
            self.state = SaveState::Idle;
        }
    }

    /// The in-flight write failed. The snapshot is kept for retry.
    pub fn save_failed(&mut self) {
        self.state = SaveState::Error { retryable: true };
    }

    pub fn has_pending(&self) -> bool {
        self.snapshot.is_some()
    }
}

type SaveKey = (String, String); // (uid, session key)

/// Driver that owns the per-session machines and performs the
/// Firestore writes.
#[derive(Clone)]
pub struct SessionSaver {
    db: FirestoreDb,
    quiet_period: Duration,
    machines: Arc<Mutex<HashMap<SaveKey, SaveMachine>>>,
}

impl SessionSaver {
    pub fn new(db: FirestoreDb) -> Self {
        Self::with_quiet_period(db, QUIET_PERIOD)
    }

    pub fn with_quiet_period(db: FirestoreDb, quiet_period: Duration) -> Self {
        Self {
            db,
            quiet_period,
            machines: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Spawn the background tick loop.
    pub fn spawn(&self) -> tokio::task::JoinHandle<()> {
        let saver = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                saver.drain_due().await;
            }
        })
    }

    /// Buffer a session edit for debounced persistence.
    pub async fn enqueue(&self, uid: &str, session: WorkoutSession) {
        let key = (uid.to_string(), session.key());
        let mut machines = self.machines.lock().await;
        machines
            .entry(key)
            .or_insert_with(|| SaveMachine::new(self.quiet_period))
            .note_edit(session, Instant::now());
    }

    /// Force all of a user's pending writes through immediately.
    ///
    /// Called before navigation/unmount. Returns the number of
    /// sessions written. Every taken snapshot is attempted even when
    /// an earlier write fails; the first failure is surfaced after
    /// the loop so the UI can show a retry affordance, and failed
    /// machines land in the retryable error state.
    pub async fn flush_user(&self, uid: &str) -> Result<u32, AppError> {
        let to_write: Vec<(SaveKey, WorkoutSession)> = {
            let mut machines = self.machines.lock().await;
            machines
                .iter_mut()
                .filter(|((owner, _), _)| owner == uid)
                .filter_map(|(key, machine)| {
                    machine.flush().map(|session| (key.clone(), session))
                })
                .collect()
        };

        let mut written = 0;
        let mut first_error = None;
        for (key, session) in to_write {
            let result = self.persist(uid, session).await;
            let mut machines = self.machines.lock().await;
            let Some(machine) = machines.get_mut(&key) else {
                continue;
            };
            match result {
                Ok(()) => {
                    machine.save_succeeded(Instant::now());
                    if machine.state() == SaveState::Idle {
                        machines.remove(&key);
                    }
                    written += 1;
                }
                Err(e) => {
                    machine.save_failed();
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    /// Write every snapshot whose quiet period has elapsed.
    async fn drain_due(&self) {
        let now = Instant::now();
        let due: Vec<(SaveKey, WorkoutSession)> = {
            let mut machines = self.machines.lock().await;
            machines
                .iter_mut()
                .filter_map(|(key, machine)| {
                    machine.poll(now).map(|session| (key.clone(), session))
                })
                .collect()
        };

        for (key, session) in due {
            let result = self.persist(&key.0, session).await;
            let mut machines = self.machines.lock().await;
            let Some(machine) = machines.get_mut(&key) else {
                continue;
            };
            match result {
                Ok(()) => {
                    machine.save_succeeded(Instant::now());
                    if machine.state() == SaveState::Idle {
                        machines.remove(&key);
                    }
                }
                Err(e) => {
                    tracing::warn!(session = %key.1, error = %e, "Debounced save failed");
                    machine.save_failed();
                }
            }
        }
    }

    /// Write one snapshot. The stored document's creation time and
    /// provenance survive edits: a session first written by an import
    /// keeps its original `created_at` and `source` when its sets are
    /// edited later.
    async fn persist(&self, uid: &str, mut session: WorkoutSession) -> Result<(), AppError> {
        if let Some(existing) = self.db.get_session(uid, &session.key()).await? {
            if !existing.created_at.is_empty() {
                session.created_at = existing.created_at;
            }
            if !existing.source.is_empty() {
                session.source = existing.source;
            }
        }
        self.db.upsert_session(uid, &session).await
    }
}
