// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.
//!
//! The aggregation core (classify, aggregate, streak, targets,
//! import) is synchronous and pure: it runs over already-fetched
//! snapshots and never touches I/O. Only `autosave` talks to the
//! database.

pub mod aggregate;
pub mod autosave;
pub mod classify;
pub mod import;
pub mod streak;
pub mod targets;

pub use autosave::SessionSaver;
pub use targets::TargetConfig;
