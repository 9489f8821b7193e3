// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitTrack: personal strength-training log
//!
//! This crate provides the backend API for workout sessions, routines,
//! body metrics, and the derived statistics the web app renders
//! (streaks, volume series, weekly set targets, CSV import).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{SessionSaver, TargetConfig};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub saver: SessionSaver,
    pub targets: TargetConfig,
}
