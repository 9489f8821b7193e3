// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak and recency calculations over the set of workout days.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Days elapsed since the most recent workout (`None` when no
/// workouts exist). 0 means a workout today; a future-dated session
/// (pre-logged workout, clock skew) also clamps to 0.
pub fn days_since_last(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Option<i64> {
    dates
        .iter()
        .next_back()
        .map(|last| (today - *last).num_days().max(0))
}

/// Consecutive-day streak ending at the most recent workout date.
///
/// Walks backward one calendar day at a time from the latest workout
/// date, counting while each day is present, stopping at the first
/// gap. The latest date alone is a streak of 1. The walk starts at
/// the most recent workout even if that is not `_today` — the streak
/// measures historical consistency, not "active right now".
pub fn streak(dates: &BTreeSet<NaiveDate>, _today: NaiveDate) -> u32 {
    let Some(&latest) = dates.iter().next_back() else {
        return 0;
    };

    let mut count = 0;
    let mut day = latest;
    while dates.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break, // calendar underflow; cannot walk further
        }
    }
    count
}
