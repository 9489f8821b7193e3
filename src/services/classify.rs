// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise classification.
//!
//! Two independent schemes map a free-text exercise name plus an
//! optional muscle-group label to a canonical category:
//!
//! - the **body-part scheme** (9 categories) used for history
//!   breakdowns, and
//! - the **push/pull/legs scheme** (3 groups, 8 sub-muscles) used by
//!   the weekly set-target tracker.
//!
//! Exercise names come from a spreadsheet with no controlled
//! vocabulary, so both schemes are layered keyword tables: an exact
//! label lookup first, then priority-ordered keyword rules with
//! word-boundary matching (the keyword "ab" must not match inside
//! "cable"). Rule order is part of the contract — later rules are
//! generic fallbacks that earlier, more specific rules override.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Body-part category for history breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BodyPart {
    Abs,
    /// Arms/biceps (the label "Biceps" maps here)
    Arms,
    Triceps,
    Shoulders,
    Back,
    Legs,
    Glutes,
    Cardio,
    Recovery,
}

impl BodyPart {
    pub fn label(self) -> &'static str {
        match self {
            BodyPart::Abs => "Abs",
            BodyPart::Arms => "Arms",
            BodyPart::Triceps => "Triceps",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Back => "Back",
            BodyPart::Legs => "Legs",
            BodyPart::Glutes => "Glutes",
            BodyPart::Cardio => "Cardio",
            BodyPart::Recovery => "Recovery",
        }
    }
}

/// Top-level push/pull/legs group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PplGroup {
    Push,
    Pull,
    Legs,
}

/// Sub-muscle within the push/pull/legs taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SubMuscle {
    Chest,
    Shoulders,
    Triceps,
    Back,
    Biceps,
    Quads,
    Hamstrings,
    Glutes,
}

impl SubMuscle {
    /// All sub-muscles, grouped push → pull → legs.
    pub const ALL: [SubMuscle; 8] = [
        SubMuscle::Chest,
        SubMuscle::Shoulders,
        SubMuscle::Triceps,
        SubMuscle::Back,
        SubMuscle::Biceps,
        SubMuscle::Quads,
        SubMuscle::Hamstrings,
        SubMuscle::Glutes,
    ];

    pub fn group(self) -> PplGroup {
        match self {
            SubMuscle::Chest | SubMuscle::Shoulders | SubMuscle::Triceps => PplGroup::Push,
            SubMuscle::Back | SubMuscle::Biceps => PplGroup::Pull,
            SubMuscle::Quads | SubMuscle::Hamstrings | SubMuscle::Glutes => PplGroup::Legs,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubMuscle::Chest => "chest",
            SubMuscle::Shoulders => "shoulders",
            SubMuscle::Triceps => "triceps",
            SubMuscle::Back => "back",
            SubMuscle::Biceps => "biceps",
            SubMuscle::Quads => "quads",
            SubMuscle::Hamstrings => "hamstrings",
            SubMuscle::Glutes => "glutes",
        }
    }
}

impl PplGroup {
    pub fn label(self) -> &'static str {
        match self {
            PplGroup::Push => "push",
            PplGroup::Pull => "pull",
            PplGroup::Legs => "legs",
        }
    }
}

/// Lower-case the text and reduce every non-alphanumeric run to a
/// single space, so keyword rules see clean token boundaries
/// ("Push-Ups" and "Push Ups" match the same rule).
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Build a word-boundary rule from keyword alternatives.
fn keyword_rule(keywords: &str) -> Regex {
    Regex::new(&format!(r"\b(?:{})\b", keywords)).expect("static keyword rule must compile")
}

// ─── Body-Part Scheme ────────────────────────────────────────

/// Priority-ordered keyword table for the body-part scheme.
/// First matching entry wins.
static BODY_PART_RULES: LazyLock<Vec<(Regex, BodyPart)>> = LazyLock::new(|| {
    vec![
        (
            keyword_rule("massage|stretch|foam roll|sauna|recovery"),
            BodyPart::Recovery,
        ),
        // before cardio: "walking lunges" must not hit the "walking" keyword
        (keyword_rule("lunges?"), BodyPart::Glutes),
        (
            keyword_rule("cardio|bike|cycling|treadmill|elliptical|stair climber|walking|running|jog"),
            BodyPart::Cardio,
        ),
        // "leg raise" must land here before the generic "leg" rule
        (
            keyword_rule("abs?|crunch(?:es)?|core|planks?|sit ups?|leg raises?"),
            BodyPart::Abs,
        ),
        (
            keyword_rule("triceps?|dips?|pushdowns?|push downs?|skull crushers?|face pulls?"),
            BodyPart::Triceps,
        ),
        // "upright row" and "lateral raise" before the generic "row" rule
        (
            keyword_rule("shoulders?|delts?|lateral raises?|front raises?|overhead press|upright rows?"),
            BodyPart::Shoulders,
        ),
        (
            keyword_rule("biceps?|curls?|pulldowns?|pull downs?|pull ups?|chin ups?|push ups?"),
            BodyPart::Arms,
        ),
        // "deadlift" before "dead hang" -> Back would be wrong; glutes first
        (
            keyword_rule("glutes?|hip thrusts?|hip abductor|bridges?|lunges?|sumo|deadlifts?|hip"),
            BodyPart::Glutes,
        ),
        (
            keyword_rule("back|rows?|lats?|dead hang|wall sit"),
            BodyPart::Back,
        ),
        (
            keyword_rule("legs?|squats?|calf|calves|hamstrings?|quads?|thigh|step ups?"),
            BodyPart::Legs,
        ),
    ]
});

/// Exact (case-insensitive) lookup of a canonical muscle-group label.
fn body_part_label(label: &str) -> Option<BodyPart> {
    match normalize(label).as_str() {
        "abs" => Some(BodyPart::Abs),
        "arms" | "biceps" => Some(BodyPart::Arms),
        "triceps" => Some(BodyPart::Triceps),
        "shoulders" => Some(BodyPart::Shoulders),
        "back" => Some(BodyPart::Back),
        "legs" => Some(BodyPart::Legs),
        "glutes" => Some(BodyPart::Glutes),
        "cardio" => Some(BodyPart::Cardio),
        "recovery" => Some(BodyPart::Recovery),
        _ => None,
    }
}

/// Classify into the 9-category body-part scheme.
///
/// The explicit `muscle_group` label is tried first; name keywords
/// are the fallback for unlabeled records. Returns `None` for
/// unclassifiable records — callers exclude those from totals, this
/// is not an error.
pub fn classify_body_part(muscle_group: &str, exercise_name: &str) -> Option<BodyPart> {
    if let Some(part) = body_part_label(muscle_group) {
        return Some(part);
    }

    let text = normalize(&format!("{} {}", muscle_group, exercise_name));
    BODY_PART_RULES
        .iter()
        .find(|(rule, _)| rule.is_match(&text))
        .map(|&(_, part)| part)
}

// ─── Push/Pull/Legs Scheme ───────────────────────────────────

/// Exercise-specific override rules, evaluated before the generic
/// fallback because exercise names are more specific than coarse
/// muscle-group labels ("Lat Pulldown" is back work even when the
/// label says "Biceps" is missing).
static PPL_OVERRIDE_RULES: LazyLock<Vec<(Regex, SubMuscle)>> = LazyLock::new(|| {
    vec![
        (
            keyword_rule("hip thrusts?|glutes?|bridges?|hip abductor|deadlifts?|sumo"),
            SubMuscle::Glutes,
        ),
        (keyword_rule("hamstrings?|romanian|rdl"), SubMuscle::Hamstrings),
        // shoulder-specific raises/rows before the generic "row" rule
        (
            keyword_rule("lateral raises?|front raises?|upright rows?|overhead press|shoulder press|delts?"),
            SubMuscle::Shoulders,
        ),
        (
            keyword_rule("rows?|pulldowns?|pull downs?|pull ups?|chin ups?|lats?|dead hang"),
            SubMuscle::Back,
        ),
        (keyword_rule("curls?"), SubMuscle::Biceps),
        (
            keyword_rule("pushdowns?|push downs?|triceps?|dips?|skull crushers?"),
            SubMuscle::Triceps,
        ),
        (
            keyword_rule("squats?|leg press|leg extensions?|lunges?|step ups?"),
            SubMuscle::Quads,
        ),
        (
            keyword_rule("bench|chest|fly|flys|flyes|push ups?|press(?:es)?"),
            SubMuscle::Chest,
        ),
    ]
});

/// Generic fallback keyword rules (coarse muscle words only).
static PPL_FALLBACK_RULES: LazyLock<Vec<(Regex, SubMuscle)>> = LazyLock::new(|| {
    vec![
        (keyword_rule("chest|pecs?"), SubMuscle::Chest),
        (keyword_rule("shoulders?|delts?"), SubMuscle::Shoulders),
        (keyword_rule("triceps?"), SubMuscle::Triceps),
        (keyword_rule("back"), SubMuscle::Back),
        (keyword_rule("biceps?"), SubMuscle::Biceps),
        (keyword_rule("quads?|legs?"), SubMuscle::Quads),
        (keyword_rule("hamstrings?"), SubMuscle::Hamstrings),
        (keyword_rule("glutes?"), SubMuscle::Glutes),
    ]
});

/// Direct lookup of a normalized muscle-group label.
fn ppl_label(label: &str) -> Option<SubMuscle> {
    match normalize(label).as_str() {
        "chest" => Some(SubMuscle::Chest),
        "shoulders" => Some(SubMuscle::Shoulders),
        "triceps" => Some(SubMuscle::Triceps),
        "back" => Some(SubMuscle::Back),
        "biceps" | "arms" => Some(SubMuscle::Biceps),
        // coarse "Legs" label defaults to quads
        "legs" | "quads" => Some(SubMuscle::Quads),
        "hamstrings" => Some(SubMuscle::Hamstrings),
        "glutes" => Some(SubMuscle::Glutes),
        _ => None,
    }
}

/// Classify into the push/pull/legs scheme.
///
/// Resolution order: direct label lookup, then exercise-specific
/// override rules over label+name, then the generic fallback rules.
pub fn classify_ppl(muscle_group: &str, exercise_name: &str) -> Option<SubMuscle> {
    if let Some(sub) = ppl_label(muscle_group) {
        return Some(sub);
    }

    let text = normalize(&format!("{} {}", muscle_group, exercise_name));
    PPL_OVERRIDE_RULES
        .iter()
        .chain(PPL_FALLBACK_RULES.iter())
        .find(|(rule, _)| rule.is_match(&text))
        .map(|&(_, sub)| sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_label_wins() {
        assert_eq!(
            classify_body_part("Back", "Seated Cable Row"),
            Some(BodyPart::Back)
        );
        assert_eq!(classify_ppl("Back", "Seated Cable Row"), Some(SubMuscle::Back));
    }

    #[test]
    fn test_word_boundary_guard() {
        // "ab" must not match inside "cable"
        let got = classify_body_part("", "Cable Lateral Raise");
        assert_ne!(got, Some(BodyPart::Abs));
        assert_eq!(got, Some(BodyPart::Shoulders));

        assert_eq!(
            classify_body_part("", "Ab Crunch Machine"),
            Some(BodyPart::Abs)
        );
    }

    #[test]
    fn test_leg_raise_is_abs_not_legs() {
        assert_eq!(
            classify_body_part("", "Vertical Leg Raises"),
            Some(BodyPart::Abs)
        );
    }

    #[test]
    fn test_body_part_keyword_priority() {
        // "upright row" is shoulders even though "row" alone is back
        assert_eq!(
            classify_body_part("", "Upright Row"),
            Some(BodyPart::Shoulders)
        );
        assert_eq!(classify_body_part("", "Cable Row"), Some(BodyPart::Back));
        // "deadlift" is glutes, "dead hang" is back
        assert_eq!(classify_body_part("", "Deadlift"), Some(BodyPart::Glutes));
        assert_eq!(classify_body_part("", "Dead Hang"), Some(BodyPart::Back));
    }

    #[test]
    fn test_unclassified_is_none() {
        assert_eq!(classify_body_part("", "Mystery Machine 3000"), None);
        assert_eq!(classify_ppl("", "Mystery Machine 3000"), None);
    }

    #[test]
    fn test_ppl_overrides_beat_fallback() {
        // "curl" override, not the "leg" fallback
        assert_eq!(classify_ppl("", "Leg Curl"), Some(SubMuscle::Biceps));
        // hip thrust override
        assert_eq!(classify_ppl("", "Hip Thrust"), Some(SubMuscle::Glutes));
        // row override
        assert_eq!(classify_ppl("", "Seated Cable Row"), Some(SubMuscle::Back));
    }

    #[test]
    fn test_ppl_label_map() {
        assert_eq!(classify_ppl("Chest", "Whatever"), Some(SubMuscle::Chest));
        assert_eq!(classify_ppl("Legs", "Whatever"), Some(SubMuscle::Quads));
        assert_eq!(classify_ppl("Biceps", "Lat Pulldown"), Some(SubMuscle::Biceps));
    }

    #[test]
    fn test_ppl_press_is_chest() {
        assert_eq!(classify_ppl("", "Incline Bench Press"), Some(SubMuscle::Chest));
        // shoulder press is specific enough to stay shoulders
        assert_eq!(
            classify_ppl("", "Dumbbell Shoulder Press"),
            Some(SubMuscle::Shoulders)
        );
        // leg press is quads, not chest
        assert_eq!(classify_ppl("", "Leg Press Machine"), Some(SubMuscle::Quads));
    }

    #[test]
    fn test_sub_muscle_groups() {
        assert_eq!(SubMuscle::Chest.group(), PplGroup::Push);
        assert_eq!(SubMuscle::Back.group(), PplGroup::Pull);
        assert_eq!(SubMuscle::Glutes.group(), PplGroup::Legs);
    }

    #[test]
    fn test_cardio_and_recovery() {
        assert_eq!(
            classify_body_part("", "Walking Treadmill"),
            Some(BodyPart::Cardio)
        );
        assert_eq!(
            classify_body_part("", "Hydro Massage Bed"),
            Some(BodyPart::Recovery)
        );
    }
}
