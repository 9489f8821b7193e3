//! User profile model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Per-user profile document stored at `users/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Profile photo URL (written by the frontend's storage SDK)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Height in inches (carried into body-metric entries for BMI)
    #[serde(default)]
    pub height_inches: f64,
    /// Preferred weight unit ("lbs" or "kg")
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    /// Optional gym check-in QR code image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym_qr_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_weight_unit() -> String {
    "lbs".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            photo_url: None,
            height_inches: 0.0,
            weight_unit: default_weight_unit(),
            gym_qr_url: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}
