use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeLevel;

/// Onboarding answers.
///
/// Stored under the `userPreferences` key; its absence means the user has
/// not been through onboarding yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub challenge_level: ChallengeLevel,
    /// Categories the user does not want suggested.
    #[serde(default)]
    pub avoid_categories: Vec<String>,
    #[serde(default = "default_time_preference")]
    pub time_preference: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default = "default_challenge_frequency")]
    pub challenge_frequency: String,
}

fn default_time_preference() -> String {
    "weekend".to_string()
}

fn default_challenge_frequency() -> String {
    "daily".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            challenge_level: ChallengeLevel::Weekend,
            avoid_categories: Vec::new(),
            time_preference: default_time_preference(),
            goals: Vec::new(),
            preferred_categories: Vec::new(),
            challenge_frequency: default_challenge_frequency(),
        }
    }
}

impl UserPreferences {
    /// Whether a category (free text) is on the avoid list.
    pub fn avoids(&self, category: &str) -> bool {
        let category = category.trim().to_lowercase();
        self.avoid_categories
            .iter()
            .any(|c| c.trim().to_lowercase() == category)
    }
}
