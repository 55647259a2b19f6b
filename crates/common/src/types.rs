use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::challenge::ChallengeLevel;

/// Unique identifier for an experience in the journal.
///
/// Numeric so it doubles as the seed for deterministic scene layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExperienceId(pub u64);

impl ExperienceId {
    /// The id that follows this one, or `None` at the end of the id space.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the user felt about an experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Neutral,
    Negative,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Positive => "positive",
            Feedback::Neutral => "neutral",
            Feedback::Negative => "negative",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feedback value: {0:?}")]
pub struct FeedbackParseError(pub String);

impl FromStr for Feedback {
    type Err = FeedbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "good" | "+" => Ok(Feedback::Positive),
            "neutral" | "ok" => Ok(Feedback::Neutral),
            "negative" | "bad" | "-" => Ok(Feedback::Negative),
            _ => Err(FeedbackParseError(s.to_string())),
        }
    }
}

/// A recorded completed or in-progress user activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: ExperienceId,
    pub title: String,
    pub category: String,
    pub level: ChallengeLevel,
    pub completed: bool,
    pub date: DateTime<Utc>,
    /// Free-form activity type ("music", "place", "journal", ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    /// Mood noted alongside a journal entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

impl Experience {
    /// Whether this experience is still an open mission.
    pub fn is_ongoing(&self) -> bool {
        !self.completed
    }
}
