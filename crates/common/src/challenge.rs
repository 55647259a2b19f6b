use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty tier of a challenge (1–3).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChallengeLevel {
    /// Small changes to the everyday routine.
    Petit = 1,
    /// A half-day to full-day outing.
    #[default]
    Weekend = 2,
    /// A bigger experience.
    Adventure = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("challenge level must be 1, 2 or 3 (got {0})")]
pub struct LevelError(pub u8);

impl ChallengeLevel {
    pub const ALL: [ChallengeLevel; 3] = [
        ChallengeLevel::Petit,
        ChallengeLevel::Weekend,
        ChallengeLevel::Adventure,
    ];

    /// Parse a level, substituting `Weekend` for anything out of range.
    pub fn from_u8_lossy(level: u8) -> Self {
        Self::try_from(level).unwrap_or(ChallengeLevel::Weekend)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ChallengeLevel::Petit => "Petit Discovery",
            ChallengeLevel::Weekend => "Weekend Challenge",
            ChallengeLevel::Adventure => "Adventure Quest",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChallengeLevel::Petit => "A small change to the everyday",
            ChallengeLevel::Weekend => "A half-day to one-day challenge",
            ChallengeLevel::Adventure => "A slightly bigger experience",
        }
    }
}

impl TryFrom<u8> for ChallengeLevel {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChallengeLevel::Petit),
            2 => Ok(ChallengeLevel::Weekend),
            3 => Ok(ChallengeLevel::Adventure),
            other => Err(LevelError(other)),
        }
    }
}

impl From<ChallengeLevel> for u8 {
    fn from(level: ChallengeLevel) -> u8 {
        level.as_u8()
    }
}

impl fmt::Display for ChallengeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

/// A suggested activity awaiting acceptance.
///
/// Challenges are ephemeral: they are never persisted on their own and turn
/// into an `Experience` once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Remote challenges may omit an id; local ones are `local-<uuid>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: ChallengeLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

impl Challenge {
    /// Generate an id for a locally produced challenge.
    pub fn local_id() -> String {
        format!("local-{}", uuid::Uuid::new_v4())
    }

    /// Id used when reporting feedback (skips) for this challenge.
    pub fn feedback_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("challenge-skipped-{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_try_from_bounds() {
        assert_eq!(ChallengeLevel::try_from(1), Ok(ChallengeLevel::Petit));
        assert_eq!(ChallengeLevel::try_from(3), Ok(ChallengeLevel::Adventure));
        assert_eq!(ChallengeLevel::try_from(0), Err(LevelError(0)));
        assert_eq!(ChallengeLevel::try_from(4), Err(LevelError(4)));
    }

    #[test]
    fn lossy_level_falls_back_to_weekend() {
        assert_eq!(ChallengeLevel::from_u8_lossy(9), ChallengeLevel::Weekend);
        assert_eq!(ChallengeLevel::from_u8_lossy(1), ChallengeLevel::Petit);
    }

    #[test]
    fn level_serializes_as_number() {
        let json = serde_json::to_string(&ChallengeLevel::Adventure).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<ChallengeLevel>("5").is_err());
    }

    #[test]
    fn remote_challenge_parses() {
        let raw = r#"{"title":"Visit a local museum","icon":"Palette",
            "category":"Art & Creative","type":"art","level":2}"#;
        let c: Challenge = serde_json::from_str(raw).unwrap();
        assert!(c.id.is_none());
        assert_eq!(c.level, ChallengeLevel::Weekend);
        assert_eq!(c.icon.as_deref(), Some("Palette"));
        assert!(c.feedback_id().starts_with("challenge-skipped-"));
    }

    #[test]
    fn local_ids_are_unique() {
        let a = Challenge::local_id();
        let b = Challenge::local_id();
        assert!(a.starts_with("local-"));
        assert_ne!(a, b);
    }
}
