//! Starter data shown before the user has recorded anything.

use chrono::{TimeZone, Utc};
use serenpaths_common::{ChallengeLevel, Experience, ExperienceId, Feedback};

use crate::journal::Journal;

fn sample(
    id: u64,
    day: u32,
    kind: &str,
    level: ChallengeLevel,
    title: &str,
    category: &str,
    feedback: Feedback,
) -> Experience {
    Experience {
        id: ExperienceId(id),
        title: title.to_string(),
        category: category.to_string(),
        level,
        completed: true,
        date: Utc
            .with_ymd_and_hms(2025, 5, day, 0, 0, 0)
            .single()
            .unwrap_or_default(),
        kind: kind.to_string(),
        description: None,
        feedback: Some(feedback),
        emotion: None,
    }
}

/// Five completed experiences spanning all levels.
pub fn sample_experiences() -> Vec<Experience> {
    use ChallengeLevel::*;
    vec![
        sample(1, 15, "music", Petit, "Listened to jazz for the first time", "Art & Creative", Feedback::Positive),
        sample(2, 18, "place", Weekend, "Cafe hopping in the next town", "Social", Feedback::Positive),
        sample(3, 22, "skill", Adventure, "Intro to programming", "Learning & Reading", Feedback::Neutral),
        sample(4, 25, "art", Petit, "Tried watercolour painting", "Art & Creative", Feedback::Positive),
        sample(5, 27, "outdoor", Weekend, "Early morning run", "Nature & Outdoor", Feedback::Positive),
    ]
}

impl Journal {
    /// A journal pre-filled with `sample_experiences`.
    pub fn with_samples() -> Self {
        let mut journal = Self::new();
        for exp in sample_experiences() {
            // Ids are fixed and distinct, so this only logs `Recorded` events.
            journal.insert(exp);
        }
        journal.drain_events();
        journal
    }
}
