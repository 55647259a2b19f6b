//! Local challenge generation, used whenever the recommendation backend is
//! disabled or unreachable.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serenpaths_common::{Challenge, ChallengeLevel, UserPreferences};

/// A catalogue entry; turned into a `Challenge` on generation.
#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub title: &'static str,
    pub category: &'static str,
    pub kind: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub estimated_time: &'static str,
}

const PETIT: &[CatalogueEntry] = &[
    CatalogueEntry {
        title: "Take a different route home",
        category: "Lifestyle",
        kind: "lifestyle",
        icon: "MapPin",
        description: "New scenery and small discoveries are waiting for you",
        estimated_time: "15-30 min",
    },
    CatalogueEntry {
        title: "Listen to one song from a genre you never play",
        category: "Art & Creative",
        kind: "music",
        icon: "Music",
        description: "Meet a melody you would not have picked",
        estimated_time: "5 min",
    },
    CatalogueEntry {
        title: "Try a drink you have never had",
        category: "Food & Gourmet",
        kind: "food",
        icon: "Coffee",
        description: "Open a new door for your taste buds",
        estimated_time: "10 min",
    },
    CatalogueEntry {
        title: "Walk into a shop that caught your eye",
        category: "Social",
        kind: "social",
        icon: "Sparkles",
        description: "Chance encounters are waiting",
        estimated_time: "30 min",
    },
];

const WEEKEND: &[CatalogueEntry] = &[
    CatalogueEntry {
        title: "Scout out a cafe in the next town",
        category: "Social",
        kind: "social",
        icon: "Coffee",
        description: "Spend some time in an unfamiliar space",
        estimated_time: "1-2 h",
    },
    CatalogueEntry {
        title: "Join a one-off online lesson",
        category: "Learning & Reading",
        kind: "learning",
        icon: "BookOpen",
        description: "Learn something in a single sitting",
        estimated_time: "1-2 h",
    },
    CatalogueEntry {
        title: "Visit a local art museum or gallery",
        category: "Art & Creative",
        kind: "art",
        icon: "Palette",
        description: "Let someone else's work surprise you",
        estimated_time: "2-3 h",
    },
    CatalogueEntry {
        title: "Borrow a book from a genre you never read",
        category: "Learning & Reading",
        kind: "reading",
        icon: "Book",
        description: "The library shelf you always walk past",
        estimated_time: "1 h",
    },
];

const ADVENTURE: &[CatalogueEntry] = &[
    CatalogueEntry {
        title: "Day hike on a nearby mountain",
        category: "Nature & Outdoor",
        kind: "outdoor",
        icon: "Mountain",
        description: "A full day outside, far from screens",
        estimated_time: "4-6 h",
    },
    CatalogueEntry {
        title: "Read the first chapter of a programming primer",
        category: "Learning & Reading",
        kind: "tech",
        icon: "Code",
        description: "A first step into building things",
        estimated_time: "2-3 h",
    },
    CatalogueEntry {
        title: "Go to the cinema alone",
        category: "Entertainment",
        kind: "entertainment",
        icon: "Film",
        description: "A film chosen by nobody but you",
        estimated_time: "3 h",
    },
    CatalogueEntry {
        title: "Attend a workshop for a new hobby",
        category: "Art & Creative",
        kind: "creative",
        icon: "Sparkles",
        description: "Make something with your hands",
        estimated_time: "3-4 h",
    },
];

/// Catalogue for a level.
pub fn catalogue(level: ChallengeLevel) -> &'static [CatalogueEntry] {
    match level {
        ChallengeLevel::Petit => PETIT,
        ChallengeLevel::Weekend => WEEKEND,
        ChallengeLevel::Adventure => ADVENTURE,
    }
}

/// Seeded stand-in for the recommendation backend.
#[derive(Debug, Clone)]
pub struct LocalChallengeGenerator {
    rng: Pcg32,
}

impl LocalChallengeGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed from the wall clock.
    pub fn from_clock() -> Self {
        Self::new(chrono::Utc::now().timestamp_millis() as u64)
    }

    /// Pick a challenge for `level`, skipping avoided categories unless
    /// every entry of the level is avoided.
    pub fn generate(
        &mut self,
        level: ChallengeLevel,
        preferences: Option<&UserPreferences>,
    ) -> Challenge {
        let all = catalogue(level);
        let allowed: Vec<&CatalogueEntry> = all
            .iter()
            .filter(|e| preferences.is_none_or(|p| !p.avoids(e.category)))
            .collect();
        let pool: Vec<&CatalogueEntry> = if allowed.is_empty() {
            all.iter().collect()
        } else {
            allowed
        };
        let entry = pool[self.rng.random_range(0..pool.len())];
        tracing::debug!(level = level.as_u8(), title = entry.title, "local challenge generated");
        Challenge {
            id: Some(Challenge::local_id()),
            title: entry.title.to_string(),
            category: entry.category.to_string(),
            kind: entry.kind.to_string(),
            level,
            icon: Some(entry.icon.to_string()),
            description: Some(entry.description.to_string()),
            estimated_time: Some(entry.estimated_time.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_entries() {
        for level in ChallengeLevel::ALL {
            assert!(!catalogue(level).is_empty());
        }
    }

    #[test]
    fn generated_challenge_carries_level_and_local_id() {
        let mut g = LocalChallengeGenerator::new(1);
        for level in ChallengeLevel::ALL {
            let c = g.generate(level, None);
            assert_eq!(c.level, level);
            assert!(c.id.as_deref().is_some_and(|id| id.starts_with("local-")));
            assert!(catalogue(level).iter().any(|e| e.title == c.title));
        }
    }

    #[test]
    fn same_seed_same_titles() {
        let mut a = LocalChallengeGenerator::new(42);
        let mut b = LocalChallengeGenerator::new(42);
        for _ in 0..10 {
            let ca = a.generate(ChallengeLevel::Weekend, None);
            let cb = b.generate(ChallengeLevel::Weekend, None);
            assert_eq!(ca.title, cb.title);
        }
    }

    #[test]
    fn every_entry_is_reachable() {
        let mut g = LocalChallengeGenerator::new(5);
        let all = catalogue(ChallengeLevel::Adventure);
        let seen: std::collections::BTreeSet<String> = (0..200)
            .map(|_| g.generate(ChallengeLevel::Adventure, None).title)
            .collect();
        assert_eq!(seen.len(), all.len());
    }

    #[test]
    fn avoided_categories_are_skipped() {
        let prefs = UserPreferences {
            avoid_categories: vec!["Learning & Reading".into()],
            ..UserPreferences::default()
        };
        let mut g = LocalChallengeGenerator::new(7);
        for _ in 0..50 {
            let c = g.generate(ChallengeLevel::Weekend, Some(&prefs));
            assert_ne!(c.category, "Learning & Reading");
        }
    }

    #[test]
    fn avoiding_everything_still_yields_a_challenge() {
        let prefs = UserPreferences {
            avoid_categories: catalogue(ChallengeLevel::Petit)
                .iter()
                .map(|e| e.category.to_string())
                .collect(),
            ..UserPreferences::default()
        };
        let mut g = LocalChallengeGenerator::new(3);
        let c = g.generate(ChallengeLevel::Petit, Some(&prefs));
        assert_eq!(c.level, ChallengeLevel::Petit);
    }
}
