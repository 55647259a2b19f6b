//! Aggregate statistics over a user's experiences.
//!
//! Category strings are normalized onto `Category::ALL` before counting, so
//! "art & creative" and "Art & Creative" land in the same bucket.

use std::collections::BTreeMap;
use std::fmt;

use serenpaths_common::{Category, Experience, Feedback};

const FAVORITES: usize = 3;
const RECENT: usize = 5;
/// Reported for a user with no experiences yet.
const NEUTRAL_DIVERSITY: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub total: usize,
    pub completed: usize,
    pub ongoing: usize,
    /// Distinct categories tried over the number of known categories, in `[0, 1]`.
    pub diversity_score: f32,
    /// Most frequent categories, most frequent first.
    pub favorite_categories: Vec<Category>,
    /// Categories of the last few experiences, oldest first.
    pub recent_categories: Vec<Category>,
    /// Categories never tried.
    pub unexplored_categories: Vec<Category>,
    pub category_counts: BTreeMap<&'static str, usize>,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl UserStats {
    /// Experiences are expected in creation order.
    pub fn from_experiences(experiences: &[Experience]) -> Self {
        let categories: Vec<Category> = experiences
            .iter()
            .map(|e| Category::normalize(&e.category))
            .collect();

        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for c in &categories {
            *counts.entry(c.label()).or_default() += 1;
        }

        // Ties resolve in `Category::ALL` order.
        let mut ranked: Vec<(Category, usize)> = Category::ALL
            .iter()
            .filter_map(|c| counts.get(c.label()).map(|n| (*c, *n)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let diversity_score = if experiences.is_empty() {
            NEUTRAL_DIVERSITY
        } else {
            (ranked.len() as f32 / Category::ALL.len() as f32).min(1.0)
        };

        let feedback_count =
            |want: Feedback| experiences.iter().filter(|e| e.feedback == Some(want)).count();

        Self {
            total: experiences.len(),
            completed: experiences.iter().filter(|e| e.completed).count(),
            ongoing: experiences.iter().filter(|e| e.is_ongoing()).count(),
            diversity_score,
            favorite_categories: ranked.iter().take(FAVORITES).map(|(c, _)| *c).collect(),
            recent_categories: categories[categories.len().saturating_sub(RECENT)..].to_vec(),
            unexplored_categories: Category::ALL
                .iter()
                .filter(|c| !counts.contains_key(c.label()))
                .copied()
                .collect(),
            category_counts: counts,
            positive: feedback_count(Feedback::Positive),
            neutral: feedback_count(Feedback::Neutral),
            negative: feedback_count(Feedback::Negative),
        }
    }
}

impl fmt::Display for UserStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |cs: &[Category]| {
            if cs.is_empty() {
                "-".to_string()
            } else {
                cs.iter().map(|c| c.label()).collect::<Vec<_>>().join(", ")
            }
        };
        writeln!(
            f,
            "Experiences: {} ({} completed, {} ongoing)",
            self.total, self.completed, self.ongoing
        )?;
        writeln!(f, "Diversity: {:.2}", self.diversity_score)?;
        writeln!(f, "Favorites: {}", join(&self.favorite_categories))?;
        writeln!(f, "Recent: {}", join(&self.recent_categories))?;
        writeln!(f, "Unexplored: {}", join(&self.unexplored_categories))?;
        write!(
            f,
            "Feedback: +{} ={} -{}",
            self.positive, self.neutral, self.negative
        )
    }
}
