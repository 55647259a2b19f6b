//! Experience categories and their normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of categories the app understands.
///
/// Experiences store their category as free text (whatever the backend or the
/// user supplied); `Category::normalize` maps that text onto this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Lifestyle,
    ArtCreative,
    FoodGourmet,
    Social,
    LearningReading,
    NatureOutdoor,
    SportsFitness,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Lifestyle,
        Category::ArtCreative,
        Category::FoodGourmet,
        Category::Social,
        Category::LearningReading,
        Category::NatureOutdoor,
        Category::SportsFitness,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Lifestyle => "Lifestyle",
            Category::ArtCreative => "Art & Creative",
            Category::FoodGourmet => "Food & Gourmet",
            Category::Social => "Social",
            Category::LearningReading => "Learning & Reading",
            Category::NatureOutdoor => "Nature & Outdoor",
            Category::SportsFitness => "Sports & Fitness",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    /// Hue (degrees) used for the category's theme colour.
    pub fn hue(self) -> f32 {
        match self {
            Category::Lifestyle => 30.0,
            Category::ArtCreative => 280.0,
            Category::FoodGourmet => 50.0,
            Category::Social => 330.0,
            Category::LearningReading => 210.0,
            Category::NatureOutdoor => 120.0,
            Category::SportsFitness => 170.0,
            Category::Entertainment => 0.0,
            Category::Other => 200.0,
        }
    }

    /// Map free-text category onto a known category.
    ///
    /// Exact (case-insensitive) label match wins, then a containment match in
    /// either direction, then `Other`. Empty input is `Other`.
    pub fn normalize(raw: &str) -> Category {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return Category::Other;
        }
        if let Some(exact) = Self::ALL
            .iter()
            .find(|c| c.label().to_lowercase() == needle)
        {
            return *exact;
        }
        Self::ALL
            .iter()
            .find(|c| {
                let label = c.label().to_lowercase();
                label.contains(&needle) || needle.contains(&label)
            })
            .copied()
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
