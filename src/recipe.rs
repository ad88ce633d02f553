//! Recipe vault model: validation, tags and name search.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted recipe name, in characters
pub const MAX_RECIPE_NAME_LENGTH: usize = 255;

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "Name")]
    pub name: String,
    /// Comma-separated category labels
    #[serde(rename = "Tags", default)]
    pub tags: String,
    /// One ingredient per line, e.g. "2 eggs\n200g chicken"
    #[serde(rename = "Ingredients", default)]
    pub ingredients: String,
    #[serde(rename = "Instructions", default)]
    pub instructions: String,
}

/// Categories offered when filing a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeTag {
    HighProtein,
    LowCarb,
    Quick,
    MealPrep,
}

impl RecipeTag {
    pub const ALL: [RecipeTag; 4] = [
        RecipeTag::HighProtein,
        RecipeTag::LowCarb,
        RecipeTag::Quick,
        RecipeTag::MealPrep,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecipeTag::HighProtein => "High Protein",
            RecipeTag::LowCarb => "Low Carb",
            RecipeTag::Quick => "Quick",
            RecipeTag::MealPrep => "Meal Prep",
        }
    }

    /// Look a tag up by its label, ignoring case
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for RecipeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Join tags into the stored `Tags` column value
pub fn join_tags(tags: &[RecipeTag]) -> String {
    tags.iter()
        .map(|tag| tag.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Recipe {
    /// Build a recipe, validating its name
    ///
    /// Ingredients are required: a recipe without them is useless for the grocery list.
    pub fn new(
        name: &str,
        tags: &[RecipeTag],
        ingredients: &str,
        instructions: &str,
    ) -> Result<Self, &'static str> {
        let name = validate_recipe_name(name)?;
        if ingredients.trim().is_empty() {
            return Err("no_ingredients");
        }
        Ok(Self {
            name,
            tags: join_tags(tags),
            ingredients: ingredients.to_string(),
            instructions: instructions.to_string(),
        })
    }

    /// Tags parsed back from the stored column; unknown labels are dropped
    pub fn tag_list(&self) -> Vec<RecipeTag> {
        self.tags
            .split(',')
            .filter_map(RecipeTag::from_label)
            .collect()
    }
}

/// Validates a recipe name input
pub fn validate_recipe_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > MAX_RECIPE_NAME_LENGTH {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Recipes whose name contains `query`, ignoring case
///
/// An empty query returns every recipe.
pub fn search_recipes<'a>(recipes: &'a [Recipe], query: &str) -> Vec<&'a Recipe> {
    let query = query.trim().to_lowercase();
    recipes
        .iter()
        .filter(|recipe| recipe.name.to_lowercase().contains(&query))
        .collect()
}
