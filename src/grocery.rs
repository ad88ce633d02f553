//! # Grocery List Module
//!
//! Consolidates ingredient lines harvested from several recipes into a
//! deduplicated shopping list. Quantities are summed per `(item, unit)` key;
//! there is no unit conversion and no plural or synonym folding.
//!
//! ```rust
//! use growth_engine::grocery::aggregate_ingredients;
//!
//! let list = aggregate_ingredients(&["2 eggs", "200g rice", "3 eggs"]);
//! assert_eq!(list, vec!["200g rice".to_string(), "5 eggs".to_string()]);
//! ```

use log::{debug, info};
use std::collections::HashMap;

use crate::ingredient_model::{render_line, AggregationKey, Unit};
use crate::ingredient_parser::parse_ingredient;
use crate::recipe::Recipe;

/// Running totals of parsed ingredient lines, keyed by `(item, unit)`
#[derive(Debug, Clone, Default)]
pub struct GroceryList {
    totals: HashMap<AggregationKey, f64>,
}

impl GroceryList {
    /// Create an empty grocery list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line and add its quantity to the matching bucket
    ///
    /// Blank lines are ignored. Returns `true` when the line contributed.
    pub fn add_line(&mut self, line: &str) -> bool {
        match parse_ingredient(line) {
            Some(parsed) => {
                *self.totals.entry(parsed.key()).or_insert(0.0) += parsed.quantity;
                true
            }
            None => false,
        }
    }

    /// Number of distinct `(item, unit)` entries
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Summed quantity for an item in a given unit, if present
    pub fn quantity_of(&self, item: &str, unit: &Unit) -> Option<f64> {
        let key = AggregationKey {
            item: item.to_string(),
            unit: unit.clone(),
        };
        self.totals.get(&key).copied()
    }

    /// Render every entry and sort the lines lexicographically
    pub fn render(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .totals
            .iter()
            .map(|(key, qty)| render_line(*qty, &key.unit, &key.item))
            .collect();
        lines.sort();
        lines
    }
}

/// Merge ingredient lines into a sorted, quantity-summed shopping list
///
/// The output does not depend on the order of `lines`.
pub fn aggregate_ingredients<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut list = GroceryList::new();
    let mut skipped = 0;

    for line in lines {
        if !list.add_line(line.as_ref()) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        debug!("Skipped {} blank ingredient lines", skipped);
    }
    info!(
        "Aggregated {} ingredient lines into {} grocery entries",
        lines.len() - skipped,
        list.len()
    );

    list.render()
}

/// Split a multi-line ingredient block into trimmed, non-blank lines
pub fn ingredient_lines(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Gather the ingredient lines of the selected recipes, in selection order
///
/// Names that match no recipe are skipped. When several recipes share a
/// name, the first one wins.
pub fn collect_ingredient_lines(recipes: &[Recipe], selected: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();
    for name in selected {
        match recipes.iter().find(|recipe| recipe.name == *name) {
            Some(recipe) => lines.extend(ingredient_lines(&recipe.ingredients)),
            None => debug!("Selected recipe '{}' not found in vault", name),
        }
    }
    lines
}
