//! # Ingredient Parser
//!
//! This module turns free-text ingredient lines into `(quantity, unit, item)` triples.
//! It is a heuristic, best-effort parser: every non-empty line yields a result.
//!
//! ## Features
//!
//! - Leading decimal quantities (`2`, `2.5`) and simple fractions (`1/2`)
//! - Optional unit glued to or separated from the number (`200g`, `200 g`)
//! - Metric unit normalization (`grams` -> `g`, `liter` -> `l`), other units kept verbatim
//! - Lines without a number fall back to one unitless piece of the whole line
//!
//! ## Usage
//!
//! ```rust
//! use growth_engine::ingredient_parser::parse_ingredient;
//! use growth_engine::ingredient_model::Unit;
//!
//! let parsed = parse_ingredient("200g chicken breast").unwrap();
//! assert_eq!(parsed.quantity, 200.0);
//! assert_eq!(parsed.unit, Unit::Grams);
//! assert_eq!(parsed.item, "chicken breast");
//! ```

use log::{debug, trace};

use crate::ingredient_model::{ParsedIngredient, Unit};
use crate::ingredient_patterns::{DEFAULT_QUANTITY, INGREDIENT_LINE_REGEX};

/// Parse a single ingredient line
///
/// Returns `None` only for empty or whitespace-only input.
pub fn parse_ingredient(line: &str) -> Option<ParsedIngredient> {
    let line = line.trim().to_lowercase();
    if line.is_empty() {
        return None;
    }

    if let Some(captures) = INGREDIENT_LINE_REGEX.captures(&line) {
        let qty_str = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let unit_str = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        let item = captures.get(3).map(|m| m.as_str()).unwrap_or_default();

        if let Some(quantity) = parse_quantity(qty_str) {
            let parsed = ParsedIngredient::new(quantity, Unit::from_token(unit_str), item.trim());
            trace!("Parsed ingredient line '{}' -> {:?}", line, parsed);
            return Some(parsed);
        }

        debug!(
            "Unusable quantity '{}' in line '{}', falling back to whole line",
            qty_str, line
        );
    }

    // No leading quantity: the whole line is one piece of the item
    Some(ParsedIngredient::new(DEFAULT_QUANTITY, Unit::Pieces, &line))
}

/// Parse a quantity token: a decimal number or a simple `n/d` fraction
///
/// Returns `None` for a zero denominator so the caller can fall back.
fn parse_quantity(qty_str: &str) -> Option<f64> {
    if let Some((numerator, denominator)) = qty_str.split_once('/') {
        let numerator: f64 = numerator.parse().ok()?;
        let denominator: f64 = denominator.parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator);
    }

    qty_str.parse::<f64>().ok()
}
