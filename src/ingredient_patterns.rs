//! # Ingredient Patterns Module
//!
//! This module contains the regex pattern and unit constants used by the grocery-list parser.

use lazy_static::lazy_static;
use regex::Regex;

// Leading quantity (decimal or simple fraction), optional alphabetic unit, then the item name.
// Digits are ASCII only: other scripts' digits stay part of the item text.
pub const INGREDIENT_LINE_PATTERN: &str = r"^([0-9]+(?:\.[0-9]+)?|[0-9]+/[0-9]+)\s*([a-zA-Z]+)?\s+(.*)";

/// Unit token used when a line carries a count but no unit ("2 eggs")
pub const DEFAULT_UNIT: &str = "pcs";

/// Quantity assumed when a line has no leading number ("salt")
pub const DEFAULT_QUANTITY: f64 = 1.0;

// Lazy static regex for the ingredient line pattern to avoid recompilation
lazy_static! {
    pub static ref INGREDIENT_LINE_REGEX: Regex =
        Regex::new(INGREDIENT_LINE_PATTERN).expect("Ingredient line pattern should be valid");
}
