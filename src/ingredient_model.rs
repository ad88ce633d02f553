//! # Ingredient Data Model
//!
//! This module defines the data structures produced by the heuristic grocery-list parser.
//!
//! ## Core Concepts
//!
//! - **ParsedIngredient**: a `(quantity, unit, item)` triple read from one free-text line
//! - **Unit**: a normalized unit token (`g`, `kg`, `ml`, `l`, `pcs`) or a verbatim passthrough
//! - **AggregationKey**: the `(item, unit)` pair used to merge quantities across recipes
//!
//! ## Usage
//!
//! ```rust
//! use growth_engine::ingredient_model::{ParsedIngredient, Unit};
//!
//! let eggs = ParsedIngredient::new(2.0, Unit::Pieces, "eggs");
//! assert_eq!(eggs.to_string(), "2 eggs");
//!
//! let chicken = ParsedIngredient::new(200.0, Unit::from_token("grams"), "chicken breast");
//! assert_eq!(chicken.to_string(), "200g chicken breast");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ingredient_patterns::DEFAULT_UNIT;

/// One ingredient line after parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Non-negative amount; `1.0` when the line had no leading number
    pub quantity: f64,

    /// Normalized unit of the amount
    pub unit: Unit,

    /// Remaining noun phrase, trimmed and lower-cased (e.g., "chicken breast")
    pub item: String,
}

/// Measurement units recognized by the grocery list
///
/// Only metric weights and volumes are normalized. Anything else the parser
/// finds after the quantity ("cup", "tbsp", "large") is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    /// Grams
    Grams,
    /// Kilograms
    Kilograms,
    /// Milliliters
    Milliliters,
    /// Liters
    Liters,
    /// Unitless count (the default)
    Pieces,
    /// Unrecognized unit token, stored lower-cased
    Other(String),
}

/// Key under which quantities are summed: identical item text and identical unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregationKey {
    pub item: String,
    pub unit: Unit,
}

impl Unit {
    /// Normalize a raw unit token found after a quantity
    ///
    /// An empty token means the line had no unit and maps to [`Unit::Pieces`].
    pub fn from_token(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "" => Unit::Pieces,
            "g" | "gram" | "grams" => Unit::Grams,
            "kg" | "kilogram" => Unit::Kilograms,
            "ml" => Unit::Milliliters,
            "l" | "liter" => Unit::Liters,
            t if t == DEFAULT_UNIT => Unit::Pieces,
            _ => Unit::Other(token),
        }
    }

    /// Canonical token rendered in the grocery list
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Milliliters => "ml",
            Unit::Liters => "l",
            Unit::Pieces => DEFAULT_UNIT,
            Unit::Other(token) => token,
        }
    }

    /// Whether this is the unitless count
    pub fn is_count(&self) -> bool {
        matches!(self, Unit::Pieces)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParsedIngredient {
    /// Create a parsed ingredient from its parts
    pub fn new(quantity: f64, unit: Unit, item: &str) -> Self {
        Self {
            quantity,
            unit,
            item: item.to_string(),
        }
    }

    /// The `(item, unit)` key this ingredient merges under
    pub fn key(&self) -> AggregationKey {
        AggregationKey {
            item: self.item.clone(),
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for ParsedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_line(self.quantity, &self.unit, &self.item))
    }
}

/// Render one grocery-list line: `"{qty} {item}"` for counts, `"{qty}{unit} {item}"` otherwise
pub fn render_line(quantity: f64, unit: &Unit, item: &str) -> String {
    let qty = format_quantity(quantity);
    if unit.is_count() {
        format!("{qty} {item}")
    } else {
        format!("{qty}{unit} {item}")
    }
}

/// Significant digits kept when rendering a quantity
const SIGNIFICANT_DIGITS: i32 = 6;

/// Format a quantity with at most six significant digits and no trailing zeros
///
/// Mirrors the classic `%g` conversion: fixed notation for exponents in
/// `-4..6`, scientific notation (`1.5e+06`) outside that range.
///
/// ```rust
/// use growth_engine::ingredient_model::format_quantity;
///
/// assert_eq!(format_quantity(5.0), "5");
/// assert_eq!(format_quantity(0.5), "0.5");
/// assert_eq!(format_quantity(0.1 + 0.2), "0.3");
/// ```
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Exponent after rounding to the kept precision, so 9999999 becomes 1e+07
    let precision = (SIGNIFICANT_DIGITS - 1) as usize;
    let scientific = format!("{value:.precision$e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (scientific.clone(), 0),
    };

    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{value:.decimals$}"))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(&mantissa),
            sign,
            exponent.abs()
        )
    }
}

fn strip_trailing_zeros(number: &str) -> String {
    if number.contains('.') {
        number
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        number.to_string()
    }
}
