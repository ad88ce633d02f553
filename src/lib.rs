//! # Growth Engine
//!
//! Personal habit tracking and meal planning: a daily audit log with habit
//! streaks, a recipe vault that merges ingredient lists into one grocery
//! list, and AI helpers that transcribe voice notes and turn workout
//! descriptions into structured records.

pub mod ai;
pub mod analytics;
pub mod audit;
pub mod circuit_breaker;
pub mod config;
pub mod grocery;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod ingredient_patterns;
pub mod quotes;
pub mod recipe;
pub mod store;
pub mod streaks;
pub mod timer;
pub mod workout;

pub use grocery::aggregate_ingredients;
pub use streaks::calculate_streaks;
