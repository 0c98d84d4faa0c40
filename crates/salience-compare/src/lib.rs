//! Salience Compare - Entity alignment and comparison tables
//!
//! Aligns entities by name across up to three texts, ranks them by the
//! mean of their per-text salience, and renders the result for display.

pub mod engine;
pub mod render;

pub use engine::{
    align, build_comparison, format_score, mean_score, round_score, ComparisonRow,
    ComparisonTable, ScoredEntity, TableRow, TextEntitySet,
};
pub use render::{render, render_or_message, OutputFormat, NO_ENTITIES_MESSAGE};
