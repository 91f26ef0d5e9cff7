//! Tactic detection, tactic search and move selection for tactician.

pub mod config;
pub mod detect;
pub mod error;
pub mod record;
pub mod search;
pub mod selector;

pub use config::{Difficulty, DifficultyConfig, ParseDifficultyError};
pub use detect::detect;
pub use error::EngineError;
pub use record::TacticRecord;
pub use search::{SearchStats, TacticSearch};
pub use selector::TacticsEngine;
