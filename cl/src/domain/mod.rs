//! Domain types for the idea pipeline
//!
//! Immutable value records handed from stage to stage. Constructors enforce
//! the invariants, so a stage holding one of these never needs to re-check.

mod chain;
mod idea;

pub use chain::{ChainConfig, ChainLength, DEFAULT_CHAIN_LENGTH, MAX_CHAIN_LENGTH, MIN_CHAIN_LENGTH};
pub use idea::{IdeaSet, IdeaText, Suggestion};

use thiserror::Error;

/// Caller input that violates a stage precondition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("idea is empty after trimming whitespace")]
    EmptyIdea,

    #[error("chain length {value} is outside {min}..={max}")]
    ChainLengthOutOfRange { value: u32, min: u32, max: u32 },

    #[error("idea set contains no non-empty ideas")]
    EmptyIdeaSet,
}
