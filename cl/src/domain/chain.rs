//! Chain configuration

use serde::Serialize;
use tracing::debug;

use super::{IdeaText, InputError};

/// Fewest rewrites a chain may perform
pub const MIN_CHAIN_LENGTH: u32 = 1;

/// Most rewrites a chain may perform
pub const MAX_CHAIN_LENGTH: u32 = 10;

/// Default number of rewrites
pub const DEFAULT_CHAIN_LENGTH: u32 = 3;

/// Number of dependent rewrite steps, always in `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ChainLength(u32);

impl ChainLength {
    pub fn new(value: u32) -> Result<Self, InputError> {
        debug!(%value, "ChainLength::new: called");
        if !(MIN_CHAIN_LENGTH..=MAX_CHAIN_LENGTH).contains(&value) {
            debug!(%value, "ChainLength::new: out of range");
            return Err(InputError::ChainLengthOutOfRange {
                value,
                min: MIN_CHAIN_LENGTH,
                max: MAX_CHAIN_LENGTH,
            });
        }
        Ok(Self(value))
    }

    /// Clamp into range instead of rejecting
    pub fn clamped(value: u32) -> Self {
        Self(value.clamp(MIN_CHAIN_LENGTH, MAX_CHAIN_LENGTH))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for ChainLength {
    fn default() -> Self {
        Self(DEFAULT_CHAIN_LENGTH)
    }
}

impl std::fmt::Display for ChainLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input to the orchestration chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainConfig {
    pub seed_idea: IdeaText,
    pub chain_length: ChainLength,
}

impl ChainConfig {
    /// Validate a raw seed and length
    pub fn new(seed_idea: impl AsRef<str>, chain_length: u32) -> Result<Self, InputError> {
        Ok(Self {
            seed_idea: IdeaText::new(seed_idea)?,
            chain_length: ChainLength::new(chain_length)?,
        })
    }

    pub fn from_parts(seed_idea: IdeaText, chain_length: ChainLength) -> Self {
        Self {
            seed_idea,
            chain_length,
        }
    }
}
