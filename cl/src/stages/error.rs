//! Stage error types

use std::fmt;

use thiserror::Error;

use crate::domain::InputError;
use crate::gateway::GatewayError;

/// Which stage produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initiate,
    Orchestrate,
    Synthesize,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Initiate => "initiate",
            Stage::Orchestrate => "orchestrate",
            Stage::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors returned by stage operations
///
/// None of these are recovered inside a stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// Caller input broke a precondition; no model call was made
    #[error("{stage}: invalid input: {source}")]
    InvalidInput {
        stage: Stage,
        #[source]
        source: InputError,
    },

    /// The gateway failed or returned the wrong shape
    #[error("{stage}: model call failed{}: {source}", at_iteration(.iteration))]
    UpstreamModel {
        stage: Stage,
        /// 1-based chain iteration, for the orchestration chain only
        iteration: Option<u32>,
        #[source]
        source: GatewayError,
    },

    /// The caller cancelled the run
    #[error("{stage}: cancelled after {steps_completed} completed step(s)")]
    Cancelled { stage: Stage, steps_completed: u32 },

    /// The caller's deadline passed between chain iterations
    #[error("{stage}: deadline exceeded after {steps_completed} completed step(s)")]
    DeadlineExceeded { stage: Stage, steps_completed: u32 },
}

fn at_iteration(iteration: &Option<u32>) -> String {
    iteration.map(|i| format!(" at iteration {}", i)).unwrap_or_default()
}

impl StageError {
    pub fn invalid_input(stage: Stage, source: InputError) -> Self {
        StageError::InvalidInput { stage, source }
    }

    pub fn upstream(stage: Stage, source: GatewayError) -> Self {
        StageError::UpstreamModel {
            stage,
            iteration: None,
            source,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            StageError::InvalidInput { stage, .. }
            | StageError::UpstreamModel { stage, .. }
            | StageError::Cancelled { stage, .. }
            | StageError::DeadlineExceeded { stage, .. } => *stage,
        }
    }

    /// Failing chain iteration, if this is a chain upstream failure
    pub fn iteration(&self) -> Option<u32> {
        match self {
            StageError::UpstreamModel { iteration, .. } => *iteration,
            _ => None,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, StageError::InvalidInput { .. })
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, StageError::UpstreamModel { .. })
    }

    /// Run stopped by the caller (cancel or deadline)
    pub fn is_interrupted(&self) -> bool {
        matches!(self, StageError::Cancelled { .. } | StageError::DeadlineExceeded { .. })
    }
}
