//! Pipeline stages
//!
//! Three independently usable services, each written against
//! [`ModelGateway`](crate::gateway::ModelGateway):
//!
//! - [`Initiator`] - seed idea to refined idea (one call)
//! - [`Orchestrator`] - N dependent rewrites of an idea (N calls, strictly sequential)
//! - [`Synthesizer`] - list of ideas to one suggestion (one call)
//!
//! The usual recipe is initiate, then orchestrate from the refined idea,
//! then synthesize `[refined, chained]`. [`Pipeline`](crate::pipeline::Pipeline)
//! packages that order; nothing here enforces it.

mod control;
mod error;
mod initiate;
mod orchestrate;
mod synthesize;

pub use control::RunControl;
pub use error::{Stage, StageError};
pub use initiate::Initiator;
pub use orchestrate::Orchestrator;
pub use synthesize::Synthesizer;
