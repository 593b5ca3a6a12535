//! CollabLab - sequential LLM idea refinement
//!
//! Takes a short free-text idea and improves it through three dependent
//! stages, each a call to a language model behind one gateway trait.
//!
//! # Core Concepts
//!
//! - **Initiation**: rewrite the raw seed as one clearer statement
//! - **Orchestration Chain**: N rewrites, each consuming the previous output
//! - **Synthesis**: merge several ideas into one final suggestion
//! - **Gateway**: every model call goes through [`gateway::ModelGateway`], so
//!   stages can be tested against a stub
//!
//! # Modules
//!
//! - [`domain`] - Idea values and chain configuration
//! - [`gateway`] - Model call gateway trait and LLM-backed implementation
//! - [`llm`] - Anthropic/OpenAI completion clients
//! - [`stages`] - The three stages, run control and stage errors
//! - [`pipeline`] - Convenience driver for the full recipe
//! - [`prompts`] - Prompt template loading
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod stages;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PipelineConfig};
pub use domain::{ChainConfig, ChainLength, IdeaSet, IdeaText, InputError, Suggestion};
pub use gateway::{GatewayError, LlmGateway, ModelGateway, ModelRequest, ModelResponse, OutputSchema};
pub use llm::{LlmClient, LlmError, create_client};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use prompts::PromptLoader;
pub use stages::{Initiator, Orchestrator, RunControl, Stage, StageError, Synthesizer};
