//! Prompt Template System
//!
//! Loads `.pmt` (prompt template) files for the three pipeline stages.
//!
//! Template loading chain:
//! 1. `prompts.dir` from config, else `.collablab/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (repo default)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax; the gateway renders them against each
//! request's input fields.

pub mod embedded;
mod loader;

pub use loader::PromptLoader;

/// Template for the initiation stage
pub const INITIATE: &str = "initiate";

/// Template for one orchestration chain step
pub const ORCHESTRATE: &str = "orchestrate";

/// Template for the synthesis stage
pub const SYNTHESIZE: &str = "synthesize";
