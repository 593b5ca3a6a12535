//! Synthesis stage: many ideas to one suggestion

use std::sync::Arc;

use tracing::{debug, info};

use super::{Stage, StageError};
use crate::domain::{IdeaSet, IdeaText, Suggestion};
use crate::gateway::{GatewayError, ModelGateway, ModelRequest, OutputSchema};
use crate::prompts::{self, PromptLoader, embedded};

/// Input field carrying the list of ideas
pub const INPUT_FIELD: &str = "ideas";

/// Output field carrying the merged suggestion
pub const OUTPUT_FIELD: &str = "suggestion";

/// Merges an ordered set of ideas with one model call
pub struct Synthesizer {
    gateway: Arc<dyn ModelGateway>,
    template: String,
}

impl Synthesizer {
    /// Use the embedded prompt
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_template(gateway, embedded::SYNTHESIZE)
    }

    pub fn with_template(gateway: Arc<dyn ModelGateway>, template: impl Into<String>) -> Self {
        Self {
            gateway,
            template: template.into(),
        }
    }

    pub fn from_loader(gateway: Arc<dyn ModelGateway>, loader: &PromptLoader) -> eyre::Result<Self> {
        Ok(Self::with_template(gateway, loader.load(prompts::SYNTHESIZE)?))
    }

    /// Build the idea set from raw strings and synthesize
    ///
    /// Blank entries are dropped; nothing left means `InvalidInput` and no call.
    pub async fn synthesize_raw<S: AsRef<str>>(&self, ideas: &[S]) -> Result<Suggestion, StageError> {
        debug!(count = ideas.len(), "Synthesizer::synthesize_raw: called");
        let set = IdeaSet::from_strings(ideas).map_err(|e| StageError::invalid_input(Stage::Synthesize, e))?;
        self.synthesize(&set).await
    }

    pub async fn synthesize(&self, ideas: &IdeaSet) -> Result<Suggestion, StageError> {
        debug!(count = ideas.len(), "Synthesizer::synthesize: called");
        info!("Synthesizing {} idea(s)", ideas.len());

        let request = ModelRequest::new(
            prompts::SYNTHESIZE,
            self.template.clone(),
            OutputSchema::single_string(OUTPUT_FIELD, "One coherent suggestion combining the best of every idea"),
        )
        .with_input(INPUT_FIELD, ideas.to_strings());

        let response = self
            .gateway
            .call(request)
            .await
            .map_err(|e| StageError::upstream(Stage::Synthesize, e))?;
        let suggestion = response
            .text(OUTPUT_FIELD)
            .map_err(|e| StageError::upstream(Stage::Synthesize, e))?;

        IdeaText::new(suggestion).map_err(|_| {
            StageError::upstream(
                Stage::Synthesize,
                GatewayError::EmptyField {
                    field: OUTPUT_FIELD.to_string(),
                },
            )
        })
    }
}
