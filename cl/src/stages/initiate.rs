//! Initiation stage: seed idea to refined idea

use std::sync::Arc;

use tracing::{debug, info};

use super::{Stage, StageError};
use crate::domain::IdeaText;
use crate::gateway::{ModelGateway, ModelRequest, OutputSchema};
use crate::prompts::{self, PromptLoader, embedded};

/// Input field carrying the seed idea
pub const INPUT_FIELD: &str = "initialIdea";

/// Output field carrying the refined idea
pub const OUTPUT_FIELD: &str = "refinedIdea";

/// Refines a raw seed idea with exactly one model call
pub struct Initiator {
    gateway: Arc<dyn ModelGateway>,
    template: String,
}

impl Initiator {
    /// Use the embedded prompt
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_template(gateway, embedded::INITIATE)
    }

    pub fn with_template(gateway: Arc<dyn ModelGateway>, template: impl Into<String>) -> Self {
        Self {
            gateway,
            template: template.into(),
        }
    }

    pub fn from_loader(gateway: Arc<dyn ModelGateway>, loader: &PromptLoader) -> eyre::Result<Self> {
        Ok(Self::with_template(gateway, loader.load(prompts::INITIATE)?))
    }

    /// Refine `seed` into one improved statement
    ///
    /// Blank seeds fail before any model call.
    pub async fn initiate(&self, seed: &str) -> Result<IdeaText, StageError> {
        debug!(seed_len = seed.len(), "Initiator::initiate: called");
        let seed = IdeaText::new(seed).map_err(|e| StageError::invalid_input(Stage::Initiate, e))?;

        info!("Refining seed idea");
        let request = ModelRequest::new(
            prompts::INITIATE,
            self.template.clone(),
            OutputSchema::single_string(OUTPUT_FIELD, "The seed idea rewritten as a single improved statement"),
        )
        .with_input(INPUT_FIELD, seed.as_str());

        let response = self
            .gateway
            .call(request)
            .await
            .map_err(|e| StageError::upstream(Stage::Initiate, e))?;

        let refined = response
            .text(OUTPUT_FIELD)
            .map_err(|e| StageError::upstream(Stage::Initiate, e))?;
        let refined = IdeaText::new(refined).map_err(|_| {
            StageError::upstream(
                Stage::Initiate,
                crate::gateway::GatewayError::EmptyField {
                    field: OUTPUT_FIELD.to_string(),
                },
            )
        })?;

        debug!(refined = %refined, "Initiator::initiate: refined");
        Ok(refined)
    }
}
