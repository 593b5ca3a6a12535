//! Orchestration chain: N dependent rewrites of one idea
//!
//! Iteration `i` receives exactly the output of iteration `i - 1` (the seed
//! for the first). Only the last output leaves the chain; intermediates are
//! logged at debug level and dropped.

use std::sync::Arc;

use tracing::{debug, info};

use super::{RunControl, Stage, StageError};
use crate::domain::{ChainConfig, IdeaText};
use crate::gateway::{GatewayError, ModelGateway, ModelRequest, OutputSchema};
use crate::prompts::{self, PromptLoader, embedded};

/// Input field carrying the idea being rewritten
pub const INPUT_FIELD: &str = "currentIdea";

/// 1-based position of the step in the chain
pub const STEP_FIELD: &str = "step";

/// Configured chain length
pub const TOTAL_STEPS_FIELD: &str = "totalSteps";

/// Output field carrying the rewritten idea
pub const OUTPUT_FIELD: &str = "nextIdea";

/// Progress through one chain; lives for a single `orchestrate` call
#[derive(Debug)]
struct ChainState {
    current_idea: IdeaText,
    steps_completed: u32,
}

impl ChainState {
    fn start(seed: IdeaText) -> Self {
        Self {
            current_idea: seed,
            steps_completed: 0,
        }
    }

    fn advance(self, next_idea: IdeaText) -> Self {
        Self {
            current_idea: next_idea,
            steps_completed: self.steps_completed + 1,
        }
    }
}

/// Runs the rewrite chain
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    template: String,
}

impl Orchestrator {
    /// Use the embedded prompt
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_template(gateway, embedded::ORCHESTRATE)
    }

    pub fn with_template(gateway: Arc<dyn ModelGateway>, template: impl Into<String>) -> Self {
        Self {
            gateway,
            template: template.into(),
        }
    }

    pub fn from_loader(gateway: Arc<dyn ModelGateway>, loader: &PromptLoader) -> eyre::Result<Self> {
        Ok(Self::with_template(gateway, loader.load(prompts::ORCHESTRATE)?))
    }

    /// Validate a raw seed and length, then run the chain
    ///
    /// A length outside `1..=10` or a blank seed fails with no model call.
    pub async fn orchestrate_raw(
        &self,
        seed: &str,
        chain_length: u32,
        control: &RunControl,
    ) -> Result<IdeaText, StageError> {
        debug!(%chain_length, "Orchestrator::orchestrate_raw: called");
        let config =
            ChainConfig::new(seed, chain_length).map_err(|e| StageError::invalid_input(Stage::Orchestrate, e))?;
        self.orchestrate(&config, control).await
    }

    /// Rewrite `config.seed_idea` exactly `config.chain_length` times
    ///
    /// Aborts on the first failing step with its 1-based iteration index.
    pub async fn orchestrate(&self, config: &ChainConfig, control: &RunControl) -> Result<IdeaText, StageError> {
        let total = config.chain_length.get();
        debug!(%total, "Orchestrator::orchestrate: called");
        info!("Running idea chain with {} step(s)", total);

        let mut state = ChainState::start(config.seed_idea.clone());
        while state.steps_completed < total {
            control.check(Stage::Orchestrate, state.steps_completed)?;

            let iteration = state.steps_completed + 1;
            let next = control
                .race(
                    Stage::Orchestrate,
                    state.steps_completed,
                    self.step(&state.current_idea, iteration, total),
                )
                .await?;

            debug!(%iteration, idea = %next, "Orchestrator::orchestrate: step complete");
            state = state.advance(next);
        }

        info!("Idea chain complete");
        Ok(state.current_idea)
    }

    /// One rewrite pass
    async fn step(&self, current: &IdeaText, iteration: u32, total: u32) -> Result<IdeaText, StageError> {
        debug!(%iteration, %total, "Orchestrator::step: called");
        let failed = |source: GatewayError| StageError::UpstreamModel {
            stage: Stage::Orchestrate,
            iteration: Some(iteration),
            source,
        };

        let request = ModelRequest::new(
            prompts::ORCHESTRATE,
            self.template.clone(),
            OutputSchema::single_string(OUTPUT_FIELD, "A new idea that builds on the current idea"),
        )
        .with_input(INPUT_FIELD, current.as_str())
        .with_input(STEP_FIELD, iteration.to_string())
        .with_input(TOTAL_STEPS_FIELD, total.to_string());

        let response = self.gateway.call(request).await.map_err(failed)?;
        let next = response.text(OUTPUT_FIELD).map_err(failed)?;
        IdeaText::new(next).map_err(|_| {
            failed(GatewayError::EmptyField {
                field: OUTPUT_FIELD.to_string(),
            })
        })
    }
}
