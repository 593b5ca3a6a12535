//! Full pipeline driver
//!
//! Initiate the seed, run the chain from the refined idea, then synthesize
//! `[refined, chained]`. Each run gets a UUIDv7 id attached to its tracing
//! span.

use std::sync::Arc;

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::domain::{ChainConfig, ChainLength, IdeaSet, IdeaText, Suggestion};
use crate::gateway::ModelGateway;
use crate::prompts::PromptLoader;
use crate::stages::{Initiator, Orchestrator, RunControl, Stage, StageError, Synthesizer};

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub seed: IdeaText,
    pub chain_length: ChainLength,
    pub refined: IdeaText,
    pub chained: IdeaText,
    pub suggestion: Suggestion,
}

/// The three stages wired to one gateway
pub struct Pipeline {
    initiator: Initiator,
    orchestrator: Orchestrator,
    synthesizer: Synthesizer,
}

impl Pipeline {
    /// Stages with embedded prompts
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::from_stages(
            Initiator::new(gateway.clone()),
            Orchestrator::new(gateway.clone()),
            Synthesizer::new(gateway),
        )
    }

    /// Stages with prompts resolved through `loader`
    pub fn from_loader(gateway: Arc<dyn ModelGateway>, loader: &PromptLoader) -> eyre::Result<Self> {
        Ok(Self::from_stages(
            Initiator::from_loader(gateway.clone(), loader)?,
            Orchestrator::from_loader(gateway.clone(), loader)?,
            Synthesizer::from_loader(gateway, loader)?,
        ))
    }

    pub fn from_stages(initiator: Initiator, orchestrator: Orchestrator, synthesizer: Synthesizer) -> Self {
        Self {
            initiator,
            orchestrator,
            synthesizer,
        }
    }

    pub fn initiator(&self) -> &Initiator {
        &self.initiator
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Run all three stages in order
    ///
    /// Seed and chain length are validated before the first model call.
    pub async fn run(&self, seed: &str, chain_length: u32, control: &RunControl) -> Result<PipelineOutcome, StageError> {
        let run_id = Uuid::now_v7();
        let span = info_span!("pipeline", %run_id);
        self.run_inner(run_id, seed, chain_length, control).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        seed: &str,
        chain_length: u32,
        control: &RunControl,
    ) -> Result<PipelineOutcome, StageError> {
        debug!(%chain_length, seed_len = seed.len(), "Pipeline::run: called");
        let seed = IdeaText::new(seed).map_err(|e| StageError::invalid_input(Stage::Initiate, e))?;
        let length = ChainLength::new(chain_length).map_err(|e| StageError::invalid_input(Stage::Orchestrate, e))?;
        info!("Starting pipeline run (chain length {})", length);

        control.check(Stage::Initiate, 0)?;
        let refined = control
            .race(Stage::Initiate, 0, self.initiator.initiate(seed.as_str()))
            .await?;

        let config = ChainConfig::from_parts(refined.clone(), length);
        let chained = self.orchestrator.orchestrate(&config, control).await?;

        control.check(Stage::Synthesize, 0)?;
        let ideas = IdeaSet::new(vec![refined.clone(), chained.clone()])
            .map_err(|e| StageError::invalid_input(Stage::Synthesize, e))?;
        let suggestion = control
            .race(Stage::Synthesize, 0, self.synthesizer.synthesize(&ideas))
            .await?;

        info!("Pipeline run complete");
        Ok(PipelineOutcome {
            run_id,
            seed,
            chain_length: length,
            refined,
            chained,
            suggestion,
        })
    }
}
