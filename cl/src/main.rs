//! CollabLab - sequential LLM idea refinement
//!
//! CLI entry point for running the pipeline or any single stage.

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use collablab::cli::{Cli, Command, OutputFormat, get_log_path};
use collablab::config::Config;
use collablab::gateway::{LlmGateway, ModelGateway};
use collablab::llm::create_client;
use collablab::pipeline::{Pipeline, PipelineOutcome};
use collablab::prompts::PromptLoader;
use collablab::stages::{RunControl, Stage, StageError};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        "CollabLab loaded config: provider={} model={}",
        config.llm.provider, config.llm.model
    );

    let pipeline = build_pipeline(&config)?;
    let control = build_control(&config, &cli.command);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run {
            idea,
            chain_length,
            verbose,
            format,
            ..
        } => {
            let n = chain_length.unwrap_or(config.pipeline.chain_length);
            debug!(%n, verbose, %format, "main: matched Run command");
            match pipeline.run(&idea, n, &control).await {
                Ok(outcome) => print_outcome(&outcome, verbose, &format)?,
                Err(e) => return Ok(report_failure(&[idea], &e)),
            }
        }
        Command::Initiate { idea } => {
            debug!("main: matched Initiate command");
            match control
                .race(Stage::Initiate, 0, pipeline.initiator().initiate(&idea))
                .await
            {
                Ok(refined) => println!("{}", refined),
                Err(e) => return Ok(report_failure(&[idea], &e)),
            }
        }
        Command::Orchestrate { idea, chain_length } => {
            let n = chain_length.unwrap_or(config.pipeline.chain_length);
            debug!(%n, "main: matched Orchestrate command");
            match pipeline.orchestrator().orchestrate_raw(&idea, n, &control).await {
                Ok(chained) => println!("{}", chained),
                Err(e) => return Ok(report_failure(&[idea], &e)),
            }
        }
        Command::Synthesize { ideas } => {
            debug!(count = ideas.len(), "main: matched Synthesize command");
            match control
                .race(Stage::Synthesize, 0, pipeline.synthesizer().synthesize_raw(&ideas))
                .await
            {
                Ok(suggestion) => println!("{}", suggestion),
                Err(e) => return Ok(report_failure(&ideas, &e)),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Wire config to a pipeline backed by the configured LLM provider
fn build_pipeline(config: &Config) -> Result<Pipeline> {
    debug!("build_pipeline: called");
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let gateway: Arc<dyn ModelGateway> = Arc::new(LlmGateway::new(llm).with_max_tokens(config.llm.max_tokens));

    let base = std::env::current_dir().context("Failed to read current directory")?;
    let loader = PromptLoader::new(&base, config.prompts.dir.as_deref());
    Pipeline::from_loader(gateway, &loader)
}

/// Ctrl-C cancels the run; `--deadline-ms` beats `pipeline.deadline-ms`
fn build_control(config: &Config, command: &Command) -> RunControl {
    debug!("build_control: called");
    let mut control = RunControl::new();

    let cli_deadline = match command {
        Command::Run { deadline_ms, .. } => *deadline_ms,
        _ => None,
    };
    if let Some(ms) = cli_deadline.or(config.pipeline.deadline_ms) {
        debug!(%ms, "build_control: deadline set");
        control = control.with_timeout(Duration::from_millis(ms));
    }

    let token = control.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, cancelling run");
            token.cancel();
        }
    });

    control
}

fn print_outcome(outcome: &PipelineOutcome, verbose: bool, format: &OutputFormat) -> Result<()> {
    debug!(run_id = %outcome.run_id, verbose, %format, "print_outcome: called");
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if verbose {
                println!("{}", "Refined idea:".cyan().bold());
                println!("{}\n", outcome.refined);
                println!("{} {}", "Chained idea".cyan().bold(), format!("({} steps):", outcome.chain_length).cyan());
                println!("{}\n", outcome.chained);
                println!("{}", "Suggestion:".green().bold());
            }
            println!("{}", outcome.suggestion);
        }
    }
    Ok(())
}

/// Tell the user what failed and hand their input back so they can retry
fn report_failure(input: &[String], err: &StageError) -> ExitCode {
    warn!(error = %err, "report_failure: run failed");
    eprintln!("{} {}", "Failed to generate idea:".red().bold(), err);
    for idea in input {
        eprintln!("{} {}", "Your idea:".yellow(), idea);
    }
    if err.is_interrupted() {
        ExitCode::from(130)
    } else {
        ExitCode::FAILURE
    }
}
