use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

use watchful::alert::{AlertEvent, AlertLevel, AlertPhase, AlertWorkflow, ALERT_WORKFLOW};
use watchful::collaborators::{TracingExitHandler, TracingTransport};
use watchful::config::WatchfulConfig;
use watchful::engine::WorkflowError;
use watchful::telemetry::{create_workflow_span, init_telemetry};
use watchful::verification::{VerificationEvent, VerificationWorkflow, VERIFICATION_WORKFLOW};

#[derive(Parser)]
#[command(name = "watchful")]
#[command(about = "Replay user gestures against the verification and alert workflows")]
#[command(long_about = "Watchful drives the guarded workflows behind the identity-verification \
                       wizard and the emergency-alert composer. Each event is applied in order and \
                       the resulting snapshot is printed as one JSON line.")]
struct Cli {
    /// Configuration file (defaults to ./watchful.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the identity-verification wizard
    Verify {
        /// Events: submit:<idCard|addressProof|phoneNumber>, advance, back
        events: Vec<String>,
    },
    /// Run the emergency-alert composer
    Alert {
        /// Events: select:<emergency|unsafe|assistance>, confirm, cancel
        events: Vec<String>,
    },
    /// List alert levels with their display copy
    Levels,
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env has to be in the environment before the config layers are read
    let env_file = WatchfulConfig::load_env_file();
    let config = WatchfulConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_telemetry(&config.observability)?;
    match env_file {
        Ok(true) => info!("Loaded environment variables from .env file"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }

    match cli.command {
        Commands::Verify { events } => verify_command(&config, &events),
        Commands::Alert { events } => alert_command(&config, &events),
        Commands::Levels => levels_command(),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn verify_command(config: &WatchfulConfig, tokens: &[String]) -> Result<()> {
    let events = tokens
        .iter()
        .map(|token| {
            token
                .parse::<VerificationEvent>()
                .with_context(|| format!("Invalid verification event '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut workflow = VerificationWorkflow::new(Box::new(TracingExitHandler))
        .with_history_limit(config.workflow.history_limit);
    let span = create_workflow_span(VERIFICATION_WORKFLOW, workflow.session_id());
    let _entered = span.enter();

    print_line(&json!({ "event": "start", "snapshot": workflow.snapshot() }))?;
    for (token, event) in tokens.iter().zip(events) {
        let result = workflow.handle(event);
        print_outcome(token, result)?;
    }
    Ok(())
}

fn alert_command(config: &WatchfulConfig, tokens: &[String]) -> Result<()> {
    let events = tokens
        .iter()
        .map(|token| {
            token
                .parse::<AlertEvent>()
                .with_context(|| format!("Invalid alert event '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut workflow = AlertWorkflow::new(Box::new(TracingTransport), Box::new(TracingExitHandler))
        .with_pulse_period(config.alert.pulse_period())
        .with_history_limit(config.workflow.history_limit);
    let span = create_workflow_span(ALERT_WORKFLOW, workflow.session_id());
    let _entered = span.enter();

    print_line(&json!({ "event": "start", "snapshot": workflow.snapshot() }))?;
    for (token, event) in tokens.iter().zip(events) {
        let result = workflow.handle(event);
        print_outcome(token, result)?;
    }
    Ok(())
}

fn levels_command() -> Result<()> {
    for level in AlertLevel::ALL {
        print_line(&json!({
            "level": level,
            "label": level.label(),
            "color": level.color(),
            "confirm": level.info(AlertPhase::Confirm),
            "sent": level.info(AlertPhase::Sent),
        }))?;
    }
    Ok(())
}

fn print_outcome<S: Serialize>(token: &str, result: Result<S, WorkflowError>) -> Result<()> {
    match result {
        Ok(snapshot) => print_line(&json!({ "event": token, "snapshot": snapshot })),
        Err(e) => print_line(&json!({ "event": token, "error": e.to_string() })),
    }
}

fn print_line(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
