use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when set. Logs go to stderr so
/// the CLI's JSON snapshots on stdout stay machine readable.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    if config.json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
    }

    tracing::debug!("Watchful telemetry initialized");
    Ok(())
}

/// Identifier for one workflow instance, carried on every log line it emits
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common workflow attributes
pub fn create_workflow_span(workflow: &str, session_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow_session",
        workflow = workflow,
        session.id = session_id,
    )
}
