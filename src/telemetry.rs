use crate::config::ObservabilityConfig;
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize tracing for a single provisioning run.
/// RUST_LOG wins over the configured level. Logs go to stderr so stdout only carries the run summary.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("Telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one run
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create the span every step of a provisioning run is recorded under
pub fn create_provision_span(domain: &str, run_id: &str) -> tracing::Span {
    tracing::info_span!(
        "provision_run",
        domain = domain,
        run.id = run_id,
        otel.kind = "internal"
    )
}
