//! Log output for the binary.
//!
//! The libraries only know the `log` facade. Here those records are bridged
//! into `tracing` and printed together with the runner's spans.

use depot_core::ui::{BoundUiState, UiKey, UiSink};
use depot_utils::EntityId;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` isn't set.
pub const DEFAULT_FILTER: &str = "info";

/// Errors while installing the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Another `log` logger is already installed.
    #[error("failed to bridge log records: {0}")]
    Log(#[from] log::SetLoggerError),
    /// Another global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the global subscriber and routes `log` records into it.
pub fn init() -> Result<(), LoggerError> {
    LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false));
    set_global_default(subscriber)?;
    Ok(())
}

/// Writes every published interface state to the log as JSON.
#[derive(Debug, Default)]
pub struct LogSink;

impl UiSink for LogSink {
    fn publish(&mut self, receptacle: EntityId, key: UiKey, state: &BoundUiState) {
        match serde_json::to_string(state) {
            Ok(json) => tracing::debug!(%receptacle, ?key, state = %json, "ui state"),
            Err(e) => tracing::warn!(%receptacle, ?key, "Failed to serialize ui state: {e}"),
        }
    }

    fn closed(&mut self, receptacle: EntityId, key: UiKey, actor: EntityId) {
        tracing::debug!(%receptacle, ?key, %actor, "ui closed");
    }
}
