//! Structured telemetry for the bridge process.
//!
//! Protocol replies own stdout, so every event goes to stderr. The first
//! successful [`initialise`] call fixes the log format for the life of the
//! process; later calls report that format back instead of reinstalling.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

use crate::config::{BridgeConfig, LogFormat};

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the bridge subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Returns the format chosen when the subscriber was installed.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The `--log-filter` directive does not parse.
    #[error("invalid log filter '{directive}': {message}")]
    Filter {
        /// Directive as supplied.
        directive: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the stderr subscriber on first call.
///
/// # Errors
///
/// Returns a [`TelemetryError`] if the filter is invalid or another
/// subscriber is already installed.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use task_plugin_echo::config::{BridgeConfig, LogFormat};
/// use task_plugin_echo::telemetry;
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let json = BridgeConfig::parse_from(["task-plugin-echo"]);
/// let compact = BridgeConfig::parse_from(["task-plugin-echo", "--log-format", "compact"]);
///
/// let first = telemetry::initialise(&json)?;
/// let second = telemetry::initialise(&compact)?;
/// assert_eq!(second.format(), LogFormat::Json);
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &BridgeConfig) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED_FORMAT
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config, io::stderr, io::stderr().is_terminal())?;
            tracing::subscriber::set_global_default(subscriber)?;
            Ok::<_, TelemetryError>(config.log_format())
        })
        .map(|format| TelemetryHandle { format: *format })
}

/// Parses the configured filter directive.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the directive is malformed.
pub fn log_filter(config: &BridgeConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        directive: config.log_filter().to_owned(),
        message: error.to_string(),
    })
}

/// Builds the bridge subscriber over any writer without installing it.
pub(crate) fn build_subscriber<W>(
    config: &BridgeConfig,
    writer: W,
    ansi: bool,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = fmt::Subscriber::builder()
        .with_env_filter(log_filter(config)?)
        .with_target(true)
        .with_level(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
