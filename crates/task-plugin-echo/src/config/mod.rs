//! Command-line configuration of the echo plugin bridge.

pub mod defaults;

use clap::Parser;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use self::defaults::DEFAULT_LOG_FILTER;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Settings of the bridge process.
///
/// Logs go to stderr; stdout carries protocol lines only.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "task-plugin-echo",
    about = "Serves the echo task plugin over JSON lines on stdin and stdout"
)]
pub struct BridgeConfig {
    /// Tracing filter directive, for example `info` or `task_plugin_api=debug`.
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
    /// Log output format: `json` or `compact`.
    #[arg(long, default_value_t = defaults::default_log_format())]
    log_format: LogFormat,
    /// Discover roles before reading input and exit if wiring is broken.
    ///
    /// Without this flag discovery runs on the first request and a failure
    /// is reported to the host in every reply.
    #[arg(long)]
    eager: bool,
}

impl BridgeConfig {
    /// Returns the tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns `true` when discovery runs at startup.
    #[must_use]
    pub const fn eager(&self) -> bool {
        self.eager
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: defaults::default_log_format(),
            eager: false,
        }
    }
}
