//! Reference task plugin served over a JSON-lines bridge.
//!
//! The echo task writes a configured message to the job console. It fills
//! all four roles through the compile-time registry of `task-plugin-api`,
//! and the binary exposes it to a host process on stdin and stdout.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use task_plugin_echo::config::BridgeConfig;
//!
//! let mut input = Cursor::new(b"{\"request_name\":\"view\"}\n".to_vec());
//! let mut output = Vec::new();
//! let answered = task_plugin_echo::run(&BridgeConfig::default(), &mut input, &mut output)
//!     .expect("bridge runs");
//! assert_eq!(answered, 1);
//! ```

pub mod bridge;
pub mod config;
pub mod roles;
pub mod telemetry;

#[cfg(test)]
mod tests;

use std::io::{BufRead, Write};

use task_plugin_api::{DiscoveryError, LazyTaskPlugin, TaskPlugin};
use thiserror::Error;
use tracing::info;

use crate::bridge::{BridgeError, serve};
use crate::config::BridgeConfig;

/// Tracing target for process lifecycle events.
const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Errors that end the bridge process.
#[derive(Debug, Error)]
pub enum RunError {
    /// Eager discovery found mis-wired roles.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The bridge could not read requests or write replies.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Serves the echo plugin until `input` is exhausted.
///
/// With [`BridgeConfig::eager`] set, discovery runs before the first line is
/// read; otherwise it is deferred to the first request.
///
/// Returns the number of requests answered.
///
/// # Errors
///
/// Returns [`RunError::Discovery`] if eager discovery fails and
/// [`RunError::Bridge`] on I/O failures.
pub fn run(
    config: &BridgeConfig,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<usize, RunError> {
    let answered = if config.eager() {
        let plugin = TaskPlugin::discover(&roles::manifest())?;
        info!(
            target: LIFECYCLE_TARGET,
            requests = ?plugin.dispatcher().request_names(),
            "echo plugin ready"
        );
        serve(&plugin, input, output)?
    } else {
        serve(&LazyTaskPlugin::new(roles::manifest), input, output)?
    };
    Ok(answered)
}
