//! Executor role: runs the task for a build job.
//!
//! The host sends the job's execution context and the task's configured
//! parameters. The executor reports the outcome as an [`ExecutionResult`]
//! and writes progress to the job console through a [`JobConsole`].

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::codec::ParsedRequest;
use crate::error::PluginError;

/// Tracing target for job console output.
pub const CONSOLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::console");

/// Runs a task.
pub trait TaskExecutor: Send + Sync {
    /// Executes the task.
    ///
    /// Returning `Ok` with an unsuccessful [`ExecutionResult`] reports an
    /// expected task failure. Returning `Err` signals that the executor
    /// itself broke.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] when the task cannot be run at all.
    fn execute(
        &self,
        context: &ExecutionContext,
        config: &ExecutionConfiguration,
        console: &dyn JobConsole,
    ) -> Result<ExecutionResult, PluginError>;
}

impl TaskExecutor for Box<dyn TaskExecutor> {
    fn execute(
        &self,
        context: &ExecutionContext,
        config: &ExecutionConfiguration,
        console: &dyn JobConsole,
    ) -> Result<ExecutionResult, PluginError> {
        self.as_ref().execute(context, config, console)
    }
}

/// Sink for lines shown in the host's job console.
pub trait JobConsole: Send + Sync {
    /// Prints one line.
    fn print_line(&self, line: &str);
}

/// Console that emits every line as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl JobConsole for TracingConsole {
    fn print_line(&self, line: &str) {
        info!(target: CONSOLE_TARGET, "{line}");
    }
}

/// Console that writes lines to any writer.
///
/// Write failures are dropped: console output is best effort and must not
/// fail the task.
#[derive(Debug)]
pub struct WriterConsole<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterConsole<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer, even if a writer thread panicked.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> JobConsole for WriterConsole<W> {
    fn print_line(&self, line: &str) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(writer, "{line}").ok();
    }
}

/// Environment of the job the task runs in.
///
/// Read from the `context` entry of the execute request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    environment_variables: BTreeMap<String, String>,
    working_directory: Option<String>,
    raw: ParsedRequest,
}

impl ExecutionContext {
    /// Key holding the job's environment variables.
    pub const ENVIRONMENT_VARIABLES: &'static str = "environmentVariables";
    /// Key holding the job's working directory.
    pub const WORKING_DIRECTORY: &'static str = "workingDirectory";

    /// Builds a context from the decoded `context` map.
    ///
    /// Non-string environment values are rendered as JSON text.
    #[must_use]
    pub fn from_map(raw: ParsedRequest) -> Self {
        let environment_variables = raw
            .get(Self::ENVIRONMENT_VARIABLES)
            .and_then(Value::as_object)
            .map(|variables| {
                variables
                    .iter()
                    .map(|(name, value)| (name.clone(), value_to_string(value)))
                    .collect()
            })
            .unwrap_or_default();
        let working_directory = raw
            .get(Self::WORKING_DIRECTORY)
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            environment_variables,
            working_directory,
            raw,
        }
    }

    /// Returns the job's environment variables.
    #[must_use]
    pub const fn environment_variables(&self) -> &BTreeMap<String, String> {
        &self.environment_variables
    }

    /// Returns a single environment variable.
    #[must_use]
    pub fn environment_variable(&self, name: &str) -> Option<&str> {
        self.environment_variables.get(name).map(String::as_str)
    }

    /// Returns the job's working directory.
    #[must_use]
    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    /// Returns the undecoded context entries.
    #[must_use]
    pub const fn raw(&self) -> &ParsedRequest {
        &self.raw
    }
}

/// Configured parameter values of the task.
///
/// Read from the `config` entry of the execute request, where each
/// parameter is a map carrying a `value` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionConfiguration {
    raw: ParsedRequest,
}

impl ExecutionConfiguration {
    /// Builds a configuration from the decoded `config` map.
    #[must_use]
    pub const fn from_map(raw: ParsedRequest) -> Self {
        Self { raw }
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        crate::validation::property_value(&self.raw, name)
    }

    /// Returns the names of the configured parameters.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    /// Returns the undecoded parameter entries.
    #[must_use]
    pub const fn raw(&self) -> &ParsedRequest {
        &self.raw
    }
}

/// Outcome reported by an executor.
///
/// Serialises as `{"success", "message", "exception"}`; absent message and
/// exception are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    success: bool,
    message: Option<String>,
    exception: Option<String>,
}

impl ExecutionResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            exception: None,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            exception: None,
        }
    }

    /// Creates a failed result carrying a diagnostic for the failure cause.
    #[must_use]
    pub fn failure_with_exception(
        message: impl Into<String>,
        exception: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            exception: Some(exception.into()),
        }
    }

    /// Returns whether the task succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the failure diagnostic.
    #[must_use]
    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests;
