//! Serves the `execute` request.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::codec::{JsonCodec, ParsedRequest};
use crate::execution::{ExecutionConfiguration, ExecutionContext, JobConsole, TaskExecutor};
use crate::protocol::{ApiRequest, ApiResponse, ResponseStatus};

use super::{ApiCommand, COMMAND_TARGET, exception, respond};

/// Key of the execution context in the request body.
const CONTEXT_KEY: &str = "context";
/// Key of the task parameters in the request body.
const CONFIG_KEY: &str = "config";

/// Runs the task and reports its outcome.
///
/// Two failure shapes reach the host, both with status `internal-error`:
/// an executor that *reports* failure yields the full
/// `{"success": false, "message", "exception"}` body, while an executor
/// that *returns an error* yields `{"exception": message}` only. Hosts tell
/// expected task failures from plugin defects by the body shape.
pub struct ExecuteCommand<E> {
    codec: Arc<dyn JsonCodec>,
    executor: E,
    console: Arc<dyn JobConsole>,
}

impl<E: TaskExecutor> ExecuteCommand<E> {
    /// Creates the command.
    #[must_use]
    pub fn new(codec: Arc<dyn JsonCodec>, executor: E, console: Arc<dyn JobConsole>) -> Self {
        Self {
            codec,
            executor,
            console,
        }
    }
}

impl<E: TaskExecutor> ApiCommand for ExecuteCommand<E> {
    fn execute(&self, request: &ApiRequest) -> ApiResponse {
        let mut parsed = match self.codec.decode(request.body()) {
            Ok(parsed) => parsed,
            Err(error) => {
                error!(target: COMMAND_TARGET, %error, "rejecting undecodable execute request");
                return exception(self.codec.as_ref(), error);
            }
        };
        let context = ExecutionContext::from_map(take_map(&mut parsed, CONTEXT_KEY));
        let config = ExecutionConfiguration::from_map(take_map(&mut parsed, CONFIG_KEY));

        match self
            .executor
            .execute(&context, &config, self.console.as_ref())
        {
            Ok(result) => {
                info!(
                    target: COMMAND_TARGET,
                    success = result.is_success(),
                    "task execution finished"
                );
                let status = if result.is_success() {
                    ResponseStatus::Ok
                } else {
                    ResponseStatus::InternalError
                };
                respond(self.codec.as_ref(), status, &result)
            }
            Err(source) => {
                error!(target: COMMAND_TARGET, error = ?source, "task executor failed");
                exception(self.codec.as_ref(), source)
            }
        }
    }
}

fn take_map(parsed: &mut ParsedRequest, key: &str) -> ParsedRequest {
    match parsed.remove(key) {
        Some(Value::Object(map)) => map,
        _ => ParsedRequest::new(),
    }
}
