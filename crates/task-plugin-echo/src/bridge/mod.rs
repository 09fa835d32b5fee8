//! JSON-lines bridge between a host process and a task plugin.
//!
//! Each input line is one host request:
//! `{"request_name": "validate", "body": "<JSON text>"}`. The `body` field
//! is optional. Each request is answered with exactly one output line:
//!
//! - `{"status": 200, "body": "<JSON text>"}` when a command ran;
//! - `{"status": 404, "unhandled": "<name>"}` when no command is bound;
//! - `{"status": 500, "body": "{\"exception\":...}"}` when the line is not
//!   a valid request.
//!
//! Blank lines are skipped. The bridge stops at end of input.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::json;
use task_plugin_api::protocol::{ApiRequest, ApiResponse, ResponseStatus};
use task_plugin_api::{LazyTaskPlugin, RoleManifest, TaskPlugin, UnhandledRequest};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Tracing target for bridge operations.
const BRIDGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bridge");

/// Answers host requests on behalf of the bridge.
#[cfg_attr(test, mockall::automock)]
pub trait RequestHandler {
    /// Serves one request.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledRequest`] when no command is bound to the name.
    fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, UnhandledRequest>;
}

impl RequestHandler for TaskPlugin {
    fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, UnhandledRequest> {
        Self::handle(self, request)
    }
}

impl<F> RequestHandler for LazyTaskPlugin<F>
where
    F: Fn() -> RoleManifest + Send + Sync,
{
    fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, UnhandledRequest> {
        Self::handle(self, request)
    }
}

/// Errors that stop the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Reading the next request line failed.
    #[error("failed to read host request: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Writing a reply line failed.
    #[error("failed to write host reply: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Serialising a reply failed.
    #[error("failed to serialise host reply: {source}")]
    Serialize {
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct HostRequest {
    request_name: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum HostReply {
    Handled { status: u16, body: String },
    Unhandled { status: u16, unhandled: String },
}

impl HostReply {
    fn handled(response: ApiResponse) -> Self {
        let (status, body) = response.into_parts();
        Self::Handled { status, body }
    }

    fn unhandled(missing: UnhandledRequest) -> Self {
        Self::Unhandled {
            status: ResponseStatus::NotFound.code(),
            unhandled: missing.request_name,
        }
    }

    fn malformed(message: &str) -> Self {
        Self::Handled {
            status: ResponseStatus::InternalError.code(),
            body: json!({ "exception": message }).to_string(),
        }
    }
}

/// Serves request lines from `input` until end of input.
///
/// Returns the number of requests answered.
///
/// # Errors
///
/// Returns a [`BridgeError`] if reading input or writing a reply fails.
pub fn serve(
    handler: &impl RequestHandler,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<usize, BridgeError> {
    let mut answered = 0;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = input
            .read_line(&mut line)
            .map_err(|source| BridgeError::Read { source })?;
        if bytes_read == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let reply = answer(handler, text);
        write_reply(output, &reply)?;
        answered += 1;
    }

    info!(target: BRIDGE_TARGET, answered, "host input closed");
    Ok(answered)
}

fn answer(handler: &impl RequestHandler, line: &str) -> HostReply {
    let request = match serde_json::from_str::<HostRequest>(line) {
        Ok(request) => ApiRequest::new(request.request_name, request.body),
        Err(error) => {
            warn!(target: BRIDGE_TARGET, %error, "discarding malformed host request");
            return HostReply::malformed(&format!("invalid host request: {error}"));
        }
    };

    match handler.handle(&request) {
        Ok(response) => {
            debug!(
                target: BRIDGE_TARGET,
                request = request.name(),
                status = response.status_code(),
                "answered host request"
            );
            HostReply::handled(response)
        }
        Err(missing) => HostReply::unhandled(missing),
    }
}

fn write_reply(output: &mut impl Write, reply: &HostReply) -> Result<(), BridgeError> {
    let payload =
        serde_json::to_string(reply).map_err(|source| BridgeError::Serialize { source })?;
    output
        .write_all(payload.as_bytes())
        .map_err(|source| BridgeError::Write { source })?;
    output
        .write_all(b"\n")
        .map_err(|source| BridgeError::Write { source })?;
    output
        .flush()
        .map_err(|source| BridgeError::Write { source })
}
