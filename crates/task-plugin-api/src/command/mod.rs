//! Commands adapting role components to the response envelope.
//!
//! Each request name the dispatcher knows is bound to one [`ApiCommand`].
//! A command decodes what it needs from the request, calls its role
//! component, and normalises the outcome into an [`ApiResponse`]. Commands
//! never fail: component faults and codec failures become `internal-error`
//! envelopes carrying an `exception` message, with full detail going to the
//! local log.

mod configuration;
mod execute;
mod validate;
mod view;

use std::fmt::Display;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::codec::JsonCodec;
use crate::protocol::{ApiRequest, ApiResponse, ResponseStatus};

pub use self::configuration::ConfigurationCommand;
pub use self::execute::ExecuteCommand;
pub use self::validate::ValidateCommand;
pub use self::view::ViewCommand;

/// Tracing target for command execution.
pub(crate) const COMMAND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::command");

/// A unit of work bound to one request name.
pub trait ApiCommand: Send + Sync {
    /// Serves the request, always producing an envelope.
    fn execute(&self, request: &ApiRequest) -> ApiResponse;
}

/// Serialises `body` and wraps it in an envelope with `status`.
///
/// Object keys keep their serialisation order. Falls back to an
/// `internal-error` envelope if the body cannot be serialised or encoded.
pub(crate) fn respond<T: Serialize + ?Sized>(
    codec: &dyn JsonCodec,
    status: ResponseStatus,
    body: &T,
) -> ApiResponse {
    let value = match serde_json::to_value(body) {
        Ok(value) => value,
        Err(source) => {
            error!(target: COMMAND_TARGET, error = %source, "failed to serialise response body");
            return exception(codec, source);
        }
    };
    encode(codec, status, &value)
}

/// Builds an `internal-error` envelope carrying `{"exception": message}`.
pub(crate) fn exception(codec: &dyn JsonCodec, message: impl Display) -> ApiResponse {
    encode(
        codec,
        ResponseStatus::InternalError,
        &json!({ "exception": message.to_string() }),
    )
}

fn encode(codec: &dyn JsonCodec, status: ResponseStatus, value: &Value) -> ApiResponse {
    match codec.encode(value) {
        Ok(text) => ApiResponse::new(status, text),
        Err(source) => {
            error!(target: COMMAND_TARGET, error = %source, "failed to encode response body");
            ApiResponse::new(ResponseStatus::InternalError, String::new())
        }
    }
}
