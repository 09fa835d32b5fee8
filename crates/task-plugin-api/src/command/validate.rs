//! Serves the `validate` request.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::codec::JsonCodec;
use crate::protocol::{ApiRequest, ApiResponse, ResponseStatus};
use crate::validation::{TaskValidator, ValidationErrors};

use super::{ApiCommand, COMMAND_TARGET, exception, respond};

#[derive(Serialize)]
struct FailureBody<'a> {
    errors: &'a ValidationErrors,
}

/// Validates the submitted task parameters.
///
/// The whole decoded body is the property map. No errors yields `ok` with
/// an empty object; otherwise `validation-failed` with
/// `{"errors": {field: message}}`.
pub struct ValidateCommand<V> {
    codec: Arc<dyn JsonCodec>,
    validator: V,
}

impl<V: TaskValidator> ValidateCommand<V> {
    /// Creates the command.
    #[must_use]
    pub fn new(codec: Arc<dyn JsonCodec>, validator: V) -> Self {
        Self { codec, validator }
    }
}

impl<V: TaskValidator> ApiCommand for ValidateCommand<V> {
    fn execute(&self, request: &ApiRequest) -> ApiResponse {
        let properties = match self.codec.decode(request.body()) {
            Ok(properties) => properties,
            Err(error) => {
                warn!(target: COMMAND_TARGET, %error, "rejecting undecodable validate request");
                return exception(self.codec.as_ref(), error);
            }
        };

        let errors = self.validator.validate(&properties);
        if errors.has_errors() {
            debug!(target: COMMAND_TARGET, count = errors.len(), "validation failed");
            respond(
                self.codec.as_ref(),
                ResponseStatus::ValidationFailed,
                &FailureBody { errors: &errors },
            )
        } else {
            respond(self.codec.as_ref(), ResponseStatus::Ok, &json!({}))
        }
    }
}
