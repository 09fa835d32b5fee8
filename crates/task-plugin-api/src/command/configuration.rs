//! Serves the `configuration` request.

use std::sync::Arc;

use crate::codec::JsonCodec;
use crate::configuration::TaskConfiguration;
use crate::protocol::{ApiRequest, ApiResponse, ResponseStatus};

use super::{ApiCommand, respond};

/// Returns the task's declared parameters.
///
/// The request body is ignored. The response body maps every parameter name
/// to its attribute map.
pub struct ConfigurationCommand<C> {
    codec: Arc<dyn JsonCodec>,
    configuration: C,
}

impl<C: TaskConfiguration> ConfigurationCommand<C> {
    /// Creates the command.
    #[must_use]
    pub fn new(codec: Arc<dyn JsonCodec>, configuration: C) -> Self {
        Self {
            codec,
            configuration,
        }
    }
}

impl<C: TaskConfiguration> ApiCommand for ConfigurationCommand<C> {
    fn execute(&self, _request: &ApiRequest) -> ApiResponse {
        respond(
            self.codec.as_ref(),
            ResponseStatus::Ok,
            &self.configuration.properties(),
        )
    }
}
