//! Serves the `view` request.

use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::codec::JsonCodec;
use crate::protocol::{ApiRequest, ApiResponse, ResponseStatus};
use crate::view::TaskView;

use super::{ApiCommand, COMMAND_TARGET, exception, respond};

/// Returns the task's display value and settings template.
pub struct ViewCommand<V> {
    codec: Arc<dyn JsonCodec>,
    view: V,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewBody {
    display_value: String,
    template: String,
}

impl<V: TaskView> ViewCommand<V> {
    /// Creates the command.
    #[must_use]
    pub fn new(codec: Arc<dyn JsonCodec>, view: V) -> Self {
        Self { codec, view }
    }
}

impl<V: TaskView> ApiCommand for ViewCommand<V> {
    fn execute(&self, _request: &ApiRequest) -> ApiResponse {
        let display_value = self.view.display_value();
        match self.view.template() {
            Ok(template) => respond(
                self.codec.as_ref(),
                ResponseStatus::Ok,
                &ViewBody {
                    display_value,
                    template,
                },
            ),
            Err(source) => {
                error!(target: COMMAND_TARGET, error = ?source, "view template unavailable");
                exception(self.codec.as_ref(), source)
            }
        }
    }
}
