//! Request dispatch: the command table and the builder that assembles it.
//!
//! A [`DispatcherBuilder`] is used once at startup to bind role components
//! to request names. [`DispatcherBuilder::build`] freezes a snapshot of the
//! bindings into a [`Dispatcher`], which is immutable and safe to share
//! across the threads the host serves requests from.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::codec::{JsonCodec, SerdeJsonCodec};
use crate::command::{
    ApiCommand, ConfigurationCommand, ExecuteCommand, ValidateCommand, ViewCommand,
};
use crate::configuration::TaskConfiguration;
use crate::error::UnhandledRequest;
use crate::execution::{JobConsole, TaskExecutor, TracingConsole};
use crate::protocol::{ApiRequest, ApiResponse, request_names};
use crate::validation::TaskValidator;
use crate::view::{CachingView, TaskView};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

type CommandTable = HashMap<String, Arc<dyn ApiCommand>>;

/// Immutable mapping from request name to command.
///
/// # Example
///
/// ```
/// use task_plugin_api::configuration::{TaskConfiguration, TaskProperty};
/// use task_plugin_api::dispatcher::DispatcherBuilder;
/// use task_plugin_api::protocol::{ApiRequest, ResponseStatus, request_names};
/// use std::collections::BTreeMap;
///
/// struct NoParameters;
///
/// impl TaskConfiguration for NoParameters {
///     fn properties(&self) -> BTreeMap<String, TaskProperty> {
///         BTreeMap::new()
///     }
/// }
///
/// let dispatcher = DispatcherBuilder::new()
///     .with_configuration(NoParameters)
///     .build();
///
/// let response = dispatcher
///     .dispatch(&ApiRequest::without_body(request_names::CONFIGURATION))
///     .expect("configuration is handled");
/// assert_eq!(response.status(), ResponseStatus::Ok);
/// assert!(dispatcher.dispatch(&ApiRequest::without_body("view")).is_err());
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    commands: CommandTable,
}

impl Dispatcher {
    /// Resolves the command for the request and runs it.
    ///
    /// The command's envelope is returned unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledRequest`] when no command is bound to the request
    /// name, so the host can try another extension point.
    pub fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, UnhandledRequest> {
        let Some(command) = self.commands.get(request.name()) else {
            info!(
                target: DISPATCH_TARGET,
                request = request.name(),
                "no command found for request"
            );
            return Err(UnhandledRequest::new(request.name()));
        };

        info!(
            target: DISPATCH_TARGET,
            request = request.name(),
            "executing command for request"
        );
        Ok(command.execute(request))
    }

    /// Returns `true` when a command is bound to `request_name`.
    #[must_use]
    pub fn handles(&self, request_name: &str) -> bool {
        self.commands.contains_key(request_name)
    }

    /// Returns the bound request names in sorted order.
    #[must_use]
    pub fn request_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("requests", &self.request_names())
            .finish()
    }
}

/// Registration surface for assembling a [`Dispatcher`].
///
/// Each `with_*` method wraps a role component in its command and binds it
/// to the request name the role owns. Binding a name twice replaces the
/// earlier command.
pub struct DispatcherBuilder {
    codec: Arc<dyn JsonCodec>,
    console: Arc<dyn JobConsole>,
    commands: CommandTable,
}

impl DispatcherBuilder {
    /// Creates a builder using the `serde_json` codec and a console that
    /// forwards job output to `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_codec(Arc::new(SerdeJsonCodec), Arc::new(TracingConsole))
    }

    /// Creates a builder with an explicit codec and job console.
    #[must_use]
    pub fn with_codec(codec: Arc<dyn JsonCodec>, console: Arc<dyn JobConsole>) -> Self {
        Self {
            codec,
            console,
            commands: CommandTable::new(),
        }
    }

    /// Binds the `configuration` request to a configuration provider.
    #[must_use]
    pub fn with_configuration(self, configuration: impl TaskConfiguration + 'static) -> Self {
        let command = ConfigurationCommand::new(Arc::clone(&self.codec), configuration);
        self.with_command(request_names::CONFIGURATION, command)
    }

    /// Binds the `validate` request to a validator.
    #[must_use]
    pub fn with_validator(self, validator: impl TaskValidator + 'static) -> Self {
        let command = ValidateCommand::new(Arc::clone(&self.codec), validator);
        self.with_command(request_names::VALIDATE, command)
    }

    /// Binds the `view` request to a view whose template is loaded once.
    #[must_use]
    pub fn with_view(self, view: impl TaskView + 'static) -> Self {
        self.with_view_cached(view, true)
    }

    /// Binds the `view` request, optionally caching the template.
    #[must_use]
    pub fn with_view_cached(self, view: impl TaskView + 'static, cached: bool) -> Self {
        let codec = Arc::clone(&self.codec);
        if cached {
            self.with_command(
                request_names::VIEW,
                ViewCommand::new(codec, CachingView::new(view)),
            )
        } else {
            self.with_command(request_names::VIEW, ViewCommand::new(codec, view))
        }
    }

    /// Binds the `execute` request to an executor.
    #[must_use]
    pub fn with_executor(self, executor: impl TaskExecutor + 'static) -> Self {
        let command = ExecuteCommand::new(
            Arc::clone(&self.codec),
            executor,
            Arc::clone(&self.console),
        );
        self.with_command(request_names::EXECUTE, command)
    }

    /// Binds an arbitrary command to a request name.
    #[must_use]
    pub fn with_command(
        mut self,
        request_name: impl Into<String>,
        command: impl ApiCommand + 'static,
    ) -> Self {
        self.insert(request_name.into(), Arc::new(command));
        self
    }

    /// Returns `true` when a command is bound to `request_name`.
    #[must_use]
    pub fn handles(&self, request_name: &str) -> bool {
        self.commands.contains_key(request_name)
    }

    /// Freezes the current bindings into a dispatcher.
    ///
    /// The dispatcher holds its own copy of the table; later registrations
    /// on this builder do not affect it.
    #[must_use]
    pub fn build(&self) -> Dispatcher {
        Dispatcher {
            commands: self.commands.clone(),
        }
    }

    fn insert(&mut self, request_name: String, command: Arc<dyn ApiCommand>) {
        if self.commands.insert(request_name.clone(), command).is_some() {
            debug!(
                target: DISPATCH_TARGET,
                request = request_name.as_str(),
                "replacing previously registered command"
            );
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("DispatcherBuilder")
            .field("requests", &names)
            .finish_non_exhaustive()
    }
}
