//! Host-facing entry points.
//!
//! [`TaskPlugin`] owns a ready dispatcher and answers host requests.
//! [`LazyTaskPlugin`] defers discovery to the first request and runs it
//! exactly once, remembering the outcome for the plugin's lifetime.

use std::fmt;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::codec::SerdeJsonCodec;
use crate::command::exception;
use crate::discovery::{RoleManifest, discover};
use crate::dispatcher::Dispatcher;
use crate::error::{DiscoveryError, UnhandledRequest};
use crate::protocol::{ApiRequest, ApiResponse, PluginIdentifier};

/// Tracing target for host adapter operations.
const PLUGIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::plugin");

/// A task plugin with its dispatcher already wired.
#[derive(Debug, Clone)]
pub struct TaskPlugin {
    dispatcher: Dispatcher,
    identifier: PluginIdentifier,
}

impl TaskPlugin {
    /// Wraps a dispatcher, advertising the task extension point.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            identifier: PluginIdentifier::default(),
        }
    }

    /// Runs discovery over `manifest` and wraps the resulting dispatcher.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] if the manifest is mis-wired.
    pub fn discover(manifest: &RoleManifest) -> Result<Self, DiscoveryError> {
        discover(manifest).map(Self::new)
    }

    /// Answers a host request.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledRequest`] when the request name is not bound, so
    /// the host can route it elsewhere.
    pub fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, UnhandledRequest> {
        debug!(
            target: PLUGIN_TARGET,
            request = request.name(),
            body_len = request.body().len(),
            "received host request"
        );
        self.dispatcher.dispatch(request)
    }

    /// Returns the extension point and versions this plugin serves.
    #[must_use]
    pub const fn identifier(&self) -> &PluginIdentifier {
        &self.identifier
    }

    /// Returns the underlying dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// A task plugin that discovers its roles on first use.
///
/// The manifest source runs at most once, even when the first requests
/// arrive concurrently. A discovery failure is remembered: every later
/// request is answered with an `internal-error` envelope carrying the
/// failure message, and discovery is not retried.
pub struct LazyTaskPlugin<F> {
    manifest: F,
    identifier: PluginIdentifier,
    state: OnceCell<Result<TaskPlugin, DiscoveryError>>,
}

impl<F> LazyTaskPlugin<F>
where
    F: Fn() -> RoleManifest + Send + Sync,
{
    /// Creates a plugin whose roles come from `manifest` when first needed.
    #[must_use]
    pub fn new(manifest: F) -> Self {
        Self {
            manifest,
            identifier: PluginIdentifier::default(),
            state: OnceCell::new(),
        }
    }

    /// Answers a host request, running discovery first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledRequest`] when discovery succeeded and the request
    /// name is not bound.
    pub fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, UnhandledRequest> {
        match self.plugin() {
            Ok(plugin) => plugin.handle(request),
            Err(failure) => {
                debug!(
                    target: PLUGIN_TARGET,
                    request = request.name(),
                    "rejecting request, discovery failed"
                );
                Ok(exception(&SerdeJsonCodec, failure))
            }
        }
    }

    /// Returns the discovered plugin, running discovery on first call.
    ///
    /// # Errors
    ///
    /// Returns the remembered [`DiscoveryError`] when discovery failed.
    pub fn plugin(&self) -> Result<&TaskPlugin, &DiscoveryError> {
        self.state
            .get_or_init(|| {
                debug!(target: PLUGIN_TARGET, "running deferred role discovery");
                TaskPlugin::discover(&(self.manifest)()).inspect_err(|failure| {
                    debug!(
                        target: PLUGIN_TARGET,
                        error = %failure,
                        "remembering discovery failure"
                    );
                })
            })
            .as_ref()
    }

    /// Returns `true` once discovery has run, whatever its outcome.
    #[must_use]
    pub fn is_discovered(&self) -> bool {
        self.state.get().is_some()
    }

    /// Returns the extension point and versions this plugin serves.
    #[must_use]
    pub const fn identifier(&self) -> &PluginIdentifier {
        &self.identifier
    }
}

impl<F> fmt::Debug for LazyTaskPlugin<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTaskPlugin")
            .field("identifier", &self.identifier)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
