//! Domain errors raised by the dispatch layer and by role components.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. Construction-time faults
//! ([`DiscoveryError`]) are kept apart from request-time faults
//! ([`PluginError`], [`CodecError`], [`UnhandledRequest`]) because the host
//! treats them very differently: the former abort startup, the latter become
//! response envelopes.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::discovery::Role;

/// Faults raised by role components while serving a request.
///
/// A component returns this error when it cannot produce its result at all.
/// The command layer converts it into an `internal-error` envelope carrying
/// only the display message.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// A task-level failure raised by plugin code.
    #[error("{message}")]
    Task {
        /// Human-readable failure description.
        message: String,
    },

    /// A view template could not be loaded.
    #[error("the view template '{}' could not be loaded: {source}", path.display())]
    Template {
        /// Path of the template that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    /// Creates a task-level error with the given message.
    #[must_use]
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// Creates a template load error.
    #[must_use]
    pub fn template(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Template {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// Errors raised by a [`JsonCodec`](crate::codec::JsonCodec).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value tree could not be rendered as JSON text.
    #[error("failed to encode response body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request text was not valid JSON.
    #[error("failed to decode request body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request text was valid JSON but not an object.
    #[error("request body must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },
}

/// Fatal wiring faults detected while discovering role implementations.
///
/// These are raised once, before any request is served. The process should
/// not continue with a partially wired dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// More than one implementation was registered for the same role.
    #[error("could not instantiate {role} types, more than one has been registered: [{}]", candidates.join(", "))]
    Ambiguous {
        /// Role with conflicting registrations.
        role: Role,
        /// Type names of every candidate, in manifest order.
        candidates: Vec<String>,
    },

    /// The registered type does not fulfil the contract of its role.
    #[error("the type {type_name} registered as {role} does not implement the required type {expected}")]
    Incompatible {
        /// Type name of the offending registration.
        type_name: String,
        /// Role it was registered under.
        role: Role,
        /// Contract the role requires.
        expected: &'static str,
    },

    /// The component factory failed to produce an instance.
    #[error("could not instantiate {type_name} registered as {role}: {message}")]
    Instantiation {
        /// Type name of the registration.
        type_name: String,
        /// Role it was registered under.
        role: Role,
        /// Factory failure description.
        message: String,
    },
}

/// Raised when no command is registered for a request name.
///
/// This is an expected condition: the host may route the request to another
/// extension point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unhandled request type: {request_name}")]
pub struct UnhandledRequest {
    /// The request name that had no matching command.
    pub request_name: String,
}

impl UnhandledRequest {
    /// Creates an unhandled-request condition for the given name.
    #[must_use]
    pub fn new(request_name: impl Into<String>) -> Self {
        Self {
            request_name: request_name.into(),
        }
    }
}
