//! Request dispatch and role discovery for task plugins.
//!
//! A task plugin fills up to four roles for its host: a configuration
//! provider, a validator, a view and an executor. The host talks to the
//! plugin through four fixed request names (`configuration`, `validate`,
//! `view`, `execute`) and expects every answer as a status code plus a JSON
//! body. This crate turns role components into that protocol.
//!
//! # Architecture
//!
//! Each role component is wrapped in an [`ApiCommand`](command::ApiCommand)
//! that decodes the request through a [`JsonCodec`](codec::JsonCodec), calls
//! the component, and normalises the outcome into an
//! [`ApiResponse`](protocol::ApiResponse). A [`DispatcherBuilder`] binds the
//! commands to request names and freezes them into an immutable
//! [`Dispatcher`]. [`discovery`] finds the components, either from an
//! explicit [`RoleManifest`] or from bindings registered with
//! [`task_role!`], and rejects plugins that register more than one
//! implementation of a role.
//!
//! # Example
//!
//! ```rust
//! use task_plugin_api::{ApiRequest, DispatcherBuilder, ResponseStatus};
//! use task_plugin_api::validation::{TaskValidator, ValidationErrors, property_value};
//! use task_plugin_api::codec::ParsedRequest;
//!
//! struct RequireUrl;
//!
//! impl TaskValidator for RequireUrl {
//!     fn validate(&self, properties: &ParsedRequest) -> ValidationErrors {
//!         let mut errors = ValidationErrors::new();
//!         if property_value(properties, "url").is_none() {
//!             errors.add("url", "URL must be provided");
//!         }
//!         errors
//!     }
//! }
//!
//! let dispatcher = DispatcherBuilder::new().with_validator(RequireUrl).build();
//! let response = dispatcher
//!     .dispatch(&ApiRequest::new("validate", "{}"))
//!     .expect("validate is bound");
//! assert_eq!(response.status(), ResponseStatus::ValidationFailed);
//! ```

pub mod codec;
pub mod command;
pub mod configuration;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod execution;
pub mod plugin;
pub mod protocol;
pub mod validation;
pub mod view;

#[cfg(test)]
mod tests;

#[doc(hidden)]
pub use inventory;

pub use self::codec::{JsonCodec, ParsedRequest, SerdeJsonCodec};
pub use self::discovery::{Role, RoleBinding, RoleManifest};
pub use self::dispatcher::{Dispatcher, DispatcherBuilder};
pub use self::error::{CodecError, DiscoveryError, PluginError, UnhandledRequest};
pub use self::plugin::{LazyTaskPlugin, TaskPlugin};
pub use self::protocol::{ApiRequest, ApiResponse, PluginIdentifier, ResponseStatus};
