//! Host protocol types: requests, response envelopes and status codes.
//!
//! The host invokes the plugin with a request name and a raw body. Every
//! handled request produces an [`ApiResponse`]: a status code drawn from
//! [`ResponseStatus`] plus JSON body text. Request names recognised by the
//! dispatcher live in [`request_names`].

use serde::{Deserialize, Serialize};

/// Request names fixed by contract with the host.
pub mod request_names {
    /// Asks for the task's configuration parameters.
    pub const CONFIGURATION: &str = "configuration";
    /// Asks the plugin to validate a set of task parameters.
    pub const VALIDATE: &str = "validate";
    /// Asks for the task's display value and settings template.
    pub const VIEW: &str = "view";
    /// Asks the plugin to run the task.
    pub const EXECUTE: &str = "execute";

    /// All recognised request names.
    pub const ALL: [&str; 4] = [CONFIGURATION, VALIDATE, VIEW, EXECUTE];
}

/// Request sent by the host.
///
/// # Example
///
/// ```
/// use task_plugin_api::protocol::{ApiRequest, request_names};
///
/// let request = ApiRequest::new(request_names::VALIDATE, r#"{"url":{"value":"x"}}"#);
/// assert_eq!(request.name(), "validate");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiRequest {
    name: String,
    #[serde(default)]
    body: String,
}

impl ApiRequest {
    /// Creates a request with the given name and raw body.
    #[must_use]
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Creates a request without a body.
    #[must_use]
    pub fn without_body(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    /// Returns the request name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the raw request body.
    #[must_use]
    pub const fn body(&self) -> &str {
        self.body.as_str()
    }
}

/// Status codes carried by response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The request was served successfully.
    Ok,
    /// Task parameters failed validation.
    ValidationFailed,
    /// The request was not recognised.
    NotFound,
    /// A view or execution fault occurred.
    InternalError,
}

impl ResponseStatus {
    /// Returns the numeric code reported to the host.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::ValidationFailed => 412,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    /// Maps a numeric code back to a status, if it is one of ours.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            412 => Some(Self::ValidationFailed),
            404 => Some(Self::NotFound),
            500 => Some(Self::InternalError),
            _ => None,
        }
    }
}

/// Response envelope returned to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: ResponseStatus,
    body: String,
}

impl ApiResponse {
    /// Creates an envelope with the given status and encoded body.
    #[must_use]
    pub fn new(status: ResponseStatus, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status.code()
    }

    /// Returns the encoded JSON body.
    #[must_use]
    pub const fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Consumes the envelope, returning `(status code, body)`.
    #[must_use]
    pub fn into_parts(self) -> (u16, String) {
        (self.status.code(), self.body)
    }
}

/// Identifies the extension point and API versions a plugin speaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginIdentifier {
    extension: String,
    versions: Vec<String>,
}

impl PluginIdentifier {
    /// Extension name for task plugins.
    pub const TASK_EXTENSION: &'static str = "task";

    /// API version spoken by default.
    pub const DEFAULT_VERSION: &'static str = "1.0";

    /// Creates an identifier for the given extension and versions.
    #[must_use]
    pub fn new(extension: impl Into<String>, versions: Vec<String>) -> Self {
        Self {
            extension: extension.into(),
            versions,
        }
    }

    /// Returns the extension name.
    #[must_use]
    pub const fn extension(&self) -> &str {
        self.extension.as_str()
    }

    /// Returns the supported API versions.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }
}

impl Default for PluginIdentifier {
    fn default() -> Self {
        Self::new(Self::TASK_EXTENSION, vec![Self::DEFAULT_VERSION.to_owned()])
    }
}
