//! Validator role: checks task parameters before the host stores them.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::codec::ParsedRequest;

/// Validates the task parameters submitted by the host.
///
/// The whole parsed request is passed as the property map; each parameter
/// is itself a map carrying a `value` entry (see [`property_value`]).
pub trait TaskValidator: Send + Sync {
    /// Validates the properties, returning every problem found.
    fn validate(&self, properties: &ParsedRequest) -> ValidationErrors;
}

impl TaskValidator for Box<dyn TaskValidator> {
    fn validate(&self, properties: &ParsedRequest) -> ValidationErrors {
        self.as_ref().validate(properties)
    }
}

/// Ordered collection of `(field, message)` validation failures.
///
/// Serialises as a JSON object in insertion order. Adding a second message
/// for the same field replaces the first in place.
///
/// # Example
///
/// ```
/// use task_plugin_api::validation::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// assert!(!errors.has_errors());
/// errors.add("url", "URL must be provided");
/// assert!(errors.has_errors());
/// assert_eq!(errors.get("url"), Some("URL must be provided"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, String)>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records a failure for the given field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let name = field.into();
        let text = message.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((name, text)),
        }
    }

    /// Returns `true` when at least one failure was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the message recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Iterates over `(field, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, message) in &self.entries {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

/// Reads the `value` of a task parameter from a property map.
///
/// Returns `None` when the parameter is missing, is not a map, or its value
/// is not a string.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use task_plugin_api::validation::property_value;
///
/// let properties = json!({"url": {"value": "http://ci"}});
/// let properties = properties.as_object().expect("object");
/// assert_eq!(property_value(properties, "url"), Some("http://ci"));
/// assert_eq!(property_value(properties, "missing"), None);
/// ```
#[must_use]
pub fn property_value<'a>(properties: &'a ParsedRequest, name: &str) -> Option<&'a str> {
    properties
        .get(name)
        .and_then(|property| property.get("value"))
        .and_then(Value::as_str)
}
