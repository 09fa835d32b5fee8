//! Configuration role: the parameters a task declares to the host.
//!
//! A [`TaskConfiguration`] returns one [`TaskProperty`] per parameter name.
//! Plugins usually declare their parameters as an enumeration implementing
//! [`ConfigurationEnum`]; [`EnumConfiguration`] turns every member of such an
//! enumeration into one parameter.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Provides the configuration parameters of a task.
pub trait TaskConfiguration: Send + Sync {
    /// Returns the declared parameters keyed by name.
    fn properties(&self) -> BTreeMap<String, TaskProperty>;
}

impl TaskConfiguration for Box<dyn TaskConfiguration> {
    fn properties(&self) -> BTreeMap<String, TaskProperty> {
        self.as_ref().properties()
    }
}

/// Attributes of a single configuration parameter.
///
/// # Example
///
/// ```
/// use task_plugin_api::configuration::TaskProperty;
///
/// let property = TaskProperty::new()
///     .with_default_value("http://localhost")
///     .required(true)
///     .with_display_name("Server URL")
///     .with_display_order(0);
/// assert!(property.is_required());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaskProperty {
    #[serde(default)]
    default_value: String,
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_order: Option<u32>,
}

impl TaskProperty {
    /// Creates a property with an empty default, not secure, not required.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Marks the value as secure (masked by the host).
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Marks the value as mandatory.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the label shown by the host.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the position of the parameter in the host's form.
    #[must_use]
    pub const fn with_display_order(mut self, order: u32) -> Self {
        self.display_order = Some(order);
        self
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> &str {
        self.default_value.as_str()
    }

    /// Returns whether the value is secure.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns whether the value is mandatory.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the display name, if set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the display order, if set.
    #[must_use]
    pub const fn display_order(&self) -> Option<u32> {
        self.display_order
    }
}

/// An enumeration whose members are the task's configuration parameters.
///
/// The parameter name is the member identifier as exposed through
/// `AsRef<str>` (typically derived with `strum::AsRefStr`). Members override
/// [`ConfigurationEnum::property`] to customise their attributes.
///
/// # Example
///
/// ```
/// use strum::{AsRefStr, EnumIter};
/// use task_plugin_api::configuration::{
///     ConfigurationEnum, EnumConfiguration, TaskConfiguration, TaskProperty,
/// };
///
/// #[derive(Debug, Clone, Copy, AsRefStr, EnumIter)]
/// #[strum(serialize_all = "snake_case")]
/// enum Params {
///     Url,
///     Retries,
/// }
///
/// impl ConfigurationEnum for Params {
///     fn property(self) -> TaskProperty {
///         match self {
///             Self::Url => TaskProperty::new().required(true),
///             Self::Retries => TaskProperty::new().with_default_value("3"),
///         }
///     }
/// }
///
/// let properties = EnumConfiguration::<Params>::new().properties();
/// assert!(properties["url"].is_required());
/// assert_eq!(properties["retries"].default_value(), "3");
/// ```
pub trait ConfigurationEnum: IntoEnumIterator + AsRef<str> + Copy + 'static {
    /// Returns the attributes of this parameter.
    fn property(self) -> TaskProperty {
        TaskProperty::default()
    }
}

/// Adapts a [`ConfigurationEnum`] into a [`TaskConfiguration`].
pub struct EnumConfiguration<E> {
    members: PhantomData<fn() -> E>,
}

impl<E: ConfigurationEnum> EnumConfiguration<E> {
    /// Creates the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: PhantomData,
        }
    }
}

impl<E: ConfigurationEnum> Default for EnumConfiguration<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ConfigurationEnum> std::fmt::Debug for EnumConfiguration<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumConfiguration")
            .field("enumeration", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: ConfigurationEnum> TaskConfiguration for EnumConfiguration<E> {
    fn properties(&self) -> BTreeMap<String, TaskProperty> {
        E::iter()
            .map(|member| (member.as_ref().to_owned(), member.property()))
            .collect()
    }
}

#[cfg(test)]
mod tests;
