//! View role: the task's display name and settings template.
//!
//! Loading a template is comparatively expensive, so views registered
//! through the dispatcher builder are wrapped in [`CachingView`] unless the
//! caller opts out.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::error::PluginError;

/// Supplies the task's display value and settings template.
pub trait TaskView: Send + Sync {
    /// Returns the name the host shows for the task.
    fn display_value(&self) -> String;

    /// Returns the settings template markup.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the template cannot be produced.
    fn template(&self) -> Result<String, PluginError>;
}

/// View that reads its template from a file on every call.
///
/// # Example
///
/// ```no_run
/// use task_plugin_api::view::{TaskView, TemplateView};
///
/// let view = TemplateView::new("Deploy", "/opt/plugin/templates/deploy.html");
/// assert_eq!(view.display_value(), "Deploy");
/// let _markup = view.template();
/// ```
#[derive(Debug, Clone)]
pub struct TemplateView {
    display_value: String,
    template_path: PathBuf,
}

impl TemplateView {
    /// Creates a view with the given display value and template path.
    #[must_use]
    pub fn new(display_value: impl Into<String>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            display_value: display_value.into(),
            template_path: template_path.into(),
        }
    }

    /// Returns the template path.
    #[must_use]
    pub fn template_path(&self) -> &Path {
        self.template_path.as_path()
    }
}

impl TaskView for TemplateView {
    fn display_value(&self) -> String {
        self.display_value.clone()
    }

    fn template(&self) -> Result<String, PluginError> {
        std::fs::read_to_string(&self.template_path)
            .map_err(|source| PluginError::template(&self.template_path, source))
    }
}

/// Decorator that loads the wrapped view's template at most once.
///
/// The first successful load is memoised for the decorator's lifetime. A
/// failed load is not cached. Concurrent first calls wait for a single load.
#[derive(Debug)]
pub struct CachingView<V> {
    inner: V,
    template: OnceCell<String>,
}

impl<V: TaskView> CachingView<V> {
    /// Wraps a view.
    #[must_use]
    pub const fn new(inner: V) -> Self {
        Self {
            inner,
            template: OnceCell::new(),
        }
    }

    /// Returns the wrapped view.
    #[must_use]
    pub const fn inner(&self) -> &V {
        &self.inner
    }
}

impl<V: TaskView> TaskView for CachingView<V> {
    fn display_value(&self) -> String {
        self.inner.display_value()
    }

    fn template(&self) -> Result<String, PluginError> {
        self.template
            .get_or_try_init(|| self.inner.template())
            .cloned()
    }
}

impl TaskView for Box<dyn TaskView> {
    fn display_value(&self) -> String {
        self.as_ref().display_value()
    }

    fn template(&self) -> Result<String, PluginError> {
        self.as_ref().template()
    }
}

#[cfg(test)]
mod tests;
