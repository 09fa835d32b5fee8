//! The echo task: prints a message to the job console a configured number
//! of times.
//!
//! Every role is registered with the compile-time registry; [`manifest`]
//! collects them for discovery.

use std::path::PathBuf;

use strum::{AsRefStr, EnumIter};
use task_plugin_api::configuration::{ConfigurationEnum, TaskProperty};
use task_plugin_api::discovery::RoleManifest;
use task_plugin_api::error::PluginError;
use task_plugin_api::execution::{
    ExecutionConfiguration, ExecutionContext, ExecutionResult, JobConsole, TaskExecutor,
};
use task_plugin_api::validation::{TaskValidator, ValidationErrors, property_value};
use task_plugin_api::view::{TaskView, TemplateView};
use task_plugin_api::{ParsedRequest, task_role};

/// Largest accepted repeat count.
pub const MAX_REPEAT: u32 = 10;

/// Environment variable overriding the settings template location.
pub const TEMPLATE_ENV: &str = "TASK_PLUGIN_ECHO_TEMPLATE";

const BUNDLED_TEMPLATE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/echo.html");

/// Host variable naming the running pipeline.
const PIPELINE_VARIABLE: &str = "GO_PIPELINE_NAME";

/// Parameters of the echo task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EchoParams {
    /// Text written to the console.
    Message,
    /// How many times the text is written.
    Repeat,
}

impl ConfigurationEnum for EchoParams {
    fn property(self) -> TaskProperty {
        match self {
            Self::Message => TaskProperty::new()
                .required(true)
                .with_display_name("Message")
                .with_display_order(0),
            Self::Repeat => TaskProperty::new()
                .with_default_value("1")
                .with_display_name("Repeat")
                .with_display_order(1),
        }
    }
}

/// Rejects empty messages and out-of-range repeat counts.
#[derive(Debug, Default)]
pub struct EchoValidator;

impl TaskValidator for EchoValidator {
    fn validate(&self, properties: &ParsedRequest) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let message = property_value(properties, EchoParams::Message.as_ref());
        if message.is_none_or(|text| text.trim().is_empty()) {
            errors.add(EchoParams::Message.as_ref(), "Message must not be empty");
        }
        if let Some(raw) = property_value(properties, EchoParams::Repeat.as_ref())
            && let Err(problem) = parse_repeat(raw)
        {
            errors.add(EchoParams::Repeat.as_ref(), problem);
        }
        errors
    }
}

/// Shows the task as "Echo" with the bundled settings template.
///
/// The template path can be overridden through [`TEMPLATE_ENV`].
#[derive(Debug)]
pub struct EchoView {
    template: TemplateView,
}

impl Default for EchoView {
    fn default() -> Self {
        let path = std::env::var_os(TEMPLATE_ENV)
            .map_or_else(|| PathBuf::from(BUNDLED_TEMPLATE), PathBuf::from);
        Self {
            template: TemplateView::new("Echo", path),
        }
    }
}

impl TaskView for EchoView {
    fn display_value(&self) -> String {
        self.template.display_value()
    }

    fn template(&self) -> Result<String, PluginError> {
        self.template.template()
    }
}

/// Writes the configured message to the job console.
#[derive(Debug, Default)]
pub struct EchoExecutor;

impl TaskExecutor for EchoExecutor {
    fn execute(
        &self,
        context: &ExecutionContext,
        config: &ExecutionConfiguration,
        console: &dyn JobConsole,
    ) -> Result<ExecutionResult, PluginError> {
        let message = config
            .value(EchoParams::Message.as_ref())
            .ok_or_else(|| PluginError::task("MESSAGE was not supplied"))?;
        let repeat = match config.value(EchoParams::Repeat.as_ref()) {
            None => 1,
            Some(raw) => match parse_repeat(raw) {
                Ok(count) => count,
                Err(problem) => return Ok(ExecutionResult::failure(problem)),
            },
        };

        let prefix = context
            .environment_variable(PIPELINE_VARIABLE)
            .map(|pipeline| format!("[{pipeline}] "))
            .unwrap_or_default();
        for _ in 0..repeat {
            console.print_line(&format!("{prefix}{message}"));
        }
        Ok(ExecutionResult::success(format!("echoed {repeat} line(s)")))
    }
}

fn parse_repeat(raw: &str) -> Result<u32, String> {
    let count: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Repeat must be a whole number, got '{raw}'"))?;
    if (1..=MAX_REPEAT).contains(&count) {
        Ok(count)
    } else {
        Err(format!("Repeat must be between 1 and {MAX_REPEAT}"))
    }
}

task_role!(configuration: EchoParams);
task_role!(validator: EchoValidator);
task_role!(view: EchoView);
task_role!(executor: EchoExecutor);

/// Returns the manifest of the echo task's registered roles.
#[must_use]
pub fn manifest() -> RoleManifest {
    RoleManifest::scan(module_path!())
}
