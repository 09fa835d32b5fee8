//! Crate-level integration and BDD tests.

use serde_json::{Value, json};
use strum::{AsRefStr, EnumIter};

use crate::codec::ParsedRequest;
use crate::configuration::{ConfigurationEnum, TaskProperty};
use crate::discovery::{RoleBinding, RoleManifest};
use crate::error::PluginError;
use crate::execution::{
    ExecutionConfiguration, ExecutionContext, ExecutionResult, JobConsole, TaskExecutor,
};
use crate::plugin::TaskPlugin;
use crate::protocol::{ApiRequest, ApiResponse, ResponseStatus};
use crate::validation::{TaskValidator, ValidationErrors, property_value};
use crate::view::TaskView;


#[derive(Debug, Clone, Copy, AsRefStr, EnumIter)]
enum DeployParams {
    #[strum(serialize = "URL")]
    Url,
    #[strum(serialize = "TARGET")]
    Target,
}

impl ConfigurationEnum for DeployParams {
    fn property(self) -> TaskProperty {
        match self {
            Self::Url => TaskProperty::new()
                .required(true)
                .with_display_name("Server URL")
                .with_display_order(0),
            Self::Target => TaskProperty::new()
                .with_default_value("staging")
                .with_display_order(1),
        }
    }
}

#[derive(Default)]
struct UrlValidator;

impl TaskValidator for UrlValidator {
    fn validate(&self, properties: &ParsedRequest) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match property_value(properties, "URL") {
            None | Some("") => errors.add("URL", "URL must be provided"),
            Some(url) if !url.starts_with("http") => errors.add("URL", "URL must use http"),
            Some(_) => {}
        }
        errors
    }
}

#[derive(Default)]
struct DeployView;

impl TaskView for DeployView {
    fn display_value(&self) -> String {
        String::from("Deploy")
    }

    fn template(&self) -> Result<String, PluginError> {
        Ok(String::from("<input ng-model=\"URL\"/>"))
    }
}

#[derive(Default)]
struct DeployExecutor;

impl TaskExecutor for DeployExecutor {
    fn execute(
        &self,
        context: &ExecutionContext,
        config: &ExecutionConfiguration,
        console: &dyn JobConsole,
    ) -> Result<ExecutionResult, PluginError> {
        let target = config
            .value("TARGET")
            .ok_or_else(|| PluginError::task("TARGET is not configured"))?;
        let pipeline = context
            .environment_variable("GO_PIPELINE_NAME")
            .unwrap_or("unknown");
        console.print_line(&format!("deploying {pipeline} to {target}"));
        if target == "production" {
            return Ok(ExecutionResult::failure("production deploys are frozen"));
        }
        Ok(ExecutionResult::success(format!("deployed to {target}")))
    }
}

fn deploy_manifest() -> RoleManifest {
    RoleManifest::new()
        .declare(RoleBinding::configuration_enum::<DeployParams>(
            "DeployParams",
            module_path!(),
        ))
        .declare(RoleBinding::validator::<UrlValidator>("UrlValidator", module_path!()))
        .declare(RoleBinding::view::<DeployView>("DeployView", module_path!()))
        .declare(RoleBinding::executor::<DeployExecutor>("DeployExecutor", module_path!()))
}

fn execute_body(target: Option<&str>) -> String {
    let config = target.map_or_else(|| json!({}), |value| json!({"TARGET": {"value": value}}));
    json!({
        "context": {"environmentVariables": {"GO_PIPELINE_NAME": "shop"}},
        "config": config,
    })
    .to_string()
}

fn decoded(response: &ApiResponse) -> Value {
    serde_json::from_str(response.body()).expect("response body is JSON")
}

#[test]
fn end_to_end_plugin_serves_every_request() {
    let plugin = TaskPlugin::discover(&deploy_manifest()).expect("discovery succeeds");

    let configuration = plugin
        .handle(&ApiRequest::without_body("configuration"))
        .expect("configuration is bound");
    assert_eq!(configuration.status(), ResponseStatus::Ok);
    assert_eq!(
        decoded(&configuration),
        json!({
            "URL": {
                "default-value": "",
                "secure": false,
                "required": true,
                "display-name": "Server URL",
                "display-order": 0
            },
            "TARGET": {
                "default-value": "staging",
                "secure": false,
                "required": false,
                "display-order": 1
            }
        })
    );

    let validate = plugin
        .handle(&ApiRequest::new("validate", r#"{"URL":{"value":"ftp://x"}}"#))
        .expect("validate is bound");
    assert_eq!(validate.into_parts().0, 412);

    let view = plugin
        .handle(&ApiRequest::without_body("view"))
        .expect("view is bound");
    assert_eq!(decoded(&view)["displayValue"], json!("Deploy"));

    let execute = plugin
        .handle(&ApiRequest::new("execute", execute_body(Some("staging"))))
        .expect("execute is bound");
    assert_eq!(execute.status(), ResponseStatus::Ok);
    assert_eq!(decoded(&execute)["message"], json!("deployed to staging"));
}

#[test]
fn executor_error_reaches_host_as_exception() {
    let plugin = TaskPlugin::discover(&deploy_manifest()).expect("discovery succeeds");
    let response = plugin
        .handle(&ApiRequest::new("execute", execute_body(None)))
        .expect("execute is bound");
    assert_eq!(response.status(), ResponseStatus::InternalError);
    assert_eq!(
        decoded(&response),
        json!({"exception": "TARGET is not configured"})
    );
}
