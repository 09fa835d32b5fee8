//! Unit tests for execution inputs and results.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn context_map() -> ParsedRequest {
    json!({
        "environmentVariables": {
            "GO_PIPELINE_NAME": "deploy",
            "GO_PIPELINE_COUNTER": 42
        },
        "workingDirectory": "pipelines/deploy"
    })
    .as_object()
    .cloned()
    .expect("object fixture")
}

#[rstest]
fn context_reads_environment_and_working_directory(context_map: ParsedRequest) {
    let context = ExecutionContext::from_map(context_map);
    assert_eq!(context.environment_variable("GO_PIPELINE_NAME"), Some("deploy"));
    assert_eq!(context.environment_variable("GO_PIPELINE_COUNTER"), Some("42"));
    assert_eq!(context.working_directory(), Some("pipelines/deploy"));
    assert_eq!(context.environment_variables().len(), 2);
}

#[test]
fn empty_context_has_no_entries() {
    let context = ExecutionContext::from_map(ParsedRequest::new());
    assert!(context.environment_variables().is_empty());
    assert_eq!(context.working_directory(), None);
}

#[test]
fn configuration_reads_parameter_values() {
    let raw = json!({"TARGET": {"value": "staging"}, "DRY_RUN": {"value": "true"}})
        .as_object()
        .cloned()
        .expect("object fixture");
    let config = ExecutionConfiguration::from_map(raw);
    assert_eq!(config.value("TARGET"), Some("staging"));
    assert_eq!(config.value("MISSING"), None);
    let names: Vec<&str> = config.names().collect();
    assert_eq!(names, ["DRY_RUN", "TARGET"]);
}

#[test]
fn result_serialises_with_explicit_nulls() {
    let value = serde_json::to_value(ExecutionResult::success("done")).expect("serialise");
    assert_eq!(
        value,
        json!({"success": true, "message": "done", "exception": null})
    );
}

#[test]
fn failure_with_exception_keeps_diagnostic() {
    let result = ExecutionResult::failure_with_exception("deploy failed", "connection refused");
    assert!(!result.is_success());
    assert_eq!(result.message(), Some("deploy failed"));
    assert_eq!(result.exception(), Some("connection refused"));
}

#[test]
fn writer_console_appends_lines() {
    let console = WriterConsole::new(Vec::new());
    console.print_line("first");
    console.print_line("second");
    let output = String::from_utf8(console.into_inner()).expect("utf8 output");
    assert_eq!(output, "first\nsecond\n");
}
