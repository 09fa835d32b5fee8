//! Unit tests for the host adapters.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use super::*;
use crate::codec::ParsedRequest;
use crate::discovery::RoleBinding;
use crate::protocol::ResponseStatus;
use crate::validation::{TaskValidator, ValidationErrors, property_value};

#[derive(Default)]
struct RequireUrl;

impl TaskValidator for RequireUrl {
    fn validate(&self, properties: &ParsedRequest) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if property_value(properties, "url").is_none_or(str::is_empty) {
            errors.add("url", "URL must be provided");
        }
        errors
    }
}

#[derive(Default)]
struct AcceptAll;

impl TaskValidator for AcceptAll {
    fn validate(&self, _properties: &ParsedRequest) -> ValidationErrors {
        ValidationErrors::new()
    }
}

fn validator_manifest() -> RoleManifest {
    RoleManifest::new().declare(RoleBinding::validator::<RequireUrl>("RequireUrl", module_path!()))
}

fn ambiguous_manifest() -> RoleManifest {
    validator_manifest().declare(RoleBinding::validator::<AcceptAll>("AcceptAll", module_path!()))
}

/// Counts error-level events seen while installed.
#[derive(Clone, Default)]
struct ErrorCounter {
    seen: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[fixture]
fn plugin() -> TaskPlugin {
    TaskPlugin::discover(&validator_manifest()).expect("discovery succeeds")
}

fn body(response: &ApiResponse) -> Value {
    serde_json::from_str(response.body()).expect("response body is JSON")
}

#[rstest]
fn plugin_advertises_task_extension(plugin: TaskPlugin) {
    assert_eq!(plugin.identifier().extension(), "task");
    assert_eq!(plugin.identifier().versions(), ["1.0"]);
}

#[rstest]
fn plugin_delegates_to_dispatcher(plugin: TaskPlugin) {
    let response = plugin
        .handle(&ApiRequest::new("validate", r#"{"url":{"value":""}}"#))
        .expect("validate is bound");
    assert_eq!(response.status(), ResponseStatus::ValidationFailed);
    assert_eq!(
        body(&response),
        json!({"errors": {"url": "URL must be provided"}})
    );
}

#[rstest]
fn plugin_propagates_unhandled_requests(plugin: TaskPlugin) {
    let error = plugin
        .handle(&ApiRequest::without_body("view"))
        .expect_err("view is not bound");
    assert_eq!(error.request_name, "view");
}

#[test]
fn eager_discovery_surfaces_wiring_errors() {
    let error = TaskPlugin::discover(&ambiguous_manifest()).expect_err("two validators");
    assert!(matches!(error, DiscoveryError::Ambiguous { .. }));
}

#[test]
fn lazy_plugin_defers_discovery_until_first_request() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let lazy = LazyTaskPlugin::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        validator_manifest()
    });
    assert!(!lazy.is_discovered());
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    for _ in 0..3 {
        let response = lazy
            .handle(&ApiRequest::new("validate", r#"{"url":{"value":"http://ci"}}"#))
            .expect("validate is bound");
        assert_eq!(response.status(), ResponseStatus::Ok);
    }
    assert!(lazy.is_discovered());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_plugin_remembers_discovery_failure() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let lazy = LazyTaskPlugin::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        ambiguous_manifest()
    });

    let expected = lazy
        .plugin()
        .expect_err("discovery fails")
        .to_string();
    for name in ["validate", "view", "anything"] {
        let response = lazy
            .handle(&ApiRequest::without_body(name))
            .expect("failure is reported as an envelope");
        assert_eq!(response.status(), ResponseStatus::InternalError);
        assert_eq!(body(&response), json!({"exception": expected}));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_discovery_failure_is_logged_once_at_error() {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let lazy = LazyTaskPlugin::new(ambiguous_manifest);

    tracing::subscriber::with_default(subscriber, || {
        for _ in 0..3 {
            lazy.handle(&ApiRequest::without_body("validate"))
                .expect("failure is reported as an envelope");
        }
    });
    assert_eq!(counter.seen.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_plugin_runs_discovery_once_under_contention() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let lazy = LazyTaskPlugin::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        validator_manifest()
    });

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                lazy.handle(&ApiRequest::new("validate", "{}"))
                    .expect("validate is bound");
            });
        }
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_plugin_propagates_unhandled_requests() {
    let lazy = LazyTaskPlugin::new(validator_manifest);
    let error = lazy
        .handle(&ApiRequest::without_body("execute"))
        .expect_err("execute is not bound");
    assert_eq!(error, UnhandledRequest::new("execute"));
    assert_eq!(lazy.identifier(), &PluginIdentifier::default());
}
