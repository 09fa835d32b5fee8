//! Unit tests for template views and the caching decorator.

use std::io::Write;

use mockall::mock;
use tempfile::NamedTempFile;

use super::*;

mock! {
    View {}
    impl TaskView for View {
        fn display_value(&self) -> String;
        fn template(&self) -> Result<String, PluginError>;
    }
}

fn template_file(markup: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create template file");
    file.write_all(markup.as_bytes()).expect("write template");
    file
}

#[test]
fn template_view_reads_file() {
    let file = template_file("<div>{{url}}</div>");
    let view = TemplateView::new("Deploy", file.path());
    assert_eq!(view.display_value(), "Deploy");
    assert_eq!(view.template().expect("load template"), "<div>{{url}}</div>");
}

#[test]
fn template_view_reports_missing_file() {
    let directory = tempfile::tempdir().expect("create temp dir");
    let path = directory.path().join("absent.html");
    let view = TemplateView::new("Deploy", &path);
    let error = view.template().expect_err("missing template should fail");
    assert!(matches!(error, PluginError::Template { .. }));
    assert!(error.to_string().contains("absent.html"));
}

#[test]
fn caching_view_loads_template_once() {
    let mut inner = MockView::new();
    inner
        .expect_template()
        .times(1)
        .returning(|| Ok(String::from("<form/>")));
    let view = CachingView::new(inner);

    let first = view.template().expect("first load");
    let second = view.template().expect("second load");
    assert_eq!(first, second);
    assert_eq!(first, "<form/>");
}

#[test]
fn caching_view_passes_display_value_through() {
    let mut inner = MockView::new();
    inner
        .expect_display_value()
        .times(2)
        .returning(|| String::from("Echo"));
    let view = CachingView::new(inner);

    assert_eq!(view.display_value(), "Echo");
    assert_eq!(view.display_value(), "Echo");
}

#[test]
fn caching_view_retries_after_failed_load() {
    let mut inner = MockView::new();
    let mut sequence = mockall::Sequence::new();
    inner
        .expect_template()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Err(PluginError::task("resource busy")));
    inner
        .expect_template()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(String::from("<form/>")));
    let view = CachingView::new(inner);

    assert!(view.template().is_err());
    assert_eq!(view.template().expect("second load"), "<form/>");
    assert_eq!(view.template().expect("cached load"), "<form/>");
}

#[test]
fn caching_view_over_file_survives_file_removal() {
    let file = template_file("<p>cached</p>");
    let view = CachingView::new(TemplateView::new("Deploy", file.path()));
    assert_eq!(view.template().expect("first load"), "<p>cached</p>");

    let path = file.path().to_path_buf();
    drop(file);
    assert!(!path.exists());
    assert_eq!(view.template().expect("cached load"), "<p>cached</p>");
}
