//! Unit tests for configuration declarations.

use serde_json::json;
use strum::{AsRefStr, EnumIter};

use super::*;

#[derive(Debug, Clone, Copy, AsRefStr, EnumIter)]
enum DeployParams {
    #[strum(serialize = "TARGET")]
    Target,
    #[strum(serialize = "TOKEN")]
    Token,
    #[strum(serialize = "DRY_RUN")]
    DryRun,
}

impl ConfigurationEnum for DeployParams {
    fn property(self) -> TaskProperty {
        match self {
            Self::Target => TaskProperty::new().required(true).with_display_order(0),
            Self::Token => TaskProperty::new().secure(true).required(true),
            Self::DryRun => TaskProperty::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, AsRefStr, EnumIter)]
enum Defaulted {
    Only,
}

impl ConfigurationEnum for Defaulted {}

#[test]
fn every_member_becomes_a_parameter() {
    let properties = EnumConfiguration::<DeployParams>::new().properties();
    let names: Vec<&str> = properties.keys().map(String::as_str).collect();
    assert_eq!(names, ["DRY_RUN", "TARGET", "TOKEN"]);
}

#[test]
fn member_overrides_are_applied() {
    let properties = EnumConfiguration::<DeployParams>::new().properties();
    let token = properties.get("TOKEN").expect("token parameter");
    assert!(token.is_secure());
    assert!(token.is_required());
    let target = properties.get("TARGET").expect("target parameter");
    assert_eq!(target.display_order(), Some(0));
}

#[test]
fn members_without_override_use_default_attributes() {
    let properties = EnumConfiguration::<Defaulted>::new().properties();
    assert_eq!(properties.get("Only"), Some(&TaskProperty::default()));
}

#[test]
fn property_serialises_with_kebab_case_attributes() {
    let property = TaskProperty::new()
        .with_default_value("3")
        .required(true)
        .with_display_name("Retries");
    let value = serde_json::to_value(&property).expect("serialise property");
    assert_eq!(
        value,
        json!({
            "default-value": "3",
            "secure": false,
            "required": true,
            "display-name": "Retries",
        })
    );
}
