//! Crate-level integration and BDD tests.

use std::io::Cursor;

use clap::Parser;
use serde_json::{Value, json};

use crate::config::BridgeConfig;
use crate::run;


/// Feeds `lines` to the bridge and returns the decoded replies.
fn exchange(config: &BridgeConfig, lines: &[Value]) -> Vec<Value> {
    let input: String = lines.iter().map(|line| format!("{line}\n")).collect();
    let mut reader = Cursor::new(input.into_bytes());
    let mut output = Vec::new();
    run(config, &mut reader, &mut output).expect("bridge runs");
    String::from_utf8(output)
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply is JSON"))
        .collect()
}

/// Decodes the JSON text carried in a reply's `body`.
fn reply_body(reply: &Value) -> Value {
    let text = reply.get("body").and_then(Value::as_str).expect("body text");
    serde_json::from_str(text).expect("body is JSON")
}

fn request(name: &str, body: &Value) -> Value {
    json!({"request_name": name, "body": body.to_string()})
}

#[test]
fn end_to_end_session_over_the_bridge() {
    let replies = exchange(
        &BridgeConfig::default(),
        &[
            json!({"request_name": "configuration"}),
            request("validate", &json!({"MESSAGE": {"value": "hello"}})),
            json!({"request_name": "view"}),
            request(
                "execute",
                &json!({
                    "context": {"environmentVariables": {}, "workingDirectory": "pipelines/shop"},
                    "config": {"MESSAGE": {"value": "hello"}, "REPEAT": {"value": "2"}}
                }),
            ),
            json!({"request_name": "go.cd.task.status"}),
        ],
    );

    let statuses: Vec<&Value> = replies.iter().map(|reply| &reply["status"]).collect();
    assert_eq!(statuses, [&json!(200), &json!(200), &json!(200), &json!(200), &json!(404)]);

    let parameters = reply_body(&replies[0]);
    assert_eq!(parameters["MESSAGE"]["required"], json!(true));
    assert_eq!(parameters["REPEAT"]["default-value"], json!("1"));
    assert_eq!(reply_body(&replies[1]), json!({}));
    assert_eq!(reply_body(&replies[2])["displayValue"], json!("Echo"));
    assert_eq!(
        reply_body(&replies[3]),
        json!({"success": true, "message": "echoed 2 line(s)", "exception": null})
    );
    assert_eq!(replies[4]["unhandled"], json!("go.cd.task.status"));
}

#[test]
fn eager_and_lazy_bridges_answer_alike() {
    let lines = [request("validate", &json!({"MESSAGE": {"value": ""}}))];
    let lazy = exchange(&BridgeConfig::default(), &lines);
    let eager_config = BridgeConfig::try_parse_from(["task-plugin-echo", "--eager"])
        .expect("parse eager flag");
    let eager = exchange(&eager_config, &lines);
    assert_eq!(lazy, eager);
    assert_eq!(lazy[0]["status"], json!(412));
}
