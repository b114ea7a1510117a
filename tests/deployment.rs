//! Deployment lifecycle tests
//!
//! Create, prepare, and test against recording fakes, checking which
//! resources get cleaned up on each path.

mod common;

use std::collections::BTreeMap;

use bedrock_flows::core::{Config, InputContent, TemplateMetadata};
use bedrock_flows::template::ProcessedTemplate;
use bedrock_flows::{DeployOptions, FlowError};
use common::{harness, RecordingControlPlane, ScriptedResponse, ScriptedRuntime, ROLE_ARN};
use serde_json::json;

fn processed(tags: &[(&str, &str)], role: Option<&str>) -> ProcessedTemplate {
    ProcessedTemplate {
        definition: json!({"nodes": [], "connections": []}),
        multivalued_input: false,
        metadata: TemplateMetadata {
            description: "Greets people".into(),
            name: "Greeter".into(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            execution_role_arn: role.map(str::to_string),
        },
    }
}

#[tokio::test]
async fn test_deploy_without_test_input_keeps_resources() {
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::default(),
        ScriptedRuntime::default(),
        vec![],
    );

    let deployment = h
        .manager
        .deploy(&processed(&[], None), &DeployOptions::default())
        .await
        .unwrap();

    assert_eq!(deployment.flow_id, "FLOW1");
    assert_eq!(deployment.version, "1");
    assert_eq!(deployment.alias_id, "ALIAS1");
    assert_eq!(deployment.output, None);
    assert!(!deployment.cleaned_up);
    assert_eq!(
        h.control_plane.calls(),
        vec![
            "create_flow:Greeter",
            "prepare_flow:FLOW1",
            "create_flow_version:FLOW1",
            "create_flow_alias:FLOW1:latest:1",
        ]
    );
    assert!(h.runtime.requests().is_empty());
}

#[tokio::test]
async fn test_create_request_uses_managed_role_and_omits_empty_tags() {
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::default(),
        ScriptedRuntime::default(),
        vec![],
    );

    let options = DeployOptions {
        flow_name: Some("Renamed".into()),
        ..DeployOptions::default()
    };
    h.manager
        .deploy(&processed(&[], None), &options)
        .await
        .unwrap();

    let created = h.control_plane.created();
    assert_eq!(created[0].name, "Renamed");
    assert_eq!(created[0].description, "Greets people");
    assert_eq!(created[0].execution_role_arn, ROLE_ARN);
    assert!(created[0].tags.is_empty());
    assert_eq!(h.roles.requested.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_template_role_and_tags_are_passed_through() {
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::default(),
        ScriptedRuntime::default(),
        vec![],
    );

    let template = processed(&[("team", "ml")], Some("arn:aws:iam::1:role/Custom"));
    h.manager
        .deploy(&template, &DeployOptions::default())
        .await
        .unwrap();

    let created = h.control_plane.created();
    assert_eq!(created[0].execution_role_arn, "arn:aws:iam::1:role/Custom");
    assert_eq!(created[0].tags.get("team").map(String::as_str), Some("ml"));
    assert!(h.roles.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_prepare_deletes_only_the_flow() {
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::failing_on(&["prepare_flow"]),
        ScriptedRuntime::default(),
        vec![],
    );

    let err = h
        .manager
        .deploy(&processed(&[], None), &DeployOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Service { ref operation, .. } if operation == "prepare_flow"));
    assert_eq!(
        h.control_plane.calls(),
        vec!["create_flow:Greeter", "prepare_flow:FLOW1", "delete_flow:FLOW1"]
    );
}

#[tokio::test]
async fn test_failed_alias_deletes_version_and_flow() {
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::failing_on(&["create_flow_alias"]),
        ScriptedRuntime::default(),
        vec![],
    );

    h.manager
        .deploy(&processed(&[], None), &DeployOptions::default())
        .await
        .unwrap_err();

    let calls = h.control_plane.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        ["delete_flow_version:FLOW1:1", "delete_flow:FLOW1"]
    );
    assert!(!calls.iter().any(|c| c.starts_with("delete_flow_alias")));
}

#[tokio::test]
async fn test_failed_test_cleans_up_everything_in_reverse_order() {
    let runtime = ScriptedRuntime::new(vec![ScriptedResponse::completed("exec-1", "FAILURE")]);
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::default(),
        runtime,
        vec![],
    );

    let options = DeployOptions {
        test_input: Some(InputContent::Text("hi".into())),
        ..DeployOptions::default()
    };
    let err = h
        .manager
        .deploy(&processed(&[], None), &options)
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::UnexpectedStatus(ref s) if s == "FAILURE"));
    let calls = h.control_plane.calls();
    assert_eq!(
        &calls[calls.len() - 3..],
        [
            "delete_flow_alias:FLOW1:ALIAS1",
            "delete_flow_version:FLOW1:1",
            "delete_flow:FLOW1"
        ]
    );
}

#[tokio::test]
async fn test_cleanup_after_successful_test() {
    let runtime = ScriptedRuntime::new(vec![ScriptedResponse::success(
        "exec-1",
        json!("Hello World"),
    )]);
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::default(),
        runtime,
        vec![],
    );

    let options = DeployOptions {
        test_input: Some(InputContent::Text("World".into())),
        cleanup: true,
        ..DeployOptions::default()
    };
    let deployment = h
        .manager
        .deploy(&processed(&[], None), &options)
        .await
        .unwrap();

    assert_eq!(deployment.output, Some(json!("Hello World")));
    assert!(deployment.cleaned_up);
    assert!(h
        .control_plane
        .calls()
        .contains(&"delete_flow:FLOW1".to_string()));

    let request = &h.runtime.requests()[0];
    assert_eq!(request.payload.node_name, "FlowInputNode");
    assert_eq!(request.alias_id, "ALIAS1");
    assert!(h.output.contents().contains("Cleanup completed"));
}

#[tokio::test]
async fn test_cleanup_failures_are_reported_not_raised() {
    let mut h = harness(
        Config::default(),
        RecordingControlPlane::failing_on(&["delete_flow_alias", "delete_flow"]),
        ScriptedRuntime::default(),
        vec![],
    );

    let options = DeployOptions {
        cleanup: true,
        ..DeployOptions::default()
    };
    let deployment = h
        .manager
        .deploy(&processed(&[], None), &options)
        .await
        .unwrap();

    assert!(!deployment.cleaned_up);
    let calls = h.control_plane.calls();
    assert!(calls.contains(&"delete_flow_version:FLOW1:1".to_string()));
    assert!(calls.contains(&"delete_flow:FLOW1".to_string()));

    let output = h.output.contents();
    assert!(output.contains("cleaned up manually"));
    assert!(output.contains("Flow ID: FLOW1"));
    assert!(output.contains("Alias ID: ALIAS1"));
}

#[tokio::test]
async fn test_existing_role_is_forwarded() {
    let mut config = Config::default();
    config.flow.existing_role = Some("MyRole".into());
    let mut h = harness(
        config,
        RecordingControlPlane::default(),
        ScriptedRuntime::default(),
        vec![],
    );

    let arn = h.manager.ensure_role().await.unwrap();

    assert_eq!(arn, ROLE_ARN);
    assert_eq!(h.manager.role_arn(), Some(ROLE_ARN));
    assert_eq!(
        *h.roles.requested.lock().unwrap(),
        vec![Some("MyRole".to_string())]
    );
}
