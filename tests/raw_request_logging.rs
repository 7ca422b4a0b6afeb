//! Raw request capture into call metadata.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};

use callback_logging::callbacks::{CallbackDispatcher, CallbackEvent};
use callback_logging::metadata::RAW_REQUEST_KEY;
use callback_logging::redaction::RedactionPolicy;

use common::{context_with_metadata, run_pre_call, RecordingAdapter};

fn existing_metadata() -> Map<String, Value> {
    let Value::Object(map) = json!({"user_api_key_alias": "team-a", "request_tags": ["x", "y"]}) else {
        unreachable!()
    };
    map
}

#[test]
fn raw_request_persists_when_metadata_absent() {
    let mut ctx = context_with_metadata(None, true);
    run_pre_call(&mut ctx);

    let metadata = ctx.metadata().expect("metadata attached by pre_call");
    let raw = metadata.get_str(RAW_REQUEST_KEY).unwrap();
    assert!(!raw.is_empty());
}

#[test]
fn raw_request_persists_when_metadata_empty() {
    let mut ctx = context_with_metadata(Some(Map::new()), true);
    let before = ctx.metadata().unwrap();
    run_pre_call(&mut ctx);

    let after = ctx.metadata().unwrap();
    assert!(before.ptr_eq(&after));
    assert!(!after.get_str(RAW_REQUEST_KEY).unwrap().is_empty());
}

#[test]
fn raw_request_preserves_existing_keys() {
    let mut ctx = context_with_metadata(Some(existing_metadata()), true);
    run_pre_call(&mut ctx);

    let metadata = ctx.metadata().unwrap();
    assert_eq!(metadata.get("user_api_key_alias"), Some(json!("team-a")));
    assert_eq!(metadata.get("request_tags"), Some(json!(["x", "y"])));
    assert!(metadata.contains_key(RAW_REQUEST_KEY));
    assert_eq!(metadata.len(), 3);
}

#[test]
fn raw_request_absent_when_capture_disabled() {
    for initial in [None, Some(Map::new()), Some(existing_metadata())] {
        let expected = initial.clone().unwrap_or_default();
        let mut ctx = context_with_metadata(initial, false);
        run_pre_call(&mut ctx);

        let metadata = ctx.metadata().expect("metadata attached even when capture is off");
        assert!(!metadata.contains_key(RAW_REQUEST_KEY));
        assert_eq!(metadata.snapshot(), expected);
    }
}

#[test]
fn raw_request_redacted_when_message_logging_off() {
    let mut ctx = context_with_metadata(None, true).with_policy(RedactionPolicy::suppress_messages());
    run_pre_call(&mut ctx);

    let raw = ctx.metadata().unwrap().get_str(RAW_REQUEST_KEY).unwrap();
    assert!(raw.to_lowercase().contains("redacted"));
    assert!(!raw.contains("api.openai.com"));
}

#[test]
fn raw_request_never_contains_credentials() {
    let mut ctx = context_with_metadata(None, true);
    run_pre_call(&mut ctx);

    let raw = ctx.metadata().unwrap().get_str(RAW_REQUEST_KEY).unwrap();
    assert!(raw.contains("api.openai.com"));
    assert!(!raw.contains("abcdefghijklmnopqrstuvwxyz123456"));
    assert_ne!(
        ctx.model_call_details.api_key.as_deref(),
        Some("sk-abcdefghijklmnopqrstuvwxyz123456")
    );
}

#[tokio::test]
async fn adapters_observe_the_same_metadata_store() {
    let recorder = Arc::new(RecordingAdapter::default());
    let dispatcher = CallbackDispatcher::new(Duration::from_secs(1));
    dispatcher.register(recorder.clone());

    let mut ctx = context_with_metadata(Some(existing_metadata()), true);
    run_pre_call(&mut ctx);
    let written = ctx.metadata().unwrap().get_str(RAW_REQUEST_KEY).unwrap();

    let pre = dispatcher.dispatch(CallbackEvent::PreCall, &ctx, None).await;
    let done = ctx.success(&dispatcher, Some(json!({"id": "resp-1"}))).await;
    assert!(pre.all_succeeded());
    assert!(done.all_succeeded());

    let seen = recorder.seen();
    assert_eq!(seen.len(), 2);
    for payload in &seen {
        let handle = payload.metadata().unwrap();
        assert!(handle.ptr_eq(&ctx.metadata().unwrap()));
        assert_eq!(handle.get_str(RAW_REQUEST_KEY).as_deref(), Some(written.as_str()));
        assert_eq!(payload.call_id, "test-call-id");
    }
    assert_eq!(seen[1].event, CallbackEvent::Success);
}
