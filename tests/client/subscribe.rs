use std::sync::{Arc, Mutex};

use serde_json::json;
use tessera::{Command, QueryRequest, StreamEnd, StreamEvent};

use crate::common::{init_tracing, MockServer};

#[tokio::test]
async fn test_subscription_delivers_decoded_lines() {
    init_tracing();
    let server = MockServer::start(vec![vec![
        r#"{"event":"set","key":"123456789012345678901234567890"}"#,
        r#""{\"event\":\"delete\"}""#,
        "plain text",
    ]])
    .await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = server
        .client()
        .subscribe(&QueryRequest::new(Command::Subscribe), move |event| {
            sink.lock().unwrap().push(event);
        })
        .await
        .unwrap();

    assert_eq!(subscription.finished().await.unwrap(), StreamEnd::Closed);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            StreamEvent::Message(json!({"event": "set", "key": "123456789012345678901234567890"})),
            StreamEvent::Message(json!({"event": "delete"})),
            StreamEvent::Message(json!("plain text")),
        ]
    );

    let request = &server.requests()[0];
    assert_eq!(request["command"], json!("subscribe"));
    assert_eq!(request["subscribe"], json!(true));
}

#[tokio::test]
async fn test_execute_rejects_subscription() {
    init_tracing();
    let server = MockServer::start(vec![]).await;
    let err = server
        .client()
        .execute(&QueryRequest::new(Command::Subscribe))
        .await
        .unwrap_err();
    assert!(err.is_request());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_subscribe_rejects_one_shot() {
    init_tracing();
    let server = MockServer::start(vec![]).await;
    let err = server
        .client()
        .subscribe(&QueryRequest::new(Command::Get), |_| {})
        .await
        .unwrap_err();
    assert!(err.is_request());
}
