use serde_json::json;
use tessera::AdminRequest;

use crate::common::{init_tracing, MockServer};

#[tokio::test]
async fn test_admin_envelope_shape() {
    init_tracing();
    let server = MockServer::start(vec![vec![r#"{"created":"reports"}"#]]).await;

    let reply = server
        .client()
        .admin(&AdminRequest::create_store("reports"))
        .await
        .unwrap();
    assert_eq!(reply, json!({"created": "reports"}));

    assert_eq!(
        server.requests()[0],
        json!({"raw": ["create_store", "reports"], "credentials": ["app", "pw"]})
    );
}

#[tokio::test]
async fn test_grant_permission_tokens() {
    init_tracing();
    let server = MockServer::start(vec![vec!["true"]]).await;
    server
        .client()
        .admin(&AdminRequest::grant_permission("inventory", "bob", "read"))
        .await
        .unwrap();
    assert_eq!(
        server.requests()[0]["raw"],
        json!(["store", "inventory", "user", "bob", "grant", "read"])
    );
}
