use serde_json::json;
use tessera::{
    canonicalize_str, validate, Command, FieldType, Key, Limit, QueryRequest, Record, Reference,
    SchemaDescriptor,
};

use crate::common::{init_tracing, inner, MockServer};

#[tokio::test]
async fn test_insert_sends_canonical_envelope() {
    init_tracing();
    let server = MockServer::start(vec![vec![r#"{"ok":true}"#]]).await;
    let client = server.client();

    let reply = client
        .insert("alice", Record::new().with("name", "Alice").with("age", 30))
        .await
        .unwrap();
    assert_eq!(reply, json!({"ok": true}));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request["command"], json!("set"));
    assert_eq!(request["key"], json!(canonicalize_str("alice")));
    assert_eq!(request["store"], json!("inventory"));
    assert_eq!(request["keyspace"], json!("people"));
    assert_eq!(request["username"], json!("app"));
    assert_eq!(inner(request, "value"), json!({"name": "Alice", "age": 30}));
}

#[tokio::test]
async fn test_validated_reference_scenario() {
    init_tracing();
    let server = MockServer::start(vec![vec!["\"stored\""]]).await;
    let schema = SchemaDescriptor::new("Person")
        .field("name", FieldType::STRING)
        .field("dep", FieldType::Reference);
    let record = validate(
        &Record::new()
            .with("name", "Alice")
            .with("dep", Reference::new("depts", "eng-1")),
        &schema,
    )
    .unwrap();

    let reply = server.client().insert(Key::id(1), record).await.unwrap();
    assert_eq!(reply, json!("stored"));

    let request = &server.requests()[0];
    assert_eq!(request["schema"], json!("Person"));
    assert_eq!(request["key"], json!("1"));
    assert_eq!(
        inner(request, "value"),
        json!({"name": "Alice", "pointers": {"dep": ["depts", canonicalize_str("eng-1")]}})
    );
}

#[tokio::test]
async fn test_get_preserves_large_identifiers() {
    init_tracing();
    let id = u128::MAX;
    let reply = format!(r#"{{"id":"{}","value":"{{\"n\":1}}"}}"#, id);
    let reply: &'static str = Box::leak(reply.into_boxed_str());
    let server = MockServer::start(vec![vec![reply]]).await;

    let value = server.client().get(Key::id(id)).await.unwrap();
    assert_eq!(value, json!({"id": id.to_string(), "value": {"n": 1}}));
    assert_eq!(server.requests()[0]["key"], json!(id.to_string()));
}

#[tokio::test]
async fn test_search_moves_references_to_pointers() {
    init_tracing();
    let server = MockServer::start(vec![vec!["[]"]]).await;

    let reply = server
        .client()
        .search(
            Record::new()
                .with("age", 30)
                .with("dep", Reference::new("depts", "42")),
        )
        .await
        .unwrap();
    assert_eq!(reply, json!([]));

    let request = &server.requests()[0];
    assert_eq!(request["command"], json!("search"));
    assert_eq!(
        inner(request, "search_criteria"),
        json!({"age": 30, "pointers": {"dep": ["depts", "42"]}})
    );
}

#[tokio::test]
async fn test_execute_with_limit_and_keyspace() {
    init_tracing();
    let server = MockServer::start(vec![vec!["[\"1\",\"2\"]"]]).await;
    let client = server.client().with_keyspace("orders");

    let reply = client
        .execute(&QueryRequest::new(Command::Keys).limit(Limit::new(5, 10)))
        .await
        .unwrap();
    assert_eq!(reply, json!([1, 2]));

    let request = &server.requests()[0];
    assert_eq!(request["keyspace"], json!("orders"));
    assert_eq!(request["limit_output"], json!({"start": 5, "stop": 10}));
}

#[tokio::test]
async fn test_delete_and_bulk_keys() {
    init_tracing();
    let server = MockServer::start(vec![vec!["true"], vec!["2"]]).await;
    let client = server.client();

    assert_eq!(client.delete(7u64).await.unwrap(), json!(true));
    assert_eq!(
        client
            .execute(&QueryRequest::new(Command::DeleteBulk).bulk_keys(["8", "bob"]))
            .await
            .unwrap(),
        json!(2)
    );

    let requests = server.requests();
    assert_eq!(requests[0]["command"], json!("delete"));
    assert_eq!(requests[0]["key"], json!("7"));
    assert_eq!(
        requests[1]["bulk_keys"],
        json!(["8", canonicalize_str("bob")])
    );
}
