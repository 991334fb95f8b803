use tessera::{
    Client, ClientConfig, Command, Error, QueryRequest, Record, TransportError, CONFIG_FILE_NAME,
};
use tempfile::TempDir;

use crate::common::{dead_config, init_tracing};

#[tokio::test]
async fn test_validation_fails_before_io() {
    init_tracing();
    // Nothing listens here, so any I/O attempt would be a transport error
    let client = Client::new(dead_config().await).unwrap();

    let mixed = QueryRequest::new(Command::SetBulk).bulk_values(vec![
        Record::new().with("schema", "A"),
        Record::new().with("schema", "B"),
    ]);
    let err = client.execute(&mixed).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Request(tessera_core::Error::MixedSchema { .. })
    ));

    let conflicting = QueryRequest::new(Command::Get)
        .with_pointers(true)
        .with_pointers_metadata(true);
    assert!(client.execute(&conflicting).await.unwrap_err().is_request());
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    init_tracing();
    let config = dead_config().await;
    let port = config.port;
    let client = Client::new(config).unwrap();

    match client.get(1u64).await {
        Err(Error::Transport(e @ TransportError::Connect { .. })) => {
            assert_eq!(e.endpoint(), ("127.0.0.1", port));
        }
        other => panic!("Expected Connect error, got {:?}", other),
    }
}

#[test]
fn test_client_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, ClientConfig::default_toml()).unwrap();

    let client = Client::from_file(&path).unwrap();
    assert_eq!(client.config().port, 7000);
    assert_eq!(client.context().store, "default");
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = ClientConfig::new("db", 1, "s", "u", "p");
    config.host.clear();
    assert!(matches!(Client::new(config), Err(Error::Config { .. })));
}
