//! Shared fixtures for the client suite.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;
use tessera::{Client, ClientConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A scripted server: connection `i` gets `script[i]` written back after
/// its request line, then the connection is closed.
pub struct MockServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<JsonValue>>>,
}

impl MockServer {
    pub async fn start(script: Vec<Vec<&'static str>>) -> MockServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            for lines in script {
                let (socket, _) = listener.accept().await.unwrap();
                let (reader, mut writer) = socket.into_split();
                let mut request = String::new();
                BufReader::new(reader).read_line(&mut request).await.unwrap();
                seen.lock()
                    .unwrap()
                    .push(serde_json::from_str(request.trim_end()).unwrap());
                for line in lines {
                    writer.write_all(line.as_bytes()).await.unwrap();
                    writer.write_all(b"\n").await.unwrap();
                }
            }
        });

        MockServer { port, requests }
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new("127.0.0.1", self.port, "inventory", "app", "pw");
        config.keyspace = "people".to_string();
        config.connect_timeout_ms = 5_000;
        config.read_timeout_ms = 5_000;
        config
    }

    pub fn client(&self) -> Client {
        Client::new(self.config()).unwrap()
    }

    pub fn requests(&self) -> Vec<JsonValue> {
        self.requests.lock().unwrap().clone()
    }
}

/// A config pointing at a port nothing listens on
pub async fn dead_config() -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    ClientConfig::new("127.0.0.1", port, "inventory", "app", "pw")
}

/// Parse a double-encoded payload field
pub fn inner(request: &JsonValue, field: &str) -> JsonValue {
    serde_json::from_str(request[field].as_str().unwrap()).unwrap()
}
