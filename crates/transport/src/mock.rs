//! In-process server fixtures for transport tests

use std::time::Duration;

use tessera_wire::{build, Command, Credentials, QueryContext, QueryEnvelope, QueryRequest};
use tokio::net::TcpListener;

use crate::config::TransportConfig;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A listener on an ephemeral local port and a config pointing at it
pub(crate) async fn listener() -> (TcpListener, TransportConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = TransportConfig::new("127.0.0.1", port)
        .connect_timeout(Duration::from_secs(5))
        .read_timeout(Duration::from_secs(5));
    (listener, config)
}

pub(crate) fn envelope(command: Command) -> QueryEnvelope {
    let context = QueryContext::new("store", "events", Credentials::new("app", "pw"));
    build(&context, &QueryRequest::new(command)).unwrap()
}

/// Poll `condition` until it holds, failing the test after five seconds
pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}
