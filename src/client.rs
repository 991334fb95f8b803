//! Client facade
//!
//! Builds envelopes from the configured context and hands them to a fresh
//! transport. Each call opens its own connection, so a `Client` can be
//! shared across tasks freely.

use std::path::Path;

use serde_json::Value as JsonValue;
use tessera_core::{Error as RequestError, Key, Record};
use tessera_transport::{StreamEvent, Subscription, Transport, TransportConfig};
use tessera_wire::{build, AdminRequest, Command, QueryContext, QueryEnvelope, QueryRequest};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;

/// A configured client for one store
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    context: QueryContext,
    transport: TransportConfig,
}

impl Client {
    /// Client for `config`
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Client {
            context: config.query_context(),
            transport: config.transport_config(),
            config,
        })
    }

    /// Client for the config file at `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(ClientConfig::from_file(path)?)
    }

    /// The configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The context every envelope is built from
    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    /// Same client addressing another keyspace
    pub fn with_keyspace(&self, keyspace: impl Into<String>) -> Client {
        Client {
            context: self.context.with_keyspace(keyspace),
            ..self.clone()
        }
    }

    /// Encode `request` without sending it
    pub fn envelope(&self, request: &QueryRequest) -> Result<QueryEnvelope> {
        Ok(build(&self.context, request)?)
    }

    /// Run a one-shot command and return its decoded reply.
    ///
    /// Subscription commands are rejected; use [`Client::subscribe`].
    pub async fn execute(&self, request: &QueryRequest) -> Result<JsonValue> {
        let envelope = self.envelope(request)?;
        if envelope.is_subscription() {
            return Err(RequestError::InvalidRequest {
                reason: format!("'{}' streams replies; use subscribe", envelope.command()),
            }
            .into());
        }
        debug!(
            command = envelope.command(),
            keyspace = %self.context.keyspace,
            "executing"
        );
        let mut transport = Transport::new(self.transport.clone());
        Ok(transport.request(&envelope).await?)
    }

    /// Start a subscription; `handler` receives every line in order.
    ///
    /// One-shot commands are rejected; use [`Client::execute`].
    pub async fn subscribe<H>(&self, request: &QueryRequest, handler: H) -> Result<Subscription>
    where
        H: FnMut(StreamEvent) + Send + 'static,
    {
        let envelope = self.envelope(request)?;
        if !envelope.is_subscription() {
            return Err(RequestError::InvalidRequest {
                reason: format!("'{}' replies once; use execute", envelope.command()),
            }
            .into());
        }
        debug!(
            command = envelope.command(),
            keyspace = %self.context.keyspace,
            "subscribing"
        );
        Ok(Transport::new(self.transport.clone())
            .subscribe(&envelope, handler)
            .await?)
    }

    /// Run an administrative command with the configured credentials
    pub async fn admin(&self, request: &AdminRequest) -> Result<JsonValue> {
        let envelope = request.encode(&self.context.credentials)?;
        debug!(action = envelope.command(), "executing admin command");
        let mut transport = Transport::new(self.transport.clone());
        Ok(transport.request(&envelope).await?)
    }

    /// Store `value` under `key`
    pub async fn insert(&self, key: impl Into<Key>, value: Record) -> Result<JsonValue> {
        self.execute(&QueryRequest::new(Command::Set).key(key).value(value))
            .await
    }

    /// Fetch the record under `key`
    pub async fn get(&self, key: impl Into<Key>) -> Result<JsonValue> {
        self.execute(&QueryRequest::new(Command::Get).key(key)).await
    }

    /// Records matching `criteria`
    pub async fn search(&self, criteria: Record) -> Result<JsonValue> {
        self.execute(&QueryRequest::new(Command::Search).search_criteria(criteria))
            .await
    }

    /// Remove the record under `key`
    pub async fn delete(&self, key: impl Into<Key>) -> Result<JsonValue> {
        self.execute(&QueryRequest::new(Command::Delete).key(key))
            .await
    }
}
