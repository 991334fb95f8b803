//! Transport state machine
//!
//! One transport drives one socket. A one-shot request runs
//!
//! ```text
//! Idle -> Connecting -> Sending -> AwaitingReply -> Closed
//! ```
//!
//! and a subscription runs
//!
//! ```text
//! Idle -> Connecting -> Sending -> Streaming -> Closed | Stopped
//! ```
//!
//! The envelope's [`CommandKind`] picks the branch. Failures move straight
//! to `Closed` and are returned, never retried.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use tessera_wire::{decode_line, CommandKind, QueryEnvelope};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::subscription::{StopHandle, StreamEvent, StreamTask, Subscription};

/// Where a transport is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Nothing started
    Idle,
    /// Opening the socket
    Connecting,
    /// Writing the envelope
    Sending,
    /// Waiting for the single reply line
    AwaitingReply,
    /// Delivering subscription lines
    Streaming,
    /// Socket released after a reply, a server close, or a failure
    Closed,
    /// Socket released because the caller stopped the stream
    Stopped,
}

/// Result of [`Transport::dispatch`]
#[derive(Debug)]
pub enum Dispatch {
    /// The decoded one-shot reply
    Reply(JsonValue),
    /// A running subscription
    Streaming(Subscription),
}

/// Socket owner for one logical query or one subscription
#[derive(Debug)]
pub struct Transport {
    config: TransportConfig,
    state: Arc<RwLock<TransportState>>,
}

impl Transport {
    /// A transport that has not connected yet
    pub fn new(config: TransportConfig) -> Self {
        Transport {
            config,
            state: Arc::new(RwLock::new(TransportState::Idle)),
        }
    }

    /// The configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> TransportState {
        *self.state.read()
    }

    fn set_state(&self, state: TransportState) {
        *self.state.write() = state;
    }

    fn io_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Io {
            host: self.config.host.clone(),
            port: self.config.port,
            source,
        }
    }

    async fn connect(&self) -> Result<TcpStream> {
        self.set_state(TransportState::Connecting);
        let host = self.config.host.as_str();
        let port = self.config.port;
        let stream = timeout(self.config.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                host: host.to_string(),
                port,
                timeout_ms: self.config.connect_timeout.as_millis() as u64,
            })?
            .map_err(|source| TransportError::Connect {
                host: host.to_string(),
                port,
                source,
            })?;
        // Requests are small and latency bound
        let _ = stream.set_nodelay(true);
        debug!(host, port, "connected");
        Ok(stream)
    }

    async fn send(&self, writer: &mut OwnedWriteHalf, envelope: &QueryEnvelope) -> Result<()> {
        self.set_state(TransportState::Sending);
        writer
            .write_all(envelope.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        writer.write_all(b"\n").await.map_err(|e| self.io_error(e))?;
        writer.flush().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Send a one-shot envelope and return its decoded reply.
    ///
    /// Reads exactly one line, bounded by the read timeout, then closes the
    /// socket. A server that closes without replying yields
    /// [`TransportError::Closed`].
    pub async fn request(&mut self, envelope: &QueryEnvelope) -> Result<JsonValue> {
        let outcome = self.request_inner(envelope).await;
        self.set_state(TransportState::Closed);
        outcome
    }

    async fn request_inner(&self, envelope: &QueryEnvelope) -> Result<JsonValue> {
        let total_start = Instant::now();

        let connect_start = Instant::now();
        let stream = self.connect().await?;
        let connect_elapsed = connect_start.elapsed();

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let write_start = Instant::now();
        self.send(&mut writer, envelope).await?;
        let write_elapsed = write_start.elapsed();

        self.set_state(TransportState::AwaitingReply);
        let read_start = Instant::now();
        let mut line = Vec::new();
        let read = timeout(self.config.read_timeout, reader.read_until(b'\n', &mut line))
            .await
            .map_err(|_| TransportError::ReadTimeout {
                host: self.config.host.clone(),
                port: self.config.port,
                timeout_ms: self.config.read_timeout.as_millis() as u64,
            })?
            .map_err(|e| self.io_error(e))?;
        let read_elapsed = read_start.elapsed();

        if read == 0 {
            return Err(TransportError::Closed {
                host: self.config.host.clone(),
                port: self.config.port,
            });
        }

        let decode_start = Instant::now();
        let reply = decode_line(&String::from_utf8_lossy(&line));
        let decode_elapsed = decode_start.elapsed();

        debug!(
            command = envelope.command(),
            host = %self.config.host,
            port = self.config.port,
            bytes_sent = envelope.len() + 1,
            bytes_received = read,
            total_ms = total_start.elapsed().as_micros() as f64 / 1000.0,
            connect_ms = connect_elapsed.as_micros() as f64 / 1000.0,
            write_ms = write_elapsed.as_micros() as f64 / 1000.0,
            read_ms = read_elapsed.as_micros() as f64 / 1000.0,
            decode_ms = decode_elapsed.as_micros() as f64 / 1000.0,
            "one-shot timing breakdown"
        );

        Ok(reply)
    }

    /// Send a subscription envelope and stream replies to `handler`.
    ///
    /// Connect and send failures are returned here. Once streaming, lines
    /// are delivered from a spawned task in arrival order; the returned
    /// [`Subscription`] stops the stream and reports how it ended.
    pub async fn subscribe<H>(self, envelope: &QueryEnvelope, handler: H) -> Result<Subscription>
    where
        H: FnMut(StreamEvent) + Send + 'static,
    {
        let stream = match self.connect().await {
            Ok(stream) => stream,
            Err(e) => {
                self.set_state(TransportState::Closed);
                return Err(e);
            }
        };
        let (reader, mut writer) = stream.into_split();
        if let Err(e) = self.send(&mut writer, envelope).await {
            self.set_state(TransportState::Closed);
            return Err(e);
        }
        self.set_state(TransportState::Streaming);
        debug!(
            command = envelope.command(),
            host = %self.config.host,
            port = self.config.port,
            bytes_sent = envelope.len() + 1,
            "subscription started"
        );

        let stop = StopHandle::new();
        let TransportConfig { host, port, .. } = self.config;
        let task = StreamTask {
            reader: BufReader::new(reader),
            writer,
            stop: stop.clone(),
            state: self.state.clone(),
            host: host.clone(),
            port,
        };
        let join = tokio::spawn(task.run(handler));
        Ok(Subscription::new(stop, self.state, join, host, port))
    }

    /// Send `envelope` down the branch its command kind calls for.
    ///
    /// `handler` is only used for subscriptions.
    pub async fn dispatch<H>(mut self, envelope: &QueryEnvelope, handler: H) -> Result<Dispatch>
    where
        H: FnMut(StreamEvent) + Send + 'static,
    {
        match envelope.kind() {
            CommandKind::OneShot => self.request(envelope).await.map(Dispatch::Reply),
            CommandKind::Subscription => self
                .subscribe(envelope, handler)
                .await
                .map(Dispatch::Streaming),
        }
    }
}
