//! Subscription streams
//!
//! A subscription owns its socket inside a spawned task. Every line the
//! server writes is decoded and handed to the caller's handler in the order
//! it arrived. The stream ends when the server closes the connection or the
//! caller stops it.
//!
//! Stopping is a flag plus a watch signal. Every handler call runs under a
//! delivery lock and rechecks the flag once it holds it. [`StopHandle::stop`]
//! sets the flag and then takes the same lock, so when it returns any call
//! in flight has finished and no new call can begin. The signal wakes the
//! task if it is parked on a read, which then drops the socket.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use serde_json::Value as JsonValue;
use tessera_wire::decode_line;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::transport::TransportState;

/// What the handler receives for each line
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A decoded line
    Message(JsonValue),
    /// A line that could not be delivered as a message
    DecodeFailure {
        /// The raw line, lossily converted to text
        line: String,
        /// Why it failed
        reason: String,
    },
}

/// How a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The caller stopped it
    Stopped,
    /// The server closed the connection
    Closed,
}

struct StopSignal {
    stopped: AtomicBool,
    tx: watch::Sender<bool>,
    // Reentrant so a handler may stop its own stream
    delivery: ReentrantMutex<()>,
}

/// Cloneable stop control, usable from any task
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<StopSignal>,
}

impl StopHandle {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        StopHandle {
            inner: Arc::new(StopSignal {
                stopped: AtomicBool::new(false),
                tx,
                delivery: ReentrantMutex::new(()),
            }),
        }
    }

    /// Stop the stream. Returns false if it was already stopped.
    ///
    /// Blocks until a handler call in progress on another thread returns.
    pub fn stop(&self) -> bool {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.tx.send_replace(true);
        drop(self.inner.delivery.lock());
        true
    }

    /// True once [`StopHandle::stop`] has been called
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    fn receiver(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// A running subscription.
///
/// Dropping the handle detaches the stream; it keeps running until the
/// server closes it. Call [`Subscription::stop`] to end it.
#[derive(Debug)]
pub struct Subscription {
    stop: StopHandle,
    state: Arc<RwLock<TransportState>>,
    task: JoinHandle<Result<StreamEnd>>,
    host: String,
    port: u16,
}

impl Subscription {
    pub(crate) fn new(
        stop: StopHandle,
        state: Arc<RwLock<TransportState>>,
        task: JoinHandle<Result<StreamEnd>>,
        host: String,
        port: u16,
    ) -> Self {
        Subscription {
            stop,
            state,
            task,
            host,
            port,
        }
    }

    /// Stop delivering lines and release the socket. Idempotent.
    pub fn stop(&self) {
        if self.stop.stop() {
            debug!(host = %self.host, port = self.port, "subscription stop requested");
        }
    }

    /// A stop control that can be moved to another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// True once stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Current transport state
    pub fn state(&self) -> TransportState {
        *self.state.read()
    }

    /// True once the stream task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stream to end
    pub async fn finished(self) -> Result<StreamEnd> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(TransportError::Io {
                host: self.host,
                port: self.port,
                source: io::Error::new(io::ErrorKind::Other, e.to_string()),
            }),
        }
    }
}

/// The socket and bookkeeping a stream task owns
pub(crate) struct StreamTask {
    pub(crate) reader: BufReader<OwnedReadHalf>,
    pub(crate) writer: OwnedWriteHalf,
    pub(crate) stop: StopHandle,
    pub(crate) state: Arc<RwLock<TransportState>>,
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl StreamTask {
    pub(crate) async fn run<H>(self, mut handler: H) -> Result<StreamEnd>
    where
        H: FnMut(StreamEvent),
    {
        let StreamTask {
            mut reader,
            writer,
            stop,
            state,
            host,
            port,
        } = self;
        let mut stop_rx = stop.receiver();
        let mut line = Vec::new();
        let mut delivered: u64 = 0;

        let outcome = loop {
            // The receiver predates this check, so a later stop still wakes `changed`
            if stop.is_stopped() {
                break Ok(StreamEnd::Stopped);
            }
            line.clear();
            let read = tokio::select! {
                biased;
                _ = stop_rx.changed() => break Ok(StreamEnd::Stopped),
                read = reader.read_until(b'\n', &mut line) => read,
            };

            match read {
                Ok(0) => break Ok(StreamEnd::Closed),
                Ok(n) => {
                    trace!(host = %host, port, bytes = n, "stream line received");
                    let (event, raw) = event_for(&line);
                    let _delivery = stop.inner.delivery.lock();
                    if stop.is_stopped() {
                        break Ok(StreamEnd::Stopped);
                    }
                    deliver(&mut handler, event, &raw);
                    delivered += 1;
                }
                Err(e) => {
                    warn!(host = %host, port, error = %e, "subscription read failed");
                    break Err(TransportError::Io {
                        host: host.clone(),
                        port,
                        source: e,
                    });
                }
            }
        };

        // Release the socket before reporting the final state
        drop(reader);
        drop(writer);
        *state.write() = match outcome {
            Ok(StreamEnd::Stopped) => TransportState::Stopped,
            _ => TransportState::Closed,
        };
        debug!(host = %host, port, delivered, outcome = ?outcome.as_ref().ok(), "subscription ended");
        outcome
    }
}

fn event_for(line: &[u8]) -> (StreamEvent, String) {
    match std::str::from_utf8(line) {
        Ok(text) => (StreamEvent::Message(decode_line(text)), text.to_string()),
        Err(e) => {
            let raw = String::from_utf8_lossy(line).into_owned();
            let event = StreamEvent::DecodeFailure {
                line: raw.clone(),
                reason: format!("line is not valid UTF-8: {}", e),
            };
            (event, raw)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Call the handler; a panic becomes a decode failure for the same line
fn deliver<H: FnMut(StreamEvent)>(handler: &mut H, event: StreamEvent, raw: &str) {
    let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(event))) else {
        return;
    };
    let reason = format!("handler panicked: {}", panic_message(payload.as_ref()));
    warn!(reason = %reason, "subscription handler failed on a line");
    let failure = StreamEvent::DecodeFailure {
        line: raw.trim_end_matches(['\r', '\n']).to_string(),
        reason,
    };
    if panic::catch_unwind(AssertUnwindSafe(|| handler(failure))).is_err() {
        warn!("subscription handler panicked on a decode failure; line skipped");
    }
}
