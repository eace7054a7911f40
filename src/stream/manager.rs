//! Lifecycle of the live push connection.

use crate::core::config::SessionConfig;
use crate::core::store::LocationStore;
use crate::stream::connector::StreamConnector;
use crate::StreamError;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
    /// Reconnection attempts are exhausted; no further attempts are made.
    Failed,
}

/// Owns the live event-stream connection: connect, bounded reconnection,
/// error surfacing, teardown.
///
/// An explicitly constructed, explicitly owned instance: the consumer
/// calls [`ConnectionManager::open`] once and [`ConnectionManager::close`]
/// on teardown. Inbound events travel reader task → FIFO channel →
/// forwarding task → `LocationStore::upsert`; in single-location mode the
/// forwarding task discards every event so the deep-linked view is never
/// perturbed by other participants.
pub struct ConnectionManager {
    connector: Arc<dyn StreamConnector>,
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
    state: Arc<Mutex<StreamState>>,
    last_error: Arc<Mutex<Option<StreamError>>>,
    closed: Arc<AtomicBool>,
    started: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn StreamConnector>, config: &SessionConfig) -> Self {
        Self {
            connector,
            max_reconnect_attempts: config.max_reconnect_attempts,
            reconnect_delay: config.reconnect_delay,
            state: Arc::new(Mutex::new(StreamState::Disconnected)),
            last_error: Arc::new(Mutex::new(None)),
            closed: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Starts the connection and the event-forwarding pipeline. Subsequent
    /// calls are no-ops. With `forward_upserts` false (single-location
    /// mode) events are drained and discarded.
    pub fn open(&self, store: LocationStore, forward_upserts: bool) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let forwarder = Self::spawn_forwarder(event_rx, store, forward_upserts, self.closed.clone());
        let reader = self.spawn_reader(event_tx);

        let mut handles = self.handles.lock().expect("connection lock poisoned");
        handles.push(reader);
        handles.push(forwarder);
    }

    /// Current connection state.
    pub fn state(&self) -> StreamState {
        *self.state.lock().expect("connection lock poisoned")
    }

    /// The most recent connectivity error, if any. Surfaced for display;
    /// never fatal to the rest of the session.
    pub fn last_error(&self) -> Option<StreamError> {
        self.last_error
            .lock()
            .expect("connection lock poisoned")
            .clone()
    }

    /// Closes the connection and releases the retry loop. Idempotent; late
    /// events are dropped, not applied.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut handles = self.handles.lock().expect("connection lock poisoned");
        for handle in handles.drain(..) {
            handle.abort();
        }
        *self.state.lock().expect("connection lock poisoned") = StreamState::Disconnected;
    }

    fn spawn_forwarder(
        mut event_rx: mpsc::UnboundedReceiver<crate::core::record::LocationRecord>,
        store: LocationStore,
        forward_upserts: bool,
        closed: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(record) = event_rx.recv().await {
                if closed.load(Ordering::SeqCst) {
                    break;
                }
                if forward_upserts {
                    store.upsert(record);
                } else {
                    log::debug!("discarding stream event in single-location mode");
                }
            }
        })
    }

    fn spawn_reader(
        &self,
        event_tx: mpsc::UnboundedSender<crate::core::record::LocationRecord>,
    ) -> JoinHandle<()> {
        let connector = self.connector.clone();
        let state = self.state.clone();
        let last_error = self.last_error.clone();
        let closed = self.closed.clone();
        let max_attempts = self.max_reconnect_attempts;
        let delay = self.reconnect_delay;

        tokio::spawn(async move {
            let set_state = |s: StreamState| {
                *state.lock().expect("connection lock poisoned") = s;
            };
            let record_error = |e: StreamError| {
                *last_error.lock().expect("connection lock poisoned") = Some(e);
            };

            // One initial attempt plus `max_attempts` reconnections; the
            // counter resets whenever a connection is established.
            let mut attempt: u32 = 0;
            loop {
                if closed.load(Ordering::SeqCst) {
                    return;
                }
                set_state(StreamState::Connecting);
                log::debug!("live connection attempt {}", attempt + 1);

                match connector.open().await {
                    Ok(mut events) => {
                        set_state(StreamState::Connected);
                        attempt = 0;
                        log::info!("live connection established");
                        while let Some(item) = events.next().await {
                            if closed.load(Ordering::SeqCst) {
                                return;
                            }
                            match item {
                                Ok(record) => {
                                    if event_tx.send(record).is_err() {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    log::warn!("live stream error: {}", e);
                                    record_error(e);
                                    break;
                                }
                            }
                        }
                        if closed.load(Ordering::SeqCst) {
                            return;
                        }
                        set_state(StreamState::Disconnected);
                        log::warn!("live connection lost");
                    }
                    Err(e) => {
                        log::warn!("live connection attempt failed: {}", e);
                        record_error(e);
                        set_state(StreamState::Disconnected);
                    }
                }

                if attempt >= max_attempts {
                    log::error!(
                        "giving up on live connection after {} reconnection attempt(s)",
                        max_attempts
                    );
                    if last_error
                        .lock()
                        .expect("connection lock poisoned")
                        .is_none()
                    {
                        record_error(StreamError::ConnectFailed(
                            "reconnection attempts exhausted".to_string(),
                        ));
                    }
                    set_state(StreamState::Failed);
                    return;
                }
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        })
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}
