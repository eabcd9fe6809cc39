// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted transports shared by the unit tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{Stream, StreamExt};

use crate::error::{TransportError, TransportResult};
use crate::message::{Message, ShutdownReason};
use crate::transport::{
    event_channel, EventSender, Transport, TransportEvent, TransportEventStream, TransportFactory,
};

/// Transport whose events are pushed by the test.
pub struct MockTransport {
    events: Mutex<Option<EventSender>>,
    stream: Mutex<Option<TransportEventStream>>,
    fail_open: bool,
    opened: AtomicBool,
    cancelled: AtomicBool,
    send_result: AtomicBool,
    sent: Mutex<Vec<Message>>,
    closes: Mutex<Vec<ShutdownReason>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    /// A transport whose `open` returns an error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(fail_open: bool) -> Self {
        let (tx, stream) = event_channel();
        MockTransport {
            events: Mutex::new(Some(tx)),
            stream: Mutex::new(Some(stream)),
            fail_open,
            opened: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            send_result: AtomicBool::new(true),
            sent: Mutex::new(Vec::new()),
            closes: Mutex::new(Vec::new()),
        }
    }

    /// Report an event as if it came from the socket.
    pub fn emit(&self, event: TransportEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(Ok(event));
        }
    }

    /// Report a delivery-layer error.
    pub fn emit_error(&self, err: TransportError) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(Err(err));
        }
    }

    /// End the event stream.
    pub fn end(&self) {
        self.events.lock().unwrap().take();
    }

    pub fn set_send_result(&self, result: bool) {
        self.send_result.store(result, Ordering::SeqCst);
    }

    pub fn was_opened(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn closes(&self) -> Vec<ShutdownReason> {
        self.closes.lock().unwrap().clone()
    }

    /// True once the state machine closed or cancelled this transport.
    pub fn is_released(&self) -> bool {
        self.is_cancelled() || !self.closes.lock().unwrap().is_empty()
    }
}

impl Transport for MockTransport {
    fn open(&self) -> TransportResult<TransportEventStream> {
        if self.fail_open {
            return Err(TransportError::ConnectionFailed("mock failure".into()));
        }
        self.opened.store(true, Ordering::SeqCst);
        self.stream
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| TransportError::ConnectionFailed("already opened".into()))
    }

    fn send(&self, message: Message) -> bool {
        self.sent.lock().unwrap().push(message);
        self.send_result.load(Ordering::SeqCst)
    }

    fn close(&self, reason: ShutdownReason) -> bool {
        self.closes.lock().unwrap().push(reason);
        true
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FactoryState {
    created: Vec<Arc<MockTransport>>,
    fail_open: bool,
}

/// Factory that records every transport it creates.
#[derive(Clone, Default)]
pub struct MockFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequently created transports fail to open.
    pub fn fail_open(&self, fail: bool) {
        self.state.lock().unwrap().fail_open = fail;
    }

    pub fn created(&self) -> usize {
        self.state.lock().unwrap().created.len()
    }

    pub fn transport(&self, index: usize) -> Arc<MockTransport> {
        Arc::clone(&self.state.lock().unwrap().created[index])
    }

    pub fn last(&self) -> Arc<MockTransport> {
        Arc::clone(self.state.lock().unwrap().created.last().expect("no transport created"))
    }
}

impl TransportFactory for MockFactory {
    fn create(&self) -> Arc<dyn Transport> {
        let mut state = self.state.lock().unwrap();
        let transport = if state.fail_open {
            MockTransport::failing()
        } else {
            MockTransport::new()
        };
        state.created.push(Arc::clone(&transport));
        transport
    }
}

/// Await the next stream item, failing the test if none arrives.
///
/// Under a paused clock the timeout only elapses once every pending timer
/// (such as an armed retry) has fired.
pub async fn next_item<S>(stream: &mut S) -> S::Item
where
    S: Stream + Unpin,
{
    tokio::time::timeout(Duration::from_secs(3_600), stream.next())
        .await
        .expect("timed out waiting for stream item")
        .expect("stream ended")
}

/// Let spawned tasks run until they are all idle.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
