// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-subscriber fan-out of machine events.
//!
//! Every subscriber gets its own bounded queue, so publishing is a
//! non-blocking insertion per subscriber and a slow consumer never holds up
//! the state machine or its peers. Ordering is FIFO per subscriber. A
//! subscriber whose queue is full is dropped from the bus: its stream yields
//! what was already queued and then ends, so it never sees a gap.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{trace, warn};

use crate::event::MachineEvent;

/// Caller-supplied token identifying a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SubscriberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SubscriberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Events a subscriber may leave unread before it is dropped.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 65_536;

type Subscribers = HashMap<SubscriberId, mpsc::Sender<MachineEvent>>;

/// Fan-out hub shared by the state machine and the connection façade.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose subscribers may each lag by at most `capacity` events
    /// (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        EventBus {
            subscribers: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber. Reusing a token replaces the earlier
    /// subscription, whose stream then ends.
    pub fn subscribe(&self, id: impl Into<SubscriberId>) -> EventStream {
        let id = id.into();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.lock().insert(id.clone(), tx);
        trace!(subscriber = %id, "subscribed");
        EventStream { id, rx }
    }

    /// Stop delivery to a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: &SubscriberId) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Deliver an event to every live subscriber. Subscribers whose stream
    /// was dropped, or whose queue is full, are pruned.
    pub fn publish(&self, event: &MachineEvent) {
        self.lock()
            .retain(|id, tx| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = %id, "subscriber lagging, dropped");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(subscriber = %id, "pruned closed subscriber");
                    false
                }
            });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_subscribed(&self, id: &SubscriberId) -> bool {
        self.lock().contains_key(id)
    }
}

/// Per-subscriber stream of machine events, in publication order.
pub struct EventStream {
    id: SubscriberId,
    rx: mpsc::Receiver<MachineEvent>,
}

impl EventStream {
    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    /// Receive the next event. `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<MachineEvent> {
        self.rx.recv().await
    }

    /// Receive an already-queued event without waiting.
    pub fn try_recv(&mut self) -> Option<MachineEvent> {
        self.rx.try_recv().ok()
    }
}

impl Stream for EventStream {
    type Item = MachineEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").field("id", &self.id).finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
