// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport collaborator boundary.
//!
//! The runtime never speaks the WebSocket protocol itself. It asks a
//! [`TransportFactory`] for a fresh [`Transport`] on every connection
//! attempt and consumes the events that transport reports:
//! - Real sockets in production (`tether-ws`)
//! - Scripted transports for unit testing

use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

use crate::error::{TransportError, TransportResult};
use crate::message::{Message, ShutdownReason};

/// Lifecycle and data events reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The handshake completed.
    Opened,
    /// A payload arrived.
    MessageReceived(Message),
    /// The peer started the close handshake.
    Closing(ShutdownReason),
    /// The connection is closed.
    Closed(ShutdownReason),
    /// The connection failed or could not be opened.
    Failed(TransportError),
    /// The transport's event stream ended.
    Terminated,
}

impl TransportEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TransportEvent::Opened => "opened",
            TransportEvent::MessageReceived(_) => "message",
            TransportEvent::Closing(_) => "closing",
            TransportEvent::Closed(_) => "closed",
            TransportEvent::Failed(_) => "failed",
            TransportEvent::Terminated => "terminated",
        }
    }

    /// Returns true for events that end a connection (closing, closed,
    /// failed, terminated).
    pub fn is_shutdown(&self) -> bool {
        matches!(
            self,
            TransportEvent::Closing(_)
                | TransportEvent::Closed(_)
                | TransportEvent::Failed(_)
                | TransportEvent::Terminated
        )
    }
}

/// Events delivered by an opened transport. An `Err` item is folded into
/// [`TransportEvent::Failed`] by the state machine.
pub type TransportEventStream = BoxStream<'static, TransportResult<TransportEvent>>;

/// Sending half of [`event_channel`].
pub type EventSender = mpsc::UnboundedSender<TransportResult<TransportEvent>>;

/// One socket, used for exactly one connection attempt.
///
/// All methods are non-blocking: results of `open` arrive later as events.
pub trait Transport: Send + Sync {
    /// Start connecting. Can be called at most once per instance.
    fn open(&self) -> TransportResult<TransportEventStream>;

    /// Queue a payload. Returns false if the socket is not open.
    fn send(&self, message: Message) -> bool;

    /// Begin an orderly close. Returns false if there was nothing to close.
    fn close(&self, reason: ShutdownReason) -> bool;

    /// Drop the connection immediately and release its resources.
    fn cancel(&self);
}

/// Creates a brand-new transport for every connection attempt.
pub trait TransportFactory: Send + Sync {
    fn create(&self) -> Arc<dyn Transport>;
}

/// An unbounded channel whose receiving half is a [`TransportEventStream`].
///
/// Transport implementations push events from their own tasks into the
/// sender and return the stream from [`Transport::open`].
pub fn event_channel() -> (EventSender, TransportEventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let events = stream::unfold(rx, |mut rx| async move {
        let item = rx.recv().await?;
        Some((item, rx))
    })
    .boxed();
    (tx, events)
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
