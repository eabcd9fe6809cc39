// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle states and the sessions they own.

use std::fmt;
use std::sync::Arc;

use tokio::task::AbortHandle;

use crate::message::{Message, ShutdownReason};
use crate::transport::Transport;

/// Identifies one connection attempt. Never reused within a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn new(value: u64) -> Self {
        SessionId(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Exclusive wrapper around the transport of one connection attempt.
///
/// Snapshots handed to subscribers are cheap clones; only the state machine
/// ever closes or cancels the transport behind it.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    transport: Arc<dyn Transport>,
    /// Task forwarding transport events to the state machine.
    pump: Option<AbortHandle>,
}

impl Session {
    pub(crate) fn new(id: SessionId, transport: Arc<dyn Transport>) -> Self {
        Session {
            id,
            transport,
            pump: None,
        }
    }

    pub(crate) fn attach_pump(&mut self, pump: AbortHandle) {
        self.pump = Some(pump);
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn send(&self, message: Message) -> bool {
        self.transport.send(message)
    }

    /// Orderly close. Falls back to cancel when the transport had nothing
    /// open to close (e.g. still handshaking).
    pub(crate) fn close(&self, reason: ShutdownReason) {
        if !self.transport.close(reason) {
            self.transport.cancel();
        }
        self.stop_pump();
    }

    /// Immediate release.
    pub(crate) fn cancel(&self) {
        self.transport.cancel();
        self.stop_pump();
    }

    fn stop_pump(&self) {
        if let Some(pump) = &self.pump {
            pump.abort();
        }
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// At rest, no session. With `auto_start`, entering this state
    /// immediately starts a connection.
    Disconnected { auto_start: bool },
    /// Transport open in progress.
    Connecting { session: Session, retry_count: u32 },
    /// Transport reports open.
    Connected { session: Session },
    /// Backoff timer armed. `session` is the attempt that ended; it is
    /// cancelled when the timer fires or the connection is terminated.
    WaitingToRetry {
        retry_count: u32,
        retry_in_millis: u64,
        session: Session,
    },
    /// Transient: resolves to `Disconnected` within the same transition.
    Disconnecting,
}

impl ConnectionState {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected { .. } => "disconnected",
            ConnectionState::Connecting { .. } => "connecting",
            ConnectionState::Connected { .. } => "connected",
            ConnectionState::WaitingToRetry { .. } => "waiting_to_retry",
            ConnectionState::Disconnecting => "disconnecting",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, ConnectionState::Disconnected { .. })
    }

    /// The session this state owns, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            ConnectionState::Connecting { session, .. }
            | ConnectionState::Connected { session }
            | ConnectionState::WaitingToRetry { session, .. } => Some(session),
            ConnectionState::Disconnected { .. } | ConnectionState::Disconnecting => None,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session().map(Session::id)
    }

    /// Retry counter of the current retry sequence, if one is in progress.
    pub fn retry_count(&self) -> Option<u32> {
        match self {
            ConnectionState::Connecting { retry_count, .. }
            | ConnectionState::WaitingToRetry { retry_count, .. } => Some(*retry_count),
            _ => None,
        }
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected { auto_start: false }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting {
                session,
                retry_count,
            } => write!(f, "connecting ({}, retry {})", session.id(), retry_count),
            ConnectionState::Connected { session } => write!(f, "connected ({})", session.id()),
            ConnectionState::WaitingToRetry {
                retry_count,
                retry_in_millis,
                ..
            } => write!(
                f,
                "waiting to retry (retry {} in {}ms)",
                retry_count, retry_in_millis
            ),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
