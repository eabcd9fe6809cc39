// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing handle to one resilient connection.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info_span, Instrument};

use crate::backoff::{BackoffStrategy, LinearBackoff};
use crate::bus::{EventBus, EventStream, SubscriberId};
use crate::config::ConnectionConfig;
use crate::error::ConfigError;
use crate::event::ConnectionCommand;
use crate::machine::{Inbox, Input, StateMachine};
use crate::mapper::{Projection, ProjectedStream};
use crate::message::Message;
use crate::state::ConnectionState;
use crate::transport::TransportFactory;

/// Handle to a connection actor.
///
/// Clones share the same connection. Dropping the last clone shuts it down.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    label: String,
    inbox: Inbox,
    state: watch::Receiver<ConnectionState>,
    bus: EventBus,
    _shutdown: DropGuard,
}

impl Connection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    /// Connect if currently disconnected. Otherwise a no-op.
    pub fn start(&self) {
        self.command(ConnectionCommand::Start);
    }

    /// Close the connection and cancel any pending retry. Always safe.
    pub fn shutdown(&self) {
        self.command(ConnectionCommand::Terminate);
    }

    fn command(&self, command: ConnectionCommand) {
        if self.inner.inbox.send(Input::Command(command)).is_err() {
            debug!(label = %self.inner.label, ?command, "connection actor is gone");
        }
    }

    /// Send a message over the open session. Returns false without waiting
    /// when the connection is not open.
    pub fn send(&self, message: impl Into<Message>) -> bool {
        let session = match &*self.inner.state.borrow() {
            ConnectionState::Connected { session } => session.clone(),
            _ => return false,
        };
        session.send(message.into())
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().is_connected()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.clone()
    }

    /// Subscribe to every event published from now on.
    pub fn observe(&self, token: impl Into<SubscriberId>) -> EventStream {
        self.inner.bus.subscribe(token)
    }

    /// Subscribe through the projection for `T`.
    pub fn observe_as<T: Projection>(&self, token: impl Into<SubscriberId>) -> ProjectedStream<T> {
        ProjectedStream::typed(self.observe(token))
    }

    /// Stop delivery to `token`. Returns false if it was not subscribed.
    pub fn unobserve(&self, token: impl Into<SubscriberId>) -> bool {
        self.inner.bus.unsubscribe(&token.into())
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("label", &self.inner.label)
            .field("state", &self.inner.state.borrow().name())
            .finish()
    }
}

/// Assembles a [`Connection`] and spawns its actor on the current runtime.
#[derive(Default)]
pub struct ConnectionBuilder {
    factory: Option<Arc<dyn TransportFactory>>,
    backoff: Option<Arc<dyn BackoffStrategy>>,
    config: ConnectionConfig,
}

impl ConnectionBuilder {
    /// Source of a fresh transport for every attempt. Required.
    pub fn transport_factory(mut self, factory: impl TransportFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Retry policy. Defaults to [`LinearBackoff::default`].
    pub fn backoff(mut self, backoff: impl BackoffStrategy + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.config.auto_start = auto_start;
        self
    }

    /// Spawn the actor. Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Connection, ConfigError> {
        let factory = self.factory.ok_or(ConfigError::MissingTransportFactory)?;
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        let backoff = self
            .backoff
            .unwrap_or_else(|| Arc::new(LinearBackoff::default()));

        let label = self.config.label.clone();
        let bus = EventBus::with_capacity(self.config.subscriber_capacity);
        let (machine, rx) = StateMachine::new(self.config, factory, backoff, bus.clone());
        let inbox = machine.inbox();
        let state = machine.watch_state();

        let shutdown = CancellationToken::new();
        let span = info_span!("connection", label = %label);
        runtime.spawn(machine.run(rx, shutdown.clone()).instrument(span));

        Ok(Connection {
            inner: Arc::new(Inner {
                label,
                inbox,
                state,
                bus,
                _shutdown: shutdown.drop_guard(),
            }),
        })
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
