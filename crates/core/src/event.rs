// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Events carried on the event bus.

use crate::state::ConnectionState;
use crate::transport::TransportEvent;

/// Caller-issued lifecycle commands. Both are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionCommand {
    Start,
    Terminate,
}

/// The unit of the event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineEvent {
    Connection(ConnectionCommand),
    Transport(TransportEvent),
    /// Emitted after every transition that changed the state.
    StateChanged(ConnectionState),
    /// The retry timer fired.
    RetryFired,
}

impl MachineEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            MachineEvent::Connection(ConnectionCommand::Start) => "start",
            MachineEvent::Connection(ConnectionCommand::Terminate) => "terminate",
            MachineEvent::Transport(event) => event.name(),
            MachineEvent::StateChanged(_) => "state_changed",
            MachineEvent::RetryFired => "retry_fired",
        }
    }
}

impl From<ConnectionCommand> for MachineEvent {
    fn from(command: ConnectionCommand) -> Self {
        MachineEvent::Connection(command)
    }
}

impl From<TransportEvent> for MachineEvent {
    fn from(event: TransportEvent) -> Self {
        MachineEvent::Transport(event)
    }
}
