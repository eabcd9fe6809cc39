// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering of connection output.

use tether_core::{ConnectionState, MachineEvent, Message, Projected, TransportEvent};

use crate::colors::{codes, paint};

/// One status line for a state change.
pub fn state_line(state: &ConnectionState, colorize: bool) -> String {
    let text = format!("[{state}]");
    if !colorize {
        return text;
    }
    let code = match state {
        ConnectionState::Connected { .. } => codes::OPEN,
        ConnectionState::Connecting { .. } | ConnectionState::WaitingToRetry { .. } => {
            codes::PENDING
        }
        ConnectionState::Disconnected { .. } | ConnectionState::Disconnecting => codes::CONTEXT,
    };
    paint(code, &text)
}

pub fn message(message: &Message) -> String {
    match message {
        Message::Text(text) => text.clone(),
        Message::Bytes(data) => format!("<{} bytes>", data.len()),
    }
}

pub fn transport_event(event: &TransportEvent) -> String {
    match event {
        TransportEvent::MessageReceived(m) => format!("message: {}", message(m)),
        TransportEvent::Closing(reason) => format!("closing: {reason}"),
        TransportEvent::Closed(reason) => format!("closed: {reason}"),
        TransportEvent::Failed(err) => format!("failed: {err}"),
        other => other.name().to_string(),
    }
}

pub fn machine_event(event: &MachineEvent) -> String {
    match event {
        MachineEvent::Transport(inner) => transport_event(inner),
        MachineEvent::StateChanged(state) => format!("state: {state}"),
        other => other.name().to_string(),
    }
}

/// Render one item of the receive stream.
pub fn projected(item: &Projected) -> String {
    match item {
        Projected::Message(m) => message(m),
        Projected::Transport(event) => transport_event(event),
        Projected::State(state) => state.to_string(),
        Projected::Event(event) => machine_event(event),
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
