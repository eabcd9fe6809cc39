// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed projections over the raw event stream.
//!
//! A consumer picks one of four views once, when it subscribes:
//!
//! | Type | Keeps |
//! |------|-------|
//! | [`MachineEvent`] | everything |
//! | [`ConnectionState`] | `StateChanged` payloads |
//! | [`TransportEvent`] | `Transport` payloads |
//! | [`Message`] | payloads of `TransportEvent::MessageReceived` |

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use crate::bus::EventStream;
use crate::error::ConfigError;
use crate::event::MachineEvent;
use crate::message::Message;
use crate::state::ConnectionState;
use crate::transport::TransportEvent;

/// Projection selected for a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventMapper {
    Identity,
    States,
    TransportEvents,
    Messages,
}

/// A projected event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projected {
    Event(MachineEvent),
    State(ConnectionState),
    Transport(TransportEvent),
    Message(Message),
}

impl EventMapper {
    /// Resolve a mapper from a declared type name.
    pub fn for_type_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "MachineEvent" => Ok(EventMapper::Identity),
            "ConnectionState" => Ok(EventMapper::States),
            "TransportEvent" => Ok(EventMapper::TransportEvents),
            "Message" => Ok(EventMapper::Messages),
            other => Err(ConfigError::UnsupportedProjection(other.to_string())),
        }
    }

    /// The type name this mapper produces.
    pub fn type_name(&self) -> &'static str {
        match self {
            EventMapper::Identity => "MachineEvent",
            EventMapper::States => "ConnectionState",
            EventMapper::TransportEvents => "TransportEvent",
            EventMapper::Messages => "Message",
        }
    }

    /// Project one raw event. `None` when it does not match this view.
    pub fn map(&self, event: MachineEvent) -> Option<Projected> {
        match (self, event) {
            (EventMapper::Identity, event) => Some(Projected::Event(event)),
            (EventMapper::States, MachineEvent::StateChanged(state)) => {
                Some(Projected::State(state))
            }
            (EventMapper::TransportEvents, MachineEvent::Transport(event)) => {
                Some(Projected::Transport(event))
            }
            (
                EventMapper::Messages,
                MachineEvent::Transport(TransportEvent::MessageReceived(message)),
            ) => Some(Projected::Message(message)),
            _ => None,
        }
    }
}

impl fmt::Display for EventMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Types a consumer can observe the event stream as.
pub trait Projection: Sized + Send + 'static {
    const MAPPER: EventMapper;

    fn from_projected(projected: Projected) -> Option<Self>;
}

impl Projection for MachineEvent {
    const MAPPER: EventMapper = EventMapper::Identity;

    fn from_projected(projected: Projected) -> Option<Self> {
        match projected {
            Projected::Event(event) => Some(event),
            _ => None,
        }
    }
}

impl Projection for ConnectionState {
    const MAPPER: EventMapper = EventMapper::States;

    fn from_projected(projected: Projected) -> Option<Self> {
        match projected {
            Projected::State(state) => Some(state),
            _ => None,
        }
    }
}

impl Projection for TransportEvent {
    const MAPPER: EventMapper = EventMapper::TransportEvents;

    fn from_projected(projected: Projected) -> Option<Self> {
        match projected {
            Projected::Transport(event) => Some(event),
            _ => None,
        }
    }
}

impl Projection for Message {
    const MAPPER: EventMapper = EventMapper::Messages;

    fn from_projected(projected: Projected) -> Option<Self> {
        match projected {
            Projected::Message(message) => Some(message),
            _ => None,
        }
    }
}

/// An [`EventStream`] filtered through an [`EventMapper`].
pub struct ProjectedStream<T> {
    events: EventStream,
    mapper: EventMapper,
    convert: fn(Projected) -> Option<T>,
}

impl ProjectedStream<Projected> {
    /// Untyped projection, selected at runtime.
    pub fn new(events: EventStream, mapper: EventMapper) -> Self {
        ProjectedStream {
            events,
            mapper,
            convert: Some,
        }
    }
}

impl<T: Projection> ProjectedStream<T> {
    /// Typed projection, selected by `T`.
    pub fn typed(events: EventStream) -> Self {
        ProjectedStream {
            events,
            mapper: T::MAPPER,
            convert: T::from_projected,
        }
    }
}

impl<T> ProjectedStream<T> {
    pub fn mapper(&self) -> EventMapper {
        self.mapper
    }

    /// The underlying subscription.
    pub fn events(&self) -> &EventStream {
        &self.events
    }

    fn project(&self, event: MachineEvent) -> Option<T> {
        self.mapper.map(event).and_then(self.convert)
    }
}

impl<T> fmt::Debug for ProjectedStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedStream")
            .field("events", &self.events)
            .field("mapper", &self.mapper)
            .finish()
    }
}

impl<T> Stream for ProjectedStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        loop {
            match Pin::new(&mut self.events).poll_next(cx) {
                Poll::Ready(Some(event)) => {
                    if let Some(item) = self.project(event) {
                        return Poll::Ready(Some(item));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
