// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: a resilient WebSocket client runtime.
//!
//! Keeps a single logical connection alive across network interruptions.
//! A per-connection actor owns the lifecycle state machine, reconnects with a
//! pluggable [`BackoffStrategy`], and fans every event out to independent
//! subscribers through the [`EventBus`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐ commands ┌──────────────┐  open/close  ┌─────────────┐
//! │ Connection  │─────────►│ StateMachine │─────────────►│  Transport  │
//! │  (façade)   │          │   (actor)    │◄─────────────│   (trait)   │
//! └──────┬──────┘          └──────┬───────┘    events    └─────────────┘
//!        │ observe                │ publish
//!        ▼                        ▼
//! ┌─────────────┐          ┌──────────────┐
//! │ EventMapper │◄─────────│   EventBus   │
//! │ (projection)│          │  (fan-out)   │
//! └─────────────┘          └──────────────┘
//! ```
//!
//! The socket itself is provided by a [`TransportFactory`]; see the
//! `tether-ws` crate for one backed by `tokio-tungstenite`.

pub mod backoff;
pub mod bus;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod machine;
pub mod mapper;
pub mod message;
pub mod state;
pub mod transport;

pub use backoff::{Backoff, BackoffStrategy, Capped, ExponentialBackoff, LinearBackoff};
pub use bus::{EventBus, EventStream, SubscriberId, DEFAULT_SUBSCRIBER_CAPACITY};
pub use config::{BackoffConfig, ConnectionConfig};
pub use connection::{Connection, ConnectionBuilder};
pub use dispatch::{
    Binding, ContractKind, Invocation, Operation, OperationDecl, Outcome, ServiceDecl,
    ServiceDispatcher,
};
pub use error::{ConfigError, DispatchError, TransportError, TransportResult};
pub use event::{ConnectionCommand, MachineEvent};
pub use mapper::{EventMapper, Projected, ProjectedStream, Projection};
pub use message::{Message, ShutdownReason};
pub use state::{ConnectionState, Session, SessionId};
pub use transport::{
    event_channel, EventSender, Transport, TransportEvent, TransportEventStream, TransportFactory,
};

#[cfg(test)]
mod test_helpers;
