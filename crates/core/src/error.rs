// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tether-core.
//!
//! Only [`ConfigError`] and [`DispatchError`] ever reach a caller, and only
//! while a connection or service binding is being set up. Transport failures
//! travel as [`TransportEvent::Failed`](crate::TransportEvent::Failed) values
//! on the event stream instead.

use thiserror::Error;

/// Failure reported by a transport collaborator.
///
/// Cloneable so it can be fanned out to every subscriber inside a
/// `TransportEvent::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The connection is not open.
    #[error("connection closed")]
    ConnectionClosed,

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The connection request could not be built (bad URL or header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Setup-time configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a transport factory is required\n  hint: call ConnectionBuilder::transport_factory")]
    MissingTransportFactory,

    #[error("no tokio runtime is running\n  hint: build connections from inside a tokio runtime")]
    NoRuntime,

    #[error("invalid backoff: {0}")]
    InvalidBackoff(String),

    #[error("type {0} is not supported\n  hint: receive one of MachineEvent, TransportEvent, ConnectionState, Message")]
    UnsupportedProjection(String),
}

/// Errors raised while binding a declared service to a connection, or when
/// invoking an operation the binding does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("service declarations must be interfaces: {0}")]
    NotAnInterface(String),

    #[error("service interface {service} must not extend other interfaces (extends {parents})")]
    InheritedMembers { service: String, parents: String },

    #[error("operation {0} has no binding\n  hint: every operation needs exactly one of start, shutdown, send, receive")]
    MissingBinding(String),

    #[error("operation {operation} has {count} bindings\n  hint: every operation needs exactly one of start, shutdown, send, receive")]
    MultipleBindings { operation: String, count: usize },

    #[error("operation {0} is declared more than once")]
    DuplicateOperation(String),

    #[error("service operation not found: {0}")]
    UnknownOperation(String),

    #[error("operation {0} requires a payload")]
    MissingPayload(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
