// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative service binding.
//!
//! A [`ServiceDecl`] names a set of operations, each annotated with one
//! [`Binding`]. [`ServiceDispatcher::bind`] validates the declaration once and
//! resolves every operation to an [`Operation`] against a [`Connection`], so
//! invoking never has to re-check the contract.
//!
//! ```no_run
//! # use tether_core::{Binding, Connection, ServiceDecl, ServiceDispatcher, Invocation};
//! # fn demo(connection: Connection) -> Result<(), tether_core::DispatchError> {
//! let decl = ServiceDecl::interface("Chat")
//!     .operation("open", [Binding::Start])
//!     .operation("say", [Binding::Send])
//!     .operation("incoming", [Binding::Receive("Message".into())]);
//! let chat = ServiceDispatcher::bind(decl, connection)?;
//! chat.invoke("open", Invocation::Unit)?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::connection::Connection;
use crate::error::DispatchError;
use crate::mapper::{EventMapper, Projected, ProjectedStream};
use crate::message::Message;

/// Whether a declaration describes a pure contract or an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Interface,
    Concrete,
}

/// Annotation attached to a declared operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Start,
    Shutdown,
    Send,
    /// Stream events projected to the named type.
    Receive(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDecl {
    pub name: String,
    pub bindings: Vec<Binding>,
}

/// A declared service contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDecl {
    name: String,
    kind: ContractKind,
    parents: Vec<String>,
    operations: Vec<OperationDecl>,
}

impl ServiceDecl {
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, ContractKind::Interface)
    }

    pub fn concrete(name: impl Into<String>) -> Self {
        Self::new(name, ContractKind::Concrete)
    }

    fn new(name: impl Into<String>, kind: ContractKind) -> Self {
        ServiceDecl {
            name: name.into(),
            kind,
            parents: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn operation(
        mut self,
        name: impl Into<String>,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> Self {
        self.operations.push(OperationDecl {
            name: name.into(),
            bindings: bindings.into_iter().collect(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn operations(&self) -> &[OperationDecl] {
        &self.operations
    }
}

/// What a bound operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Shutdown,
    Send,
    Receive(EventMapper),
}

impl Operation {
    fn resolve(decl: &OperationDecl) -> Result<Self, DispatchError> {
        let binding = match decl.bindings.as_slice() {
            [] => return Err(DispatchError::MissingBinding(decl.name.clone())),
            [binding] => binding,
            many => {
                return Err(DispatchError::MultipleBindings {
                    operation: decl.name.clone(),
                    count: many.len(),
                })
            }
        };
        Ok(match binding {
            Binding::Start => Operation::Start,
            Binding::Shutdown => Operation::Shutdown,
            Binding::Send => Operation::Send,
            Binding::Receive(type_name) => {
                Operation::Receive(EventMapper::for_type_name(type_name)?)
            }
        })
    }
}

/// Arguments of one call.
#[derive(Clone, Copy)]
pub enum Invocation<'a> {
    Unit,
    Payload(&'a dyn fmt::Display),
}

/// Result of one call.
#[derive(Debug)]
pub enum Outcome {
    /// Start and shutdown always report true. Send reports whether the
    /// message was accepted.
    Flag(bool),
    Events(ProjectedStream<Projected>),
}

impl Outcome {
    pub fn flag(&self) -> Option<bool> {
        match self {
            Outcome::Flag(flag) => Some(*flag),
            Outcome::Events(_) => None,
        }
    }

    pub fn into_events(self) -> Option<ProjectedStream<Projected>> {
        match self {
            Outcome::Events(events) => Some(events),
            Outcome::Flag(_) => None,
        }
    }
}

/// Registry of a validated service bound to one connection.
#[derive(Debug)]
pub struct ServiceDispatcher {
    service: String,
    connection: Connection,
    operations: HashMap<String, Operation>,
    next_receiver: AtomicU64,
}

impl ServiceDispatcher {
    /// Validate `decl` and bind its operations to `connection`.
    pub fn bind(decl: ServiceDecl, connection: Connection) -> Result<Self, DispatchError> {
        if decl.kind != ContractKind::Interface {
            return Err(DispatchError::NotAnInterface(decl.name));
        }
        if !decl.parents.is_empty() {
            return Err(DispatchError::InheritedMembers {
                service: decl.name,
                parents: decl.parents.join(", "),
            });
        }

        let mut operations = HashMap::with_capacity(decl.operations.len());
        for op in &decl.operations {
            let operation = Operation::resolve(op)?;
            if operations.insert(op.name.clone(), operation).is_some() {
                return Err(DispatchError::DuplicateOperation(op.name.clone()));
            }
        }
        debug!(service = %decl.name, operations = operations.len(), "bound service");

        Ok(ServiceDispatcher {
            service: decl.name,
            connection,
            operations,
            next_receiver: AtomicU64::new(0),
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn operation(&self, name: &str) -> Option<Operation> {
        self.operations.get(name).copied()
    }

    /// Declared operation names, sorted.
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn invoke(&self, name: &str, invocation: Invocation<'_>) -> Result<Outcome, DispatchError> {
        let operation = self
            .operation(name)
            .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))?;
        match operation {
            Operation::Start => {
                self.connection.start();
                Ok(Outcome::Flag(true))
            }
            Operation::Shutdown => {
                self.connection.shutdown();
                Ok(Outcome::Flag(true))
            }
            Operation::Send => match invocation {
                Invocation::Payload(payload) => Ok(Outcome::Flag(
                    self.connection.send(Message::Text(payload.to_string())),
                )),
                Invocation::Unit => Err(DispatchError::MissingPayload(name.to_string())),
            },
            Operation::Receive(mapper) => {
                let seq = self.next_receiver.fetch_add(1, Ordering::Relaxed);
                let token = format!("{}::{}#{}", self.service, name, seq);
                Ok(Outcome::Events(ProjectedStream::new(
                    self.connection.observe(token),
                    mapper,
                )))
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
