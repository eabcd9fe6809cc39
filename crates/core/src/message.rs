// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Application payloads and close reasons.

use std::fmt;

use bytes::Bytes;

/// A single WebSocket payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Bytes(Bytes),
}

impl Message {
    /// Create a text message.
    pub fn text(value: impl Into<String>) -> Self {
        Message::Text(value.into())
    }

    /// Create a binary message.
    pub fn bytes(value: impl Into<Bytes>) -> Self {
        Message::Bytes(value.into())
    }

    /// Returns the text payload, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(value) => Some(value),
            Message::Bytes(_) => None,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Message::Text(value) => value.len(),
            Message::Bytes(value) => value.len(),
        }
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::Text(value)
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Message::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Message {
    fn from(value: Vec<u8>) -> Self {
        Message::Bytes(Bytes::from(value))
    }
}

const NORMAL_CLOSURE_CODE: u16 = 1000;
const NORMAL_CLOSURE_REASON: &str = "normal closure";

const ACTIVE_CLOSURE_CODE: u16 = 1001;
const ACTIVE_CLOSURE_REASON: &str = "actively closed";

/// Close code and reason of a WebSocket shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShutdownReason {
    pub code: u16,
    pub reason: String,
}

impl ShutdownReason {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        ShutdownReason {
            code,
            reason: reason.into(),
        }
    }

    /// The default reason for an orderly close.
    pub fn normal() -> Self {
        ShutdownReason::new(NORMAL_CLOSURE_CODE, NORMAL_CLOSURE_REASON)
    }

    /// The reason used when the caller (or the retry policy) closes the
    /// connection on purpose. Never followed by an automatic retry.
    pub fn actively() -> Self {
        ShutdownReason::new(ACTIVE_CLOSURE_CODE, ACTIVE_CLOSURE_REASON)
    }

    /// Returns true if this is the caller-initiated close reason.
    pub fn is_active(&self) -> bool {
        *self == ShutdownReason::actively()
    }
}

impl Default for ShutdownReason {
    fn default() -> Self {
        ShutdownReason::normal()
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.reason)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
