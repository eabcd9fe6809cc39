// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handshake request construction.

use tether_core::{TransportError, TransportResult};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};

/// Builds the handshake request for each connection attempt.
pub trait RequestFactory: Send + Sync {
    fn create(&self) -> TransportResult<Request>;
}

/// A fixed URL plus extra handshake headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUrlRequest {
    url: String,
    headers: Vec<(String, String)>,
}

impl StaticUrlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        StaticUrlRequest {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RequestFactory for StaticUrlRequest {
    fn create(&self) -> TransportResult<Request> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            request.headers_mut().append(name, value);
        }
        Ok(request)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
