// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-ws: WebSocket transport for tether-core, built on tokio-tungstenite.
//!
//! ```no_run
//! # async fn demo() -> Result<(), tether_core::ConfigError> {
//! use tether_core::Connection;
//! use tether_ws::{StaticUrlRequest, WsTransportFactory};
//!
//! let request = StaticUrlRequest::new("wss://example.com/feed").header("x-token", "secret");
//! let connection = Connection::builder()
//!     .transport_factory(WsTransportFactory::new(request).heartbeat_text("ping"))
//!     .build()?;
//! connection.start();
//! # Ok(())
//! # }
//! ```

mod request;
mod transport;

pub use request::{RequestFactory, StaticUrlRequest};
pub use transport::{WsTransport, WsTransportFactory};

#[cfg(test)]
mod test_server;
