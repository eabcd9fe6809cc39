// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The connection session driven by the `tether` command.

use futures_util::StreamExt;
use tether_core::{
    Binding, Connection, ConnectionConfig, ConnectionState, Invocation, ServiceDecl,
    ServiceDispatcher,
};
use tether_ws::{StaticUrlRequest, WsTransportFactory};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::colors;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::render;

const OPEN: &str = "open";
const CLOSE: &str = "close";
const SEND: &str = "send";
const RECEIVE: &str = "receive";

/// The operations the command needs, bound to one connection.
pub fn session_decl(receive: &str) -> ServiceDecl {
    ServiceDecl::interface("Session")
        .operation(OPEN, [Binding::Start])
        .operation(CLOSE, [Binding::Shutdown])
        .operation(SEND, [Binding::Send])
        .operation(RECEIVE, [Binding::Receive(receive.to_string())])
}

/// Build the connection and bind the session service. Must run inside a
/// tokio runtime.
pub fn bind(settings: &Settings) -> Result<ServiceDispatcher> {
    let request = StaticUrlRequest::new(settings.url.clone()).headers(settings.headers.clone());
    let mut factory = WsTransportFactory::new(request);
    if let Some(text) = &settings.heartbeat_text {
        factory = factory.heartbeat_text(text.clone());
    }

    let connection = Connection::builder()
        .transport_factory(factory)
        .backoff(settings.backoff.clone().into_strategy()?)
        .config(ConnectionConfig {
            label: settings.label.clone(),
            ..ConnectionConfig::default()
        })
        .build()?;
    Ok(ServiceDispatcher::bind(session_decl(&settings.receive), connection)?)
}

/// Run until interrupted, or until the connection gives up.
pub async fn run(settings: Settings) -> Result<()> {
    let session = bind(&settings)?;
    let mut states = session
        .connection()
        .observe_as::<ConnectionState>("tether::status");
    let mut received = session
        .invoke(RECEIVE, Invocation::Unit)?
        .into_events()
        .ok_or_else(|| Error::Io(std::io::Error::other("receive produced no stream")))?;
    let colorize = colors::should_colorize();

    info!(url = %settings.url, "connecting");
    session.invoke(OPEN, Invocation::Unit)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                debug!("interrupted");
                session.invoke(CLOSE, Invocation::Unit)?;
                return Ok(());
            }
            state = states.next() => {
                let Some(state) = state else {
                    return Err(Error::GaveUp);
                };
                eprintln!("{}", render::state_line(&state, colorize));
                if state.is_disconnected() {
                    return Err(Error::GaveUp);
                }
            }
            item = received.next() => match item {
                Some(item) => println!("{}", render::projected(&item)),
                None => return Err(Error::GaveUp),
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    let sent = session.invoke(SEND, Invocation::Payload(&line))?;
                    if sent.flag() != Some(true) {
                        warn!("not connected, message dropped");
                    }
                }
                None => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
