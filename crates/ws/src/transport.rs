// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket transport implementation using tokio-tungstenite.
//!
//! Each [`WsTransport`] owns one driver task that performs the handshake,
//! forwards frames in both directions, and reports what happened as
//! [`TransportEvent`]s. The driver always finishes by reporting
//! `Terminated`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once, OnceLock};

use futures_util::{SinkExt, StreamExt};
use tether_core::{
    event_channel, EventSender, Message, ShutdownReason, Transport, TransportError,
    TransportEvent, TransportEventStream, TransportFactory, TransportResult,
};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::request::RequestFactory;

/// Creates a [`WsTransport`] per connection attempt.
#[derive(Clone)]
pub struct WsTransportFactory {
    request: Arc<dyn RequestFactory>,
    heartbeat: Option<Arc<str>>,
}

impl WsTransportFactory {
    pub fn new(request: impl RequestFactory + 'static) -> Self {
        install_crypto_provider();
        WsTransportFactory {
            request: Arc::new(request),
            heartbeat: None,
        }
    }

    /// Swallow incoming text frames equal to `text` (application-level
    /// keep-alives).
    pub fn heartbeat_text(mut self, text: impl Into<String>) -> Self {
        self.heartbeat = Some(Arc::from(text.into()));
        self
    }
}

impl TransportFactory for WsTransportFactory {
    fn create(&self) -> Arc<dyn Transport> {
        Arc::new(WsTransport::new(
            Arc::clone(&self.request),
            self.heartbeat.clone(),
        ))
    }
}

enum Outgoing {
    Frame(WsMessage),
    Close(ShutdownReason),
}

/// One WebSocket connection attempt.
pub struct WsTransport {
    request: Arc<dyn RequestFactory>,
    heartbeat: Option<Arc<str>>,
    outgoing: OnceLock<mpsc::UnboundedSender<Outgoing>>,
    connected: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl WsTransport {
    pub fn new(request: Arc<dyn RequestFactory>, heartbeat: Option<Arc<str>>) -> Self {
        WsTransport {
            request,
            heartbeat,
            outgoing: OnceLock::new(),
            connected: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn queue(&self, outgoing: Outgoing) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.outgoing
            .get()
            .is_some_and(|tx| tx.send(outgoing).is_ok())
    }
}

impl Transport for WsTransport {
    fn open(&self) -> TransportResult<TransportEventStream> {
        let request = self.request.create()?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.outgoing
            .set(tx)
            .map_err(|_| TransportError::ConnectionFailed("transport already opened".into()))?;

        let (events, stream) = event_channel();
        let driver = Driver {
            events,
            outgoing: rx,
            connected: Arc::clone(&self.connected),
            heartbeat: self.heartbeat.clone(),
        };
        tokio::spawn(driver.run(request, self.cancel.clone()));
        Ok(stream)
    }

    fn send(&self, message: Message) -> bool {
        let frame = match message {
            Message::Text(text) => WsMessage::text(text),
            Message::Bytes(data) => WsMessage::binary(data),
        };
        self.queue(Outgoing::Frame(frame))
    }

    fn close(&self, reason: ShutdownReason) -> bool {
        self.queue(Outgoing::Close(reason))
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Driver {
    events: EventSender,
    outgoing: mpsc::UnboundedReceiver<Outgoing>,
    connected: Arc<AtomicBool>,
    heartbeat: Option<Arc<str>>,
}

impl Driver {
    fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(Ok(event));
    }

    async fn run(mut self, request: Request, cancel: CancellationToken) {
        let uri = request.uri().clone();
        let connect = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%uri, "cancelled before handshake");
                self.emit(TransportEvent::Terminated);
                return;
            }
            result = tokio_tungstenite::connect_async(request) => result,
        };
        let ws = match connect {
            Ok((ws, _response)) => ws,
            Err(e) => {
                warn!(%uri, error = %e, "websocket handshake failed");
                self.emit(TransportEvent::Failed(TransportError::ConnectionFailed(
                    e.to_string(),
                )));
                self.emit(TransportEvent::Terminated);
                return;
            }
        };
        debug!(%uri, "websocket open");
        self.connected.store(true, Ordering::SeqCst);
        self.emit(TransportEvent::Opened);

        let (mut sink, mut stream) = ws.split();
        let mut peer_close: Option<ShutdownReason> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%uri, "websocket cancelled");
                    break;
                }
                outgoing = self.outgoing.recv() => match outgoing {
                    Some(Outgoing::Frame(frame)) => {
                        if let Err(e) = sink.send(frame).await {
                            self.emit(TransportEvent::Failed(TransportError::SendFailed(
                                e.to_string(),
                            )));
                            break;
                        }
                    }
                    Some(Outgoing::Close(reason)) => {
                        debug!(%uri, %reason, "closing websocket");
                        let _ = sink.send(WsMessage::Close(Some(close_frame(&reason)))).await;
                        self.emit(TransportEvent::Closed(reason));
                        break;
                    }
                    None => break,
                },
                incoming = stream.next() => match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        if self.heartbeat.as_deref() == Some(text.as_str()) {
                            trace!("heartbeat");
                            continue;
                        }
                        self.emit(TransportEvent::MessageReceived(Message::Text(
                            text.as_str().to_owned(),
                        )));
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        self.emit(TransportEvent::MessageReceived(Message::Bytes(data)));
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        let reason = frame.map(shutdown_reason).unwrap_or_default();
                        debug!(%uri, %reason, "peer closing");
                        self.emit(TransportEvent::Closing(reason.clone()));
                        peer_close = Some(reason);
                    }
                    Some(Ok(_)) => {
                        // Ping and pong are answered by tungstenite.
                    }
                    Some(Err(e)) => {
                        warn!(%uri, error = %e, "websocket read failed");
                        self.emit(TransportEvent::Failed(TransportError::ReceiveFailed(
                            e.to_string(),
                        )));
                        break;
                    }
                    None => {
                        self.emit(TransportEvent::Closed(peer_close.take().unwrap_or_default()));
                        break;
                    }
                },
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        self.emit(TransportEvent::Terminated);
    }
}

/// `wss://` handshakes need a process-wide rustls provider. An application
/// that installed its own keeps it.
fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            trace!("rustls crypto provider already installed");
        }
    });
}

fn close_frame(reason: &ShutdownReason) -> CloseFrame {
    CloseFrame {
        code: CloseCode::from(reason.code),
        reason: reason.reason.clone().into(),
    }
}

fn shutdown_reason(frame: CloseFrame) -> ShutdownReason {
    ShutdownReason::new(u16::from(frame.code), frame.reason.as_str())
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
