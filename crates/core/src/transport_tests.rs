// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    opened = { TransportEvent::Opened, false },
    message = { TransportEvent::MessageReceived(Message::text("hi")), false },
    closing = { TransportEvent::Closing(ShutdownReason::normal()), true },
    closed = { TransportEvent::Closed(ShutdownReason::normal()), true },
    failed = { TransportEvent::Failed(TransportError::ConnectionClosed), true },
    terminated = { TransportEvent::Terminated, true },
)]
fn shutdown_classification(event: TransportEvent, shutdown: bool) {
    assert_eq!(event.is_shutdown(), shutdown);
}

#[tokio::test]
async fn event_channel_delivers_in_order_then_ends() {
    let (tx, mut events) = event_channel();
    tx.send(Ok(TransportEvent::Opened)).unwrap();
    tx.send(Err(TransportError::ConnectionClosed)).unwrap();
    drop(tx);

    assert_eq!(events.next().await, Some(Ok(TransportEvent::Opened)));
    assert_eq!(
        events.next().await,
        Some(Err(TransportError::ConnectionClosed))
    );
    assert_eq!(events.next().await, None);
}
