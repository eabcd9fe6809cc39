// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::event::ConnectionCommand;
use crate::state::ConnectionState;
use futures_util::StreamExt;

fn start() -> MachineEvent {
    MachineEvent::Connection(ConnectionCommand::Start)
}

fn terminate() -> MachineEvent {
    MachineEvent::Connection(ConnectionCommand::Terminate)
}

#[tokio::test]
async fn every_subscriber_gets_every_event_in_order() {
    let bus = EventBus::new();
    let mut a = bus.subscribe("a");
    let mut b = bus.subscribe("b");

    bus.publish(&start());
    bus.publish(&MachineEvent::RetryFired);
    bus.publish(&terminate());

    for stream in [&mut a, &mut b] {
        assert_eq!(stream.recv().await, Some(start()));
        assert_eq!(stream.recv().await, Some(MachineEvent::RetryFired));
        assert_eq!(stream.recv().await, Some(terminate()));
    }
}

#[tokio::test]
async fn late_subscriber_only_sees_later_events() {
    let bus = EventBus::new();
    let mut early = bus.subscribe("early");
    bus.publish(&start());

    let mut late = bus.subscribe("late");
    bus.publish(&terminate());

    assert_eq!(early.recv().await, Some(start()));
    assert_eq!(early.recv().await, Some(terminate()));
    assert_eq!(late.recv().await, Some(terminate()));
    assert_eq!(late.try_recv(), None);
}

#[tokio::test]
async fn slow_subscriber_does_not_block_publisher_or_peers() {
    let bus = EventBus::new();
    let _slow = bus.subscribe("slow");
    let mut fast = bus.subscribe("fast");

    for _ in 0..10_000 {
        bus.publish(&MachineEvent::RetryFired);
    }

    let received = (&mut fast).take(10_000).count().await;
    assert_eq!(received, 10_000);
}

#[tokio::test]
async fn lagging_subscriber_is_dropped_after_its_queue_fills() {
    let bus = EventBus::with_capacity(2);
    let mut lagging = bus.subscribe("lagging");
    let mut keeping_up = bus.subscribe("keeping-up");

    for event in [start(), MachineEvent::RetryFired, terminate()] {
        bus.publish(&event);
        assert_eq!(keeping_up.recv().await, Some(event));
    }

    assert!(!bus.is_subscribed(&SubscriberId::from("lagging")));
    assert!(bus.is_subscribed(&SubscriberId::from("keeping-up")));
    assert_eq!(lagging.recv().await, Some(start()));
    assert_eq!(lagging.recv().await, Some(MachineEvent::RetryFired));
    assert_eq!(lagging.recv().await, None);
}

#[test]
fn capacity_is_at_least_one() {
    assert_eq!(EventBus::with_capacity(0).capacity(), 1);
    assert_eq!(EventBus::new().capacity(), DEFAULT_SUBSCRIBER_CAPACITY);
}

#[tokio::test]
async fn unsubscribe_stops_delivery_and_ends_stream() {
    let bus = EventBus::new();
    let mut stream = bus.subscribe("gone");
    bus.publish(&start());

    assert!(bus.unsubscribe(&SubscriberId::from("gone")));
    assert!(!bus.unsubscribe(&SubscriberId::from("gone")));
    bus.publish(&terminate());

    // Already-queued events may still be drained.
    assert_eq!(stream.recv().await, Some(start()));
    assert_eq!(stream.recv().await, None);
}

#[tokio::test]
async fn reusing_a_token_replaces_the_subscription() {
    let bus = EventBus::new();
    let mut first = bus.subscribe("same");
    let mut second = bus.subscribe("same");
    assert_eq!(bus.subscriber_count(), 1);

    bus.publish(&MachineEvent::StateChanged(ConnectionState::Disconnecting));

    assert_eq!(first.recv().await, None);
    assert_eq!(
        second.recv().await,
        Some(MachineEvent::StateChanged(ConnectionState::Disconnecting))
    );
}

#[test]
fn dropped_streams_are_pruned_on_publish() {
    let bus = EventBus::new();
    let stream = bus.subscribe("dropped");
    let _kept = bus.subscribe("kept");
    drop(stream);

    assert!(bus.is_subscribed(&SubscriberId::from("dropped")));
    bus.publish(&start());
    assert!(!bus.is_subscribed(&SubscriberId::from("dropped")));
    assert_eq!(bus.subscriber_count(), 1);
}

#[test]
fn subscriber_id_conversions() {
    let id: SubscriberId = "ui".into();
    assert_eq!(id.as_str(), "ui");
    assert_eq!(SubscriberId::from(String::from("ui")), id);
    assert_eq!(SubscriberId::new("ui").to_string(), "ui");
}
