// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle actor.
//!
//! One [`StateMachine`] runs per connection, as a single task draining an
//! inbox. Commands from the façade, events from the session pumps, and retry
//! timer firings all arrive through that inbox, so `handle` runs strictly
//! serially and the state is never observed mid-transition.
//!
//! For every admitted input the machine publishes the raw event first, then
//! the `StateChanged` events its transition produced.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::backoff::{Backoff, BackoffStrategy};
use crate::bus::EventBus;
use crate::config::ConnectionConfig;
use crate::event::{ConnectionCommand, MachineEvent};
use crate::message::ShutdownReason;
use crate::state::{ConnectionState, Session, SessionId};
use crate::transport::{TransportEvent, TransportEventStream, TransportFactory};

/// Everything the actor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Command(ConnectionCommand),
    /// An event reported by the transport of `session`.
    Transport {
        session: SessionId,
        event: TransportEvent,
    },
    /// The retry timer armed as `generation` elapsed.
    RetryFired { generation: u64 },
    /// Entry action of `Disconnected { auto_start: true }`. Dropped if a
    /// command queued ahead of it already left that state.
    AutoStart,
}

pub(crate) type Inbox = mpsc::UnboundedSender<Input>;

/// Single-slot retry timer.
///
/// Arming replaces any armed timer. Each arm or disarm bumps the generation,
/// so a firing that was already queued when the timer was replaced is
/// recognised as stale and dropped.
#[derive(Debug, Default)]
struct RetryTimer {
    generation: u64,
    pending: Option<AbortHandle>,
}

impl RetryTimer {
    /// True while a retry is scheduled and has not fired.
    fn is_retrying(&self) -> bool {
        self.pending.is_some()
    }

    fn arm(&mut self, delay: Duration, inbox: Inbox) {
        self.disarm();
        let generation = self.generation;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbox.send(Input::RetryFired { generation });
        });
        self.pending = Some(task.abort_handle());
    }

    fn disarm(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Accept a firing. False if it belongs to a replaced or disarmed timer.
    fn fire(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

pub(crate) struct StateMachine {
    config: ConnectionConfig,
    factory: Arc<dyn TransportFactory>,
    backoff: Arc<dyn BackoffStrategy>,
    bus: EventBus,
    state: ConnectionState,
    snapshot: watch::Sender<ConnectionState>,
    inbox: Inbox,
    timer: RetryTimer,
    next_session: u64,
    /// Retry count of the attempt that last reached `Connected`.
    carried_retry: u32,
}

impl StateMachine {
    pub(crate) fn new(
        config: ConnectionConfig,
        factory: Arc<dyn TransportFactory>,
        backoff: Arc<dyn BackoffStrategy>,
        bus: EventBus,
    ) -> (Self, mpsc::UnboundedReceiver<Input>) {
        let (inbox, rx) = mpsc::unbounded_channel();
        let state = ConnectionState::Disconnected {
            auto_start: config.auto_start,
        };
        let (snapshot, _) = watch::channel(state.clone());
        let machine = StateMachine {
            config,
            factory,
            backoff,
            bus,
            state,
            snapshot,
            inbox,
            timer: RetryTimer::default(),
            next_session: 0,
            carried_retry: 0,
        };
        (machine, rx)
    }

    pub(crate) fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.snapshot.subscribe()
    }

    pub(crate) fn inbox(&self) -> Inbox {
        self.inbox.clone()
    }

    pub(crate) fn is_retrying(&self) -> bool {
        self.timer.is_retrying()
    }

    /// Drain the inbox until `shutdown` is cancelled or every sender is gone.
    /// Cancellation terminates the connection before returning.
    pub(crate) async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Input>,
        shutdown: CancellationToken,
    ) {
        self.enter();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    self.handle(Input::Command(ConnectionCommand::Terminate));
                    break;
                }
                input = rx.recv() => match input {
                    Some(input) => self.handle(input),
                    None => break,
                },
            }
        }
        debug!("connection actor stopped");
    }

    /// Process one input to completion.
    pub(crate) fn handle(&mut self, input: Input) {
        let Some(event) = self.admit(input) else {
            return;
        };
        trace!(event = event.name(), state = self.state.name(), "handling");
        self.bus.publish(&event);
        self.apply(event);
    }

    /// Turn an input into the event to publish, or drop it when it no longer
    /// concerns the current state.
    fn admit(&mut self, input: Input) -> Option<MachineEvent> {
        match input {
            Input::Command(command) => Some(MachineEvent::Connection(command)),
            Input::Transport { session, event } => {
                if self.state.session_id() == Some(session) {
                    Some(MachineEvent::Transport(event))
                } else {
                    trace!(%session, event = event.name(), "dropping event from stale session");
                    None
                }
            }
            Input::AutoStart => {
                if matches!(self.state, ConnectionState::Disconnected { auto_start: true }) {
                    Some(MachineEvent::Connection(ConnectionCommand::Start))
                } else {
                    trace!(state = self.state.name(), "dropping superseded auto start");
                    None
                }
            }
            Input::RetryFired { generation } => {
                if self.timer.fire(generation) {
                    Some(MachineEvent::RetryFired)
                } else {
                    trace!(generation, "dropping stale retry");
                    None
                }
            }
        }
    }

    fn apply(&mut self, event: MachineEvent) {
        use ConnectionCommand::{Start, Terminate};
        use ConnectionState as S;
        use MachineEvent as E;

        match (self.state.clone(), event) {
            (S::Disconnected { .. }, E::Connection(Start)) => self.connect(0),

            (S::Connecting { session, .. }, E::Transport(TransportEvent::Opened)) => {
                if let Some(retry) = self.state.retry_count() {
                    self.carried_retry = retry;
                }
                info!(session = %session.id(), "connected");
                self.transition_to(S::Connected { session });
            }
            (
                S::Connecting {
                    session,
                    retry_count,
                },
                E::Transport(
                    TransportEvent::Failed(_) | TransportEvent::Closed(_) | TransportEvent::Terminated,
                ),
            ) => self.schedule_retry(session, retry_count),

            (
                S::Connected { session },
                E::Transport(
                    TransportEvent::Closing(_)
                    | TransportEvent::Closed(_)
                    | TransportEvent::Failed(_)
                    | TransportEvent::Terminated,
                ),
            ) => {
                let attempt = if self.config.reset_retry_on_connect {
                    0
                } else {
                    self.carried_retry
                };
                self.schedule_retry(session, attempt);
            }

            (
                S::WaitingToRetry {
                    retry_count,
                    session,
                    ..
                },
                E::RetryFired,
            ) => {
                session.cancel();
                self.connect(retry_count.saturating_add(1));
            }

            (S::Connecting { session, .. } | S::Connected { session }, E::Connection(Terminate)) => {
                self.timer.disarm();
                session.close(ShutdownReason::actively());
                self.transition_to(S::Disconnecting);
                self.transition_to(S::Disconnected { auto_start: false });
            }
            (S::Disconnected { auto_start: true }, E::Connection(Terminate)) => {
                self.transition_to(S::Disconnected { auto_start: false });
            }
            (S::WaitingToRetry { session, .. }, E::Connection(Terminate)) => {
                self.timer.disarm();
                session.cancel();
                self.transition_to(S::Disconnected { auto_start: false });
            }

            (state, event) => {
                trace!(state = state.name(), event = event.name(), "ignored");
            }
        }
    }

    /// Open a fresh session and enter `Connecting`.
    fn connect(&mut self, retry_count: u32) {
        let session = self.open_session();
        debug!(session = %session.id(), retry = retry_count, "connecting");
        self.transition_to(ConnectionState::Connecting {
            session,
            retry_count,
        });
    }

    /// Create a transport and start forwarding its events. A failed open is
    /// reported to the machine as a `Failed` event of the new session.
    fn open_session(&mut self) -> Session {
        self.next_session += 1;
        let id = SessionId::new(self.next_session);
        let transport = self.factory.create();
        let mut session = Session::new(id, Arc::clone(&transport));
        match transport.open() {
            Ok(stream) => {
                let pump = tokio::spawn(pump(id, stream, self.inbox.clone()));
                session.attach_pump(pump.abort_handle());
            }
            Err(err) => {
                warn!(session = %id, error = %err, "transport failed to open");
                let _ = self.inbox.send(Input::Transport {
                    session: id,
                    event: TransportEvent::Failed(err),
                });
            }
        }
        session
    }

    /// Consult the backoff policy for `session`, which just failed.
    fn schedule_retry(&mut self, session: Session, retry_count: u32) {
        if self.timer.is_retrying() {
            debug!(session = %session.id(), "retry already scheduled");
            return;
        }
        match self.backoff.duration_at(retry_count) {
            Backoff::Stop => {
                info!(retry = retry_count, "backoff gave up, disconnecting");
                session.close(ShutdownReason::actively());
                self.transition_to(ConnectionState::Disconnected { auto_start: false });
            }
            Backoff::Wait(delay) => {
                let retry_in_millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                info!(retry = retry_count, delay_ms = retry_in_millis, "scheduling retry");
                self.timer.arm(delay, self.inbox.clone());
                self.transition_to(ConnectionState::WaitingToRetry {
                    retry_count,
                    retry_in_millis,
                    session,
                });
            }
        }
    }

    fn transition_to(&mut self, next: ConnectionState) {
        if next == self.state {
            return;
        }
        debug!(from = self.state.name(), to = next.name(), "state changed");
        self.state = next;
        self.snapshot.send_replace(self.state.clone());
        self.bus
            .publish(&MachineEvent::StateChanged(self.state.clone()));
        self.enter();
    }

    /// Entry action of the current state.
    fn enter(&mut self) {
        if let ConnectionState::Disconnected { auto_start: true } = self.state {
            let _ = self.inbox.send(Input::AutoStart);
        }
    }
}

/// Forward one session's transport events to the machine. A stream that ends
/// without reporting `Terminated` gets one synthesized.
async fn pump(session: SessionId, mut stream: TransportEventStream, inbox: Inbox) {
    while let Some(item) = stream.next().await {
        let event = item.unwrap_or_else(TransportEvent::Failed);
        let terminated = event == TransportEvent::Terminated;
        if inbox.send(Input::Transport { session, event }).is_err() || terminated {
            return;
        }
    }
    let _ = inbox.send(Input::Transport {
        session,
        event: TransportEvent::Terminated,
    });
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
