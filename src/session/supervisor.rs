//! Session supervisor
//!
//! The supervisor runs the lifecycle machine on its own event-loop thread.
//! Everything that can change the phase (the settled credential fetch, user
//! commands from the UI, connectivity emissions from the transport) arrives
//! as a message and is applied in observation order. The connectivity
//! receiver is swapped for a dead channel the moment the active phase ends,
//! so a late `Disconnected` can never reach a phase that no longer exists.

use crate::config::AppConfig;
use crate::connection::{CredentialSource, SessionCredentials};
use crate::error::{ParleyError, Result};
use crate::session::lifecycle::{Lifecycle, LifecyclePhase};
use crate::session::state::SharedSessionState;
use crate::transport::{
    ActivitySample, ConnectivityMonitor, ConnectivityState, Transport, TransportSession,
};
use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Channel capacity for commands and events.
const CHANNEL_CAPACITY: usize = 32;

/// Commands the UI sends to the supervisor
#[derive(Clone, Copy, Debug)]
pub enum SessionCommand {
    /// Open the session with the retained credentials (valid in Idle)
    Begin,
    /// Leave the session and return to the welcome state (valid in Active)
    End,
    /// Re-run the credential fetch after a failure (valid in Error)
    Retry,
    /// Stop the supervisor loop
    Shutdown,
}

/// Notifications the supervisor emits for the UI
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The lifecycle phase changed; re-read the shared state
    PhaseChanged,
    /// A session opened; `activity` carries the agent activity stream
    SessionStarted { activity: Receiver<ActivitySample> },
    /// The session closed, by fold-back or explicit leave
    SessionEnded,
    /// The supervisor loop exited
    Shutdown,
}

/// Handle for controlling the supervisor from the UI or tests
pub struct SupervisorHandle {
    command_tx: Sender<SessionCommand>,
    event_rx: Receiver<SessionEvent>,
    state: SharedSessionState,
}

impl SupervisorHandle {
    /// Send a command to the supervisor
    pub fn send_command(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| ParleyError::Channel(format!("failed to send command: {}", e)))
    }

    /// Begin the session (valid in Idle)
    pub fn begin_session(&self) -> Result<()> {
        self.send_command(SessionCommand::Begin)
    }

    /// Leave the session (valid in Active)
    pub fn end_session(&self) -> Result<()> {
        self.send_command(SessionCommand::End)
    }

    /// Retry the credential fetch (valid in Error)
    pub fn retry(&self) -> Result<()> {
        self.send_command(SessionCommand::Retry)
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.send_command(SessionCommand::Shutdown)
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    /// The shared display state, for direct queries
    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }
}

/// Supervises one session lifecycle: fetch, welcome gate, active session,
/// fold-back
pub struct SessionSupervisor {
    agent_name: Option<String>,
    source: Arc<dyn CredentialSource>,
    transport: Arc<dyn Transport>,
    state: SharedSessionState,
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    fetch_tx: Sender<Result<SessionCredentials>>,
    fetch_rx: Receiver<Result<SessionCredentials>>,
}

impl SessionSupervisor {
    /// Create a supervisor and its control handle.
    ///
    /// Nothing runs until [`start`](Self::start) is called.
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn CredentialSource>,
        transport: Arc<dyn Transport>,
    ) -> (Self, SupervisorHandle) {
        let state = SharedSessionState::new();
        let (command_tx, command_rx) = bounded(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = bounded(CHANNEL_CAPACITY);
        let (fetch_tx, fetch_rx) = bounded(4);

        let handle = SupervisorHandle {
            command_tx,
            event_rx,
            state: state.clone(),
        };

        let supervisor = Self {
            agent_name: config.agent_name.clone(),
            source,
            transport,
            state,
            command_rx,
            event_tx,
            fetch_tx,
            fetch_rx,
        };

        (supervisor, handle)
    }

    /// Start the supervisor: kick off the credential fetch and run the event
    /// loop on its own thread until shutdown.
    pub fn start(self) -> JoinHandle<()> {
        spawn_fetch(
            self.source.clone(),
            self.agent_name.clone(),
            self.fetch_tx.clone(),
        );
        thread::spawn(move || self.run())
    }

    fn run(self) {
        let Self {
            agent_name,
            source,
            transport,
            state,
            command_rx,
            event_tx,
            fetch_tx,
            fetch_rx,
        } = self;

        let mut lifecycle = Lifecycle::new();
        let mut monitor: Option<ConnectivityMonitor> = None;
        let mut session: Option<TransportSession> = None;
        let mut conn_rx: Receiver<ConnectivityState> = never();

        info!("Session supervisor loop starting");

        loop {
            select! {
                recv(command_rx) -> command => {
                    match command {
                        Ok(SessionCommand::Begin) => {
                            let Some(credentials) = lifecycle.begin_session() else {
                                warn!("Begin ignored: phase is {}", lifecycle.phase());
                                continue;
                            };
                            match transport.open(&credentials) {
                                Ok(opened) => {
                                    conn_rx = opened.connectivity.clone();
                                    monitor = Some(ConnectivityMonitor::new());
                                    let activity = opened.activity.clone();
                                    session = Some(opened);
                                    state.set_connectivity(ConnectivityState::Unknown);
                                    state.set_phase(LifecyclePhase::Active);
                                    let _ = event_tx.send(SessionEvent::SessionStarted { activity });
                                    info!("Session started in room '{}'", credentials.room_name);
                                }
                                Err(e) => {
                                    error!("Failed to open transport session: {}", e);
                                    lifecycle.end_session();
                                    state.set_phase(LifecyclePhase::Idle);
                                    let _ = event_tx.send(SessionEvent::PhaseChanged);
                                }
                            }
                        }

                        Ok(SessionCommand::End) => {
                            if lifecycle.end_session() {
                                close_session(&mut session, &mut conn_rx, &mut monitor);
                                state.set_connectivity(ConnectivityState::Unknown);
                                state.set_phase(LifecyclePhase::Idle);
                                let _ = event_tx.send(SessionEvent::SessionEnded);
                                info!("Session ended by user");
                            } else {
                                warn!("End ignored: phase is {}", lifecycle.phase());
                            }
                        }

                        Ok(SessionCommand::Retry) => {
                            if lifecycle.retry() {
                                state.set_phase(LifecyclePhase::Loading);
                                spawn_fetch(source.clone(), agent_name.clone(), fetch_tx.clone());
                                let _ = event_tx.send(SessionEvent::PhaseChanged);
                                info!("Retrying credential fetch");
                            } else {
                                warn!("Retry ignored: phase is {}", lifecycle.phase());
                            }
                        }

                        Ok(SessionCommand::Shutdown) => {
                            close_session(&mut session, &mut conn_rx, &mut monitor);
                            let _ = event_tx.send(SessionEvent::Shutdown);
                            info!("Session supervisor shutdown");
                            return;
                        }

                        Err(_) => {
                            // Every handle dropped; nothing can reach us anymore
                            close_session(&mut session, &mut conn_rx, &mut monitor);
                            debug!("Command channel closed, supervisor exiting");
                            return;
                        }
                    }
                }

                recv(fetch_rx) -> settled => {
                    if let Ok(result) = settled {
                        match &result {
                            Ok(credentials) => {
                                info!("Credentials ready for room '{}'", credentials.room_name);
                            }
                            Err(e) => error!("Credential fetch failed: {}", e),
                        }
                        if lifecycle.fetch_settled(result) {
                            state.set_phase(lifecycle.phase().clone());
                            let _ = event_tx.send(SessionEvent::PhaseChanged);
                        } else {
                            debug!("Stale fetch result dropped in phase {}", lifecycle.phase());
                        }
                    }
                }

                recv(conn_rx) -> update => {
                    match update {
                        Ok(connectivity) => {
                            debug!("Connectivity: {}", connectivity);
                            state.set_connectivity(connectivity);
                            let terminal = monitor
                                .as_mut()
                                .map(|m| m.observe(connectivity))
                                .unwrap_or(false);
                            if terminal && lifecycle.connectivity_terminal() {
                                close_session(&mut session, &mut conn_rx, &mut monitor);
                                state.set_phase(LifecyclePhase::Idle);
                                let _ = event_tx.send(SessionEvent::SessionEnded);
                                info!("Terminal disconnect; returned to idle");
                            }
                        }
                        Err(_) => {
                            // Fail safe: a dead stream is a disconnect
                            let failure = ParleyError::ConnectivityTerminal(
                                "connectivity stream closed unexpectedly".to_string(),
                            );
                            warn!("{}", failure);
                            conn_rx = never();
                            state.set_connectivity(ConnectivityState::Disconnected);
                            let terminal = monitor
                                .as_mut()
                                .map(|m| m.stream_failed())
                                .unwrap_or(false);
                            if terminal && lifecycle.connectivity_terminal() {
                                close_session(&mut session, &mut conn_rx, &mut monitor);
                                state.set_phase(LifecyclePhase::Idle);
                                let _ = event_tx.send(SessionEvent::SessionEnded);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Tear down the active session synchronously with the phase exit.
///
/// Dropping the [`TransportSession`] releases the subscriptions; swapping the
/// receiver for a dead channel keeps the select loop from ever seeing a
/// post-exit emission.
fn close_session(
    session: &mut Option<TransportSession>,
    conn_rx: &mut Receiver<ConnectivityState>,
    monitor: &mut Option<ConnectivityMonitor>,
) {
    session.take();
    *conn_rx = never();
    monitor.take();
}

/// Run one credential fetch on a worker thread.
///
/// If the supervisor is gone by the time the fetch settles, the send fails
/// and the result is discarded; no state is touched after teardown.
fn spawn_fetch(
    source: Arc<dyn CredentialSource>,
    agent_name: Option<String>,
    fetch_tx: Sender<Result<SessionCredentials>>,
) {
    thread::spawn(move || {
        let result = source.fetch_credentials(agent_name.as_deref());
        let _ = fetch_tx.send(result);
    });
}
