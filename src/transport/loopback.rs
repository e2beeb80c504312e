//! Loopback transport
//!
//! An in-process transport that plays both sides of a session: it walks the
//! usual connectivity sequence and synthesizes an agent that takes turns
//! listening, thinking, and speaking. Used by the demo binary and the
//! integration tests; a real deployment wires a WebRTC transport in through
//! the same [`Transport`] trait.

use crate::connection::SessionCredentials;
use crate::error::Result;
use crate::transport::{ActivitySample, AgentState, ConnectivityState, Transport, TransportSession};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Activity sample cadence, roughly 30 Hz.
const TICK: Duration = Duration::from_millis(33);

/// Simulated connection negotiation delay.
const CONNECT_DELAY: Duration = Duration::from_millis(150);

/// Ticks the synthetic agent spends in each phase of its turn cycle.
const LISTEN_TICKS: u64 = 90;
const THINK_TICKS: u64 = 45;
const SPEAK_TICKS: u64 = 120;

/// In-process stand-in for the real media transport
#[derive(Debug, Default)]
pub struct LoopbackTransport;

impl LoopbackTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for LoopbackTransport {
    fn open(&self, credentials: &SessionCredentials) -> Result<TransportSession> {
        info!(
            "Loopback transport joining room '{}' as '{}'",
            credentials.room_name, credentials.participant_name
        );

        let (conn_tx, conn_rx) = bounded(16);
        let (activity_tx, activity_rx) = bounded(64);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        thread::spawn(move || {
            let _ = conn_tx.send(ConnectivityState::Connecting);
            match stop_rx.recv_timeout(CONNECT_DELAY) {
                Err(RecvTimeoutError::Timeout) => {}
                _ => return,
            }
            let _ = conn_tx.send(ConnectivityState::Connected);

            let mut tick: u64 = 0;
            loop {
                // The sleep doubles as the stop check: a dropped session
                // handle disconnects the stop channel and ends the loop.
                match stop_rx.recv_timeout(TICK) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => break,
                }

                let _ = activity_tx.try_send(synthesize(tick));
                tick = tick.wrapping_add(1);
            }

            let _ = conn_tx.try_send(ConnectivityState::Disconnected);
            debug!("Loopback transport session closed");
        });

        Ok(TransportSession::new(conn_rx, activity_rx, stop_tx))
    }
}

/// Synthesize one activity sample for the given tick.
///
/// The agent cycles listen → think → speak; amplitude is a rectified sine
/// during the audible phases and zero while thinking.
fn synthesize(tick: u64) -> ActivitySample {
    let cycle = tick % (LISTEN_TICKS + THINK_TICKS + SPEAK_TICKS);
    let (agent_state, amplitude) = if cycle < LISTEN_TICKS {
        (AgentState::Listening, wave(tick, 0.05))
    } else if cycle < LISTEN_TICKS + THINK_TICKS {
        (AgentState::Thinking, 0.0)
    } else {
        (AgentState::Speaking, wave(tick, 0.11))
    };
    ActivitySample {
        agent_state,
        amplitude,
    }
}

fn wave(tick: u64, rate: f32) -> f32 {
    (tick as f32 * rate).sin().abs()
}
