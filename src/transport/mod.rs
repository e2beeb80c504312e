//! Transport boundary
//!
//! The real-time media layer (connection negotiation, audio capture and
//! playback) lives outside this crate. What crosses the boundary is small:
//! credentials go in when a session opens, and two streams come back out,
//! connectivity-state changes and agent activity samples. Everything in this
//! module is that boundary: the state enums, the [`Transport`] trait, and the
//! [`TransportSession`] handle whose drop releases both subscriptions.

pub mod loopback;
pub mod monitor;

use crate::connection::SessionCredentials;
use crate::error::Result;
use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use tracing::debug;

pub use loopback::LoopbackTransport;
pub use monitor::{ConnectivityMonitor, StatusBadge};

/// Connection state of the media transport, as reported by its event stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectivityState {
    /// No state received yet
    #[default]
    Unknown,
    /// Session negotiation in progress
    Connecting,
    /// Media session established
    Connected,
    /// Connection dropped, transport is re-establishing it
    Reconnecting,
    /// Connection closed for good; the session will not recover
    Disconnected,
}

impl ConnectivityState {
    /// Check if this state ends the session.
    ///
    /// Only `Disconnected` does; `Reconnecting` is a transient blip the
    /// session survives.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectivityState::Disconnected)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityState::Unknown => write!(f, "Unknown"),
            ConnectivityState::Connecting => write!(f, "Connecting"),
            ConnectivityState::Connected => write!(f, "Connected"),
            ConnectivityState::Reconnecting => write!(f, "Reconnecting"),
            ConnectivityState::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Activity phase of the remote conversational agent
///
/// Distinct from [`ConnectivityState`]: the transport can be fully connected
/// while the agent sits idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentState {
    #[default]
    Idle,
    Listening,
    Thinking,
    Speaking,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Idle => write!(f, "Idle"),
            AgentState::Listening => write!(f, "Listening"),
            AgentState::Thinking => write!(f, "Thinking"),
            AgentState::Speaking => write!(f, "Speaking"),
        }
    }
}

/// One tick of the agent activity stream: the agent's current phase plus the
/// normalized audio amplitude. Arrives at real-time rate; each sample
/// supersedes the previous one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivitySample {
    pub agent_state: AgentState,
    /// Normalized amplitude in [0, 1]
    pub amplitude: f32,
}

/// The media layer the session supervisor opens sessions against
pub trait Transport: Send + Sync {
    /// Open a media session with the given credentials.
    ///
    /// The credentials are borrowed; the transport copies what it needs and
    /// the caller retains ownership.
    fn open(&self, credentials: &SessionCredentials) -> Result<TransportSession>;
}

/// Handle to an open media session
///
/// Holds the two inbound streams and the stop signal. Dropping the handle
/// releases the subscriptions and tells the transport to tear the session
/// down, on every exit path.
pub struct TransportSession {
    /// Connectivity-state changes, in emission order
    pub connectivity: Receiver<ConnectivityState>,
    /// Agent activity samples at real-time rate
    pub activity: Receiver<ActivitySample>,
    stop: Option<Sender<()>>,
}

impl TransportSession {
    /// Assemble a session handle from its stream ends.
    ///
    /// The transport keeps the matching `Receiver` of `stop` and stops
    /// producing when it disconnects.
    pub fn new(
        connectivity: Receiver<ConnectivityState>,
        activity: Receiver<ActivitySample>,
        stop: Sender<()>,
    ) -> Self {
        Self {
            connectivity,
            activity,
            stop: Some(stop),
        }
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.stop.take();
        debug!("Transport session released");
    }
}
