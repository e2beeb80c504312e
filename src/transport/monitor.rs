//! Connectivity monitor
//!
//! Watches the transport's connectivity stream while a session is active.
//! Two outputs: a status badge for display, and an edge-triggered terminal
//! signal that tells the session supervisor to fold back to the welcome
//! state. Transient `Reconnecting` states never trigger the fold-back.

use crate::transport::ConnectivityState;
use egui::Color32;

/// Observer over the connectivity stream of one session
///
/// Created fresh for every session attachment. `observe` is edge-triggered:
/// the terminal signal fires once, on the transition into `Disconnected`,
/// and never again for this monitor.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    current: ConnectivityState,
    terminal_signalled: bool,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self {
            current: ConnectivityState::Unknown,
            terminal_signalled: false,
        }
    }

    /// Record a connectivity-state emission.
    ///
    /// Returns `true` exactly once per monitor, on entering `Disconnected`.
    /// Repeated `Disconnected` observations and every other state return
    /// `false`.
    pub fn observe(&mut self, state: ConnectivityState) -> bool {
        let entered_terminal = state.is_terminal() && !self.current.is_terminal();
        self.current = state;

        if entered_terminal && !self.terminal_signalled {
            self.terminal_signalled = true;
            true
        } else {
            false
        }
    }

    /// Record that the connectivity stream itself errored or closed.
    ///
    /// Fails safe: treated exactly as an observed `Disconnected`, so the UI
    /// cannot get stuck on a stale "Connected" badge.
    pub fn stream_failed(&mut self) -> bool {
        self.observe(ConnectivityState::Disconnected)
    }

    /// The most recently observed state
    pub fn current(&self) -> ConnectivityState {
        self.current
    }
}

/// Display triple for one connectivity state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: Color32,
}

impl StatusBadge {
    /// Badge shown for the given connectivity state
    pub fn for_state(state: ConnectivityState) -> Self {
        match state {
            ConnectivityState::Unknown => Self {
                label: "Waiting",
                icon: "…",
                color: Color32::from_rgb(156, 163, 175), // Gray
            },
            ConnectivityState::Connecting => Self {
                label: "Connecting",
                icon: "↻",
                color: Color32::from_rgb(234, 179, 8), // Yellow
            },
            ConnectivityState::Connected => Self {
                label: "Connected",
                icon: "●",
                color: Color32::from_rgb(34, 197, 94), // Green
            },
            ConnectivityState::Reconnecting => Self {
                label: "Reconnecting",
                icon: "↻",
                color: Color32::from_rgb(234, 179, 8), // Yellow
            },
            ConnectivityState::Disconnected => Self {
                label: "Disconnected",
                icon: "✕",
                color: Color32::from_rgb(239, 68, 68), // Red
            },
        }
    }
}
