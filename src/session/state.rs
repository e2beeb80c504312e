//! Shared display state
//!
//! A thread-safe mirror of what the UI needs to render: the lifecycle phase
//! and the current connectivity. The supervisor is the single writer; the UI
//! reads snapshots each frame without holding a lock across rendering.

use crate::session::lifecycle::LifecyclePhase;
use crate::transport::ConnectivityState;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct SessionDisplay {
    phase: LifecyclePhase,
    connectivity: ConnectivityState,
}

/// Immutable snapshot of the display state
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub phase: LifecyclePhase,
    pub connectivity: ConnectivityState,
}

/// Thread-safe shared display state
#[derive(Clone, Default)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionDisplay>>,
}

impl SharedSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of current state (no lock held after return)
    pub fn snapshot(&self) -> SessionSnapshot {
        let display = self.inner.read();
        SessionSnapshot {
            phase: display.phase.clone(),
            connectivity: display.connectivity,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.inner.read().phase.clone()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.inner.read().connectivity
    }

    pub fn is_active(&self) -> bool {
        self.inner.read().phase.is_active()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.read().phase.is_idle()
    }

    pub(crate) fn set_phase(&self, phase: LifecyclePhase) {
        self.inner.write().phase = phase;
    }

    pub(crate) fn set_connectivity(&self, connectivity: ConnectivityState) {
        self.inner.write().connectivity = connectivity;
    }
}
