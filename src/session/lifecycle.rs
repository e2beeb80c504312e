//! Session lifecycle state machine
//!
//! The authoritative client-visible phase of the voice session, as a pure
//! machine: every method is a transition from (current phase, event) to a new
//! phase, with no I/O and no clock. The supervisor feeds it events from its
//! channels; tests feed it events directly.

use crate::connection::SessionCredentials;
use crate::error::ParleyError;
use std::fmt;

/// Client-visible phase of the session lifecycle
///
/// Exactly one phase holds at any time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Credential fetch in flight
    #[default]
    Loading,
    /// Credential fetch failed; terminal until an explicit retry
    Error(String),
    /// Credentials retained, session not open; waiting on the user
    Idle,
    /// Session open; connectivity tracked by the monitor
    Active,
}

impl LifecyclePhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, LifecyclePhase::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LifecyclePhase::Error(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LifecyclePhase::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LifecyclePhase::Active)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Loading => write!(f, "Loading"),
            LifecyclePhase::Error(message) => write!(f, "Error: {}", message),
            LifecyclePhase::Idle => write!(f, "Idle"),
            LifecyclePhase::Active => write!(f, "Active"),
        }
    }
}

/// The session lifecycle machine
///
/// Owns the retained credentials: they arrive with a successful fetch, are
/// handed out on session start, and survive fold-back so re-entry does not
/// re-fetch. Invalid transitions are ignored, never panics.
#[derive(Debug, Default)]
pub struct Lifecycle {
    phase: LifecyclePhase,
    credentials: Option<SessionCredentials>,
}

impl Lifecycle {
    /// A fresh lifecycle, in `Loading` with no credentials.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &LifecyclePhase {
        &self.phase
    }

    /// Apply the settled credential fetch.
    ///
    /// Valid only in `Loading`: success retains the credentials and moves to
    /// `Idle`, failure moves to `Error` with the message shown verbatim. A
    /// settle arriving in any other phase (a stale fetch) is dropped.
    /// Returns whether the phase changed.
    pub fn fetch_settled(
        &mut self,
        result: Result<SessionCredentials, ParleyError>,
    ) -> bool {
        if !self.phase.is_loading() {
            return false;
        }
        match result {
            Ok(credentials) => {
                self.credentials = Some(credentials);
                self.phase = LifecyclePhase::Idle;
            }
            Err(error) => {
                self.phase = LifecyclePhase::Error(error.to_string());
            }
        }
        true
    }

    /// Begin the session on explicit user action.
    ///
    /// Valid only in `Idle`: moves to `Active` and returns the retained
    /// credentials for the transport-opening boundary, unchanged. In any
    /// other phase this is a no-op returning `None`; it must never crash or
    /// double-open a session.
    pub fn begin_session(&mut self) -> Option<SessionCredentials> {
        if !self.phase.is_idle() {
            return None;
        }
        match self.credentials.clone() {
            Some(credentials) => {
                self.phase = LifecyclePhase::Active;
                Some(credentials)
            }
            // Idle without credentials cannot be reached through the
            // transitions above; refuse rather than open a broken session.
            None => None,
        }
    }

    /// Fold back to `Idle` on a confirmed terminal disconnect.
    ///
    /// Idempotent: valid only in `Active`; repeated signals while already
    /// `Idle` are ignored. Returns whether the phase changed.
    pub fn connectivity_terminal(&mut self) -> bool {
        if self.phase.is_active() {
            self.phase = LifecyclePhase::Idle;
            true
        } else {
            false
        }
    }

    /// Fold back to `Idle` on an explicit user leave.
    ///
    /// Same transition as a terminal disconnect, initiated locally.
    pub fn end_session(&mut self) -> bool {
        self.connectivity_terminal()
    }

    /// Start over after a failed fetch.
    ///
    /// Valid only in `Error`: moves back to `Loading` so a fresh fetch can
    /// settle. Returns whether a new fetch should be started.
    pub fn retry(&mut self) -> bool {
        if self.phase.is_error() {
            self.phase = LifecyclePhase::Loading;
            true
        } else {
            false
        }
    }
}
