//! Error types for the Parley session client
//!
//! A single error enum covers the credential fetch, the session supervisor,
//! and configuration. The fetch-related variants are kept distinct so the UI
//! can give different guidance for "the network is down" versus "the backend
//! rejected us".

use thiserror::Error;

/// Parley application errors
#[derive(Error, Debug, Clone)]
pub enum ParleyError {
    /// Network-level failure: the request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend was reachable but answered with a non-2xx status
    #[error("Server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The credential response was missing or emptying a required field
    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    /// The transport reported a terminal disconnect during an active session
    #[error("Connectivity lost: {0}")]
    ConnectivityTerminal(String),

    /// Channel communication error
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParleyError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors allow the session to be re-initiated by the user,
    /// while non-recoverable errors require a configuration fix or restart.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The network may come back; a retry can succeed
            ParleyError::Transport(_) => true,
            // Server-side failures are usually transient or operator-fixable
            ParleyError::Server { .. } => true,
            // A malformed payload indicates a backend bug, not a blip
            ParleyError::MalformedCredentials(_) => false,
            // The user can simply start a new session
            ParleyError::ConnectivityTerminal(_) => true,
            // Channel errors indicate internal issues
            ParleyError::Channel(_) => false,
            // Config errors require user intervention
            ParleyError::Config(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    ///
    /// Returns a message suitable for display in the UI. Fetch failures all
    /// collapse to the same generic message; the precise cause stays in the
    /// logs.
    pub fn user_message(&self) -> String {
        match self {
            ParleyError::Transport(_) => {
                "Could not reach the session backend. Check your connection.".to_string()
            }
            ParleyError::Server { .. } | ParleyError::MalformedCredentials(_) => {
                "Failed to start the session. Please try again.".to_string()
            }
            ParleyError::ConnectivityTerminal(_) => {
                "The session ended unexpectedly. You can start a new one.".to_string()
            }
            ParleyError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            ParleyError::Config(_) => "Configuration error. Please check settings.".to_string(),
        }
    }
}

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, ParleyError>;
