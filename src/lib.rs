//! Parley - Real-time voice session client for conversational AI agents
//!
//! Parley fetches short-lived join credentials from a backend, gates the
//! session behind a welcome screen, supervises the media transport's
//! connectivity while a session is active, and renders the remote agent's
//! activity as a discrete bar indicator. The media transport itself is a
//! collaborator behind the [`transport::Transport`] trait.

pub mod config;
pub mod connection;
pub mod error;
pub mod session;
pub mod transport;
pub mod ui;
pub mod visualizer;

// Re-export error types
pub use error::{ParleyError, Result};

// Re-export configuration
pub use config::AppConfig;

// Re-export the session surface
pub use connection::{CredentialFetcher, CredentialSource, SessionCredentials};
pub use session::{
    Lifecycle, LifecyclePhase, SessionCommand, SessionEvent, SessionSupervisor,
    SharedSessionState, SupervisorHandle,
};
pub use transport::{
    ActivitySample, AgentState, ConnectivityMonitor, ConnectivityState, LoopbackTransport,
    StatusBadge, Transport, TransportSession,
};
pub use visualizer::ActivityVisualizer;
