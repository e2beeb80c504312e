//! Session lifecycle: phase machine, shared display state, and the
//! supervisor event loop that drives them.

pub mod lifecycle;
pub mod state;
pub mod supervisor;

pub use lifecycle::{Lifecycle, LifecyclePhase};
pub use state::{SessionSnapshot, SharedSessionState};
pub use supervisor::{SessionCommand, SessionEvent, SessionSupervisor, SupervisorHandle};
