//! Reusable UI components

pub mod activity_bars;
pub mod status_badge;

pub use activity_bars::ActivityBars;
pub use status_badge::StatusBadgeView;
