//! Agent activity visualizer
//!
//! Classifies the agent activity stream into a small discrete bar level for
//! rendering. Amplitude samples are exponentially smoothed before
//! quantization so single-frame spikes do not flicker the display, an idle
//! agent is pinned to the silence floor, and a thinking agent gets a
//! deterministic sweep so the UI shows progress with no audio to draw.
//!
//! `update` runs on every incoming sample at real-time rates; it allocates
//! nothing and never blocks.

use crate::transport::AgentState;

/// Default number of bars in the indicator.
pub const DEFAULT_BAR_COUNT: usize = 5;

/// Default exponential smoothing factor for amplitude samples.
pub const DEFAULT_SMOOTHING: f32 = 0.35;

/// Samples per step of the thinking sweep.
const THINKING_STEP_TICKS: u32 = 4;

/// Derives the lit-bar level from the agent activity stream
#[derive(Clone, Debug)]
pub struct ActivityVisualizer {
    bar_count: usize,
    smoothing: f32,
    smoothed: f32,
    level: usize,
    agent_state: AgentState,
    thinking_tick: u32,
}

impl ActivityVisualizer {
    /// Create a visualizer with `bar_count` bars.
    ///
    /// `smoothing` is the exponential factor in (0, 1]; 1.0 disables
    /// smoothing entirely. Out-of-range values are clamped.
    pub fn new(bar_count: usize, smoothing: f32) -> Self {
        Self {
            bar_count: bar_count.max(1),
            smoothing: smoothing.clamp(f32::EPSILON, 1.0),
            smoothed: 0.0,
            level: 0,
            agent_state: AgentState::Idle,
            thinking_tick: 0,
        }
    }

    /// Feed one activity sample and get the new level, in
    /// `[0, bar_count - 1]`.
    pub fn update(&mut self, agent_state: AgentState, amplitude: f32) -> usize {
        self.agent_state = agent_state;
        let amplitude = amplitude.clamp(0.0, 1.0);

        self.level = match agent_state {
            // Silence floor: mic self-noise must not light the display
            AgentState::Idle => {
                self.smoothed = 0.0;
                0
            }
            // No audio while computing; sweep through the bars instead
            AgentState::Thinking => {
                self.thinking_tick = self.thinking_tick.wrapping_add(1);
                (self.thinking_tick / THINKING_STEP_TICKS) as usize % self.bar_count
            }
            AgentState::Listening | AgentState::Speaking => {
                self.smoothed += self.smoothing * (amplitude - self.smoothed);
                self.quantize(self.smoothed)
            }
        };
        self.level
    }

    /// Equal-width buckets over [0, 1], top value included in the top bucket.
    fn quantize(&self, amplitude: f32) -> usize {
        ((amplitude * self.bar_count as f32) as usize).min(self.bar_count - 1)
    }

    /// Clear all derived state, for reuse across sessions.
    pub fn reset(&mut self) {
        self.smoothed = 0.0;
        self.level = 0;
        self.agent_state = AgentState::Idle;
        self.thinking_tick = 0;
    }

    /// The most recently derived level
    pub fn level(&self) -> usize {
        self.level
    }

    /// The agent state of the most recent sample
    pub fn agent_state(&self) -> AgentState {
        self.agent_state
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    /// Whether the bar at `index` is lit.
    ///
    /// An idle agent lights nothing; otherwise bars 0 through the current
    /// level are lit.
    pub fn is_lit(&self, index: usize) -> bool {
        self.agent_state != AgentState::Idle && index <= self.level
    }
}

impl Default for ActivityVisualizer {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_COUNT, DEFAULT_SMOOTHING)
    }
}
