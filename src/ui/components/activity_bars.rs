//! Agent activity bars
//!
//! Renders the visualizer's derived level as a row of vertical bars, lit
//! from the left. The level math lives in [`ActivityVisualizer`]; this
//! component only paints it.

use crate::transport::AgentState;
use crate::ui::theme::Theme;
use crate::visualizer::ActivityVisualizer;
use egui::{self, Pos2, Rect, Vec2};

/// Bar visualizer widget for the agent's activity
pub struct ActivityBars<'a> {
    visualizer: &'a ActivityVisualizer,
    theme: &'a Theme,
    height: f32,
    bar_width: f32,
}

impl<'a> ActivityBars<'a> {
    pub fn new(visualizer: &'a ActivityVisualizer, theme: &'a Theme) -> Self {
        Self {
            visualizer,
            theme,
            height: 64.0,
            bar_width: 14.0,
        }
    }

    /// Set the height of the tallest bar
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Show the bars and return the response
    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let bar_count = self.visualizer.bar_count();
        let gap = 6.0;
        let desired_size = Vec2::new(
            bar_count as f32 * (self.bar_width + gap) - gap,
            self.height,
        );
        let (rect, response) = ui.allocate_exact_size(desired_size, egui::Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let center_y = rect.center().y;

            for index in 0..bar_count {
                let lit = self.visualizer.is_lit(index);
                let color = if lit {
                    self.theme.bar_active
                } else {
                    self.theme.bar_inactive
                };

                // Bars grow toward the edges of the row for a symmetric look
                let distance = (index as f32 - (bar_count - 1) as f32 / 2.0).abs();
                let base = 0.35 + 0.65 * (distance / (bar_count as f32 / 2.0));
                let bar_height = if lit {
                    self.height * base
                } else {
                    self.height * 0.2
                };

                let x = rect.left() + index as f32 * (self.bar_width + gap);
                let bar_rect = Rect::from_center_size(
                    Pos2::new(x + self.bar_width / 2.0, center_y),
                    Vec2::new(self.bar_width, bar_height),
                );
                painter.rect_filled(bar_rect, 4.0, color);
            }
        }

        // Keep animating while the agent is doing anything
        if self.visualizer.agent_state() != AgentState::Idle {
            ui.ctx().request_repaint();
        }

        response
    }
}
