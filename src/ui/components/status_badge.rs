//! Connection status badge
//!
//! A colored dot, icon, and label reflecting the transport's current
//! connectivity. The badge is the only place connectivity problems are shown
//! during a session; they never interrupt the user with dialogs.

use crate::transport::{ConnectivityState, StatusBadge};
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText, Vec2};

/// Status badge widget for the active-session header
pub struct StatusBadgeView<'a> {
    state: ConnectivityState,
    theme: &'a Theme,
}

impl<'a> StatusBadgeView<'a> {
    pub fn new(state: ConnectivityState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Show the badge and return the response
    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let badge = StatusBadge::for_state(self.state);
        let in_flux = matches!(
            self.state,
            ConnectivityState::Connecting | ConnectivityState::Reconnecting
        );

        // Pulse the dot while the connection is in flux
        let color = if in_flux {
            let time = ui.ctx().input(|i| i.time);
            let pulse = ((time * 2.0).sin() * 0.5 + 0.5) as f32;
            let alpha = 0.5 + 0.5 * pulse;
            Color32::from_rgba_unmultiplied(
                badge.color.r(),
                badge.color.g(),
                badge.color.b(),
                (255.0 * alpha) as u8,
            )
        } else {
            badge.color
        };

        let response = ui.horizontal(|ui| {
            let dot_size = 10.0;
            let (rect, _response) =
                ui.allocate_exact_size(Vec2::splat(dot_size), egui::Sense::hover());
            ui.painter().circle_filled(rect.center(), 5.0, color);

            ui.label(RichText::new(badge.icon).size(12.0).color(color));
            ui.label(
                RichText::new(badge.label)
                    .size(12.0)
                    .color(self.theme.text_secondary),
            );
        });

        if in_flux {
            ui.ctx().request_repaint();
        }

        response.response
    }
}
