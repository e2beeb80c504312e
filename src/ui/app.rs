//! Main application struct and eframe integration
//!
//! Renders one screen per lifecycle phase: a progress indicator while
//! credentials load, the error verbatim with a retry action when the fetch
//! failed, a welcome gate while idle, and the live session view while
//! active. All session logic lives in the supervisor; the app only polls its
//! events and shared state each frame.

use crate::config::AppConfig;
use crate::session::{SessionEvent, SessionSnapshot, SupervisorHandle};
use crate::transport::ActivitySample;
use crate::ui::components::{ActivityBars, StatusBadgeView};
use crate::ui::theme::Theme;
use crate::visualizer::ActivityVisualizer;
use crossbeam_channel::Receiver;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::Duration;

/// Frame-to-frame poll interval while channels are live.
const POLL_INTERVAL: Duration = Duration::from_millis(33);

/// Main Parley application
pub struct ParleyApp {
    /// Supervisor control handle
    handle: SupervisorHandle,
    /// Visual theme
    theme: Theme,
    /// Derived bar level for the agent visualizer
    visualizer: ActivityVisualizer,
    /// Activity stream of the current session, if one is open
    activity_rx: Option<Receiver<ActivitySample>>,
}

impl ParleyApp {
    /// Create the application over a started supervisor
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        handle: SupervisorHandle,
        config: &AppConfig,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self {
            handle,
            theme,
            visualizer: ActivityVisualizer::new(config.bar_count, config.smoothing),
            activity_rx: None,
        }
    }

    /// Drain supervisor events and the activity stream
    fn poll_events(&mut self) {
        while let Some(event) = self.handle.try_recv_event() {
            match event {
                SessionEvent::SessionStarted { activity } => {
                    self.visualizer.reset();
                    self.activity_rx = Some(activity);
                }
                SessionEvent::SessionEnded => {
                    self.activity_rx = None;
                    self.visualizer.reset();
                }
                SessionEvent::PhaseChanged | SessionEvent::Shutdown => {}
            }
        }

        if let Some(rx) = &self.activity_rx {
            while let Ok(sample) = rx.try_recv() {
                self.visualizer.update(sample.agent_state, sample.amplitude);
            }
        }
    }

    fn show_header(&self, ctx: &egui::Context, snapshot: &SessionSnapshot) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Parley")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if snapshot.phase.is_active() {
                            StatusBadgeView::new(snapshot.connectivity, &self.theme).show(ui);
                        }
                    });
                });
            });
    }

    fn show_loading(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.35);
            ui.add(egui::Spinner::new().size(32.0));
            ui.add_space(self.theme.spacing);
            ui.label(
                RichText::new("Preparing your session…")
                    .size(14.0)
                    .color(self.theme.text_secondary),
            );
        });
    }

    fn show_error(&self, ui: &mut egui::Ui, message: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.label(
                RichText::new("Could not start a session")
                    .size(18.0)
                    .strong()
                    .color(self.theme.error),
            );
            ui.add_space(self.theme.spacing_sm);
            // Shown verbatim so operators running their own backend can
            // see what actually failed
            ui.label(
                RichText::new(message)
                    .size(13.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(self.theme.spacing);
            if ui.button("Try again").clicked() {
                let _ = self.handle.retry();
            }
        });
    }

    fn show_welcome(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.label(
                RichText::new("Voice Support Assistant")
                    .size(26.0)
                    .strong()
                    .color(self.theme.text_primary),
            );
            ui.add_space(self.theme.spacing_sm);
            ui.label(
                RichText::new("Talk to the assistant in real time. Your microphone\nstays off until you start.")
                    .size(14.0)
                    .color(self.theme.text_secondary),
            );
            ui.add_space(self.theme.spacing * 2.0);
            let start = egui::Button::new(RichText::new("Start conversation").size(16.0))
                .min_size(egui::Vec2::new(220.0, 44.0))
                .rounding(self.theme.button_rounding);
            if ui.add(start).clicked() {
                let _ = self.handle.begin_session();
            }
        });
    }

    fn show_active(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.2);
            ui.label(
                RichText::new(self.visualizer.agent_state().to_string())
                    .size(13.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(self.theme.spacing);
            ActivityBars::new(&self.visualizer, &self.theme)
                .height(72.0)
                .show(ui);
            ui.add_space(self.theme.spacing * 3.0);
            let leave = egui::Button::new(RichText::new("Leave session").size(14.0))
                .min_size(egui::Vec2::new(160.0, 36.0))
                .rounding(self.theme.button_rounding);
            if ui.add(leave).clicked() {
                let _ = self.handle.end_session();
            }
        });
    }

}

impl eframe::App for ParleyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        let snapshot = self.handle.state().snapshot();
        self.show_header(ctx, &snapshot);

        CentralPanel::default().show(ctx, |ui| {
            use crate::session::LifecyclePhase;
            match &snapshot.phase {
                LifecyclePhase::Loading => self.show_loading(ui),
                LifecyclePhase::Error(message) => self.show_error(ui, message),
                LifecyclePhase::Idle => self.show_welcome(ui),
                LifecyclePhase::Active => self.show_active(ui),
            }
        });

        // Phase changes and activity arrive over channels, not input events
        ctx.request_repaint_after(POLL_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let _ = self.handle.shutdown();
    }
}
