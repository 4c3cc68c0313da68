// Main UI app - log input, playback controls and the deck view

use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, NotificationCategory, NotificationLevel};
use crate::sequencer::session::SimulationSession;
use crate::sequencer::stepper::StepperState;
use crate::ui::deck_view::DeckView;
use eframe::egui;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;

pub struct ReplayApp {
    session: SimulationSession,
    log_text: String,
    interval_ui: u64,
    deck_view: DeckView,
    // Notification system
    notification_rx: NotificationConsumer,
    notification_queue: VecDeque<Notification>,
    max_notifications: usize,
}

impl ReplayApp {
    pub fn new(session: SimulationSession, notification_rx: NotificationConsumer) -> Self {
        let interval_ui = session.interval().as_millis() as u64;
        let deck_view =
            DeckView::default().with_well_capacity(session.config().catalog.well_plate_capacity);

        Self {
            session,
            log_text: String::new(),
            interval_ui,
            deck_view,
            notification_rx,
            notification_queue: VecDeque::new(),
            max_notifications: 10,
        }
    }

    /// Pre-fill the log box (e.g. from a file given on the command line)
    pub fn with_log_text(mut self, text: String) -> Self {
        self.log_text = text;
        self
    }

    /// Drain new notifications from the ringbuffer into the queue
    fn update_notifications(&mut self) {
        while let Some(notification) = ringbuf::traits::Consumer::try_pop(&mut self.notification_rx) {
            self.push_notification(notification);
        }
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notification_queue.push_back(notification);
        if self.notification_queue.len() > self.max_notifications {
            self.notification_queue.pop_front();
        }
    }

    /// Up to three notifications younger than 5 seconds, newest first
    fn recent_notifications(&self) -> Vec<&Notification> {
        self.notification_queue
            .iter()
            .rev()
            .filter(|n| n.is_recent(5000))
            .take(3)
            .collect()
    }

    fn open_log_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Run logs", &["txt", "log"])
            .pick_file()
        else {
            return;
        };
        self.load_log_file(&path);
    }

    fn load_log_file(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                self.log_text = text;
                self.push_notification(Notification::info(
                    NotificationCategory::LogFile,
                    format!("Opened {}", path.display()),
                ));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read log file");
                self.push_notification(Notification::error(
                    NotificationCategory::LogFile,
                    format!("Could not read {}: {}", path.display(), e),
                ));
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.add(
            egui::TextEdit::multiline(&mut self.log_text)
                .hint_text("Enter aspiration & dispensing commands...")
                .desired_rows(6)
                .desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            if ui.button("Run Simulation").clicked() {
                let text = self.log_text.clone();
                self.session.run(&text, now);
            }
            if ui.button("Rewind").clicked() {
                self.session.rewind(now);
            }
            if ui.button("Open log…").clicked() {
                self.open_log_file();
            }
        });

        let playback = self.session.config().playback.clone();
        ui.horizontal(|ui| {
            let slider = egui::Slider::new(
                &mut self.interval_ui,
                playback.min_interval_ms..=playback.max_interval_ms,
            )
            .step_by(playback.interval_step_ms as f64)
            .text("Speed (ms)");
            if ui.add(slider).changed() {
                self.session.set_interval(self.interval_ui);
            }
        });

        let (applied, total) = self.session.progress();
        let status = match self.session.state() {
            StepperState::Idle => "idle",
            StepperState::Running => "playing",
            StepperState::Exhausted => "finished",
        };
        ui.label(format!("Step {} / {} ({})", applied, total, status));
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        for notification in self.recent_notifications() {
            let color = match notification.level {
                NotificationLevel::Info => egui::Color32::GRAY,
                NotificationLevel::Warning => egui::Color32::from_rgb(255, 165, 0),
                NotificationLevel::Error => egui::Color32::RED,
            };
            ui.colored_label(color, &notification.message);
        }
    }
}

impl eframe::App for ReplayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.session.poll(now);
        self.update_notifications();

        // Wake up for the next step even without input events
        if let Some(wait) = self.session.next_wakeup(now) {
            ctx.request_repaint_after(wait);
        }

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            self.draw_controls(ui, now);
            self.draw_status_bar(ui);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.deck_view
                    .show(ui, self.session.store(), self.session.is_visible());
            });
        });
    }
}
