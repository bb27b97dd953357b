//! # Binding Window
//!
//! eframe host for [`InputDialog`]. egui redraws every frame, so the window
//! only has to feed input into the dialog and render its state:
//!
//! - **Top Panel**: controller selection
//! - **Central Panel**: one button per control showing its binding
//! - **Bottom Panel**: notices and the OK / Cancel buttons
//!
//! While a capture runs the window asks egui for a repaint at the next poll
//! deadline, so the gamepad is polled even without any window input.

pub mod common;
pub mod keys;

use crate::controller::capture::{CaptureSignal, CaptureTarget};
use crate::dialog::{InputDialog, KeyOutcome, Notice};
use common::{control_label, create_frame, notice_color, UiColors};
use eframe::egui::{self, Button, Event, Vec2};
use std::time::Instant;
use tracing::{debug, info};

const CONTROL_BUTTON_SIZE: Vec2 = Vec2 { x: 180.0, y: 20.0 };

pub struct BindingWindow {
    dialog: InputDialog,
    /// Control shown pressed, driven by capture signals
    pressed: Option<CaptureTarget>,
    notices: Vec<Notice>,
}

impl BindingWindow {
    pub fn new(cc: &eframe::CreationContext<'_>, dialog: InputDialog) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        let mut window = BindingWindow {
            dialog,
            pressed: None,
            notices: Vec::new(),
        };
        window.drain_dialog();
        window
    }

    fn drain_dialog(&mut self) {
        for signal in self.dialog.take_signals() {
            self.pressed = match signal {
                CaptureSignal::Started(target) => Some(target),
                CaptureSignal::Ended(_) => None,
            };
        }
        self.notices.extend(self.dialog.take_notices());
    }

    /// Routes key presses to the dialog. Returns true when it asks to close.
    ///
    /// While capturing, key events are removed from the frame input so the
    /// focused widget does not react to the key being bound.
    fn handle_keys(&mut self, ctx: &egui::Context) -> bool {
        let capturing = self.dialog.is_capturing();
        let pressed = ctx.input_mut(|input| {
            let pressed: Vec<egui::Key> = input
                .events
                .iter()
                .filter_map(|event| match event {
                    Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => Some(*key),
                    _ => None,
                })
                .collect();
            if capturing {
                input
                    .events
                    .retain(|event| !matches!(event, Event::Key { .. } | Event::Text(_)));
            }
            pressed
        });

        let mut close = false;
        for key in pressed {
            let Some(code) = keys::keycode(key) else {
                debug!("Key {:?} cannot be bound", key);
                continue;
            };
            if self.dialog.key_pressed(code) == KeyOutcome::CloseRequested {
                close = true;
            }
        }
        close
    }

    fn render_controller_select(&mut self, ui: &mut egui::Ui) {
        let mut selected = self.dialog.current_controller();
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Controller")
                .selected_text(format!("Controller {}", selected + 1))
                .show_ui(ui, |ui| {
                    for index in 0..self.dialog.controller_count() {
                        ui.selectable_value(&mut selected, index, format!("Controller {}", index + 1));
                    }
                });
            if !self.dialog.can_capture() {
                ui.colored_label(UiColors::ERROR, "Gamepad support unavailable, capturing is disabled");
            }
        });
        if selected != self.dialog.current_controller() {
            self.dialog.select_controller(selected);
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let controller = self.dialog.current_controller();
        let rows: Vec<_> = self
            .dialog
            .controls()
            .map(|(id, mapping)| (id, control_label(mapping), self.dialog.display_text(id)))
            .collect();

        let mut activated = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("bindings")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (id, label, text) in rows {
                        let pressed = self
                            .pressed
                            .is_some_and(|t| t.controller == controller && t.control == id);
                        let button = if pressed {
                            Button::new("...").fill(UiColors::ACTIVE)
                        } else {
                            Button::new(text)
                        }
                        .min_size(CONTROL_BUTTON_SIZE);

                        ui.label(label);
                        if ui.add_enabled(self.dialog.can_capture(), button).clicked() {
                            activated = Some(id);
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some(id) = activated {
            self.dialog.activate(id, Instant::now());
        }
    }

    /// Returns true when the window should close
    fn render_footer(&mut self, ui: &mut egui::Ui) -> bool {
        if !self.notices.is_empty() {
            create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
                for notice in &self.notices {
                    ui.colored_label(notice_color(notice.level), &notice.message);
                }
            });
        }

        let mut close = false;
        ui.horizontal(|ui| {
            if ui.button("OK").clicked() {
                self.dialog.accept();
                close = true;
            }
            if ui.button("Cancel").clicked() {
                self.dialog.reject();
                close = true;
            }
        });
        close
    }
}

impl eframe::App for BindingWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut close = self.handle_keys(ctx);

        if self.dialog.poll(Instant::now()) {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("controller_panel").show(ctx, |ui| {
            self.render_controller_select(ui);
        });
        egui::TopBottomPanel::bottom("footer_panel").show(ctx, |ui| {
            close |= self.render_footer(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_controls(ui);
        });

        self.drain_dialog();
        if let Some(wait) = self.dialog.next_poll_in(Instant::now()) {
            ctx.request_repaint_after(wait);
        }

        if close {
            info!("Closing binding window");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
