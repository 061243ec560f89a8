//! Notification stack, bottom-right

use eframe::egui;

use super::FlywheelApp;
use crate::theme::{colors, severity_color};

impl FlywheelApp {
    pub(crate) fn render_toasts(&mut self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }

        let mut dismissed = Vec::new();
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -126.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for n in self.toasts.iter() {
                    let accent = severity_color(n.severity);
                    egui::Frame::new()
                        .fill(colors::BG_CARD)
                        .stroke(egui::Stroke::new(1.0, accent))
                        .inner_margin(10.0)
                        .corner_radius(6.0)
                        .show(ui, |ui| {
                            ui.set_width(260.0);
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(n.severity.label())
                                        .small()
                                        .color(accent),
                                );
                                ui.label(egui::RichText::new(&n.message).strong());
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("x").clicked() {
                                            dismissed.push(n.id);
                                        }
                                    },
                                );
                            });
                            if let Some(detail) = &n.detail {
                                ui.label(
                                    egui::RichText::new(detail)
                                        .small()
                                        .color(colors::TEXT_SECONDARY),
                                );
                            }
                        });
                    ui.add_space(6.0);
                }
            });

        for id in dismissed {
            self.toasts.dismiss(id);
        }
    }
}
