//! Hover tooltip and selected-asset panel

use eframe::egui;

use super::FlywheelApp;
use crate::core::AssetRole;
use crate::theme::colors;

fn role_label(role: AssetRole) -> &'static str {
    match role {
        AssetRole::Index => "Index",
        AssetRole::Driver => "Driver",
        AssetRole::Satellite => "Satellite",
    }
}

impl FlywheelApp {
    pub(crate) fn render_details(&mut self, ctx: &egui::Context) {
        self.render_tooltip(ctx);
        self.render_selection(ctx);
    }

    fn render_tooltip(&self, ctx: &egui::Context) {
        let (Some(target), Some(pos)) = (self.flywheel.hovered(), self.hover_pos) else {
            return;
        };
        // The selection panel already shows it
        if self.flywheel.selected() == Some(target) {
            return;
        }
        let Some(entry) = self.flywheel.asset_for(target) else {
            return;
        };

        egui::Area::new(egui::Id::new("asset_tooltip"))
            .fixed_pos(pos + egui::vec2(14.0, 14.0))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(colors::BG_CARD)
                    .stroke(egui::Stroke::new(1.0, colors::BORDER))
                    .inner_margin(8.0)
                    .corner_radius(4.0)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&entry.asset.name).strong());
                        ui.label(
                            egui::RichText::new(&entry.asset.ticker)
                                .monospace()
                                .color(colors::NEON_GREEN),
                        );
                    });
            });
    }

    fn render_selection(&mut self, ctx: &egui::Context) {
        let Some(target) = self.flywheel.selected() else {
            return;
        };
        let Some(entry) = self.flywheel.asset_for(target) else {
            self.flywheel.clear_selection();
            return;
        };

        let name = entry.asset.name.clone();
        let ticker = entry.asset.ticker.clone();
        let description = entry.asset.description_or_default().to_string();
        let role = role_label(entry.role);
        let accent = crate::theme::rgb_alpha(entry.rgb, 1.0);

        let mut close = false;
        egui::Window::new("Asset")
            .id(egui::Id::new("asset_details"))
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 96.0))
            .frame(
                egui::Frame::new()
                    .fill(colors::BG_CARD)
                    .stroke(egui::Stroke::new(1.0, accent))
                    .inner_margin(12.0)
                    .corner_radius(6.0),
            )
            .show(ctx, |ui| {
                ui.set_max_width(260.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&name).strong().size(16.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("x").clicked() {
                            close = true;
                        }
                    });
                });
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&ticker).monospace().color(accent));
                    ui.label(egui::RichText::new(role).small().color(colors::TEXT_MUTED));
                });
                ui.separator();
                ui.label(egui::RichText::new(&description).color(colors::TEXT_SECONDARY));
            });

        if close {
            self.flywheel.clear_selection();
        }
    }
}
