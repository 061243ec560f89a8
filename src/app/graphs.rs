//! Velocity history plot

use eframe::egui;

use super::FlywheelApp;
use crate::core::velocity::{MANUAL_MAX, MANUAL_MIN};
use crate::core::VelocityMode;
use crate::theme::colors;

impl FlywheelApp {
    pub(crate) fn render_velocity_history(&self, ui: &mut egui::Ui) {
        use egui_plot::{HLine, Line, Plot, PlotPoints};

        ui.label(
            egui::RichText::new("Velocity")
                .color(colors::TEXT_MUTED)
                .size(14.0),
        );

        let color = match self.flywheel.mode() {
            VelocityMode::Auto => colors::NEON_GREEN,
            VelocityMode::Manual => colors::MANUAL_BLUE,
        };

        // Plot x relative to the newest sample so the axis reads "seconds ago"
        let newest = self.velocity_history.back().map(|p| p[0]).unwrap_or(0.0);
        let points: PlotPoints = self
            .velocity_history
            .iter()
            .map(|&[t, v]| [t - newest, v])
            .collect();

        Plot::new("velocity_history")
            .show_axes([false, true])
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_background(false)
            .include_y(MANUAL_MIN)
            .include_y(MANUAL_MAX)
            .label_formatter(|_name, value| format!("{:.1}s {:.2}x", value.x, value.y))
            .show(ui, |plot_ui| {
                plot_ui.hline(
                    HLine::new(1.0)
                        .color(colors::BORDER)
                        .width(1.0),
                );
                plot_ui.line(Line::new(points).color(color).width(1.5));
            });
    }
}
