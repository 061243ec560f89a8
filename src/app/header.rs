//! Header bar: title, auto/manual toggle, velocity gauge and slider

use std::collections::VecDeque;

use eframe::egui;

use super::FlywheelApp;
use crate::core::velocity::{MANUAL_MAX, MANUAL_MIN, MANUAL_STEP};
use crate::core::{Severity, VelocityMode};
use crate::theme::colors;
use crate::time::now_seconds;

impl FlywheelApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Index Flywheel")
                    .color(colors::TEXT_PRIMARY)
                    .strong()
                    .size(20.0),
            )
            .on_hover_text(format!(
                "Real-time visualization of the ecosystem. The core asset ({}) powers the index ({}).",
                self.flywheel.catalog().driver().asset.ticker,
                self.flywheel.catalog().index().asset.ticker,
            ));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_MUTED),
                );
                ui.add_space(10.0);

                let mode = self.flywheel.mode();

                // Right-to-left: Manual first so Auto renders on the left
                let manual = ui.selectable_label(
                    mode == VelocityMode::Manual,
                    egui::RichText::new("Manual").color(if mode == VelocityMode::Manual {
                        colors::MANUAL_BLUE
                    } else {
                        colors::TEXT_SECONDARY
                    }),
                );
                let auto = ui.selectable_label(
                    mode == VelocityMode::Auto,
                    egui::RichText::new("Auto").color(if mode == VelocityMode::Auto {
                        colors::NEON_GREEN
                    } else {
                        colors::TEXT_SECONDARY
                    }),
                );

                if auto.clicked() && mode != VelocityMode::Auto {
                    self.flywheel.enable_auto();
                    self.notify(Severity::Info, "Auto velocity", Some("Following simulated market activity"));
                }
                if manual.clicked() && mode != VelocityMode::Manual {
                    self.flywheel.disable_auto();
                    self.notify(Severity::Info, "Manual velocity", Some("Use the slider to set the speed"));
                }
            });
        });

        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("{:.2}x", self.flywheel.velocity()))
                    .color(colors::NEON_GREEN)
                    .monospace()
                    .strong(),
            );

            let mut velocity = self.flywheel.velocity();
            ui.spacing_mut().slider_width = ui.available_width();
            let response = ui.add(
                egui::Slider::new(&mut velocity, MANUAL_MIN..=MANUAL_MAX)
                    .step_by(MANUAL_STEP)
                    .clamping(egui::SliderClamping::Always)
                    .show_value(false),
            );
            if response.changed() {
                self.flywheel.set_manual_velocity(velocity);
            }
        });
    }
}

/// FPS counter over the last 60 frames
pub struct FpsCounter {
    frames: VecDeque<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(61),
        }
    }

    pub fn tick(&mut self) {
        self.frames.push_back(now_seconds());
        if self.frames.len() > 60 {
            self.frames.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) if self.frames.len() >= 2 && last > first => {
                (self.frames.len() as f64 - 1.0) / (last - first)
            }
            _ => 0.0,
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
