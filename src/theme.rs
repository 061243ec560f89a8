//! Dark neon theme for the flywheel dashboard

use egui::Color32;

use crate::core::Severity;

pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(5, 5, 5);           // #050505 - page
    pub const BG_CARD: Color32 = Color32::from_rgb(17, 17, 17);           // #111111 - card
    pub const BG_HOVER: Color32 = Color32::from_rgb(28, 28, 28);          // #1C1C1C - hover states
    pub const HUB_FILL: Color32 = Color32::from_rgb(5, 5, 5);
    pub const HUB_STROKE: Color32 = Color32::from_rgb(51, 51, 51);        // #333

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(156, 163, 175); // gray-400
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(107, 114, 128);     // gray-500

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(38, 38, 38);

    // === Accents ===
    pub const NEON_GREEN: Color32 = Color32::from_rgb(57, 255, 20);       // #39FF14
    pub const MANUAL_BLUE: Color32 = Color32::from_rgb(59, 130, 246);     // blue-500
    pub const ERROR_RED: Color32 = Color32::from_rgb(239, 68, 68);
    pub const INFO_BLUE: Color32 = Color32::from_rgb(96, 165, 250);
    pub const LOADING_YELLOW: Color32 = Color32::from_rgb(250, 204, 21);
}

/// Accent for a notification severity
pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Success => colors::NEON_GREEN,
        Severity::Error => colors::ERROR_RED,
        Severity::Info => colors::INFO_BLUE,
        Severity::Loading => colors::LOADING_YELLOW,
    }
}

/// Color from catalog RGB with a `[0, 1]` opacity
pub fn rgb_alpha(rgb: [u8; 3], opacity: f64) -> Color32 {
    let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], a)
}

pub fn neon_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_CARD;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_CARD;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_CARD;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_CARD;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_CARD;

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;

    visuals.widgets.active.bg_fill = BG_HOVER;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, NEON_GREEN);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, NEON_GREEN);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    // Slider rail fill and selected toggles
    visuals.selection.bg_fill = NEON_GREEN.gamma_multiply(0.6);
    visuals.selection.stroke = egui::Stroke::new(1.0, NEON_GREEN);

    visuals.hyperlink_color = NEON_GREEN;

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
