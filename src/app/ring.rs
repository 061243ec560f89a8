//! Flywheel canvas: index hub, orbiting satellites, driver beam and vortex trails

use eframe::egui;

use super::FlywheelApp;
use crate::core::layout::{
    DRIVER_CORE_RADIUS, DRIVER_GLOW_RADIUS, DRIVER_HOVER_SCALE, INDEX_CORE_RADIUS,
    INDEX_RING_RADIUS, SATELLITE_CORE_RADIUS, SATELLITE_HALO_RADIUS, SATELLITE_HOVER_SCALE,
    SCENE_SIZE,
};
use crate::core::{GeometrySnapshot, HitTarget, LabelSide, Point, Severity};
use crate::theme::{colors, rgb_alpha};

/// Segments per vortex trail
const TRAIL_SAMPLES: usize = 24;
/// Segments for the dashed index ring
const RING_SEGMENTS: usize = 72;
const RING_DASH: f32 = 10.0;
const RING_GAP: f32 = 5.0;
const BEAM_HALO_WIDTH: f32 = 8.0;
const BOLT_DASH: f32 = 20.0;
const BOLT_GAP: f32 = 30.0;
const BOLT_WIDTH: f64 = 1.5;

/// Maps the fixed 600x600 scene (origin at the hub, y down) onto the canvas
#[derive(Clone, Copy)]
struct SceneTransform {
    center: egui::Pos2,
    scale: f32,
}

impl SceneTransform {
    fn fit(rect: egui::Rect) -> Self {
        Self {
            center: rect.center(),
            scale: rect.width().min(rect.height()) / SCENE_SIZE as f32,
        }
    }

    fn to_screen(self, p: Point) -> egui::Pos2 {
        self.center + egui::vec2(p.x as f32, p.y as f32) * self.scale
    }

    fn to_scene(self, pos: egui::Pos2) -> Point {
        let d = (pos - self.center) / self.scale;
        Point::new(d.x as f64, d.y as f64)
    }

    fn len(self, scene_len: f64) -> f32 {
        scene_len as f32 * self.scale
    }
}

impl FlywheelApp {
    pub(crate) fn render_flywheel(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, egui::Sense::click());
        let xf = SceneTransform::fit(response.rect);

        // Interaction first so the frame paints the new hover state
        let pointer = response.hover_pos();
        self.hover_pos = pointer;
        let hovered = self.flywheel.hover(pointer.map(|p| xf.to_scene(p)));
        if hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(target) = self.flywheel.click(xf.to_scene(pos)) {
                    let name = self
                        .flywheel
                        .asset_for(target)
                        .map(|e| format!("{} ({})", e.asset.name, e.asset.ticker));
                    if let Some(name) = name {
                        self.notify(Severity::Info, "Asset selected", Some(&name));
                    }
                }
            }
        }

        let snap = self.flywheel.snapshot().clone();

        self.draw_trails(&painter, xf, &snap);
        self.draw_beam(&painter, xf, &snap);
        self.draw_index(&painter, xf, &snap);
        self.draw_satellites(&painter, xf, &snap, hovered);
        self.draw_driver(&painter, xf, &snap, hovered);
    }

    fn draw_trails(&self, painter: &egui::Painter, xf: SceneTransform, snap: &GeometrySnapshot) {
        let layout = self.flywheel.layout();
        for trail in &snap.trails {
            let (Some(slot), Some(origin)) = (
                layout.satellites.get(trail.slot),
                layout.satellite_world(trail.slot, snap.orbit_rotation_deg),
            ) else {
                continue;
            };
            let Some(entry) = self.flywheel.catalog().entry(slot.catalog_index) else {
                continue;
            };

            // Curve lives in the orbit frame, anchored on the satellite
            let points: Vec<egui::Pos2> = trail
                .path
                .sample(TRAIL_SAMPLES)
                .into_iter()
                .map(|p| xf.to_screen(origin + p.rotate_deg(snap.orbit_rotation_deg)))
                .collect();
            painter.add(egui::Shape::line(
                points,
                egui::Stroke::new(xf.len(trail.stroke_width), rgb_alpha(entry.rgb, trail.opacity)),
            ));
        }
    }

    fn draw_beam(&self, painter: &egui::Painter, xf: SceneTransform, snap: &GeometrySnapshot) {
        let rgb = self.flywheel.catalog().driver().rgb;
        let from = xf.to_screen(self.flywheel.layout().driver_position);
        let to = xf.to_screen(Point::ORIGIN);

        painter.line_segment(
            [from, to],
            egui::Stroke::new(xf.len(BEAM_HALO_WIDTH as f64), rgb_alpha(rgb, snap.halo_opacity)),
        );
        painter.line_segment(
            [from, to],
            egui::Stroke::new(xf.len(snap.beam_width), rgb_alpha(rgb, 1.0)),
        );

        // Bolts travel toward the hub as the dash offset decreases
        let period = BOLT_DASH + BOLT_GAP;
        let offset = (-snap.beam_dash_offset as f32).rem_euclid(period);
        painter.extend(egui::Shape::dashed_line_with_offset(
            &[from, to],
            egui::Stroke::new(xf.len(BOLT_WIDTH), colors::TEXT_PRIMARY),
            &[BOLT_DASH * xf.scale],
            &[BOLT_GAP * xf.scale],
            offset * xf.scale,
        ));
    }

    fn draw_index(&self, painter: &egui::Painter, xf: SceneTransform, snap: &GeometrySnapshot) {
        let entry = self.flywheel.catalog().index();
        let center = xf.to_screen(Point::ORIGIN);

        let ring: Vec<egui::Pos2> = (0..=RING_SEGMENTS)
            .map(|i| {
                let deg = snap.index_ring_rotation_deg + i as f64 * 360.0 / RING_SEGMENTS as f64;
                xf.to_screen(Point::polar(INDEX_RING_RADIUS, deg.to_radians()))
            })
            .collect();
        painter.extend(egui::Shape::dashed_line(
            &ring,
            egui::Stroke::new(1.0, rgb_alpha(entry.rgb, 0.4)),
            RING_DASH * xf.scale,
            RING_GAP * xf.scale,
        ));

        let radius = xf.len(INDEX_CORE_RADIUS);
        painter.circle_filled(center, radius, colors::HUB_FILL);
        painter.circle_stroke(center, radius, egui::Stroke::new(2.0, colors::HUB_STROKE));
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "INDEX",
            egui::FontId::proportional(xf.len(12.0).max(8.0)),
            colors::TEXT_PRIMARY,
        );
    }

    fn draw_satellites(
        &self,
        painter: &egui::Painter,
        xf: SceneTransform,
        snap: &GeometrySnapshot,
        hovered: Option<HitTarget>,
    ) {
        let layout = self.flywheel.layout();
        let font = egui::FontId::monospace(xf.len(10.0).max(7.0));

        for (i, slot) in layout.satellites.iter().enumerate() {
            let Some(entry) = self.flywheel.catalog().entry(slot.catalog_index) else {
                continue;
            };
            let Some(world) = layout.satellite_world(i, snap.orbit_rotation_deg) else {
                continue;
            };
            let is_hovered = hovered == Some(HitTarget::Satellite(i));
            let scale = if is_hovered { SATELLITE_HOVER_SCALE } else { 1.0 };
            let pos = xf.to_screen(world);

            painter.circle_filled(pos, xf.len(SATELLITE_HALO_RADIUS * scale), rgb_alpha(entry.rgb, 0.2));
            painter.circle_filled(pos, xf.len(SATELLITE_CORE_RADIUS * scale), rgb_alpha(entry.rgb, 1.0));

            let text_color = if is_hovered { colors::TEXT_PRIMARY } else { colors::TEXT_SECONDARY };
            let galley = painter.layout_no_wrap(entry.asset.ticker.clone(), font.clone(), text_color);

            // Label points radially outward and is flipped on the left half
            let outward = (slot.angle_deg + snap.orbit_rotation_deg).to_radians();
            let anchor = xf.to_screen(world + Point::polar(slot.label.dx().abs(), outward));
            let angle = (outward + slot.label.rotation_deg().to_radians()) as f32;
            let size = galley.size();
            let local = match slot.label {
                LabelSide::Right => egui::vec2(0.0, size.y * 0.5),
                LabelSide::Left => egui::vec2(size.x, size.y * 0.5),
            };
            let rot = egui::emath::Rot2::from_angle(angle);
            let origin = anchor - rot * local;
            painter.add(egui::epaint::TextShape::new(origin, galley, text_color).with_angle(angle));
        }
    }

    fn draw_driver(
        &self,
        painter: &egui::Painter,
        xf: SceneTransform,
        snap: &GeometrySnapshot,
        hovered: Option<HitTarget>,
    ) {
        let entry = self.flywheel.catalog().driver();
        let pos = xf.to_screen(self.flywheel.layout().driver_position);
        let hover = if hovered == Some(HitTarget::Driver) { DRIVER_HOVER_SCALE } else { 1.0 };

        painter.circle_filled(
            pos,
            xf.len(DRIVER_GLOW_RADIUS * snap.driver_scale * hover),
            rgb_alpha(entry.rgb, snap.halo_opacity),
        );
        painter.circle_filled(pos, xf.len(DRIVER_CORE_RADIUS * hover), colors::HUB_FILL);
        painter.circle_stroke(
            pos,
            xf.len(DRIVER_CORE_RADIUS * hover),
            egui::Stroke::new(2.0, rgb_alpha(entry.rgb, 1.0)),
        );
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            "CORE",
            egui::FontId::proportional(xf.len(10.0).max(7.0)),
            rgb_alpha(entry.rgb, 1.0),
        );
    }
}
