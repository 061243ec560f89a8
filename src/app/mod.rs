//! Flywheel dashboard
//!
//! egui render surface for the core engine. Every frame pumps the shared
//! scheduler, routes fired timers to their owners, then paints the latest
//! geometry snapshot.

mod details;
mod graphs;
mod header;
mod ring;
mod toasts;

use std::collections::VecDeque;

use eframe::egui;
use tracing::{info, warn};

use crate::core::{
    AssetCatalog, FastRandSource, Flywheel, NotificationQueue, SchedulerHandle, Severity,
};
use crate::theme::{colors, neon_visuals};
use crate::time::now_millis;

/// Velocity history sampling period
const HISTORY_SAMPLE_MS: f64 = 250.0;
/// Samples kept for the history plot
const HISTORY_LEN: usize = 120;

pub struct FlywheelApp {
    pub(crate) scheduler: SchedulerHandle,
    pub(crate) flywheel: Flywheel,
    pub(crate) toasts: NotificationQueue,
    pub(crate) fps_counter: header::FpsCounter,
    /// (seconds, velocity)
    pub(crate) velocity_history: VecDeque<[f64; 2]>,
    last_sample_ms: f64,
    /// Screen position of the pointer while hovering a node
    pub(crate) hover_pos: Option<egui::Pos2>,
}

/// Catalog from `window.__flywheel_catalog` (a JSON string) or the built-in one
fn load_catalog() -> AssetCatalog {
    let json = js_sys::eval("window.__flywheel_catalog")
        .ok()
        .and_then(|v| v.as_string());
    match json {
        Some(json) => match AssetCatalog::from_json(&json) {
            Ok(catalog) => {
                info!(assets = catalog.len(), "Catalog override loaded");
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Catalog override rejected, using built-in catalog");
                AssetCatalog::default()
            }
        },
        None => AssetCatalog::default(),
    }
}

impl FlywheelApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(neon_visuals());

        let scheduler = SchedulerHandle::new();
        // Align the scheduler clock with the page clock before registering timers
        scheduler.advance_to(now_millis());

        let flywheel = Flywheel::mount(scheduler.clone(), load_catalog(), FastRandSource::from_entropy());
        let toasts = NotificationQueue::new(scheduler.clone());

        Self {
            scheduler,
            flywheel,
            toasts,
            fps_counter: header::FpsCounter::new(),
            velocity_history: VecDeque::with_capacity(HISTORY_LEN),
            last_sample_ms: f64::NEG_INFINITY,
            hover_pos: None,
        }
    }

    /// Deliver everything the scheduler says is due
    fn pump_timers(&mut self) {
        let now = now_millis();
        for fired in self.scheduler.advance_to(now) {
            if !self.flywheel.handle(&fired) && !self.toasts.on_timer(fired.id) {
                tracing::trace!(id = ?fired.id, "Timer fired with no owner");
            }
        }

        if now - self.last_sample_ms >= HISTORY_SAMPLE_MS {
            self.last_sample_ms = now;
            if self.velocity_history.len() >= HISTORY_LEN {
                self.velocity_history.pop_front();
            }
            self.velocity_history
                .push_back([now / 1000.0, self.flywheel.velocity()]);
        }
    }

    pub(crate) fn notify(&mut self, severity: Severity, message: &str, detail: Option<&str>) {
        self.toasts.push(severity, message, detail);
    }
}

impl eframe::App for FlywheelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_timers();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_CARD).inner_margin(8.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        egui::TopBottomPanel::bottom("velocity_history")
            .frame(egui::Frame::new().fill(colors::BG_CARD).inner_margin(8.0))
            .exact_height(110.0)
            .show(ctx, |ui| {
                self.render_velocity_history(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_flywheel(ui);
            });

        self.render_details(ctx);
        self.render_toasts(ctx);

        // Continuous animation
        ctx.request_repaint();
    }
}
