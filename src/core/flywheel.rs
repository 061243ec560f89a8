//! Mounted flywheel visualization
//!
//! Ties the catalog, layout, velocity controller and geometry engine to a
//! scheduler. Mounting registers exactly two callbacks (the frame
//! subscription and, in auto mode, the velocity walk); dropping the
//! flywheel removes both.

use tracing::{debug, info};

use super::catalog::{AssetCatalog, CatalogEntry};
use super::kinetics::{FlywheelEngine, FrameClock, GeometrySnapshot};
use super::layout::{FlywheelLayout, HitTarget, Point};
use super::scheduler::{Fired, SchedulerHandle, TimerId};
use super::velocity::{FastRandSource, RandomSource, VelocityController, VelocityMode};

pub struct Flywheel<R: RandomSource = FastRandSource> {
    scheduler: SchedulerHandle,
    catalog: AssetCatalog,
    layout: FlywheelLayout,
    engine: FlywheelEngine,
    velocity: VelocityController<R>,
    clock: FrameClock,
    frames: Option<TimerId>,
    snapshot: GeometrySnapshot,
    frame_count: u64,
    hovered: Option<HitTarget>,
    selected: Option<HitTarget>,
}

impl<R: RandomSource> Flywheel<R> {
    /// Lay out the catalog, subscribe to frames and start the auto-walk
    pub fn mount(scheduler: SchedulerHandle, catalog: AssetCatalog, rng: R) -> Self {
        let layout = FlywheelLayout::new(&catalog);
        let engine = FlywheelEngine::new(&layout);
        let mut velocity = VelocityController::new(scheduler.clone(), rng);
        velocity.enable_auto();
        let frames = Some(scheduler.request_frames());
        let snapshot = engine.snapshot(velocity.velocity());

        info!(
            satellites = layout.satellites.len(),
            index = %catalog.index().asset.ticker,
            driver = %catalog.driver().asset.ticker,
            "Flywheel mounted"
        );

        Self {
            scheduler,
            catalog,
            layout,
            engine,
            velocity,
            clock: FrameClock::default(),
            frames,
            snapshot,
            frame_count: 0,
            hovered: None,
            selected: None,
        }
    }

    /// Route a fired timer. Returns false if the id belongs to someone else.
    pub fn handle(&mut self, fired: &Fired) -> bool {
        if self.frames == Some(fired.id) {
            let dt = self.clock.tick(fired.at_ms);
            self.snapshot = self.engine.advance(dt, self.velocity.velocity());
            self.frame_count += 1;
            return true;
        }
        self.velocity.on_timer(fired.id)
    }

    /// Advance the scheduler and handle what fired. Only for hosts where
    /// the flywheel is the scheduler's sole user; returns unhandled firings.
    pub fn pump(&mut self, now_ms: f64) -> Vec<Fired> {
        let fired = self.scheduler.advance_to(now_ms);
        fired.into_iter().filter(|f| !self.handle(f)).collect()
    }

    /// Tear down, cancelling every registered callback
    pub fn unmount(self) {
        drop(self);
    }

    pub fn snapshot(&self) -> &GeometrySnapshot {
        &self.snapshot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn layout(&self) -> &FlywheelLayout {
        &self.layout
    }

    pub fn engine(&self) -> &FlywheelEngine {
        &self.engine
    }

    pub fn velocity(&self) -> f64 {
        self.velocity.velocity()
    }

    pub fn mode(&self) -> VelocityMode {
        self.velocity.mode()
    }

    pub fn set_manual_velocity(&mut self, value: f64) -> f64 {
        self.velocity.set_manual(value)
    }

    pub fn enable_auto(&mut self) {
        self.velocity.enable_auto();
    }

    pub fn disable_auto(&mut self) {
        self.velocity.disable_auto();
    }

    /// Frames stopped arriving for a while (hidden tab); restart the clock
    /// so the next frame does not include the gap
    pub fn resync_clock(&mut self) {
        self.clock.resync();
    }

    /// Catalog entry for a hit target
    pub fn asset_for(&self, target: HitTarget) -> Option<&CatalogEntry> {
        match target {
            HitTarget::Index => Some(self.catalog.index()),
            HitTarget::Driver => Some(self.catalog.driver()),
            HitTarget::Satellite(slot) => self
                .layout
                .satellites
                .get(slot)
                .and_then(|s| self.catalog.entry(s.catalog_index)),
        }
    }

    /// Current scene position of a hit target
    pub fn anchor_for(&self, target: HitTarget) -> Option<Point> {
        match target {
            HitTarget::Index => Some(Point::ORIGIN),
            HitTarget::Driver => Some(self.layout.driver_position),
            HitTarget::Satellite(slot) => self
                .layout
                .satellite_world(slot, self.snapshot.orbit_rotation_deg),
        }
    }

    /// Update hover state from a scene-space pointer position
    pub fn hover(&mut self, point: Option<Point>) -> Option<HitTarget> {
        let target =
            point.and_then(|p| self.layout.hit_test(p, self.snapshot.orbit_rotation_deg));
        if target != self.hovered {
            debug!(?target, "Hover changed");
        }
        self.hovered = target;
        target
    }

    /// Select whatever is under `point`; empty space clears the selection
    pub fn click(&mut self, point: Point) -> Option<HitTarget> {
        self.selected = self.layout.hit_test(point, self.snapshot.orbit_rotation_deg);
        if let Some(entry) = self.selected.and_then(|t| self.asset_for(t)) {
            info!(ticker = %entry.asset.ticker, "Asset selected");
        }
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn hovered(&self) -> Option<HitTarget> {
        self.hovered
    }

    pub fn selected(&self) -> Option<HitTarget> {
        self.selected
    }
}

impl<R: RandomSource> Drop for Flywheel<R> {
    fn drop(&mut self) {
        if let Some(id) = self.frames.take() {
            self.scheduler.try_cancel(id);
        }
        // Controller cancels its own walk timer when it drops
        info!(frames = self.frame_count, "Flywheel unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::DRIVER_TICKER;
    use crate::core::layout::ORBIT_RADIUS;
    use crate::core::velocity::{ScriptedSource, AUTO_MAX, AUTO_MIN};

    fn mounted(samples: &[f64]) -> (SchedulerHandle, Flywheel<ScriptedSource>) {
        let sched = SchedulerHandle::new();
        let fw = Flywheel::mount(sched.clone(), AssetCatalog::default(), ScriptedSource::new(samples));
        (sched, fw)
    }

    #[test]
    fn test_mount_registers_two_callbacks() {
        let (sched, fw) = mounted(&[0.5]);
        assert_eq!(sched.pending(), 2);
        assert_eq!(fw.mode(), VelocityMode::Auto);
        assert_eq!(fw.layout().satellites.len(), 13);
        assert_eq!(fw.snapshot().trails.len(), 13);
    }

    #[test]
    fn test_unmount_mid_animation_leaves_nothing_pending() {
        let (sched, mut fw) = mounted(&[1.0, 0.0]);
        for t in (0..=2500).step_by(16) {
            assert!(fw.pump(t as f64).is_empty());
        }
        assert!(fw.frame_count() > 100);

        fw.unmount();
        assert_eq!(sched.pending(), 0);
        assert!(sched.advance_to(60_000.0).is_empty());
    }

    #[test]
    fn test_frames_advance_rotation() {
        let (_sched, mut fw) = mounted(&[0.5]);
        fw.set_manual_velocity(4.5);
        fw.pump(0.0);
        fw.pump(16.0);
        assert!((fw.engine().state().accumulated_rotation - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_manual_mode_drops_walk_timer() {
        let (sched, mut fw) = mounted(&[1.0]);
        fw.set_manual_velocity(9.0);
        assert_eq!(fw.velocity(), 4.5);
        assert_eq!(sched.pending(), 1);

        // Only frames fire from now on; velocity holds
        for t in (0..5000).step_by(100) {
            fw.pump(t as f64);
        }
        assert_eq!(fw.velocity(), 4.5);

        fw.enable_auto();
        assert_eq!(sched.pending(), 2);
        fw.disable_auto();
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_auto_walk_under_frames() {
        let (_sched, mut fw) = mounted(&[1.0, 1.0, 1.0, 0.0]);
        let mut prev = fw.velocity();
        for t in (0..=20_000).step_by(50) {
            fw.pump(t as f64);
            let v = fw.velocity();
            assert!((AUTO_MIN..=AUTO_MAX).contains(&v));
            assert!((v - prev).abs() <= 0.2 + 1e-12);
            prev = v;
        }
    }

    #[test]
    fn test_paused_frames_do_not_catch_up() {
        let (_sched, mut fw) = mounted(&[0.5]);
        fw.set_manual_velocity(1.0);
        fw.pump(0.0);
        fw.pump(16.0);
        let before = fw.engine().state().accumulated_rotation;

        // Surface hidden for a minute, then resynced on return
        fw.resync_clock();
        fw.pump(60_000.0);
        assert_eq!(fw.engine().state().accumulated_rotation, before);
    }

    #[test]
    fn test_paused_auto_walk_steps_once() {
        let (_sched, mut fw) = mounted(&[1.0]);
        fw.pump(16.0);
        let before = fw.velocity();

        // Ten minutes hidden: a single walk step on return, not six hundred
        fw.resync_clock();
        fw.pump(600_000.0);
        let after = fw.velocity();
        assert!((after - before).abs() <= 0.2 + 1e-12, "{before} -> {after}");
        assert!((after - (before + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_foreign_timers_pass_through() {
        let (sched, mut fw) = mounted(&[0.5]);
        let foreign = sched.set_timeout(100.0);
        let rest = fw.pump(100.0);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, foreign);
    }

    #[test]
    fn test_hover_and_click() {
        let (_sched, mut fw) = mounted(&[0.5]);
        fw.set_manual_velocity(1.0);

        let east = Point::new(ORBIT_RADIUS, 0.0);
        assert_eq!(fw.hover(Some(east)), Some(HitTarget::Satellite(0)));
        let entry = fw.asset_for(HitTarget::Satellite(0)).expect("satellite asset");
        assert_eq!(entry.asset.ticker, "LINK");

        let driver = fw.layout().driver_position;
        assert_eq!(fw.click(driver), Some(HitTarget::Driver));
        assert_eq!(
            fw.selected().and_then(|t| fw.asset_for(t)).map(|e| e.asset.ticker.as_str()),
            Some(DRIVER_TICKER)
        );
        assert_eq!(fw.anchor_for(HitTarget::Driver), Some(driver));

        fw.click(Point::new(120.0, 120.0));
        assert_eq!(fw.selected(), None);
        assert_eq!(fw.hover(None), None);
    }

    #[test]
    fn test_hover_tracks_rotation() {
        let (_sched, mut fw) = mounted(&[0.5]);
        fw.set_manual_velocity(1.0);
        fw.pump(0.0);
        // 1.0 * 0.05 * 600ms = 30 degrees
        for t in (16..=600).step_by(16) {
            fw.pump(t as f64);
        }
        fw.pump(600.0);
        let rot = fw.snapshot().orbit_rotation_deg;
        let anchor = fw.anchor_for(HitTarget::Satellite(0)).expect("slot 0");
        assert!((anchor - Point::new(ORBIT_RADIUS, 0.0).rotate_deg(rot)).length() < 1e-9);
        assert_eq!(fw.hover(Some(anchor)), Some(HitTarget::Satellite(0)));
    }
}
