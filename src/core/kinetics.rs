//! Flywheel geometry engine
//!
//! Advances the kinetic state by `dt` at the current velocity and emits a
//! complete [`GeometrySnapshot`] for the render surface. The engine never
//! schedules its own ticks; the host calls [`FlywheelEngine::advance`] from
//! its frame callback.
//!
//! Angles are degrees, time is milliseconds.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::layout::{FlywheelLayout, Point};

/// Orbit rotation per ms per unit velocity (degrees)
pub const ROTATION_RATE: f64 = 0.05;
/// Index ring turns the other way at half speed
pub const INDEX_RING_RATIO: f64 = -0.5;
/// Bolt dash travel per ms per unit velocity
pub const BEAM_RATE: f64 = 0.5;

/// Pulse period at velocity 1
pub const PULSE_BASE_PERIOD_MS: f64 = 150.0;
/// Velocity floor for the pulse frequency
pub const PULSE_MIN_VELOCITY: f64 = 0.5;
/// Velocity at which intensity saturates
pub const INTENSITY_SCALE: f64 = 3.0;

pub const BEAM_BASE_WIDTH: f64 = 3.0;
pub const HALO_BASE_OPACITY: f64 = 0.2;
pub const HALO_INTENSITY_SCALE: f64 = 0.3;
pub const HALO_PULSE_SCALE: f64 = 0.1;
pub const DRIVER_PULSE_AMPLITUDE: f64 = 0.1;

pub const VORTEX_RATIO: f64 = 0.8;
pub const BASE_CURVE: f64 = 0.15;
pub const CURVE_SCALE: f64 = 0.15;
pub const TRAIL_BASE_WIDTH: f64 = 1.5;
pub const TRAIL_WIDTH_SCALE: f64 = 1.5;
pub const TRAIL_BASE_OPACITY: f64 = 0.2;
pub const TRAIL_OPACITY_SCALE: f64 = 0.15;

/// Longest frame step the clock will report
pub const MAX_FRAME_DT_MS: f64 = 100.0;

/// Normalized beam energy in `[0, 1]`, saturating at [`INTENSITY_SCALE`]
pub fn intensity(velocity: f64) -> f64 {
    (sanitize_velocity(velocity) / INTENSITY_SCALE).min(1.0)
}

/// Pulse phase (radians fed to `sin`). Faster at higher velocity; velocity
/// is floored at [`PULSE_MIN_VELOCITY`] so the period stays bounded.
pub fn pulse_phase(elapsed_ms: f64, velocity: f64) -> f64 {
    elapsed_ms / (PULSE_BASE_PERIOD_MS / velocity.max(PULSE_MIN_VELOCITY))
}

/// Focus stroke width; within `BEAM_BASE_WIDTH ± intensity`
pub fn beam_width(phase: f64, intensity: f64) -> f64 {
    BEAM_BASE_WIDTH + phase.sin() * intensity
}

/// Halo opacity, clamped to `[0, 1]`
pub fn halo_opacity(phase: f64, intensity: f64) -> f64 {
    (HALO_BASE_OPACITY + intensity * HALO_INTENSITY_SCALE + phase.sin() * HALO_PULSE_SCALE)
        .clamp(0.0, 1.0)
}

/// Breathing scale of the driver node
pub fn driver_scale(phase: f64, intensity: f64) -> f64 {
    1.0 + phase.sin() * DRIVER_PULSE_AMPLITUDE * intensity
}

/// Trail curvature factor. `BASE_CURVE` at rest, growing with velocity.
pub fn curve_factor(velocity: f64) -> f64 {
    let vortex_intensity = sanitize_velocity(velocity) * VORTEX_RATIO;
    BASE_CURVE + vortex_intensity * CURVE_SCALE
}

fn sanitize_velocity(velocity: f64) -> f64 {
    if velocity.is_nan() {
        0.0
    } else {
        velocity.max(0.0)
    }
}

/// Quadratic Bezier curve in a satellite's local frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuadCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl QuadCurve {
    pub fn point_at(&self, t: f64) -> Point {
        let omt = 1.0 - t;
        self.start * (omt * omt) + self.control * (2.0 * omt * t) + self.end * (t * t)
    }

    /// `segments + 1` evenly spaced points from start to end
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f64 / segments as f64))
            .collect()
    }

    /// SVG path data, e.g. `M 0,0 Q 12.5,-40 -220,0`
    pub fn to_svg_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QuadCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {},{} Q {},{} {},{}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

/// Per-satellite vortex trail
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrailGeometry {
    /// Index into the layout's satellites
    pub slot: usize,
    pub path: QuadCurve,
    pub stroke_width: f64,
    pub opacity: f64,
}

/// Trail from a satellite (local origin) back to the hub (`-position`),
/// bowed along the tangent `(-y, x)`.
pub fn vortex_trail(slot: usize, position: Point, velocity: f64) -> TrailGeometry {
    let v = sanitize_velocity(velocity);
    let mid = -position * 0.5;
    let control = mid + position.perp() * curve_factor(v);
    TrailGeometry {
        slot,
        path: QuadCurve {
            start: Point::ORIGIN,
            control,
            end: -position,
        },
        stroke_width: TRAIL_BASE_WIDTH + v * TRAIL_WIDTH_SCALE,
        opacity: (TRAIL_BASE_OPACITY + v * TRAIL_OPACITY_SCALE).clamp(0.0, 1.0),
    }
}

/// Evolving simulation state, mutated once per frame
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct KineticState {
    /// Orbit rotation, degrees, never wrapped
    pub accumulated_rotation: f64,
    /// Dash offset of the energy bolts, decreasing
    pub beam_phase_offset: f64,
    /// Sum of all frame steps; frozen while frames stop
    pub elapsed_ms: f64,
}

/// Everything the render surface needs for one frame
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GeometrySnapshot {
    pub elapsed_ms: f64,
    pub velocity: f64,
    pub intensity: f64,
    /// Orbit group rotation, degrees in `[0, 360)`
    pub orbit_rotation_deg: f64,
    /// Index ring rotation, degrees in `[0, 360)`
    pub index_ring_rotation_deg: f64,
    pub beam_dash_offset: f64,
    pub beam_width: f64,
    pub halo_opacity: f64,
    pub driver_scale: f64,
    pub trails: Vec<TrailGeometry>,
}

/// Owns the kinetic state and the satellite positions it animates
#[derive(Clone, Debug)]
pub struct FlywheelEngine {
    state: KineticState,
    satellites: Vec<Point>,
}

impl FlywheelEngine {
    pub fn new(layout: &FlywheelLayout) -> Self {
        Self::with_positions(layout.satellites.iter().map(|s| s.position).collect())
    }

    /// Engine over raw satellite positions (relative to the hub)
    pub fn with_positions(satellites: Vec<Point>) -> Self {
        Self {
            state: KineticState::default(),
            satellites,
        }
    }

    pub fn state(&self) -> &KineticState {
        &self.state
    }

    pub fn satellite_count(&self) -> usize {
        self.satellites.len()
    }

    /// Step the state by `dt_ms` at `velocity` and return the new geometry.
    /// Negative or non-finite `dt_ms` counts as zero.
    pub fn advance(&mut self, dt_ms: f64, velocity: f64) -> GeometrySnapshot {
        let dt = if dt_ms.is_finite() && dt_ms > 0.0 { dt_ms } else { 0.0 };
        let v = sanitize_velocity(velocity);

        self.state.accumulated_rotation += v * ROTATION_RATE * dt;
        self.state.beam_phase_offset -= v * BEAM_RATE * dt;
        self.state.elapsed_ms += dt;

        trace!(
            dt_ms = dt,
            velocity = v,
            rotation = self.state.accumulated_rotation,
            "Flywheel advanced"
        );

        self.snapshot(v)
    }

    /// Geometry for the current state without advancing it
    pub fn snapshot(&self, velocity: f64) -> GeometrySnapshot {
        let v = sanitize_velocity(velocity);
        let rotation = self.state.accumulated_rotation;
        let phase = pulse_phase(self.state.elapsed_ms, v);
        let energy = intensity(v);

        GeometrySnapshot {
            elapsed_ms: self.state.elapsed_ms,
            velocity: v,
            intensity: energy,
            orbit_rotation_deg: rotation.rem_euclid(360.0),
            index_ring_rotation_deg: (rotation * INDEX_RING_RATIO).rem_euclid(360.0),
            beam_dash_offset: self.state.beam_phase_offset,
            beam_width: beam_width(phase, energy),
            halo_opacity: halo_opacity(phase, energy),
            driver_scale: driver_scale(phase, energy),
            trails: self
                .satellites
                .iter()
                .enumerate()
                .map(|(i, &p)| vortex_trail(i, p, v))
                .collect(),
        }
    }
}

/// Turns host frame timestamps into engine steps.
///
/// The first frame after construction or [`FrameClock::resync`] yields 0.
/// Gaps are capped at `max_dt_ms` so a surface that stopped receiving
/// frames resumes where it left off instead of jumping ahead.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt_ms: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT_MS)
    }
}

impl FrameClock {
    pub fn new(max_dt_ms: f64) -> Self {
        Self { last_ms: None, max_dt_ms: max_dt_ms.max(0.0) }
    }

    pub fn tick(&mut self, timestamp_ms: f64) -> f64 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }
        let dt = match self.last_ms {
            Some(last) if timestamp_ms > last => (timestamp_ms - last).min(self.max_dt_ms),
            // Out-of-order frame: keep the later timestamp
            Some(_) => return 0.0,
            None => 0.0,
        };
        self.last_ms = Some(timestamp_ms);
        dt
    }

    /// Forget the last timestamp; the next tick yields 0
    pub fn resync(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::ORBIT_RADIUS;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn engine(n: usize) -> FlywheelEngine {
        let positions = (0..n)
            .map(|i| Point::polar(ORBIT_RADIUS, i as f64 * std::f64::consts::TAU / n as f64))
            .collect();
        FlywheelEngine::with_positions(positions)
    }

    #[test]
    fn test_rotation_increment_at_max_velocity() {
        let mut e = engine(3);
        let snap = e.advance(16.0, 4.5);
        assert!(approx(e.state().accumulated_rotation, 3.6));
        assert!(approx(snap.orbit_rotation_deg, 3.6));
        assert!(approx(snap.index_ring_rotation_deg, 360.0 - 1.8));
        assert!(approx(e.state().beam_phase_offset, -36.0));
    }

    #[test]
    fn test_rotation_monotonic() {
        let mut e = engine(2);
        let mut prev = e.state().accumulated_rotation;
        for (i, &(dt, v)) in [(0.0, 1.0), (16.0, 0.0), (16.0, 0.1), (33.0, 4.5), (1.0, 2.0)]
            .iter()
            .enumerate()
        {
            e.advance(dt, v);
            let now = e.state().accumulated_rotation;
            assert!(now >= prev, "step {i}");
            if dt > 0.0 && v > 0.0 {
                assert!(now > prev, "step {i} should advance");
            }
            prev = now;
        }
    }

    #[test]
    fn test_zero_velocity_freezes_rotation() {
        let mut e = engine(4);
        e.advance(16.0, 1.0);
        let before = e.state().clone();
        e.advance(500.0, 0.0);
        assert_eq!(e.state().accumulated_rotation, before.accumulated_rotation);
        assert_eq!(e.state().beam_phase_offset, before.beam_phase_offset);
        assert_eq!(e.state().elapsed_ms, before.elapsed_ms + 500.0);
    }

    #[test]
    fn test_first_frame_and_bad_dt() {
        let mut e = engine(1);
        let snap = e.advance(0.0, 2.0);
        assert_eq!(e.state(), &KineticState::default());
        assert_eq!(snap.beam_width, BEAM_BASE_WIDTH);
        assert_eq!(snap.driver_scale, 1.0);

        e.advance(-20.0, 2.0);
        e.advance(f64::NAN, 2.0);
        assert_eq!(e.state(), &KineticState::default());
    }

    #[test]
    fn test_empty_orbit() {
        let mut e = engine(0);
        let snap = e.advance(16.0, 1.0);
        assert!(snap.trails.is_empty());
        assert!(e.state().accumulated_rotation > 0.0);
    }

    #[test]
    fn test_intensity_range() {
        assert_eq!(intensity(0.0), 0.0);
        assert!(approx(intensity(1.5), 0.5));
        assert_eq!(intensity(3.0), 1.0);
        assert_eq!(intensity(4.5), 1.0);
        assert_eq!(intensity(-1.0), 0.0);
        for i in 0..=100 {
            let v = i as f64 * 0.05;
            let k = intensity(v);
            assert!((0.0..=1.0).contains(&k));
        }
    }

    #[test]
    fn test_beam_width_bounds() {
        for &v in &[0.1, 0.5, 1.0, 3.0, 4.5] {
            let k = intensity(v);
            for step in 0..200 {
                let phase = pulse_phase(step as f64 * 7.3, v);
                let w = beam_width(phase, k);
                assert!(w >= BEAM_BASE_WIDTH - k - 1e-12 && w <= BEAM_BASE_WIDTH + k + 1e-12);
                let o = halo_opacity(phase, k);
                assert!((0.0..=1.0).contains(&o));
            }
        }
    }

    #[test]
    fn test_pulse_phase_floor() {
        // Below the floor the frequency stops dropping
        assert_eq!(pulse_phase(150.0, 0.0), pulse_phase(150.0, PULSE_MIN_VELOCITY));
        assert_eq!(pulse_phase(150.0, 0.1), 0.5);
        assert_eq!(pulse_phase(150.0, 2.0), 2.0);
        assert!(pulse_phase(1000.0, 0.0).is_finite());
    }

    #[test]
    fn test_driver_scale_amplitude() {
        let phase = std::f64::consts::FRAC_PI_2;
        assert!(approx(driver_scale(phase, 1.0), 1.1));
        assert!(approx(driver_scale(phase, 0.5), 1.05));
        assert!(approx(halo_opacity(phase, 1.0), 0.6));
    }

    #[test]
    fn test_trail_at_rest_still_curves() {
        let p = Point::new(ORBIT_RADIUS, 0.0);
        let trail = vortex_trail(0, p, 0.0);
        assert_eq!(curve_factor(0.0), BASE_CURVE);
        assert_eq!(trail.path.start, Point::ORIGIN);
        assert_eq!(trail.path.end, Point::new(-ORBIT_RADIUS, 0.0));
        // mid (-110, 0) pushed along (0, 220) by 0.15
        assert!(approx(trail.path.control.x, -110.0));
        assert!(approx(trail.path.control.y, 33.0));
        assert_eq!(trail.stroke_width, 1.5);
        assert!(approx(trail.opacity, 0.2));
    }

    #[test]
    fn test_trail_grows_with_velocity() {
        let p = Point::new(0.0, ORBIT_RADIUS);
        let slow = vortex_trail(0, p, 0.5);
        let fast = vortex_trail(0, p, 4.5);
        assert!(fast.stroke_width > slow.stroke_width);
        assert!(fast.opacity > slow.opacity);

        let bow = |t: &TrailGeometry| (t.path.control - (-p * 0.5)).length();
        assert!(bow(&fast) > bow(&slow));

        // 0.15 + 4.5 * 0.8 * 0.15
        assert!(approx(curve_factor(4.5), 0.69));
        assert!(approx(fast.stroke_width, 8.25));
        assert!(approx(fast.opacity, 0.875));
    }

    #[test]
    fn test_quad_curve() {
        let curve = QuadCurve {
            start: Point::ORIGIN,
            control: Point::new(1.0, 2.0),
            end: Point::new(-4.0, 0.5),
        };
        assert_eq!(curve.point_at(0.0), curve.start);
        assert_eq!(curve.point_at(1.0), curve.end);
        assert_eq!(curve.sample(16).len(), 17);
        assert_eq!(curve.to_svg_path(), "M 0,0 Q 1,2 -4,0.5");
    }

    #[test]
    fn test_snapshot_trails_per_satellite() {
        let mut e = engine(13);
        let snap = e.advance(16.0, 1.0);
        assert_eq!(snap.trails.len(), 13);
        for (i, t) in snap.trails.iter().enumerate() {
            assert_eq!(t.slot, i);
        }
    }

    #[test]
    fn test_rotation_wraps_for_render_only() {
        let mut e = engine(1);
        // 4.5 * 0.05 * 100 = 22.5 degrees per step
        for _ in 0..20 {
            e.advance(100.0, 4.5);
        }
        assert!(approx(e.state().accumulated_rotation, 450.0));
        let snap = e.snapshot(4.5);
        assert!(approx(snap.orbit_rotation_deg, 90.0));
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(1000.0), 0.0);
        assert_eq!(clock.tick(1016.0), 16.0);
        // Out of order
        assert_eq!(clock.tick(1010.0), 0.0);
        assert_eq!(clock.tick(1032.0), 16.0);
        // Long pause is capped
        assert_eq!(clock.tick(60_000.0), MAX_FRAME_DT_MS);

        clock.resync();
        assert_eq!(clock.tick(90_000.0), 0.0);
        assert_eq!(clock.tick(f64::NAN), 0.0);
        assert_eq!(clock.tick(90_016.0), 16.0);
    }
}
