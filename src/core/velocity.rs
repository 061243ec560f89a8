//! Velocity controller
//!
//! Owns the scalar velocity that drives every animation rate. In manual
//! mode the value only changes through [`VelocityController::set_manual`];
//! in auto mode a one-second interval perturbs it by a bounded random step.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::scheduler::{SchedulerHandle, TimerId};

/// Manual range
pub const MANUAL_MIN: f64 = 0.1;
pub const MANUAL_MAX: f64 = 4.5;
/// Auto-walk range
pub const AUTO_MIN: f64 = 0.5;
pub const AUTO_MAX: f64 = 4.5;
/// Slider granularity for manual control
pub const MANUAL_STEP: f64 = 0.1;

pub const DEFAULT_VELOCITY: f64 = 1.0;
/// Auto-walk period
pub const AUTO_STEP_PERIOD_MS: f64 = 1000.0;
/// Largest auto-walk step in either direction
pub const AUTO_MAX_DELTA: f64 = 0.2;

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Default source backed by `fastrand`
#[derive(Clone, Debug)]
pub struct FastRandSource(fastrand::Rng);

impl FastRandSource {
    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }

    /// Seed from OS entropy, falling back to a fixed seed
    pub fn from_entropy() -> Self {
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => Self::with_seed(u64::from_le_bytes(bytes)),
            Err(e) => {
                warn!(error = %e, "No entropy source, using fixed seed");
                Self::with_seed(0x5EED)
            }
        }
    }
}

impl RandomSource for FastRandSource {
    fn next_unit(&mut self) -> f64 {
        self.0.f64()
    }
}

/// Replays a fixed sequence of samples, cycling when exhausted
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ScriptedSource {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(values: &[f64]) -> Self {
        Self { values: values.to_vec(), pos: 0 }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let v = self.values.get(self.pos % self.values.len().max(1)).copied().unwrap_or(0.5);
        self.pos += 1;
        v
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityMode {
    Auto,
    Manual,
}

/// Clamp into the manual range; NaN yields `None`
pub fn clamp_manual(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(MANUAL_MIN, MANUAL_MAX))
    }
}

/// One auto-walk step: `current + delta`, `delta` uniform in `[-max_delta, max_delta)`,
/// pinned to the auto range
pub fn walk_step(current: f64, unit: f64, max_delta: f64) -> f64 {
    let delta = (unit.clamp(0.0, 1.0) - 0.5) * 2.0 * max_delta;
    (current + delta).clamp(AUTO_MIN, AUTO_MAX)
}

/// Produces the velocity consumed by the geometry engine.
///
/// Holds at most one interval timer. Dropping the controller cancels it.
pub struct VelocityController<R: RandomSource = FastRandSource> {
    scheduler: SchedulerHandle,
    velocity: f64,
    mode: VelocityMode,
    timer: Option<TimerId>,
    rng: R,
    period_ms: f64,
    max_delta: f64,
}

impl<R: RandomSource> VelocityController<R> {
    /// New controller in manual mode at [`DEFAULT_VELOCITY`], no timer running
    pub fn new(scheduler: SchedulerHandle, rng: R) -> Self {
        Self {
            scheduler,
            velocity: DEFAULT_VELOCITY,
            mode: VelocityMode::Manual,
            timer: None,
            rng,
            period_ms: AUTO_STEP_PERIOD_MS,
            max_delta: AUTO_MAX_DELTA,
        }
    }

    /// Override walk period and step bound
    pub fn with_walk(mut self, period_ms: f64, max_delta: f64) -> Self {
        self.period_ms = period_ms;
        self.max_delta = max_delta.abs();
        self
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn mode(&self) -> VelocityMode {
        self.mode
    }

    pub fn is_auto(&self) -> bool {
        self.mode == VelocityMode::Auto
    }

    /// Timer driving the auto-walk, if running
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Set velocity directly, clamped to the manual range. Stops auto mode.
    /// NaN leaves the velocity unchanged.
    pub fn set_manual(&mut self, value: f64) -> f64 {
        self.stop_timer();
        self.mode = VelocityMode::Manual;
        match clamp_manual(value) {
            Some(v) => self.velocity = v,
            None => warn!("Ignoring NaN velocity"),
        }
        debug!(velocity = self.velocity, "Manual velocity set");
        self.velocity
    }

    /// Start the auto-walk. A running walk is left as is.
    pub fn enable_auto(&mut self) {
        self.mode = VelocityMode::Auto;
        if self.timer.is_none() {
            self.timer = Some(self.scheduler.set_interval(self.period_ms));
            info!(velocity = self.velocity, period_ms = self.period_ms, "Auto velocity enabled");
        }
    }

    /// Stop the auto-walk, keeping the last velocity
    pub fn disable_auto(&mut self) {
        self.stop_timer();
        if self.mode == VelocityMode::Auto {
            info!(velocity = self.velocity, "Auto velocity disabled");
        }
        self.mode = VelocityMode::Manual;
    }

    /// Dispatch a fired timer. Ids other than the live walk timer are ignored.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.step();
        true
    }

    /// Apply one auto-walk step
    pub fn step(&mut self) -> f64 {
        let prev = self.velocity;
        self.velocity = walk_step(prev, self.rng.next_unit(), self.max_delta);
        debug!(prev, velocity = self.velocity, "Auto velocity step");
        self.velocity
    }

    fn stop_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.try_cancel(id);
        }
    }
}

impl<R: RandomSource> Drop for VelocityController<R> {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
