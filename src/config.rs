//! Headless simulator configuration: command-line flags with environment fallbacks

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::core::velocity::{MANUAL_MAX, MANUAL_MIN};

pub const DEFAULT_FPS: u32 = 60;
pub const MAX_FPS: u32 = 240;

#[derive(Parser, Clone, Debug, PartialEq)]
#[command(name = "flywheel-cli")]
#[command(version)]
#[command(about = "Headless index flywheel simulator", long_about = None)]
pub struct SimConfig {
    /// JSON asset catalog; built-in catalog when unset
    #[arg(long, env = "FLYWHEEL_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Auto-walk seed; OS entropy when unset
    #[arg(long, env = "FLYWHEEL_SEED")]
    pub seed: Option<u64>,

    /// Start in manual mode at this velocity
    #[arg(long = "velocity", env = "FLYWHEEL_VELOCITY", value_parser = parse_velocity)]
    pub manual_velocity: Option<f64>,

    /// Stop after this many seconds; run until Ctrl-C when unset
    #[arg(long = "duration-secs", env = "FLYWHEEL_DURATION_SECS", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Simulated frame rate
    #[arg(
        long,
        env = "FLYWHEEL_FPS",
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_FPS as i64)
    )]
    pub fps: u32,

    /// Print a JSON snapshot on each stats tick
    #[arg(long, env = "FLYWHEEL_DUMP")]
    pub dump: bool,
}

impl SimConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

fn parse_velocity(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(MANUAL_MIN..=MANUAL_MAX).contains(&v) {
        return Err(format!("velocity must be within {MANUAL_MIN}..={MANUAL_MAX}"));
    }
    Ok(v)
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.trim().parse().map_err(|_| format!("`{s}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("`{s}` is not a representable duration"))
}
