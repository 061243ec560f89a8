//! Headless flywheel simulator
//!
//! Drives the flywheel engine from a tokio frame interval and logs what a
//! render surface would receive.
//!
//! Run with: cargo run --features cli --bin flywheel-cli -- --help

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;
    use flywheel_vis::config::SimConfig;
    use flywheel_vis::core::{AssetCatalog, FastRandSource, Flywheel, SchedulerHandle};
    use tokio::time::{Instant, MissedTickBehavior};
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,flywheel_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = SimConfig::parse();
    info!(?config, "Configuration loaded");

    let catalog = match &config.catalog {
        Some(path) => {
            let catalog = AssetCatalog::from_path(path)?;
            info!(path = %path.display(), assets = catalog.len(), "Catalog loaded");
            catalog
        }
        None => AssetCatalog::default(),
    };

    let rng = match config.seed {
        Some(seed) => FastRandSource::with_seed(seed),
        None => FastRandSource::from_entropy(),
    };

    let scheduler = SchedulerHandle::new();
    let mut flywheel = Flywheel::mount(scheduler.clone(), catalog, rng);
    if let Some(v) = config.manual_velocity {
        let applied = flywheel.set_manual_velocity(v);
        info!(requested = v, velocity = applied, "Manual velocity");
    }

    let start_time = Instant::now();
    let mut frame_interval = tokio::time::interval(config.frame_interval());
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats_interval = tokio::time::interval(std::time::Duration::from_secs(5));
    stats_interval.tick().await;
    let deadline = config.duration.map(|d| start_time + d);
    let mut frames_last_interval = 0u64;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(fps = config.fps, "Simulation running, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                let now_ms = start_time.elapsed().as_secs_f64() * 1000.0;
                let unhandled = flywheel.pump(now_ms);
                if !unhandled.is_empty() {
                    warn!(count = unhandled.len(), "Unhandled timers");
                }
                frames_last_interval += 1;
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    info!("Duration reached");
                    break;
                }
            }
            _ = stats_interval.tick() => {
                let snap = flywheel.snapshot();
                info!(
                    velocity = format!("{:.2}", snap.velocity),
                    mode = ?flywheel.mode(),
                    rotation = format!("{:.1}", snap.orbit_rotation_deg),
                    beam_width = format!("{:.2}", snap.beam_width),
                    halo = format!("{:.2}", snap.halo_opacity),
                    "fps" = format!("{:.1}", frames_last_interval as f64 / 5.0),
                    "stats"
                );
                if config.dump {
                    println!("{}", serde_json::to_string(snap)?);
                }
                frames_last_interval = 0;
            }
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    let frames = flywheel.frame_count();
    flywheel.unmount();
    let pending = scheduler.pending();
    if pending == 0 {
        info!(frames, "Stopped cleanly");
    } else {
        warn!(frames, pending, "Timers still pending after unmount");
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
