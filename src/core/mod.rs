//! Platform-agnostic core - shared between the browser dashboard and the CLI

pub mod catalog;
pub mod flywheel;
pub mod kinetics;
pub mod layout;
pub mod notify;
pub mod scheduler;
pub mod velocity;

pub use catalog::{Asset, AssetCatalog, AssetRole, CatalogEntry, CatalogError};
pub use flywheel::Flywheel;
pub use kinetics::{FlywheelEngine, FrameClock, GeometrySnapshot, KineticState, QuadCurve, TrailGeometry};
pub use layout::{FlywheelLayout, HitTarget, LabelSide, Point, SatelliteSlot};
pub use notify::{Notification, NotificationQueue, Severity};
pub use scheduler::{Fired, SchedulerHandle, TimerId};
pub use velocity::{FastRandSource, RandomSource, VelocityController, VelocityMode};
