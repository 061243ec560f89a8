//! Static flywheel layout
//!
//! Computed once per catalog. Satellites keep their angle relative to the
//! orbit group for the whole session; only the group rotates per frame.
//! Coordinates are scene units with the origin at the hub and y pointing down.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::{Add, Mul, Neg, Sub};

use serde::Serialize;

use super::catalog::AssetCatalog;

/// Scene edge length (square viewBox)
pub const SCENE_SIZE: f64 = 600.0;
/// Space kept free around the orbit for labels
pub const ORBIT_MARGIN: f64 = 80.0;
pub const ORBIT_RADIUS: f64 = SCENE_SIZE / 2.0 - ORBIT_MARGIN;
/// Driver sits inside the orbit, straight up
pub const DRIVER_RADIUS_RATIO: f64 = 0.9;
pub const DRIVER_ANGLE: f64 = -FRAC_PI_2;

pub const INDEX_RING_RADIUS: f64 = 55.0;
pub const INDEX_CORE_RADIUS: f64 = 45.0;
pub const DRIVER_GLOW_RADIUS: f64 = 30.0;
pub const DRIVER_CORE_RADIUS: f64 = 22.0;
pub const SATELLITE_HALO_RADIUS: f64 = 14.0;
pub const SATELLITE_CORE_RADIUS: f64 = 8.0;
pub const LABEL_OFFSET: f64 = 20.0;
pub const SATELLITE_HOVER_SCALE: f64 = 1.4;
pub const DRIVER_HOVER_SCALE: f64 = 1.1;

/// 2D point / vector in scene units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` along `angle` (radians)
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    /// Perpendicular `(-y, x)`
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    /// Rotate about the origin by `degrees` (clockwise on screen, y down)
    pub fn rotate_deg(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Which side of its node a satellite label is anchored on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    /// Text starts right of the node
    Right,
    /// Text ends left of the node, flipped 180° to stay upright
    Left,
}

impl LabelSide {
    /// Left strictly inside (90°, 270°), right otherwise
    pub fn for_degrees(degrees: f64) -> Self {
        if degrees > 90.0 && degrees < 270.0 {
            LabelSide::Left
        } else {
            LabelSide::Right
        }
    }

    /// Horizontal text offset from the node
    pub fn dx(self) -> f64 {
        match self {
            LabelSide::Right => LABEL_OFFSET,
            LabelSide::Left => -LABEL_OFFSET,
        }
    }

    /// Label rotation in degrees
    pub fn rotation_deg(self) -> f64 {
        match self {
            LabelSide::Right => 0.0,
            LabelSide::Left => 180.0,
        }
    }
}

/// One satellite's fixed place in the orbit group
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SatelliteSlot {
    /// Position in the catalog
    pub catalog_index: usize,
    pub ticker: String,
    /// Angle relative to the orbit group, radians
    pub angle: f64,
    /// Same angle in degrees, used for the label decision
    pub angle_deg: f64,
    /// Position relative to the hub, before orbit rotation
    pub position: Point,
    pub label: LabelSide,
}

/// What a pointer is over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "slot")]
pub enum HitTarget {
    Index,
    Driver,
    /// Index into [`FlywheelLayout::satellites`]
    Satellite(usize),
}

/// Angle of the `i`-th of `n` satellites, radians
pub fn satellite_angle(i: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    i as f64 * (TAU / n as f64)
}

/// Same angle in degrees, computed without a radian round trip so
/// quarter-turn boundaries land exactly on 90 and 270
pub fn satellite_angle_deg(i: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    i as f64 * 360.0 / n as f64
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlywheelLayout {
    pub radius: f64,
    pub driver_position: Point,
    pub satellites: Vec<SatelliteSlot>,
}

impl FlywheelLayout {
    pub fn new(catalog: &AssetCatalog) -> Self {
        Self::with_radius(catalog, ORBIT_RADIUS)
    }

    pub fn with_radius(catalog: &AssetCatalog, radius: f64) -> Self {
        let indices = catalog.satellite_indices();
        let n = indices.len();

        let satellites = indices
            .into_iter()
            .enumerate()
            .map(|(i, catalog_index)| {
                let angle = satellite_angle(i, n);
                let angle_deg = satellite_angle_deg(i, n);
                let ticker = catalog
                    .entry(catalog_index)
                    .map(|e| e.asset.ticker.clone())
                    .unwrap_or_default();
                SatelliteSlot {
                    catalog_index,
                    ticker,
                    angle,
                    angle_deg,
                    position: Point::polar(radius, angle),
                    label: LabelSide::for_degrees(angle_deg),
                }
            })
            .collect();

        Self {
            radius,
            driver_position: Point::polar(radius * DRIVER_RADIUS_RATIO, DRIVER_ANGLE),
            satellites,
        }
    }

    /// Satellite position after the orbit group is rotated
    pub fn satellite_world(&self, slot: usize, orbit_rotation_deg: f64) -> Option<Point> {
        self.satellites
            .get(slot)
            .map(|s| s.position.rotate_deg(orbit_rotation_deg))
    }

    /// Find what lies under `point`. Satellites are drawn on top of the
    /// driver, the driver on top of the hub.
    pub fn hit_test(&self, point: Point, orbit_rotation_deg: f64) -> Option<HitTarget> {
        let hit_satellite = self
            .satellites
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.position.rotate_deg(orbit_rotation_deg).distance(point)))
            .filter(|&(_, d)| d <= SATELLITE_HALO_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| HitTarget::Satellite(i));

        hit_satellite
            .or_else(|| {
                (self.driver_position.distance(point) <= DRIVER_GLOW_RADIUS)
                    .then_some(HitTarget::Driver)
            })
            .or_else(|| (point.length() <= INDEX_CORE_RADIUS).then_some(HitTarget::Index))
    }
}
