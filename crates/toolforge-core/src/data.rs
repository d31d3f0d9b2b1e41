//! Data models for positions and the external workpiece
//!
//! This module provides:
//! - `Point3`, a point in absolute machine coordinates
//! - `Workpiece`, the stock description supplied by the caller

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in absolute machine coordinates (millimeters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Point3 {
    /// Create a point from its three coordinates
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance to another point ignoring Z
    pub fn distance_xy(&self, other: &Point3) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// External workpiece (stock) descriptor
///
/// Only the `machine-zero` and `workpiece-corner2` origin policies read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workpiece {
    /// Extent along X (mm)
    pub width: f64,
    /// Extent along Z (mm)
    pub height: f64,
    /// Extent along Y (mm)
    pub depth: f64,
    /// Stock material name
    pub material: String,
}

impl Default for Workpiece {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 20.0,
            depth: 200.0,
            material: "aluminum".to_string(),
        }
    }
}
