//! # Toolforge Core
//!
//! Core types and utilities for Toolforge.
//! Provides the machining data model shared by the toolpath kernel, the
//! settings layer and the command line front end:
//! - Machining settings with per-machine blocks (mill, lathe, printer)
//! - Geometry descriptions, including selected CAD element snapshots
//! - Points in absolute machine coordinates
//! - G-code number formatting

pub mod data;
pub mod error;
pub mod geometry;
pub mod settings;
pub mod units;

pub use data::{Point3, Workpiece};
pub use error::{Error, Result};
pub use geometry::{ElementShape, GeometrySpec, SelectedElement};
pub use settings::{
    CutDirection, FinishingStrategy, LatheSettings, MachineType, MachiningSettings, OffsetPolicy,
    OperationType, OriginPolicy, PrinterSettings, SpindleDirection, ToolType, TurningMode,
};
