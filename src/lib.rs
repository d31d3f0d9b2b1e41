//! # Toolforge
//!
//! Toolpath and G-code synthesis for three machine families:
//! - 3-axis mills and routers (contours, pockets, peck drilling, sliced solids)
//! - 2-axis turning lathes (facing, turning, boring, threading, grooving,
//!   parting, knurling)
//! - FFF 3D printers (standard, vase, support, infill, raft, brim)
//!
//! ## Architecture
//!
//! Toolforge is organized as a workspace with multiple crates:
//!
//! 1. **toolforge-core** - Machining settings, geometry, points, number formatting
//! 2. **toolforge-camtools** - Toolpath builders, assemblers, post-processing, emitter
//! 3. **toolforge-settings** - Job files (JSON/TOML) and validation
//! 4. **toolforge** - Command line front end that ties the crates together

pub mod cli;

pub use toolforge_camtools::{
    CamToolError, CamToolResult, GcodeEmitter, MotionSegment, Program, ToolpathGenerator,
};
pub use toolforge_core::{
    ElementShape, GeometrySpec, MachineType, MachiningSettings, OperationType, Point3,
    SelectedElement, Workpiece,
};
pub use toolforge_settings::{JobConfig, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Version string shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so stdout stays clean for G-code
/// - RUST_LOG environment variable support, `info` by default
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(())
}
