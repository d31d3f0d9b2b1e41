//! Toolforge Settings Crate
//!
//! Handles job configuration files: loading, saving and validating the
//! settings, geometry and workpiece that drive one generation call.

pub mod config;
pub mod error;

pub use config::{default_path, JobConfig, JobFormat};
pub use error::{SettingsError, SettingsResult};
