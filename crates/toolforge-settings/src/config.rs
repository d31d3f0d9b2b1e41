//! Job configuration
//!
//! A job file bundles everything one generation call needs: the machining
//! settings, the geometry and an optional workpiece. Files are JSON or TOML,
//! chosen by extension.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toolforge_core::{GeometrySpec, MachineType, MachiningSettings, Workpiece};
use tracing::debug;

/// Directory created under the platform config dir.
pub const APP_DIR_NAME: &str = "toolforge";

/// File name of the default job.
pub const DEFAULT_JOB_FILE: &str = "job.toml";

/// On-disk job formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFormat {
    Json,
    Toml,
}

impl JobFormat {
    /// Format for a path, by extension.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) => Err(SettingsError::UnsupportedFormat(ext.to_string())),
            None => Err(SettingsError::UnsupportedFormat(format!(
                "{} has no extension, use .json or .toml",
                path.display()
            ))),
        }
    }
}

/// Complete job description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub settings: MachiningSettings,
    pub geometry: GeometrySpec,
    /// External stock, read by the `machine-zero` and `workpiece-corner2` origins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workpiece: Option<Workpiece>,
}

impl JobConfig {
    /// Create new job with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Job with settings tuned for a machine type.
    pub fn for_machine(machine_type: MachineType) -> Self {
        Self {
            settings: MachiningSettings::for_machine(machine_type),
            ..Self::default()
        }
    }

    /// Load job from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = JobFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("cannot read {}: {}", path.display(), e))
        })?;

        let job: Self = match format {
            JobFormat::Json => serde_json::from_str(&content)?,
            JobFormat::Toml => toml::from_str(&content)?,
        };

        job.validate()?;
        debug!("Loaded {} job from {}", job.settings.machine_type, path.display());
        Ok(job)
    }

    /// Save job to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match JobFormat::from_path(path)? {
            JobFormat::Json => serde_json::to_string_pretty(self)?,
            JobFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("cannot write {}: {}", path.display(), e))
        })?;

        debug!("Saved job to {}", path.display());
        Ok(())
    }

    /// Validate job
    pub fn validate(&self) -> SettingsResult<()> {
        let s = &self.settings;
        positive("tool_diameter", s.tool_diameter)?;
        positive("stepdown", s.stepdown)?;
        positive("feedrate", s.feedrate)?;
        non_negative("cut_depth", s.cut_depth)?;
        non_negative("tolerance", s.tolerance)?;
        finite("safe_height", s.safe_height)?;

        if s.machine_type == MachineType::Printer {
            positive("printer.layer_height", s.printer.layer_height)?;
            positive("printer.filament_diameter", s.printer.filament_diameter)?;
            positive("printer.extrusion_width", s.printer.extrusion_width)?;
        }

        if let Some(workpiece) = &self.workpiece {
            non_negative("workpiece.width", workpiece.width)?;
            non_negative("workpiece.height", workpiece.height)?;
            non_negative("workpiece.depth", workpiece.depth)?;
        }
        Ok(())
    }
}

/// Default job location: `<config dir>/toolforge/job.toml`.
pub fn default_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_JOB_FILE))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}

fn finite(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, "must be a finite number"))
    }
}

fn positive(key: &str, value: f64) -> SettingsResult<()> {
    finite(key, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(key: &str, value: f64) -> SettingsResult<()> {
    finite(key, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("must be >= 0, got {}", value)))
    }
}
