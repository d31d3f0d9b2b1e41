//! Machining settings
//!
//! `MachiningSettings` is the single record that drives generation. It is a
//! flat union of every machine's fields: only the subset relevant to the
//! active machine type is read, the rest stays at its default.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `Display`/`FromStr` over the same kebab-case names serde uses.
macro_rules! named_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Canonical (kebab-case) name of this value.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(Error::unknown($kind, s)),
                }
            }
        }
    };
}

/// Target machine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineType {
    /// 3-axis milling machine / router
    #[default]
    Mill,
    /// 2-axis turning lathe
    Lathe,
    /// FFF 3D printer
    Printer,
}

named_enum!(MachineType, "machine type", {
    Mill => "mill",
    Lathe => "lathe",
    Printer => "printer",
});

/// Operation to perform; the valid subset depends on the machine type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationType {
    #[default]
    Contour,
    Profile,
    Pocket,
    Drill,
    Facing,
    Turning,
    Boring,
    Threading,
    Grooving,
    Parting,
    Knurling,
    Standard,
    Vase,
    Support,
    Infill,
    Raft,
    Brim,
}

named_enum!(OperationType, "operation type", {
    Contour => "contour",
    Profile => "profile",
    Pocket => "pocket",
    Drill => "drill",
    Facing => "facing",
    Turning => "turning",
    Boring => "boring",
    Threading => "threading",
    Grooving => "grooving",
    Parting => "parting",
    Knurling => "knurling",
    Standard => "standard",
    Vase => "vase",
    Support => "support",
    Infill => "infill",
    Raft => "raft",
    Brim => "brim",
});

/// Cutting tool family (informational, written to the program header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    #[default]
    EndMill,
    BallNose,
    VBit,
    Drill,
    TurningInsert,
    Nozzle,
}

named_enum!(ToolType, "tool type", {
    EndMill => "end-mill",
    BallNose => "ball-nose",
    VBit => "v-bit",
    Drill => "drill",
    TurningInsert => "turning-insert",
    Nozzle => "nozzle",
});

/// Which side of the programmed boundary the tool runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetPolicy {
    Inside,
    #[default]
    Outside,
    Center,
}

named_enum!(OffsetPolicy, "offset policy", {
    Inside => "inside",
    Outside => "outside",
    Center => "center",
});

impl OffsetPolicy {
    /// Signed change applied to a radius or half extent for a tool of
    /// the given diameter.
    pub fn radial_adjustment(&self, tool_diameter: f64) -> f64 {
        match self {
            Self::Outside => tool_diameter / 2.0,
            Self::Inside => -tool_diameter / 2.0,
            Self::Center => 0.0,
        }
    }

    /// Policy seen from the other side of the wall (holes swap inside and outside).
    pub fn flipped(&self) -> Self {
        match self {
            Self::Outside => Self::Inside,
            Self::Inside => Self::Outside,
            Self::Center => Self::Center,
        }
    }
}

/// Cutting direction relative to spindle rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutDirection {
    #[default]
    Climb,
    Conventional,
}

named_enum!(CutDirection, "cut direction", {
    Climb => "climb",
    Conventional => "conventional",
});

/// Finishing pass strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishingStrategy {
    #[default]
    Contour,
    Parallel,
    Spiral,
    Radial,
}

named_enum!(FinishingStrategy, "finishing strategy", {
    Contour => "contour",
    Parallel => "parallel",
    Spiral => "spiral",
    Radial => "radial",
});

/// Where the program origin sits relative to the geometry
///
/// Serialized by name; names that match no policy load as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OriginPolicy {
    /// Geometry is already centred on (0, 0, 0)
    #[default]
    WorkpieceCenter,
    /// Bottom-left corner convention
    WorkpieceCorner,
    /// Top-left corner convention
    WorkpieceCorner2,
    /// Offset by the external workpiece dimensions
    MachineZero,
    /// Offset by the user supplied origin
    Custom,
    /// Anything else; treated as identity
    Unknown,
}

named_enum!(OriginPolicy, "origin policy", {
    WorkpieceCenter => "workpiece-center",
    WorkpieceCorner => "workpiece-corner",
    WorkpieceCorner2 => "workpiece-corner2",
    MachineZero => "machine-zero",
    Custom => "custom",
    Unknown => "unknown",
});

impl From<String> for OriginPolicy {
    fn from(name: String) -> Self {
        name.parse().unwrap_or(Self::Unknown)
    }
}

impl From<OriginPolicy> for String {
    fn from(policy: OriginPolicy) -> Self {
        policy.name().to_string()
    }
}

/// Lathe spindle rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpindleDirection {
    #[default]
    Cw,
    Ccw,
}

named_enum!(SpindleDirection, "spindle direction", {
    Cw => "cw",
    Ccw => "ccw",
});

/// Lathe turning side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurningMode {
    #[default]
    External,
    Internal,
}

named_enum!(TurningMode, "turning mode", {
    External => "external",
    Internal => "internal",
});

/// 3D printer block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    /// Nozzle diameter (mm)
    pub nozzle_diameter: f64,
    /// Filament diameter (mm)
    pub filament_diameter: f64,
    /// Layer height (mm)
    pub layer_height: f64,
    /// Extrusion line width (mm)
    pub extrusion_width: f64,
    /// Print speed (mm/s)
    pub print_speed: f64,
    /// Travel speed (mm/s)
    pub travel_speed: f64,
    /// Nozzle temperature (°C)
    pub nozzle_temp: f64,
    /// Bed temperature (°C)
    pub bed_temp: f64,
    /// Infill density (%)
    pub infill_density: f64,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            nozzle_diameter: 0.4,
            filament_diameter: 1.75,
            layer_height: 0.2,
            extrusion_width: 0.45,
            print_speed: 50.0,
            travel_speed: 150.0,
            nozzle_temp: 210.0,
            bed_temp: 60.0,
            infill_density: 20.0,
        }
    }
}

/// Lathe block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatheSettings {
    /// Stock diameter (mm)
    pub stock_diameter: f64,
    /// Stock length (mm)
    pub stock_length: f64,
    pub spindle_direction: SpindleDirection,
    pub turning_mode: TurningMode,
    /// Emit G41/G42 tool nose compensation
    pub tool_compensation: bool,
}

impl Default for LatheSettings {
    fn default() -> Self {
        Self {
            stock_diameter: 50.0,
            stock_length: 100.0,
            spindle_direction: SpindleDirection::Cw,
            turning_mode: TurningMode::External,
            tool_compensation: false,
        }
    }
}

/// The configuration record driving one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachiningSettings {
    pub machine_type: MachineType,
    pub operation_type: OperationType,
    /// Material category, written to the header
    pub material: String,
    pub tool_type: ToolType,
    /// Tool diameter (mm)
    pub tool_diameter: f64,
    pub flute_count: u32,
    /// Total depth of cut (mm, positive)
    pub cut_depth: f64,
    /// Depth per pass (mm)
    pub stepdown: f64,
    /// Lateral step between pocket rings (% of tool diameter)
    pub stepover: f64,
    /// Cutting feed (mm/min)
    pub feedrate: f64,
    /// Plunge feed (mm/min)
    pub plunge_rate: f64,
    /// Spindle speed (RPM)
    pub spindle_speed: f64,
    /// Geometric tolerance used by the post-processing passes (mm)
    pub tolerance: f64,
    pub offset: OffsetPolicy,
    pub direction: CutDirection,
    pub coolant: bool,
    /// Emit G41/G42 and let the controller apply the tool radius
    pub tool_compensation: bool,
    pub finishing_pass: bool,
    /// Stock left for the finishing pass (mm)
    pub finishing_allowance: f64,
    pub finishing_strategy: FinishingStrategy,
    pub origin: OriginPolicy,
    pub origin_x: f64,
    pub origin_y: f64,
    pub origin_z: f64,
    /// Clearance height for rapid moves (mm)
    pub safe_height: f64,
    /// Run redundant-move elimination on the program
    pub optimize_moves: bool,
    /// Run line-to-arc fitting on the program
    pub arc_fitting: bool,
    /// Prefix emitted lines with N-words
    pub line_numbers: bool,
    pub printer: PrinterSettings,
    pub lathe: LatheSettings,
}

impl Default for MachiningSettings {
    fn default() -> Self {
        Self {
            machine_type: MachineType::Mill,
            operation_type: OperationType::Contour,
            material: "aluminum".to_string(),
            tool_type: ToolType::EndMill,
            tool_diameter: 6.0,
            flute_count: 2,
            cut_depth: 5.0,
            stepdown: 1.0,
            stepover: 40.0,
            feedrate: 800.0,
            plunge_rate: 300.0,
            spindle_speed: 12000.0,
            tolerance: 0.01,
            offset: OffsetPolicy::Outside,
            direction: CutDirection::Climb,
            coolant: false,
            tool_compensation: false,
            finishing_pass: false,
            finishing_allowance: 0.2,
            finishing_strategy: FinishingStrategy::Contour,
            origin: OriginPolicy::WorkpieceCenter,
            origin_x: 0.0,
            origin_y: 0.0,
            origin_z: 0.0,
            safe_height: 5.0,
            optimize_moves: false,
            arc_fitting: false,
            line_numbers: false,
            printer: PrinterSettings::default(),
            lathe: LatheSettings::default(),
        }
    }
}

impl MachiningSettings {
    /// Defaults tuned for the given machine type
    pub fn for_machine(machine_type: MachineType) -> Self {
        let mut settings = Self {
            machine_type,
            ..Self::default()
        };
        match machine_type {
            MachineType::Mill => {}
            MachineType::Lathe => {
                settings.operation_type = OperationType::Facing;
                settings.tool_type = ToolType::TurningInsert;
                settings.spindle_speed = 1200.0;
                settings.feedrate = 150.0;
                settings.plunge_rate = 50.0;
            }
            MachineType::Printer => {
                settings.operation_type = OperationType::Standard;
                settings.tool_type = ToolType::Nozzle;
                settings.material = "pla".to_string();
                settings.tool_diameter = settings.printer.nozzle_diameter;
            }
        }
        settings
    }
}
