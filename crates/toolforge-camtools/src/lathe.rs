//! Lathe program assembler.
//!
//! Works in the XZ plane with X words as radii. Every strategy is a fixed
//! multi-pass loop over the stock dimensions using literal constants; none
//! of them derive anything from the insert geometry.

use crate::depth::depth_levels;
use crate::shapes::placeholder;
use crate::toolpath::{Move, MotionSegment, Program};
use toolforge_core::units::{format_coord, format_whole};
use toolforge_core::{MachiningSettings, OperationType, SpindleDirection, TurningMode};
use tracing::debug;

/// Radial clearance for rapids outside the stock.
pub const RADIAL_CLEARANCE: f64 = 2.0;
/// Axial clearance in front of the stock face.
pub const FACE_CLEARANCE: f64 = 2.0;
/// Starting bore as a fraction of the stock diameter.
pub const BORE_START_RATIO: f64 = 0.3;
/// Thread pitch (mm).
pub const THREAD_PITCH: f64 = 1.5;
/// Thread depth as a fraction of the pitch.
pub const THREAD_DEPTH_RATIO: f64 = 0.6134;
/// Chip-break retract while parting (mm).
pub const PARTING_CHIP_BREAK: f64 = 0.5;
/// Knurl depth (mm), reached in two infeeds.
pub const KNURL_DEPTH: f64 = 0.5;

/// Lathe operation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatheStrategy {
    Facing,
    Turning,
    Boring,
    Threading,
    Grooving,
    Parting,
    Knurling,
}

impl LatheStrategy {
    /// Dispatch table for lathe operations. Internal turning uses the boring model.
    pub fn for_operation(operation: OperationType, mode: TurningMode) -> Option<Self> {
        match (operation, mode) {
            (OperationType::Facing, _) => Some(Self::Facing),
            (OperationType::Turning, TurningMode::External) => Some(Self::Turning),
            (OperationType::Turning, TurningMode::Internal) => Some(Self::Boring),
            (OperationType::Boring, _) => Some(Self::Boring),
            (OperationType::Threading, _) => Some(Self::Threading),
            (OperationType::Grooving, _) => Some(Self::Grooving),
            (OperationType::Parting, _) => Some(Self::Parting),
            (OperationType::Knurling, _) => Some(Self::Knurling),
            _ => None,
        }
    }
}

/// Assembles complete lathe programs.
pub struct LatheAssembler<'a> {
    settings: &'a MachiningSettings,
}

impl<'a> LatheAssembler<'a> {
    /// Create a new lathe assembler for the given settings
    pub fn new(settings: &'a MachiningSettings) -> Self {
        Self { settings }
    }

    fn stock_radius(&self) -> f64 {
        self.settings.lathe.stock_diameter / 2.0
    }

    fn stock_length(&self) -> f64 {
        self.settings.lathe.stock_length
    }

    fn rapid(&self, x: f64, z: f64) -> MotionSegment {
        MotionSegment::rapid(Move::xz(x, z))
    }

    fn cut(&self, target: Move) -> MotionSegment {
        MotionSegment::linear(target.with_feed(self.settings.feedrate))
    }

    pub fn assemble(&self) -> Program {
        let s = self.settings;
        let lathe = &s.lathe;
        let mut program = Program::new();

        program.add_header(format!("Machine: lathe, operation: {}", s.operation_type));
        program.add_header(format!("Material: {}", s.material));
        program.add_header(format!(
            "Stock: D{} x {} mm, {} turning",
            format_coord(lathe.stock_diameter),
            format_coord(lathe.stock_length),
            lathe.turning_mode
        ));
        program.add_header(format!(
            "Depth: {} mm in {} mm steps",
            format_coord(s.cut_depth),
            format_coord(s.stepdown)
        ));

        self.setup(&mut program);

        let strategy = LatheStrategy::for_operation(s.operation_type, lathe.turning_mode);
        let body = match strategy {
            Some(_) if self.stock_radius() <= 0.0 || self.stock_length() <= 0.0 => {
                placeholder("Stock dimensions must be positive, nothing to turn")
            }
            Some(strategy) => {
                debug!("Lathe strategy {:?}", strategy);
                match strategy {
                    LatheStrategy::Facing => self.facing(),
                    LatheStrategy::Turning => self.turning(),
                    LatheStrategy::Boring => self.boring(),
                    LatheStrategy::Threading => self.threading(),
                    LatheStrategy::Grooving => self.grooving(),
                    LatheStrategy::Parting => self.parting(),
                    LatheStrategy::Knurling => self.knurling(),
                }
            }
            None => placeholder(format!(
                "Operation {} is not available on the lathe",
                s.operation_type
            )),
        };
        program.extend(body);

        self.teardown(&mut program);
        program.add_footer("End of program");
        program
    }

    fn setup(&self, program: &mut Program) {
        let s = self.settings;
        program.push(MotionSegment::command("G90"));
        program.push(MotionSegment::command("G21"));
        program.push(MotionSegment::command("G18"));
        let spindle = match s.lathe.spindle_direction {
            SpindleDirection::Cw => "M3",
            SpindleDirection::Ccw => "M4",
        };
        program.push(MotionSegment::command(format!(
            "{} S{}",
            spindle,
            format_whole(s.spindle_speed)
        )));
        if s.coolant {
            program.push(MotionSegment::command("M8"));
        }
        if s.lathe.tool_compensation {
            let code = match s.lathe.turning_mode {
                TurningMode::External => "G42",
                TurningMode::Internal => "G41",
            };
            program.push(MotionSegment::command(code));
        }
    }

    fn teardown(&self, program: &mut Program) {
        let s = self.settings;
        if s.lathe.tool_compensation {
            program.push(MotionSegment::command("G40"));
        }
        program.push(self.rapid(self.stock_radius() + 5.0, 5.0));
        if s.coolant {
            program.push(MotionSegment::command("M9"));
        }
        program.push(MotionSegment::command("M5"));
        program.push(MotionSegment::command("M30"));
    }

    /// Radial depths of cut `S, 2S, ...` up to `depth`.
    fn infeeds(&self, depth: f64) -> Vec<f64> {
        depth_levels(depth, self.settings.stepdown)
            .into_iter()
            .map(|level| -level)
            .collect()
    }

    /// Face the front of the stock, one pass per depth level.
    fn facing(&self) -> Vec<MotionSegment> {
        let clear = self.stock_radius() + RADIAL_CLEARANCE;
        let mut moves = Vec::new();
        for z in depth_levels(self.settings.cut_depth, self.settings.stepdown) {
            moves.push(self.rapid(clear, z));
            moves.push(self.cut(Move::x(0.0)));
            moves.push(self.rapid(clear, z + FACE_CLEARANCE));
        }
        moves
    }

    fn turning(&self) -> Vec<MotionSegment> {
        let radius = self.stock_radius();
        let length = self.stock_length();
        let clear = radius + RADIAL_CLEARANCE;
        let mut moves = Vec::new();
        for step in self.infeeds(self.settings.cut_depth) {
            let r = radius - step;
            if r <= 0.0 {
                break;
            }
            moves.push(self.rapid(r, FACE_CLEARANCE));
            moves.push(self.cut(Move::z(-length)));
            moves.push(MotionSegment::rapid(Move::x(clear)));
            moves.push(MotionSegment::rapid(Move::z(FACE_CLEARANCE)));
        }
        moves
    }

    /// Opens a pre-drilled hole outward. Passes that would reach the stock
    /// wall are skipped.
    fn boring(&self) -> Vec<MotionSegment> {
        let radius = self.stock_radius();
        let length = self.stock_length();
        let start = self.settings.lathe.stock_diameter * BORE_START_RATIO / 2.0;
        let mut moves = vec![MotionSegment::comment(format!(
            "Starting bore D{}",
            format_coord(start * 2.0)
        ))];
        for step in self.infeeds(self.settings.cut_depth) {
            let r = start + step;
            if r >= radius {
                debug!("Skipping bore pass at R{:.3}: reaches stock wall", r);
                continue;
            }
            moves.push(self.rapid(r, FACE_CLEARANCE));
            moves.push(self.cut(Move::z(-length)));
            moves.push(MotionSegment::rapid(Move::x(start)));
            moves.push(MotionSegment::rapid(Move::z(FACE_CLEARANCE)));
        }
        moves
    }

    fn threading(&self) -> Vec<MotionSegment> {
        let radius = self.stock_radius();
        let length = self.stock_length();
        let clear = radius + RADIAL_CLEARANCE;
        let thread_depth = THREAD_PITCH * THREAD_DEPTH_RATIO;
        let mut moves = vec![MotionSegment::comment(format!(
            "Thread pitch {} mm, depth {} mm",
            format_coord(THREAD_PITCH),
            format_coord(thread_depth)
        ))];
        for step in self.infeeds(thread_depth) {
            moves.push(self.rapid(clear, FACE_CLEARANCE));
            moves.push(MotionSegment::rapid(Move::x(radius - step)));
            moves.push(MotionSegment::command(format!(
                "G33 Z{} K{}",
                format_coord(-length),
                THREAD_PITCH
            )));
            moves.push(MotionSegment::rapid(Move::x(clear)));
            moves.push(MotionSegment::rapid(Move::z(FACE_CLEARANCE)));
        }
        moves
    }

    /// Radial groove at mid-length, pecking in by the stepdown.
    fn grooving(&self) -> Vec<MotionSegment> {
        let radius = self.stock_radius();
        let clear = radius + RADIAL_CLEARANCE;
        let z = -self.stock_length() / 2.0;
        let mut moves = vec![self.rapid(clear, z)];
        for step in self.infeeds(self.settings.cut_depth) {
            moves.push(self.cut(Move::x((radius - step).max(0.0))));
            moves.push(MotionSegment::rapid(Move::x(clear)));
        }
        moves
    }

    /// Part off at the stock length, pecking to the centre with chip-break retracts.
    fn parting(&self) -> Vec<MotionSegment> {
        let radius = self.stock_radius();
        let clear = radius + RADIAL_CLEARANCE;
        let mut moves = vec![self.rapid(clear, -self.stock_length())];
        let pecks = self.infeeds(radius);
        let count = pecks.len();
        for (i, step) in pecks.into_iter().enumerate() {
            let x = (radius - step).max(0.0);
            moves.push(self.cut(Move::x(x)));
            if i + 1 < count {
                moves.push(MotionSegment::rapid(Move::x(x + PARTING_CHIP_BREAK)));
            }
        }
        moves.push(MotionSegment::rapid(Move::x(clear)));
        moves
    }

    fn knurling(&self) -> Vec<MotionSegment> {
        let radius = self.stock_radius();
        let length = self.stock_length();
        let clear = radius + RADIAL_CLEARANCE;
        let feed = self.settings.feedrate / 2.0;
        let mut moves = Vec::new();
        for infeed in [KNURL_DEPTH / 2.0, KNURL_DEPTH] {
            moves.push(self.rapid(clear, 0.0));
            moves.push(MotionSegment::linear(
                Move::x(radius - infeed).with_feed(feed),
            ));
            moves.push(MotionSegment::linear(Move::z(-length).with_feed(feed)));
            moves.push(MotionSegment::rapid(Move::x(clear)));
            moves.push(MotionSegment::rapid(Move::z(0.0)));
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolforge_core::MachineType;

    fn lathe(operation: OperationType) -> MachiningSettings {
        MachiningSettings {
            operation_type: operation,
            cut_depth: 5.0,
            stepdown: 1.0,
            ..MachiningSettings::for_machine(MachineType::Lathe)
        }
    }

    fn strings(program: &Program) -> Vec<String> {
        program
            .segments
            .iter()
            .filter_map(|s| match s {
                MotionSegment::Command(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_facing_triplets() {
        let program = LatheAssembler::new(&lathe(OperationType::Facing)).assemble();
        let faces: Vec<_> = program
            .segments
            .iter()
            .filter(|s| matches!(s, MotionSegment::Linear(m) if m.x == Some(0.0)))
            .collect();
        assert_eq!(faces.len(), 5);
        assert!(program.position_established());
    }

    #[test]
    fn test_spindle_direction_and_compensation() {
        let mut settings = lathe(OperationType::Turning);
        settings.lathe.spindle_direction = SpindleDirection::Ccw;
        settings.lathe.tool_compensation = true;
        let commands = strings(&LatheAssembler::new(&settings).assemble());
        assert_eq!(&commands[..5], ["G90", "G21", "G18", "M4 S1200", "G42"]);
        assert_eq!(&commands[5..], ["G40", "M5", "M30"]);
    }

    #[test]
    fn test_internal_turning_bores() {
        assert_eq!(
            LatheStrategy::for_operation(OperationType::Turning, TurningMode::Internal),
            Some(LatheStrategy::Boring)
        );
        assert_eq!(
            LatheStrategy::for_operation(OperationType::Vase, TurningMode::External),
            None
        );
    }

    #[test]
    fn test_boring_skips_wall() {
        // stock D50: bore starts at R7.5, wall at R25
        let mut settings = lathe(OperationType::Boring);
        settings.cut_depth = 30.0;
        settings.stepdown = 5.0;
        let program = LatheAssembler::new(&settings).assemble();
        let passes = program
            .segments
            .iter()
            .filter(|s| matches!(s, MotionSegment::Linear(m) if m.z == Some(-100.0)))
            .count();
        // R12.5, R17.5 and R22.5 fit inside the stock
        assert_eq!(passes, 3);
    }

    #[test]
    fn test_threading_uses_g33() {
        let program = LatheAssembler::new(&lathe(OperationType::Threading)).assemble();
        let commands = strings(&program);
        assert!(commands.iter().any(|c| c == "G33 Z-100.000 K1.5"));
    }

    #[test]
    fn test_parting_reaches_centre() {
        let mut settings = lathe(OperationType::Parting);
        settings.stepdown = 5.0;
        let program = LatheAssembler::new(&settings).assemble();
        let cuts: Vec<f64> = program
            .segments
            .iter()
            .filter_map(|s| match s {
                MotionSegment::Linear(m) => m.x,
                _ => None,
            })
            .collect();
        assert_eq!(cuts, vec![20.0, 15.0, 10.0, 5.0, 0.0]);
    }

    #[test]
    fn test_knurling_half_feed() {
        let program = LatheAssembler::new(&lathe(OperationType::Knurling)).assemble();
        let feeds: Vec<f64> = program
            .segments
            .iter()
            .filter_map(|s| match s {
                MotionSegment::Linear(m) => m.feed,
                _ => None,
            })
            .collect();
        assert_eq!(feeds.len(), 4);
        assert!(feeds.iter().all(|f| *f == 75.0));
    }
}
