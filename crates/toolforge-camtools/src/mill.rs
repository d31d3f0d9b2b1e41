//! Mill program assembler.
//!
//! Wraps the shape builder output with the setup block (absolute, metric,
//! XY plane, spindle, coolant, safe height), optional cutter compensation,
//! an optional finishing pass and the teardown block.

use crate::origin::OriginTransform;
use crate::shapes::{
    build_finishing_pass, build_geometry, placeholder, BuilderKind, Profile, ShapeContext,
};
use crate::toolpath::{Move, MotionSegment, Program};
use toolforge_core::units::{format_coord, format_whole};
use toolforge_core::{
    CutDirection, FinishingStrategy, GeometrySpec, MachiningSettings, OffsetPolicy, OperationType,
};
use tracing::debug;

/// How the mill body is produced for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MillStrategy {
    /// Closed boundary pass per level (contour, profile)
    Boundary,
    /// Stepped spiral per level
    Pocket,
    /// Peck drilling at the geometry centre
    Drill,
}

impl MillStrategy {
    /// Dispatch table for mill operations. `None` means unsupported.
    pub fn for_operation(operation: OperationType) -> Option<Self> {
        match operation {
            OperationType::Contour | OperationType::Profile => Some(Self::Boundary),
            OperationType::Pocket => Some(Self::Pocket),
            OperationType::Drill => Some(Self::Drill),
            _ => None,
        }
    }
}

/// Cutter compensation word for an offset policy and cut direction.
pub fn compensation_code(offset: OffsetPolicy, direction: CutDirection) -> Option<&'static str> {
    match (offset, direction) {
        (OffsetPolicy::Outside, CutDirection::Climb) => Some("G41"),
        (OffsetPolicy::Outside, CutDirection::Conventional) => Some("G42"),
        (OffsetPolicy::Inside, CutDirection::Climb) => Some("G42"),
        (OffsetPolicy::Inside, CutDirection::Conventional) => Some("G41"),
        (OffsetPolicy::Center, _) => None,
    }
}

/// Assembles complete mill programs.
pub struct MillAssembler<'a> {
    settings: &'a MachiningSettings,
}

impl<'a> MillAssembler<'a> {
    /// Create a new assembler for the given settings
    pub fn new(settings: &'a MachiningSettings) -> Self {
        Self { settings }
    }

    /// Build the complete program: setup, body, finishing pass and teardown.
    pub fn assemble(&self, geometry: &GeometrySpec, transform: OriginTransform<'_>) -> Program {
        let s = self.settings;
        let compensation = self.compensation();
        let ctx = ShapeContext::new(s, transform).with_compensation(compensation.is_some());
        let mut program = Program::new();

        program.add_header(format!("Machine: mill, operation: {}", s.operation_type));
        program.add_header(format!("Geometry: {}", geometry.kind()));
        program.add_header(format!("Material: {}", s.material));
        program.add_header(format!(
            "Tool: {} D{} mm, {} flutes",
            s.tool_type,
            format_coord(s.tool_diameter),
            s.flute_count
        ));
        program.add_header(format!(
            "Depth: {} mm in {} mm steps, offset {}, {} cut",
            format_coord(s.cut_depth),
            format_coord(s.stepdown),
            s.offset,
            s.direction
        ));
        program.add_header(format!("Origin: {}", s.origin));

        self.setup(&mut program);

        match MillStrategy::for_operation(s.operation_type) {
            Some(strategy) => {
                debug!("Mill strategy {:?} for {}", strategy, geometry.kind());
                if let Some(code) = compensation {
                    program.push(MotionSegment::command(code));
                }
                program.extend(build_geometry(geometry, &ctx));
                // the finishing re-cut shares the compensated boundary
                if s.finishing_pass {
                    program.extend(self.finishing(geometry, &ctx));
                }
                if compensation.is_some() {
                    program.push(MotionSegment::command("G40"));
                }
            }
            None => {
                program.extend(placeholder(format!(
                    "Operation {} is not available on the mill",
                    s.operation_type
                )));
            }
        }

        self.teardown(&mut program);
        program.add_footer("End of program");
        program
    }

    fn setup(&self, program: &mut Program) {
        let s = self.settings;
        program.push(MotionSegment::command("G90"));
        program.push(MotionSegment::command("G21"));
        program.push(MotionSegment::command("G17"));
        program.push(MotionSegment::command(format!(
            "M3 S{}",
            format_whole(s.spindle_speed)
        )));
        if s.coolant {
            program.push(MotionSegment::command("M8"));
        }
        program.push(MotionSegment::rapid(Move::z(s.safe_height)));
    }

    fn teardown(&self, program: &mut Program) {
        let s = self.settings;
        program.push(MotionSegment::rapid(Move::z(s.safe_height)));
        if s.coolant {
            program.push(MotionSegment::command("M9"));
        }
        program.push(MotionSegment::command("M5"));
        program.push(MotionSegment::command("M30"));
    }

    /// Compensation word when enabled for a boundary operation.
    fn compensation(&self) -> Option<&'static str> {
        let s = self.settings;
        let boundary =
            MillStrategy::for_operation(s.operation_type) == Some(MillStrategy::Boundary);
        if s.tool_compensation && boundary {
            compensation_code(s.offset, s.direction)
        } else {
            None
        }
    }

    fn finishing(&self, geometry: &GeometrySpec, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
        let s = self.settings;
        let mut moves = vec![MotionSegment::comment(format!(
            "Finishing pass: {} strategy, {} mm allowance",
            s.finishing_strategy,
            format_coord(s.finishing_allowance)
        ))];
        if s.finishing_strategy == FinishingStrategy::Contour
            && BuilderKind::for_geometry(geometry) == BuilderKind::Profile
        {
            if let Some(profile) = Profile::from_geometry(geometry) {
                moves.extend(build_finishing_pass(&profile, ctx));
            }
        }
        moves
    }
}
