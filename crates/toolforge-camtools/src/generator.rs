//! Toolpath generator: the single entry point of the kernel.
//!
//! `build_program` dispatches on machine type to an assembler, then runs
//! the enabled post-processing passes. `generate` renders the result and
//! turns any internal panic into one generic failure.

use crate::arc_fitter::ArcFitter;
use crate::emitter::GcodeEmitter;
use crate::error::{CamToolError, CamToolResult};
use crate::lathe::LatheAssembler;
use crate::mill::MillAssembler;
use crate::optimizer::MoveOptimizer;
use crate::origin::{OriginContext, OriginTransform};
use crate::printer::PrinterAssembler;
use crate::toolpath::{MotionSegment, Program};
use std::panic;
use toolforge_core::{GeometrySpec, MachineType, MachiningSettings, Workpiece};
use tracing::{info, warn};

/// Message carried by the generic generation failure.
pub const GENERATION_FAILED: &str = "check settings";

/// Turns machining settings and geometry into G-code.
///
/// Settings are read-only for the lifetime of the generator; every call
/// builds a fresh program.
#[derive(Debug, Clone)]
pub struct ToolpathGenerator {
    settings: MachiningSettings,
}

impl ToolpathGenerator {
    /// Create a new generator for the given settings
    pub fn new(settings: MachiningSettings) -> Self {
        Self { settings }
    }

    /// Settings this generator was created with
    pub fn settings(&self) -> &MachiningSettings {
        &self.settings
    }

    /// Builds the structured program, post-processing included.
    ///
    /// This is unguarded; callers outside the kernel should go through
    /// [`ToolpathGenerator::program`] or [`ToolpathGenerator::generate`].
    pub fn build_program(&self, geometry: &GeometrySpec, workpiece: Option<&Workpiece>) -> Program {
        let s = &self.settings;
        let mut program = match s.machine_type {
            MachineType::Mill => {
                let context = OriginContext::new(geometry, s, workpiece);
                let transform = OriginTransform::new(s.origin, context);
                MillAssembler::new(s).assemble(geometry, transform)
            }
            MachineType::Lathe => LatheAssembler::new(s).assemble(),
            MachineType::Printer => PrinterAssembler::new(s).assemble(geometry),
        };

        if s.optimize_moves {
            program.segments = MoveOptimizer::new(s.tolerance).optimize(&program.segments);
        }
        if s.arc_fitting {
            program.segments = ArcFitter::new(s.tolerance).fit(&program.segments);
        }
        program
    }

    /// Builds the structured program behind the same failure boundary as
    /// [`ToolpathGenerator::generate`].
    ///
    /// Custom geometry becomes one raw command per non-empty line.
    pub fn program(
        &self,
        geometry: &GeometrySpec,
        workpiece: Option<&Workpiece>,
    ) -> CamToolResult<Program> {
        if let GeometrySpec::Custom { gcode } = geometry {
            let mut program = Program::new();
            for line in gcode.lines().filter(|line| !line.trim().is_empty()) {
                program.push(MotionSegment::command(line));
            }
            return Ok(program);
        }
        self.guarded(|| self.build_program(geometry, workpiece))
    }

    /// Generates the program text.
    ///
    /// Custom geometry is returned verbatim. Any panic inside generation
    /// discards the partial result and becomes
    /// [`CamToolError::GenerationFailed`].
    pub fn generate(
        &self,
        geometry: &GeometrySpec,
        workpiece: Option<&Workpiece>,
    ) -> CamToolResult<String> {
        if let GeometrySpec::Custom { gcode } = geometry {
            info!("Passing through {} bytes of custom G-code", gcode.len());
            return Ok(gcode.clone());
        }

        let (moves, text) = self.guarded(|| {
            let program = self.build_program(geometry, workpiece);
            let text = GcodeEmitter::with_line_numbers(self.settings.line_numbers).emit(&program);
            (program.move_count(), text)
        })?;
        info!("Generated {} moves, {} bytes", moves, text.len());
        Ok(text)
    }

    fn guarded<T>(&self, build: impl FnOnce() -> T) -> CamToolResult<T> {
        info!(
            "Generating {} {} program",
            self.settings.machine_type,
            self.settings.operation_type
        );
        panic::catch_unwind(panic::AssertUnwindSafe(build)).map_err(|_| {
            warn!("Panic during toolpath generation, discarding partial program");
            CamToolError::GenerationFailed(GENERATION_FAILED.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolforge_core::OperationType;

    #[test]
    fn test_custom_passthrough() {
        let generator = ToolpathGenerator::new(MachiningSettings::default());
        let gcode = "G0 X1\nG1 Y2\n".to_string();
        let custom = GeometrySpec::Custom {
            gcode: gcode.clone(),
        };
        let result = generator.generate(&custom, None).unwrap();
        assert_eq!(result, gcode);

        let program = generator.program(&custom, None).unwrap();
        assert_eq!(
            program.segments,
            vec![
                MotionSegment::command("G0 X1"),
                MotionSegment::command("G1 Y2")
            ]
        );
    }

    #[test]
    fn test_generate_mill_ends_with_program_end() {
        let generator = ToolpathGenerator::new(MachiningSettings::default());
        let text = generator.generate(&GeometrySpec::default(), None).unwrap();
        assert!(text.contains("\nM30\n"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_post_processing_is_applied() {
        let settings = MachiningSettings {
            optimize_moves: true,
            cut_depth: 2.0,
            ..MachiningSettings::default()
        };
        let plain = ToolpathGenerator::new(MachiningSettings {
            optimize_moves: false,
            ..settings.clone()
        })
        .build_program(&GeometrySpec::default(), None);
        let optimized =
            ToolpathGenerator::new(settings).build_program(&GeometrySpec::default(), None);
        // the second level's rapid to the loop start is already satisfied
        assert_eq!(plain.segments.len(), optimized.segments.len() + 1);
    }

    #[test]
    fn test_guarded_build_matches_unguarded() {
        let generator = ToolpathGenerator::new(MachiningSettings::default());
        let program = generator.program(&GeometrySpec::default(), None).unwrap();
        assert_eq!(program, generator.build_program(&GeometrySpec::default(), None));
    }

    #[test]
    fn test_panic_becomes_generation_failure() {
        let generator = ToolpathGenerator::new(MachiningSettings::default());
        let err = generator
            .guarded(|| -> Program { panic!("offset engine blew up") })
            .unwrap_err();
        assert_eq!(err.to_string(), "G-code generation failed: check settings");
    }

    #[test]
    fn test_unsupported_combination_is_not_an_error() {
        let settings = MachiningSettings {
            operation_type: OperationType::Vase,
            ..MachiningSettings::default()
        };
        let text = ToolpathGenerator::new(settings)
            .generate(&GeometrySpec::default(), None)
            .unwrap();
        assert!(text.contains("; Operation vase is not available on the mill"));
    }
}
