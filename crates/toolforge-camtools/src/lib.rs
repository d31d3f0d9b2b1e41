//! # Toolforge CAM Tools
//!
//! Turns machining settings and a geometry description into a complete
//! G-code program for a 3-axis mill, a 2-axis lathe or an FFF printer.
//!
//! ## Pipeline
//!
//! - **Origin**: maps shape-local coordinates onto the chosen work origin
//! - **Depth**: stepdown levels and solid slice heights
//! - **Shapes**: per-shape mill builders (profiles, pockets, drilling, solids)
//! - **Assemblers**: mill, lathe and printer programs with setup and teardown
//! - **Post-processing**: redundant-move removal and line-to-arc fitting
//! - **Emitter**: renders the structured program to text
//!
//! [`ToolpathGenerator`] ties these together and is the only entry point
//! most callers need.

pub mod arc_fitter;
pub mod depth;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod lathe;
pub mod mill;
pub mod optimizer;
pub mod origin;
pub mod printer;
pub mod shapes;
pub mod toolpath;

// Re-export commonly used items
pub use arc_fitter::ArcFitter;
pub use depth::{depth_levels, level_count, slice_heights};
pub use emitter::GcodeEmitter;
pub use error::{CamToolError, CamToolResult};
pub use generator::ToolpathGenerator;
pub use lathe::{LatheAssembler, LatheStrategy};
pub use mill::{MillAssembler, MillStrategy};
pub use optimizer::{ModalState, MoveOptimizer};
pub use origin::{apply_origin_offset, OriginContext, OriginTransform};
pub use printer::{PrintStrategy, PrinterAssembler};
pub use toolpath::{ArcDirection, Move, MotionSegment, Program};
