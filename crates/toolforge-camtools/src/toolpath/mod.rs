//! Structured program representation.
//!
//! Builders produce `MotionSegment` sequences, assemblers wrap them into a
//! `Program`, post-processing passes rewrite the segments and the emitter
//! renders text only at the very end.

mod segment;

use serde::{Deserialize, Serialize};
use toolforge_core::{CutDirection, Point3};

pub use segment::{ArcDirection, Move, MotionSegment};

/// A complete program: header comments, ordered segments, footer comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub header: Vec<String>,
    pub segments: Vec<MotionSegment>,
    pub footer: Vec<String>,
}

impl Program {
    /// Creates a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header comment line.
    pub fn add_header(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    /// Adds a footer comment line.
    pub fn add_footer(&mut self, line: impl Into<String>) {
        self.footer.push(line.into());
    }

    /// Adds a segment to the program.
    pub fn push(&mut self, segment: MotionSegment) {
        self.segments.push(segment);
    }

    /// Appends a builder's output.
    pub fn extend(&mut self, segments: impl IntoIterator<Item = MotionSegment>) {
        self.segments.extend(segments);
    }

    /// Number of motion segments (rapids, linear and arc moves).
    pub fn move_count(&self) -> usize {
        self.segments.iter().filter(|s| s.target().is_some()).count()
    }

    /// Checks that no cut runs before a rapid or an earlier cut has fixed
    /// the current position.
    pub fn position_established(&self) -> bool {
        let mut positioned = false;
        for segment in &self.segments {
            match segment {
                MotionSegment::Rapid(m) if m.has_axes() => positioned = true,
                MotionSegment::Linear(_) | MotionSegment::Arc { .. } => {
                    if !positioned {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Resolved end positions of every motion segment, carrying unspecified
    /// axes forward from the previous position (starting at the origin).
    pub fn positions(&self) -> Vec<Point3> {
        let mut current = Point3::default();
        self.segments
            .iter()
            .filter_map(|segment| segment.target())
            .map(|target| {
                current = Point3::new(
                    target.x.unwrap_or(current.x),
                    target.y.unwrap_or(current.y),
                    target.z.unwrap_or(current.z),
                );
                current
            })
            .collect()
    }
}

/// Orders a closed vertex loop for the requested cut direction.
///
/// Vertices are produced counter-clockwise; climb keeps that order and
/// conventional reverses it.
pub fn order_for_direction<T>(mut vertices: Vec<T>, direction: CutDirection) -> Vec<T> {
    if direction == CutDirection::Conventional {
        vertices.reverse();
    }
    vertices
}
