//! Per-shape toolpath builders for the mill.
//!
//! Every builder returns its own `MotionSegment` sequence; the mill
//! assembler concatenates them. Points are produced in shape-local
//! coordinates and pass through the origin transform one at a time.
//! Degenerate geometry yields a comment line, never an error.

mod profile;
mod solid;

use crate::depth::depth_levels;
use crate::origin::OriginTransform;
use crate::toolpath::{order_for_direction, ArcDirection, Move, MotionSegment};
use toolforge_core::{
    ElementShape, GeometrySpec, MachiningSettings, OffsetPolicy, OperationType, Point3,
};
use tracing::warn;

pub use profile::{
    build_drill, build_finishing_pass, build_line, build_profile, spiral_steps, Profile,
    ProfileShape,
};
pub use solid::{build_solid, offset_outline};

/// Height above a slice at which solid slices start their plunge.
pub const SLICE_APPROACH: f64 = 5.0;

/// Shared inputs of every builder for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    pub settings: &'a MachiningSettings,
    pub transform: OriginTransform<'a>,
    /// True while a G41/G42 word is active around the builder output
    pub compensated: bool,
}

impl<'a> ShapeContext<'a> {
    /// Create a context with no controller-side compensation active.
    pub fn new(settings: &'a MachiningSettings, transform: OriginTransform<'a>) -> Self {
        Self {
            settings,
            transform,
            compensated: false,
        }
    }

    /// Marks whether the controller applies cutter compensation to the
    /// builder output.
    pub fn with_compensation(mut self, compensated: bool) -> Self {
        self.compensated = compensated;
        self
    }

    /// Offset policy the builders apply. Only under an active G41/G42 is the
    /// programmed boundary cut as is.
    pub fn offset_policy(&self) -> OffsetPolicy {
        if self.compensated {
            OffsetPolicy::Center
        } else {
            self.settings.offset
        }
    }

    pub fn point(&self, x: f64, y: f64, z: f64) -> Point3 {
        self.transform.apply(x, y, z)
    }

    /// Z levels for the configured depth and stepdown.
    pub fn levels(&self) -> Vec<f64> {
        depth_levels(self.settings.cut_depth, self.settings.stepdown)
    }

    fn feed(&self, target: Move) -> Move {
        target.with_feed(self.settings.feedrate)
    }

    fn plunge(&self, x: f64, y: f64, z: f64) -> MotionSegment {
        let target = self.point(x, y, z);
        MotionSegment::linear(Move::z(target.z).with_feed(self.settings.plunge_rate))
    }

    /// Rapid to the loop start at the current height, then plunge.
    fn contour_entry(&self, start: (f64, f64), z: f64) -> Vec<MotionSegment> {
        let approach = self.point(start.0, start.1, z);
        vec![
            MotionSegment::rapid(Move::to_xy(approach)),
            self.plunge(start.0, start.1, z),
        ]
    }

    /// Rapid to a point above the slice, then plunge onto it.
    fn slice_entry(&self, start: (f64, f64), z: f64) -> Vec<MotionSegment> {
        let approach = self.point(start.0, start.1, z + SLICE_APPROACH);
        vec![
            MotionSegment::rapid(Move::to(approach)),
            self.plunge(start.0, start.1, z),
        ]
    }

    /// Cutting moves around a closed loop, starting and ending at its start point.
    fn cut_loop(&self, cut: &CutLoop, z: f64) -> Vec<MotionSegment> {
        match cut {
            CutLoop::Circle { cx, cy, radius } => {
                let end = self.point(cx + radius, *cy, z);
                vec![MotionSegment::arc(
                    ArcDirection::for_cut(self.settings.direction),
                    self.feed(Move::to_xy(end)),
                    -radius,
                    0.0,
                )]
            }
            CutLoop::Polygon(vertices) => {
                let mut moves: Vec<MotionSegment> = vertices
                    .iter()
                    .skip(1)
                    .map(|&(x, y)| {
                        MotionSegment::linear(self.feed(Move::to_xy(self.point(x, y, z))))
                    })
                    .collect();
                if let Some(&(x, y)) = vertices.first() {
                    moves.push(MotionSegment::linear(
                        self.feed(Move::to_xy(self.point(x, y, z))),
                    ));
                }
                moves
            }
        }
    }

    /// Closed-loop pass: entry to the start point then the loop itself.
    fn closed_pass(&self, cut: &CutLoop, z: f64, slice: bool) -> Vec<MotionSegment> {
        let start = cut.start();
        let mut moves = if slice {
            self.slice_entry(start, z)
        } else {
            self.contour_entry(start, z)
        };
        moves.extend(self.cut_loop(cut, z));
        moves
    }

    fn polygon_loop(&self, vertices: Vec<(f64, f64)>) -> CutLoop {
        CutLoop::Polygon(order_for_direction(vertices, self.settings.direction))
    }
}

/// One closed cutting loop in shape-local coordinates, already ordered for
/// the cut direction.
#[derive(Debug, Clone, PartialEq)]
enum CutLoop {
    Circle { cx: f64, cy: f64, radius: f64 },
    Polygon(Vec<(f64, f64)>),
}

impl CutLoop {
    fn start(&self) -> (f64, f64) {
        match self {
            CutLoop::Circle { cx, cy, radius } => (cx + radius, *cy),
            CutLoop::Polygon(vertices) => vertices.first().copied().unwrap_or((0.0, 0.0)),
        }
    }
}

/// Comment-only body for geometry that produces no cutting moves.
pub fn placeholder(reason: impl Into<String>) -> Vec<MotionSegment> {
    let reason = reason.into();
    warn!("No toolpath produced: {}", reason);
    vec![MotionSegment::comment(reason)]
}

/// Which builder handles a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    /// Closed 2D profile (rectangle, circle, polygon)
    Profile,
    Line,
    /// Sliced 3D solid
    Solid,
    /// Nothing to cut
    Placeholder,
}

impl BuilderKind {
    pub fn for_geometry(geometry: &GeometrySpec) -> Self {
        match geometry {
            GeometrySpec::Rectangle { .. }
            | GeometrySpec::Circle { .. }
            | GeometrySpec::Polygon { .. } => Self::Profile,
            GeometrySpec::Custom { .. } | GeometrySpec::Selected { element: None } => {
                Self::Placeholder
            }
            GeometrySpec::Selected {
                element: Some(element),
            } => match element.shape {
                ElementShape::Rectangle { .. }
                | ElementShape::Circle { .. }
                | ElementShape::Polygon { .. } => Self::Profile,
                ElementShape::Line { .. } => Self::Line,
                ElementShape::Cube { .. }
                | ElementShape::Sphere { .. }
                | ElementShape::Cylinder { .. }
                | ElementShape::Cone { .. }
                | ElementShape::Torus { .. }
                | ElementShape::Extrusion { .. } => Self::Solid,
                ElementShape::Text { .. } => Self::Placeholder,
            },
        }
    }
}

/// Builds the cutting body of a mill program for any geometry.
pub fn build_geometry(geometry: &GeometrySpec, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let operation = ctx.settings.operation_type;
    match (BuilderKind::for_geometry(geometry), geometry) {
        (BuilderKind::Profile, _) => match Profile::from_geometry(geometry) {
            Some(profile) if operation == OperationType::Drill => build_drill(&profile, ctx),
            Some(profile) => build_profile(&profile, ctx),
            None => placeholder(format!("{} has no closed profile", geometry.kind())),
        },
        (
            BuilderKind::Line,
            GeometrySpec::Selected {
                element: Some(element),
            },
        ) => match element.shape {
            ElementShape::Line { end } => build_line(element.position, end, ctx),
            _ => placeholder("line element without an end point"),
        },
        (
            BuilderKind::Solid,
            GeometrySpec::Selected {
                element: Some(element),
            },
        ) => build_solid(element, ctx),
        (_, GeometrySpec::Selected { element: None }) => {
            placeholder("No element selected, nothing to cut")
        }
        (_, GeometrySpec::Selected {
            element: Some(element),
        }) => placeholder(format!(
            "{} elements are not supported for toolpath generation",
            element.shape.kind()
        )),
        (_, other) => placeholder(format!("{} geometry has no toolpath", other.kind())),
    }
}
