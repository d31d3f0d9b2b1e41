//! Closed 2D profile builders: contour, stepped-spiral pocket, line and peck drill.

use super::{placeholder, CutLoop, ShapeContext};
use crate::toolpath::{Move, MotionSegment};
use std::f64::consts::PI;
use toolforge_core::{
    CutDirection, ElementShape, GeometrySpec, OffsetPolicy, OperationType, Point3,
};
use tracing::debug;

/// Boundary shape of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileShape {
    Rectangle { half_width: f64, half_height: f64 },
    Circle { radius: f64 },
    /// Regular polygon, first vertex on +X
    Polygon { sides: u32, radius: f64 },
}

/// A closed profile centred on (`center_x`, `center_y`) in shape-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub center_x: f64,
    pub center_y: f64,
    pub shape: ProfileShape,
}

impl Profile {
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::centered(ProfileShape::Rectangle {
            half_width: width / 2.0,
            half_height: height / 2.0,
        })
    }

    pub fn circle(radius: f64) -> Self {
        Self::centered(ProfileShape::Circle { radius })
    }

    pub fn polygon(sides: u32, radius: f64) -> Self {
        Self::centered(ProfileShape::Polygon { sides, radius })
    }

    fn centered(shape: ProfileShape) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            shape,
        }
    }

    /// Moves the profile centre.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.center_x = x;
        self.center_y = y;
        self
    }

    /// Profile for primitive geometry or a selected 2D element.
    pub fn from_geometry(geometry: &GeometrySpec) -> Option<Self> {
        match geometry {
            GeometrySpec::Rectangle { width, height } => Some(Self::rectangle(*width, *height)),
            GeometrySpec::Circle { radius } => Some(Self::circle(*radius)),
            GeometrySpec::Polygon { sides, radius } => Some(Self::polygon(*sides, *radius)),
            GeometrySpec::Selected {
                element: Some(element),
            } => {
                let profile = match element.shape {
                    ElementShape::Rectangle { width, height } => Self::rectangle(width, height),
                    ElementShape::Circle { radius } => Self::circle(radius),
                    ElementShape::Polygon { sides, radius } => Self::polygon(sides, radius),
                    _ => return None,
                };
                Some(profile.at(element.position.x, element.position.y))
            }
            _ => None,
        }
    }

    /// Applies the tool offset. Returns `None` when the result is degenerate.
    ///
    /// Rectangles grow or shrink by the full tool diameter per axis, circles
    /// and polygons by the tool radius.
    pub fn offset(&self, policy: OffsetPolicy, tool_diameter: f64) -> Option<Self> {
        let delta = policy.radial_adjustment(tool_diameter);
        let shape = match self.shape {
            ProfileShape::Rectangle {
                half_width,
                half_height,
            } => ProfileShape::Rectangle {
                half_width: half_width + delta,
                half_height: half_height + delta,
            },
            ProfileShape::Circle { radius } => ProfileShape::Circle {
                radius: radius + delta,
            },
            ProfileShape::Polygon { sides, radius } => ProfileShape::Polygon {
                sides,
                radius: radius + delta,
            },
        };
        let result = Self { shape, ..*self };
        result.is_valid().then_some(result)
    }

    /// True when every dimension is positive and finite.
    pub fn is_valid(&self) -> bool {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        match self.shape {
            ProfileShape::Rectangle {
                half_width,
                half_height,
            } => positive(half_width) && positive(half_height),
            ProfileShape::Circle { radius } => positive(radius),
            ProfileShape::Polygon { sides, radius } => sides >= 3 && positive(radius),
        }
    }

    /// Larger half extent (rectangle) or radius (circle, polygon).
    pub fn extent(&self) -> f64 {
        match self.shape {
            ProfileShape::Rectangle {
                half_width,
                half_height,
            } => half_width.max(half_height),
            ProfileShape::Circle { radius } | ProfileShape::Polygon { radius, .. } => radius,
        }
    }

    /// Same profile scaled about its centre.
    pub fn scaled(&self, factor: f64) -> Self {
        let shape = match self.shape {
            ProfileShape::Rectangle {
                half_width,
                half_height,
            } => ProfileShape::Rectangle {
                half_width: half_width * factor,
                half_height: half_height * factor,
            },
            ProfileShape::Circle { radius } => ProfileShape::Circle {
                radius: radius * factor,
            },
            ProfileShape::Polygon { sides, radius } => ProfileShape::Polygon {
                sides,
                radius: radius * factor,
            },
        };
        Self { shape, ..*self }
    }

    /// Counter-clockwise vertices. Empty for circles.
    pub fn vertices(&self) -> Vec<(f64, f64)> {
        let (cx, cy) = (self.center_x, self.center_y);
        match self.shape {
            ProfileShape::Rectangle {
                half_width: hw,
                half_height: hh,
            } => vec![
                (cx - hw, cy - hh),
                (cx + hw, cy - hh),
                (cx + hw, cy + hh),
                (cx - hw, cy + hh),
            ],
            ProfileShape::Circle { .. } => Vec::new(),
            ProfileShape::Polygon { sides, radius } => (0..sides)
                .map(|k| {
                    let angle = 2.0 * PI * k as f64 / sides as f64;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect(),
        }
    }

    fn cut_loop(&self, ctx: &ShapeContext<'_>) -> CutLoop {
        match self.shape {
            ProfileShape::Circle { radius } => CutLoop::Circle {
                cx: self.center_x,
                cy: self.center_y,
                radius,
            },
            _ => ctx.polygon_loop(self.vertices()),
        }
    }

    fn name(&self) -> &'static str {
        match self.shape {
            ProfileShape::Rectangle { .. } => "rectangle",
            ProfileShape::Circle { .. } => "circle",
            ProfileShape::Polygon { .. } => "polygon",
        }
    }
}

/// Contour or pocket passes over every depth level.
pub fn build_profile(profile: &Profile, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let settings = ctx.settings;
    let policy = ctx.offset_policy();
    let Some(effective) = profile.offset(policy, settings.tool_diameter) else {
        return placeholder(format!(
            "{} skipped: effective size is not positive after {} offset",
            profile.name(),
            policy
        ));
    };

    let levels = ctx.levels();
    debug!(
        "Building {} {} over {} levels",
        profile.name(),
        settings.operation_type,
        levels.len()
    );

    let mut moves = Vec::new();
    for z in levels {
        if settings.operation_type == OperationType::Pocket {
            moves.extend(pocket_level(&effective, z, ctx));
        } else {
            moves.extend(ctx.closed_pass(&effective.cut_loop(ctx), z, false));
        }
    }
    moves
}

/// Finishing re-cut of the effective boundary at the final depth.
pub fn build_finishing_pass(profile: &Profile, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let policy = ctx.offset_policy();
    match profile.offset(policy, ctx.settings.tool_diameter) {
        Some(effective) if ctx.settings.cut_depth > 0.0 => {
            ctx.closed_pass(&effective.cut_loop(ctx), -ctx.settings.cut_depth, false)
        }
        _ => placeholder("finishing pass skipped: nothing to re-cut"),
    }
}

/// Most rings one pocket level may cut.
pub const MAX_SPIRAL_STEPS: usize = 10_000;

/// Ring count of the stepped spiral for a profile, capped at
/// [`MAX_SPIRAL_STEPS`].
pub fn spiral_steps(extent: f64, tool_diameter: f64, stepover: f64) -> usize {
    let step = tool_diameter * stepover / 100.0;
    if !step.is_finite() || step <= 0.0 {
        return 1;
    }
    let steps = (extent / step).ceil();
    if steps.is_nan() || steps < 1.0 {
        1
    } else if steps > MAX_SPIRAL_STEPS as f64 {
        MAX_SPIRAL_STEPS
    } else {
        steps as usize
    }
}

/// Stepped spiral from the centre out to the effective boundary, no retracts.
fn pocket_level(effective: &Profile, z: f64, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let settings = ctx.settings;
    let steps = spiral_steps(effective.extent(), settings.tool_diameter, settings.stepover);
    let mut moves = ctx.contour_entry((effective.center_x, effective.center_y), z);
    for i in 1..=steps {
        let ring = effective.scaled(i as f64 / steps as f64).cut_loop(ctx);
        let (x, y) = ring.start();
        moves.push(MotionSegment::linear(
            ctx.feed(Move::to_xy(ctx.point(x, y, z))),
        ));
        moves.extend(ctx.cut_loop(&ring, z));
    }
    moves
}

/// Straight cut between two points on every level. No tool offset.
pub fn build_line(start: Point3, end: Point3, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let (from, to) = match ctx.settings.direction {
        CutDirection::Climb => (start, end),
        CutDirection::Conventional => (end, start),
    };
    if from.distance_xy(&to) <= 0.0 {
        return placeholder("line skipped: zero length");
    }
    let mut moves = Vec::new();
    for z in ctx.levels() {
        moves.extend(ctx.contour_entry((from.x, from.y), z));
        moves.push(MotionSegment::linear(
            ctx.feed(Move::to_xy(ctx.point(to.x, to.y, z))),
        ));
    }
    moves
}

/// Peck drilling at the profile centre, one peck per level with a full
/// retract to the surface after each.
pub fn build_drill(profile: &Profile, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let (cx, cy) = (profile.center_x, profile.center_y);
    let surface = ctx.point(cx, cy, 0.0);
    let levels = ctx.levels();
    debug!("Peck drilling {} pecks at {}", levels.len(), surface);

    let mut moves = vec![
        MotionSegment::comment("Peck drilling cycle"),
        MotionSegment::rapid(Move::to_xy(surface)),
    ];
    for z in levels {
        moves.push(ctx.plunge(cx, cy, z));
        moves.push(MotionSegment::rapid(Move::z(surface.z)));
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginTransform;
    use crate::toolpath::ArcDirection;
    use toolforge_core::MachiningSettings;

    fn ctx(settings: &MachiningSettings) -> ShapeContext<'_> {
        ShapeContext::new(settings, OriginTransform::identity())
    }

    fn cut_points(moves: &[MotionSegment]) -> Vec<(f64, f64)> {
        moves
            .iter()
            .filter(|m| m.is_cut())
            .filter_map(|m| m.target())
            .filter_map(|t| Some((t.x?, t.y?)))
            .collect()
    }

    #[test]
    fn test_rectangle_offset_widths() {
        let base = Profile::rectangle(100.0, 50.0);
        let outside = base.offset(OffsetPolicy::Outside, 6.0).unwrap();
        let inside = base.offset(OffsetPolicy::Inside, 6.0).unwrap();
        match (outside.shape, inside.shape) {
            (
                ProfileShape::Rectangle { half_width: ow, .. },
                ProfileShape::Rectangle { half_width: iw, .. },
            ) => {
                // each edge moves by the tool radius, so edges sit one diameter apart
                assert!((ow - iw - 6.0).abs() < 1e-12);
                assert!((2.0 * ow - 106.0).abs() < 1e-12);
            }
            other => panic!("unexpected shapes {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_offset_is_comment() {
        let settings = MachiningSettings {
            offset: OffsetPolicy::Inside,
            tool_diameter: 10.0,
            ..MachiningSettings::default()
        };
        let moves = build_profile(&Profile::circle(4.0), &ctx(&settings));
        assert_eq!(moves.len(), 1);
        assert!(matches!(moves[0], MotionSegment::Comment(_)));
        assert!(Profile::polygon(2, 10.0).offset(OffsetPolicy::Center, 1.0).is_none());
    }

    #[test]
    fn test_contour_closes_loop() {
        let settings = MachiningSettings {
            cut_depth: 1.0,
            ..MachiningSettings::default()
        };
        let moves = build_profile(&Profile::rectangle(100.0, 50.0), &ctx(&settings));
        assert!(matches!(moves[0], MotionSegment::Rapid(_)));
        let cuts = cut_points(&moves);
        assert_eq!(cuts.len(), 4);
        assert_eq!(cuts[3], (-53.0, -28.0));
    }

    #[test]
    fn test_circle_arc_direction() {
        let mut settings = MachiningSettings {
            cut_depth: 1.0,
            offset: OffsetPolicy::Center,
            ..MachiningSettings::default()
        };
        let arc = |settings: &MachiningSettings| {
            build_profile(&Profile::circle(10.0), &ctx(settings))
                .into_iter()
                .find_map(|m| match m {
                    MotionSegment::Arc { direction, i, j, .. } => Some((direction, i, j)),
                    _ => None,
                })
        };
        assert_eq!(arc(&settings), Some((ArcDirection::CounterClockwise, -10.0, 0.0)));
        settings.direction = CutDirection::Conventional;
        assert_eq!(arc(&settings), Some((ArcDirection::Clockwise, -10.0, 0.0)));
    }

    #[test]
    fn test_pocket_spiral_rings() {
        let settings = MachiningSettings {
            operation_type: OperationType::Pocket,
            offset: OffsetPolicy::Center,
            cut_depth: 1.0,
            tool_diameter: 5.0,
            stepover: 40.0,
            ..MachiningSettings::default()
        };
        // extent 10, step 2 -> 5 rings of 5 cuts each
        assert_eq!(spiral_steps(10.0, 5.0, 40.0), 5);
        assert_eq!(spiral_steps(10.0, 5.0, 1e-12), MAX_SPIRAL_STEPS);
        let moves = build_profile(&Profile::rectangle(20.0, 20.0), &ctx(&settings));
        assert_eq!(cut_points(&moves).len(), 5 * 5);
        let rapids = moves
            .iter()
            .filter(|m| matches!(m, MotionSegment::Rapid(_)))
            .count();
        assert_eq!(rapids, 1);
    }

    #[test]
    fn test_line_conventional_swaps() {
        let settings = MachiningSettings {
            cut_depth: 1.0,
            direction: CutDirection::Conventional,
            ..MachiningSettings::default()
        };
        let moves = build_line(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            &ctx(&settings),
        );
        assert_eq!(moves[0], MotionSegment::rapid(Move::xy(10.0, 0.0)));
        assert_eq!(cut_points(&moves), vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_drill_pecks_retract() {
        let settings = MachiningSettings {
            operation_type: OperationType::Drill,
            cut_depth: 3.0,
            ..MachiningSettings::default()
        };
        let moves = build_drill(&Profile::circle(2.0).at(5.0, 5.0), &ctx(&settings));
        let retracts = moves
            .iter()
            .filter(|m| matches!(m, MotionSegment::Rapid(t) if t.z == Some(0.0)))
            .count();
        assert_eq!(retracts, 3);
    }
}
