//! Origin transform from shape-local coordinates into machine coordinates.

use toolforge_core::{
    ElementShape, GeometrySpec, MachiningSettings, OriginPolicy, Point3, Workpiece,
};

/// Everything the origin transform needs besides the point itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OriginContext<'a> {
    /// Half extent of the active geometry along X
    pub half_x: f64,
    /// Half extent of the active geometry along Y
    pub half_y: f64,
    pub workpiece: Option<&'a Workpiece>,
    /// User supplied origin for the `custom` policy
    pub custom: Point3,
}

impl<'a> OriginContext<'a> {
    /// Builds the context for one generation call.
    pub fn new(
        geometry: &GeometrySpec,
        settings: &MachiningSettings,
        workpiece: Option<&'a Workpiece>,
    ) -> Self {
        let (half_x, half_y) = half_extents(geometry);
        Self {
            half_x,
            half_y,
            workpiece,
            custom: Point3::new(settings.origin_x, settings.origin_y, settings.origin_z),
        }
    }
}

/// Half extents used by the corner policies. Solids, lines and text have none.
pub fn half_extents(geometry: &GeometrySpec) -> (f64, f64) {
    match geometry {
        GeometrySpec::Rectangle { width, height } => (width / 2.0, height / 2.0),
        GeometrySpec::Circle { radius } | GeometrySpec::Polygon { radius, .. } => {
            (*radius, *radius)
        }
        GeometrySpec::Selected {
            element: Some(element),
        } => match &element.shape {
            ElementShape::Rectangle { width, height } => (width / 2.0, height / 2.0),
            ElementShape::Circle { radius } | ElementShape::Polygon { radius, .. } => {
                (*radius, *radius)
            }
            _ => (0.0, 0.0),
        },
        _ => (0.0, 0.0),
    }
}

/// Maps a shape-local point to machine coordinates under `policy`.
///
/// `workpiece-corner2` forces Z to half the workpiece depth whatever the
/// input Z is; callers relying on per-level Z see every level collapse onto
/// that plane.
pub fn apply_origin_offset(
    x: f64,
    y: f64,
    z: f64,
    policy: OriginPolicy,
    ctx: &OriginContext<'_>,
) -> Point3 {
    match policy {
        OriginPolicy::WorkpieceCenter | OriginPolicy::Unknown => Point3::new(x, y, z),
        OriginPolicy::WorkpieceCorner => Point3::new(x + ctx.half_x, y + ctx.half_y, z),
        OriginPolicy::WorkpieceCorner2 => {
            let forced_z = ctx.workpiece.map_or(0.0, |w| w.depth / 2.0);
            Point3::new(x + ctx.half_x, y + ctx.half_y, forced_z)
        }
        OriginPolicy::MachineZero => match ctx.workpiece {
            Some(w) => Point3::new(x + w.width, y + w.depth, z + w.height),
            None => Point3::new(x, y, z),
        },
        OriginPolicy::Custom => Point3::new(
            x + ctx.custom.x,
            y + ctx.custom.y,
            z + ctx.custom.z,
        ),
    }
}

/// Binds a policy to its context so builders can transform points with one call.
#[derive(Debug, Clone, Copy)]
pub struct OriginTransform<'a> {
    pub policy: OriginPolicy,
    pub context: OriginContext<'a>,
}

impl<'a> OriginTransform<'a> {
    /// Create a transform applying `policy` within `context`
    pub fn new(policy: OriginPolicy, context: OriginContext<'a>) -> Self {
        Self { policy, context }
    }

    /// Transform that leaves every point where it is.
    pub fn identity() -> Self {
        Self::new(OriginPolicy::WorkpieceCenter, OriginContext::default())
    }

    pub fn apply(&self, x: f64, y: f64, z: f64) -> Point3 {
        apply_origin_offset(x, y, z, self.policy, &self.context)
    }
}
