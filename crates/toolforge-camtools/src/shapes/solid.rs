//! Solid slicers: horizontal slices from the top of a solid down to its base.

use super::{placeholder, CutLoop, Profile, ShapeContext};
use crate::depth::slice_heights;
use crate::toolpath::MotionSegment;
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use std::f64::consts::FRAC_PI_2;
use std::panic;
use toolforge_core::{ElementShape, SelectedElement};
use tracing::{debug, warn};

/// Vertices closer than this collapse into one before offsetting.
const VERTEX_TOLERANCE: f64 = 1e-6;

/// Upper bound on the segments replacing one offset corner arc.
const MAX_ARC_SEGMENTS: usize = 64;

/// Slices a selected solid element into closed cutting loops.
pub fn build_solid(element: &SelectedElement, ctx: &ShapeContext<'_>) -> Vec<MotionSegment> {
    let settings = ctx.settings;
    let policy = ctx.offset_policy();
    let delta = policy.radial_adjustment(settings.tool_diameter);
    let (px, py, pz) = (element.position.x, element.position.y, element.position.z);
    let stepdown = settings.stepdown;

    // (top, bottom) of the solid and the loops of one slice at height z
    let (top, bottom, slicer): (f64, f64, Box<dyn Fn(f64) -> Vec<CutLoop> + '_>) =
        match &element.shape {
            ElementShape::Cube {
                width,
                depth,
                height,
            } => {
                let outline = Profile::rectangle(*width, *depth)
                    .at(px, py)
                    .offset(policy, settings.tool_diameter);
                (
                    pz + height,
                    pz,
                    Box::new(move |_z| {
                        outline
                            .iter()
                            .map(|profile| ctx.polygon_loop(profile.vertices()))
                            .collect()
                    }),
                )
            }
            ElementShape::Sphere { radius } => {
                let r = *radius;
                (
                    pz + r,
                    pz - r,
                    Box::new(move |z| {
                        let dz = z - pz;
                        circle_loop(px, py, (r * r - dz * dz).max(0.0).sqrt(), delta)
                    }),
                )
            }
            ElementShape::Cylinder { radius, height } => {
                let r = *radius;
                (pz + height, pz, Box::new(move |_z| circle_loop(px, py, r, delta)))
            }
            ElementShape::Cone {
                radius,
                top_radius,
                height,
            } => {
                let (base_r, top_r, h) = (*radius, *top_radius, *height);
                (
                    pz + h,
                    pz,
                    Box::new(move |z| {
                        let t = if h > 0.0 { (z - pz) / h } else { 0.0 };
                        circle_loop(px, py, base_r + (top_r - base_r) * t, delta)
                    }),
                )
            }
            ElementShape::Torus {
                major_radius,
                minor_radius,
            } => {
                let (major, minor) = (*major_radius, *minor_radius);
                let inner_delta = policy.flipped().radial_adjustment(settings.tool_diameter);
                (
                    pz + minor,
                    pz - minor,
                    Box::new(move |z| {
                        let dz = z - pz;
                        let half = (minor * minor - dz * dz).max(0.0).sqrt();
                        if half <= 0.0 {
                            return Vec::new();
                        }
                        let mut loops = circle_loop(px, py, major + half, delta);
                        loops.extend(circle_loop(px, py, major - half, inner_delta));
                        loops
                    }),
                )
            }
            ElementShape::Extrusion { profile, height } => {
                let outline: Vec<(f64, f64)> =
                    profile.iter().map(|p| (px + p[0], py + p[1])).collect();
                if outline.len() < 3 {
                    return placeholder("extrusion skipped: profile needs at least 3 points");
                }
                let loops: Vec<CutLoop> = offset_outline(&outline, delta, settings.tolerance)
                    .into_iter()
                    .map(|vertices| ctx.polygon_loop(vertices))
                    .collect();
                (pz + height, pz, Box::new(move |_z| loops.clone()))
            }
            other => {
                return placeholder(format!("{} is not a solid", other.kind()));
            }
        };

    let heights = slice_heights(top, bottom, stepdown);
    let mut moves = Vec::new();
    let mut emitted = 0usize;
    for z in heights {
        for cut in slicer(z) {
            moves.extend(ctx.closed_pass(&cut, z, true));
            emitted += 1;
        }
    }
    debug!(
        "Sliced {} into {} loops between Z{:.3} and Z{:.3}",
        element.shape.kind(),
        emitted,
        top,
        bottom
    );

    if emitted == 0 {
        return placeholder(format!(
            "{} skipped: no slice has a positive size after offset",
            element.shape.kind()
        ));
    }
    moves
}

/// Circle loop of `raw + delta`, or nothing when either size is not positive.
fn circle_loop(cx: f64, cy: f64, raw: f64, delta: f64) -> Vec<CutLoop> {
    let radius = raw + delta;
    if raw > 0.0 && radius > 0.0 && radius.is_finite() {
        vec![CutLoop::Circle { cx, cy, radius }]
    } else {
        Vec::new()
    }
}

/// Offsets a closed outline by `delta` (positive grows it) and returns the
/// resulting loops as counter-clockwise vertex lists.
///
/// Corner arcs of the offset become tangent segments lying outside the arc,
/// at most `tolerance` away from it, so the tool never comes closer to the
/// outline than `|delta|`.
pub fn offset_outline(points: &[(f64, f64)], delta: f64, tolerance: f64) -> Vec<Vec<(f64, f64)>> {
    let polyline = prepare_outline(points);
    if polyline.vertex_count() < 3 {
        return Vec::new();
    }
    if delta == 0.0 {
        return vec![counter_clockwise(&polyline, tolerance)];
    }

    // Clockwise input: positive offsets grow the outline.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| polyline.parallel_offset(delta)));
    match result {
        Ok(offsets) => offsets
            .iter()
            .filter(|pline| pline.vertex_count() >= 3)
            .map(|pline| counter_clockwise(pline, tolerance))
            .collect(),
        Err(_) => {
            warn!("Panic during parallel offset of extrusion outline");
            Vec::new()
        }
    }
}

/// Builds a clockwise closed polyline without duplicate vertices.
fn prepare_outline(points: &[(f64, f64)]) -> Polyline<f64> {
    let mut clean: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &(x, y) in points {
        let duplicate = clean
            .last()
            .is_some_and(|&(lx, ly)| (lx - x).hypot(ly - y) < VERTEX_TOLERANCE);
        if !duplicate {
            clean.push((x, y));
        }
    }
    if clean.len() > 1 {
        if let (Some(&first), Some(&last)) = (clean.first(), clean.last()) {
            if (first.0 - last.0).hypot(first.1 - last.1) < VERTEX_TOLERANCE {
                clean.pop();
            }
        }
    }

    let signed_area: f64 = (0..clean.len())
        .map(|i| {
            let (x1, y1) = clean[i];
            let (x2, y2) = clean[(i + 1) % clean.len()];
            x1 * y2 - x2 * y1
        })
        .sum();
    if signed_area > 0.0 {
        clean.reverse();
    }

    let mut polyline = Polyline::new();
    for (x, y) in clean {
        polyline.add_vertex(PlineVertex::new(x, y, 0.0));
    }
    polyline.set_is_closed(true);
    polyline
}

fn counter_clockwise(polyline: &Polyline<f64>, tolerance: f64) -> Vec<(f64, f64)> {
    let vertices = &polyline.vertex_data;
    let mut points = Vec::with_capacity(vertices.len());
    for (index, v1) in vertices.iter().enumerate() {
        points.push((v1.x, v1.y));
        if v1.bulge.abs() > 1e-9 {
            let v2 = &vertices[(index + 1) % vertices.len()];
            points.extend(arc_corners(v1, v2, tolerance));
        }
    }
    points.reverse();
    points
}

/// Intermediate vertices of a polyline circumscribing the bulge arc from
/// `v1` to `v2`. Every segment is tangent to the arc.
fn arc_corners(v1: &PlineVertex<f64>, v2: &PlineVertex<f64>, tolerance: f64) -> Vec<(f64, f64)> {
    let (dx, dy) = (v2.x - v1.x, v2.y - v1.y);
    let chord = dx.hypot(dy);
    if chord < VERTEX_TOLERANCE {
        return Vec::new();
    }
    let sweep = 4.0 * v1.bulge.atan();
    let radius = (chord / (2.0 * (sweep / 2.0).sin())).abs();
    let dist_to_center = radius * (sweep.abs() / 2.0).cos();
    let sign = if v1.bulge > 0.0 { 1.0 } else { -1.0 };
    let cx = (v1.x + v2.x) / 2.0 - dy / chord * dist_to_center * sign;
    let cy = (v1.y + v2.y) / 2.0 + dx / chord * dist_to_center * sign;

    // largest step whose tangent corners stay within tolerance of the arc
    let max_step = if tolerance > 0.0 && tolerance.is_finite() {
        2.0 * (radius / (radius + tolerance)).acos()
    } else {
        0.0
    };
    // quarter turns at most, so the corner radius stays bounded
    let min_segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
    let segments = if max_step > 0.0 {
        ((sweep.abs() / max_step).ceil() as usize).clamp(min_segments, MAX_ARC_SEGMENTS)
    } else {
        MAX_ARC_SEGMENTS
    };
    let step = sweep / segments as f64;
    let corner_radius = radius / (step / 2.0).cos();
    let start = (v1.y - cy).atan2(v1.x - cx);
    (0..segments)
        .map(|k| {
            let angle = start + step * (k as f64 + 0.5);
            (cx + corner_radius * angle.cos(), cy + corner_radius * angle.sin())
        })
        .collect()
}
