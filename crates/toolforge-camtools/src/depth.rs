//! Multi-pass depth slicing.

/// Absorbs floating error when the depth is an exact multiple of the step.
const LEVEL_EPSILON: f64 = 1e-9;

/// Number of passes needed to reach `depth` in steps of `stepdown`.
pub fn level_count(depth: f64, stepdown: f64) -> usize {
    if !depth.is_finite() || depth <= 0.0 {
        return 0;
    }
    if stepdown.is_nan() || stepdown <= 0.0 {
        return 1;
    }
    ((depth / stepdown) - LEVEL_EPSILON).ceil().max(1.0) as usize
}

/// Z levels from the first pass down to `-depth`.
///
/// Levels are `-S, -2S, ...` with the last clamped to exactly `-depth`, so
/// the cut never goes past the target even when the step does not divide it.
/// A non-positive depth yields no levels; a non-positive step yields one
/// full-depth level.
pub fn depth_levels(depth: f64, stepdown: f64) -> Vec<f64> {
    let count = level_count(depth, stepdown);
    (1..=count)
        .map(|i| {
            if i == count {
                -depth
            } else {
                -(i as f64 * stepdown)
            }
        })
        .collect()
}

/// Slice heights from `top` down to `bottom` inclusive, spaced by `stepdown`.
///
/// Used by the solid slicers; the bottom is always included so the last
/// slice sits on the base of the solid.
pub fn slice_heights(top: f64, bottom: f64, stepdown: f64) -> Vec<f64> {
    if !top.is_finite() || !bottom.is_finite() || top < bottom {
        return Vec::new();
    }
    if stepdown.is_nan() || stepdown <= 0.0 {
        return vec![top];
    }
    let mut heights = Vec::new();
    let mut k = 0usize;
    loop {
        let z = top - k as f64 * stepdown;
        if z < bottom - LEVEL_EPSILON {
            break;
        }
        heights.push(z);
        k += 1;
    }
    if heights
        .last()
        .is_some_and(|last| (last - bottom).abs() > LEVEL_EPSILON)
    {
        heights.push(bottom);
    }
    heights
}
