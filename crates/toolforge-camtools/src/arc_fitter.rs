//! Arc Fitter
//!
//! Replaces pairs of short linear moves with a single arc. A three-point
//! window over consecutive planar cuts is tested with an equidistance
//! proxy: when the middle point is as far from its predecessor as from its
//! successor, the pair becomes one arc whose centre is the midpoint of the
//! outer points. This is an approximation, not a circle fit.

use crate::optimizer::ModalState;
use crate::toolpath::{ArcDirection, Move, MotionSegment};
use tracing::debug;

/// Cross products below this are treated as colinear.
const COLINEAR_EPSILON: f64 = 1e-9;

/// Line-to-arc fitting over structured segments.
#[derive(Debug, Clone, Copy)]
pub struct ArcFitter {
    tolerance: f64,
}

impl ArcFitter {
    /// Create a new arc fitter with the equidistance tolerance in mm
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    pub fn fit(&self, segments: &[MotionSegment]) -> Vec<MotionSegment> {
        let mut state = ModalState::default();
        let mut window: Vec<Move> = Vec::with_capacity(3);
        let mut result = Vec::with_capacity(segments.len());
        let mut arcs = 0usize;

        for segment in segments {
            match segment {
                MotionSegment::Linear(target) if is_planar_cut(target, &state) => {
                    window.push(target.clone());
                    if window.len() == 3 {
                        let c = window.remove(2);
                        let b = window.remove(1);
                        let a = window.remove(0);
                        match self.arc_through(&a, &b, &c) {
                            Some(arc) => {
                                result.push(MotionSegment::Linear(a));
                                result.push(arc);
                                arcs += 1;
                            }
                            None => {
                                result.push(MotionSegment::Linear(a));
                                window.push(b);
                                window.push(c);
                            }
                        }
                    }
                }
                other => {
                    result.extend(window.drain(..).map(MotionSegment::Linear));
                    result.push(other.clone());
                }
            }
            state.apply(segment);
        }
        result.extend(window.drain(..).map(MotionSegment::Linear));

        debug!("Arc fitter produced {} arcs", arcs);
        result
    }

    /// Arc from `a` to `c` replacing the two segments `a -> b -> c`.
    fn arc_through(&self, a: &Move, b: &Move, c: &Move) -> Option<MotionSegment> {
        let (ax, ay) = (a.x?, a.y?);
        let (bx, by) = (b.x?, b.y?);
        let (cx, cy) = (c.x?, c.y?);

        let ab = (bx - ax).hypot(by - ay);
        let bc = (cx - bx).hypot(cy - by);
        if (ab - bc).abs() > self.tolerance {
            return None;
        }

        let cross = (bx - ax) * (cy - by) - (by - ay) * (cx - bx);
        if cross.abs() <= COLINEAR_EPSILON {
            return None;
        }
        let direction = if cross < 0.0 {
            ArcDirection::Clockwise
        } else {
            ArcDirection::CounterClockwise
        };

        let (mx, my) = ((ax + cx) / 2.0, (ay + cy) / 2.0);
        let mut target = Move::xy(cx, cy);
        target.feed = c.feed.or(b.feed);
        Some(MotionSegment::arc(direction, target, mx - ax, my - ay))
    }
}

/// Linear move in the current plane: X and Y given, no Z change, no extrusion.
fn is_planar_cut(target: &Move, state: &ModalState) -> bool {
    target.x.is_some()
        && target.y.is_some()
        && target.e.is_none()
        && target.comment.is_none()
        && target.z.is_none_or(|z| state.z == Some(z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: f64, y: f64) -> MotionSegment {
        MotionSegment::linear(Move::xy(x, y).with_feed(500.0))
    }

    #[test]
    fn test_colinear_points_unchanged() {
        let segments = vec![line(0.0, 0.0), line(1.0, 0.0), line(2.0, 0.0)];
        assert_eq!(ArcFitter::new(0.01).fit(&segments), segments);
    }

    #[test]
    fn test_equidistant_turn_becomes_arc() {
        // a right turn: a -> b heads +X, b -> c heads -Y
        let segments = vec![line(0.0, 0.0), line(1.0, 0.0), line(1.0, -1.0)];
        let result = ArcFitter::new(0.01).fit(&segments);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], segments[0]);
        match &result[1] {
            MotionSegment::Arc {
                direction,
                target,
                i,
                j,
            } => {
                assert_eq!(*direction, ArcDirection::Clockwise);
                assert_eq!((target.x, target.y), (Some(1.0), Some(-1.0)));
                assert_eq!((*i, *j), (0.5, -0.5));
                assert_eq!(target.feed, Some(500.0));
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn test_left_turn_is_ccw() {
        let segments = vec![line(0.0, 0.0), line(1.0, 0.0), line(1.0, 1.0)];
        let result = ArcFitter::new(0.01).fit(&segments);
        assert!(matches!(
            result[1],
            MotionSegment::Arc {
                direction: ArcDirection::CounterClockwise,
                ..
            }
        ));
    }

    #[test]
    fn test_unequal_segments_slide_window() {
        let segments = vec![
            line(0.0, 0.0),
            line(5.0, 0.0),
            line(5.0, 1.0),
            line(6.0, 1.0),
        ];
        let result = ArcFitter::new(0.01).fit(&segments);
        // (0,0) is emitted, then (5,0) (5,1) (6,1) fits
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], segments[0]);
        assert_eq!(result[1], segments[1]);
        assert!(matches!(result[2], MotionSegment::Arc { .. }));
    }

    #[test]
    fn test_non_planar_moves_flush() {
        let segments = vec![
            line(0.0, 0.0),
            line(1.0, 0.0),
            MotionSegment::linear(Move::z(-1.0)),
            line(1.0, -1.0),
        ];
        assert_eq!(ArcFitter::new(0.01).fit(&segments), segments);
    }

    #[test]
    fn test_extruding_moves_are_ignored() {
        let segments = vec![
            MotionSegment::linear(Move::xy(0.0, 0.0).with_e(0.1)),
            MotionSegment::linear(Move::xy(1.0, 0.0).with_e(0.2)),
            MotionSegment::linear(Move::xy(1.0, 1.0).with_e(0.3)),
        ];
        assert_eq!(ArcFitter::new(0.01).fit(&segments), segments);
    }
}
