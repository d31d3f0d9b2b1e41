//! Move Optimizer
//!
//! Removes redundant motion from a program: moves that leave the machine
//! where it already is, and tiny cutting moves below the configured
//! tolerance that do not extrude.

use crate::toolpath::{Move, MotionSegment};
use tracing::debug;

/// Modal machine state as far as it can be known from the program so far.
///
/// Axes are `None` until a move names them, and again after a raw command
/// moves them behind the program's back (for example `G33`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModalState {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub feed: Option<f64>,
}

impl ModalState {
    /// State after executing `target` from here.
    pub fn resolve(&self, target: &Move) -> Self {
        Self {
            x: target.x.or(self.x),
            y: target.y.or(self.y),
            z: target.z.or(self.z),
            e: target.e.or(self.e),
            feed: target.feed.or(self.feed),
        }
    }

    /// XYZ distance to another state, if every axis is known in both.
    pub fn distance_to(&self, other: &Self) -> Option<f64> {
        let dx = other.x? - self.x?;
        let dy = other.y? - self.y?;
        let dz = other.z? - self.z?;
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// Updates the state for any segment.
    pub fn apply(&mut self, segment: &MotionSegment) {
        match segment {
            MotionSegment::Command(line) => self.apply_command(line),
            MotionSegment::Comment(_) => {}
            other => {
                if let Some(target) = other.target() {
                    *self = self.resolve(target);
                }
            }
        }
    }

    /// `G92` sets the named axes; any other command carrying axis words
    /// leaves those axes unknown.
    fn apply_command(&mut self, line: &str) {
        let mut words = line.split_whitespace();
        let set_position = words
            .next()
            .is_some_and(|code| code.eq_ignore_ascii_case("G92"));
        for word in words {
            let mut chars = word.chars();
            let Some(letter) = chars.next() else {
                continue;
            };
            let value = if set_position {
                chars.as_str().parse::<f64>().ok()
            } else {
                None
            };
            match letter.to_ascii_uppercase() {
                'X' => self.x = value,
                'Y' => self.y = value,
                'Z' => self.z = value,
                'E' => self.e = value,
                _ => {}
            }
        }
    }
}

/// Redundant-move elimination over structured segments.
#[derive(Debug, Clone, Copy)]
pub struct MoveOptimizer {
    tolerance: f64,
}

impl MoveOptimizer {
    /// Create a new optimizer; G1 moves shorter than `tolerance` are dropped
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    /// Returns the segments with redundant moves removed.
    ///
    /// A dropped move does not update the tracked state, which makes the
    /// pass idempotent.
    pub fn optimize(&self, segments: &[MotionSegment]) -> Vec<MotionSegment> {
        let mut state = ModalState::default();
        let mut result = Vec::with_capacity(segments.len());
        let mut dropped = 0usize;

        for segment in segments {
            let redundant = match segment {
                MotionSegment::Rapid(target) => state.resolve(target) == state,
                MotionSegment::Linear(target) => {
                    let next = state.resolve(target);
                    next == state
                        || (next.e == state.e
                            && state
                                .distance_to(&next)
                                .is_some_and(|d| d < self.tolerance))
                }
                _ => false,
            };
            if redundant {
                dropped += 1;
                continue;
            }
            state.apply(segment);
            result.push(segment.clone());
        }

        debug!("Move optimizer dropped {} of {} segments", dropped, segments.len());
        result
    }
}
