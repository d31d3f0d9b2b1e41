//! Motion segment types.

use super::*;

/// Rotation sense of an arc move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

impl ArcDirection {
    /// G-code mnemonic for this direction.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ArcDirection::Clockwise => "G2",
            ArcDirection::CounterClockwise => "G3",
        }
    }

    /// Full-circle direction for a cut direction: climb maps to G3 and
    /// conventional to G2.
    pub fn for_cut(direction: CutDirection) -> Self {
        match direction {
            CutDirection::Climb => ArcDirection::CounterClockwise,
            CutDirection::Conventional => ArcDirection::Clockwise,
        }
    }
}

/// Target words of a move. Axes left as `None` keep their modal value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Absolute extruder position
    pub e: Option<f64>,
    pub feed: Option<f64>,
    pub comment: Option<String>,
}

impl Move {
    /// Move in XY only.
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Move along Z only.
    pub fn z(z: f64) -> Self {
        Self {
            z: Some(z),
            ..Self::default()
        }
    }

    /// Move along X only. On the lathe X is the radius.
    pub fn x(x: f64) -> Self {
        Self {
            x: Some(x),
            ..Self::default()
        }
    }

    /// Lathe move in the XZ plane.
    pub fn xz(x: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            z: Some(z),
            ..Self::default()
        }
    }

    /// Move to a full XYZ position.
    pub fn to(point: Point3) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            z: Some(point.z),
            ..Self::default()
        }
    }

    /// Move to a point in XY, keeping Z modal.
    pub fn to_xy(point: Point3) -> Self {
        Self::xy(point.x, point.y)
    }

    pub fn with_feed(mut self, feed: f64) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_e(mut self, e: f64) -> Self {
        self.e = Some(e);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// True when the move names at least one axis.
    pub fn has_axes(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }
}

/// One emitted instruction, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MotionSegment {
    /// G0
    Rapid(Move),
    /// G1
    Linear(Move),
    /// G2/G3 with the centre given relative to the start point
    Arc {
        direction: ArcDirection,
        target: Move,
        i: f64,
        j: f64,
    },
    /// Raw line passed through untouched (spindle, coolant, heaters, program control)
    Command(String),
    /// `; comment` line
    Comment(String),
}

impl MotionSegment {
    pub fn rapid(target: Move) -> Self {
        MotionSegment::Rapid(target)
    }

    pub fn linear(target: Move) -> Self {
        MotionSegment::Linear(target)
    }

    pub fn arc(direction: ArcDirection, target: Move, i: f64, j: f64) -> Self {
        MotionSegment::Arc {
            direction,
            target,
            i,
            j,
        }
    }

    pub fn command(line: impl Into<String>) -> Self {
        MotionSegment::Command(line.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        MotionSegment::Comment(text.into())
    }

    /// Target of a motion segment, `None` for commands and comments.
    pub fn target(&self) -> Option<&Move> {
        match self {
            MotionSegment::Rapid(m) | MotionSegment::Linear(m) => Some(m),
            MotionSegment::Arc { target, .. } => Some(target),
            MotionSegment::Command(_) | MotionSegment::Comment(_) => None,
        }
    }

    /// True for linear and arc moves.
    pub fn is_cut(&self) -> bool {
        matches!(self, MotionSegment::Linear(_) | MotionSegment::Arc { .. })
    }
}
