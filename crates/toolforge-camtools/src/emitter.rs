//! G-code text emission.
//!
//! The only place where a `Program` turns into text.

use crate::toolpath::{Move, MotionSegment, Program};
use std::fmt::Write;
use toolforge_core::units::{format_coord, format_extrusion, format_feed};

/// Renders programs to newline-delimited G-code.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcodeEmitter {
    line_numbers_enabled: bool,
}

impl GcodeEmitter {
    /// Creates an emitter without line numbers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an emitter with `N10`, `N20`, ... prefixes on non-comment lines.
    pub fn with_line_numbers(enabled: bool) -> Self {
        Self {
            line_numbers_enabled: enabled,
        }
    }

    pub fn emit(&self, program: &Program) -> String {
        let mut gcode = String::new();
        let mut line_number = 10u32;

        for line in &program.header {
            gcode.push_str(&format!("; {}\n", line));
        }

        for segment in &program.segments {
            let text = Self::render(segment);
            if self.line_numbers_enabled && !matches!(segment, MotionSegment::Comment(_)) {
                gcode.push_str(&format!("N{} {}\n", line_number, text));
                line_number += 10;
            } else {
                gcode.push_str(&text);
                gcode.push('\n');
            }
        }

        for line in &program.footer {
            gcode.push_str(&format!("; {}\n", line));
        }

        gcode
    }

    /// Text of a single segment, without a line number.
    pub fn render(segment: &MotionSegment) -> String {
        match segment {
            MotionSegment::Rapid(target) => Self::render_move("G0", target, None),
            MotionSegment::Linear(target) => Self::render_move("G1", target, None),
            MotionSegment::Arc {
                direction,
                target,
                i,
                j,
            } => Self::render_move(direction.mnemonic(), target, Some((*i, *j))),
            MotionSegment::Command(line) => line.clone(),
            MotionSegment::Comment(text) => format!("; {}", text),
        }
    }

    fn render_move(code: &str, target: &Move, center: Option<(f64, f64)>) -> String {
        let mut line = String::from(code);
        // write! into a String cannot fail
        for (letter, value) in [('X', target.x), ('Y', target.y), ('Z', target.z)] {
            if let Some(v) = value {
                let _ = write!(line, " {}{}", letter, format_coord(v));
            }
        }
        if let Some((i, j)) = center {
            let _ = write!(line, " I{} J{}", format_coord(i), format_coord(j));
        }
        if let Some(e) = target.e {
            let _ = write!(line, " E{}", format_extrusion(e));
        }
        if let Some(f) = target.feed {
            let _ = write!(line, " F{}", format_feed(f));
        }
        if let Some(comment) = &target.comment {
            let _ = write!(line, " ; {}", comment);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolpath::ArcDirection;

    fn sample() -> Program {
        let mut program = Program::new();
        program.add_header("Machine: mill");
        program.push(MotionSegment::command("G90"));
        program.push(MotionSegment::rapid(Move::z(5.0)));
        program.push(MotionSegment::comment("Layer 1"));
        program.push(MotionSegment::linear(
            Move::xy(53.0, -28.0).with_feed(800.0),
        ));
        program.push(MotionSegment::arc(
            ArcDirection::CounterClockwise,
            Move::xy(10.0, 0.0).with_feed(800.0),
            -10.0,
            0.0,
        ));
        program.push(MotionSegment::linear(
            Move::xy(1.0, 2.0).with_e(0.123456).with_feed(3000.0),
        ));
        program.add_footer("End of program");
        program
    }

    #[test]
    fn test_emit_plain() {
        let text = GcodeEmitter::new().emit(&sample());
        let expected = "; Machine: mill\n\
                        G90\n\
                        G0 Z5.000\n\
                        ; Layer 1\n\
                        G1 X53.000 Y-28.000 F800\n\
                        G3 X10.000 Y0.000 I-10.000 J0.000 F800\n\
                        G1 X1.000 Y2.000 E0.12346 F3000\n\
                        ; End of program\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_emit_line_numbers_skip_comments() {
        let text = GcodeEmitter::with_line_numbers(true).emit(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "N10 G90");
        assert_eq!(lines[2], "N20 G0 Z5.000");
        assert_eq!(lines[3], "; Layer 1");
        assert_eq!(lines[4], "N30 G1 X53.000 Y-28.000 F800");
    }

    #[test]
    fn test_move_comment() {
        let segment = MotionSegment::rapid(Move::xy(0.0, 0.0).with_comment("start"));
        assert_eq!(GcodeEmitter::render(&segment), "G0 X0.000 Y0.000 ; start");
    }
}
