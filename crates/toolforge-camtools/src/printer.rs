//! FFF printer program assembler.
//!
//! All strategies print a square footprint derived from the geometry and
//! track an absolute extruder position (`M82`) that is reset with `G92 E0`
//! at strategy-defined points.

use crate::depth::depth_levels;
use crate::shapes::placeholder;
use crate::toolpath::{Move, MotionSegment, Program};
use std::f64::consts::PI;
use toolforge_core::units::{format_coord, format_extrusion, format_whole};
use toolforge_core::{ElementShape, GeometrySpec, MachiningSettings, OperationType};
use tracing::debug;

/// Footprint side when the geometry has no usable size (mm).
pub const DEFAULT_OUTLINE: f64 = 20.0;
/// Segments per perimeter edge in vase mode.
pub const VASE_EDGE_SEGMENTS: usize = 8;
/// Support line spacing in extrusion widths.
pub const SUPPORT_SPACING: f64 = 4.0;
pub const SUPPORT_FLOW: f64 = 0.8;
/// Margin of the raft around the part (mm).
pub const RAFT_MARGIN: f64 = 5.0;
/// Per raft layer: (spacing in extrusion widths, speed factor, flow factor).
pub const RAFT_LAYERS: [(f64, f64, f64); 3] =
    [(2.0, 0.5, 1.5), (1.5, 0.75, 1.2), (1.0, 1.0, 1.0)];
pub const BRIM_LOOPS: usize = 5;
/// Most fill lines laid across one square.
pub const MAX_FILL_LINES: usize = 10_000;

/// Printer operation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStrategy {
    Standard,
    Vase,
    Support,
    Infill,
    Raft,
    Brim,
}

impl PrintStrategy {
    /// Dispatch table for printer operations.
    pub fn for_operation(operation: OperationType) -> Option<Self> {
        match operation {
            OperationType::Standard => Some(Self::Standard),
            OperationType::Vase => Some(Self::Vase),
            OperationType::Support => Some(Self::Support),
            OperationType::Infill => Some(Self::Infill),
            OperationType::Raft => Some(Self::Raft),
            OperationType::Brim => Some(Self::Brim),
            _ => None,
        }
    }
}

/// Filament length per millimetre of travel.
pub fn extrusion_multiplier(
    extrusion_width: f64,
    layer_height: f64,
    filament_diameter: f64,
) -> f64 {
    let filament_radius = filament_diameter / 2.0;
    (extrusion_width * layer_height) / (PI * filament_radius * filament_radius)
}

/// Side of the square footprint printed for a geometry.
pub fn outline_size(geometry: &GeometrySpec) -> f64 {
    let size = match geometry {
        GeometrySpec::Rectangle { width, height } => width.max(*height),
        GeometrySpec::Circle { radius } | GeometrySpec::Polygon { radius, .. } => 2.0 * radius,
        GeometrySpec::Selected {
            element: Some(element),
        } => match element.shape {
            ElementShape::Rectangle { width, height } => width.max(height),
            ElementShape::Circle { radius } | ElementShape::Polygon { radius, .. } => {
                2.0 * radius
            }
            _ => DEFAULT_OUTLINE,
        },
        _ => DEFAULT_OUTLINE,
    };
    if size.is_finite() && size > 0.0 {
        size
    } else {
        DEFAULT_OUTLINE
    }
}

/// Nozzle position and extruder accumulator.
#[derive(Debug, Clone)]
struct PrintHead {
    x: f64,
    y: f64,
    e: f64,
    multiplier: f64,
}

impl PrintHead {
    fn new(multiplier: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            e: 0.0,
            multiplier,
        }
    }

    fn reset_extruder(&mut self) -> MotionSegment {
        self.e = 0.0;
        MotionSegment::command("G92 E0")
    }

    fn travel(&mut self, x: f64, y: f64, z: Option<f64>, feed: f64) -> MotionSegment {
        self.x = x;
        self.y = y;
        let mut target = Move::xy(x, y).with_feed(feed);
        target.z = z;
        MotionSegment::rapid(target)
    }

    /// Extruding move in XY, or in XYZ when `z` is given.
    fn extrude(&mut self, x: f64, y: f64, z: Option<f64>, flow: f64, feed: f64) -> MotionSegment {
        let distance = (x - self.x).hypot(y - self.y);
        self.e += distance * self.multiplier * flow;
        self.x = x;
        self.y = y;
        let mut target = Move::xy(x, y).with_e(self.e).with_feed(feed);
        target.z = z;
        MotionSegment::linear(target)
    }
}

/// Line positions from `-half` towards `half` in steps of `spacing`, at
/// most [`MAX_FILL_LINES`] of them.
fn fill_offsets(half: f64, spacing: f64) -> Vec<f64> {
    if !(half.is_finite() && half > 0.0 && spacing.is_finite() && spacing > 0.0) {
        return Vec::new();
    }
    let lines = ((2.0 * half + 1e-9) / spacing).floor() + 1.0;
    let count = if lines > MAX_FILL_LINES as f64 {
        debug!("Fill capped at {} lines", MAX_FILL_LINES);
        MAX_FILL_LINES
    } else {
        lines as usize
    };
    (0..count).map(|k| -half + k as f64 * spacing).collect()
}

/// Axis along which parallel fill lines run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAxis {
    X,
    Y,
}

/// Assembles complete printer programs.
pub struct PrinterAssembler<'a> {
    settings: &'a MachiningSettings,
}

impl<'a> PrinterAssembler<'a> {
    /// Create a new printer assembler for the given settings
    pub fn new(settings: &'a MachiningSettings) -> Self {
        Self { settings }
    }

    fn print_feed(&self) -> f64 {
        self.settings.printer.print_speed * 60.0
    }

    fn travel_feed(&self) -> f64 {
        self.settings.printer.travel_speed * 60.0
    }

    fn layer_heights(&self) -> Vec<f64> {
        depth_levels(self.settings.cut_depth, self.settings.printer.layer_height)
            .into_iter()
            .map(|level| -level)
            .collect()
    }

    pub fn assemble(&self, geometry: &GeometrySpec) -> Program {
        let s = self.settings;
        let p = &s.printer;
        let multiplier =
            extrusion_multiplier(p.extrusion_width, p.layer_height, p.filament_diameter);
        let size = outline_size(geometry);
        let layers = self.layer_heights();
        let mut program = Program::new();

        program.add_header(format!("Machine: printer, operation: {}", s.operation_type));
        program.add_header(format!("Geometry: {}", geometry.kind()));
        program.add_header(format!("Material: {}", s.material));
        program.add_header(format!(
            "Nozzle {} mm, layer {} mm, {} layers",
            format_coord(p.nozzle_diameter),
            format_coord(p.layer_height),
            layers.len()
        ));
        program.add_header(format!(
            "Extrusion multiplier: {}",
            format_extrusion(multiplier)
        ));

        self.preamble(&mut program);

        let mut head = PrintHead::new(multiplier);
        let body = match PrintStrategy::for_operation(s.operation_type) {
            Some(_) if !(multiplier.is_finite() && multiplier > 0.0) => {
                placeholder("Extrusion multiplier is not positive, check filament settings")
            }
            Some(strategy) => {
                debug!(
                    "Printer strategy {:?}: {} layers, outline {:.3} mm",
                    strategy,
                    layers.len(),
                    size
                );
                match strategy {
                    PrintStrategy::Standard => self.standard(&mut head, &layers, size, 0.0),
                    PrintStrategy::Vase => self.vase(&mut head, &layers, size),
                    PrintStrategy::Support => self.support(&mut head, &layers, size),
                    PrintStrategy::Infill => self.infill(&mut head, &layers, size),
                    PrintStrategy::Raft => self.raft(&mut head, &layers, size),
                    PrintStrategy::Brim => self.brim(&mut head, &layers, size),
                }
            }
            None => placeholder(format!(
                "Operation {} is not available on the printer",
                s.operation_type
            )),
        };
        program.extend(body);

        self.teardown(&mut program);
        program.add_footer("End of print");
        program
    }

    fn preamble(&self, program: &mut Program) {
        let p = &self.settings.printer;
        let nozzle = format_whole(p.nozzle_temp);
        let bed = format_whole(p.bed_temp);
        program.push(MotionSegment::command("M82"));
        program.push(MotionSegment::command(format!("M104 S{nozzle}")));
        program.push(MotionSegment::command(format!("M140 S{bed}")));
        program.push(MotionSegment::command(format!("M109 S{nozzle}")));
        program.push(MotionSegment::command(format!("M190 S{bed}")));
        program.push(MotionSegment::command("G28"));
        program.push(MotionSegment::command("G90"));
        program.push(MotionSegment::command("G92 E0"));
    }

    /// Retract, lift, park, heaters and motors off.
    fn teardown(&self, program: &mut Program) {
        for line in [
            "G91",
            "G1 E-2 F2700",
            "G1 Z10 F3000",
            "G90",
            "G0 X0 Y200 F3000",
            "M104 S0",
            "M140 S0",
            "M84",
        ] {
            program.push(MotionSegment::command(line));
        }
    }

    /// Closed square loop of side `size` centred on the origin.
    fn perimeter(&self, head: &mut PrintHead, size: f64, z: f64, flow: f64) -> Vec<MotionSegment> {
        let h = size / 2.0;
        let feed = self.print_feed();
        vec![
            head.travel(-h, -h, Some(z), self.travel_feed()),
            head.extrude(h, -h, None, flow, feed),
            head.extrude(h, h, None, flow, feed),
            head.extrude(-h, h, None, flow, feed),
            head.extrude(-h, -h, None, flow, feed),
        ]
    }

    /// Connected zigzag lines filling the square `[-half, half]`.
    fn zigzag(&self, head: &mut PrintHead, half: f64, spacing: f64) -> Vec<MotionSegment> {
        let offsets = fill_offsets(half, spacing);
        let mut moves = Vec::new();
        let Some(&first) = offsets.first() else {
            return moves;
        };
        let feed = self.print_feed();
        moves.push(head.travel(-half, first, None, self.travel_feed()));
        for (k, &y) in offsets.iter().enumerate() {
            let x_end = if k % 2 == 0 { half } else { -half };
            moves.push(head.extrude(x_end, y, None, 1.0, feed));
            if let Some(&next) = offsets.get(k + 1) {
                moves.push(head.extrude(x_end, next, None, 1.0, feed));
            }
        }
        moves
    }

    /// Separate parallel lines across the square `[-half, half]`.
    fn parallel_lines(
        &self,
        head: &mut PrintHead,
        half: f64,
        spacing: f64,
        axis: LineAxis,
        flow: f64,
        feed: f64,
    ) -> Vec<MotionSegment> {
        let mut moves = Vec::new();
        for offset in fill_offsets(half, spacing) {
            let (start, end) = match axis {
                LineAxis::X => ((-half, offset), (half, offset)),
                LineAxis::Y => ((offset, -half), (offset, half)),
            };
            moves.push(head.travel(start.0, start.1, None, self.travel_feed()));
            moves.push(head.extrude(end.0, end.1, None, flow, feed));
        }
        moves
    }

    fn infill_spacing(&self) -> f64 {
        let p = &self.settings.printer;
        if p.infill_density > 0.0 {
            p.extrusion_width * 100.0 / p.infill_density
        } else {
            0.0
        }
    }

    /// One standard layer: perimeter then zigzag infill inset by one line width.
    fn standard_layer(&self, head: &mut PrintHead, size: f64, z: f64) -> Vec<MotionSegment> {
        let width = self.settings.printer.extrusion_width;
        let mut moves = self.perimeter(head, size, z, 1.0);
        moves.extend(self.zigzag(head, size / 2.0 - width, self.infill_spacing()));
        moves
    }

    fn standard(
        &self,
        head: &mut PrintHead,
        layers: &[f64],
        size: f64,
        z_offset: f64,
    ) -> Vec<MotionSegment> {
        let mut moves = Vec::new();
        for (index, z) in layers.iter().enumerate() {
            moves.push(MotionSegment::comment(format!("Layer {}", index + 1)));
            moves.push(head.reset_extruder());
            moves.extend(self.standard_layer(head, size, z + z_offset));
        }
        moves
    }

    /// Single continuous wall rising through every layer.
    fn vase(&self, head: &mut PrintHead, layers: &[f64], size: f64) -> Vec<MotionSegment> {
        let h = size / 2.0;
        let corners = [(-h, -h), (h, -h), (h, h), (-h, h), (-h, -h)];
        let total = 4 * VASE_EDGE_SEGMENTS;
        let feed = self.print_feed();
        let Some(&first) = layers.first() else {
            return Vec::new();
        };

        let mut moves = vec![
            head.reset_extruder(),
            head.travel(-h, -h, Some(first), self.travel_feed()),
        ];
        let mut z_start = first;
        for &z_end in layers {
            let mut k = 0usize;
            for edge in corners.windows(2) {
                let (a, b) = (edge[0], edge[1]);
                for seg in 1..=VASE_EDGE_SEGMENTS {
                    k += 1;
                    let t = seg as f64 / VASE_EDGE_SEGMENTS as f64;
                    let z = z_start + (z_end - z_start) * k as f64 / total as f64;
                    moves.push(head.extrude(
                        a.0 + (b.0 - a.0) * t,
                        a.1 + (b.1 - a.1) * t,
                        Some(z),
                        1.0,
                        feed,
                    ));
                }
            }
            z_start = z_end;
        }
        moves
    }

    /// Sparse grid alternating X and Y lines per layer.
    fn support(&self, head: &mut PrintHead, layers: &[f64], size: f64) -> Vec<MotionSegment> {
        let spacing = SUPPORT_SPACING * self.settings.printer.extrusion_width;
        let mut moves = Vec::new();
        for (index, &z) in layers.iter().enumerate() {
            let axis = if index % 2 == 0 { LineAxis::X } else { LineAxis::Y };
            moves.push(head.reset_extruder());
            moves.push(MotionSegment::rapid(Move::z(z).with_feed(self.travel_feed())));
            moves.extend(self.parallel_lines(
                head,
                size / 2.0,
                spacing,
                axis,
                SUPPORT_FLOW,
                self.print_feed(),
            ));
        }
        moves
    }

    /// Infill lines alternating 0 and 90 degrees per layer.
    fn infill(&self, head: &mut PrintHead, layers: &[f64], size: f64) -> Vec<MotionSegment> {
        let spacing = self.infill_spacing();
        let mut moves = Vec::new();
        for (index, &z) in layers.iter().enumerate() {
            let axis = if index % 2 == 0 { LineAxis::X } else { LineAxis::Y };
            moves.push(head.reset_extruder());
            moves.push(MotionSegment::rapid(Move::z(z).with_feed(self.travel_feed())));
            moves.extend(self.parallel_lines(
                head,
                size / 2.0,
                spacing,
                axis,
                1.0,
                self.print_feed(),
            ));
        }
        moves
    }

    /// Three raft layers under the part, then the part raised by the raft thickness.
    fn raft(&self, head: &mut PrintHead, layers: &[f64], size: f64) -> Vec<MotionSegment> {
        let p = &self.settings.printer;
        let half = size / 2.0 + RAFT_MARGIN;
        let mut moves = Vec::new();
        for (index, (spacing, speed, flow)) in RAFT_LAYERS.iter().enumerate() {
            let z = p.layer_height * (index + 1) as f64;
            let axis = if index % 2 == 0 { LineAxis::X } else { LineAxis::Y };
            moves.push(MotionSegment::comment(format!("Raft layer {}", index + 1)));
            moves.push(head.reset_extruder());
            moves.push(MotionSegment::rapid(Move::z(z).with_feed(self.travel_feed())));
            moves.extend(self.parallel_lines(
                head,
                half,
                spacing * p.extrusion_width,
                axis,
                *flow,
                self.print_feed() * speed,
            ));
        }
        let raft_thickness = p.layer_height * RAFT_LAYERS.len() as f64;
        moves.extend(self.standard(head, layers, size, raft_thickness));
        moves
    }

    /// Concentric loops around the first layer, then standard layers.
    fn brim(&self, head: &mut PrintHead, layers: &[f64], size: f64) -> Vec<MotionSegment> {
        let width = self.settings.printer.extrusion_width;
        let Some((&first, rest)) = layers.split_first() else {
            return Vec::new();
        };
        let mut moves = vec![
            MotionSegment::comment("Layer 1 with brim"),
            head.reset_extruder(),
        ];
        for loop_index in (1..=BRIM_LOOPS).rev() {
            let loop_size = size + 2.0 * width * loop_index as f64;
            moves.extend(self.perimeter(head, loop_size, first, 1.0));
        }
        moves.extend(self.standard_layer(head, size, first));
        for (index, &z) in rest.iter().enumerate() {
            moves.push(MotionSegment::comment(format!("Layer {}", index + 2)));
            moves.push(head.reset_extruder());
            moves.extend(self.standard_layer(head, size, z));
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolforge_core::MachineType;

    fn printer(operation: OperationType) -> MachiningSettings {
        MachiningSettings {
            operation_type: operation,
            cut_depth: 1.0,
            ..MachiningSettings::for_machine(MachineType::Printer)
        }
    }

    fn resets(program: &Program) -> usize {
        program
            .segments
            .iter()
            .filter(|s| matches!(s, MotionSegment::Command(c) if c == "G92 E0"))
            .count()
    }

    #[test]
    fn test_extrusion_multiplier() {
        let m = extrusion_multiplier(0.45, 0.2, 1.75);
        let expected = 0.09 / (PI * 0.875 * 0.875);
        assert!((m - expected).abs() < 1e-12);
    }

    #[test]
    fn test_outline_size() {
        assert_eq!(
            outline_size(&GeometrySpec::Rectangle {
                width: 30.0,
                height: 40.0
            }),
            40.0
        );
        assert_eq!(outline_size(&GeometrySpec::Circle { radius: 7.0 }), 14.0);
        assert_eq!(
            outline_size(&GeometrySpec::Custom {
                gcode: String::new()
            }),
            DEFAULT_OUTLINE
        );
    }

    #[test]
    fn test_preamble_order() {
        let program = PrinterAssembler::new(&printer(OperationType::Standard))
            .assemble(&GeometrySpec::default());
        let head: Vec<_> = program.segments.iter().take(8).cloned().collect();
        let expected = [
            "M82", "M104 S210", "M140 S60", "M109 S210", "M190 S60", "G28", "G90", "G92 E0",
        ];
        for (segment, line) in head.iter().zip(expected) {
            assert_eq!(segment, &MotionSegment::command(line));
        }
    }

    #[test]
    fn test_vase_single_reset() {
        let program =
            PrinterAssembler::new(&printer(OperationType::Vase)).assemble(&GeometrySpec::default());
        // the preamble reset plus the strategy reset
        assert_eq!(resets(&program), 2);
        let zs: Vec<f64> = program
            .segments
            .iter()
            .filter_map(|s| match s {
                MotionSegment::Linear(m) => m.z,
                _ => None,
            })
            .collect();
        assert_eq!(zs.len(), 5 * 4 * VASE_EDGE_SEGMENTS);
        assert!(zs.windows(2).all(|w| w[1] >= w[0]));
        assert!((zs.last().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_raft_layers_below_part() {
        let program =
            PrinterAssembler::new(&printer(OperationType::Raft)).assemble(&GeometrySpec::default());
        // 3 raft layers + 5 part layers + preamble
        assert_eq!(resets(&program), 9);
    }

    #[test]
    fn test_support_flow() {
        let settings = printer(OperationType::Support);
        let program = PrinterAssembler::new(&settings).assemble(&GeometrySpec::Rectangle {
            width: 10.0,
            height: 10.0,
        });
        let first_e = program.segments.iter().find_map(|s| match s {
            MotionSegment::Linear(m) => m.e,
            _ => None,
        });
        let multiplier = extrusion_multiplier(0.45, 0.2, 1.75);
        assert!((first_e.unwrap() - 10.0 * multiplier * SUPPORT_FLOW).abs() < 1e-9);
    }

    #[test]
    fn test_fill_offsets_bounded() {
        let offsets = fill_offsets(10.0, 5.0);
        assert_eq!(offsets, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
        assert!(fill_offsets(0.0, 1.0).is_empty());
        assert!(fill_offsets(10.0, 0.0).is_empty());
        // spacing below the ulp of the offset, or a near-zero spacing
        assert_eq!(fill_offsets(1e17, 1.0).len(), MAX_FILL_LINES);
        assert_eq!(fill_offsets(10.0, 1e-9).len(), MAX_FILL_LINES);
    }

    #[test]
    fn test_unsupported_operation() {
        let program = PrinterAssembler::new(&printer(OperationType::Pocket))
            .assemble(&GeometrySpec::default());
        assert!(!program.segments.iter().any(|s| s.is_cut()));
    }
}
