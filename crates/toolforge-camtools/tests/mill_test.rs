use toolforge_camtools::{MotionSegment, ToolpathGenerator};
use toolforge_core::{
    CutDirection, ElementShape, GeometrySpec, MachiningSettings, OffsetPolicy, OperationType,
    OriginPolicy, Point3, SelectedElement, Workpiece,
};

fn rectangle() -> GeometrySpec {
    GeometrySpec::Rectangle {
        width: 100.0,
        height: 50.0,
    }
}

fn contour_settings() -> MachiningSettings {
    MachiningSettings {
        operation_type: OperationType::Contour,
        tool_diameter: 6.0,
        offset: OffsetPolicy::Outside,
        cut_depth: 5.0,
        stepdown: 1.0,
        ..MachiningSettings::default()
    }
}

fn body_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.starts_with(';')).collect()
}

#[test]
fn test_contour_rectangle_program() {
    let generator = ToolpathGenerator::new(contour_settings());
    let gcode = generator.generate(&rectangle(), None).unwrap();
    let lines = body_lines(&gcode);

    assert_eq!(&lines[..5], &["G90", "G21", "G17", "M3 S12000", "G0 Z5.000"]);
    assert_eq!(
        &lines[5..11],
        &[
            "G0 X-53.000 Y-28.000",
            "G1 Z-1.000 F300",
            "G1 X53.000 Y-28.000 F800",
            "G1 X53.000 Y28.000 F800",
            "G1 X-53.000 Y28.000 F800",
            "G1 X-53.000 Y-28.000 F800",
        ]
    );
    assert_eq!(&lines[lines.len() - 3..], &["G0 Z5.000", "M5", "M30"]);
    assert!(gcode.contains("G1 Z-5.000 F300"));
    assert!(!gcode.contains("Z-6.000"));
}

#[test]
fn test_contour_levels_and_points() {
    let program = ToolpathGenerator::new(contour_settings()).build_program(&rectangle(), None);
    let plunges: Vec<f64> = program
        .segments
        .iter()
        .filter_map(|s| match s {
            MotionSegment::Linear(m) if m.x.is_none() && m.y.is_none() => m.z,
            _ => None,
        })
        .collect();
    assert_eq!(plunges, vec![-1.0, -2.0, -3.0, -4.0, -5.0]);

    let xy_points = program
        .segments
        .iter()
        .filter_map(|s| s.target())
        .filter(|m| m.x.is_some() && m.y.is_some())
        .count();
    assert_eq!(xy_points, 25);
}

#[test]
fn test_inside_and_outside_edges_differ_by_tool_diameter() {
    let max_x = |offset: OffsetPolicy| {
        let settings = MachiningSettings {
            offset,
            ..contour_settings()
        };
        ToolpathGenerator::new(settings)
            .build_program(&rectangle(), None)
            .positions()
            .iter()
            .map(|p| p.x)
            .fold(f64::MIN, f64::max)
    };
    let outside = max_x(OffsetPolicy::Outside);
    let inside = max_x(OffsetPolicy::Inside);
    assert!((outside - inside - 6.0).abs() < 1e-9);
    assert!((2.0 * outside - 106.0).abs() < 1e-9);
}

#[test]
fn test_conventional_reverses_order() {
    let points = |direction: CutDirection| {
        let settings = MachiningSettings {
            direction,
            cut_depth: 1.0,
            ..contour_settings()
        };
        ToolpathGenerator::new(settings)
            .build_program(&rectangle(), None)
            .segments
            .iter()
            .filter(|s| s.is_cut())
            .filter_map(|s| s.target())
            .filter_map(|m| Some((m.x?, m.y?)))
            .collect::<Vec<_>>()
    };
    let climb = points(CutDirection::Climb);
    let conventional = points(CutDirection::Conventional);
    assert_eq!(climb.len(), conventional.len());
    for p in &climb {
        assert!(conventional.contains(p));
    }
    assert_ne!(climb, conventional);
}

#[test]
fn test_corner2_forces_half_workpiece_depth() {
    let settings = MachiningSettings {
        origin: OriginPolicy::WorkpieceCorner2,
        ..contour_settings()
    };
    let workpiece = Workpiece {
        depth: 40.0,
        ..Workpiece::default()
    };
    let gcode = ToolpathGenerator::new(settings)
        .generate(&rectangle(), Some(&workpiece))
        .unwrap();
    assert!(gcode.contains("G0 X-3.000 Y-3.000"));
    assert!(gcode.contains("G1 Z20.000 F300"));
    assert!(!gcode.contains("Z-1.000"));
}

#[test]
fn test_circle_pocket_spirals_outward() {
    let settings = MachiningSettings {
        operation_type: OperationType::Pocket,
        offset: OffsetPolicy::Inside,
        cut_depth: 1.0,
        ..contour_settings()
    };
    let gcode = ToolpathGenerator::new(settings)
        .generate(&GeometrySpec::Circle { radius: 20.0 }, None)
        .unwrap();
    // effective radius 17 in 2.4 mm rings: 8 full circles
    assert_eq!(gcode.matches("G3 ").count(), 8);
    assert!(gcode.contains("G3 X17.000 Y0.000 I-17.000 J0.000 F800"));
    assert!(gcode.contains("G0 X0.000 Y0.000"));
}

#[test]
fn test_drill_pecks_at_centre() {
    let settings = MachiningSettings {
        operation_type: OperationType::Drill,
        cut_depth: 3.0,
        ..contour_settings()
    };
    let geometry = GeometrySpec::Selected {
        element: Some(SelectedElement::new(
            Point3::new(10.0, 20.0, 0.0),
            ElementShape::Circle { radius: 3.0 },
        )),
    };
    let gcode = ToolpathGenerator::new(settings)
        .generate(&geometry, None)
        .unwrap();
    assert!(gcode.contains("; Peck drilling cycle"));
    assert!(gcode.contains("G0 X10.000 Y20.000"));
    for depth in ["Z-1.000", "Z-2.000", "Z-3.000"] {
        assert!(gcode.contains(&format!("G1 {} F300", depth)));
    }
    assert_eq!(gcode.matches("G0 Z0.000").count(), 3);
}

#[test]
fn test_solid_cylinder_slices() {
    let settings = MachiningSettings {
        offset: OffsetPolicy::Center,
        stepdown: 5.0,
        ..contour_settings()
    };
    let geometry = GeometrySpec::Selected {
        element: Some(SelectedElement::new(
            Point3::default(),
            ElementShape::Cylinder {
                radius: 10.0,
                height: 10.0,
            },
        )),
    };
    let gcode = ToolpathGenerator::new(settings)
        .generate(&geometry, None)
        .unwrap();
    assert_eq!(gcode.matches("G3 X10.000 Y0.000 I-10.000 J0.000").count(), 3);
}

#[test]
fn test_degenerate_geometry_is_comment_only() {
    let settings = MachiningSettings {
        offset: OffsetPolicy::Inside,
        ..contour_settings()
    };
    let program = ToolpathGenerator::new(settings)
        .build_program(&GeometrySpec::Circle { radius: 2.0 }, None);
    assert!(!program.segments.iter().any(|s| s.is_cut()));
    assert!(program
        .segments
        .iter()
        .any(|s| matches!(s, MotionSegment::Comment(_))));
}

#[test]
fn test_line_numbers() {
    let settings = MachiningSettings {
        line_numbers: true,
        ..contour_settings()
    };
    let gcode = ToolpathGenerator::new(settings)
        .generate(&rectangle(), None)
        .unwrap();
    let numbered: Vec<&str> = gcode.lines().filter(|l| l.starts_with('N')).collect();
    assert_eq!(numbered[0], "N10 G90");
    assert_eq!(numbered[1], "N20 G21");
    assert!(gcode.lines().filter(|l| l.starts_with(';')).all(|l| !l.contains("N10")));
}
