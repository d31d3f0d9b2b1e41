//! Geometry descriptions
//!
//! A `GeometrySpec` is the read-only snapshot of what to cut or print for a
//! single generation call. Primitive shapes are centred on the origin; a
//! selected CAD element carries its own position.

use crate::data::Point3;
use serde::{Deserialize, Serialize};

/// Geometry driving one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GeometrySpec {
    /// Axis-aligned rectangle centred on the origin
    Rectangle { width: f64, height: f64 },
    /// Circle centred on the origin
    Circle { radius: f64 },
    /// Regular polygon centred on the origin, first vertex on +X
    Polygon { sides: u32, radius: f64 },
    /// Raw G-code passed through verbatim
    Custom { gcode: String },
    /// Element picked in an external CAD view (may be absent)
    Selected {
        #[serde(default)]
        element: Option<SelectedElement>,
    },
}

impl Default for GeometrySpec {
    fn default() -> Self {
        Self::Rectangle {
            width: 100.0,
            height: 50.0,
        }
    }
}

impl GeometrySpec {
    /// Short name of the geometry kind, used in logs and headers
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Circle { .. } => "circle",
            Self::Polygon { .. } => "polygon",
            Self::Custom { .. } => "custom",
            Self::Selected {
                element: Some(element),
            } => element.shape.kind(),
            Self::Selected { element: None } => "selected",
        }
    }
}

/// Snapshot of an externally owned CAD element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedElement {
    /// XY centre of the footprint. Z is the base for prisms, cylinders,
    /// cones and extrusions and the centre for spheres and tori.
    #[serde(default)]
    pub position: Point3,
    pub shape: ElementShape,
}

impl SelectedElement {
    pub fn new(position: Point3, shape: ElementShape) -> Self {
        Self { position, shape }
    }
}

/// Type-specific dimensions of a selected element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ElementShape {
    Rectangle {
        width: f64,
        height: f64,
    },
    Circle {
        radius: f64,
    },
    /// Straight segment from the element position to `end`
    Line {
        end: Point3,
    },
    Polygon {
        sides: u32,
        radius: f64,
    },
    /// Box: `width` along X, `depth` along Y, `height` along Z
    Cube {
        width: f64,
        depth: f64,
        height: f64,
    },
    Sphere {
        radius: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    /// Truncated cone from `radius` at the base to `top_radius` at the top
    Cone {
        radius: f64,
        #[serde(default)]
        top_radius: f64,
        height: f64,
    },
    Torus {
        major_radius: f64,
        minor_radius: f64,
    },
    /// Closed profile (relative to the position) extruded upwards by `height`
    Extrusion {
        profile: Vec<[f64; 2]>,
        height: f64,
    },
    Text {
        content: String,
        #[serde(default)]
        size: f64,
    },
}

impl ElementShape {
    /// Short name of the element kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Circle { .. } => "circle",
            Self::Line { .. } => "line",
            Self::Polygon { .. } => "polygon",
            Self::Cube { .. } => "cube",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Cone { .. } => "cone",
            Self::Torus { .. } => "torus",
            Self::Extrusion { .. } => "extrusion",
            Self::Text { .. } => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_json_tagging() {
        let json = r#"{ "type": "polygon", "sides": 6, "radius": 20.0 }"#;
        let geometry: GeometrySpec = serde_json::from_str(json).unwrap();
        assert_eq!(
            geometry,
            GeometrySpec::Polygon {
                sides: 6,
                radius: 20.0
            }
        );
        assert_eq!(geometry.kind(), "polygon");
    }

    #[test]
    fn test_selected_element_json() {
        let json = r#"{
            "type": "selected",
            "element": { "position": { "x": 1.0, "y": 2.0, "z": 0.0 },
                         "shape": { "kind": "cone", "radius": 10.0, "height": 20.0 } }
        }"#;
        let geometry: GeometrySpec = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.kind(), "cone");
        match geometry {
            GeometrySpec::Selected {
                element: Some(element),
            } => {
                assert_eq!(element.position, Point3::new(1.0, 2.0, 0.0));
                assert_eq!(
                    element.shape,
                    ElementShape::Cone {
                        radius: 10.0,
                        top_radius: 0.0,
                        height: 20.0
                    }
                );
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn test_missing_element() {
        let geometry: GeometrySpec = serde_json::from_str(r#"{ "type": "selected" }"#).unwrap();
        assert_eq!(geometry, GeometrySpec::Selected { element: None });
        assert_eq!(geometry.kind(), "selected");
    }
}
