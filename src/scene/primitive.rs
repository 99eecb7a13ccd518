//! Primitieven die de assembler aan de scene hangt.

use serde::Serialize;

use crate::config::{MaterialConfig, color_to_rgb};
use crate::geom::{BufferGeometry, LineSegment, Point3, SurfacePatch};

/// Kleur van een lijnprimitief (`0xRRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineMaterial {
    pub color: u32,
}

/// Materiaal van een oppervlak: enkel kleur en zijdigheid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurfaceMaterial {
    pub color: u32,
    pub double_sided: bool,
}

impl SurfaceMaterial {
    #[must_use]
    pub fn rgb(&self) -> [f64; 3] {
        color_to_rgb(self.color)
    }
}

impl LineMaterial {
    #[must_use]
    pub fn rgb(&self) -> [f64; 3] {
        color_to_rgb(self.color)
    }
}

/// Open lijnstrip door de punten van de geometrie.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePrimitive {
    pub geometry: BufferGeometry,
    pub material: LineMaterial,
}

impl LinePrimitive {
    /// Lijnstrip langs een gesamplede curve.
    #[must_use]
    pub fn outline(points: &[Point3], materials: &MaterialConfig) -> Self {
        Self {
            geometry: BufferGeometry::from_points(points),
            material: LineMaterial {
                color: materials.outline_color,
            },
        }
    }

    /// Verbindingslijn tussen twee curves, als strip van twee punten.
    #[must_use]
    pub fn connector(segment: &LineSegment, materials: &MaterialConfig) -> Self {
        Self {
            geometry: BufferGeometry::from_points(&segment.points()),
            material: LineMaterial {
                color: materials.connector_color,
            },
        }
    }
}

/// Geïndexeerde driehoeksmesh met `position`- en `normal`-attributen.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPrimitive {
    pub geometry: BufferGeometry,
    pub material: SurfaceMaterial,
}

impl MeshPrimitive {
    #[must_use]
    pub fn surface(patch: &SurfacePatch, materials: &MaterialConfig) -> Self {
        Self {
            geometry: BufferGeometry::from_mesh(patch.mesh()),
            material: SurfaceMaterial {
                color: materials.surface_color,
                double_sided: materials.surface_double_sided,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line(LinePrimitive),
    Mesh(MeshPrimitive),
}

impl Primitive {
    #[must_use]
    pub const fn geometry(&self) -> &BufferGeometry {
        match self {
            Self::Line(line) => &line.geometry,
            Self::Mesh(mesh) => &mesh.geometry,
        }
    }

    #[must_use]
    pub const fn as_mesh(&self) -> Option<&MeshPrimitive> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            Self::Line(_) => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshPrimitive> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            Self::Line(_) => None,
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Mesh(_) => "mesh",
        }
    }
}

impl From<LinePrimitive> for Primitive {
    fn from(value: LinePrimitive) -> Self {
        Self::Line(value)
    }
}

impl From<MeshPrimitive> for Primitive {
    fn from(value: MeshPrimitive) -> Self {
        Self::Mesh(value)
    }
}
