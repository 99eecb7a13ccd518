//! Ribbon triangulation between two sampled curves.
//!
//! Given the samples of two neighbouring curves (same resolution), the
//! builder emits one connector segment per sample and one two-triangle
//! patch per sampled interval:
//!
//! ```text
//! prev[j+1] (3) ───── curr[j+1] (2)
//!     │   ╲                 │
//!     │      ╲              │
//!     │         ╲           │
//! prev[j]   (0) ───── curr[j]   (1)
//! ```
//!
//! Each patch owns its four corners, so neighbouring patches do not share
//! vertices and every patch is shaded flat.

use super::metrics::{GeomMetrics, TimingBucket};
use super::{GeomMesh, Point3};

/// Triangle list for one patch: `(0, 1, 2)` and `(0, 2, 3)`.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Straight connector between matching samples of two curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point3,
    pub end: Point3,
}

impl LineSegment {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn points(&self) -> [Point3; 2] {
        [self.start, self.end]
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }
}

/// One quad of the ribbon, triangulated and with per-vertex normals.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePatch {
    corners: [Point3; 4],
    mesh: GeomMesh,
}

impl SurfacePatch {
    /// Corners in winding order `prev[j], curr[j], curr[j+1], prev[j+1]`.
    #[must_use]
    pub fn new(corners: [Point3; 4]) -> Self {
        let positions = corners.iter().map(|p| p.to_array()).collect();
        let mesh = GeomMesh::with_vertex_normals(positions, QUAD_INDICES.to_vec());
        Self { corners, mesh }
    }

    #[must_use]
    pub const fn corners(&self) -> &[Point3; 4] {
        &self.corners
    }

    #[must_use]
    pub const fn mesh(&self) -> &GeomMesh {
        &self.mesh
    }

    #[must_use]
    pub fn into_mesh(self) -> GeomMesh {
        self.mesh
    }

    /// Normal computed for corner `index`, if it exists.
    #[must_use]
    pub fn normal_at(&self, index: usize) -> Option<[f64; 3]> {
        self.mesh.normals.as_ref()?.get(index).copied()
    }
}

/// Everything generated between one pair of neighbouring curves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Connectors {
    pub lines: Vec<LineSegment>,
    pub surfaces: Vec<SurfacePatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RibbonError {
    #[error("ribbon rows must be sampled at the same resolution: previous has {prev} points, current has {curr}")]
    LengthMismatch { prev: usize, curr: usize },
}

/// Builds connector lines and surface patches between `prev` and `curr`.
///
/// `n` samples per row give `n` lines and `n - 1` patches; rows with zero or
/// one sample give no patches.
pub fn build_connectors(prev: &[Point3], curr: &[Point3]) -> Result<Connectors, RibbonError> {
    let mut metrics = GeomMetrics::default();
    build_connectors_with_metrics(prev, curr, &mut metrics)
}

pub fn build_connectors_with_metrics(
    prev: &[Point3],
    curr: &[Point3],
    metrics: &mut GeomMetrics,
) -> Result<Connectors, RibbonError> {
    if prev.len() != curr.len() {
        return Err(RibbonError::LengthMismatch {
            prev: prev.len(),
            curr: curr.len(),
        });
    }

    let lines: Vec<LineSegment> = prev
        .iter()
        .zip(curr)
        .map(|(a, b)| LineSegment::new(*a, *b))
        .collect();

    let surfaces: Vec<SurfacePatch> = metrics.time(TimingBucket::Triangulation, || {
        prev.windows(2)
            .zip(curr.windows(2))
            .map(|(p, c)| SurfacePatch::new([p[0], c[0], c[1], p[1]]))
            .collect()
    });

    Ok(Connectors { lines, surfaces })
}
