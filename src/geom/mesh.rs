use super::{Point3, Tolerance, Vec3};

/// Indexed triangle mesh in double precision.
///
/// This is the exchange format between the ribbon builder and the buffer
/// geometry that ends up in the scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            normals: None,
        }
    }

    /// Create a mesh and fill in area-weighted vertex normals.
    #[must_use]
    pub fn with_vertex_normals(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        let mut mesh = Self::new(positions, indices);
        mesh.compute_vertex_normals();
        mesh
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if self
            .normals
            .as_ref()
            .is_some_and(|normals| normals.len() != self.positions.len())
        {
            return Err("mesh normal buffer does not match vertex count".to_string());
        }
        Ok(())
    }

    /// Recompute normals from the triangle geometry, replacing any existing ones.
    pub fn compute_vertex_normals(&mut self) {
        let points: Vec<Point3> = self.positions.iter().copied().map(Point3::from).collect();
        self.normals = Some(compute_smooth_normals(&points, &self.indices));
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    /// Returns the normal buffer as a flat slice when present.
    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(<[[f64; 3]]>::as_flattened)
    }
}

/// Accumulates unnormalized face normals (length proportional to twice the
/// triangle area) onto each corner, then normalizes per vertex.
///
/// Vertices without a usable normal fall back to `+Z`.
pub(crate) fn compute_smooth_normals(points: &[Point3], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut normals = vec![Vec3::ZERO; points.len()];

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;

        let (Some(a), Some(b), Some(c)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };

        let face = b.sub_point(*a).cross(c.sub_point(*a));

        normals[i0] = normals[i0] + face;
        normals[i1] = normals[i1] + face;
        normals[i2] = normals[i2] + face;
    }

    normals
        .into_iter()
        .map(|n| {
            if Tolerance::ZERO_LENGTH.is_zero_vec3(n) {
                return Vec3::Z.to_array();
            }
            n.normalized().unwrap_or(Vec3::Z).to_array()
        })
        .collect()
}
