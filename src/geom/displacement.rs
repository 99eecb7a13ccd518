//! In-place normal-offset displacement of buffer vertices.
//!
//! Unlike a rebuild, displacement never reallocates or changes topology: it
//! reads a vertex position and its normal from the geometry's attribute
//! buffers, writes `position + normal * offset` back into the same slot and
//! flags the position attribute for re-upload.
//!
//! The write is relative to whatever the buffer currently holds. Applying
//! `d1` and then `d2` leaves the vertex at `rest + (d1 + d2) * normal`; no rest
//! position is kept. Normals are not recomputed afterwards.
//!
//! # Example
//!
//! ```ignore
//! use ribbon_engine::geom::{displace_first_vertex, BufferGeometry};
//!
//! let moved = displace_first_vertex(&mut geometry, 0.1)?;
//! assert!(moved.shift() <= 0.1 + 1e-6);
//! ```

use super::buffer::{BufferAttribute, BufferGeometry, NORMAL, POSITION};
use super::{Point3, Vec3};

/// Errors that can occur while displacing a buffer vertex.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DisplacementError {
    #[error("geometry has no `{0}` attribute")]
    MissingAttribute(&'static str),

    #[error("attribute `{name}` has item size {item_size}, expected 3")]
    InvalidItemSize { name: &'static str, item_size: usize },

    #[error("vertex {index} is out of range for {count} vertices")]
    VertexOutOfRange { index: usize, count: usize },

    #[error("displacement offset must be finite, got {0}")]
    InvalidOffset(f64),

    #[error("displaced position of vertex {index} is not finite")]
    NonFiniteResult { index: usize },
}

/// Outcome of moving one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedVertex {
    pub index: usize,
    pub before: Point3,
    pub after: Point3,
    pub normal: Vec3,
}

impl DisplacedVertex {
    /// Distance the vertex travelled.
    #[must_use]
    pub fn shift(&self) -> f64 {
        self.before.distance_to(self.after)
    }
}

/// Diagnostics for one displacement pass over the live surfaces.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DisplacementDiagnostics {
    /// Offset applied along each normal.
    pub offset: f64,
    /// Surfaces whose first vertex was moved.
    pub displaced_surface_count: usize,
    /// Surfaces that could not be displaced (stale reference or malformed buffers).
    pub skipped_surface_count: usize,
    /// Largest distance any vertex moved.
    pub max_shift: f64,
    /// Human-readable notes about skipped surfaces.
    pub warnings: Vec<String>,
}

impl DisplacementDiagnostics {
    #[must_use]
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn record(&mut self, vertex: &DisplacedVertex) {
        self.displaced_surface_count += 1;
        self.max_shift = self.max_shift.max(vertex.shift());
    }

    pub fn skip(&mut self, warning: impl Into<String>) {
        self.skipped_surface_count += 1;
        self.warnings.push(warning.into());
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped_surface_count == 0
    }
}

/// Moves vertex `index` of `geometry` along its own normal by `offset`.
///
/// # Errors
/// Fails without touching the buffer when either attribute is missing or
/// not three-component, when `index` is out of range, or when the offset or
/// the resulting position is not finite.
pub fn displace_vertex_along_normal(
    geometry: &mut BufferGeometry,
    index: usize,
    offset: f64,
) -> Result<DisplacedVertex, DisplacementError> {
    if !offset.is_finite() {
        return Err(DisplacementError::InvalidOffset(offset));
    }

    let (positions, normals) = geometry.attribute_pair_mut(POSITION, NORMAL);
    let positions = positions.ok_or(DisplacementError::MissingAttribute(POSITION))?;
    let normals = normals.ok_or(DisplacementError::MissingAttribute(NORMAL))?;
    ensure_vec3(positions, POSITION)?;
    ensure_vec3(normals, NORMAL)?;

    let count = positions.count().min(normals.count());
    let out_of_range = DisplacementError::VertexOutOfRange { index, count };
    if index >= count {
        return Err(out_of_range);
    }
    let offset_in_buffer = index.checked_mul(3).ok_or(out_of_range.clone())?;

    let before = Vec3::from_packed(positions.array(), offset_in_buffer).ok_or(out_of_range.clone())?;
    let normal = Vec3::from_packed(normals.array(), offset_in_buffer).ok_or(out_of_range)?;

    let after = before + normal * offset;
    if !after.is_finite() {
        return Err(DisplacementError::NonFiniteResult { index });
    }

    let after = Point3::new(after.x, after.y, after.z);
    positions.array_mut()[offset_in_buffer..offset_in_buffer + 3]
        .copy_from_slice(&after.to_f32_array());
    positions.mark_needs_update();

    Ok(DisplacedVertex {
        index,
        before: Point3::new(before.x, before.y, before.z),
        after,
        normal,
    })
}

/// Displaces vertex 0 only; the remaining vertices are left untouched.
pub fn displace_first_vertex(
    geometry: &mut BufferGeometry,
    offset: f64,
) -> Result<DisplacedVertex, DisplacementError> {
    displace_vertex_along_normal(geometry, 0, offset)
}

fn ensure_vec3(attribute: &BufferAttribute, name: &'static str) -> Result<(), DisplacementError> {
    if attribute.item_size() == 3 {
        Ok(())
    } else {
        Err(DisplacementError::InvalidItemSize {
            name,
            item_size: attribute.item_size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_offset() {
        let mut geometry = BufferGeometry::from_points(&[Point3::ORIGIN]);
        assert_eq!(
            displace_first_vertex(&mut geometry, f64::NAN).unwrap_err().to_string(),
            "displacement offset must be finite, got NaN"
        );
    }

    #[test]
    fn diagnostics_track_largest_shift() {
        let mut diagnostics = DisplacementDiagnostics::new(0.2);
        diagnostics.record(&DisplacedVertex {
            index: 0,
            before: Point3::ORIGIN,
            after: Point3::new(0.0, 0.2, 0.0),
            normal: Vec3::Y,
        });
        diagnostics.skip("surface 7 is no longer attached");
        assert_eq!(diagnostics.displaced_surface_count, 1);
        assert_eq!(diagnostics.skipped_surface_count, 1);
        assert!((diagnostics.max_shift - 0.2).abs() < 1e-12);
        assert!(!diagnostics.is_clean());
    }
}
