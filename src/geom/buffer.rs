//! GPU-style vertex buffers with named attributes.
//!
//! A [`BufferGeometry`] mirrors what a retained-mode renderer uploads: packed
//! `f32` attribute arrays keyed by name (`position`, `normal`) plus an
//! optional index buffer. Every attribute carries a version counter; bumping
//! it is how in-place edits tell the renderer to re-upload.

use std::collections::BTreeMap;

use super::{GeomMesh, Point3};

pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";

#[derive(Debug, Clone, PartialEq)]
pub struct BufferAttribute {
    array: Vec<f32>,
    item_size: usize,
    version: u32,
}

impl BufferAttribute {
    #[must_use]
    pub fn new(array: Vec<f32>, item_size: usize) -> Self {
        Self {
            array,
            item_size,
            version: 0,
        }
    }

    #[must_use]
    pub fn from_f64(values: &[f64], item_size: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let array = values.iter().map(|v| *v as f32).collect();
        Self::new(array, item_size)
    }

    #[must_use]
    pub fn array(&self) -> &[f32] {
        &self.array
    }

    /// Mutable access to the packed values. Callers must follow up with
    /// [`mark_needs_update`](Self::mark_needs_update) once done writing.
    pub fn array_mut(&mut self) -> &mut [f32] {
        &mut self.array
    }

    #[must_use]
    pub const fn item_size(&self) -> usize {
        self.item_size
    }

    #[must_use]
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.array.len() / self.item_size
        }
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    pub fn mark_needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BufferGeometry {
    attributes: BTreeMap<String, BufferAttribute>,
    index: Option<Vec<u32>>,
}

impl BufferGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position-only geometry for line strips and line segments.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        let array = points.iter().flat_map(|p| p.to_f32_array()).collect();
        let mut geometry = Self::new();
        geometry.set_attribute(POSITION, BufferAttribute::new(array, 3));
        geometry
    }

    /// Converts an indexed mesh, carrying its normals along when present.
    #[must_use]
    pub fn from_mesh(mesh: &GeomMesh) -> Self {
        let mut geometry = Self::new();
        geometry.set_attribute(
            POSITION,
            BufferAttribute::from_f64(mesh.positions_flat(), 3),
        );
        if let Some(normals) = mesh.normals_flat() {
            geometry.set_attribute(NORMAL, BufferAttribute::from_f64(normals, 3));
        }
        geometry.set_index(mesh.indices.clone());
        geometry
    }

    pub fn set_attribute(&mut self, name: &str, attribute: BufferAttribute) {
        self.attributes.insert(name.to_owned(), attribute);
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.attributes.get(name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut BufferAttribute> {
        self.attributes.get_mut(name)
    }

    /// Borrow two distinct attributes at once, the first mutably.
    ///
    /// Returns `None` for either side that is missing. Asking for the same
    /// name twice yields `(None, None)`.
    pub fn attribute_pair_mut(
        &mut self,
        writable: &str,
        readable: &str,
    ) -> (Option<&mut BufferAttribute>, Option<&BufferAttribute>) {
        if writable == readable {
            return (None, None);
        }
        let mut target = None;
        let mut source = None;
        for (name, attribute) in &mut self.attributes {
            if name == writable {
                target = Some(attribute);
            } else if name == readable {
                let shared: &BufferAttribute = attribute;
                source = Some(shared);
            }
        }
        (target, source)
    }

    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    pub fn set_index(&mut self, index: Vec<u32>) {
        self.index = Some(index);
    }

    #[must_use]
    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attribute(POSITION).map_or(0, BufferAttribute::count)
    }

    #[must_use]
    pub fn positions(&self) -> &[f32] {
        self.attribute(POSITION).map_or(&[], BufferAttribute::array)
    }

    #[must_use]
    pub fn normals(&self) -> Option<&[f32]> {
        self.attribute(NORMAL).map(BufferAttribute::array)
    }

    /// Reads vertex `index` of the position attribute in double precision.
    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<Point3> {
        let offset = index.checked_mul(3)?;
        let chunk = self.positions().get(offset..offset + 3)?;
        Some(Point3::new(
            f64::from(chunk[0]),
            f64::from(chunk[1]),
            f64::from(chunk[2]),
        ))
    }

    /// Version of the position attribute, `None` when there is none.
    #[must_use]
    pub fn position_version(&self) -> Option<u32> {
        self.attribute(POSITION).map(BufferAttribute::version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_packs_positions() {
        let geometry =
            BufferGeometry::from_points(&[Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]);
        assert_eq!(geometry.vertex_count(), 2);
        assert_eq!(geometry.positions(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(geometry.normals().is_none());
        assert!(geometry.index().is_none());
    }

    #[test]
    fn from_mesh_keeps_index_and_normals() {
        let mesh = GeomMesh::with_vertex_normals(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2],
        );
        let geometry = BufferGeometry::from_mesh(&mesh);
        assert_eq!(geometry.index(), Some(&[0, 1, 2][..]));
        assert_eq!(geometry.normals().map(<[f32]>::len), Some(9));
        assert_eq!(geometry.attribute_names(), vec![NORMAL, POSITION]);
    }

    #[test]
    fn mark_needs_update_bumps_version() {
        let mut attribute = BufferAttribute::new(vec![0.0; 3], 3);
        assert_eq!(attribute.version(), 0);
        attribute.mark_needs_update();
        attribute.mark_needs_update();
        assert_eq!(attribute.version(), 2);
    }

    #[test]
    fn attribute_pair_mut_splits_borrows() {
        let mut geometry = BufferGeometry::from_points(&[Point3::ORIGIN]);
        geometry.set_attribute(NORMAL, BufferAttribute::new(vec![0.0, 1.0, 0.0], 3));

        let (positions, normals) = geometry.attribute_pair_mut(POSITION, NORMAL);
        let positions = positions.expect("position attribute");
        let normals = normals.expect("normal attribute");
        positions.array_mut()[1] = normals.array()[1];

        assert_eq!(geometry.position_at(0), Some(Point3::new(0.0, 1.0, 0.0)));
        assert!(matches!(
            geometry.attribute_pair_mut(POSITION, POSITION),
            (None, None)
        ));
    }
}
