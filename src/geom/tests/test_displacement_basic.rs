//! Tests for in-place vertex displacement.

use crate::geom::{
    BufferAttribute, BufferGeometry, DisplacementError, NORMAL, POSITION, Point3, SurfacePatch,
    Tolerance, displace_first_vertex, displace_vertex_along_normal,
};

/// Flat patch in the XZ plane; every normal is +Y.
fn make_patch_geometry() -> BufferGeometry {
    let patch = SurfacePatch::new([
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 0.0),
    ]);
    BufferGeometry::from_mesh(patch.mesh())
}

#[test]
fn first_vertex_moves_along_its_normal() {
    let tol = Tolerance::new(1e-6);
    let mut geometry = make_patch_geometry();

    let moved = displace_first_vertex(&mut geometry, 0.1).expect("displace");
    assert_eq!(moved.index, 0);
    assert!(tol.approx_eq_point3(moved.after, Point3::new(0.0, 0.1, 0.0)));
    assert!(tol.approx_eq_point3(
        geometry.position_at(0).expect("vertex 0"),
        Point3::new(0.0, 0.1, 0.0)
    ));
    assert!((moved.shift() - 0.1).abs() < 1e-6);
}

#[test]
fn only_the_first_vertex_changes() {
    let mut geometry = make_patch_geometry();
    let before = geometry.positions().to_vec();

    displace_first_vertex(&mut geometry, 0.2).expect("displace");
    let after = geometry.positions();

    assert_ne!(before[..3], after[..3]);
    assert_eq!(before[3..], after[3..]);
}

#[test]
fn repeated_displacement_accumulates() {
    let tol = Tolerance::new(1e-6);
    let mut geometry = make_patch_geometry();

    displace_first_vertex(&mut geometry, 0.1).expect("first");
    displace_first_vertex(&mut geometry, 0.05).expect("second");

    assert!(tol.approx_eq_point3(
        geometry.position_at(0).expect("vertex 0"),
        Point3::new(0.0, 0.15, 0.0)
    ));
}

#[test]
fn zero_offset_keeps_position_but_flags_upload() {
    let mut geometry = make_patch_geometry();
    let version = geometry.position_version().expect("positions");
    let before = geometry.positions().to_vec();

    displace_first_vertex(&mut geometry, 0.0).expect("displace");

    assert_eq!(geometry.positions(), &before[..]);
    assert_eq!(geometry.position_version(), Some(version + 1));
}

#[test]
fn normals_are_left_alone() {
    let mut geometry = make_patch_geometry();
    let normals = geometry.normals().expect("normals").to_vec();
    displace_first_vertex(&mut geometry, 0.25).expect("displace");
    assert_eq!(geometry.normals(), Some(&normals[..]));
}

#[test]
fn missing_normals_are_reported() {
    let mut geometry = BufferGeometry::from_points(&[Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)]);
    let version = geometry.position_version();

    assert_eq!(
        displace_first_vertex(&mut geometry, 0.1),
        Err(DisplacementError::MissingAttribute(NORMAL))
    );
    assert_eq!(geometry.position_version(), version);
}

#[test]
fn out_of_range_vertex_is_rejected() {
    let mut geometry = make_patch_geometry();
    assert_eq!(
        displace_vertex_along_normal(&mut geometry, 4, 0.1),
        Err(DisplacementError::VertexOutOfRange { index: 4, count: 4 })
    );
}

#[test]
fn two_component_positions_are_rejected() {
    let mut geometry = BufferGeometry::new();
    geometry.set_attribute(POSITION, BufferAttribute::new(vec![0.0, 0.0], 2));
    geometry.set_attribute(NORMAL, BufferAttribute::new(vec![0.0, 1.0, 0.0], 3));

    assert_eq!(
        displace_first_vertex(&mut geometry, 0.1),
        Err(DisplacementError::InvalidItemSize {
            name: POSITION,
            item_size: 2
        })
    );
}
