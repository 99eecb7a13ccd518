use crate::geom::{
    BufferGeometry, Point3, QUAD_INDICES, SurfacePatch, Tolerance, build_connectors,
    control_points_for, sample_control_points,
};

fn unit_quad() -> [Point3; 4] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 0.0),
    ]
}

#[test]
fn rows_of_n_samples_give_n_lines_and_n_minus_one_patches() {
    let prev = sample_control_points(&control_points_for(0, 5.0), 4);
    let curr = sample_control_points(&control_points_for(1, 5.0), 4);
    let connectors = build_connectors(&prev, &curr).expect("equal rows");

    assert_eq!(connectors.lines.len(), 5);
    assert_eq!(connectors.surfaces.len(), 4);
}

#[test]
fn lines_join_matching_samples() {
    let prev = sample_control_points(&control_points_for(0, 2.0), 3);
    let curr = sample_control_points(&control_points_for(1, 2.0), 3);
    let connectors = build_connectors(&prev, &curr).expect("equal rows");

    for (j, line) in connectors.lines.iter().enumerate() {
        assert_eq!(line.start, prev[j]);
        assert_eq!(line.end, curr[j]);
        assert!((line.length() - 2.0).abs() < 1e-9);
    }
}

#[test]
fn patches_follow_winding_order() {
    let prev = sample_control_points(&control_points_for(0, 5.0), 2);
    let curr = sample_control_points(&control_points_for(1, 5.0), 2);
    let connectors = build_connectors(&prev, &curr).expect("equal rows");

    for (j, patch) in connectors.surfaces.iter().enumerate() {
        assert_eq!(
            patch.corners(),
            &[prev[j], curr[j], curr[j + 1], prev[j + 1]]
        );
        assert_eq!(patch.mesh().indices, QUAD_INDICES.to_vec());
        patch.mesh().validate().expect("valid patch mesh");
    }
}

#[test]
fn flat_quad_normals_point_up() {
    let tol = Tolerance::default_geom();
    let patch = SurfacePatch::new(unit_quad());
    for index in 0..4 {
        let normal = patch.normal_at(index).expect("normal per corner");
        assert!(tol.approx_eq_point3(normal.into(), Point3::new(0.0, 1.0, 0.0)));
    }
    assert_eq!(patch.normal_at(4), None);
}

#[test]
fn patch_uploads_as_indexed_buffer_geometry() {
    let patch = SurfacePatch::new(unit_quad());
    let geometry = BufferGeometry::from_mesh(patch.mesh());

    assert_eq!(geometry.vertex_count(), 4);
    assert_eq!(geometry.index(), Some(&QUAD_INDICES[..]));
    assert_eq!(geometry.normals().map(<[f32]>::len), Some(12));
    assert_eq!(geometry.position_at(2), Some(Point3::new(1.0, 0.0, 1.0)));
}
