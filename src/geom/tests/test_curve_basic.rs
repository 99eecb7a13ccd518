use crate::geom::{
    CatmullRom3, CatmullRomType, Curve3, CurveError, Point3, Tolerance, control_points_for,
    sample_control_points,
};

#[test]
fn sampling_yields_point_count_plus_one_points() {
    let set = control_points_for(0, 5.0);
    for point_count in [1, 4, 10, 20] {
        assert_eq!(sample_control_points(&set, point_count).len(), point_count + 1);
    }
}

#[test]
fn samples_start_and_end_on_control_points() {
    let tol = Tolerance::default_geom();
    let set = control_points_for(2, 3.0);
    let points = sample_control_points(&set, 10);
    let controls = set.points();

    assert!(tol.approx_eq_point3(points[0], controls[0]));
    assert!(tol.approx_eq_point3(points[10], controls[4]));
}

#[test]
fn curve_passes_through_interior_control_points() {
    let tol = Tolerance::new(1e-9);
    let set = control_points_for(0, 1.0);
    let curve = CatmullRom3::from_control_points(&set);
    let controls = set.points();

    // Four segments, so control point k sits at t = k / 4.
    for (k, control) in controls.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let t = k as f64 / 4.0;
        assert!(
            tol.approx_eq_point3(curve.point_at(t), *control),
            "control point {k} missed"
        );
    }
}

#[test]
fn sampling_is_deterministic() {
    let set = control_points_for(3, 7.0);
    let a = sample_control_points(&set, 13);
    let b = sample_control_points(&set, 13);
    assert_eq!(a, b);
}

#[test]
fn lazy_samples_can_be_replayed() {
    let curve = CatmullRom3::from_control_points(&control_points_for(1, 5.0));
    let mut samples = curve.samples(6);
    assert_eq!(samples.len(), 7);

    let replay = samples.clone();
    let first: Vec<Point3> = samples.by_ref().collect();
    assert_eq!(samples.next(), None);

    samples.restart();
    let second: Vec<Point3> = samples.collect();
    let third: Vec<Point3> = replay.collect();
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn control_points_shift_along_z_only() {
    let base = control_points_for(0, 5.0).points();
    let shifted = control_points_for(3, 5.0).points();
    for (a, b) in base.iter().zip(shifted.iter()) {
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        assert!((b.z - a.z - 15.0).abs() < 1e-12);
    }
    assert_eq!(base[1], Point3::new(-5.0, 5.0, 5.0));
    assert_eq!(base[4], Point3::new(10.0, 0.0, 20.0));
}

#[test]
fn curve_types_agree_on_evenly_spaced_points() {
    let points: Vec<Point3> = (0..4)
        .map(|i| Point3::new(f64::from(i), 0.0, 0.0))
        .collect();
    let tol = Tolerance::new(1e-9);
    let centripetal = CatmullRom3::new(points.clone()).expect("valid points");
    let chordal = CatmullRom3::new(points.clone())
        .expect("valid points")
        .with_type(CatmullRomType::Chordal);
    let uniform = CatmullRom3::new(points)
        .expect("valid points")
        .with_type(CatmullRomType::Uniform);

    for t in [0.0, 0.2, 0.5, 0.9, 1.0] {
        let expected = Point3::new(3.0 * t, 0.0, 0.0);
        assert!(tol.approx_eq_point3(centripetal.point_at(t), expected));
        assert!(tol.approx_eq_point3(chordal.point_at(t), expected));
        assert!(tol.approx_eq_point3(uniform.point_at(t), expected));
    }
}

#[test]
fn construction_rejects_degenerate_input() {
    assert_eq!(
        CatmullRom3::new(vec![Point3::ORIGIN]),
        Err(CurveError::NotEnoughPoints { count: 1 })
    );
    assert_eq!(
        CatmullRom3::new(vec![Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)]),
        Err(CurveError::NonFinitePoint { index: 1 })
    );
}
