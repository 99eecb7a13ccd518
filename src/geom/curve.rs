use std::iter::FusedIterator;

use super::core::Point3;

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_closed(&self) -> bool {
        false
    }
}

/// Errors raised while constructing curves from raw point lists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("curve requires at least 2 control points, got {count}")]
    NotEnoughPoints { count: usize },
    #[error("control point {index} contains non-finite coordinates")]
    NonFinitePoint { index: usize },
    #[error("tension must be finite, got {0}")]
    InvalidTension(f64),
}

/// Parameterization used by [`CatmullRom3`] between neighbouring control points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CatmullRomType {
    /// Knot spacing proportional to the square root of the chord length.
    #[default]
    Centripetal,
    /// Knot spacing proportional to the chord length.
    Chordal,
    /// Uniform knots, tangents scaled by the curve tension.
    Uniform,
}

impl CatmullRomType {
    /// Exponent applied to squared chord lengths when computing knot intervals.
    const fn squared_distance_exponent(self) -> Option<f64> {
        match self {
            Self::Centripetal => Some(0.25),
            Self::Chordal => Some(0.5),
            Self::Uniform => None,
        }
    }
}

/// Interpolating cubic spline through an ordered list of control points.
///
/// The curve passes through every control point and is C¹ continuous. Open
/// curves extrapolate a phantom point past each end by mirroring the
/// neighbouring control point, so the end tangents follow the first and last
/// chords.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRom3 {
    points: Vec<Point3>,
    closed: bool,
    curve_type: CatmullRomType,
    tension: f64,
}

impl CatmullRom3 {
    pub const DEFAULT_TENSION: f64 = 0.5;

    pub fn new(points: Vec<Point3>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::NotEnoughPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFinitePoint { index });
        }

        Ok(Self {
            points,
            closed: false,
            curve_type: CatmullRomType::default(),
            tension: Self::DEFAULT_TENSION,
        })
    }

    /// Builds the curve for one ribbon row.
    ///
    /// Infallible because a [`ControlPointSet`] always holds five finite points.
    #[must_use]
    pub fn from_control_points(control_points: &ControlPointSet) -> Self {
        Self {
            points: control_points.as_slice().to_vec(),
            closed: false,
            curve_type: CatmullRomType::default(),
            tension: Self::DEFAULT_TENSION,
        }
    }

    #[must_use]
    pub const fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    #[must_use]
    pub const fn with_type(mut self, curve_type: CatmullRomType) -> Self {
        self.curve_type = curve_type;
        self
    }

    /// Tension only affects [`CatmullRomType::Uniform`].
    pub fn with_tension(mut self, tension: f64) -> Result<Self, CurveError> {
        if !tension.is_finite() {
            return Err(CurveError::InvalidTension(tension));
        }
        self.tension = tension;
        Ok(self)
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub const fn curve_type(&self) -> CatmullRomType {
        self.curve_type
    }

    /// Lazily samples `divisions + 1` points at evenly spaced parameters.
    #[must_use]
    pub fn samples(&self, divisions: usize) -> CurveSamples<'_, Self> {
        sample_curve(self, divisions)
    }

    /// Eager form of [`samples`](Self::samples).
    #[must_use]
    pub fn sample_points(&self, divisions: usize) -> Vec<Point3> {
        self.samples(divisions).collect()
    }

    /// Picks the four points that drive the segment containing `t` and the
    /// local weight inside that segment.
    fn segment_at(&self, t: f64) -> ([Point3; 4], f64) {
        let points = &self.points;
        let l = points.len();
        let t = t.clamp(0.0, 1.0);

        let span = if self.closed { l } else { l - 1 };
        #[allow(clippy::cast_precision_loss)]
        let p = span as f64 * t;
        #[allow(clippy::cast_possible_truncation)]
        let mut int_point = p.floor() as isize;
        let mut weight = p - p.floor();

        #[allow(clippy::cast_possible_wrap)]
        let len = l as isize;

        if self.closed {
            int_point = int_point.rem_euclid(len);
            if int_point == 0 && t > 0.0 && weight == 0.0 {
                // t == 1 wraps back onto the first point; keep it as the end of the last segment.
                int_point = len - 1;
                weight = 1.0;
            }
        } else if weight == 0.0 && int_point >= len - 1 {
            int_point = len - 2;
            weight = 1.0;
        }

        #[allow(clippy::cast_sign_loss)]
        let at = |index: isize| points[index.rem_euclid(len) as usize];

        let p0 = if self.closed || int_point > 0 {
            at(int_point - 1)
        } else {
            points[0].reflect(points[1])
        };
        let p1 = at(int_point);
        let p2 = at(int_point + 1);
        let p3 = if self.closed || int_point + 2 < len {
            at(int_point + 2)
        } else {
            points[l - 1].reflect(points[l - 2])
        };

        ([p0, p1, p2, p3], weight)
    }
}

impl Curve3 for CatmullRom3 {
    fn point_at(&self, t: f64) -> Point3 {
        let ([p0, p1, p2, p3], weight) = self.segment_at(t);

        let (px, py, pz) = match self.curve_type.squared_distance_exponent() {
            Some(exponent) => {
                let mut dt0 = p0.distance_squared_to(p1).powf(exponent);
                let mut dt1 = p1.distance_squared_to(p2).powf(exponent);
                let mut dt2 = p2.distance_squared_to(p3).powf(exponent);

                // Coincident control points would collapse a knot interval.
                if dt1 < 1e-4 {
                    dt1 = 1.0;
                }
                if dt0 < 1e-4 {
                    dt0 = dt1;
                }
                if dt2 < 1e-4 {
                    dt2 = dt1;
                }

                let knots = [dt0, dt1, dt2];
                (
                    CubicPoly::non_uniform([p0.x, p1.x, p2.x, p3.x], knots),
                    CubicPoly::non_uniform([p0.y, p1.y, p2.y, p3.y], knots),
                    CubicPoly::non_uniform([p0.z, p1.z, p2.z, p3.z], knots),
                )
            }
            None => (
                CubicPoly::uniform([p0.x, p1.x, p2.x, p3.x], self.tension),
                CubicPoly::uniform([p0.y, p1.y, p2.y, p3.y], self.tension),
                CubicPoly::uniform([p0.z, p1.z, p2.z, p3.z], self.tension),
            ),
        };

        Point3::new(px.eval(weight), py.eval(weight), pz.eval(weight))
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Cubic Hermite segment `c0 + c1 t + c2 t² + c3 t³` on `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy)]
struct CubicPoly {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl CubicPoly {
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn uniform([x0, x1, x2, x3]: [f64; 4], tension: f64) -> Self {
        Self::hermite(x1, x2, tension * (x2 - x0), tension * (x3 - x1))
    }

    fn non_uniform([x0, x1, x2, x3]: [f64; 4], [dt0, dt1, dt2]: [f64; 3]) -> Self {
        let t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;

        // Rescale tangents from the [dt0, dt1, dt2] knot space to the unit segment.
        Self::hermite(x1, x2, t1 * dt1, t2 * dt1)
    }

    fn eval(self, t: f64) -> f64 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sampling
// ─────────────────────────────────────────────────────────────────────────────

/// Lazy, finite sequence of points at `t = i / divisions` for `i` in `0..=divisions`.
///
/// Cloning an unconsumed sequence gives an independent replay of the same points.
#[derive(Debug)]
pub struct CurveSamples<'a, C: Curve3> {
    curve: &'a C,
    divisions: usize,
    next: usize,
    end: usize,
}

impl<C: Curve3> Clone for CurveSamples<'_, C> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<C: Curve3> CurveSamples<'_, C> {
    /// Starts the sequence over from the first point.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    #[must_use]
    pub const fn divisions(&self) -> usize {
        self.divisions
    }

    fn parameter(&self, index: usize) -> f64 {
        let (t0, t1) = self.curve.domain();
        #[allow(clippy::cast_precision_loss)]
        let fraction = index as f64 / self.divisions as f64;
        t0 + (t1 - t0) * fraction
    }
}

impl<C: Curve3> Iterator for CurveSamples<'_, C> {
    type Item = Point3;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }
        let t = self.parameter(self.next);
        self.next += 1;
        Some(self.curve.point_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<C: Curve3> ExactSizeIterator for CurveSamples<'_, C> {}

impl<C: Curve3> FusedIterator for CurveSamples<'_, C> {}

/// Samples `divisions + 1` points along `curve`, both endpoints included.
///
/// `divisions` below one is treated as one.
#[must_use]
pub fn sample_curve<C: Curve3>(curve: &C, divisions: usize) -> CurveSamples<'_, C> {
    let divisions = divisions.max(1);
    CurveSamples {
        curve,
        divisions,
        next: 0,
        end: divisions,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Control points
// ─────────────────────────────────────────────────────────────────────────────

/// Number of control points every ribbon curve is built from.
pub const CONTROL_POINT_COUNT: usize = 5;

/// The five control points that shape one curve of the ribbon stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPointSet([Point3; CONTROL_POINT_COUNT]);

impl ControlPointSet {
    #[must_use]
    pub const fn new(points: [Point3; CONTROL_POINT_COUNT]) -> Self {
        Self(points)
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[Point3] {
        &self.0
    }

    #[must_use]
    pub const fn points(&self) -> [Point3; CONTROL_POINT_COUNT] {
        self.0
    }
}

/// Per-point `(x, y, z offset)` profile shared by every curve in the stack.
const CONTROL_PROFILE: [(f64, f64, f64); CONTROL_POINT_COUNT] = [
    (-10.0, 0.0, 0.0),
    (-5.0, 5.0, 5.0),
    (0.0, 0.0, 10.0),
    (5.0, -5.0, 15.0),
    (10.0, 0.0, 20.0),
];

/// Control points for curve `curve_index`, shifted `curve_index * separation` along Z.
#[must_use]
pub fn control_points_for(curve_index: usize, separation: f64) -> ControlPointSet {
    #[allow(clippy::cast_precision_loss)]
    let base_z = curve_index as f64 * separation;
    ControlPointSet(CONTROL_PROFILE.map(|(x, y, dz)| Point3::new(x, y, base_z + dz)))
}

/// Convenience wrapper: build the curve for `control_points` and sample it eagerly.
#[must_use]
pub fn sample_control_points(control_points: &ControlPointSet, point_count: usize) -> Vec<Point3> {
    CatmullRom3::from_control_points(control_points).sample_points(point_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_poly_hits_segment_endpoints() {
        let poly = CubicPoly::non_uniform([0.0, 1.0, 3.0, 4.0], [1.0, 1.5, 1.0]);
        assert!((poly.eval(0.0) - 1.0).abs() < 1e-12);
        assert!((poly.eval(1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn segment_at_end_uses_last_segment() {
        let set = control_points_for(0, 1.0);
        let curve = CatmullRom3::from_control_points(&set);
        let ([_, p1, p2, p3], weight) = curve.segment_at(1.0);
        assert_eq!(weight, 1.0);
        assert_eq!(p1, set.points()[3]);
        assert_eq!(p2, set.points()[4]);
        // Phantom end point mirrors the second to last control point.
        assert_eq!(p3, set.points()[4].reflect(set.points()[3]));
    }

    #[test]
    fn samples_report_exact_size() {
        let curve = CatmullRom3::from_control_points(&control_points_for(2, 5.0));
        let mut samples = curve.samples(4);
        assert_eq!(samples.len(), 5);
        samples.next();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples.by_ref().count(), 4);
        assert_eq!(samples.next(), None);
    }
}
