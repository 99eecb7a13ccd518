mod buffer;
mod core;
mod curve;
mod displacement;
mod mesh;
mod metrics;
mod ribbon;

pub use buffer::{BufferAttribute, BufferGeometry, NORMAL, POSITION};
pub use self::core::{Point3, Tolerance, Vec3};
pub use curve::{
    CONTROL_POINT_COUNT, CatmullRom3, CatmullRomType, ControlPointSet, Curve3, CurveError,
    CurveSamples, control_points_for, sample_control_points, sample_curve,
};
pub use displacement::{
    DisplacedVertex, DisplacementDiagnostics, DisplacementError, displace_first_vertex,
    displace_vertex_along_normal,
};
pub use mesh::GeomMesh;
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use ribbon::{
    Connectors, LineSegment, QUAD_INDICES, RibbonError, SurfacePatch, build_connectors,
    build_connectors_with_metrics,
};

#[cfg(test)]
mod tests;
