//! Opbouw en afbraak van de ribbon-scene.
//!
//! De assembler houdt vier lijsten bij: curve-records, curve-outlines,
//! oppervlakken en verbindingslijnen. Een rebuild haalt eerst alles los
//! (`TearingDown`) en bouwt daarna de nieuwe generatie op (`Rebuilding`);
//! pas daarna keert de toestand terug naar `Idle`.

use serde::Serialize;

use super::primitive::{LinePrimitive, MeshPrimitive};
use super::{PrimitiveId, SceneGraph};
use crate::config::MaterialConfig;
use crate::geom::{
    CatmullRom3, DisplacementDiagnostics, GeomMetrics, GeomTimingReport, Point3, RibbonError,
    TimingBucket, build_connectors_with_metrics, control_points_for, displace_first_vertex,
};
use crate::params::ParameterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AssemblerState {
    #[default]
    Idle,
    TearingDown,
    Rebuilding,
}

/// Een curve van de huidige generatie met zijn samples.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRecord {
    pub index: usize,
    pub curve: CatmullRom3,
    pub samples: Vec<Point3>,
}

/// Samenvatting van één rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RebuildReport {
    pub curve_count: usize,
    pub point_count: usize,
    pub outline_count: usize,
    pub surface_count: usize,
    pub connector_count: usize,
    /// Primitieven die tijdens de afbraak zijn losgehaald.
    pub detached_count: usize,
    /// Ids uit de lijsten die de scene al niet meer kende.
    pub missing_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<GeomTimingReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("curve {index}: {source}")]
    Ribbon {
        index: usize,
        #[source]
        source: RibbonError,
    },
}

#[derive(Debug, Default)]
pub struct SceneAssembler {
    state: AssemblerState,
    curves: Vec<CurveRecord>,
    outline_meshes: Vec<PrimitiveId>,
    surfaces: Vec<PrimitiveId>,
    connector_lines: Vec<PrimitiveId>,
    metrics: GeomMetrics,
}

impl SceneAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> AssemblerState {
        self.state
    }

    #[must_use]
    pub fn curves(&self) -> &[CurveRecord] {
        &self.curves
    }

    #[must_use]
    pub fn outline_meshes(&self) -> &[PrimitiveId] {
        &self.outline_meshes
    }

    #[must_use]
    pub fn surfaces(&self) -> &[PrimitiveId] {
        &self.surfaces
    }

    #[must_use]
    pub fn connector_lines(&self) -> &[PrimitiveId] {
        &self.connector_lines
    }

    /// Alle ids uit de drie primitieflijsten.
    pub fn attached_ids(&self) -> impl Iterator<Item = PrimitiveId> + '_ {
        self.outline_meshes
            .iter()
            .chain(&self.surfaces)
            .chain(&self.connector_lines)
            .copied()
    }

    /// Haalt elk primitief uit de lijsten los en leegt alle vier de lijsten.
    ///
    /// Geeft `(losgehaald, ontbrekend)` terug.
    pub fn teardown(&mut self, scene: &mut impl SceneGraph) -> (usize, usize) {
        self.state = AssemblerState::TearingDown;

        let ids: Vec<PrimitiveId> = self.attached_ids().collect();
        let (detached, missing) = self.metrics.time(TimingBucket::Teardown, || {
            ids.iter().fold((0, 0), |(detached, missing), id| {
                if scene.detach(*id).is_some() {
                    (detached + 1, missing)
                } else {
                    (detached, missing + 1)
                }
            })
        });
        if missing > 0 {
            log::warn!("teardown: {missing} primitives were no longer attached");
        }

        self.curves.clear();
        self.outline_meshes.clear();
        self.surfaces.clear();
        self.connector_lines.clear();
        self.state = AssemblerState::Idle;
        (detached, missing)
    }

    /// Vervangt de volledige vorige generatie door een nieuwe voor `params`.
    pub fn rebuild(
        &mut self,
        scene: &mut impl SceneGraph,
        params: &ParameterState,
        materials: &MaterialConfig,
    ) -> Result<RebuildReport, SceneError> {
        self.metrics.begin();
        let (detached_count, missing_count) = self.teardown(scene);

        self.state = AssemblerState::Rebuilding;
        let result = self.build_generation(scene, params, materials);
        self.state = AssemblerState::Idle;
        result?;

        debug_assert!(self.attached_ids().all(|id| scene.contains(id)));

        let report = RebuildReport {
            curve_count: self.curves.len(),
            point_count: params.point_count(),
            outline_count: self.outline_meshes.len(),
            surface_count: self.surfaces.len(),
            connector_count: self.connector_lines.len(),
            detached_count,
            missing_count,
            timing: self.metrics.end(),
        };
        log::debug!(
            "rebuild: {} curves, {} surfaces, {} connectors ({} detached)",
            report.curve_count,
            report.surface_count,
            report.connector_count,
            report.detached_count
        );
        Ok(report)
    }

    fn build_generation(
        &mut self,
        scene: &mut impl SceneGraph,
        params: &ParameterState,
        materials: &MaterialConfig,
    ) -> Result<(), SceneError> {
        let point_count = params.point_count();

        for index in 0..params.curve_count() {
            let control_points = control_points_for(index, params.curve_separation());
            let curve = CatmullRom3::from_control_points(&control_points);
            let samples = self
                .metrics
                .time(TimingBucket::CurveSampling, || curve.sample_points(point_count));

            let outline = LinePrimitive::outline(&samples, materials);
            let outline_id = self
                .metrics
                .time(TimingBucket::Attach, || scene.attach(outline.into()));
            self.outline_meshes.push(outline_id);

            if let Some(previous) = self.curves.last() {
                // Vorige rij opnieuw samplen op de huidige resolutie.
                let prev_samples = self.metrics.time(TimingBucket::CurveSampling, || {
                    previous.curve.sample_points(point_count)
                });
                let connectors =
                    build_connectors_with_metrics(&prev_samples, &samples, &mut self.metrics)
                        .map_err(|source| SceneError::Ribbon { index, source })?;

                let (lines, surfaces) = (&mut self.connector_lines, &mut self.surfaces);
                self.metrics.time(TimingBucket::Attach, || {
                    lines.extend(connectors.lines.iter().map(|segment| {
                        scene.attach(LinePrimitive::connector(segment, materials).into())
                    }));
                    surfaces.extend(connectors.surfaces.iter().map(|patch| {
                        scene.attach(MeshPrimitive::surface(patch, materials).into())
                    }));
                });
            }

            self.curves.push(CurveRecord {
                index,
                curve,
                samples,
            });
        }
        Ok(())
    }

    /// Verschuift vertex 0 van elk aangehangen oppervlak langs zijn normaal.
    ///
    /// Oppervlakken die de scene niet meer kent of die geen bruikbare buffers
    /// hebben worden overgeslagen en geteld.
    pub fn displace(&mut self, scene: &mut impl SceneGraph, offset: f64) -> DisplacementDiagnostics {
        self.metrics.begin();
        let mut diagnostics = DisplacementDiagnostics::new(offset);
        let surfaces = &self.surfaces;

        self.metrics.time(TimingBucket::Displacement, || {
            for id in surfaces {
                let Some(primitive) = scene.primitive_mut(*id) else {
                    diagnostics.skip(format!("surface {} is no longer attached", id.0));
                    continue;
                };
                let Some(mesh) = primitive.as_mesh_mut() else {
                    diagnostics.skip(format!("surface {} is not a mesh", id.0));
                    continue;
                };
                match displace_first_vertex(&mut mesh.geometry, offset) {
                    Ok(vertex) => diagnostics.record(&vertex),
                    Err(err) => diagnostics.skip(format!("surface {}: {err}", id.0)),
                }
            }
        });

        if !diagnostics.is_clean() {
            log::warn!(
                "displacement skipped {} of {} surfaces",
                diagnostics.skipped_surface_count,
                self.surfaces.len()
            );
        }
        log::debug!(
            "displacement: offset {offset}, {} surfaces moved",
            diagnostics.displaced_surface_count
        );
        diagnostics
    }

    /// `true` als de lijsten en de scene precies dezelfde primitieven bevatten.
    #[must_use]
    pub fn is_consistent_with(&self, scene: &impl SceneGraph) -> bool {
        let mut ids: Vec<PrimitiveId> = self.attached_ids().collect();
        ids.sort_unstable();
        ids == scene.ids() && self.curves.len() == self.outline_meshes.len()
    }
}
