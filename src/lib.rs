#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod geom;
pub mod params;
pub mod scene;

use std::collections::BTreeMap;
use std::fmt;

use config::{ConfigError, EngineConfig, color_to_rgb};
use geom::{DisplacementDiagnostics, NORMAL};
use params::{
    ParameterChange, ParameterChangeListener, ParameterError, ParameterExport, ParameterPanel,
    ParameterState,
};
use scene::{
    AssemblerState, Primitive, PrimitiveId, RebuildReport, RetainedScene, SceneAssembler,
    SceneError, SceneGraph,
};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten die de engine naar buiten doorgeeft.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("ongeldige configuratie: {0}")]
    Config(#[from] ConfigError),
    #[error("configuratie kon niet gelezen worden: {0}")]
    ConfigDecode(String),
}

/// Verschil in scene-inhoud sinds de vorige `get_geometry`-aanroep.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct GeometryDiff {
    pub added: Vec<GeometryDiffItem>,
    pub updated: Vec<GeometryDiffItem>,
    pub removed: Vec<usize>,
}

impl GeometryDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryDiffItem {
    pub id: usize,
    pub item: GeometryItem,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MaterialExport {
    pub color: [f64; 3],
    pub double_sided: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum GeometryItem {
    Line {
        points: Vec<[f64; 3]>,
        color: [f64; 3],
    },
    Mesh {
        vertices: Vec<[f64; 3]>,
        normals: Vec<[f64; 3]>,
        faces: Vec<[u32; 3]>,
        material: MaterialExport,
    },
}

impl From<&Primitive> for GeometryItem {
    fn from(primitive: &Primitive) -> Self {
        match primitive {
            Primitive::Line(line) => GeometryItem::Line {
                points: unpack_vec3(line.geometry.positions()),
                color: line.material.rgb(),
            },
            Primitive::Mesh(mesh) => GeometryItem::Mesh {
                vertices: unpack_vec3(mesh.geometry.positions()),
                normals: mesh
                    .geometry
                    .attribute(NORMAL)
                    .map(|normals| unpack_vec3(normals.array()))
                    .unwrap_or_default(),
                faces: mesh
                    .geometry
                    .index()
                    .unwrap_or_default()
                    .chunks_exact(3)
                    .map(|tri| [tri[0], tri[1], tri[2]])
                    .collect(),
                material: MaterialExport {
                    color: color_to_rgb(mesh.material.color),
                    double_sided: mesh.material.double_sided,
                },
            },
        }
    }
}

fn unpack_vec3(values: &[f32]) -> Vec<[f64; 3]> {
    values
        .chunks_exact(3)
        .map(|chunk| {
            [
                f64::from(chunk[0]),
                f64::from(chunk[1]),
                f64::from(chunk[2]),
            ]
        })
        .collect()
}

/// Tellingen en diagnostiek voor de host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub state: AssemblerState,
    pub curve_count: usize,
    pub outline_count: usize,
    pub surface_count: usize,
    pub connector_count: usize,
    pub scene_primitive_count: usize,
    pub parameters: ParameterState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rebuild: Option<RebuildReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_displacement: Option<DisplacementDiagnostics>,
}

/// Publiek toegangspunt voor de host-pagina.
#[wasm_bindgen]
pub struct RibbonEngine {
    config: EngineConfig,
    panel: ParameterPanel,
    scene: RetainedScene,
    assembler: SceneAssembler,
    last_rebuild: Option<RebuildReport>,
    last_displacement: Option<DisplacementDiagnostics>,
    exported_versions: BTreeMap<PrimitiveId, Option<u32>>,
}

#[wasm_bindgen]
impl RibbonEngine {
    /// Maak een engine met de standaardconfiguratie en bouw de eerste scene op.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<RibbonEngine, JsValue> {
        Self::from_config(EngineConfig::default()).map_err(to_js_error)
    }

    /// Maak een engine met een (gedeeltelijke) configuratie van de host.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<RibbonEngine, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| to_js_error(EngineError::ConfigDecode(err.to_string())))?
        };
        Self::from_config(config).map_err(to_js_error)
    }

    /// Haal slider-specificaties op voor UI-generatie.
    #[wasm_bindgen]
    pub fn get_parameters(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.parameters())
    }

    /// Stel een parameter in op basis van naam; triggert rebuild of verschuiving.
    #[wasm_bindgen]
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        if !value.is_finite() {
            return Err(js_error("parameterwaarde moet een eindig getal zijn"));
        }
        debug_log!("set_parameter {name} = {value}");
        self.apply_parameter(name, value)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Bouw de scene opnieuw op met de huidige parameters.
    #[wasm_bindgen]
    pub fn rebuild(&mut self) -> Result<(), JsValue> {
        self.rebuild_scene().map(|_| ()).map_err(to_js_error)
    }

    /// Haalt de geometrie op in een "diff" formaat.
    #[wasm_bindgen]
    pub fn get_geometry(&mut self) -> Result<JsValue, JsValue> {
        let diff = self.geometry_diff();
        to_js_value(&diff)
    }

    #[wasm_bindgen]
    pub fn get_viewer_config(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.config)
    }

    #[wasm_bindgen]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.stats())
    }
}

impl RibbonEngine {
    /// Valideert `config`, maakt de engine en voert de eerste rebuild uit.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut engine = Self {
            config,
            panel: ParameterPanel::new(),
            scene: RetainedScene::new(),
            assembler: SceneAssembler::new(),
            last_rebuild: None,
            last_displacement: None,
            exported_versions: BTreeMap::new(),
        };
        engine.rebuild_scene()?;
        Ok(engine)
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn parameter_state(&self) -> &ParameterState {
        self.panel.state()
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterExport> {
        self.panel.exports()
    }

    #[must_use]
    pub const fn scene(&self) -> &RetainedScene {
        &self.scene
    }

    #[must_use]
    pub const fn assembler(&self) -> &SceneAssembler {
        &self.assembler
    }

    /// Zet een parameter en voert de bijbehorende rebuild of verschuiving synchroon uit.
    pub fn apply_parameter(&mut self, name: &str, value: f64) -> Result<ParameterChange, EngineError> {
        let mut dispatch = SceneDispatch {
            scene: &mut self.scene,
            assembler: &mut self.assembler,
            config: &self.config,
            outcome: None,
        };
        let change = self.panel.set(name, value, &mut dispatch)?;

        match dispatch.outcome {
            Some(DispatchOutcome::Rebuilt(report)) => self.last_rebuild = Some(report?),
            Some(DispatchOutcome::Displaced(diagnostics)) => {
                self.last_displacement = Some(diagnostics);
            }
            None => {}
        }
        Ok(change)
    }

    pub fn rebuild_scene(&mut self) -> Result<&RebuildReport, EngineError> {
        let report = self.assembler.rebuild(
            &mut self.scene,
            self.panel.state(),
            &self.config.materials,
        )?;
        let report: &RebuildReport = self.last_rebuild.insert(report);
        Ok(report)
    }

    /// Verschuif alle oppervlakken met de huidige `yOffset`.
    pub fn displace(&mut self) -> &DisplacementDiagnostics {
        let offset = self.panel.state().y_offset();
        let diagnostics = self.assembler.displace(&mut self.scene, offset);
        self.last_displacement.insert(diagnostics)
    }

    /// Vergelijkt de scene met wat eerder is geëxporteerd.
    ///
    /// Primitieven waarvan de positieversie is opgehoogd komen onder `updated`.
    pub fn geometry_diff(&mut self) -> GeometryDiff {
        let mut diff = GeometryDiff::default();
        let mut next_versions = BTreeMap::new();

        for (id, primitive) in self.scene.iter() {
            let version = primitive.geometry().position_version();
            let item = || GeometryDiffItem {
                id: id.0,
                item: GeometryItem::from(primitive),
            };
            match self.exported_versions.get(&id) {
                None => diff.added.push(item()),
                Some(previous) if *previous != version => diff.updated.push(item()),
                Some(_) => {}
            }
            next_versions.insert(id, version);
        }

        diff.removed = self
            .exported_versions
            .keys()
            .filter(|id| !next_versions.contains_key(*id))
            .map(|id| id.0)
            .collect();

        self.exported_versions = next_versions;
        diff
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            state: self.assembler.state(),
            curve_count: self.assembler.curves().len(),
            outline_count: self.assembler.outline_meshes().len(),
            surface_count: self.assembler.surfaces().len(),
            connector_count: self.assembler.connector_lines().len(),
            scene_primitive_count: self.scene.len(),
            parameters: *self.panel.state(),
            last_rebuild: self.last_rebuild.clone(),
            last_displacement: self.last_displacement.clone(),
        }
    }
}

enum DispatchOutcome {
    Rebuilt(Result<RebuildReport, SceneError>),
    Displaced(DisplacementDiagnostics),
}

/// Verbindt paneelwijzigingen met de assembler.
struct SceneDispatch<'a> {
    scene: &'a mut RetainedScene,
    assembler: &'a mut SceneAssembler,
    config: &'a EngineConfig,
    outcome: Option<DispatchOutcome>,
}

impl ParameterChangeListener for SceneDispatch<'_> {
    fn on_topology_change(&mut self, state: &ParameterState) {
        let report = self
            .assembler
            .rebuild(&mut *self.scene, state, &self.config.materials);
        self.outcome = Some(DispatchOutcome::Rebuilt(report));
    }

    fn on_displacement_change(&mut self, offset: f64) {
        let diagnostics = self.assembler.displace(&mut *self.scene, offset);
        self.outcome = Some(DispatchOutcome::Displaced(diagnostics));
    }
}

fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RibbonEngine {
        RibbonEngine::from_config(EngineConfig::default()).expect("default config")
    }

    #[test]
    fn first_diff_adds_everything_then_settles() {
        let mut engine = engine();
        let diff = engine.geometry_diff();
        assert_eq!(diff.added.len(), engine.scene().len());
        assert!(diff.updated.is_empty());
        assert!(diff.removed.is_empty());

        assert!(engine.geometry_diff().is_empty());
    }

    #[test]
    fn displacement_reports_surfaces_as_updated() {
        let mut engine = engine();
        let _ = engine.geometry_diff();

        engine.apply_parameter("yOffset", 0.1).expect("known parameter");
        let diff = engine.geometry_diff();
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.updated.len(), engine.assembler().surfaces().len());
        assert!(
            diff.updated
                .iter()
                .all(|entry| matches!(entry.item, GeometryItem::Mesh { .. }))
        );
    }

    #[test]
    fn rebuild_replaces_every_exported_primitive() {
        let mut engine = engine();
        let before = engine.geometry_diff().added.len();

        engine.apply_parameter("pointCount", 4.0).expect("known parameter");
        let diff = engine.geometry_diff();
        assert_eq!(diff.removed.len(), before);
        assert_eq!(diff.added.len(), engine.scene().len());
    }

    #[test]
    fn mesh_items_carry_faces_and_material() {
        let mut engine = engine();
        let diff = engine.geometry_diff();
        let mesh = diff
            .added
            .iter()
            .find_map(|entry| match &entry.item {
                GeometryItem::Mesh {
                    vertices,
                    normals,
                    faces,
                    material,
                } => Some((vertices.len(), normals.len(), faces.clone(), material.clone())),
                GeometryItem::Line { .. } => None,
            })
            .expect("default scene has surfaces");

        assert_eq!(mesh.0, 4);
        assert_eq!(mesh.1, 4);
        assert_eq!(mesh.2, vec![[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.3.double_sided);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.camera.fov = 0.0;
        assert!(matches!(
            RibbonEngine::from_config(config),
            Err(EngineError::Config(ConfigError::InvalidFov(_)))
        ));
    }

    #[test]
    fn unknown_parameter_leaves_scene_alone() {
        let mut engine = engine();
        let ids = engine.scene().ids();
        assert!(matches!(
            engine.apply_parameter("radius", 2.0),
            Err(EngineError::Parameter(ParameterError::Unknown(_)))
        ));
        assert_eq!(engine.scene().ids(), ids);
    }
}
