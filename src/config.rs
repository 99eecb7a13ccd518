//! Viewer configuration handed to the host renderer.
//!
//! The engine never renders itself; camera, lights, helpers and material
//! colours are passed through to the host page. Every field has a default, so
//! a host may pass a partial object (or nothing at all).

use serde::{Deserialize, Serialize};

/// Largest valid `0xRRGGBB` colour.
pub const MAX_COLOR: u32 = 0x00ff_ffff;

/// Splits a `0xRRGGBB` colour into linear `[r, g, b]` components in `0..=1`.
#[must_use]
pub fn color_to_rgb(color: u32) -> [f64; 3] {
    let channel = |shift: u32| f64::from((color >> shift) & 0xff) / 255.0;
    [channel(16), channel(8), channel(0)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub background: u32,
    pub camera: CameraConfig,
    pub ambient_light: AmbientLightConfig,
    pub directional_light: DirectionalLightConfig,
    pub grid: GridConfig,
    pub controls: OrbitControlsConfig,
    pub materials: MaterialConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            background: 0xffffff,
            camera: CameraConfig::default(),
            ambient_light: AmbientLightConfig::default(),
            directional_light: DirectionalLightConfig::default(),
            grid: GridConfig::default(),
            controls: OrbitControlsConfig::default(),
            materials: MaterialConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub position: [f64; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 50.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightConfig {
    pub color: u32,
    pub intensity: f64,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: u32,
    pub intensity: f64,
    pub position: [f64; 3],
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 0.5,
            position: [5.0, 5.0, 5.0],
            cast_shadow: true,
            shadow: ShadowConfig::default(),
        }
    }
}

/// Orthographic shadow camera of the directional light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_width: u32,
    pub map_height: u32,
    pub near: f64,
    pub far: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_width: 1024,
            map_height: 1024,
            near: 0.5,
            far: 50.0,
            left: -10.0,
            right: 10.0,
            top: 10.0,
            bottom: -10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: f64,
    pub divisions: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            divisions: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub screen_space_panning: bool,
}

impl Default for OrbitControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.25,
            screen_space_panning: false,
        }
    }
}

/// Colours of the three primitive families the assembler attaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub outline_color: u32,
    pub connector_color: u32,
    pub surface_color: u32,
    pub surface_double_sided: bool,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            outline_color: 0xff0000,
            connector_color: 0x0000ff,
            surface_color: 0x888888,
            surface_double_sided: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("camera field of view must lie in (0, 180), got {0}")]
    InvalidFov(f64),
    #[error("camera clipping planes must satisfy 0 < near < far, got near {near}, far {far}")]
    InvalidClipping { near: f64, far: f64 },
    #[error("colour `{field}` exceeds 0xffffff: {value:#x}")]
    InvalidColor { field: &'static str, value: u32 },
    #[error("grid needs at least one division")]
    EmptyGrid,
    #[error("damping factor must lie in [0, 1], got {0}")]
    InvalidDamping(f64),
}

impl EngineConfig {
    /// Checks the values the host cannot sensibly recover from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov = self.camera.fov;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::InvalidFov(fov));
        }

        let (near, far) = (self.camera.near, self.camera.far);
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(ConfigError::InvalidClipping { near, far });
        }

        let colors = [
            ("background", self.background),
            ("ambient_light.color", self.ambient_light.color),
            ("directional_light.color", self.directional_light.color),
            ("materials.outline_color", self.materials.outline_color),
            ("materials.connector_color", self.materials.connector_color),
            ("materials.surface_color", self.materials.surface_color),
        ];
        if let Some((field, value)) = colors.into_iter().find(|(_, value)| *value > MAX_COLOR) {
            return Err(ConfigError::InvalidColor { field, value });
        }

        if self.grid.divisions == 0 {
            return Err(ConfigError::EmptyGrid);
        }

        let damping = self.controls.damping_factor;
        if !(0.0..=1.0).contains(&damping) {
            return Err(ConfigError::InvalidDamping(damping));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_setup() {
        let config = EngineConfig::default();
        assert_eq!(config.camera.position, [0.0, 0.0, 50.0]);
        assert_eq!(config.directional_light.shadow.map_width, 1024);
        assert_eq!(config.materials.outline_color, 0xff0000);
        assert!(config.materials.surface_double_sided);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "camera": { "fov": 60 }, "materials": { "surface_color": 65280 } }"#)
                .expect("valid config");
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.far, 1000.0);
        assert_eq!(config.materials.surface_color, 0x00ff00);
        assert_eq!(config.materials.connector_color, 0x0000ff);
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn splits_colours_into_channels() {
        assert_eq!(color_to_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(color_to_rgb(0x0000ff), [0.0, 0.0, 1.0]);
        let grey = color_to_rgb(0x888888);
        assert!((grey[1] - 136.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn validation_rejects_broken_values() {
        let mut config = EngineConfig::default();
        config.camera.near = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidClipping { .. })));

        let mut config = EngineConfig::default();
        config.materials.surface_color = 0x0100_0000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidColor {
                field: "materials.surface_color",
                value: 0x0100_0000
            })
        );

        let mut config = EngineConfig::default();
        config.grid.divisions = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyGrid));
    }
}
