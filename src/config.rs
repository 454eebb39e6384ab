//! Scene configuration
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```toml
//! [camera]
//! fov_y_degrees = 35.0
//!
//! [assets]
//! model = "assets/portal.obj"
//! environment = [
//!     "hdri/px.png", "hdri/nx.png",
//!     "hdri/py.png", "hdri/ny.png",
//!     "hdri/pz.png", "hdri/nz.png",
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub surface: SurfaceConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub plane: PlaneConfig,
    pub lights: LightsConfig,
    pub assets: AssetsConfig,
}

impl SceneConfig {
    /// Loads a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "vitrine".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Linear RGBA clear colour.
    pub clear_color: [f64; 4],
    pub vsync: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 25.0,
            position: [20.0, 30.0, 40.0],
            target: [0.0, 0.0, 0.0],
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Fraction of the pending motion applied each frame, in `(0, 1]`.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.25,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Added to the shader `time` uniform every frame.
    pub time_step: f32,
    /// WGSL file with a `vs_main` entry point; embedded default if unset.
    pub vertex_shader: Option<PathBuf>,
    /// WGSL file with an `fs_main` entry point; embedded default if unset.
    pub fragment_shader: Option<PathBuf>,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            width: 5.0,
            height: 7.0,
            width_segments: 500,
            height_segments: 500,
            time_step: 0.01,
            vertex_shader: None,
            fragment_shader: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 3.0,
            directional_position: [20.0, 20.0, 20.0],
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// OBJ model added next to the plane.
    pub model: Option<PathBuf>,
    pub model_position: [f32; 3],
    pub model_scale: f32,
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub environment: Option<Vec<PathBuf>>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            model: None,
            model_position: [0.0, 0.0, 0.0],
            model_scale: 1.0,
            environment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_portal_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.camera.fov_y_degrees, 25.0);
        assert_eq!(config.camera.position, [20.0, 30.0, 40.0]);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.controls.damping_factor, 0.25);
        assert_eq!(config.plane.width_segments, 500);
        assert_eq!(config.plane.time_step, 0.01);
        assert_eq!(config.lights.directional_intensity, 3.0);
        assert_eq!(config.lights.ambient_intensity, 0.7);
        assert!(config.assets.model.is_none());
        assert_eq!(config.assets.model_scale, 1.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = SceneConfig::from_toml_str(
            r#"
            [camera]
            fov_y_degrees = 40.0

            [assets]
            model = "portal.obj"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.fov_y_degrees, 40.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.assets.model, Some(PathBuf::from("portal.obj")));
        assert_eq!(config.plane, PlaneConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(SceneConfig::from_toml_str("").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = SceneConfig::from_toml_str("[camera\nfov_y_degrees = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = SceneConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
