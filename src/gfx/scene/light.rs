use crate::config::LightsConfig;

/// Point-at-origin directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Uniform light applied to every surface regardless of orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub directional: DirectionalLight,
    pub ambient: AmbientLight,
}

impl Default for Lights {
    fn default() -> Self {
        Self::from(&LightsConfig::default())
    }
}

impl From<&LightsConfig> for Lights {
    fn from(config: &LightsConfig) -> Self {
        Self {
            directional: DirectionalLight {
                position: config.directional_position,
                color: config.directional_color,
                intensity: config.directional_intensity,
            },
            ambient: AmbientLight {
                color: config.ambient_color,
                intensity: config.ambient_intensity,
            },
        }
    }
}
