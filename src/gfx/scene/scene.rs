use std::collections::HashMap;

use cgmath::{Deg, Vector3};
use log::{debug, info};

use super::{
    light::Lights,
    loader::{self, AssetError, CubemapImage},
    object::SceneObject,
};
use crate::{
    config::{PlaneConfig, SceneConfig},
    gfx::{
        camera::OrbitCamera,
        geometry::generate_plane,
        rendering::shaders::{PLANE_FRAGMENT_SHADER, PLANE_VERTEX_SHADER},
        resources::material::{MaterialLibrary, ShaderMaterial},
    },
};

/// Name of the animated plane object and of its shader material.
pub const PLANE_NAME: &str = "portal_plane";

/// Grey used when no environment cubemap is configured.
const FALLBACK_ENVIRONMENT: [u8; 4] = [128, 128, 128, 255];

/// Main scene containing objects, materials, lights and camera
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: OrbitCamera,
    pub objects: Vec<SceneObject>,
    pub materials: MaterialLibrary,
    pub lights: Lights,
    pub environment: CubemapImage,
    time_step: f32,
}

impl Scene {
    /// Creates an empty scene viewed through `camera`.
    pub fn new(camera: OrbitCamera) -> Self {
        Self {
            camera,
            objects: Vec::new(),
            materials: MaterialLibrary::new(),
            lights: Lights::default(),
            environment: CubemapImage::solid(FALLBACK_ENVIRONMENT),
            time_step: PlaneConfig::default().time_step,
        }
    }

    /// Builds the portal scene: the shader plane, the optional model and
    /// the optional environment cubemap.
    pub fn from_config(config: &SceneConfig) -> Result<Self, AssetError> {
        let camera_config = &config.camera;
        let mut camera = OrbitCamera::looking_from(
            Vector3::from(camera_config.position),
            Vector3::from(camera_config.target),
            Deg(camera_config.fov_y_degrees),
            camera_config.near,
            camera_config.far,
        );
        camera.resize_projection(config.window.width, config.window.height);
        camera.update_view_proj();

        let mut scene = Self::new(camera);
        scene.lights = Lights::from(&config.lights);
        scene.time_step = config.plane.time_step;

        scene.add_plane(&config.plane)?;

        let assets = &config.assets;
        if let Some(model) = &assets.model {
            scene.load_model(model, Vector3::from(assets.model_position), assets.model_scale)?;
        }
        if let Some(faces) = &assets.environment {
            scene.environment = loader::load_cubemap(faces)?;
        }

        let stats = scene.statistics();
        info!(
            "Scene ready: {} objects, {} materials, {} triangles",
            stats.object_count, stats.material_count, stats.total_triangles
        );

        Ok(scene)
    }

    fn add_plane(&mut self, plane: &PlaneConfig) -> Result<(), AssetError> {
        let vertex_source = match &plane.vertex_shader {
            Some(path) => loader::load_shader_source(path)?,
            None => PLANE_VERTEX_SHADER.to_string(),
        };
        let fragment_source = match &plane.fragment_shader {
            Some(path) => loader::load_shader_source(path)?,
            None => PLANE_FRAGMENT_SHADER.to_string(),
        };

        let material_id = self.materials.add(ShaderMaterial::new(
            PLANE_NAME,
            vertex_source,
            fragment_source,
        ));

        let mesh = generate_plane(
            plane.width,
            plane.height,
            plane.width_segments,
            plane.height_segments,
        )
        .into_mesh();
        self.add_object(SceneObject::new(PLANE_NAME, mesh, vec![material_id]));
        Ok(())
    }

    /// Adds an object, renaming it if the name is already taken. Returns its index.
    pub fn add_object(&mut self, mut object: SceneObject) -> usize {
        object.name = self.ensure_unique_name(&object.name);
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Loads an OBJ model with its materials and places it in the scene.
    ///
    /// Imported materials whose name is already in the library are renamed
    /// to `"{model}/{name}"`, so a model can never replace the plane's shader
    /// material or the default one.
    pub fn load_model(
        &mut self,
        path: impl AsRef<std::path::Path>,
        position: Vector3<f32>,
        scale: f32,
    ) -> Result<usize, AssetError> {
        let loaded = loader::load_obj(path)?;
        let mut object = loaded.object;

        let mut renamed = HashMap::new();
        for mut material in loaded.materials {
            let id = self.unused_material_id(&object.name, &material.name);
            if id != material.name {
                debug!("Material '{}' of '{}' renamed to '{id}'", material.name, object.name);
                renamed.insert(std::mem::replace(&mut material.name, id.clone()), id);
            }
            self.materials.add(material);
        }
        for material_id in &mut object.material_ids {
            if let Some(id) = renamed.get(material_id) {
                *material_id = id.clone();
            }
        }

        object.set_translation_scale(position, scale);
        Ok(self.add_object(object))
    }

    /// Steps per-frame scene state: the shader `time` uniforms.
    pub fn advance(&mut self) {
        self.materials.advance_time(self.time_step);
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    pub fn statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            material_count: self.materials.len(),
            total_triangles: self
                .objects
                .iter()
                .map(|obj| obj.mesh.index_count() / 3)
                .sum(),
            total_vertices: self.objects.iter().map(|obj| obj.mesh.vertex_count()).sum(),
        }
    }

    fn unused_material_id(&self, model: &str, name: &str) -> String {
        if !self.materials.contains(name) {
            return name.to_string();
        }

        let mut counter = 0;
        let mut test_name = format!("{model}/{name}");
        while self.materials.contains(&test_name) {
            counter += 1;
            test_name = format!("{model}/{name} ({counter})");
        }

        test_name
    }

    fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub material_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::material::{Material, StandardMaterial, DEFAULT_MATERIAL_ID};
    use approx::assert_abs_diff_eq;

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.plane.width_segments = 4;
        config.plane.height_segments = 2;
        config
    }

    #[test]
    fn test_portal_scene_contains_shader_plane() {
        let scene = Scene::from_config(&small_config()).unwrap();

        assert_eq!(scene.objects.len(), 1);
        let plane = &scene.objects[0];
        assert_eq!(plane.name, PLANE_NAME);
        assert_eq!(plane.mesh.vertex_count(), 5 * 3);
        assert_eq!(plane.material_ids, vec![PLANE_NAME.to_string()]);

        match scene.materials.get(PLANE_NAME) {
            Some(Material::Shader(shader)) => {
                assert_eq!(shader.time, 0.0);
                assert!(shader.vertex_source.contains("vs_main"));
                assert!(shader.fragment_source.contains("fs_main"));
            }
            other => panic!("unexpected material {other:?}"),
        }
        assert_eq!(scene.environment.size(), 1);
    }

    #[test]
    fn test_camera_uses_window_aspect() {
        let scene = Scene::from_config(&small_config()).unwrap();
        assert_abs_diff_eq!(scene.camera.aspect, 1.5);
        assert_abs_diff_eq!(scene.camera.distance, 2900.0_f32.sqrt(), epsilon = 1e-3);
    }

    #[test]
    fn test_advance_steps_shader_time() {
        let mut scene = Scene::from_config(&small_config()).unwrap();
        for _ in 0..3 {
            scene.advance();
        }

        match scene.materials.get(PLANE_NAME) {
            Some(Material::Shader(shader)) => assert_abs_diff_eq!(shader.time, 0.03, epsilon = 1e-6),
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_names_are_made_unique() {
        let mut scene = Scene::from_config(&small_config()).unwrap();
        let copy = scene.objects[0].clone();
        let index = scene.add_object(copy);
        assert_eq!(scene.objects[index].name, "portal_plane (1)");
    }

    #[test]
    fn test_missing_model_fails_scene() {
        let mut config = small_config();
        config.assets.model = Some("does/not/exist.obj".into());
        assert!(matches!(
            Scene::from_config(&config),
            Err(AssetError::Obj { .. })
        ));
    }

    #[test]
    fn test_model_materials_cannot_replace_existing_ones() {
        let dir = std::env::temp_dir().join(format!("vitrine-{}-clash", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("crate.mtl"),
            "newmtl portal_plane\nKd 1.0 0.0 0.0\n\n\
             newmtl default\nKd 0.0 1.0 0.0\n\n\
             newmtl steel\nKd 0.5 0.5 0.5\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("crate.obj"),
            "mtllib crate.mtl\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
             o lid\nusemtl portal_plane\nf 1 2 3\n\
             o side\nusemtl steel\nf 1 2 4\n",
        )
        .unwrap();

        let mut config = small_config();
        config.assets.model = Some(dir.join("crate.obj"));
        let scene = Scene::from_config(&config).unwrap();

        assert!(matches!(
            scene.materials.get(PLANE_NAME),
            Some(Material::Shader(_))
        ));
        match scene.materials.get(DEFAULT_MATERIAL_ID) {
            Some(Material::Standard(standard)) => {
                assert_eq!(standard.base_color, StandardMaterial::default().base_color)
            }
            other => panic!("unexpected material {other:?}"),
        }

        let model = &scene.objects[1];
        assert_eq!(
            model.material_ids,
            vec!["crate/portal_plane".to_string(), "steel".to_string()]
        );
        match scene.materials.get("crate/portal_plane") {
            Some(Material::Standard(standard)) => {
                assert_eq!(standard.name, "crate/portal_plane");
                assert_eq!(standard.base_color, [1.0, 0.0, 0.0, 1.0]);
            }
            other => panic!("unexpected material {other:?}"),
        }
        assert!(scene.materials.contains("crate/default"));
    }

    #[test]
    fn test_statistics() {
        let scene = Scene::from_config(&small_config()).unwrap();
        let stats = scene.statistics();
        assert_eq!(stats.object_count, 1);
        assert_eq!(stats.material_count, 2);
        assert_eq!(stats.total_triangles, 4 * 2 * 2);
        assert_eq!(stats.total_vertices, 15);
    }
}
