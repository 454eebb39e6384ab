//! Material system
//!
//! Two kinds of materials are supported:
//!
//! - [`StandardMaterial`] - lit by the scene lights and the environment cubemap
//! - [`ShaderMaterial`] - user WGSL with a `time` uniform advanced every frame
//!
//! Materials are stored in [`MaterialLibrary`] and objects reference them by
//! ID. Each drawable gets its own [`GpuMaterial`] so it can be released with
//! the object that uses it.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::lifecycle::GpuResource;

/// Material ID for referencing materials
pub type MaterialId = String;

/// ID of the fallback material every library contains.
pub const DEFAULT_MATERIAL_ID: &str = "default";

/// GPU uniform data for standard materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StandardMaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub env_intensity: f32,
    _padding: f32,
}

/// GPU uniform data for shader materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderMaterialUniform {
    pub time: f32,
    _padding: [f32; 3],
}

/// Lit material with basic PBR properties
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    /// Strength of the environment reflection.
    pub env_intensity: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            name: DEFAULT_MATERIAL_ID.to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            env_intensity: 1.0,
        }
    }
}

impl StandardMaterial {
    /// Creates a new material
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            env_intensity: 1.0,
        }
    }

    fn uniform(&self) -> StandardMaterialUniform {
        StandardMaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            env_intensity: self.env_intensity,
            _padding: 0.0,
        }
    }
}

/// Material drawn with its own WGSL vertex and fragment stages
///
/// The vertex source must define `vs_main` and the fragment source `fs_main`.
/// Both see the globals at group 0, the object transform at group 1 and a
/// [`ShaderMaterialUniform`] at group 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub name: String,
    pub vertex_source: String,
    pub fragment_source: String,
    pub double_sided: bool,
    pub time: f32,
}

impl ShaderMaterial {
    pub fn new(
        name: &str,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            double_sided: true,
            time: 0.0,
        }
    }

    fn uniform(&self) -> ShaderMaterialUniform {
        ShaderMaterialUniform {
            time: self.time,
            _padding: [0.0; 3],
        }
    }
}

/// Identifies the render pipeline a material is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PipelineKey {
    Standard,
    Shader(MaterialId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Shader(ShaderMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Standard(material) => &material.name,
            Material::Shader(material) => &material.name,
        }
    }

    pub fn pipeline_key(&self) -> PipelineKey {
        match self {
            Material::Standard(_) => PipelineKey::Standard,
            Material::Shader(material) => PipelineKey::Shader(material.name.clone()),
        }
    }

    /// Uniform block contents as uploaded to the GPU.
    pub fn uniform_bytes(&self) -> Vec<u8> {
        match self {
            Material::Standard(material) => bytemuck::bytes_of(&material.uniform()).to_vec(),
            Material::Shader(material) => bytemuck::bytes_of(&material.uniform()).to_vec(),
        }
    }
}

impl From<StandardMaterial> for Material {
    fn from(material: StandardMaterial) -> Self {
        Material::Standard(material)
    }
}

impl From<ShaderMaterial> for Material {
    fn from(material: ShaderMaterial) -> Self {
        Material::Shader(material)
    }
}

/// Manages all materials of a scene
///
/// Always contains a standard material under [`DEFAULT_MATERIAL_ID`], used
/// whenever an object references a material that does not exist.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<MaterialId, Material>,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        materials.insert(
            DEFAULT_MATERIAL_ID.to_string(),
            Material::Standard(StandardMaterial::default()),
        );
        Self { materials }
    }

    /// Adds a material, replacing any material with the same name.
    pub fn add(&mut self, material: impl Into<Material>) -> MaterialId {
        let material = material.into();
        let id = material.name().to_string();
        self.materials.insert(id.clone(), material);
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets a material with fallback to the default one.
    pub fn get_or_default(&self, id: &str) -> &Material {
        // The default entry is inserted on construction and never removed.
        self.materials
            .get(id)
            .unwrap_or_else(|| &self.materials[DEFAULT_MATERIAL_ID])
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Advances the `time` uniform of every shader material.
    pub fn advance_time(&mut self, step: f32) {
        for material in self.materials.values_mut() {
            if let Material::Shader(shader) = material {
                shader.time += step;
            }
        }
    }
}

/// Per-drawable GPU copy of a material: uniform buffer and bind group.
#[derive(Debug)]
pub struct GpuMaterial {
    pub material_id: MaterialId,
    pub pipeline: PipelineKey,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, material: &Material) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Material Uniform: {}", material.name())),
            contents: &material.uniform_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            material_id: material.name().to_string(),
            pipeline: material.pipeline_key(),
            buffer,
            bind_group,
        }
    }

    /// Re-uploads the uniform block from `material`.
    pub fn write(&self, queue: &wgpu::Queue, material: &Material) {
        queue.write_buffer(&self.buffer, 0, &material.uniform_bytes());
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl GpuResource for GpuMaterial {
    fn release(self) {
        self.buffer.destroy();
    }
}
