//! GPU resource management
//!
//! Materials, global uniforms and textures used by the render surface.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUniform};
pub use material::{GpuMaterial, Material, MaterialId, MaterialLibrary, PipelineKey};
pub use texture_resource::{DepthTexture, TextureResource};
