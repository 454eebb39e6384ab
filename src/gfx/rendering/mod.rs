//! Core rendering functionality
//!
//! Pipelines, GPU meshes and the embedded WGSL sources.

pub mod mesh;
pub mod pipeline_manager;
pub mod shaders;

pub use mesh::{DrawMesh, GpuMesh};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
