//! # Graphics Module
//!
//! Everything wgpu-specific: the shared [`RenderContext`], the window
//! [`WindowContainer`], and the [`SceneSurface`] the lifecycle manager
//! mounts into it.
//!
//! - **Camera** ([`camera`]) - orbit camera with damped controls
//! - **Geometry** ([`geometry`]) - procedural plane
//! - **Rendering** ([`rendering`]) - pipelines and GPU meshes
//! - **Resources** ([`resources`]) - materials, globals, textures
//! - **Scene** ([`scene`]) - objects, lights, asset loading

pub mod camera;
pub mod container;
pub mod context;
pub mod error;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod surface;

pub use container::WindowContainer;
pub use context::RenderContext;
pub use error::GpuError;
pub use surface::SceneSurface;
