//! # Scene Management Module
//!
//! Objects, materials, lights and the environment the surface draws, plus
//! the loaders that build them from disk.
//!
//! - [`Scene`] - camera, objects, material library, lights, environment
//! - [`SceneObject`] - a multi-group mesh with per-group materials
//! - [`loader`] - OBJ models, cubemap faces, WGSL sources
//! - [`Vertex3D`] - interleaved vertex layout shared by every pipeline

pub mod light;
pub mod loader;
pub mod object;
pub mod scene;
pub mod vertex;

pub use light::{AmbientLight, DirectionalLight, Lights};
pub use loader::{AssetError, CubemapImage};
pub use object::{MeshData, SceneObject};
pub use scene::{Scene, SceneStatistics, PLANE_NAME};
pub use vertex::Vertex3D;
