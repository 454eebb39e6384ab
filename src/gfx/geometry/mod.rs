//! # Procedural Geometry Generation
//!
//! Generates the subdivided plane the animated shader is drawn on.
//!
//! ```rust
//! use vitrine::gfx::geometry::generate_plane;
//!
//! let plane = generate_plane(5.0, 7.0, 500, 500);
//! assert_eq!(plane.vertex_count(), 501 * 501);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::object::MeshData;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts into a single-group mesh for the scene.
    pub fn into_mesh(self) -> MeshData {
        MeshData::from_attributes(&self.vertices, &self.normals, &self.tex_coords, self.indices)
    }
}
