use std::ops::Range;

use cgmath::{Matrix4, SquareMatrix, Vector3};

use super::vertex::Vertex3D;
use crate::gfx::resources::material::MaterialId;

/// CPU-side mesh: interleaved vertices, indices, and one index range per
/// material slot.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    pub groups: Vec<Range<u32>>,
}

impl MeshData {
    /// Builds a single-group mesh from separate attribute arrays.
    ///
    /// Missing normals default to +Y and missing UVs to zero.
    pub fn from_attributes(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
        indices: Vec<u32>,
    ) -> Self {
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        let groups = vec![0..indices.len() as u32];
        Self {
            vertices,
            indices,
            groups,
        }
    }

    /// Appends `other` as a new index group, returning the group index.
    pub fn append_group(&mut self, other: MeshData) -> usize {
        let base_vertex = self.vertices.len() as u32;
        let start = self.indices.len() as u32;

        self.vertices.extend(other.vertices);
        self.indices
            .extend(other.indices.into_iter().map(|index| index + base_vertex));

        let end = self.indices.len() as u32;
        self.groups.push(start..end);
        self.groups.len() - 1
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Calculates smooth per-vertex normals from triangle faces.
    ///
    /// `positions` is a flat `[x, y, z, ...]` array as produced by OBJ loaders.
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; positions.len()];
        let position = |i: usize| {
            Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
        };

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            if i0.max(i1).max(i2) >= vertex_count {
                continue;
            }

            let face_normal = (position(i1) - position(i0)).cross(position(i2) - position(i0));

            for vertex_idx in [i0, i1, i2] {
                normals[vertex_idx * 3] += face_normal.x;
                normals[vertex_idx * 3 + 1] += face_normal.y;
                normals[vertex_idx * 3 + 2] += face_normal.z;
            }
        }

        for normal in normals.chunks_exact_mut(3) {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|n| *n /= length);
            }
        }

        normals
    }
}

/// An object in the scene: a mesh, the materials for its groups and a
/// model transform.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub mesh: MeshData,
    /// One material per mesh group; a single entry covers every group.
    pub material_ids: Vec<MaterialId>,
    pub transform: Matrix4<f32>, // cgmath 4x4 transformation matrix
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: MeshData, material_ids: Vec<MaterialId>) -> Self {
        Self {
            name: name.into(),
            mesh,
            material_ids,
            transform: Matrix4::identity(),
        }
    }

    /// Set translation and uniform scale (T * S)
    pub fn set_translation_scale(&mut self, translation: Vector3<f32>, scale: f32) {
        self.transform = Matrix4::from_translation(translation) * Matrix4::from_scale(scale);
    }

    pub fn is_multi_material(&self) -> bool {
        self.material_ids.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    fn triangle() -> MeshData {
        MeshData::from_attributes(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[],
            &[],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_attribute_defaults() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].tex_coords, [0.0, 0.0]);
        assert_eq!(mesh.groups, vec![0..3]);
    }

    #[test]
    fn test_append_group_offsets_indices() {
        let mut mesh = MeshData::default();
        assert_eq!(mesh.append_group(triangle()), 0);
        assert_eq!(mesh.append_group(triangle()), 1);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.groups, vec![0..3, 3..6]);
    }

    #[test]
    fn test_face_normals_point_out_of_ccw_face() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = MeshData::calculate_face_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_face_normals_skip_out_of_range_indices() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let normals = MeshData::calculate_face_normals(&positions, &[0, 1, 5]);
        assert_eq!(normals, vec![0.0; 6]);
    }

    #[test]
    fn test_translation_scale_transform() {
        let mut object = SceneObject::new("model", triangle(), vec!["default".to_string()]);
        object.set_translation_scale(Vector3::new(1.0, 2.0, 3.0), 2.0);

        let moved = object.transform * Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(moved, Vector4::new(3.0, 4.0, 5.0, 1.0));
        assert!(!object.is_multi_material());
    }
}
