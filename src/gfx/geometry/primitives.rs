//! # Primitive Shape Generation

use super::GeometryData;

/// Generate a subdivided plane in the XY plane, facing +Z
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Returns a plane centered at the origin. UVs run from (0, 0) at the
/// bottom-left corner to (1, 1) at the top-right one.
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    let vertex_count = ((w_segs + 1) * (h_segs + 1)) as usize;
    data.vertices.reserve(vertex_count);
    data.normals.reserve(vertex_count);
    data.tex_coords.reserve(vertex_count);
    data.indices.reserve((w_segs * h_segs * 6) as usize);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([u, v]);
        }
    }

    // Counter-clockwise when viewed from +Z
    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[i + 1, next_row + 1, next_row]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert_eq!(plane.triangle_count(), 8);
    }

    #[test]
    fn test_plane_extent_and_uvs() {
        let plane = generate_plane(5.0, 7.0, 4, 3);
        assert_eq!(plane.vertices.first(), Some(&[-2.5, -3.5, 0.0]));
        assert_eq!(plane.vertices.last(), Some(&[2.5, 3.5, 0.0]));
        assert_eq!(plane.tex_coords.first(), Some(&[0.0, 0.0]));
        assert_eq!(plane.tex_coords.last(), Some(&[1.0, 1.0]));
        assert!(plane.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_plane_faces_positive_z() {
        let plane = generate_plane(1.0, 1.0, 1, 1);
        for triangle in plane.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| plane.vertices[triangle[k] as usize]);
            let cross_z = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross_z > 0.0);
        }
    }

    #[test]
    fn test_zero_segments_are_clamped() {
        let plane = generate_plane(1.0, 1.0, 0, 0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
    }

    #[test]
    fn test_portal_plane_fits_u32_indices() {
        let plane = generate_plane(5.0, 7.0, 500, 500);
        assert_eq!(plane.vertex_count(), 501 * 501);
        assert_eq!(plane.triangle_count(), 500 * 500 * 2);
        let max_index = plane.indices.iter().copied().max().unwrap();
        assert_eq!(max_index as usize, plane.vertex_count() - 1);
    }
}
