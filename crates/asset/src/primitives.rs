//! Built-in geometry that needs no file on disk.

use crate::mesh::{MeshBuffer, VertexLayout};

/// One RGB triangle in the z=0 plane.
pub fn triangle() -> MeshBuffer {
    #[rustfmt::skip]
    let data = vec![
        -0.5, -0.5, 0.0,   1.0, 0.0, 0.0,
         0.5, -0.5, 0.0,   0.0, 1.0, 0.0,
         0.0,  0.5, 0.0,   0.0, 0.0, 1.0,
    ];
    raw(VertexLayout::PositionColor, data)
}

/// Unit cube (half-size 0.5) with per-face normals and texture coordinates.
/// The coordinates sample scattered spots of the texture rather than
/// unwrapping it onto each face.
pub fn textured_cube() -> MeshBuffer {
    #[rustfmt::skip]
    let data = vec![
        // position          normal             uv
        -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,   0.1, 0.5,
         0.5, -0.5,  0.5,   0.0,  0.0,  1.0,   0.2, 0.5,
         0.5,  0.5,  0.5,   0.0,  0.0,  1.0,   0.0, 0.5,
        -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,   0.5, 0.3,
         0.5,  0.5,  0.5,   0.0,  0.0,  1.0,   0.4, 0.5,
        -0.5,  0.5,  0.5,   0.0,  0.0,  1.0,   0.5, 0.1,
         0.5, -0.5,  0.5,   1.0,  0.0,  0.0,   0.2, 0.5,
         0.5, -0.5, -0.5,   1.0,  0.0,  0.0,   0.5, 0.6,
         0.5,  0.5, -0.5,   1.0,  0.0,  0.0,   0.5, 0.7,
         0.5, -0.5,  0.5,   1.0,  0.0,  0.0,   0.5, 0.8,
         0.5,  0.5, -0.5,   1.0,  0.0,  0.0,   0.5, 0.9,
         0.5,  0.5,  0.5,   1.0,  0.0,  0.0,   0.5, 0.9,
         0.5, -0.5, -0.5,   0.0,  0.0, -1.0,   0.5, 0.8,
        -0.5, -0.5, -0.5,   0.0,  0.0, -1.0,   0.5, 0.7,
        -0.5,  0.5, -0.5,   0.0,  0.0, -1.0,   0.5, 0.6,
         0.5, -0.5, -0.5,   0.0,  0.0, -1.0,   0.5, 0.4,
        -0.5,  0.5, -0.5,   0.0,  0.0, -1.0,   0.5, 0.3,
         0.5,  0.5, -0.5,   0.0,  0.0, -1.0,   0.5, 0.2,
        -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,   0.5, 0.1,
        -0.5, -0.5,  0.5,  -1.0,  0.0,  0.0,   0.5, 0.0,
        -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,   0.5, 0.9,
        -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,   0.5, 0.7,
        -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,   0.5, 0.8,
        -0.5,  0.5, -0.5,  -1.0,  0.0,  0.0,   0.5, 0.6,
        -0.5,  0.5,  0.5,   0.0,  1.0,  0.0,   0.5, 0.6,
         0.5,  0.5,  0.5,   0.0,  1.0,  0.0,   0.5, 0.2,
         0.5,  0.5, -0.5,   0.0,  1.0,  0.0,   0.5, 0.0,
        -0.5,  0.5,  0.5,   0.0,  1.0,  0.0,   0.5, 0.1,
         0.5,  0.5, -0.5,   0.0,  1.0,  0.0,   0.5, 0.2,
        -0.5,  0.5, -0.5,   0.0,  1.0,  0.0,   0.5, 0.3,
        -0.5, -0.5,  0.5,   0.0, -1.0,  0.0,   0.5, 0.3,
        -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,   0.5, 0.4,
         0.5, -0.5,  0.5,   0.0, -1.0,  0.0,   0.5, 0.1,
        -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,   0.5, 0.2,
         0.5, -0.5, -0.5,   0.0, -1.0,  0.0,   0.5, 0.8,
         0.5, -0.5,  0.5,   0.0, -1.0,  0.0,   0.5, 0.9,
    ];
    raw(VertexLayout::PositionNormalTexcoord, data)
}

fn raw(layout: VertexLayout, data: Vec<f32>) -> MeshBuffer {
    // Literal tables above are stride-aligned; fall back to empty otherwise.
    MeshBuffer::from_raw(layout, data).unwrap_or_else(|| MeshBuffer::new(layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BoundingExtent;

    #[test]
    fn triangle_has_three_colored_vertices() {
        let tri = triangle();
        assert_eq!(tri.layout(), VertexLayout::PositionColor);
        assert_eq!(tri.vertex_count(), 3);
    }

    #[test]
    fn cube_is_twelve_triangles_in_unit_box() {
        let cube = textured_cube();
        assert_eq!(cube.vertex_count(), 36);
        let extent = BoundingExtent::from_buffer(&cube);
        assert_eq!(extent.min, [-0.5f32; 3]);
        assert_eq!(extent.max, [0.5f32; 3]);
    }

    #[test]
    fn cube_normals_are_axis_aligned_units() {
        for v in textured_cube().vertices() {
            let len2 = v[3] * v[3] + v[4] * v[4] + v[5] * v[5];
            assert!((len2 - 1.0).abs() < 1e-6);
        }
    }
}
