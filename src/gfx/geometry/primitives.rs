//! # Primitive Shape Generation
//!
//! Generators for the handful of shapes the viewer needs without an
//! external model file. All shapes come with outward-facing normals.

use super::GeometryData;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes and four
/// vertices per face so each face keeps its own flat normal.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let normals = [
        [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = normals.to_vec();

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2,    2, 3, 0,       // front
        4, 5, 6,    6, 7, 4,       // back
        8, 9, 10,   10, 11, 8,     // left
        12, 13, 14, 14, 15, 12,    // right
        16, 17, 18, 18, 19, 16,    // top
        20, 21, 22, 22, 23, 20,    // bottom
    ];
    data.indices = indices;

    data
}

/// Generate a flat ground plane in the XZ plane at y = 0
///
/// `width` runs along X, `depth` along Z, centered at the origin, with the
/// normal facing up. Rendered without backface culling so it reads as a
/// surface from any orbit angle.
pub fn generate_ground_plane(width: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let hw = width * 0.5;
    let hd = depth * 0.5;

    data.vertices = vec![
        [-hw, 0.0, -hd],
        [hw, 0.0, -hd],
        [hw, 0.0, hd],
        [-hw, 0.0, hd],
    ];
    data.normals = vec![[0.0, 1.0, 0.0]; 4];
    data.indices = vec![0, 2, 1, 0, 3, 2];

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertices.len(), cube.normals.len());

        // Unit extent on every axis
        for axis in 0..3 {
            let min = cube.vertices.iter().map(|v| v[axis]).fold(f32::MAX, f32::min);
            let max = cube.vertices.iter().map(|v| v[axis]).fold(f32::MIN, f32::max);
            assert_eq!(min, -0.5);
            assert_eq!(max, 0.5);
        }
    }

    #[test]
    fn test_ground_plane_generation() {
        let plane = generate_ground_plane(10.0, 10.0);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
        assert!(plane.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_to_mesh_data_flattens() {
        let mesh = generate_cube().to_mesh_data([1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.positions.len(), 24 * 3);
        assert_eq!(mesh.normals.len(), 24 * 3);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
