//! Procedural geometry for the built-in scene furniture: the ground
//! reference plane and the fallback cube shown when asset loading fails.

pub mod primitives;

pub use primitives::*;

use crate::loader::MeshData;

/// Generated geometry ready to be turned into a scene mesh.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flattens into the loader's mesh representation with a flat colour.
    pub fn to_mesh_data(&self, color: [f32; 4]) -> MeshData {
        let positions = self.vertices.iter().flatten().copied().collect();
        let normals = self.normals.iter().flatten().copied().collect();
        MeshData::new(positions, normals, self.indices.clone(), color)
    }
}
