use cgmath::{Matrix4, SquareMatrix};
use wgpu::Device;

use crate::{
    fit::Aabb,
    loader::{MeshData, DEFAULT_COLOR},
};

use super::vertex::Vertex3D;

/// Returns the mesh list with shadow participation flags set.
///
/// A pure visitor over the mesh tree: rather than walking the scene and
/// mutating nodes in place, callers get back a transformed list and decide
/// what to do with it.
pub fn with_shadows(meshes: Vec<MeshData>, cast: bool, receive: bool) -> Vec<MeshData> {
    meshes
        .into_iter()
        .map(|mesh| MeshData {
            cast_shadow: cast,
            receive_shadow: receive,
            ..mesh
        })
        .collect()
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    index_count: u32,
    pub cast_shadow: bool,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn from_data(data: &MeshData) -> Self {
        let vertices = data
            .positions
            .chunks_exact(3)
            .zip(data.normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
            })
            .collect::<Vec<_>>();

        Self {
            vertices,
            index_count: data.indices.len() as u32,
            indices: data.indices.clone(),
            cast_shadow: data.cast_shadow,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }

    fn bounds(&self) -> Option<Aabb> {
        let mut out: Option<Aabb> = None;
        for v in &self.vertices {
            let p = cgmath::Vector3::new(v.position[0], v.position[1], v.position[2]);
            let point_box = Aabb::new(p, p);
            out = Some(match out {
                Some(b) => b.union(&point_box),
                None => point_box,
            });
        }
        out
    }

    fn init_gpu_buffers(&mut self, device: &Device) {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
    }
}

/// Per-object shader data: model matrix, flat base colour, and flags
/// (x component: receives shadows). Matches `ObjectUniform` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub flags: [f32; 4],
}

pub struct ObjectGpuResources {
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// A drawable scene object: a group of meshes sharing one transform and
/// one flat colour.
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Matrix4<f32>,
    pub color: [f32; 4],
    pub receive_shadow: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources
}

impl Object {
    /// Builds an object from loader mesh data with an identity transform.
    ///
    /// The object colour comes from the first mesh (all current assets use
    /// one colour per object); shadow reception is on if any mesh asks.
    pub fn from_meshes(name: impl Into<String>, mesh_data: &[MeshData]) -> Self {
        let color = mesh_data.first().map(|m| m.color).unwrap_or(DEFAULT_COLOR);
        let receive_shadow = mesh_data.iter().any(|m| m.receive_shadow);

        Self {
            name: name.into(),
            meshes: mesh_data.iter().map(Mesh::from_data).collect(),
            transform: Matrix4::identity(),
            color,
            receive_shadow,
            gpu_resources: None,
        }
    }

    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
    }

    /// Bounding box over the raw vertex data, before the object transform.
    pub fn local_bounds(&self) -> Option<Aabb> {
        let mut out: Option<Aabb> = None;
        for mesh in &self.meshes {
            if let Some(b) = mesh.bounds() {
                out = Some(match out {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }
        out
    }

    /// Bounding box in world space, after the object transform. Computed
    /// fresh on every call; a cached box would be stale after a transform
    /// change.
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.local_bounds().map(|b| b.transformed(&self.transform))
    }

    fn uniform_content(&self) -> ObjectUniform {
        let model: &[f32; 16] = self.transform.as_ref();
        let mut matrix = [[0.0f32; 4]; 4];
        for (col, chunk) in model.chunks_exact(4).enumerate() {
            matrix[col] = [chunk[0], chunk[1], chunk[2], chunk[3]];
        }
        ObjectUniform {
            model: matrix,
            base_color: self.color,
            flags: [if self.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }

    /// Uploads vertex/index buffers and the object uniform. The bind group
    /// layout comes from the render engine so every object shares it.
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_buffers(device);
        }

        let uniform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Object Uniform Buffer"),
                contents: bytemuck::bytes_of(&self.uniform_content()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            uniform_buffer,
            bind_group,
        });
    }

    /// Re-uploads the object uniform after a transform or colour change.
    pub fn sync_uniform(&self, queue: &wgpu::Queue) {
        if let Some(gpu) = &self.gpu_resources {
            queue.write_buffer(
                &gpu.uniform_buffer,
                0,
                bytemuck::bytes_of(&self.uniform_content()),
            );
        }
    }
}

pub trait DrawObject<'a> {
    /// Draws every mesh of the object. The object's bind group must
    /// already be set.
    fn draw_object(&mut self, object: &'a Object);
    /// Draws only the meshes flagged as shadow casters.
    fn draw_object_casters(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_object(&mut self, object: &'b Object) {
        for mesh in &object.meshes {
            draw_mesh(self, mesh);
        }
    }

    fn draw_object_casters(&mut self, object: &'b Object) {
        for mesh in object.meshes.iter().filter(|m| m.cast_shadow) {
            draw_mesh(self, mesh);
        }
    }
}

fn draw_mesh<'a>(pass: &mut wgpu::RenderPass<'a>, mesh: &'a Mesh) {
    let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
    else {
        return; // Not uploaded yet
    };

    pass.set_vertex_buffer(0, vertex_buffer.slice(..));
    pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    fn cube_data(color: [f32; 4]) -> MeshData {
        generate_cube().to_mesh_data(color)
    }

    #[test]
    fn with_shadows_sets_flags_and_keeps_data() {
        let input = vec![cube_data([0.3, 0.3, 0.3, 1.0])];
        let positions = input[0].positions.clone();

        let out = with_shadows(input, true, false);
        assert_eq!(out.len(), 1);
        assert!(out[0].cast_shadow);
        assert!(!out[0].receive_shadow);
        assert_eq!(out[0].positions, positions);
    }

    #[test]
    fn object_takes_color_and_shadow_flags_from_meshes() {
        let meshes = with_shadows(vec![cube_data([1.0, 0.0, 0.0, 1.0])], true, true);
        let object = Object::from_meshes("cube", &meshes);

        assert_eq!(object.color, [1.0, 0.0, 0.0, 1.0]);
        assert!(object.receive_shadow);
        assert!(object.meshes.iter().all(|m| m.cast_shadow));
        assert_eq!(object.meshes[0].triangle_count(), 12);
    }

    #[test]
    fn local_and_world_bounds() {
        let mut object = Object::from_meshes("cube", &[cube_data(DEFAULT_COLOR)]);
        let local = object.local_bounds().unwrap();
        assert!((local.max_dim() - 1.0).abs() < 1e-6);

        object.set_transform(Matrix4::from_scale(4.0));
        let world = object.world_bounds().unwrap();
        assert!((world.max_dim() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn uniform_content_carries_transform_column_major() {
        let mut object = Object::from_meshes("cube", &[cube_data(DEFAULT_COLOR)]);
        object.set_transform(Matrix4::from_translation(cgmath::Vector3::new(
            1.0, 2.0, 3.0,
        )));
        let uniform = object.uniform_content();
        assert_eq!(uniform.model[3][0], 1.0);
        assert_eq!(uniform.model[3][1], 2.0);
        assert_eq!(uniform.model[3][2], 3.0);
        assert_eq!(uniform.flags[0], 0.0);
    }
}
