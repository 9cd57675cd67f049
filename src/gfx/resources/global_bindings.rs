//! Global uniform bindings for camera and lighting
//!
//! Per-frame data shared by every object: camera matrices, the light rig,
//! and the light's view-projection for shadow sampling. Bound at group 0
//! in both render pipelines.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    gfx::camera::orbit_camera::OPENGL_TO_WGPU_MATRIX,
    wgpu_utils::uniform_buffer::UniformBuffer,
};

/// Global uniform buffer content. Must match the `Globals` struct in the
/// shaders exactly (176 bytes, std140-compatible field order).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    light_direction: [f32; 3], // from the light toward the scene
    ambient: f32,
    light_color: [f32; 3],
    diffuse: f32,
}

/// Directional light rig: position fixes the shadow projection, the
/// ambient/diffuse split matches the viewer's flat look.
#[derive(Copy, Clone, Debug)]
pub struct LightRig {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub ambient: f32,
    pub diffuse: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            position: Vector3::new(5.0, 5.0, 5.0),
            color: [1.0, 1.0, 1.0],
            ambient: 0.6,
            diffuse: 0.8,
        }
    }
}

impl LightRig {
    /// Light-space view-projection for the shadow pass: an orthographic
    /// box around the fitted scene (models are normalized to ~5 units on a
    /// 10-unit ground plane), looking at the origin.
    fn view_proj(&self) -> cgmath::Matrix4<f32> {
        let eye = self.position.normalize() * 20.0;
        let view = cgmath::Matrix4::look_at_rh(
            Point3::new(eye.x, eye.y, eye.z),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let proj = OPENGL_TO_WGPU_MATRIX * cgmath::ortho(-12.0, 12.0, -12.0, 12.0, 1.0, 40.0);
        proj * view
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes this frame's camera and light data into the global UBO.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: &LightRig,
) {
    let direction = -light.position.normalize();
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        light_view_proj: light.view_proj().into(),
        light_direction: [direction.x, direction.y, direction.z],
        ambient: light.ambient,
        light_color: light.color,
        diffuse: light.diffuse,
    };

    ubo.update_content(queue, content);
}

/// Bind group layout and bind group for the global uniforms (group 0).
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Must be called once the uniform buffer exists, before rendering.
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        }));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}
