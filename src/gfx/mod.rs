//! # Graphics Module
//!
//! Everything that touches the screen: the orbit camera system, the wgpu
//! rendering pipeline, scene management, and GPU resource handling.
//!
//! - **Camera System** ([`camera`]) - damped orbit camera with smooth controls
//! - **Rendering Pipeline** ([`rendering`]) - forward rendering with shadow mapping
//! - **Scene Management** ([`scene`]) - ground plane, model slot, load lifecycle
//! - **Geometry** ([`geometry`]) - procedural ground plane and fallback cube
//! - **Resource Management** ([`resources`]) - uniform buffers and textures

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
