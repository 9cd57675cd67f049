//! GPU resource management: global uniforms and texture helpers.

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUBO, LightRig};
pub use texture_resource::TextureResource;
