//! # Scene Management Module
//!
//! The scene owns the camera, the ground reference plane, and the single
//! viewed model, and tracks where the current load attempt stands.
//!
//! - [`Scene`] - camera + objects + model lifecycle
//! - [`Object`] - a group of meshes with one transform and colour
//! - [`Vertex3D`] - GPU vertex format

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Object};
pub use scene::{ModelState, Scene};
pub use vertex::Vertex3D;
