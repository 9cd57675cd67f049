//! Rendering pipeline: forward pass with flat lambert shading plus a
//! depth-only shadow pass.

pub mod render_engine;

pub use render_engine::RenderEngine;
