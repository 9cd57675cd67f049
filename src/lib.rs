//! # Brae
//!
//! A small 3D model viewer: point it at an OBJ file and it opens a window,
//! fits the camera to the model, and hands you damped orbit controls.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() {
//!     brae::viewer("assets/teapot.obj").run();
//! }
//! ```
//!
//! The scene always contains a ground plane; the model drops in once the
//! background load completes, scaled to a uniform target size and resting
//! on the ground. If the file cannot be read or parsed, a red cube is
//! shown instead so the window is never empty.
//!
//! ## Controls
//!
//! - **Left mouse drag** - orbit around the model
//! - **Shift + drag** - pan the focus point
//! - **Scroll** - zoom (log-scaled, clamped to a sane range)
//! - **Escape** - quit

pub mod app;
pub mod config;
pub mod fit;
pub mod gfx;
pub mod loader;
pub mod wgpu_utils;

pub use app::ViewerApp;
pub use config::ViewerConfig;

/// Creates a viewer for the given model path with default settings.
pub fn viewer(model_path: impl Into<String>) -> ViewerApp {
    ViewerApp::new(ViewerConfig {
        model_path: model_path.into(),
        ..Default::default()
    })
}
