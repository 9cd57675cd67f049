//! Viewer configuration
//!
//! All tunables live here so the rest of the crate never reaches for
//! hidden constants. `Default` reproduces the stock viewer: a 5-unit
//! fitted model, 75 degree field of view, damped orbit controls bounded
//! to [1, 50] units of distance.

use cgmath::Vector3;
use std::f32::consts::PI;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Path of the OBJ asset to load on startup.
    pub model_path: String,

    /// World-unit size the loaded model is scaled to along its largest axis.
    pub target_size: f32,

    /// Vertical field of view of the perspective camera, in degrees.
    /// Must lie strictly between 0 and 180.
    pub fov_degrees: f32,

    /// Orbit zoom bounds, world units.
    pub min_distance: f32,
    pub max_distance: f32,

    /// Per-frame exponential smoothing factor for orbit controls.
    pub damping: f32,

    /// Maximum pitch above the horizontal; the camera never orbits below
    /// the ground plane.
    pub max_pitch: f32,

    /// Fixed camera position used when asset loading fails and the red
    /// placeholder cube is shown, looking at the origin.
    pub fallback_eye: Vector3<f32>,

    /// Side length of the square ground reference plane.
    pub ground_extent: f32,

    pub window_title: String,
    pub window_size: (u32, u32),

    /// Surface clear colour (linear RGBA).
    pub clear_color: [f64; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: "model.obj".to_string(),
            target_size: 5.0,
            fov_degrees: 75.0,
            min_distance: 1.0,
            max_distance: 50.0,
            damping: 0.05,
            max_pitch: PI / 2.0 - f32::EPSILON,
            fallback_eye: Vector3::new(2.0, 2.0, 2.0),
            ground_extent: 10.0,
            window_title: "brae".to_string(),
            window_size: (1200, 800),
            clear_color: [0.933, 0.933, 0.933, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ViewerConfig::default();
        assert!(cfg.target_size > 0.0);
        assert!(cfg.fov_degrees > 0.0 && cfg.fov_degrees < 180.0);
        assert!(cfg.min_distance < cfg.max_distance);
        assert!(cfg.damping > 0.0 && cfg.damping <= 1.0);
        assert!(cfg.max_pitch <= PI / 2.0);
    }
}
