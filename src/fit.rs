//! Camera fitting and model normalization
//!
//! The pure math behind "load a model of any size and frame it nicely":
//! axis-aligned bounding boxes, a uniform scale/translation that brings a
//! model to a target world size resting on the ground plane, and a camera
//! placement that frames the result from an elevated forward angle.
//!
//! Everything here is side-effect free and runs without a GPU, so it is
//! covered by plain unit tests.

use cgmath::{Matrix4, Transform, Vector3};
use thiserror::Error;

/// Errors from the fitting computations.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    /// The bounding box has zero extent on every axis, so there is no
    /// meaningful scale or camera distance to derive.
    #[error("degenerate geometry: bounding box has zero extent")]
    DegenerateGeometry,

    /// A perspective field of view must lie strictly between 0 and 180
    /// degrees for `tan(fov / 2)` to be positive and finite.
    #[error("invalid field of view: {degrees} degrees (must be in (0, 180))")]
    InvalidFieldOfView { degrees: f32 },
}

/// Axis-aligned bounding box.
///
/// Always computed fresh from the current geometry and transform; a cached
/// box would go stale the moment the owning object is scaled or moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Builds a box over a flat `[x, y, z, x, y, z, ..]` position slice.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        if positions.len() < 3 {
            return None;
        }

        let mut min = Vector3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vector3::new(f32::MIN, f32::MIN, f32::MIN);

        for p in positions.chunks_exact(3) {
            min.x = min.x.min(p[0]);
            min.y = min.y.min(p[1]);
            min.z = min.z.min(p[2]);
            max.x = max.x.max(p[0]);
            max.y = max.y.max(p[1]);
            max.z = max.z.max(p[2]);
        }

        Some(Self { min, max })
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// The box enclosing this box after `transform` is applied.
    ///
    /// Maps all eight corners, so it stays correct for transforms that mix
    /// scale, rotation, and translation.
    pub fn transformed(&self, transform: &Matrix4<f32>) -> Aabb {
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut out: Option<Aabb> = None;
        for corner in corners {
            let p = transform.transform_point(cgmath::Point3::new(corner.x, corner.y, corner.z));
            let v = Vector3::new(p.x, p.y, p.z);
            out = Some(match out {
                Some(b) => b.union(&Aabb::new(v, v)),
                None => Aabb::new(v, v),
            });
        }
        out.expect("eight corners always produce a box")
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest extent over the three axes.
    pub fn max_dim(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// Uniform scale and translation that bring an object to `target_size`
/// world units, centered on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    pub translation: Vector3<f32>,
}

impl Normalization {
    /// Object transform applying this normalization (translate after scale).
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation) * Matrix4::from_scale(self.scale)
    }
}

/// Camera placement that frames an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub distance: f32,
    pub target: Vector3<f32>,
    pub eye: Vector3<f32>,
}

/// Offset of the camera from the framing target, in units of the fitted
/// distance: slightly elevated, pulled back along +Z. A viewing heuristic,
/// not a tight geometric fit.
const FRAMING_OFFSET: Vector3<f32> = Vector3::new(0.0, 0.5, 1.5);

/// Computes the uniform scale and translation that bring `bbox` to
/// `target_size` world units along its largest axis, centered at the origin
/// and resting on the ground plane (the vertical translation component is
/// forced to zero).
pub fn compute_normalization(bbox: &Aabb, target_size: f32) -> Result<Normalization, FitError> {
    debug_assert!(target_size > 0.0, "target size must be positive");

    let max_dim = bbox.max_dim();
    if max_dim <= 0.0 {
        return Err(FitError::DegenerateGeometry);
    }

    let scale = target_size / max_dim;
    let mut translation = -bbox.center() * scale;
    translation.y = 0.0;

    Ok(Normalization { scale, translation })
}

/// Computes the camera distance and placement that frame `bbox` for a
/// perspective camera with the given vertical field of view.
///
/// `distance = max_dim / (2 * tan(fov / 2))`, eye offset per
/// [`FRAMING_OFFSET`]. Rejects out-of-range fields of view rather than
/// returning NaN or infinity.
pub fn compute_camera_framing(bbox: &Aabb, fov_degrees: f32) -> Result<Framing, FitError> {
    if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
        return Err(FitError::InvalidFieldOfView {
            degrees: fov_degrees,
        });
    }

    let max_dim = bbox.max_dim();
    if max_dim <= 0.0 {
        return Err(FitError::DegenerateGeometry);
    }

    let fov_radians = fov_degrees.to_radians();
    let distance = max_dim / (2.0 * (fov_radians / 2.0).tan());

    let target = bbox.center();
    let eye = target + FRAMING_OFFSET * distance;

    Ok(Framing {
        distance,
        target,
        eye,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn unit_box() -> Aabb {
        Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0))
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn aabb_center_size_max_dim() {
        let bbox = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 4.0, 2.0));
        assert_eq!(bbox.center(), Vector3::new(1.0, 2.0, 1.0));
        assert_eq!(bbox.size(), Vector3::new(2.0, 4.0, 2.0));
        assert_close(bbox.max_dim(), 4.0);
    }

    #[test]
    fn aabb_from_positions() {
        let positions = [1.0, 2.0, 3.0, -1.0, 0.5, 7.0, 0.0, -2.0, 1.0];
        let bbox = Aabb::from_positions(&positions).unwrap();
        assert_eq!(bbox.min, Vector3::new(-1.0, -2.0, 1.0));
        assert_eq!(bbox.max, Vector3::new(1.0, 2.0, 7.0));

        assert!(Aabb::from_positions(&[]).is_none());
    }

    #[test]
    fn aabb_transformed_scale_translate() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)) * Matrix4::from_scale(2.0);
        let out = unit_box().transformed(&m);
        assert_close(out.min.x, -1.0);
        assert_close(out.max.x, 3.0);
        assert_close(out.min.y, -2.0);
        assert_close(out.max.y, 2.0);
    }

    #[test]
    fn normalization_centered_unit_box() {
        // max_dim 2, target 5 -> scale 2.5, center already at origin
        let n = compute_normalization(&unit_box(), 5.0).unwrap();
        assert_close(n.scale, 2.5);
        assert_close(n.translation.x, 0.0);
        assert_close(n.translation.y, 0.0);
        assert_close(n.translation.z, 0.0);
    }

    #[test]
    fn normalization_offset_box_rests_on_ground() {
        // max_dim 4, target 5 -> scale 1.25; center (1,2,1) scaled and
        // negated, vertical component clamped to the ground plane
        let bbox = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 4.0, 2.0));
        let n = compute_normalization(&bbox, 5.0).unwrap();
        assert_close(n.scale, 1.25);
        assert_close(n.translation.x, -1.25);
        assert_close(n.translation.y, 0.0);
        assert_close(n.translation.z, -1.25);
    }

    #[test]
    fn normalization_is_idempotent_in_target_size() {
        let bbox = Aabb::new(Vector3::new(-3.0, 0.0, -1.0), Vector3::new(9.0, 4.0, 2.0));
        let n = compute_normalization(&bbox, 5.0).unwrap();
        let fitted = bbox.transformed(&n.to_matrix());
        assert_close(fitted.max_dim(), 5.0);

        // Fitting the already-fitted box again changes nothing
        let n2 = compute_normalization(&fitted, 5.0).unwrap();
        assert_close(n2.scale, 1.0);
        let refitted = fitted.transformed(&n2.to_matrix());
        assert_close(refitted.max_dim(), 5.0);
    }

    #[test]
    fn normalization_rejects_degenerate_box() {
        let point = Aabb::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(
            compute_normalization(&point, 5.0),
            Err(FitError::DegenerateGeometry)
        );
    }

    #[test]
    fn framing_matches_reference_values() {
        // max_dim 5, fov 75 degrees -> distance ~3.259
        let bbox = Aabb::new(
            Vector3::new(-2.5, 0.0, -2.5),
            Vector3::new(2.5, 5.0, 2.5),
        );
        let f = compute_camera_framing(&bbox, 75.0).unwrap();
        assert!((f.distance - 3.259).abs() < 1e-3);
        assert_close(f.target.x, 0.0);
        assert_close(f.target.y, 2.5);
        assert_close(f.target.z, 0.0);
        assert!((f.eye.y - (2.5 + 1.6295)).abs() < 1e-3);
        assert!((f.eye.z - 4.8885).abs() < 1e-3);
    }

    #[test]
    fn framing_distance_is_positive_and_finite() {
        for fov in [1.0, 45.0, 75.0, 120.0, 179.0] {
            let f = compute_camera_framing(&unit_box(), fov).unwrap();
            assert!(f.distance > 0.0);
            assert!(f.distance.is_finite());
            assert!(f.eye.y.is_finite() && f.eye.z.is_finite());
        }
    }

    #[test]
    fn framing_distance_monotonic_in_size_and_fov() {
        let small = unit_box();
        let large = Aabb::new(Vector3::new(-2.0, -2.0, -2.0), Vector3::new(2.0, 2.0, 2.0));

        let d_small = compute_camera_framing(&small, 75.0).unwrap().distance;
        let d_large = compute_camera_framing(&large, 75.0).unwrap().distance;
        assert!(d_large > d_small);

        let d_narrow = compute_camera_framing(&small, 30.0).unwrap().distance;
        let d_wide = compute_camera_framing(&small, 110.0).unwrap().distance;
        assert!(d_narrow > d_small);
        assert!(d_wide < d_small);
    }

    #[test]
    fn framing_rejects_out_of_range_fov() {
        for fov in [0.0, -10.0, 180.0, 360.0] {
            assert_eq!(
                compute_camera_framing(&unit_box(), fov),
                Err(FitError::InvalidFieldOfView { degrees: fov })
            );
        }
    }

    #[test]
    fn framing_rejects_degenerate_box() {
        let point = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(
            compute_camera_framing(&point, 75.0),
            Err(FitError::DegenerateGeometry)
        );
    }
}
