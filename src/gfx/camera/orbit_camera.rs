use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Orbit camera parameterized by distance, pitch, and yaw around a focus
/// point, with damped response: input moves *goal* values, and the live
/// values ease toward them a little every frame.
///
/// Y is up; pitch is measured from the horizontal plane, so a pitch of 0
/// looks across the focus point and pi/2 looks straight down.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: Vector3<f32>,

    goal_distance: f32,
    goal_pitch: f32,
    goal_yaw: f32,
    goal_target: Vector3<f32>,

    pub eye: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    /// Per-frame smoothing factor in (0, 1]; 1 means no damping.
    pub damping: f32,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            target,
            goal_distance: distance,
            goal_pitch: pitch,
            goal_yaw: yaw,
            goal_target: target,
            eye: Vector3::zero(), // recomputed below
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            damping: 0.05,
            aspect,
            // Conservative planes so both tiny and huge fitted models survive
            fovy: Deg(75.0).into(),
            znear: 0.01,
            zfar: 10000.0,
            uniform: CameraUniform::default(),
        };
        camera.update_eye();
        camera
    }

    /// Snaps the camera to look at `target` from `eye`, without damping.
    ///
    /// Used for programmatic placement: framing a freshly loaded model and
    /// resetting to the fallback pose.
    pub fn look_from(&mut self, eye: Vector3<f32>, target: Vector3<f32>) {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);

        self.distance = self.bounds.clamp_distance(distance);
        self.pitch = self.bounds.clamp_pitch((offset.y / distance).asin());
        self.yaw = offset.x.atan2(offset.z);
        self.target = target;

        self.goal_distance = self.distance;
        self.goal_pitch = self.pitch;
        self.goal_yaw = self.yaw;
        self.goal_target = self.target;

        self.update_eye();
    }

    pub fn add_distance(&mut self, delta: f32) {
        // Log scaling keeps zoom speed proportionate when far out
        let corrected = f32::log10(self.goal_distance.max(1.001)).max(0.1) * delta;
        self.goal_distance = self.bounds.clamp_distance(self.goal_distance + corrected);
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.goal_pitch = self.bounds.clamp_pitch(self.goal_pitch + delta);
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.goal_yaw += delta;
    }

    /// Pans the focus point in the camera's view plane.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance so panning feels the same at every zoom level
        let pan_scale = self.distance * 0.1;
        self.goal_target += right * delta.0 * pan_scale + up * delta.1 * pan_scale;
    }

    /// Eases the live values toward their goals and recomputes the eye.
    /// Call once per rendered frame.
    pub fn tick(&mut self) {
        let t = self.damping.clamp(0.0, 1.0);
        self.distance += (self.goal_distance - self.distance) * t;
        self.pitch += (self.goal_pitch - self.pitch) * t;
        self.yaw += (self.goal_yaw - self.yaw) * t;
        self.target += (self.goal_target - self.target) * t;
        self.update_eye();
    }

    fn update_eye(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

/// Movement limits for an [`OrbitCamera`].
///
/// The default pitch range keeps the camera at or above the horizontal, so
/// the scene is never viewed from below the ground plane.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl OrbitCameraBounds {
    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(
            self.min_distance.unwrap_or(f32::EPSILON),
            self.max_distance.unwrap_or(f32::MAX),
        )
    }

    fn clamp_pitch(&self, pitch: f32) -> f32 {
        pitch.clamp(self.min_pitch, self.max_pitch)
    }
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.0),
            max_distance: Some(50.0),
            min_pitch: 0.0,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn look_from_reproduces_eye_and_target() {
        let mut camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.5);
        let eye = Vector3::new(2.0, 2.0, 2.0);
        camera.look_from(eye, Vector3::zero());

        assert_vec_close(camera.eye, eye);
        assert_vec_close(camera.target, Vector3::zero());

        // Stable under ticking: no goal drift after a snap
        for _ in 0..10 {
            camera.tick();
        }
        assert_vec_close(camera.eye, eye);
    }

    #[test]
    fn look_from_framing_offset_pose() {
        // eye = target + (0, 0.5, 1.5) * d has yaw 0 and pitch asin(0.5 / sqrt(2.5))
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let target = Vector3::new(0.0, 2.5, 0.0);
        let eye = target + Vector3::new(0.0, 1.6295, 4.8885);
        camera.look_from(eye, target);

        assert!((camera.yaw).abs() < 1e-5);
        let offset_len = (1.6295f32 * 1.6295 + 4.8885 * 4.8885).sqrt();
        assert!((camera.pitch - (1.6295f32 / offset_len).asin()).abs() < 1e-3);
        assert_vec_close(camera.eye, eye);
    }

    #[test]
    fn pitch_never_goes_below_horizontal() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(-10.0);
        for _ in 0..500 {
            camera.tick();
        }
        assert!(camera.pitch >= 0.0);
        assert!(camera.eye.y >= camera.target.y - 1e-4);
    }

    #[test]
    fn distance_respects_bounds() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0);
        for _ in 0..200 {
            camera.add_distance(10.0);
        }
        for _ in 0..500 {
            camera.tick();
        }
        assert!(camera.distance <= 50.0 + 1e-3);

        for _ in 0..400 {
            camera.add_distance(-10.0);
        }
        for _ in 0..500 {
            camera.tick();
        }
        assert!(camera.distance >= 1.0 - 1e-3);
    }

    #[test]
    fn damping_converges_gradually() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0);
        let start_yaw = camera.yaw;
        camera.add_yaw(1.0);

        camera.tick();
        let after_one = camera.yaw;
        // One tick moves part of the way, not all of it
        assert!(after_one > start_yaw);
        assert!(after_one < start_yaw + 1.0);

        for _ in 0..2000 {
            camera.tick();
        }
        assert!((camera.yaw - (start_yaw + 1.0)).abs() < 1e-3);
    }
}
