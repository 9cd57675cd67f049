use cgmath::Vector3;
use log::info;
use wgpu::Device;

use crate::{
    config::ViewerConfig,
    fit::{compute_camera_framing, compute_normalization, FitError},
    gfx::{
        camera::camera_utils::CameraManager,
        geometry::{generate_cube, generate_ground_plane},
    },
    loader::{LoadedModel, RequestId},
};

use super::object::{with_shadows, Object};

/// Flat grey of the ground reference plane.
const GROUND_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Flat red of the placeholder cube shown when loading fails.
const FALLBACK_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Lifecycle of the viewed model for one load attempt.
///
/// `Loaded` and `FailedFallback` are terminal until a new load request
/// re-enters `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Empty,
    Loading(RequestId),
    Loaded,
    FailedFallback,
}

/// The viewer scene: camera, ground reference plane, and at most one model.
///
/// Owned by the application state and passed by reference everywhere, so
/// the whole scene can be built and exercised without a window or GPU.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub state: ModelState,
    ground: Object,
    model: Option<Object>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager, config: &ViewerConfig) -> Self {
        let ground_data = generate_ground_plane(config.ground_extent, config.ground_extent)
            .to_mesh_data(GROUND_COLOR);
        // The ground catches shadows but never throws them
        let ground = Object::from_meshes("ground", &with_shadows(vec![ground_data], false, true));

        Self {
            camera_manager,
            state: ModelState::Empty,
            ground,
            model: None,
        }
    }

    /// Updates per-frame camera state (damped easing + matrices).
    pub fn update(&mut self) {
        self.camera_manager.camera.tick();
        self.camera_manager.camera.update_view_proj();
    }

    /// Marks a load request as in flight.
    pub fn begin_loading(&mut self, id: RequestId) {
        self.state = ModelState::Loading(id);
    }

    /// Attaches a freshly loaded model, replacing any previous one.
    ///
    /// Fits the model to the configured target size resting on the ground
    /// plane, then frames the camera on the fitted result. On error the
    /// scene is left unchanged so the caller can fall back.
    pub fn attach_model(
        &mut self,
        model: LoadedModel,
        config: &ViewerConfig,
    ) -> Result<(), FitError> {
        let name = model.name.clone();
        let meshes = with_shadows(model.meshes, true, true);
        let mut object = Object::from_meshes(name, &meshes);

        let bounds = object.local_bounds().ok_or(FitError::DegenerateGeometry)?;
        let normalization = compute_normalization(&bounds, config.target_size)?;
        object.set_transform(normalization.to_matrix());

        // Fresh box over the fitted object; the pre-fit one is stale now
        let fitted = object.world_bounds().ok_or(FitError::DegenerateGeometry)?;
        let framing = compute_camera_framing(&fitted, config.fov_degrees)?;

        if self.model.take().is_some() {
            info!("replacing previously attached model");
        }
        info!(
            "attached {} (scale {:.3}, camera distance {:.3})",
            object.name, normalization.scale, framing.distance
        );
        self.model = Some(object);
        self.camera_manager.camera.look_from(framing.eye, framing.target);
        self.state = ModelState::Loaded;
        Ok(())
    }

    /// Substitutes the red placeholder cube and resets the camera to the
    /// fixed fallback pose, looking at the origin.
    ///
    /// Deliberately does not go through the fitting path: the fallback is
    /// a known unit shape at a known pose, and the fixed pose is part of
    /// the viewer's observable failure contract.
    pub fn attach_fallback(&mut self, config: &ViewerConfig) {
        let cube = generate_cube().to_mesh_data(FALLBACK_COLOR);
        let object = Object::from_meshes("fallback-cube", &with_shadows(vec![cube], true, true));

        self.model = Some(object);
        self.camera_manager
            .camera
            .look_from(config.fallback_eye, Vector3::new(0.0, 0.0, 0.0));
        self.state = ModelState::FailedFallback;
    }

    /// Everything drawable, ground first.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        std::iter::once(&self.ground).chain(self.model.iter())
    }

    pub fn model(&self) -> Option<&Object> {
        self.model.as_ref()
    }

    /// Uploads GPU resources for any object that does not have them yet.
    /// Safe to call again after attaching a new object.
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        if self.ground.gpu_resources.is_none() {
            self.ground.init_gpu_resources(device, layout);
        }
        if let Some(model) = self.model.as_mut() {
            if model.gpu_resources.is_none() {
                model.init_gpu_resources(device, layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, OrbitCamera};
    use crate::loader::MeshData;
    use cgmath::{InnerSpace, Zero};

    fn test_scene(config: &ViewerConfig) -> Scene {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller), config)
    }

    fn cube_model() -> LoadedModel {
        LoadedModel {
            name: "cube".to_string(),
            meshes: vec![generate_cube().to_mesh_data([0.5, 0.5, 0.5, 1.0])],
        }
    }

    #[test]
    fn attach_fits_model_to_target_size() {
        let config = ViewerConfig::default();
        let mut scene = test_scene(&config);

        scene.attach_model(cube_model(), &config).unwrap();

        let model = scene.model().unwrap();
        let fitted = model.world_bounds().unwrap();
        assert!((fitted.max_dim() - config.target_size).abs() < 1e-4);
        assert_eq!(scene.state, ModelState::Loaded);
    }

    #[test]
    fn attach_frames_camera_on_fitted_model() {
        let config = ViewerConfig::default();
        let mut scene = test_scene(&config);
        scene.attach_model(cube_model(), &config).unwrap();

        let camera = &scene.camera_manager.camera;
        let center = scene.model().unwrap().world_bounds().unwrap().center();
        assert!((camera.target - center).magnitude() < 1e-4);

        // distance = 5 / (2 tan(37.5 deg)), eye offset (0, 0.5, 1.5) * d
        let expected_eye = center + Vector3::new(0.0, 1.6295, 4.8885);
        assert!((camera.eye - expected_eye).magnitude() < 1e-2);
    }

    #[test]
    fn attach_replaces_previous_model() {
        let config = ViewerConfig::default();
        let mut scene = test_scene(&config);

        scene.attach_model(cube_model(), &config).unwrap();
        scene.attach_model(cube_model(), &config).unwrap();

        // Ground plus exactly one model, never two
        assert_eq!(scene.objects().count(), 2);
    }

    #[test]
    fn degenerate_model_is_rejected_and_scene_unchanged() {
        let config = ViewerConfig::default();
        let mut scene = test_scene(&config);

        let degenerate = LoadedModel {
            name: "point".to_string(),
            meshes: vec![MeshData::new(
                vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
                vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0],
                vec![0, 1, 2],
                [0.5, 0.5, 0.5, 1.0],
            )],
        };

        assert_eq!(
            scene.attach_model(degenerate, &config),
            Err(FitError::DegenerateGeometry)
        );
        assert!(scene.model().is_none());
        assert_eq!(scene.state, ModelState::Empty);
    }

    #[test]
    fn fallback_uses_fixed_pose_and_red_cube() {
        let config = ViewerConfig::default();
        let mut scene = test_scene(&config);

        scene.attach_fallback(&config);

        assert_eq!(scene.state, ModelState::FailedFallback);
        let model = scene.model().unwrap();
        assert_eq!(model.color, FALLBACK_COLOR);
        assert!(model.meshes.iter().all(|m| m.cast_shadow));

        let camera = &scene.camera_manager.camera;
        assert!((camera.eye - config.fallback_eye).magnitude() < 1e-4);
        assert!(camera.target.magnitude() < 1e-4);
    }

    #[test]
    fn load_lifecycle_transitions() {
        let config = ViewerConfig::default();
        let mut scene = test_scene(&config);
        assert_eq!(scene.state, ModelState::Empty);

        scene.begin_loading(1);
        assert_eq!(scene.state, ModelState::Loading(1));

        scene.attach_model(cube_model(), &config).unwrap();
        assert_eq!(scene.state, ModelState::Loaded);

        // A reload request re-enters Loading and may fail into the fallback
        scene.begin_loading(2);
        assert_eq!(scene.state, ModelState::Loading(2));
        scene.attach_fallback(&config);
        assert_eq!(scene.state, ModelState::FailedFallback);
    }
}
