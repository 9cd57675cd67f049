use cgmath::{Deg, Vector3, Zero};
use log::{error, warn};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::{
    config::ViewerConfig,
    gfx::{
        camera::{
            camera_controller::CameraController, camera_utils::CameraManager,
            orbit_camera::OrbitCamera,
        },
        rendering::render_engine::RenderEngine,
        scene::Scene,
    },
    loader::AssetLoader,
};

/// The viewer application: owns the event loop and everything in it.
pub struct ViewerApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

/// All per-instance viewer state, owned in one place and passed by
/// reference. Nothing here is global, so multiple viewers can coexist
/// and the scene is testable without a window.
struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    loader: AssetLoader,
    config: ViewerConfig,
}

impl ViewerApp {
    /// Creates a viewer with the given configuration.
    pub fn new(config: ViewerConfig) -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let mut camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        camera.fovy = Deg(config.fov_degrees).into();
        camera.damping = config.damping;
        camera.bounds.min_distance = Some(config.min_distance);
        camera.bounds.max_distance = Some(config.max_distance);
        camera.bounds.max_pitch = config.max_pitch;
        // Starting pose until the first model lands
        camera.look_from(Vector3::new(5.0, 5.0, 5.0), Vector3::zero());

        let controller = CameraController::new(0.005, 0.1);
        let camera_manager = CameraManager::new(camera, controller);
        let scene = Scene::new(camera_manager, &config);

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene,
                loader: AssetLoader::new(),
                config,
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl AppState {
    /// Collects finished load results and attaches them to the scene.
    ///
    /// Superseded requests never surface here (the loader drops them), so
    /// a model can never be attached twice for one request. Every failure
    /// ends in the fallback cube; nothing propagates out of the loop.
    fn pump_loader(&mut self) {
        let Some((_, result)) = self.loader.poll() else {
            return;
        };

        match result {
            Ok(model) => {
                if let Err(err) = self.scene.attach_model(model, &self.config) {
                    warn!("model unusable ({err}), showing fallback cube");
                    self.scene.attach_fallback(&self.config);
                }
            }
            Err(err) => {
                error!("{err}");
                self.scene.attach_fallback(&self.config);
            }
        }

        if let Some(engine) = self.render_engine.as_ref() {
            self.scene
                .init_gpu_resources(engine.device(), engine.object_bind_group_layout());
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.config.window_size;
        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title(&self.config.window_title)
                .with_inner_size(winit::dpi::LogicalSize::new(width, height)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scene
                .camera_manager
                .camera
                .resize_projection(width, height);

            let window_clone = window_handle.clone();
            let clear_color = self.config.clear_color;
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height, clear_color).await
            });

            self.scene
                .init_gpu_resources(renderer.device(), renderer.object_bind_group_layout());
            self.render_engine = Some(renderer);

            // Kick off the initial asset load; rendering continues while
            // it is in flight
            let id = self.loader.request(&self.config.model_path);
            self.scene.begin_loading(id);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.render_engine.is_none() || self.window.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if key_event.state.is_pressed()
                    && matches!(
                        key_event.physical_key,
                        winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                    )
                {
                    event_loop.exit();
                    return;
                }
                self.scene.camera_manager.process_keyboard_event(&key_event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.pump_loader();
                self.scene.update();

                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.update(self.scene.camera_manager.camera.uniform);
                    render_engine.render_frame(&self.scene);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
