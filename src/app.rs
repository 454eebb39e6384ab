use std::sync::Arc;

use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::{ConfigError, SceneConfig, WindowConfig},
    gfx::{
        container::WindowContainer, context::RenderContext, error::GpuError, scene::AssetError,
        scene::Scene, surface::SceneSurface,
    },
    lifecycle::{FrameControl, FrameStatus, LifecycleError, LifecycleManager},
};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to attach surface: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("surface can no longer render and was detached")]
    SurfaceFailed,
}

/// Windowed host for the portal scene.
///
/// Creates the window on resume and attaches the scene surface to it;
/// suspending, closing the window or pressing Escape detaches it again.
pub struct VitrineApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    manager: LifecycleManager<SceneSurface>,
    fatal: Option<AppError>,
}

impl VitrineApp {
    pub fn new(config: SceneConfig) -> Result<Self, AppError> {
        let event_loop = EventLoop::new()?;

        let ctx = Arc::new(pollster::block_on(RenderContext::new())?);
        let scene = Scene::from_config(&config)?;
        let surface = SceneSurface::new(ctx, scene, &config.controls, &config.surface);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window_config: config.window,
                window: None,
                manager: LifecycleManager::new(surface),
                fatal: None,
            },
        })
    }

    /// Runs the event loop until the window is closed.
    pub fn run(mut self) -> Result<(), AppError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        // Frames are requested by the tick itself while attached.
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn attach(&mut self, window: &Arc<Window>) -> Result<(), AppError> {
        self.manager.attach(WindowContainer::new(window.clone()))?;
        window.request_redraw();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.manager.detach();
        self.fatal.get_or_insert(err);
        event_loop.exit();
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.manager.detach();
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let attributes = WindowAttributes::default()
                    .with_title(self.window_config.title.clone())
                    .with_inner_size(LogicalSize::new(
                        self.window_config.width,
                        self.window_config.height,
                    ));
                match event_loop.create_window(attributes) {
                    Ok(window) => {
                        let window = Arc::new(window);
                        self.window = Some(window.clone());
                        window
                    }
                    Err(err) => return self.fail(event_loop, err.into()),
                }
            }
        };

        if self.manager.is_attached() {
            return;
        }
        if let Err(err) = self.attach(&window) {
            self.fail(event_loop, err);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        info!("Suspended, detaching surface");
        self.manager.detach();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::KeyboardInput { event, .. } => {
                self.manager.surface_mut().process_keyboard_event(&event);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.manager
                    .surface_mut()
                    .controls_mut()
                    .set_shift_held(modifiers.state().shift_key());
            }
            WindowEvent::Resized(_) => {
                if self.manager.handle_resize() {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => match self.manager.tick() {
                FrameControl::Continue => window.request_redraw(),
                FrameControl::Stop if self.manager.last_frame_status() == Some(FrameStatus::Fatal) => {
                    self.fail(event_loop, AppError::SurfaceFailed)
                }
                FrameControl::Stop => debug!("Frame loop stopped"),
            },
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.manager.is_attached() {
            self.manager.surface_mut().process_device_event(&event);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.manager.detach();
    }
}
