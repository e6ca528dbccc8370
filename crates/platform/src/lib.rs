//! Platform layer: window, event loop and renderer ownership.
//!
//! - Meshes are loaded before the event loop starts so a bad asset fails fast.
//! - Startup errors raised inside winit callbacks are stashed and returned from [`run`].
//! - ESC or the window close button ends the loop; the GPU state is dropped before the window.

use std::{path::PathBuf, sync::Arc, time::Duration, time::Instant};

use anyhow::{Context, Result, anyhow};
use renderer::{GpuState, RendererConfig};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod fps;

pub use fps::FrameCounter;

pub const DEFAULT_TITLE: &str = "Tic-Tac-Toe";
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 1000;

/// Everything the app decides before the window opens.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_mesh: PathBuf,
    pub o_mesh: PathBuf,
    pub show_tiles: bool,
    pub show_fps: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            title: DEFAULT_TITLE.to_owned(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x_mesh: PathBuf::from("assets/x.obj"),
            o_mesh: PathBuf::from("assets/o.obj"),
            show_tiles: false,
            show_fps: false,
        }
    }
}

/// ESC press ends the program; releases and repeats of other keys do nothing.
pub fn is_exit_key(key: PhysicalKey, state: ElementState) -> bool {
    state == ElementState::Pressed && key == PhysicalKey::Code(KeyCode::Escape)
}

/// Drop the GPU state before the window its surface was created from.
/// Returns `true` if either slot was still occupied.
fn release_gpu_then_window<G, W>(gpu: &mut Option<G>, window: &mut Option<W>) -> bool {
    let released = gpu.is_some() || window.is_some();
    drop(gpu.take());
    drop(window.take());
    released
}

/// Open the window and draw the board until it is closed.
pub fn run(config: RunConfig) -> Result<()> {
    let x_mesh = asset::load_obj_from_path(&config.x_mesh).context("Loading X mesh")?;
    let o_mesh = asset::load_obj_from_path(&config.o_mesh).context("Loading O mesh")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App {
        renderer_config: Some(RendererConfig {
            backends: config.backends,
            x_mesh,
            o_mesh,
            show_tiles: config.show_tiles,
        }),
        fps: config
            .show_fps
            .then(|| FrameCounter::new(Duration::from_secs(1))),
        config,
        window: None,
        gpu: None,
        error: None,
    };

    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: RunConfig,
    renderer_config: Option<RendererConfig>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    fps: Option<FrameCounter>,
    error: Option<anyhow::Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let renderer_config = self
            .renderer_config
            .take()
            .context("Renderer already initialised")?;
        let gpu = pollster::block_on(GpuState::new(window.clone(), renderer_config))?;

        window.request_redraw();
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        release_gpu_then_window(&mut self.gpu, &mut self.window);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match gpu.render() {
            Ok(()) => {
                if let Some(fps) = self.fps.as_mut().and_then(|c| c.tick(Instant::now())) {
                    log::info!("FPS: {:.1}", fps);
                }
            }
            Err(err) if GpuState::is_surface_lost(&err) => {
                log::warn!("Surface lost/outdated ({err:?}), reconfiguring");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
            }
            Err(err) => {
                log::error!("Fatal surface error: {err:?}");
                self.error = Some(anyhow!("Surface error: {err:?}"));
                self.shutdown(event_loop);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            log::error!("Startup failed: {err:#}");
            self.error = Some(err);
            self.shutdown(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } if is_exit_key(physical_key, state) => {
                log::info!("Escape pressed. Exiting event loop.");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed: {:.3}", scale_factor);
                if let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) {
                    let size = window.inner_size();
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn escape_press_exits() {
        let esc = PhysicalKey::Code(KeyCode::Escape);
        assert!(is_exit_key(esc, ElementState::Pressed));
        assert!(!is_exit_key(esc, ElementState::Released));
    }

    #[test]
    fn other_keys_do_not_exit() {
        assert!(!is_exit_key(PhysicalKey::Code(KeyCode::KeyQ), ElementState::Pressed));
        assert!(!is_exit_key(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed));
        assert!(!is_exit_key(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            ElementState::Pressed
        ));
    }

    struct Recorded(&'static str, Rc<RefCell<Vec<&'static str>>>);

    impl Drop for Recorded {
        fn drop(&mut self) {
            self.1.borrow_mut().push(self.0);
        }
    }

    #[test]
    fn teardown_drops_gpu_before_window() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut gpu = Some(Recorded("gpu", log.clone()));
        let mut window = Some(Recorded("window", log.clone()));

        assert!(release_gpu_then_window(&mut gpu, &mut window));
        assert!(gpu.is_none() && window.is_none());
        assert_eq!(*log.borrow(), vec!["gpu", "window"]);

        // A second shutdown (close after ESC) has nothing left to release.
        assert!(!release_gpu_then_window(&mut gpu, &mut window));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn defaults_match_the_board_window() {
        let cfg = RunConfig::default();
        assert_eq!((cfg.width, cfg.height), (1000, 1000));
        assert_eq!(cfg.title, "Tic-Tac-Toe");
        assert!(!cfg.show_tiles);
        assert!(cfg.x_mesh.ends_with("x.obj"));
        assert!(cfg.o_mesh.ends_with("o.obj"));
    }

    #[test]
    fn missing_mesh_fails_before_window() {
        let cfg = RunConfig {
            x_mesh: PathBuf::from("no/such/x.obj"),
            ..RunConfig::default()
        };
        let err = run(cfg).unwrap_err();
        assert!(format!("{err:#}").contains("Loading X mesh"));
    }
}
