use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::timeline::{time_source_for_policy, TimeSample};
use crate::types::RendererConfig;

/// Fixed title of the viewer window.
pub const WINDOW_TITLE: &str = "fragview";

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives inside [`GpuState`]; `Renderer` opens the window
/// and drives the winit event loop until a quit event arrives.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the viewer window and runs until close or the `q` key.
    ///
    /// A quit event observed during frame N never interrupts that frame's
    /// draw; it stops the loop before frame N+1 begins.
    pub fn run(&mut self) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to initialize event loop")?;
        let window_size = PhysicalSize::new(self.config.surface_size.0, self.config.surface_size.1);
        let window = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(window_size)
            .build(&event_loop)
            .context("failed to create viewer window")?;
        let window = Arc::new(window);

        let mut state = WindowState::new(window.clone(), &self.config)?;
        let mut clock = time_source_for_policy(self.config.clock);
        state.window().request_redraw();

        event_loop
            .run(move |event, elwt| {
                // Drive redraws via vblank by waiting between events.
                elwt.set_control_flow(ControlFlow::Wait);

                match event {
                    Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                        match event {
                            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                                elwt.exit();
                            }
                            WindowEvent::KeyboardInput { event, .. } => {
                                if is_quit_key(&event) {
                                    tracing::info!("quit key pressed; shutting down");
                                    elwt.exit();
                                }
                            }
                            WindowEvent::CursorMoved { position, .. } => {
                                state.mouse.handle_cursor_moved(position);
                            }
                            WindowEvent::Resized(new_size) => {
                                state.resize(new_size);
                            }
                            WindowEvent::ScaleFactorChanged {
                                mut inner_size_writer,
                                ..
                            } => {
                                // Keep the current logical size when the scale factor changes.
                                let _ = inner_size_writer.request_inner_size(state.size());
                            }
                            WindowEvent::RedrawRequested => {
                                match state.render_frame(clock.sample()) {
                                    Ok(()) => {}
                                    Err(
                                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                                    ) => {
                                        state.resize(state.size());
                                    }
                                    Err(wgpu::SurfaceError::OutOfMemory) => {
                                        tracing::error!("surface out of memory; exiting");
                                        elwt.exit();
                                    }
                                    Err(wgpu::SurfaceError::Timeout) => {
                                        tracing::warn!("surface timeout; retrying next frame");
                                    }
                                    Err(other) => {
                                        tracing::warn!(
                                            "surface error: {other:?}; retrying next frame"
                                        );
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        // Schedule the next frame once winit is about to wait again.
                        state.window().request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|err| anyhow!("event loop error: {err}"))
    }
}

/// The letter key that quits the viewer, matching close-request semantics.
fn is_quit_key(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && !event.repeat
        && matches!(
            &event.logical_key,
            Key::Character(value) if value.eq_ignore_ascii_case("q")
        )
}

/// Aggregates the window handle, GPU resources, and pointer tracking.
struct WindowState {
    /// Shared handle to the platform window (`wgpu` needs it for the surface).
    window: Arc<Window>,
    /// GPU resources backing the swapchain and shader pipeline.
    gpu: GpuState,
    /// Pointer tracking for the `iMouse` uniform.
    mouse: MouseState,
}

impl WindowState {
    /// Creates a fully initialised rendering state for the viewer window.
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, &config.fragment_source)?;

        Ok(Self {
            window,
            gpu,
            mouse: MouseState::default(),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    /// Cached physical size of the swapchain surface.
    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    /// Reacts to platform resize events by updating swapchain and uniforms.
    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Records and submits a frame to the GPU.
    fn render_frame(&mut self, sample: TimeSample) -> Result<(), wgpu::SurfaceError> {
        self.gpu.render_frame(sample, self.mouse.as_uniform())
    }
}

/// Tracks the most recent cursor position in physical pixels.
#[derive(Default)]
struct MouseState {
    position: Option<PhysicalPosition<f64>>,
}

impl MouseState {
    /// Records the latest cursor position.
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
    }

    /// Produces the two floats fed to the `iMouse` uniform.
    ///
    /// Coordinates stay in the window's pixel space (top-left origin), the
    /// same space `gl_FragCoord` reports under the wgpu surface.
    fn as_uniform(&self) -> [f32; 2] {
        match self.position {
            Some(pos) => [pos.x as f32, pos.y as f32],
            None => [0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_defaults_to_origin() {
        let mouse = MouseState::default();
        assert_eq!(mouse.as_uniform(), [0.0, 0.0]);
    }

    #[test]
    fn mouse_reports_latest_position() {
        let mut mouse = MouseState::default();
        mouse.handle_cursor_moved(PhysicalPosition::new(10.0, 20.0));
        mouse.handle_cursor_moved(PhysicalPosition::new(400.5, 300.25));
        assert_eq!(mouse.as_uniform(), [400.5, 300.25]);
    }
}
