//! Renderer crate for fragview.
//!
//! Glues the winit preview window and the `wgpu` pipeline together. The
//! overall flow is:
//!
//! ```text
//!   CLI / fragview
//!          │ RendererConfig (shader text, size, clock)
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                                      │
//!          │                                      └─▶ ViewerUniforms ─▶ GPU UBO
//! ```
//!
//! `GpuState` owns every GPU resource (surface, device, pipeline, buffers),
//! while `Renderer` is the thin entry point that opens the window and drives
//! the loop. The fragment shader loaded from disk is wrapped at runtime so it
//! can be compiled as Vulkan GLSL and fed the expected uniforms by name.

mod compile;
mod geometry;
mod gpu;
pub mod source;
mod timeline;
mod types;
mod uniforms;
mod window;

pub use source::{load_shader_source, SourceError};
pub use timeline::{
    time_source_for_policy, BoxedTimeSource, ClockPolicy, SteppedTimeSource, TimeSample,
    TimeSource, WallClockTimeSource, DEFAULT_TIME_STEP,
};
pub use types::RendererConfig;
pub use window::{Renderer, WINDOW_TITLE};
