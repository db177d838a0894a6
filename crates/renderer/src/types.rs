use crate::timeline::ClockPolicy;

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and tells the renderer which fragment
/// shader text to compile, how large the window surface should be, and how
/// the time uniform should advance.
#[derive(Clone)]
pub struct RendererConfig {
    /// Window surface size in physical pixels.
    pub surface_size: (u32, u32),
    /// Full text of the fragment shader, already loaded from disk.
    pub fragment_source: String,
    /// How the `iTime` uniform advances between frames.
    pub clock: ClockPolicy,
}

impl Default for RendererConfig {
    /// Provides an 800x600 configuration with no shader selected.
    fn default() -> Self {
        Self {
            surface_size: (800, 600),
            fragment_source: String::new(),
            clock: ClockPolicy::default(),
        }
    }
}
