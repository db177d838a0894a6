use bytemuck::{Pod, Zeroable};

use crate::timeline::TimeSample;

/// CPU-side mirror of the viewer uniform block.
///
/// The layout matches the GLSL prelude injected by `compile::wrap_fragment`
/// and must observe std140 alignment rules: vec2 slots sit on 8-byte
/// boundaries and the block size is a multiple of 16.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug)]
pub(crate) struct ViewerUniforms {
    pub i_resolution: [f32; 2],
    pub i_time: f32,
    _pad0: f32,
    pub i_mouse: [f32; 2],
    _pad1: [f32; 2],
}

unsafe impl Zeroable for ViewerUniforms {}
unsafe impl Pod for ViewerUniforms {}

impl ViewerUniforms {
    /// Prepares a uniform block sized to the current surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            i_resolution: [width as f32, height as f32],
            i_time: 0.0,
            _pad0: 0.0,
            i_mouse: [0.0; 2],
            _pad1: [0.0; 2],
        }
    }

    /// Writes the current surface dimensions into `iResolution`.
    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.i_resolution = [width, height];
    }

    /// Advances the per-frame values ahead of the uniform upload.
    pub fn update(&mut self, sample: TimeSample, mouse: [f32; 2]) {
        self.i_time = sample.seconds;
        self.i_mouse = mouse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_obeys_std140() {
        let size = std::mem::size_of::<ViewerUniforms>();
        assert_eq!(size, 32);
        assert_eq!(size % 16, 0);
    }

    #[test]
    fn seeds_resolution_from_surface() {
        let uniforms = ViewerUniforms::new(800, 600);
        assert_eq!(uniforms.i_resolution, [800.0, 600.0]);
        assert_eq!(uniforms.i_time, 0.0);
    }

    #[test]
    fn update_writes_time_and_mouse() {
        let mut uniforms = ViewerUniforms::new(800, 600);
        uniforms.update(TimeSample::new(1.25, 7), [400.0, 300.0]);
        assert_eq!(uniforms.i_time, 1.25);
        assert_eq!(uniforms.i_mouse, [400.0, 300.0]);
        assert_eq!(uniforms.i_resolution, [800.0, 600.0]);
    }
}
