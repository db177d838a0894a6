use bytemuck::{Pod, Zeroable};

/// One corner of the fullscreen quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub position: [f32; 2],
}

/// Four vertices covering clip space, drawn as a triangle strip.
pub(crate) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
    },
];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

/// Buffer layout matching `QUAD_VERTICES` and the vertex shader input.
pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space_square() {
        assert_eq!(QUAD_VERTICES.len(), 4);
        for vertex in &QUAD_VERTICES {
            for coord in vertex.position {
                assert!(coord == -1.0 || coord == 1.0);
            }
        }

        let corners: Vec<[f32; 2]> = QUAD_VERTICES.iter().map(|v| v.position).collect();
        for expected in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(corners.contains(&expected));
        }
    }

    #[test]
    fn strip_order_forms_two_triangles() {
        // Consecutive triples must not be colinear for the strip to cover the quad.
        for window in QUAD_VERTICES.windows(3) {
            let [a, b, c] = [window[0].position, window[1].position, window[2].position];
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross.abs() > 0.0);
        }
    }

    #[test]
    fn layout_matches_vertex_size() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
    }
}
