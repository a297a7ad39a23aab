use bytemuck_derive::{Pod, Zeroable};

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct VertexAttributes {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Debug)]
pub struct Mesh {
    pub vertices: Vec<VertexAttributes>,
    pub indices: Vec<u32>,
}

/// Unit-ish cube: two quads one unit apart in z, stitched by 12 triangles.
pub fn cube() -> Mesh {
    let vertices = vec![
        VertexAttributes {
            position: [-0.5, 0.5, 0.],
            color: [0.5, 0., 1.],
        },
        VertexAttributes {
            position: [0.5, 0.5, 0.],
            color: [1., 0., 0.],
        },
        VertexAttributes {
            position: [0.5, -0.5, 0.],
            color: [1., 1., 0.],
        },
        VertexAttributes {
            position: [-0.5, -0.5, 0.],
            color: [0., 1., 1.],
        },
        VertexAttributes {
            position: [-0.5, 0.5, -1.],
            color: [0.5, 0., 1.],
        },
        VertexAttributes {
            position: [0.5, 0.5, -1.],
            color: [1., 0., 0.],
        },
        VertexAttributes {
            position: [0.5, -0.5, -1.],
            color: [1., 1., 0.],
        },
        VertexAttributes {
            position: [-0.5, -0.5, -1.],
            color: [0., 1., 1.],
        },
    ];
    let indices = vec![
        0, 1, 2, //
        3, 2, 0, //
        4, 5, 6, //
        7, 6, 4, //
        4, 0, 1, //
        1, 5, 4, //
        2, 3, 6, //
        6, 7, 3, //
        0, 3, 4, //
        4, 7, 3, //
        1, 2, 6, //
        1, 5, 6, //
    ];
    Mesh { vertices, indices }
}
