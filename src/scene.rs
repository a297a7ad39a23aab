use glow::HasContext;

use crate::{
    mesh::{self, VertexAttributes},
    shader::ShaderProgram,
    transform::FrameTransform,
    ScreenConfig,
};

/// Shader sources are looked up relative to the working directory.
pub const VERTEX_PATH: &str = "Vertex.glsl";
pub const FRAGMENT_PATH: &str = "Fragment.glsl";

/// The cube geometry, its shader program, and the frame transform. Created
/// once before the loop; GL objects live until process exit.
pub struct Scene {
    vertex_array: glow::VertexArray,
    index_count: i32,
    shader: ShaderProgram<glow::Context>,
    transform: FrameTransform,
}
impl Scene {
    pub fn new(gl: &glow::Context, screen: ScreenConfig) -> anyhow::Result<Self> {
        let mesh = mesh::cube();
        let vertex_array = unsafe {
            let vertex_array = gl.create_vertex_array().map_err(anyhow::Error::msg)?;
            gl.bind_vertex_array(Some(vertex_array));

            let vertex_buffer = gl.create_buffer().map_err(anyhow::Error::msg)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertex_buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.vertices),
                glow::STATIC_DRAW,
            );

            let index_buffer = gl.create_buffer().map_err(anyhow::Error::msg)?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.indices),
                glow::STATIC_DRAW,
            );

            let stride = core::mem::size_of::<VertexAttributes>() as i32;
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            let color_offset = (3 * core::mem::size_of::<f32>()) as i32;
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, color_offset);
            gl.enable_vertex_attrib_array(1);

            gl.enable(glow::DEPTH_TEST);
            vertex_array
        };
        let shader = ShaderProgram::from_files(gl, VERTEX_PATH, FRAGMENT_PATH)?;
        shader.use_program(gl);
        Ok(Self {
            vertex_array,
            index_count: mesh.indices.len() as i32,
            shader,
            transform: FrameTransform::new(screen),
        })
    }

    /// One frame: clear, animate, set uniforms, draw the cube.
    pub fn draw(&self, gl: &glow::Context, time: f32) {
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        let model = self.transform.model(time);
        self.shader.set_mat4(gl, "projection", &self.transform.projection());
        self.shader.set_mat4(gl, "model", &model);
        self.shader.set_mat4(gl, "view", &self.transform.view());
        self.shader.set_float(gl, "time", time);
        unsafe {
            gl.bind_vertex_array(Some(self.vertex_array));
            gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
        }
    }
}
