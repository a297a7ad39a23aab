use std::{fs, path::Path};

use anyhow::Context;
use glam::Mat4;
use glow::HasContext;

/// Cap on how much info-log text reaches the log sink, sized like a
/// fixed 512-byte retrieval buffer.
pub const MAX_LOG_CHARS: usize = 511;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// The slice of the GL API the shader wrapper touches. Tests stand in a
/// recording mock for `glow::Context` here.
pub trait GlShaderApi {
    type Shader: Copy;
    type Program: Copy;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn delete_shader(&self, shader: Self::Shader);
    fn use_program(&self, program: Self::Program);
    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    fn set_uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4);
    fn set_uniform_f32(&self, location: &Self::UniformLocation, value: f32);
}

impl GlShaderApi for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let stage = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, stage) }
    }
    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }
    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }
    fn compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }
    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }
    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }
    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }
    fn link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }
    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }
    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }
    fn use_program(&self, program: Self::Program) {
        unsafe { HasContext::use_program(self, Some(program)) }
    }
    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }
    fn set_uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4) {
        unsafe { self.uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array()) }
    }
    fn set_uniform_f32(&self, location: &Self::UniformLocation, value: f32) {
        unsafe { self.uniform_1_f32(Some(location), value) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Compile,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    CompileFailed(String),
    LinkFailed(String),
}

/// Shared compile-or-link outcome check. `fetch_log` runs only on failure;
/// its text is capped at [`MAX_LOG_CHARS`] and written to the log sink.
/// Never panics: a failed build is reported, not raised.
pub fn check_status(
    stage: BuildStage,
    query: impl FnOnce() -> bool,
    fetch_log: impl FnOnce() -> String,
) -> BuildOutcome {
    if query() {
        return BuildOutcome::Success;
    }
    let log: String = fetch_log().chars().take(MAX_LOG_CHARS).collect();
    match stage {
        BuildStage::Compile => {
            tracing::error!("shader compile failed: {log}");
            BuildOutcome::CompileFailed(log)
        }
        BuildStage::Link => {
            tracing::error!("program link failed: {log}");
            BuildOutcome::LinkFailed(log)
        }
    }
}

/// Owns one compiled stage handle during program setup. Dropping detaches
/// the stage from its program and deletes it, so stage objects never
/// outlive linking even when setup bails early.
struct StageGuard<'a, G: GlShaderApi> {
    gl: &'a G,
    shader: G::Shader,
    attached_to: Option<G::Program>,
}
impl<'a, G: GlShaderApi> StageGuard<'a, G> {
    fn compile(gl: &'a G, stage: ShaderStage, source: &str) -> anyhow::Result<Self> {
        let shader = gl.create_shader(stage).map_err(anyhow::Error::msg)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        Ok(Self {
            gl,
            shader,
            attached_to: None,
        })
    }

    fn attach(&mut self, program: G::Program) {
        self.gl.attach_shader(program, self.shader);
        self.attached_to = Some(program);
    }
}
impl<G: GlShaderApi> Drop for StageGuard<'_, G> {
    fn drop(&mut self) {
        if let Some(program) = self.attached_to {
            self.gl.detach_shader(program, self.shader);
        }
        self.gl.delete_shader(self.shader);
    }
}

/// A linked vertex+fragment program. Uniforms are looked up by name on
/// every call, never cached.
pub struct ShaderProgram<G: GlShaderApi> {
    program: G::Program,
}
impl<G: GlShaderApi> ShaderProgram<G> {
    /// Reads both source files in full before touching the GL API, then
    /// compiles and links them. I/O and handle allocation failures are
    /// errors; compile and link failures are logged and construction
    /// continues, possibly leaving an unusable program behind.
    pub fn from_files(
        gl: &G,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let vertex_source = read_source(vertex_path.as_ref())?;
        let fragment_source = read_source(fragment_path.as_ref())?;
        Self::from_sources(gl, &vertex_source, &fragment_source)
    }

    pub fn from_sources(
        gl: &G,
        vertex_source: &str,
        fragment_source: &str,
    ) -> anyhow::Result<Self> {
        let mut vertex = StageGuard::compile(gl, ShaderStage::Vertex, vertex_source)?;
        let mut fragment = StageGuard::compile(gl, ShaderStage::Fragment, fragment_source)?;
        let program = gl.create_program().map_err(anyhow::Error::msg)?;
        vertex.attach(program);
        fragment.attach(program);
        gl.link_program(program);
        // Statuses are inspected only after linking.
        check_status(
            BuildStage::Compile,
            || gl.compile_status(vertex.shader),
            || gl.shader_info_log(vertex.shader),
        );
        check_status(
            BuildStage::Compile,
            || gl.compile_status(fragment.shader),
            || gl.shader_info_log(fragment.shader),
        );
        check_status(
            BuildStage::Link,
            || gl.link_status(program),
            || gl.program_info_log(program),
        );
        Ok(Self { program })
    }

    /// Makes this program the active one for subsequent draws.
    pub fn use_program(&self, gl: &G) {
        gl.use_program(self.program);
    }

    /// Returns whether `name` names a uniform of the linked program. An
    /// unknown name is a silent no-op, matching the underlying API.
    pub fn set_mat4(&self, gl: &G, name: &str, value: &Mat4) -> bool {
        match gl.uniform_location(self.program, name) {
            Some(location) => {
                gl.set_uniform_mat4(&location, value);
                true
            }
            None => false,
        }
    }

    pub fn set_float(&self, gl: &G, name: &str, value: f32) -> bool {
        match gl.uniform_location(self.program, name) {
            Some(location) => {
                gl.set_uniform_f32(&location, value);
                true
            }
            None => false,
        }
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read shader source `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use glam::Vec3;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        CreateShader(ShaderStage),
        ShaderSource(u32),
        CompileShader(u32),
        CreateProgram,
        AttachShader(u32, u32),
        LinkProgram(u32),
        DetachShader(u32, u32),
        DeleteShader(u32),
        UseProgram(u32),
        SetMat4(u32),
        SetF32(u32),
    }

    #[derive(Debug, Default)]
    struct MockGl {
        calls: RefCell<Vec<Call>>,
        known_uniforms: Vec<&'static str>,
        fail_compile: bool,
        info_log: String,
    }
    impl MockGl {
        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }
    impl GlShaderApi for MockGl {
        type Shader = u32;
        type Program = u32;
        type UniformLocation = u32;

        fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
            self.record(Call::CreateShader(stage));
            Ok(match stage {
                ShaderStage::Vertex => 1,
                ShaderStage::Fragment => 2,
            })
        }
        fn shader_source(&self, shader: u32, _source: &str) {
            self.record(Call::ShaderSource(shader));
        }
        fn compile_shader(&self, shader: u32) {
            self.record(Call::CompileShader(shader));
        }
        fn compile_status(&self, _shader: u32) -> bool {
            !self.fail_compile
        }
        fn shader_info_log(&self, _shader: u32) -> String {
            self.info_log.clone()
        }
        fn create_program(&self) -> Result<u32, String> {
            self.record(Call::CreateProgram);
            Ok(100)
        }
        fn attach_shader(&self, program: u32, shader: u32) {
            self.record(Call::AttachShader(program, shader));
        }
        fn link_program(&self, program: u32) {
            self.record(Call::LinkProgram(program));
        }
        fn link_status(&self, _program: u32) -> bool {
            true
        }
        fn program_info_log(&self, _program: u32) -> String {
            self.info_log.clone()
        }
        fn detach_shader(&self, program: u32, shader: u32) {
            self.record(Call::DetachShader(program, shader));
        }
        fn delete_shader(&self, shader: u32) {
            self.record(Call::DeleteShader(shader));
        }
        fn use_program(&self, program: u32) {
            self.record(Call::UseProgram(program));
        }
        fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
            self.known_uniforms
                .iter()
                .position(|&known| known == name)
                .map(|i| i as u32)
        }
        fn set_uniform_mat4(&self, location: &u32, _value: &Mat4) {
            self.record(Call::SetMat4(*location));
        }
        fn set_uniform_f32(&self, location: &u32, _value: f32) {
            self.record(Call::SetF32(*location));
        }
    }

    #[test]
    fn test_checker_success_skips_log_fetch() {
        let fetched = Cell::new(false);
        let outcome = check_status(BuildStage::Compile, || true, || {
            fetched.set(true);
            String::new()
        });
        assert_eq!(outcome, BuildOutcome::Success);
        assert!(!fetched.get());
    }

    #[test]
    fn test_checker_failure_carries_log() {
        let outcome = check_status(BuildStage::Link, || false, || "undefined entry point".into());
        assert_eq!(
            outcome,
            BuildOutcome::LinkFailed("undefined entry point".into())
        );
    }

    #[test]
    fn test_checker_truncates_log() {
        let outcome = check_status(BuildStage::Compile, || false, || "x".repeat(600));
        let BuildOutcome::CompileFailed(log) = outcome else {
            panic!("expected compile failure");
        };
        assert_eq!(log.len(), MAX_LOG_CHARS);
    }

    #[test]
    fn test_missing_file_precedes_any_gl_call() {
        let gl = MockGl::default();
        let result =
            ShaderProgram::from_files(&gl, "no-such-Vertex.glsl", "no-such-Fragment.glsl");
        assert!(result.is_err());
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn test_build_sequence_releases_stages_after_link() {
        let gl = MockGl::default();
        ShaderProgram::from_sources(&gl, "void main() {}", "void main() {}").unwrap();
        let calls = gl.calls();
        let link = calls
            .iter()
            .position(|call| *call == Call::LinkProgram(100))
            .unwrap();
        for shader in [1, 2] {
            let detach = calls
                .iter()
                .position(|call| *call == Call::DetachShader(100, shader))
                .unwrap();
            let delete = calls
                .iter()
                .position(|call| *call == Call::DeleteShader(shader))
                .unwrap();
            assert!(link < detach);
            assert!(detach < delete);
        }
    }

    #[test]
    fn test_compile_failure_is_not_fatal() {
        let gl = MockGl {
            fail_compile: true,
            info_log: "syntax error".into(),
            ..Default::default()
        };
        let program = ShaderProgram::from_sources(&gl, "broken", "broken");
        assert!(program.is_ok());
    }

    #[test]
    fn test_unknown_uniform_is_a_noop() {
        let gl = MockGl {
            known_uniforms: vec!["model"],
            ..Default::default()
        };
        let program = ShaderProgram::from_sources(&gl, "", "").unwrap();
        let before = gl.calls().len();
        assert!(!program.set_mat4(&gl, "projection", &Mat4::IDENTITY));
        assert!(!program.set_float(&gl, "time", 0.5));
        assert_eq!(gl.calls().len(), before);
    }

    #[test]
    fn test_known_uniform_is_written() {
        let gl = MockGl {
            known_uniforms: vec!["model", "time"],
            ..Default::default()
        };
        let program = ShaderProgram::from_sources(&gl, "", "").unwrap();
        assert!(program.set_mat4(&gl, "model", &Mat4::from_translation(Vec3::X)));
        assert!(program.set_float(&gl, "time", 0.5));
        let calls = gl.calls();
        assert!(calls.contains(&Call::SetMat4(0)));
        assert!(calls.contains(&Call::SetF32(1)));
    }
}
