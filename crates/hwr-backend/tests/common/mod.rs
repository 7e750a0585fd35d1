//! A `GraphicsApi` that records every native call instead of issuing it.

#![allow(dead_code)]

use hwr_backend::{RenderContext, RendererConfig};
use hwr_core::math::Mat4;
use hwr_core::renderer::*;
use std::collections::{HashMap, HashSet};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable(Capability),
    Disable(Capability),
    BlendFunc(BlendFactor, BlendFactor),
    AlphaFunc(CompareFunction, f32),
    DepthFunc(CompareFunction),
    DepthMask(bool),
    ColorMask([bool; 4]),
    ClearColor([f32; 4]),
    ClearDepth(f64),
    DepthRange(f64, f64),
    Clear(ClearMask),
    Viewport(i32, i32, i32, i32),
    CullFace(Face),
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    BindTexture(TextureId),
    ActiveTexture(u32),
    TexImage { width: u32, height: u32, bytes: usize },
    TexSubImage { width: u32, height: u32, bytes: usize },
    TexParameter(TextureParameter),
    GenerateMipmap,
    CopyTexImage(u32),
    CopyTexSubImage(u32),
    CreateShader(ShaderId, ShaderStage),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    UniformMatrix4(UniformLocation),
    Uniform4f(UniformLocation, [f32; 4]),
    Uniform1f(UniformLocation, f32),
    Uniform1i(UniformLocation, i32),
    CreateBuffer(BufferId, usize),
    DestroyBuffer(BufferId),
    BindBuffer(Option<BufferId>),
    EnableAttrib(VertexAttribute),
    DisableAttrib(VertexAttribute),
    AttribPointer {
        attribute: VertexAttribute,
        components: u8,
        format: VertexFormat,
        stride: u32,
        offset: Option<usize>,
    },
    DrawArrays(PrimitiveTopology, u32, u32),
    DrawElements(PrimitiveTopology, usize),
}

impl Call {
    pub fn is_draw(&self) -> bool {
        matches!(self, Call::DrawArrays(..) | Call::DrawElements(..))
    }

    pub fn is_uniform(&self) -> bool {
        matches!(
            self,
            Call::UniformMatrix4(_) | Call::Uniform4f(..) | Call::Uniform1f(..) | Call::Uniform1i(..)
        )
    }
}

#[derive(Debug, Default)]
pub struct RecordingApi {
    pub calls: Vec<Call>,
    /// Sources containing this marker fail to compile.
    pub fail_compile_marker: Option<String>,
    pub fail_initialize: bool,
    pub max_anisotropy: u32,
    next_id: usize,
    shader_sources: HashMap<ShaderId, String>,
    program_sources: HashMap<ProgramId, String>,
    uniform_names: HashMap<UniformLocation, (ProgramId, String)>,
    pub live_textures: HashSet<TextureId>,
    pub buffers: HashMap<BufferId, Vec<u8>>,
    pub programs: HashSet<ProgramId>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_compile_marker: Some(marker.to_owned()),
            ..Self::default()
        }
    }

    pub fn failing_initialize() -> Self {
        Self {
            fail_initialize: true,
            ..Self::default()
        }
    }

    pub fn with_max_anisotropy(max: u32) -> Self {
        Self {
            max_anisotropy: max,
            ..Self::default()
        }
    }

    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|&c| pred(c)).count()
    }

    pub fn draws(&self) -> usize {
        self.count(Call::is_draw)
    }

    /// The uniform name a location was resolved for.
    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        self.uniform_names.get(&location).map(|(_, n)| n.as_str())
    }

    /// Values uploaded to a named vec4 uniform, in order.
    pub fn vec4_uploads(&self, name: &str) -> Vec<[f32; 4]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Uniform4f(loc, v) if self.uniform_name(*loc) == Some(name) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Number of matrix uploads to a named uniform.
    pub fn matrix_uploads(&self, name: &str) -> usize {
        self.count(|c| matches!(c, Call::UniformMatrix4(loc) if self.uniform_name(*loc) == Some(name)))
    }
}

impl GraphicsApi for RecordingApi {
    fn initialize(&mut self) -> Result<ApiInfo, RenderError> {
        if self.fail_initialize {
            return Err(RenderError::InitializationFailed("glUseProgram missing".into()));
        }
        Ok(ApiInfo {
            name: "Recording".into(),
            version: "3.3".into(),
            renderer: "mock".into(),
            max_anisotropy: self.max_anisotropy,
        })
    }

    fn enable(&mut self, capability: Capability) {
        self.calls.push(Call::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.calls.push(Call::Disable(capability));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.calls.push(Call::BlendFunc(src, dst));
    }

    fn alpha_func(&mut self, func: CompareFunction, reference: f32) {
        self.calls.push(Call::AlphaFunc(func, reference));
    }

    fn depth_func(&mut self, func: CompareFunction) {
        self.calls.push(Call::DepthFunc(func));
    }

    fn depth_mask(&mut self, write: bool) {
        self.calls.push(Call::DepthMask(write));
    }

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.calls.push(Call::ColorMask([r, g, b, a]));
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        self.calls.push(Call::ClearColor(color));
    }

    fn clear_depth(&mut self, depth: f64) {
        self.calls.push(Call::ClearDepth(depth));
    }

    fn depth_range(&mut self, near: f64, far: f64) {
        self.calls.push(Call::DepthRange(near, far));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.calls.push(Call::Clear(mask));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(Call::Viewport(x, y, width, height));
    }

    fn cull_face(&mut self, face: Face) {
        self.calls.push(Call::CullFace(face));
    }

    fn create_texture(&mut self) -> Result<TextureId, ResourceError> {
        let id = TextureId(self.next());
        self.live_textures.insert(id);
        self.calls.push(Call::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        self.calls.push(Call::DeleteTexture(id));
        if self.live_textures.remove(&id) {
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.calls.push(Call::BindTexture(id));
    }

    fn active_texture(&mut self, unit: u32) {
        self.calls.push(Call::ActiveTexture(unit));
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]) {
        self.calls.push(Call::TexImage {
            width,
            height,
            bytes: rgba.len(),
        });
    }

    fn tex_sub_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]) {
        self.calls.push(Call::TexSubImage {
            width,
            height,
            bytes: rgba.len(),
        });
    }

    fn tex_parameter(&mut self, parameter: TextureParameter) {
        self.calls.push(Call::TexParameter(parameter));
    }

    fn generate_mipmap(&mut self) {
        self.calls.push(Call::GenerateMipmap);
    }

    fn copy_tex_image_2d(&mut self, size: u32) {
        self.calls.push(Call::CopyTexImage(size));
    }

    fn copy_tex_sub_image_2d(&mut self, size: u32) {
        self.calls.push(Call::CopyTexSubImage(size));
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, ShaderError> {
        let id = ShaderId(self.next());
        self.calls.push(Call::CreateShader(id, stage));
        Ok(id)
    }

    fn compile_shader(&mut self, id: ShaderId, source: &str) -> Result<(), ShaderError> {
        self.calls.push(Call::CompileShader(id));
        if let Some(marker) = &self.fail_compile_marker {
            if source.contains(marker.as_str()) {
                return Err(ShaderError::CompilationError {
                    label: format!("shader {}", id.0),
                    details: format!("syntax error near '{marker}'"),
                });
            }
        }
        self.shader_sources.insert(id, source.to_owned());
        Ok(())
    }

    fn delete_shader(&mut self, id: ShaderId) {
        self.calls.push(Call::DeleteShader(id));
    }

    fn create_program(&mut self) -> Result<ProgramId, ShaderError> {
        let id = ProgramId(self.next());
        self.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn link_program(&mut self, program: ProgramId, shaders: &[ShaderId]) -> Result<(), ShaderError> {
        self.calls.push(Call::LinkProgram(program));
        let mut source = String::new();
        for shader in shaders {
            let Some(s) = self.shader_sources.get(shader) else {
                return Err(ShaderError::LinkError {
                    label: format!("program {}", program.0),
                    details: format!("shader {} was not compiled", shader.0),
                });
            };
            source.push_str(s);
        }
        self.program_sources.insert(program, source);
        self.programs.insert(program);
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.calls.push(Call::DeleteProgram(program));
        self.programs.remove(&program);
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.calls.push(Call::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let source = self.program_sources.get(&program)?;
        if !source.contains(name) {
            return None;
        }
        let location = UniformLocation(self.next() as i32);
        self.uniform_names
            .insert(location, (program, name.to_owned()));
        Some(location)
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, _value: &Mat4) {
        self.calls.push(Call::UniformMatrix4(location));
    }

    fn uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.calls.push(Call::Uniform4f(location, value));
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        self.calls.push(Call::Uniform1f(location, value));
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.calls.push(Call::Uniform1i(location, value));
    }

    fn create_buffer_with_data(&mut self, data: &[u8]) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.next());
        self.buffers.insert(id, data.to_vec());
        self.calls.push(Call::CreateBuffer(id, data.len()));
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        self.calls.push(Call::DestroyBuffer(id));
        self.buffers
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn bind_buffer(&mut self, id: Option<BufferId>) {
        self.calls.push(Call::BindBuffer(id));
    }

    fn enable_vertex_attrib(&mut self, attribute: VertexAttribute) {
        self.calls.push(Call::EnableAttrib(attribute));
    }

    fn disable_vertex_attrib(&mut self, attribute: VertexAttribute) {
        self.calls.push(Call::DisableAttrib(attribute));
    }

    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute, layout: VertexLayout<'_>) {
        let offset = match layout.source {
            VertexSource::Buffer { offset } => Some(offset),
            VertexSource::Client(_) => None,
        };
        self.calls.push(Call::AttribPointer {
            attribute,
            components: layout.components,
            format: layout.format,
            stride: layout.stride,
            offset,
        });
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.calls.push(Call::DrawArrays(topology, first, count));
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, indices: IndexData<'_>) {
        self.calls.push(Call::DrawElements(topology, indices.len()));
    }
}

/// A context that has been initialized, with the init calls discarded.
pub fn ready_context(config: RendererConfig) -> RenderContext<RecordingApi> {
    init_logger();
    let mut ctx = RenderContext::new(RecordingApi::new(), config);
    ctx.init().expect("init should succeed against the recording api");
    ctx.api_mut().clear_calls();
    ctx
}
