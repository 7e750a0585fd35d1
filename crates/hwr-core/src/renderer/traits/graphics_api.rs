// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::math::Mat4;
use crate::renderer::api::*;
use crate::renderer::error::{RenderError, ResourceError, ShaderError};
use std::fmt::Debug;

/// What the driver reported about itself once its entry points were resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiInfo {
    /// Vendor string.
    pub name: String,
    /// Version string.
    pub version: String,
    /// Renderer string.
    pub renderer: String,
    /// Highest supported anisotropy level, `0` if anisotropic filtering is unavailable.
    pub max_anisotropy: u32,
}

/// The native immediate-mode graphics API the backend drives.
///
/// Every call maps onto one native call of the bound context. Calls are issued
/// from a single thread and take effect immediately; the backend tracks the
/// state it has set and relies on the implementation not changing it behind
/// its back.
pub trait GraphicsApi: Debug {
    /// Resolves the native entry points and queries driver capabilities.
    /// ## Returns
    /// The driver description on success.
    /// ## Errors
    /// * `RenderError::InitializationFailed` - If a required entry point is missing.
    fn initialize(&mut self) -> Result<ApiInfo, RenderError>;

    // --- Fixed-function state ---

    /// Enables a capability.
    fn enable(&mut self, capability: Capability);

    /// Disables a capability.
    fn disable(&mut self, capability: Capability);

    /// Sets the source and destination blend factors.
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Sets the alpha test comparison and reference value.
    fn alpha_func(&mut self, func: CompareFunction, reference: f32);

    /// Sets the depth test comparison.
    fn depth_func(&mut self, func: CompareFunction);

    /// Enables or disables depth writes.
    fn depth_mask(&mut self, write: bool);

    /// Enables or disables writes per color channel.
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);

    /// Sets the color used by color clears.
    fn clear_color(&mut self, color: [f32; 4]);

    /// Sets the depth used by depth clears.
    fn clear_depth(&mut self, depth: f64);

    /// Maps normalized device depth to window depth.
    fn depth_range(&mut self, near: f64, far: f64);

    /// Clears the selected buffers.
    fn clear(&mut self, mask: ClearMask);

    /// Sets the viewport rectangle in window pixels.
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Selects which faces are culled when culling is enabled.
    fn cull_face(&mut self, face: Face);

    // --- Textures ---

    /// Allocates a texture object.
    /// ## Returns
    /// The ID of the new texture.
    /// ## Errors
    /// * `ResourceError::BackendError` - If the driver could not allocate a name.
    fn create_texture(&mut self) -> Result<TextureId, ResourceError>;

    /// Releases a texture object.
    /// ## Arguments
    /// * `id` - The texture to release.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If `id` is not a live texture.
    fn delete_texture(&mut self, id: TextureId) -> Result<(), ResourceError>;

    /// Binds a texture to the active texture unit.
    fn bind_texture(&mut self, id: TextureId);

    /// Selects the texture unit affected by subsequent binds.
    fn active_texture(&mut self, unit: u32);

    /// Allocates storage for the bound texture and fills it with RGBA8 pixels.
    fn tex_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]);

    /// Replaces the contents of the bound texture with RGBA8 pixels.
    fn tex_sub_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]);

    /// Sets a sampler parameter on the bound texture.
    fn tex_parameter(&mut self, parameter: TextureParameter);

    /// Generates the mipmap chain of the bound texture.
    fn generate_mipmap(&mut self);

    /// Allocates the bound texture from the lower-left `size`x`size` square of the framebuffer.
    fn copy_tex_image_2d(&mut self, size: u32);

    /// Copies the lower-left `size`x`size` square of the framebuffer into the bound texture.
    fn copy_tex_sub_image_2d(&mut self, size: u32);

    // --- Shaders ---

    /// Allocates a shader object for a stage.
    /// ## Errors
    /// * `ShaderError::CreationFailed` - If the driver returned no object.
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, ShaderError>;

    /// Uploads source text and compiles a shader.
    /// ## Arguments
    /// * `id` - The shader to compile.
    /// * `source` - Complete GLSL source.
    /// ## Errors
    /// * `ShaderError::CompilationError` - Carrying the compiler's info log.
    fn compile_shader(&mut self, id: ShaderId, source: &str) -> Result<(), ShaderError>;

    /// Releases a shader object.
    fn delete_shader(&mut self, id: ShaderId);

    /// Allocates an empty program object.
    /// ## Errors
    /// * `ShaderError::CreationFailed` - If the driver returned no object.
    fn create_program(&mut self) -> Result<ProgramId, ShaderError>;

    /// Attaches compiled shaders to a program and links it.
    /// ## Arguments
    /// * `program` - The program to link.
    /// * `shaders` - Compiled shaders to attach.
    /// ## Errors
    /// * `ShaderError::LinkError` - Carrying the linker's info log.
    fn link_program(&mut self, program: ProgramId, shaders: &[ShaderId]) -> Result<(), ShaderError>;

    /// Releases a program object.
    fn delete_program(&mut self, program: ProgramId);

    /// Makes a program current. `None` unbinds every program.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Resolves a uniform by name. Returns `None` if the program does not use it.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Uploads a column-major `mat4` to the current program.
    fn uniform_matrix4(&mut self, location: UniformLocation, value: &Mat4);

    /// Uploads a `vec4` to the current program.
    fn uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]);

    /// Uploads a `float` to the current program.
    fn uniform_1f(&mut self, location: UniformLocation, value: f32);

    /// Uploads an `int`, `bool` or sampler unit to the current program.
    fn uniform_1i(&mut self, location: UniformLocation, value: i32);

    // --- Vertex data ---

    /// Creates a static vertex buffer holding `data`.
    /// ## Returns
    /// The ID of the new buffer. The array buffer binding is left unchanged.
    /// ## Errors
    /// * `ResourceError::BackendError` - If the driver could not allocate the buffer.
    fn create_buffer_with_data(&mut self, data: &[u8]) -> Result<BufferId, ResourceError>;

    /// Releases a vertex buffer.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If `id` is not a live buffer.
    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Binds a vertex buffer. `None` switches attribute sources back to client memory.
    fn bind_buffer(&mut self, id: Option<BufferId>);

    /// Enables an attribute array.
    fn enable_vertex_attrib(&mut self, attribute: VertexAttribute);

    /// Disables an attribute array.
    fn disable_vertex_attrib(&mut self, attribute: VertexAttribute);

    /// Describes where an attribute reads its data.
    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute, layout: VertexLayout<'_>);

    // --- Draws ---

    /// Draws `count` vertices starting at `first`.
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32);

    /// Draws vertices selected by an index list.
    fn draw_elements(&mut self, topology: PrimitiveTopology, indices: IndexData<'_>);
}
