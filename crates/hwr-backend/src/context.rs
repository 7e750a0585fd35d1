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

//! The render context: every backend entry point the scene renderer calls.

use crate::blend::BlendStateMachine;
use crate::config::{FilterSettings, RendererConfig};
use crate::model::{interpolation_fraction, FrameSelection, LerpBuffers, ModelBufferCache};
use crate::screen::{
    capture_uvs, letterbox, warp_cell, ScreenTexture, ScreenTextures, WarpGrid, FADE_MASK_UVS,
    FULLSCREEN_QUAD, SCREEN_VERTS,
};
use crate::shader::{ShaderRegistry, ShaderSlot, Uniform};
use crate::sky::SkyDome;
use crate::texture_cache::TextureCache;
use crate::transform::{ClipPlanes, TransformState};
use hwr_core::math::{degrees_to_radians, Mat4, Vec3};
use hwr_core::renderer::{
    ApiInfo, Capability, ClearMask, CompareFunction, Face, GraphicsApi, IndexData, Model, ModelKey,
    OutVertex, Point2, PolyFlags, PrimitiveTopology, RenderError, Rgba8, SceneTransform, SurfaceInfo,
    TextureInfo, TextureKey, TextureParameter, TextureWrap, VertexAttribute, VertexFormat,
    VertexLayout, VertexSource,
};

const WHITE: [f32; 4] = [1.0; 4];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Texture height the sky dome is scaled against.
const SKY_TEXTURE_BASE_HEIGHT: f32 = 230.0;

/// Out-of-band switches set by the scene renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialState {
    /// Model lighting on or off.
    ModelLighting(bool),
    /// Per-surface shader programs on or off.
    Shaders(bool),
    /// Raw texture filter preset number. Unknown numbers select a fallback.
    TextureFilter(i32),
    /// Requested anisotropy level.
    Anisotropy(u32),
}

/// Owns the native API and all state layered on top of it.
///
/// Every operation assumes exclusive, single-threaded access to one context.
/// Draws issued before [`RenderContext::init`] has compiled the programs are
/// silently skipped.
#[derive(Debug)]
pub struct RenderContext<A: GraphicsApi> {
    api: A,
    config: RendererConfig,
    info: Option<ApiInfo>,
    blend: BlendStateMachine,
    textures: TextureCache,
    shaders: ShaderRegistry,
    transform: TransformState,
    sky: SkyDome,
    models: ModelBufferCache,
    lerp: LerpBuffers,
    screen: ScreenTextures,
    screen_width: u32,
    screen_height: u32,
    near_clip: f32,
    model_lighting: bool,
}

impl<A: GraphicsApi> RenderContext<A> {
    /// Wraps a native API. Nothing is issued until [`Self::init`].
    pub fn new(api: A, config: RendererConfig) -> Self {
        Self {
            textures: TextureCache::new(config.texture_filter.settings()),
            shaders: ShaderRegistry::new(config.max_custom_shaders, config.shaders_enabled),
            near_clip: config.near_clip,
            model_lighting: config.model_lighting,
            api,
            config,
            info: None,
            blend: BlendStateMachine::new(),
            transform: TransformState::default(),
            sky: SkyDome::new(),
            models: ModelBufferCache::new(),
            lerp: LerpBuffers::new(),
            screen: ScreenTextures::new(),
            screen_width: 0,
            screen_height: 0,
        }
    }

    /// Brings up the native API, sets the permanent states and compiles the programs.
    ///
    /// ## Returns
    /// What the backend reported about itself.
    ///
    /// ## Errors
    /// * Whatever the backend returns when it cannot resolve its entry points.
    /// * `RenderError::ResourceError` - If the placeholder texture cannot be created.
    ///
    /// Programs that fail to build do not fail initialization; they stay inert.
    pub fn init(&mut self) -> Result<ApiInfo, RenderError> {
        let info = self.api.initialize()?;
        log::info!(
            "RenderContext: {} {} on {} (max anisotropy {})",
            info.name,
            info.version,
            info.renderer,
            info.max_anisotropy
        );

        self.textures.set_max_anisotropy(info.max_anisotropy);
        self.textures.set_anisotropy(self.config.anisotropy);

        self.blend.bootstrap(&mut self.api);
        self.textures.set_bound(None);
        self.textures.bind_placeholder(&mut self.api)?;

        self.shaders.compile_all(&mut self.api);
        self.shaders.sync_transform(&mut self.api, &self.transform);

        self.api.enable_vertex_attrib(VertexAttribute::Position);
        self.api.enable_vertex_attrib(VertexAttribute::TexCoord);

        self.info = Some(info.clone());
        Ok(info)
    }

    /// Releases every native object the context created.
    pub fn shutdown(&mut self) {
        self.shaders.kill_shaders(&mut self.api);
        self.textures.release_all(&mut self.api);
        self.models.clear(&mut self.api);
        self.sky.release(&mut self.api);
        self.screen.flush(&mut self.api);
        log::info!("RenderContext: Shut down");
    }

    /// The native API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The native API, mutably.
    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    /// Startup configuration.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// What the backend reported at [`Self::init`].
    pub fn info(&self) -> Option<&ApiInfo> {
        self.info.as_ref()
    }

    /// Flags last applied.
    pub fn blend_flags(&self) -> PolyFlags {
        self.blend.current()
    }

    /// The texture cache.
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// The program registry.
    pub fn shaders(&self) -> &ShaderRegistry {
        &self.shaders
    }

    /// The global matrices.
    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// The sky dome.
    pub fn sky(&self) -> &SkyDome {
        &self.sky
    }

    /// Model frame buffers.
    pub fn models(&self) -> &ModelBufferCache {
        &self.models
    }

    /// Interpolation scratch buffers.
    pub fn lerp_buffers(&self) -> &LerpBuffers {
        &self.lerp
    }

    /// Screen captures.
    pub fn screen_textures(&self) -> &ScreenTextures {
        &self.screen
    }

    /// Size set by the last [`Self::set_model_view`].
    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    /// Near plane used by the next projection.
    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    /// Whether model lighting is on.
    pub fn model_lighting(&self) -> bool {
        self.model_lighting
    }

    // --- Render state ---

    /// Moves the native state to `flags`.
    pub fn set_blend(&mut self, flags: PolyFlags) {
        let change = self.blend.apply(&mut self.api, flags);
        if change.bind_placeholder {
            if let Err(e) = self.textures.bind_placeholder(&mut self.api) {
                log::warn!("RenderContext: Failed to bind placeholder texture: {e}");
            }
        }
    }

    /// Clears the requested buffers.
    ///
    /// Clearing depth also turns depth writes on; not clearing it turns them off.
    pub fn clear(&mut self, color: bool, depth: bool, clear_color: Option<[f32; 4]>) {
        let mut mask = ClearMask::EMPTY;
        if color {
            if let Some(c) = clear_color {
                self.api.clear_color(c);
            }
            mask |= ClearMask::COLOR;
        }
        if depth {
            self.api.clear_depth(1.0);
            self.api.depth_range(0.0, 1.0);
            self.api.depth_func(CompareFunction::LessEqual);
            mask |= ClearMask::DEPTH;
        }

        let mut flags = self.blend.current();
        flags.set(PolyFlags::OCCLUDE, depth);
        self.set_blend(flags);
        self.api.clear(mask);

        self.api.enable_vertex_attrib(VertexAttribute::Position);
        self.api.enable_vertex_attrib(VertexAttribute::TexCoord);
    }

    /// Applies an out-of-band switch.
    pub fn set_special_state(&mut self, state: SpecialState) {
        match state {
            SpecialState::ModelLighting(on) => self.model_lighting = on,
            SpecialState::Shaders(on) => self.shaders.set_enabled(on),
            SpecialState::TextureFilter(raw) => {
                let filter = FilterSettings::from_raw_preset(raw, self.textures.filter());
                log::debug!("RenderContext: Texture filter preset {raw} -> {filter:?}");
                self.textures.set_filter(filter);
                self.textures.flush(&mut self.api);
            }
            SpecialState::Anisotropy(level) => {
                let applied = self.textures.set_anisotropy(level);
                log::debug!("RenderContext: Anisotropy {level} requested, {applied} applied");
                if self.textures.max_anisotropy() > 0 {
                    self.textures.flush(&mut self.api);
                }
            }
        }
    }

    // --- Textures ---

    /// Binds a texture, uploading it first if needed, or the placeholder for `None`.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If the texture cannot be created or the
    ///   descriptor's data is too short.
    pub fn set_texture(&mut self, info: Option<&TextureInfo<'_>>) -> Result<(), RenderError> {
        match info {
            Some(info) => self.textures.bind_or_upload(&mut self.api, info)?,
            None => self.textures.bind_placeholder(&mut self.api)?,
        }
        Ok(())
    }

    /// Re-uploads a descriptor's pixels.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - As for [`Self::set_texture`].
    pub fn update_texture(&mut self, info: &TextureInfo<'_>) -> Result<(), RenderError> {
        self.textures.update(&mut self.api, info)?;
        Ok(())
    }

    /// Replaces the palette used by paletted formats and drops every cached texture.
    pub fn set_palette(&mut self, palette: &[Rgba8; 256]) {
        self.textures.set_palette(palette);
        self.textures.flush(&mut self.api);
    }

    /// Drops every cached texture.
    pub fn flush_textures(&mut self) {
        self.textures.flush(&mut self.api);
    }

    /// Bytes accounted for every cached texture.
    pub fn texture_memory_used(&self) -> usize {
        self.textures.memory_used()
    }

    // --- Shaders ---

    /// Activates the program for a surface kind.
    pub fn set_shader(&mut self, slot: ShaderSlot) {
        self.shaders.set_shader(&mut self.api, slot, &self.transform);
    }

    /// Returns to the base program.
    pub fn unset_shader(&mut self) {
        self.shaders.unset_shader(&mut self.api);
    }

    /// Sets the level time, in tics, uploaded with every draw.
    pub fn set_shader_info(&mut self, level_time: i32) {
        self.shaders.set_level_time(level_time);
    }

    /// Stores injected program source; it is built by [`Self::init_custom_shaders`].
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If `number` is not a valid custom shader number.
    pub fn load_custom_shader(
        &mut self,
        number: usize,
        source: &str,
        fragment: bool,
    ) -> Result<(), RenderError> {
        self.shaders.load_custom_shader(number, source, fragment)?;
        Ok(())
    }

    /// Rebuilds every program with the injected sources. Returns how many linked.
    pub fn init_custom_shaders(&mut self) -> usize {
        let linked = self.shaders.init_custom_shaders(&mut self.api);
        self.shaders.sync_transform(&mut self.api, &self.transform);
        linked
    }

    /// Releases every program. Draws no-op until the next [`Self::init_custom_shaders`].
    pub fn kill_shaders(&mut self) {
        self.shaders.kill_shaders(&mut self.api);
    }

    // --- Transforms and viewport ---

    /// Rebuilds the projection and view for a camera, or resets them for `None`.
    pub fn set_transform(&mut self, scene: Option<&SceneTransform>) {
        let clip = ClipPlanes {
            near: self.near_clip,
            far: self.config.far_clip,
        };
        self.transform.set_scene(scene, clip);
        self.shaders.sync_transform(&mut self.api, &self.transform);
    }

    /// Sets the screen size and a full-screen viewport.
    ///
    /// A size change invalidates the screen captures.
    pub fn set_model_view(&mut self, width: u32, height: u32) {
        if (width, height) != (self.screen_width, self.screen_height) {
            self.screen.flush(&mut self.api);
        }
        self.screen_width = width;
        self.screen_height = height;
        self.api.viewport(0, 0, width as i32, height as i32);

        self.transform.reset();
        self.shaders.sync_transform(&mut self.api, &self.transform);
    }

    /// Restricts drawing to a rectangle given in top-down screen coordinates.
    pub fn clip_rect(&mut self, min_x: i32, min_y: i32, max_x: i32, max_y: i32, near_clip: f32) {
        self.api.viewport(
            min_x,
            self.screen_height as i32 - max_y,
            max_x - min_x,
            max_y - min_y,
        );
        self.near_clip = near_clip;

        self.transform.reset();
        self.shaders.sync_transform(&mut self.api, &self.transform);
    }

    // --- Draws ---

    fn prepare_polygon(&mut self, surface: Option<&SurfaceInfo>, flags: PolyFlags) {
        self.set_blend(flags);
        let modulated = self.blend.current().contains(PolyFlags::MODULATED);
        match surface.filter(|_| modulated) {
            Some(s) => self.shaders.upload_uniforms(
                &mut self.api,
                surface,
                Some(s.poly_color.to_f32()),
                Some(s.tint_color.to_f32()),
                Some(s.fade_color.to_f32()),
            ),
            None => self
                .shaders
                .upload_uniforms(&mut self.api, surface, Some(WHITE), None, None),
        }
    }

    fn point_at_vertices(&mut self, vertices: &[OutVertex]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        self.api.bind_buffer(None);
        self.api.vertex_attrib_pointer(
            VertexAttribute::Position,
            VertexLayout {
                components: 3,
                format: VertexFormat::F32,
                stride: OutVertex::STRIDE,
                source: VertexSource::Client(bytes),
            },
        );
        self.api.vertex_attrib_pointer(
            VertexAttribute::TexCoord,
            VertexLayout {
                components: 2,
                format: VertexFormat::F32,
                stride: OutVertex::STRIDE,
                source: VertexSource::Client(bytes.get(OutVertex::UV_OFFSET..).unwrap_or_default()),
            },
        );
    }

    /// Draws a convex polygon as a triangle fan.
    ///
    /// Wrap overrides requested through `flags` are undone afterwards.
    pub fn draw_polygon(
        &mut self,
        surface: Option<&SurfaceInfo>,
        vertices: &[OutVertex],
        flags: PolyFlags,
    ) {
        if !self.shaders.can_draw() {
            return;
        }
        self.prepare_polygon(surface, flags);
        self.point_at_vertices(vertices);
        self.api
            .draw_arrays(PrimitiveTopology::TriangleFan, 0, vertices.len() as u32);

        if flags.contains(PolyFlags::REMOVE_Y_WRAP) {
            self.api
                .tex_parameter(TextureParameter::WrapT(TextureWrap::Repeat));
        }
        if flags.contains(PolyFlags::FORCE_WRAP_X) {
            self.api
                .tex_parameter(TextureParameter::WrapS(TextureWrap::ClampToEdge));
        }
        if flags.contains(PolyFlags::FORCE_WRAP_Y) {
            self.api
                .tex_parameter(TextureParameter::WrapT(TextureWrap::ClampToEdge));
        }
    }

    /// Draws indexed triangles.
    pub fn draw_indexed(
        &mut self,
        surface: Option<&SurfaceInfo>,
        vertices: &[OutVertex],
        flags: PolyFlags,
        indices: &[u32],
    ) {
        if !self.shaders.can_draw() {
            return;
        }
        self.prepare_polygon(surface, flags);
        self.point_at_vertices(vertices);
        self.api
            .draw_elements(PrimitiveTopology::TriangleList, IndexData::U32(indices));
    }

    /// Draws a one-pixel-wide line in normalized screen coordinates.
    pub fn draw_2d_line(&mut self, v1: Point2, v2: Point2, color: Rgba8) {
        if !self.shaders.can_draw() {
            return;
        }
        if let Err(e) = self.textures.bind_placeholder(&mut self.api) {
            log::warn!("RenderContext: Failed to bind placeholder texture: {e}");
        }

        let quad = line_quad(v1, v2, self.screen_width, self.screen_height);
        self.shaders
            .upload_poly_color(&mut self.api, color.to_f32());
        self.api.vertex_attrib_pointer(
            VertexAttribute::Position,
            VertexLayout::client(3, VertexFormat::F32, bytemuck::cast_slice(&quad)),
        );
        self.api.draw_arrays(PrimitiveTopology::TriangleFan, 0, 4);
    }

    /// Uploads every keyframe of a model, replacing any buffers it had.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If a frame is malformed or a buffer
    ///   cannot be created.
    pub fn create_model_buffers(&mut self, model: &Model) -> Result<usize, RenderError> {
        Ok(self.models.create(&mut self.api, model)?)
    }

    /// Destroys a model's frame buffers.
    pub fn release_model_buffers(&mut self, key: ModelKey) {
        self.models.release(&mut self.api, key);
    }

    /// Draws a model at `pos`, blending toward `next_frame` as the frame elapses.
    ///
    /// ## Arguments
    /// * `frame` / `next_frame` - Keyframe indices; `next_frame` of `-1` disables blending.
    /// * `duration` / `tics` - Frame length and tics remaining, both in tics.
    /// * `scale` - Uniform model scale.
    /// * `flipped` / `hflipped` - Vertical and horizontal mirroring.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If lazily creating the buffers fails or
    ///   an interpolated frame is malformed.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_model(
        &mut self,
        model: &Model,
        frame: i32,
        duration: i32,
        tics: i32,
        next_frame: i32,
        pos: &SceneTransform,
        scale: f32,
        flipped: bool,
        hflipped: bool,
        surface: &SurfaceInfo,
    ) -> Result<(), RenderError> {
        if !self.shaders.can_draw() {
            return Ok(());
        }
        if !self.models.contains(model.key) {
            self.models.create(&mut self.api, model)?;
        }

        let fraction = interpolation_fraction(duration, tics);
        let poly = surface.poly_color.to_f32();
        let blend = if poly[3] < 1.0 {
            PolyFlags::TRANSLUCENT
        } else {
            PolyFlags::MASKED | PolyFlags::OCCLUDE
        };
        self.set_blend(blend | PolyFlags::MODULATED);

        self.api.enable_vertex_attrib(VertexAttribute::Normal);
        self.shaders.upload_uniforms(
            &mut self.api,
            Some(surface),
            Some(poly),
            Some(surface.tint_color.to_f32()),
            Some(surface.fade_color.to_f32()),
        );

        self.api.enable(Capability::CullFace);
        self.api.enable(Capability::Normalize);
        // An odd number of flips turns the model inside out.
        let reverse_cull = flipped ^ hflipped ^ pos.flip;
        self.api
            .cull_face(if reverse_cull { Face::Front } else { Face::Back });

        self.transform.model = model_matrix(pos, scale, flipped, hflipped, model.uses_tiny_frames());
        self.shaders.sync_transform(&mut self.api, &self.transform);

        let selection = FrameSelection {
            frame,
            next: (next_frame != -1).then_some(next_frame),
            fraction,
        };
        let result = self
            .models
            .draw(&mut self.api, model, selection, &mut self.lerp);

        self.transform.model = Mat4::IDENTITY;
        self.shaders.sync_transform(&mut self.api, &self.transform);
        self.api.disable_vertex_attrib(VertexAttribute::Normal);
        self.api.disable(Capability::CullFace);
        self.api.disable(Capability::Normalize);

        result.map_err(RenderError::from)
    }

    /// Draws the sky dome for `texture` as seen from `transform`.
    ///
    /// The dome is rebuilt only when the texture or the sky detail changed.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If the dome buffer cannot be created.
    pub fn render_sky_dome(
        &mut self,
        texture: TextureKey,
        width: i32,
        height: i32,
        transform: &SceneTransform,
    ) -> Result<(), RenderError> {
        self.set_blend(PolyFlags::TRANSLUCENT | PolyFlags::NO_DEPTH_TEST | PolyFlags::MODULATED);
        self.set_transform(Some(transform));
        let result = self.render_dome(texture, width, height);
        self.set_blend(PolyFlags::EMPTY);
        result
    }

    fn render_dome(&mut self, texture: TextureKey, width: i32, height: i32) -> Result<(), RenderError> {
        let columns = 4 * self.config.sky_detail;
        self.sky.prepare(&mut self.api, texture, width, columns)?;

        if !self.shaders.can_draw() {
            self.api.bind_buffer(None);
            return Ok(());
        }

        self.sky.bind_attributes(&mut self.api);
        self.transform
            .view
            .scale(Vec3::new(1.0, height as f32 / SKY_TEXTURE_BASE_HEIGHT, 1.0))
            .rotate_y(degrees_to_radians(270.0));
        self.shaders.sync_transform(&mut self.api, &self.transform);

        self.sky.draw_loops(&mut self.api);

        self.shaders.upload_poly_color(&mut self.api, WHITE);
        self.api.disable_vertex_attrib(VertexAttribute::Colors);
        self.api.bind_buffer(None);
        Ok(())
    }

    // --- Screen effects ---

    fn capture(&mut self, which: ScreenTexture) -> Result<(), RenderError> {
        let id = self.screen.capture(&mut self.api, which, self.screen_width)?;
        self.textures.set_bound(Some(id));
        Ok(())
    }

    /// Captures the framebuffer for intermissions and post effects.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If the capture texture cannot be created.
    pub fn make_screen_texture(&mut self) -> Result<(), RenderError> {
        self.capture(ScreenTexture::Screen)
    }

    /// Captures the framebuffer for the final present.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If the capture texture cannot be created.
    pub fn make_screen_final_texture(&mut self) -> Result<(), RenderError> {
        self.capture(ScreenTexture::Final)
    }

    /// Captures the screen a wipe starts from.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If the capture texture cannot be created.
    pub fn start_screen_wipe(&mut self) -> Result<(), RenderError> {
        self.capture(ScreenTexture::StartWipe)
    }

    /// Captures the screen a wipe ends on.
    ///
    /// ## Errors
    /// * `RenderError::ResourceError` - If the capture texture cannot be created.
    pub fn end_screen_wipe(&mut self) -> Result<(), RenderError> {
        self.capture(ScreenTexture::EndWipe)
    }

    /// Deletes every screen capture.
    pub fn flush_screen_textures(&mut self) {
        self.screen.flush(&mut self.api);
    }

    fn bind_screen(&mut self, which: ScreenTexture) {
        match self.screen.get(which) {
            Some(id) => self.textures.bind(&mut self.api, id),
            None => log::warn!("RenderContext: {which:?} was never captured"),
        }
    }

    fn point_at_quad(&mut self, positions: &[f32; 12], uvs: &[f32; 8]) {
        self.api.vertex_attrib_pointer(
            VertexAttribute::Position,
            VertexLayout::client(3, VertexFormat::F32, bytemuck::cast_slice(positions)),
        );
        self.api.vertex_attrib_pointer(
            VertexAttribute::TexCoord,
            VertexLayout::client(2, VertexFormat::F32, bytemuck::cast_slice(uvs)),
        );
    }

    /// Draws the last captured scene full-screen.
    pub fn draw_intermission_bg(&mut self) {
        if !self.shaders.can_draw() {
            return;
        }
        let uvs = capture_uvs(self.screen_width, self.screen_height);
        self.api.clear(ClearMask::COLOR | ClearMask::DEPTH);
        self.bind_screen(ScreenTexture::Screen);
        self.shaders.upload_poly_color(&mut self.api, WHITE);
        self.point_at_quad(&FULLSCREEN_QUAD, &uvs);
        self.api.draw_arrays(PrimitiveTopology::TriangleFan, 0, 4);
    }

    /// Blends the wipe captures through the bound fade mask.
    pub fn do_screen_wipe(&mut self) {
        self.do_wipe(false, false, false);
    }

    /// Fades through the bound fade mask toward white or black.
    pub fn do_tinted_wipe(&mut self, fading_in: bool, to_white: bool) {
        self.do_wipe(true, fading_in, to_white);
    }

    fn do_wipe(&mut self, tinted: bool, fading_in: bool, to_white: bool) {
        if !self.shaders.has_current() {
            return;
        }
        let fade_mask = self.textures.bound();
        let uvs = capture_uvs(self.screen_width, self.screen_height);

        self.api.clear(ClearMask::COLOR | ClearMask::DEPTH);
        self.set_blend(PolyFlags::MODULATED | PolyFlags::TRANSLUCENT | PolyFlags::NO_DEPTH_TEST);

        self.api.disable_vertex_attrib(VertexAttribute::Colors);
        self.api.enable_vertex_attrib(VertexAttribute::TexCoord1);

        let slot = if tinted {
            ShaderSlot::FadeMaskTinted
        } else {
            ShaderSlot::FadeMask
        };
        if self.shaders.set_program(&mut self.api, slot) {
            self.shaders.upload_int(&mut self.api, Uniform::StartScreen, 0);
            self.shaders.upload_int(&mut self.api, Uniform::EndScreen, 1);
            self.shaders.upload_int(&mut self.api, Uniform::FadeMask, 2);
            if tinted {
                self.shaders
                    .upload_int(&mut self.api, Uniform::IsFadingIn, i32::from(fading_in));
                self.shaders
                    .upload_int(&mut self.api, Uniform::IsToWhite, i32::from(to_white));
            }
            self.shaders.upload_poly_color(&mut self.api, WHITE);
            self.shaders.sync_transform(&mut self.api, &self.transform);
        }
        if !self.shaders.can_draw() {
            self.api.disable_vertex_attrib(VertexAttribute::TexCoord1);
            self.shaders.unset_shader(&mut self.api);
            return;
        }

        let start = self.screen.get(ScreenTexture::StartWipe);
        let units = [start, self.screen.get(ScreenTexture::EndWipe), fade_mask];
        for (unit, texture) in (0u32..).zip(units) {
            self.api.active_texture(unit);
            if let Some(id) = texture {
                self.api.bind_texture(id);
            }
        }

        self.point_at_quad(&FULLSCREEN_QUAD, &uvs);
        self.api.vertex_attrib_pointer(
            VertexAttribute::TexCoord1,
            VertexLayout::client(2, VertexFormat::F32, bytemuck::cast_slice(&FADE_MASK_UVS)),
        );

        self.api.active_texture(0);
        self.api.draw_arrays(PrimitiveTopology::TriangleFan, 0, 4);
        self.api.disable_vertex_attrib(VertexAttribute::TexCoord1);

        self.shaders.unset_shader(&mut self.api);
        self.textures.set_bound(start);
    }

    /// Presents the final capture into a `width` x `height` window with black bars.
    pub fn draw_final_texture(&mut self, width: u32, height: u32) {
        if !self.shaders.can_draw() {
            return;
        }
        let uvs = capture_uvs(self.screen_width, self.screen_height);
        let (x, y) = letterbox(self.screen_width, self.screen_height, width, height);
        let quad = [-x, -y, 1.0, -x, y, 1.0, x, y, 1.0, x, -y, 1.0];

        self.api.viewport(0, 0, width as i32, height as i32);
        self.clear(true, false, Some(BLACK));
        self.bind_screen(ScreenTexture::Final);
        self.shaders.upload_poly_color(&mut self.api, WHITE);

        self.api.bind_buffer(None);
        self.point_at_quad(&quad, &uvs);
        self.api.draw_arrays(PrimitiveTopology::TriangleFan, 0, 4);
    }

    /// Redraws the bound screen capture through a warped grid.
    pub fn post_image_redraw(&mut self, points: &WarpGrid) {
        if !self.shaders.can_draw() {
            return;
        }
        self.api.disable(Capability::DepthTest);
        self.api.disable(Capability::Blend);

        // Black backing so nothing shows through where the grid pulls in.
        self.api.disable_vertex_attrib(VertexAttribute::TexCoord);
        self.shaders.upload_poly_color(&mut self.api, BLACK);
        self.api.vertex_attrib_pointer(
            VertexAttribute::Position,
            VertexLayout::client(3, VertexFormat::F32, bytemuck::cast_slice(&FULLSCREEN_QUAD)),
        );
        self.api.draw_arrays(PrimitiveTopology::TriangleFan, 0, 4);

        self.api.enable_vertex_attrib(VertexAttribute::TexCoord);
        self.shaders.upload_poly_color(&mut self.api, WHITE);

        for x in 0..SCREEN_VERTS - 1 {
            for y in 0..SCREEN_VERTS - 1 {
                let (positions, uvs) =
                    warp_cell(points, x, y, self.screen_width, self.screen_height);
                self.point_at_quad(&positions, &uvs);
                self.api.draw_arrays(PrimitiveTopology::TriangleFan, 0, 4);
            }
        }

        self.api.enable(Capability::DepthTest);
        self.api.enable(Capability::Blend);
    }
}

/// The four corners of a thin quad around the segment `v1`-`v2`, y flipped.
pub fn line_quad(v1: Point2, v2: Point2, screen_width: u32, screen_height: u32) -> [f32; 12] {
    let angle = if (v2.x - v1.x).abs() > f32::EPSILON {
        ((v2.y - v1.y) / (v2.x - v1.x)).atan()
    } else {
        std::f32::consts::FRAC_PI_2
    };
    let dx = angle.sin() / screen_width.max(1) as f32;
    let dy = angle.cos() / screen_height.max(1) as f32;
    [
        v1.x - dx,
        -(v1.y + dy),
        1.0,
        v2.x - dx,
        -(v2.y + dy),
        1.0,
        v2.x + dx,
        -(v2.y - dy),
        1.0,
        v1.x + dx,
        -(v1.y - dy),
        1.0,
    ]
}

/// Places a model: translate, optional roll about its pivot, yaw, pitch, then scale.
///
/// Engine coordinates are Z-up, so the position is swizzled into the Y-up
/// space the view matrix expects. Compressed frames store positions in 1/64 units.
pub fn model_matrix(
    pos: &SceneTransform,
    scale: f32,
    flipped: bool,
    hflipped: bool,
    tiny_frames: bool,
) -> Mat4 {
    let mut m = Mat4::IDENTITY;
    m.translate(Vec3::new(pos.x, pos.z, pos.y));

    let half = scale * 0.5;
    let mut v_scale = Vec3::new(half, half, half);
    if flipped {
        v_scale.y = -v_scale.y;
    }
    if hflipped {
        v_scale.z = -v_scale.z;
    }

    if pos.roll {
        let pivot = Vec3::new(pos.center_x, pos.center_y, 0.0);
        let axis = match pos.rot_axis {
            2 => Vec3::new(0.0, 0.0, pos.roll_flip),
            1 => Vec3::new(0.0, pos.roll_flip, 0.0),
            _ => Vec3::new(pos.roll_flip, 0.0, 0.0),
        };
        m.translate(pivot)
            .rotate_axis(axis, degrees_to_radians(pos.roll_angle))
            .translate(-pivot);
    }

    m.rotate_y(-degrees_to_radians(pos.angle_y))
        .rotate_x(degrees_to_radians(pos.angle_x))
        .scale(v_scale);
    if tiny_frames {
        m.scale(Vec3::new(1.0 / 64.0, 1.0 / 64.0, 1.0 / 64.0));
    }
    m
}
