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

use super::sources;
use super::{ShaderProgram, ShaderSlot, Uniform};
use crate::transform::TransformState;
use ahash::AHashMap;
use hwr_core::math::Mat4;
use hwr_core::renderer::{GraphicsApi, ProgramId, ShaderError, ShaderStage, SurfaceInfo};

/// Engine tics per second. `LevelTime` is uploaded in seconds.
const TICRATE: f32 = 35.0;

/// Poly color used when a draw supplies none.
const WHITE: [f32; 4] = [1.0; 4];

/// Compiles the built-in programs and tracks the active one.
///
/// Before [`ShaderRegistry::compile_all`] has run there is no active program
/// and every upload or draw that needs one is a no-op.
#[derive(Debug)]
pub struct ShaderRegistry {
    programs: AHashMap<ShaderSlot, ShaderProgram>,
    custom_vertex: AHashMap<usize, String>,
    custom_fragment: AHashMap<usize, String>,
    current: Option<ShaderSlot>,
    enabled: bool,
    level_time: i32,
    max_custom: usize,
}

impl ShaderRegistry {
    /// Creates an empty registry.
    ///
    /// ## Arguments
    /// * `max_custom` - Highest accepted custom shader number.
    /// * `enabled` - Whether [`Self::set_shader`] honours the requested slot.
    pub fn new(max_custom: usize, enabled: bool) -> Self {
        Self {
            programs: AHashMap::new(),
            custom_vertex: AHashMap::new(),
            custom_fragment: AHashMap::new(),
            current: None,
            enabled,
            level_time: 0,
            max_custom,
        }
    }

    /// The active slot, `None` before the first compile.
    pub fn current(&self) -> Option<ShaderSlot> {
        self.current
    }

    /// Returns `true` once a slot has been activated.
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Returns `true` if the active slot holds a linked program.
    ///
    /// Draws through an inert slot are skipped.
    pub fn can_draw(&self) -> bool {
        self.current_program().is_some_and(|p| p.program.is_some())
    }

    /// The state of a slot.
    pub fn program(&self, slot: ShaderSlot) -> Option<&ShaderProgram> {
        self.programs.get(&slot)
    }

    /// Whether per-surface programs are used.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables per-surface programs.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The level time in tics.
    pub fn level_time(&self) -> i32 {
        self.level_time
    }

    /// Sets the level time in tics.
    pub fn set_level_time(&mut self, tics: i32) {
        self.level_time = tics;
    }

    /// Stores injected source for custom shader `number`.
    ///
    /// The source takes effect on the next [`Self::init_custom_shaders`].
    ///
    /// ## Errors
    /// * `ShaderError::InvalidCustomSlot` - If `number` is outside `1..=max_custom`.
    pub fn load_custom_shader(
        &mut self,
        number: usize,
        source: &str,
        fragment: bool,
    ) -> Result<(), ShaderError> {
        if number < 1 || number > self.max_custom {
            return Err(ShaderError::InvalidCustomSlot {
                number,
                max: self.max_custom,
            });
        }
        if ShaderSlot::from_index(number).is_none() {
            log::warn!("ShaderRegistry: Custom shader {number} has no built-in slot to replace");
        }
        let table = if fragment {
            &mut self.custom_fragment
        } else {
            &mut self.custom_vertex
        };
        table.insert(number, source.to_owned());
        log::debug!(
            "ShaderRegistry: Stored custom {} shader {number} ({} bytes)",
            if fragment { "fragment" } else { "vertex" },
            source.len()
        );
        Ok(())
    }

    /// Builds every slot, then activates the base program.
    ///
    /// A slot whose program fails to build is logged and left inert; the
    /// other slots are unaffected. Returns the number of linked programs.
    pub fn compile_all(&mut self, api: &mut dyn GraphicsApi) -> usize {
        let mut linked = 0;
        for slot in ShaderSlot::ALL {
            let (builtin_vs, builtin_fs) = sources::builtin(slot);
            let index = slot.index();
            let custom_vs = self.custom_vertex.get(&index).filter(|_| index > 0);
            let custom_fs = self.custom_fragment.get(&index).filter(|_| index > 0);
            let custom = custom_vs.is_some() || custom_fs.is_some();
            let vs = custom_vs.map_or(builtin_vs, String::as_str);
            let fs = custom_fs.map_or(builtin_fs, String::as_str);

            let mut entry = ShaderProgram::inert();
            match build_program(api, vs, fs) {
                Ok(program) => {
                    entry.program = Some(program);
                    entry.custom = custom;
                    for uniform in Uniform::ALL {
                        entry.uniforms[uniform as usize] =
                            api.uniform_location(program, uniform.name());
                    }
                    linked += 1;
                }
                Err(e) => {
                    log::error!("ShaderRegistry: Failed to build {slot:?} program: {e}");
                }
            }
            self.programs.insert(slot, entry);
        }

        self.current = Some(ShaderSlot::Default);
        api.use_program(self.program_id(ShaderSlot::Default));
        log::info!(
            "ShaderRegistry: Linked {linked} of {} programs",
            ShaderSlot::ALL.len()
        );
        linked
    }

    /// Releases every linked program. Nothing is active afterwards.
    pub fn kill_shaders(&mut self, api: &mut dyn GraphicsApi) {
        for (slot, entry) in self.programs.drain() {
            if let Some(program) = entry.program {
                api.delete_program(program);
                log::debug!("ShaderRegistry: Deleted {slot:?} program {program:?}");
            }
        }
        if self.current.take().is_some() {
            api.use_program(None);
        }
    }

    /// Rebuilds every program so injected sources take effect.
    pub fn init_custom_shaders(&mut self, api: &mut dyn GraphicsApi) -> usize {
        self.kill_shaders(api);
        self.compile_all(api)
    }

    fn program_id(&self, slot: ShaderSlot) -> Option<ProgramId> {
        self.programs.get(&slot).and_then(|p| p.program)
    }

    fn current_program(&self) -> Option<&ShaderProgram> {
        self.current.and_then(|slot| self.programs.get(&slot))
    }

    /// Makes `slot` active unless it already is. Returns whether a switch happened.
    pub fn set_program(&mut self, api: &mut dyn GraphicsApi, slot: ShaderSlot) -> bool {
        if self.current == Some(slot) {
            return false;
        }
        self.current = Some(slot);
        api.use_program(self.program_id(slot));
        true
    }

    /// Activates the program for a surface kind and syncs the transform if it switched.
    ///
    /// The base program is used instead when per-surface programs are disabled.
    pub fn set_shader(
        &mut self,
        api: &mut dyn GraphicsApi,
        slot: ShaderSlot,
        transform: &TransformState,
    ) {
        let target = if self.enabled { slot } else { ShaderSlot::Default };
        if self.set_program(api, target) {
            self.sync_transform(api, transform);
        }
    }

    /// Returns to the base program and resets its poly color to white.
    pub fn unset_shader(&mut self, api: &mut dyn GraphicsApi) {
        self.current = Some(ShaderSlot::Default);
        api.use_program(self.program_id(ShaderSlot::Default));
        self.upload_poly_color(api, WHITE);
    }

    /// Uploads the per-draw uniforms to the active program.
    ///
    /// Colors passed as `None` and uniforms the program does not use are skipped.
    pub fn upload_uniforms(
        &self,
        api: &mut dyn GraphicsApi,
        surface: Option<&SurfaceInfo>,
        poly: Option<[f32; 4]>,
        tint: Option<[f32; 4]>,
        fade: Option<[f32; 4]>,
    ) {
        let Some(shader) = self.current_program() else {
            return;
        };
        if shader.program.is_none() {
            return;
        }

        let colors = [
            (Uniform::PolyColor, poly),
            (Uniform::TintColor, tint),
            (Uniform::FadeColor, fade),
        ];
        for (uniform, value) in colors {
            if let (Some(value), Some(loc)) = (value, shader.location(uniform)) {
                api.uniform_4f(loc, value);
            }
        }

        if let Some(surface) = surface {
            let light = &surface.light;
            let scalars = [
                (Uniform::Lighting, light.light_level),
                (Uniform::FadeStart, light.fade_start),
                (Uniform::FadeEnd, light.fade_end),
            ];
            for (uniform, value) in scalars {
                if let Some(loc) = shader.location(uniform) {
                    api.uniform_1f(loc, value as f32);
                }
            }
        }

        if let Some(loc) = shader.location(Uniform::LevelTime) {
            api.uniform_1f(loc, self.level_time as f32 / TICRATE);
        }
    }

    /// Uploads only the poly color.
    pub fn upload_poly_color(&self, api: &mut dyn GraphicsApi, color: [f32; 4]) {
        self.upload_uniforms(api, None, Some(color), None, None);
    }

    /// Uploads an integer uniform (a sampler unit or a boolean) to the active program.
    pub fn upload_int(&self, api: &mut dyn GraphicsApi, uniform: Uniform, value: i32) {
        let Some(shader) = self.current_program() else {
            return;
        };
        if shader.program.is_none() {
            return;
        }
        if let Some(loc) = shader.location(uniform) {
            api.uniform_1i(loc, value);
        }
    }

    /// Uploads whichever transform matrices differ from the active program's copies.
    ///
    /// Returns the number of matrices that differed.
    pub fn sync_transform(&mut self, api: &mut dyn GraphicsApi, transform: &TransformState) -> usize {
        let Some(slot) = self.current else {
            return 0;
        };
        let Some(shader) = self.programs.get_mut(&slot) else {
            return 0;
        };
        if shader.program.is_none() {
            return 0;
        }

        let mut uploads = 0;
        let locations = shader.uniforms;
        let pairs: [(Uniform, &mut Mat4, &Mat4); 3] = [
            (Uniform::Projection, &mut shader.projection, &transform.projection),
            (Uniform::View, &mut shader.view, &transform.view),
            (Uniform::Model, &mut shader.model, &transform.model),
        ];
        for (uniform, cached, wanted) in pairs {
            if cached.as_bytes() != wanted.as_bytes() {
                *cached = *wanted;
                if let Some(loc) = locations[uniform as usize] {
                    api.uniform_matrix4(loc, wanted);
                }
                uploads += 1;
            }
        }
        uploads
    }
}

/// Compiles both stages and links them, releasing every intermediate object on failure.
fn build_program(
    api: &mut dyn GraphicsApi,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<ProgramId, ShaderError> {
    let vertex = compile_stage(api, ShaderStage::Vertex, vertex_src)?;
    let fragment = match compile_stage(api, ShaderStage::Fragment, fragment_src) {
        Ok(id) => id,
        Err(e) => {
            api.delete_shader(vertex);
            return Err(e);
        }
    };

    let linked = api
        .create_program()
        .and_then(|program| match api.link_program(program, &[vertex, fragment]) {
            Ok(()) => Ok(program),
            Err(e) => {
                api.delete_program(program);
                Err(e)
            }
        });

    api.delete_shader(vertex);
    api.delete_shader(fragment);
    linked
}

fn compile_stage(
    api: &mut dyn GraphicsApi,
    stage: ShaderStage,
    source: &str,
) -> Result<hwr_core::renderer::ShaderId, ShaderError> {
    let shader = api.create_shader(stage)?;
    if let Err(e) = api.compile_shader(shader, source) {
        api.delete_shader(shader);
        return Err(e);
    }
    Ok(shader)
}
