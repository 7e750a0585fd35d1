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

//! The polygon blend-state machine.
//!
//! Native state is only touched for the bit groups that differ between the
//! current and the requested [`PolyFlags`], so the state after [`apply`] depends
//! on the requested flags alone once [`bootstrap`] has run.
//!
//! [`apply`]: BlendStateMachine::apply
//! [`bootstrap`]: BlendStateMachine::bootstrap

use hwr_core::renderer::{
    BlendFactor, BlendMode, Capability, CompareFunction, GraphicsApi, PolyFlags, TextureParameter,
    TextureWrap,
};

/// Blend factors and alpha test for one blend mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendEquation {
    /// Source factor.
    pub src: BlendFactor,
    /// Destination factor.
    pub dst: BlendFactor,
    /// Alpha test comparison.
    pub alpha_func: CompareFunction,
    /// Alpha test reference.
    pub alpha_ref: f32,
}

impl BlendEquation {
    const fn new(src: BlendFactor, dst: BlendFactor, alpha_func: CompareFunction, alpha_ref: f32) -> Self {
        Self {
            src,
            dst,
            alpha_func,
            alpha_ref,
        }
    }

    /// Looks up the equation for a blend mode.
    pub fn for_mode(mode: BlendMode) -> Self {
        use BlendFactor::*;
        use CompareFunction::*;
        match mode {
            BlendMode::Translucent => Self::new(SrcAlpha, OneMinusSrcAlpha, NotEqual, 0.0),
            BlendMode::Masked => Self::new(SrcAlpha, Zero, Greater, 0.5),
            BlendMode::Additive => Self::new(SrcAlpha, One, NotEqual, 0.0),
            BlendMode::Environment => Self::new(One, OneMinusSrcAlpha, NotEqual, 0.0),
            BlendMode::Subtractive => Self::new(Zero, OneMinusSrcColor, NotEqual, 0.0),
            // Zero-alpha fog fragments must not be discarded.
            BlendMode::Fog => Self::new(SrcAlpha, SrcColor, Always, 0.0),
            BlendMode::None => Self::new(One, Zero, Greater, 0.5),
        }
    }
}

/// The outcome of one [`BlendStateMachine::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Bits that differed from the previous flags.
    pub changed: PolyFlags,
    /// The caller must bind the white placeholder texture.
    pub bind_placeholder: bool,
}

/// Tracks the flags last applied to the native context.
#[derive(Debug, Clone)]
pub struct BlendStateMachine {
    current: PolyFlags,
}

impl Default for BlendStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl BlendStateMachine {
    /// Creates a machine whose tracked state is unknown. Call [`Self::bootstrap`] before drawing.
    pub fn new() -> Self {
        Self {
            current: PolyFlags::ALL_BITS,
        }
    }

    /// The flags last applied.
    pub fn current(&self) -> PolyFlags {
        self.current
    }

    /// Sets the permanent states and forces every flag group to a known value.
    pub fn bootstrap(&mut self, api: &mut dyn GraphicsApi) -> StateChange {
        api.alpha_func(CompareFunction::NotEqual, 0.0);
        api.color_mask(true, true, true, true);

        api.enable(Capability::DepthTest);
        api.depth_mask(true);
        api.clear_depth(1.0);
        api.depth_range(0.0, 1.0);
        api.depth_func(CompareFunction::LessEqual);

        api.enable(Capability::Blend);
        api.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

        self.current = PolyFlags::ALL_BITS;
        self.apply(api, PolyFlags::EMPTY)
    }

    /// Moves the native state from the current flags to `flags`.
    pub fn apply(&mut self, api: &mut dyn GraphicsApi, flags: PolyFlags) -> StateChange {
        let changed = self.current ^ flags;
        let mut bind_placeholder = false;

        if changed.intersects(PolyFlags::STATEFUL) {
            if changed.intersects(PolyFlags::BLENDING) {
                let eq = BlendEquation::for_mode(flags.blend_mode());
                api.blend_func(eq.src, eq.dst);
                api.alpha_func(eq.alpha_func, eq.alpha_ref);
            }

            if changed.contains(PolyFlags::NO_ALPHA_TEST) {
                if flags.contains(PolyFlags::NO_ALPHA_TEST) {
                    api.disable(Capability::AlphaTest);
                } else {
                    api.enable(Capability::AlphaTest);
                }
            }

            if changed.contains(PolyFlags::DECAL) {
                if flags.contains(PolyFlags::DECAL) {
                    api.enable(Capability::PolygonOffsetFill);
                } else {
                    api.disable(Capability::PolygonOffsetFill);
                }
            }

            if changed.contains(PolyFlags::NO_DEPTH_TEST) {
                api.depth_func(if flags.contains(PolyFlags::NO_DEPTH_TEST) {
                    CompareFunction::Always
                } else {
                    CompareFunction::LessEqual
                });
            }

            // Wrap overrides are only set here; polygon draws restore them afterwards.
            if changed.contains(PolyFlags::REMOVE_Y_WRAP) && flags.contains(PolyFlags::REMOVE_Y_WRAP) {
                api.tex_parameter(TextureParameter::WrapT(TextureWrap::ClampToEdge));
            }
            if changed.contains(PolyFlags::FORCE_WRAP_X) && flags.contains(PolyFlags::FORCE_WRAP_X) {
                api.tex_parameter(TextureParameter::WrapS(TextureWrap::Repeat));
            }
            if changed.contains(PolyFlags::FORCE_WRAP_Y) && flags.contains(PolyFlags::FORCE_WRAP_Y) {
                api.tex_parameter(TextureParameter::WrapT(TextureWrap::Repeat));
            }

            if changed.contains(PolyFlags::OCCLUDE) {
                api.depth_mask(flags.contains(PolyFlags::OCCLUDE));
            }

            if changed.contains(PolyFlags::INVISIBLE) {
                if flags.contains(PolyFlags::INVISIBLE) {
                    api.blend_func(BlendFactor::Zero, BlendFactor::One);
                } else if flags.blend_mode() == BlendMode::Masked {
                    // Invisible is only ever combined with masked blending.
                    api.blend_func(BlendFactor::SrcAlpha, BlendFactor::Zero);
                }
            }

            bind_placeholder = flags.contains(PolyFlags::NO_TEXTURE);
        }

        self.current = flags;
        StateChange {
            changed,
            bind_placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_blend_modes() {
        let eq = BlendEquation::for_mode(BlendMode::Masked);
        assert_eq!((eq.src, eq.dst), (BlendFactor::SrcAlpha, BlendFactor::Zero));
        assert_eq!(eq.alpha_func, CompareFunction::Greater);

        let eq = BlendEquation::for_mode(BlendMode::Fog);
        assert_eq!(eq.alpha_func, CompareFunction::Always);

        let eq = BlendEquation::for_mode(BlendMode::None);
        assert_eq!((eq.src, eq.dst), (BlendFactor::One, BlendFactor::Zero));
        assert_eq!(eq.alpha_ref, 0.5);
    }

    #[test]
    fn new_machine_starts_unknown() {
        assert_eq!(BlendStateMachine::new().current(), PolyFlags::ALL_BITS);
    }
}
