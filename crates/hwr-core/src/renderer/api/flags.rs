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

//! Polygon and texture flag sets handed to the backend by the scene renderer.

use crate::hwr_bitflags;

hwr_bitflags! {
    /// Render-state flags requested for a draw.
    ///
    /// The low byte selects the blend mode; the remaining bits toggle
    /// independent pieces of pipeline state.
    pub struct PolyFlags: u32 {
        /// Binary alpha: texels under 0.5 alpha are discarded.
        const MASKED = 0x0000_0001;
        /// Standard alpha blending.
        const TRANSLUCENT = 0x0000_0002;
        /// `src * alpha + dst`.
        const ADDITIVE = 0x0000_0004;
        /// Premultiplied-alpha blending.
        const ENVIRONMENT = 0x0000_0008;
        /// Darkens the destination by the source color.
        const SUBTRACTIVE = 0x0000_0010;
        /// Disables the alpha test entirely.
        const NO_ALPHA_TEST = 0x0000_0020;
        /// Fog block blending.
        const FOG = 0x0000_0040;
        /// Every bit that selects a blend mode.
        const BLENDING = 0x0000_005F;

        /// Writes to the depth buffer.
        const OCCLUDE = 0x0000_0100;
        /// Depth test always passes.
        const NO_DEPTH_TEST = 0x0000_0200;
        /// Writes nothing to the color buffer.
        const INVISIBLE = 0x0000_0400;
        /// Enables polygon offset so the surface wins depth ties.
        const DECAL = 0x0000_0800;
        /// Vertex colors are modulated by the surface colors.
        const MODULATED = 0x0000_1000;
        /// Draws with the white placeholder texture.
        const NO_TEXTURE = 0x0000_2000;
        /// Corona sprite.
        const CORONA = 0x0000_4000;
        /// Water ripple surface.
        const RIPPLE = 0x0000_8000;
        /// Clamps the T texture coordinate for the draw.
        const REMOVE_Y_WRAP = 0x0001_0000;
        /// Forces repeat on S for the draw.
        const FORCE_WRAP_X = 0x0002_0000;
        /// Forces repeat on T for the draw.
        const FORCE_WRAP_Y = 0x0004_0000;
    }
}

impl PolyFlags {
    /// The bits whose change causes [`PolyFlags`] transitions to touch native state.
    pub const STATEFUL: Self = Self::from_bits_retain(
        Self::BLENDING.bits()
            | Self::REMOVE_Y_WRAP.bits()
            | Self::FORCE_WRAP_X.bits()
            | Self::FORCE_WRAP_Y.bits()
            | Self::OCCLUDE.bits()
            | Self::NO_TEXTURE.bits()
            | Self::MODULATED.bits()
            | Self::NO_DEPTH_TEST.bits()
            | Self::DECAL.bits()
            | Self::INVISIBLE.bits()
            | Self::NO_ALPHA_TEST.bits(),
    );

    /// Returns the blend mode selected by the blending bits.
    #[inline]
    pub fn blend_mode(self) -> BlendMode {
        BlendMode::from_flags(self)
    }
}

/// The compositing mode selected by the blending bits of a [`PolyFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// No blending bit, or an unrecognised combination of them.
    None,
    /// [`PolyFlags::TRANSLUCENT`]
    Translucent,
    /// [`PolyFlags::MASKED`]
    Masked,
    /// [`PolyFlags::ADDITIVE`]
    Additive,
    /// [`PolyFlags::ENVIRONMENT`]
    Environment,
    /// [`PolyFlags::SUBTRACTIVE`]
    Subtractive,
    /// [`PolyFlags::FOG`]
    Fog,
}

impl BlendMode {
    /// Decodes the blending bits. Only an exact single bit selects a mode.
    pub fn from_flags(flags: PolyFlags) -> Self {
        let bits = (flags & PolyFlags::BLENDING).bits();
        match bits {
            b if b == PolyFlags::TRANSLUCENT.bits() => Self::Translucent,
            b if b == PolyFlags::MASKED.bits() => Self::Masked,
            b if b == PolyFlags::ADDITIVE.bits() => Self::Additive,
            b if b == PolyFlags::ENVIRONMENT.bits() => Self::Environment,
            b if b == PolyFlags::SUBTRACTIVE.bits() => Self::Subtractive,
            b if b == PolyFlags::FOG.bits() => Self::Fog,
            _ => Self::None,
        }
    }
}

hwr_bitflags! {
    /// Per-texture flags carried by a texture descriptor.
    pub struct TextureFlags: u32 {
        /// Repeat along S.
        const WRAP_X = 0x0000_0001;
        /// Repeat along T.
        const WRAP_Y = 0x0000_0002;
        /// Palette index 255 is transparent.
        const CHROMAKEYED = 0x0000_0010;
        /// The texture has transparent holes. Set by the cache during conversion.
        const TRANSPARENT = 0x0000_0040;
    }
}
