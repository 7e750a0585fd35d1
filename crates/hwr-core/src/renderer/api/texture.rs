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

//! Texture descriptors, pixel formats and sampler parameters.

use super::flags::TextureFlags;
use bytemuck::{Pod, Zeroable};

/// An opaque handle to a texture object owned by the [`GraphicsApi`](crate::renderer::GraphicsApi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// The engine-side identity of a texture descriptor.
///
/// Two descriptors with the same key are the same texture as far as the cache is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(pub u64);

/// Palette index treated as transparent in chroma-keyed textures.
pub const CHROMAKEY_INDEX: u8 = 255;

/// The source pixel layout of a texture descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One palette index per pixel.
    P8,
    /// A palette index followed by an alpha byte.
    Ap88,
    /// Four bytes per pixel, already in upload order.
    Rgba,
    /// One alpha byte per pixel. Used for fade masks.
    Alpha8,
    /// One intensity byte per pixel. Accepted by the engine but has no upload path.
    Intensity8,
    /// An intensity byte followed by an alpha byte.
    AlphaIntensity88,
}

impl TextureFormat {
    /// Bytes consumed per pixel of source data.
    pub fn source_bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba => 4,
            TextureFormat::Ap88 | TextureFormat::AlphaIntensity88 => 2,
            TextureFormat::P8 | TextureFormat::Alpha8 | TextureFormat::Intensity8 => 1,
        }
    }

    /// Returns `true` for formats that are resolved through the palette.
    pub fn is_paletted(self) -> bool {
        matches!(self, TextureFormat::P8 | TextureFormat::Ap88)
    }
}

/// An 8-bit RGBA color, laid out as the bytes of an RGBA8 texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// All channels zero.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the channels as floats in `0.0..=1.0`.
    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// A texture as described by the engine: identity, size, format, flags and pixels.
#[derive(Debug, Clone, Copy)]
pub struct TextureInfo<'a> {
    /// Cache identity.
    pub key: TextureKey,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Source pixel layout of `data`.
    pub format: TextureFormat,
    /// Wrap and transparency flags.
    pub flags: TextureFlags,
    /// Row-major source pixels, `width * height * format.source_bytes_per_pixel()` bytes.
    pub data: &'a [u8],
}

impl TextureInfo<'_> {
    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    Linear,
    /// Trilinear. Only meaningful as a minification filter.
    LinearMipmapLinear,
}

/// A texture coordinate wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    /// Tile the texture.
    Repeat,
    /// Clamp to the edge texel.
    ClampToEdge,
}

/// A sampler parameter applied to the currently bound texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    /// Minification filter.
    MinFilter(TextureFilter),
    /// Magnification filter.
    MagFilter(TextureFilter),
    /// Wrap along S.
    WrapS(TextureWrap),
    /// Wrap along T.
    WrapT(TextureWrap),
    /// Anisotropic filtering level.
    MaxAnisotropy(u32),
}
