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

//! Per-draw surface parameters and vertex types produced by the scene renderer.

use super::texture::Rgba8;
use bytemuck::{Pod, Zeroable};

/// Sector lighting parameters fed to the software-emulation shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightInfo {
    /// Sector light level, 0 to 255.
    pub light_level: i32,
    /// First colormap index where fading begins.
    pub fade_start: i32,
    /// Colormap index where fading is complete.
    pub fade_end: i32,
}

/// Colors and lighting for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Base color multiplied into every texel.
    pub poly_color: Rgba8,
    /// Colormap tint. An alpha of zero disables tinting.
    pub tint_color: Rgba8,
    /// Color faded towards with distance.
    pub fade_color: Rgba8,
    /// Sector lighting.
    pub light: LightInfo,
}

impl Default for SurfaceInfo {
    fn default() -> Self {
        Self {
            poly_color: Rgba8::WHITE,
            tint_color: Rgba8::TRANSPARENT,
            fade_color: Rgba8::BLACK,
            light: LightInfo {
                light_level: 255,
                fade_start: 0,
                fade_end: 31,
            },
        }
    }
}

/// A transformed polygon vertex: position followed by texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct OutVertex {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
    /// Z.
    pub z: f32,
    /// Texture S.
    pub s: f32,
    /// Texture T.
    pub t: f32,
}

impl OutVertex {
    /// Byte size of one vertex.
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;
    /// Byte offset of the texture coordinates.
    pub const UV_OFFSET: usize = 3 * std::mem::size_of::<f32>();

    /// Creates a vertex.
    pub const fn new(x: f32, y: f32, z: f32, s: f32, t: f32) -> Self {
        Self { x, y, z, s, t }
    }
}

/// A point in 2D screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
}

impl Point2 {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
