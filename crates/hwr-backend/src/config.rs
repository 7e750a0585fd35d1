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

//! Configuration of the render backend.

use hwr_core::renderer::TextureFilter;
use serde::{Deserialize, Serialize};

/// A texture filtering quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilterPreset {
    /// Nearest filtering, no mipmaps.
    PointSampled,
    /// Linear filtering, no mipmaps.
    #[default]
    Bilinear,
    /// Linear filtering between linearly filtered mip levels.
    Trilinear,
    /// Nearest minification, linear magnification.
    Mixed1,
    /// Linear minification, nearest magnification.
    Mixed2,
    /// Trilinear minification, nearest magnification.
    Mixed3,
}

/// The sampler settings derived from a [`TextureFilterPreset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterSettings {
    /// Minification filter.
    pub min: TextureFilter,
    /// Magnification filter.
    pub mag: TextureFilter,
    /// Generate mipmaps after every upload.
    pub mipmap: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        TextureFilterPreset::default().settings()
    }
}

impl TextureFilterPreset {
    /// Decodes the engine's raw preset number.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::PointSampled),
            1 => Some(Self::Bilinear),
            2 => Some(Self::Trilinear),
            3 => Some(Self::Mixed1),
            4 => Some(Self::Mixed2),
            5 => Some(Self::Mixed3),
            _ => None,
        }
    }

    /// The engine's raw preset number.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::PointSampled => 0,
            Self::Bilinear => 1,
            Self::Trilinear => 2,
            Self::Mixed1 => 3,
            Self::Mixed2 => 4,
            Self::Mixed3 => 5,
        }
    }

    /// The min/mag/mipmap triple for this preset.
    pub fn settings(self) -> FilterSettings {
        use TextureFilter::*;
        let (min, mag, mipmap) = match self {
            Self::Trilinear => (LinearMipmapLinear, Linear, true),
            Self::Bilinear => (Linear, Linear, false),
            Self::PointSampled => (Nearest, Nearest, false),
            Self::Mixed1 => (Nearest, Linear, false),
            Self::Mixed2 => (Linear, Nearest, false),
            Self::Mixed3 => (LinearMipmapLinear, Nearest, true),
        };
        FilterSettings { min, mag, mipmap }
    }
}

impl FilterSettings {
    /// Resolves a raw preset number against the current settings.
    ///
    /// Unknown numbers select nearest minification and linear magnification and
    /// leave the mipmap switch as it was.
    pub fn from_raw_preset(value: i32, current: FilterSettings) -> FilterSettings {
        match TextureFilterPreset::from_raw(value) {
            Some(preset) => preset.settings(),
            None => FilterSettings {
                min: TextureFilter::Nearest,
                mag: TextureFilter::Linear,
                mipmap: current.mipmap,
            },
        }
    }
}

/// Startup configuration of a [`RenderContext`](crate::RenderContext).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Initial texture filter preset.
    pub texture_filter: TextureFilterPreset,
    /// Requested anisotropy level, clamped to the hardware maximum.
    pub anisotropy: u32,
    /// Initial near clip plane.
    pub near_clip: f32,
    /// Far clip plane.
    pub far_clip: f32,
    /// Sky dome detail. The dome has `4 * sky_detail` columns.
    pub sky_detail: u32,
    /// Highest accepted custom shader number.
    pub max_custom_shaders: usize,
    /// Use the per-surface shader programs instead of the base program.
    pub shaders_enabled: bool,
    /// Model lighting.
    pub model_lighting: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            texture_filter: TextureFilterPreset::Bilinear,
            anisotropy: 0,
            near_clip: 0.9,
            far_clip: 32768.0,
            sky_detail: 16,
            max_custom_shaders: 16,
            shaders_enabled: false,
            model_lighting: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_map_to_their_filters() {
        let s = TextureFilterPreset::Trilinear.settings();
        assert_eq!(s.min, TextureFilter::LinearMipmapLinear);
        assert_eq!(s.mag, TextureFilter::Linear);
        assert!(s.mipmap);

        let s = TextureFilterPreset::Mixed2.settings();
        assert_eq!((s.min, s.mag, s.mipmap), (TextureFilter::Linear, TextureFilter::Nearest, false));
    }

    #[test]
    fn raw_numbers_round_trip() {
        for raw in 0..6 {
            let preset = TextureFilterPreset::from_raw(raw).expect("known preset");
            assert_eq!(preset.to_raw(), raw);
        }
        assert_eq!(TextureFilterPreset::from_raw(6), None);
    }

    #[test]
    fn unknown_preset_keeps_mipmap_switch() {
        let current = TextureFilterPreset::Trilinear.settings();
        let s = FilterSettings::from_raw_preset(42, current);
        assert_eq!(s.min, TextureFilter::Nearest);
        assert_eq!(s.mag, TextureFilter::Linear);
        assert!(s.mipmap);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: RendererConfig =
            serde_json::from_str(r#"{ "texture_filter": "mixed3", "anisotropy": 8 }"#).unwrap();
        assert_eq!(cfg.texture_filter, TextureFilterPreset::Mixed3);
        assert_eq!(cfg.anisotropy, 8);
        assert_eq!(cfg.near_clip, 0.9);
        assert_eq!(cfg.sky_detail, 16);
        assert!(!cfg.shaders_enabled);
    }
}
