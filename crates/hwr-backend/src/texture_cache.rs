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

//! The texture cache and upload pipeline.
//!
//! Records are kept in insertion order and only ever removed all at once by
//! [`TextureCache::flush`]. Pixel data is converted to RGBA8 in a staging
//! buffer reused across uploads.

use crate::config::FilterSettings;
use hwr_core::renderer::{
    GraphicsApi, ResourceError, Rgba8, TextureFilter, TextureFlags, TextureFormat, TextureId,
    TextureInfo, TextureKey, TextureParameter, TextureWrap, CHROMAKEY_INDEX,
};
use indexmap::IndexMap;

/// A texture that has been uploaded to the graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRecord {
    /// The native texture.
    pub id: TextureId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Source format of the last upload.
    pub format: TextureFormat,
    /// Descriptor flags, plus `TRANSPARENT` if conversion found a hole.
    pub flags: TextureFlags,
}

impl TextureRecord {
    /// Bytes of texture memory accounted for this record.
    pub fn memory_used(&self) -> usize {
        let bpp = match self.format {
            TextureFormat::Rgba => 4,
            TextureFormat::Ap88 | TextureFormat::AlphaIntensity88 => 2,
            _ => 1,
        };
        self.width as usize * self.height as usize * bpp
    }
}

/// Maps engine texture descriptors to native textures.
#[derive(Debug)]
pub struct TextureCache {
    records: IndexMap<TextureKey, TextureRecord>,
    bound: Option<TextureId>,
    placeholder: Option<TextureId>,
    palette: [Rgba8; 256],
    staging: Vec<Rgba8>,
    filter: FilterSettings,
    anisotropy: u32,
    max_anisotropy: u32,
}

impl TextureCache {
    /// Creates an empty cache with a grey-ramp palette.
    pub fn new(filter: FilterSettings) -> Self {
        let mut palette = [Rgba8::WHITE; 256];
        for (i, entry) in palette.iter_mut().enumerate() {
            let v = i as u8;
            *entry = Rgba8::new(v, v, v, 255);
        }
        Self {
            records: IndexMap::new(),
            bound: None,
            placeholder: None,
            palette,
            staging: Vec::new(),
            filter,
            anisotropy: 0,
            max_anisotropy: 0,
        }
    }

    /// Number of cached textures.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for a descriptor key.
    pub fn get(&self, key: TextureKey) -> Option<&TextureRecord> {
        self.records.get(&key)
    }

    /// Cached records in upload order.
    pub fn iter(&self) -> impl Iterator<Item = (&TextureKey, &TextureRecord)> {
        self.records.iter()
    }

    /// The texture last bound through the cache, if known.
    pub fn bound(&self) -> Option<TextureId> {
        self.bound
    }

    /// Records a bind made outside the cache.
    pub fn set_bound(&mut self, id: Option<TextureId>) {
        self.bound = id;
    }

    /// The white placeholder, once created.
    pub fn placeholder(&self) -> Option<TextureId> {
        self.placeholder
    }

    /// The palette used for paletted formats.
    pub fn palette(&self) -> &[Rgba8; 256] {
        &self.palette
    }

    /// Replaces the palette. Already uploaded textures keep their old colors until flushed.
    pub fn set_palette(&mut self, palette: &[Rgba8; 256]) {
        self.palette = *palette;
    }

    /// The current filter settings.
    pub fn filter(&self) -> FilterSettings {
        self.filter
    }

    /// Sets the filters used by subsequent uploads.
    pub fn set_filter(&mut self, filter: FilterSettings) {
        self.filter = filter;
    }

    /// The effective anisotropy level.
    pub fn anisotropy(&self) -> u32 {
        self.anisotropy
    }

    /// The hardware anisotropy limit, `0` if unsupported.
    pub fn max_anisotropy(&self) -> u32 {
        self.max_anisotropy
    }

    /// Records the hardware anisotropy limit and re-clamps the current level.
    pub fn set_max_anisotropy(&mut self, max: u32) {
        self.max_anisotropy = max;
        self.anisotropy = self.anisotropy.min(max);
    }

    /// Sets the anisotropy level, clamped to the hardware limit. Returns the effective level.
    pub fn set_anisotropy(&mut self, level: u32) -> u32 {
        self.anisotropy = level.min(self.max_anisotropy);
        self.anisotropy
    }

    /// Binds `id` unless it is already bound.
    pub fn bind(&mut self, api: &mut dyn GraphicsApi, id: TextureId) {
        if self.bound != Some(id) {
            api.bind_texture(id);
            self.bound = Some(id);
        }
    }

    /// Binds the 1x1 white placeholder, creating it on first use.
    pub fn bind_placeholder(&mut self, api: &mut dyn GraphicsApi) -> Result<(), ResourceError> {
        match self.placeholder {
            Some(id) => self.bind(api, id),
            None => {
                let id = api.create_texture()?;
                api.bind_texture(id);
                api.tex_image_2d(1, 1, bytemuck::bytes_of(&Rgba8::WHITE));
                log::debug!("TextureCache: Created placeholder texture {id:?}");
                self.placeholder = Some(id);
                self.bound = Some(id);
            }
        }
        Ok(())
    }

    /// Binds a descriptor's texture, uploading it first if it is not cached.
    ///
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `info.data` is shorter than the described image.
    ///
    /// An unsupported format is logged and skipped without error; the previous
    /// binding stays in effect.
    pub fn bind_or_upload(
        &mut self,
        api: &mut dyn GraphicsApi,
        info: &TextureInfo<'_>,
    ) -> Result<(), ResourceError> {
        if let Some(record) = self.records.get(&info.key) {
            let id = record.id;
            self.bind(api, id);
            return Ok(());
        }
        self.upload(api, info, None)
    }

    /// Re-converts and re-uploads a descriptor.
    ///
    /// A cached texture is refreshed in place through the sub-image path; an
    /// uncached one is uploaded and added to the cache.
    pub fn update(
        &mut self,
        api: &mut dyn GraphicsApi,
        info: &TextureInfo<'_>,
    ) -> Result<(), ResourceError> {
        let existing = self.records.get(&info.key).map(|r| r.id);
        self.upload(api, info, existing)
    }

    fn upload(
        &mut self,
        api: &mut dyn GraphicsApi,
        info: &TextureInfo<'_>,
        existing: Option<TextureId>,
    ) -> Result<(), ResourceError> {
        let flags = match convert_to_rgba(info, &self.palette, &mut self.staging) {
            Ok(flags) => flags,
            Err(ResourceError::UnsupportedFormat(format)) => {
                log::warn!(
                    "TextureCache: Unsupported format {format:?} for texture {:?}, upload skipped",
                    info.key
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let id = match existing {
            Some(id) => id,
            None => api.create_texture()?,
        };

        api.bind_texture(id);
        self.bound = Some(id);

        // Filtering would bleed the transparent holes into their neighbours.
        if flags.contains(TextureFlags::TRANSPARENT) {
            api.tex_parameter(TextureParameter::MagFilter(TextureFilter::Nearest));
            api.tex_parameter(TextureParameter::MinFilter(TextureFilter::Nearest));
        } else {
            api.tex_parameter(TextureParameter::MagFilter(self.filter.mag));
            api.tex_parameter(TextureParameter::MinFilter(self.filter.min));
        }

        let pixels: &[u8] = if info.format == TextureFormat::Rgba {
            &info.data[..info.pixel_count() * 4]
        } else {
            bytemuck::cast_slice(&self.staging)
        };
        if existing.is_some() {
            api.tex_sub_image_2d(info.width, info.height, pixels);
        } else {
            api.tex_image_2d(info.width, info.height, pixels);
        }

        if self.filter.mipmap {
            api.generate_mipmap();
        }

        api.tex_parameter(TextureParameter::WrapS(wrap_for(flags, TextureFlags::WRAP_X)));
        api.tex_parameter(TextureParameter::WrapT(wrap_for(flags, TextureFlags::WRAP_Y)));

        if self.max_anisotropy > 0 {
            api.tex_parameter(TextureParameter::MaxAnisotropy(self.anisotropy));
        }

        let record = TextureRecord {
            id,
            width: info.width,
            height: info.height,
            format: info.format,
            flags,
        };
        if existing.is_none() {
            log::debug!(
                "TextureCache: Uploaded {:?} {}x{} {:?} as {id:?}",
                info.key,
                info.width,
                info.height,
                info.format
            );
        }
        self.records.insert(info.key, record);
        Ok(())
    }

    /// Releases every cached texture and forgets the current binding.
    ///
    /// The placeholder is kept.
    pub fn flush(&mut self, api: &mut dyn GraphicsApi) {
        let count = self.records.len();
        for (key, record) in self.records.drain(..) {
            if let Err(e) = api.delete_texture(record.id) {
                log::warn!("TextureCache: Failed to delete texture {:?} for {key:?}: {e}", record.id);
            }
        }
        self.bound = None;
        if count > 0 {
            log::debug!("TextureCache: Flushed {count} textures");
        }
    }

    /// Flushes the cache and deletes the placeholder too.
    pub fn release_all(&mut self, api: &mut dyn GraphicsApi) {
        self.flush(api);
        if let Some(id) = self.placeholder.take() {
            if let Err(e) = api.delete_texture(id) {
                log::warn!("TextureCache: Failed to delete placeholder texture {id:?}: {e}");
            }
        }
    }

    /// Sums the memory accounted for every cached texture.
    pub fn memory_used(&self) -> usize {
        self.records.values().map(TextureRecord::memory_used).sum()
    }
}

fn wrap_for(flags: TextureFlags, bit: TextureFlags) -> TextureWrap {
    if flags.contains(bit) {
        TextureWrap::Repeat
    } else {
        TextureWrap::ClampToEdge
    }
}

/// Converts `info` into RGBA8 texels in `staging`.
///
/// RGBA sources are validated but not copied. Returns the descriptor flags with
/// `TRANSPARENT` added if a chroma-keyed texel was found.
pub fn convert_to_rgba(
    info: &TextureInfo<'_>,
    palette: &[Rgba8; 256],
    staging: &mut Vec<Rgba8>,
) -> Result<TextureFlags, ResourceError> {
    if info.format == TextureFormat::Intensity8 {
        return Err(ResourceError::UnsupportedFormat(info.format));
    }

    let pixels = info.pixel_count();
    let needed = pixels * info.format.source_bytes_per_pixel();
    if info.data.len() < needed {
        return Err(ResourceError::OutOfBounds);
    }

    let mut flags = info.flags;
    if info.format == TextureFormat::Rgba {
        return Ok(flags);
    }

    staging.clear();
    staging.reserve(pixels);
    let data = &info.data[..needed];
    let chromakeyed = info.flags.contains(TextureFlags::CHROMAKEYED);

    match info.format {
        TextureFormat::P8 | TextureFormat::Ap88 => {
            let step = info.format.source_bytes_per_pixel();
            for texel in data.chunks_exact(step) {
                let index = texel[0];
                if chromakeyed && index == CHROMAKEY_INDEX {
                    staging.push(Rgba8::TRANSPARENT);
                    flags.insert(TextureFlags::TRANSPARENT);
                    continue;
                }
                let mut color = palette[index as usize];
                if step == 2 && !chromakeyed {
                    color.a = texel[1];
                }
                staging.push(color);
            }
        }
        TextureFormat::AlphaIntensity88 => {
            staging.extend(
                data.chunks_exact(2)
                    .map(|t| Rgba8::new(t[0], t[0], t[0], t[1])),
            );
        }
        TextureFormat::Alpha8 => {
            staging.extend(data.iter().map(|&a| Rgba8::new(a, 255, 255, 255)));
        }
        TextureFormat::Rgba | TextureFormat::Intensity8 => {}
    }

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info<'a>(format: TextureFormat, flags: TextureFlags, w: u32, data: &'a [u8]) -> TextureInfo<'a> {
        TextureInfo {
            key: TextureKey(1),
            width: w,
            height: 1,
            format,
            flags,
            data,
        }
    }

    fn palette() -> [Rgba8; 256] {
        let mut p = [Rgba8::BLACK; 256];
        p[1] = Rgba8::new(10, 20, 30, 255);
        p[255] = Rgba8::new(200, 0, 200, 255);
        p
    }

    #[test]
    fn chromakey_index_becomes_transparent() {
        let mut staging = Vec::new();
        let tex = info(TextureFormat::P8, TextureFlags::CHROMAKEYED, 2, &[1, 255]);
        let flags = convert_to_rgba(&tex, &palette(), &mut staging).unwrap();
        assert_eq!(staging, vec![Rgba8::new(10, 20, 30, 255), Rgba8::TRANSPARENT]);
        assert!(flags.contains(TextureFlags::TRANSPARENT));
    }

    #[test]
    fn index_255_without_chromakey_uses_palette() {
        let mut staging = Vec::new();
        let tex = info(TextureFormat::P8, TextureFlags::EMPTY, 1, &[255]);
        let flags = convert_to_rgba(&tex, &palette(), &mut staging).unwrap();
        assert_eq!(staging[0], Rgba8::new(200, 0, 200, 255));
        assert!(!flags.contains(TextureFlags::TRANSPARENT));
    }

    #[test]
    fn ap88_takes_alpha_from_second_byte() {
        let mut staging = Vec::new();
        let tex = info(TextureFormat::Ap88, TextureFlags::EMPTY, 2, &[1, 77, 1, 0]);
        convert_to_rgba(&tex, &palette(), &mut staging).unwrap();
        assert_eq!(staging[0].a, 77);
        assert_eq!(staging[1].a, 0);

        // Chroma-keyed AP88 keeps palette alpha.
        let tex = info(TextureFormat::Ap88, TextureFlags::CHROMAKEYED, 1, &[1, 9]);
        convert_to_rgba(&tex, &palette(), &mut staging).unwrap();
        assert_eq!(staging, vec![Rgba8::new(10, 20, 30, 255)]);
    }

    #[test]
    fn intensity_and_alpha_formats() {
        let mut staging = Vec::new();
        let tex = info(TextureFormat::AlphaIntensity88, TextureFlags::EMPTY, 1, &[40, 90]);
        convert_to_rgba(&tex, &palette(), &mut staging).unwrap();
        assert_eq!(staging, vec![Rgba8::new(40, 40, 40, 90)]);

        let tex = info(TextureFormat::Alpha8, TextureFlags::EMPTY, 1, &[128]);
        convert_to_rgba(&tex, &palette(), &mut staging).unwrap();
        assert_eq!(staging, vec![Rgba8::new(128, 255, 255, 255)]);
    }

    #[test]
    fn rejects_short_and_unsupported_data() {
        let mut staging = Vec::new();
        let tex = info(TextureFormat::Rgba, TextureFlags::EMPTY, 2, &[0; 7]);
        assert_eq!(
            convert_to_rgba(&tex, &palette(), &mut staging),
            Err(ResourceError::OutOfBounds)
        );
        let tex = info(TextureFormat::Intensity8, TextureFlags::EMPTY, 1, &[0]);
        assert_eq!(
            convert_to_rgba(&tex, &palette(), &mut staging),
            Err(ResourceError::UnsupportedFormat(TextureFormat::Intensity8))
        );
    }

    #[test]
    fn memory_accounting_by_format() {
        let record = |format| TextureRecord {
            id: TextureId(1),
            width: 8,
            height: 4,
            format,
            flags: TextureFlags::EMPTY,
        };
        assert_eq!(record(TextureFormat::Rgba).memory_used(), 128);
        assert_eq!(record(TextureFormat::Ap88).memory_used(), 64);
        assert_eq!(record(TextureFormat::P8).memory_used(), 32);
    }
}
