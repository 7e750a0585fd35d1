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

//! Screen captures used by wipes, intermissions and the final present.

use hwr_core::renderer::{
    GraphicsApi, ResourceError, TextureFilter, TextureId, TextureParameter, TextureWrap,
};

/// Vertices per side of the post-image warp grid.
pub const SCREEN_VERTS: usize = 10;

/// The warp grid handed to [`crate::RenderContext::post_image_redraw`].
pub type WarpGrid = [[[f32; 2]; SCREEN_VERTS]; SCREEN_VERTS];

/// A quad covering the whole viewport, as a triangle fan.
pub const FULLSCREEN_QUAD: [f32; 12] = [
    -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, //
    1.0, -1.0, 1.0,
];

/// Fade-mask coordinates matching [`FULLSCREEN_QUAD`].
pub const FADE_MASK_UVS: [f32; 8] = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0];

/// The four screen captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenTexture {
    /// Last scene, drawn under intermissions and warped by post effects.
    Screen,
    /// Wipe source.
    StartWipe,
    /// Wipe destination.
    EndWipe,
    /// Frame presented by the final blit.
    Final,
}

impl ScreenTexture {
    /// Every capture.
    pub const ALL: [ScreenTexture; 4] = [
        ScreenTexture::Screen,
        ScreenTexture::StartWipe,
        ScreenTexture::EndWipe,
        ScreenTexture::Final,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Side of the square capture texture for a screen width.
pub fn capture_size(screen_width: u32) -> u32 {
    match screen_width {
        0..=512 => 512,
        513..=1024 => 1024,
        _ => 2048,
    }
}

/// Texture coordinates that map the captured screen region onto a fan.
pub fn capture_uvs(screen_width: u32, screen_height: u32) -> [f32; 8] {
    let size = capture_size(screen_width) as f32;
    let x = screen_width as f32 / size;
    let y = screen_height as f32 / size;
    [0.0, 0.0, 0.0, y, x, y, x, 0.0]
}

/// Half-extents of the presented quad that keep the captured aspect ratio.
pub fn letterbox(screen_width: u32, screen_height: u32, width: u32, height: u32) -> (f32, f32) {
    if screen_height == 0 || height == 0 {
        return (1.0, 1.0);
    }
    let captured = screen_width as f32 / screen_height as f32;
    let target = width as f32 / height as f32;
    if captured < target {
        (captured / target, 1.0)
    } else if captured > target {
        (1.0, target / captured)
    } else {
        (1.0, 1.0)
    }
}

/// Positions and texture coordinates of warp-grid cell `(x, y)`.
pub fn warp_cell(
    points: &WarpGrid,
    x: usize,
    y: usize,
    screen_width: u32,
    screen_height: u32,
) -> ([f32; 12], [f32; 8]) {
    let size = capture_size(screen_width) as f32;
    let cells = (SCREEN_VERTS - 1) as f32;
    let x_fix = size / (screen_width.max(1) as f32 / cells);
    let y_fix = size / (screen_height.max(1) as f32 / cells);

    let (s0, t0) = (x as f32 / x_fix, y as f32 / y_fix);
    let (s1, t1) = ((x + 1) as f32 / x_fix, (y + 1) as f32 / y_fix);
    let uvs = [s0, t0, s0, t1, s1, t1, s1, t0];

    let corner = |cx: usize, cy: usize| {
        let [px, py] = points[cx][cy];
        [px / 4.5, py / 4.5, 1.0]
    };
    let mut positions = [0.0; 12];
    for (i, (cx, cy)) in [(x, y), (x, y + 1), (x + 1, y + 1), (x + 1, y)].into_iter().enumerate() {
        positions[i * 3..i * 3 + 3].copy_from_slice(&corner(cx, cy));
    }
    (positions, uvs)
}

/// The native textures holding screen captures.
#[derive(Debug, Default)]
pub struct ScreenTextures {
    ids: [Option<TextureId>; 4],
}

impl ScreenTextures {
    /// No captures yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The texture behind a capture, if it was taken.
    pub fn get(&self, which: ScreenTexture) -> Option<TextureId> {
        self.ids[which.index()]
    }

    /// Copies the framebuffer into a capture texture and leaves it bound.
    ///
    /// The first capture allocates the texture with nearest filtering and
    /// clamped wrapping; later ones overwrite it in place.
    ///
    /// ## Errors
    /// * Whatever the backend returns when the texture cannot be created.
    pub fn capture(
        &mut self,
        api: &mut dyn GraphicsApi,
        which: ScreenTexture,
        screen_width: u32,
    ) -> Result<TextureId, ResourceError> {
        let size = capture_size(screen_width);
        let slot = &mut self.ids[which.index()];
        match *slot {
            Some(id) => {
                api.bind_texture(id);
                api.copy_tex_sub_image_2d(size);
                Ok(id)
            }
            None => {
                let id = api.create_texture()?;
                api.bind_texture(id);
                api.tex_parameter(TextureParameter::MagFilter(TextureFilter::Nearest));
                api.tex_parameter(TextureParameter::MinFilter(TextureFilter::Nearest));
                api.tex_parameter(TextureParameter::WrapS(TextureWrap::ClampToEdge));
                api.tex_parameter(TextureParameter::WrapT(TextureWrap::ClampToEdge));
                api.copy_tex_image_2d(size);
                log::debug!("ScreenTextures: Allocated {which:?} capture {id:?} ({size}x{size})");
                *slot = Some(id);
                Ok(id)
            }
        }
    }

    /// Deletes every capture. Called whenever the screen size changes.
    pub fn flush(&mut self, api: &mut dyn GraphicsApi) {
        for (which, slot) in ScreenTexture::ALL.into_iter().zip(self.ids.iter_mut()) {
            if let Some(id) = slot.take() {
                if let Err(e) = api.delete_texture(id) {
                    log::warn!("ScreenTextures: Failed to delete {which:?} capture {id:?}: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn capture_sizes_are_powers_of_two() {
        assert_eq!(capture_size(320), 512);
        assert_eq!(capture_size(512), 512);
        assert_eq!(capture_size(640), 1024);
        assert_eq!(capture_size(1024), 1024);
        assert_eq!(capture_size(1920), 2048);
    }

    #[test]
    fn capture_uvs_cover_the_screen_region() {
        let uvs = capture_uvs(640, 400);
        assert_relative_eq!(uvs[4], 0.625);
        assert_relative_eq!(uvs[3], 0.390625);
        assert_eq!(uvs[0], 0.0);
    }

    #[test]
    fn letterbox_bars() {
        // 4:3 capture shown on 16:9 gets pillarboxed.
        let (x, y) = letterbox(640, 480, 1920, 1080);
        assert_relative_eq!(x, 0.75);
        assert_eq!(y, 1.0);
        // 16:9 capture on 4:3 gets letterboxed.
        let (x, y) = letterbox(1920, 1080, 640, 480);
        assert_eq!(x, 1.0);
        assert_relative_eq!(y, 0.75);
        assert_eq!(letterbox(640, 480, 320, 240), (1.0, 1.0));
    }

    #[test]
    fn warp_cell_scales_points() {
        let mut grid: WarpGrid = [[[0.0; 2]; SCREEN_VERTS]; SCREEN_VERTS];
        grid[1][1] = [9.0, -4.5];
        let (positions, uvs) = warp_cell(&grid, 0, 0, 512, 512);
        assert_relative_eq!(positions[6], 2.0);
        assert_relative_eq!(positions[7], -1.0);
        assert_eq!(positions[8], 1.0);
        // One cell is a ninth of the screen, which fills the whole capture.
        assert_relative_eq!(uvs[4], 1.0 / 9.0);
    }
}
