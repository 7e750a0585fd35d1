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

//! Sky dome tessellation and its vertex buffer.

use bytemuck::{Pod, Zeroable};
use hwr_core::math::degrees_to_radians;
use hwr_core::renderer::{
    BufferId, GraphicsApi, PrimitiveTopology, ResourceError, TextureKey, VertexAttribute,
    VertexFormat, VertexLayout,
};
use std::mem::offset_of;

/// Rows in each hemisphere.
pub const SKY_ROWS: u32 = 4;

const DOME_RADIUS: f32 = 10000.0;
const MAX_SIDE_ANGLE: f32 = 60.0;
const ROW_LIFT: f32 = 300.0;
const MAP_COEFF: f32 = 128.0;

/// One interleaved sky vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SkyVertex {
    /// Position in view space.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
    /// Vertex color; the fog layers fade through its alpha.
    pub color: [f32; 4],
}

impl SkyVertex {
    /// Byte stride between vertices.
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;
}

/// A contiguous range of the dome drawn with one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyLoop {
    /// Primitive type for the range.
    pub topology: PrimitiveTopology,
    /// First vertex.
    pub first: u32,
    /// Vertex count.
    pub count: u32,
    /// `false` for the untextured fog caps.
    pub textured: bool,
}

/// CPU-side dome geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyMesh {
    rows: u32,
    columns: u32,
    loops: Vec<SkyLoop>,
    vertices: Vec<SkyVertex>,
}

/// Parameters for a single vertex evaluation.
struct Hemisphere {
    rows: u32,
    columns: u32,
    flipped: bool,
    fog_layer: bool,
    delta: f32,
    repeat: f32,
}

impl Hemisphere {
    fn vertex(&self, r: u32, c: u32) -> SkyVertex {
        let rows = self.rows as f32;
        let top_angle = degrees_to_radians(c as f32 / self.columns as f32 * 360.0);
        let side_angle = degrees_to_radians(MAX_SIDE_ANGLE * (self.rows - r) as f32 / rows);
        let height = side_angle.sin() * DOME_RADIUS;
        let radius = side_angle.cos() * DOME_RADIUS;

        let mut y = if self.flipped { -height } else { height };
        if r != self.rows {
            y += ROW_LIFT;
        }

        let mut vertex = SkyVertex {
            position: [radius * top_angle.cos(), y + self.delta, radius * top_angle.sin()],
            ..SkyVertex::default()
        };
        if self.fog_layer {
            vertex.color = [1.0; 4];
        } else {
            let alpha = if r == 0 { 0.0 } else { 1.0 };
            vertex.color = [1.0, 1.0, 1.0, alpha];
            let u = -self.repeat * c as f32 / self.columns as f32;
            // The lower hemisphere samples the mirrored half of the texture.
            let v = if self.flipped {
                1.0 + (self.rows - r) as f32 / rows + 0.5
            } else {
                r as f32 / rows + 0.5
            };
            vertex.uv = [u, v];
        }
        vertex
    }
}

impl SkyMesh {
    /// Number of vertices a dome of the given size holds.
    pub fn vertex_count(rows: u32, columns: u32) -> usize {
        (2 * rows * (columns * 2 + 2) + columns * 2) as usize
    }

    /// Tessellates both hemispheres.
    ///
    /// Each hemisphere is a fog fan followed by one strip per row.
    /// `texture_width` sets how often the texture repeats around the dome.
    pub fn build(rows: u32, columns: u32, texture_width: i32) -> Self {
        let rows = rows.max(1);
        let columns = columns.max(1);
        let repeat = if texture_width > 0 {
            4.0 * (256.0 / texture_width as f32)
        } else {
            1.0
        };

        let mut vertices = Vec::with_capacity(Self::vertex_count(rows, columns));
        let mut loops = Vec::with_capacity((rows * 2 + 2) as usize);

        for flipped in [false, true] {
            let mut hemi = Hemisphere {
                rows,
                columns,
                flipped,
                fog_layer: true,
                delta: 0.0,
                repeat,
            };

            loops.push(SkyLoop {
                topology: PrimitiveTopology::TriangleFan,
                first: vertices.len() as u32,
                count: columns,
                textured: false,
            });
            vertices.extend((0..columns).map(|c| hemi.vertex(1, c)));

            hemi.fog_layer = false;
            hemi.delta = (if flipped { 5.0 } else { -5.0 }) / MAP_COEFF;
            let (upper, lower) = if flipped { (1, 0) } else { (0, 1) };

            for r in 0..rows {
                loops.push(SkyLoop {
                    topology: PrimitiveTopology::TriangleStrip,
                    first: vertices.len() as u32,
                    count: 2 * columns + 2,
                    textured: true,
                });
                for c in 0..=columns {
                    vertices.push(hemi.vertex(r + upper, c));
                    vertices.push(hemi.vertex(r + lower, c));
                }
            }
        }

        Self {
            rows,
            columns,
            loops,
            vertices,
        }
    }

    /// Rows per hemisphere.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Columns around the dome.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// The draw ranges, fog fans and strips interleaved per hemisphere.
    pub fn loops(&self) -> &[SkyLoop] {
        &self.loops
    }

    /// The generated vertices.
    pub fn vertices(&self) -> &[SkyVertex] {
        &self.vertices
    }
}

/// The dome geometry plus the GPU buffer built from it.
///
/// The mesh is rebuilt only when the sky texture or the tessellation changes.
#[derive(Debug, Default)]
pub struct SkyDome {
    mesh: Option<SkyMesh>,
    buffer: Option<BufferId>,
    last_texture: Option<TextureKey>,
    builds: usize,
}

impl SkyDome {
    /// Creates an empty dome; nothing is built until the first draw.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mesh, if one was built.
    pub fn mesh(&self) -> Option<&SkyMesh> {
        self.mesh.as_ref()
    }

    /// The GPU buffer holding [`Self::mesh`].
    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    /// How many times the dome was tessellated.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Makes sure the buffer matches `texture` and the tessellation.
    ///
    /// Returns `true` if the dome was rebuilt.
    ///
    /// ## Errors
    /// * Whatever the backend returns when the buffer cannot be created.
    pub fn prepare(
        &mut self,
        api: &mut dyn GraphicsApi,
        texture: TextureKey,
        texture_width: i32,
        columns: u32,
    ) -> Result<bool, ResourceError> {
        let same_shape = self
            .mesh
            .as_ref()
            .is_some_and(|m| m.rows == SKY_ROWS && m.columns == columns.max(1));
        if self.last_texture == Some(texture) && same_shape && self.buffer.is_some() {
            return Ok(false);
        }

        if let Some(old) = self.buffer.take() {
            if let Err(e) = api.destroy_buffer(old) {
                log::warn!("SkyDome: Failed to destroy buffer {old:?}: {e}");
            }
        }

        let mesh = SkyMesh::build(SKY_ROWS, columns, texture_width);
        let buffer = api.create_buffer_with_data(bytemuck::cast_slice(mesh.vertices()))?;
        api.bind_buffer(Some(buffer));
        log::debug!(
            "SkyDome: Built {}x{} dome ({} vertices) for {texture:?} into {buffer:?}",
            mesh.rows,
            mesh.columns,
            mesh.vertices.len()
        );

        self.mesh = Some(mesh);
        self.buffer = Some(buffer);
        self.last_texture = Some(texture);
        self.builds += 1;
        Ok(true)
    }

    /// Points the attributes at the dome buffer and enables vertex colors.
    pub fn bind_attributes(&self, api: &mut dyn GraphicsApi) {
        api.bind_buffer(self.buffer);
        api.enable_vertex_attrib(VertexAttribute::Colors);
        let stride = SkyVertex::STRIDE;
        api.vertex_attrib_pointer(
            VertexAttribute::Position,
            VertexLayout::buffer(3, VertexFormat::F32, stride, offset_of!(SkyVertex, position)),
        );
        api.vertex_attrib_pointer(
            VertexAttribute::TexCoord,
            VertexLayout::buffer(2, VertexFormat::F32, stride, offset_of!(SkyVertex, uv)),
        );
        api.vertex_attrib_pointer(
            VertexAttribute::Colors,
            VertexLayout::buffer(4, VertexFormat::F32, stride, offset_of!(SkyVertex, color)),
        );
    }

    /// Issues the draws: fog caps first, then the textured strips.
    ///
    /// Returns the number of draw calls.
    pub fn draw_loops(&self, api: &mut dyn GraphicsApi) -> usize {
        let Some(mesh) = &self.mesh else {
            return 0;
        };
        let mut draws = 0;
        for textured in [false, true] {
            for l in mesh.loops.iter().filter(|l| l.textured == textured) {
                api.draw_arrays(l.topology, l.first, l.count);
                draws += 1;
            }
        }
        draws
    }

    /// Releases the buffer. The next draw rebuilds.
    pub fn release(&mut self, api: &mut dyn GraphicsApi) {
        if let Some(buffer) = self.buffer.take() {
            if let Err(e) = api.destroy_buffer(buffer) {
                log::warn!("SkyDome: Failed to destroy buffer {buffer:?}: {e}");
            }
        }
        self.mesh = None;
        self.last_texture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertex_is_36_bytes() {
        assert_eq!(SkyVertex::STRIDE, 36);
        assert_eq!(offset_of!(SkyVertex, uv), 12);
        assert_eq!(offset_of!(SkyVertex, color), 20);
    }

    #[test]
    fn vertex_and_loop_counts() {
        let mesh = SkyMesh::build(4, 64, 256);
        assert_eq!(mesh.vertices().len(), SkyMesh::vertex_count(4, 64));
        assert_eq!(mesh.vertices().len(), 2 * 4 * 130 + 128);
        assert_eq!(mesh.loops().len(), 10);

        let fans: Vec<_> = mesh.loops().iter().filter(|l| !l.textured).collect();
        assert_eq!(fans.len(), 2);
        assert!(fans.iter().all(|l| l.topology == PrimitiveTopology::TriangleFan && l.count == 64));

        // Loops tile the vertex array without gaps.
        let mut next = 0;
        for l in mesh.loops() {
            assert_eq!(l.first, next);
            next += l.count;
        }
        assert_eq!(next as usize, mesh.vertices().len());
    }

    #[test]
    fn fog_fan_is_opaque_white() {
        let mesh = SkyMesh::build(4, 16, 256);
        let fan = mesh.loops()[0];
        for v in &mesh.vertices()[fan.first as usize..(fan.first + fan.count) as usize] {
            assert_eq!(v.color, [1.0; 4]);
        }
    }

    #[test]
    fn top_row_fades_out() {
        let mesh = SkyMesh::build(4, 16, 256);
        let strip = mesh.loops()[1];
        let first = &mesh.vertices()[strip.first as usize];
        // Row 0 is the first vertex of the first upper strip.
        assert_eq!(first.color[3], 0.0);
        assert_relative_eq!(first.uv[1], 0.5);
        let second = &mesh.vertices()[strip.first as usize + 1];
        assert_eq!(second.color[3], 1.0);
        assert_relative_eq!(second.uv[1], 0.75);
    }

    #[test]
    fn texture_width_sets_repeat() {
        let narrow = SkyMesh::build(4, 16, 128);
        let strip = narrow.loops()[1];
        // Column 8 of 16 is half way round; repeat is 4 * 256 / 128.
        let v = &narrow.vertices()[strip.first as usize + 16];
        assert_relative_eq!(v.uv[0], -4.0);

        let degenerate = SkyMesh::build(4, 16, 0);
        let v = &degenerate.vertices()[degenerate.loops()[1].first as usize + 16];
        assert_relative_eq!(v.uv[0], -0.5);
    }

    #[test]
    fn lower_hemisphere_is_mirrored() {
        let mesh = SkyMesh::build(4, 16, 256);
        let upper = mesh.vertices()[mesh.loops()[0].first as usize];
        let lower = mesh.vertices()[mesh.loops()[5].first as usize];
        assert_relative_eq!(
            upper.position[1] - ROW_LIFT,
            -(lower.position[1] - ROW_LIFT),
            epsilon = 1e-2
        );
        assert_relative_eq!(upper.position[0], lower.position[0]);
    }
}
