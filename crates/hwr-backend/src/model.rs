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

//! Model keyframe buffers and the scratch buffers used to blend between frames.

use ahash::AHashMap;
use bytemuck::{Pod, Zeroable};
use hwr_core::renderer::{
    BufferId, FullFrame, GraphicsApi, IndexData, Mesh, MeshFrames, Model, ModelKey,
    PrimitiveTopology, ResourceError, TinyFrame, VertexAttribute, VertexFormat, VertexLayout,
};
use std::mem::offset_of;
use thiserror::Error;

/// Raised when a frame holds fewer components than its mesh claims.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramePackError {
    /// An attribute array is too short.
    #[error("{attribute} has {actual} components, mesh needs {expected}")]
    ShortAttribute {
        /// Which array.
        attribute: &'static str,
        /// Components the mesh needs.
        expected: usize,
        /// Components present.
        actual: usize,
    },
}

impl From<FramePackError> for ResourceError {
    fn from(e: FramePackError) -> Self {
        ResourceError::MalformedData(e.to_string())
    }
}

fn check_len<T>(attribute: &'static str, data: &[T], expected: usize) -> Result<(), FramePackError> {
    if data.len() < expected {
        return Err(FramePackError::ShortAttribute {
            attribute,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Interleaved full-precision vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct FullVertex {
    /// Position.
    pub position: [f32; 3],
    /// Normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
    /// Lightmap coordinate, zero when the mesh has none.
    pub light_uv: [f32; 2],
    /// Tangent, zero when the frame has none.
    pub tangent: [f32; 3],
    /// Vertex color.
    pub color: [u8; 4],
}

impl FullVertex {
    /// Byte stride.
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;
}

/// Interleaved compressed vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TinyVertex {
    /// Position in 1/64 units.
    pub position: [i16; 3],
    /// Normal scaled to the `i8` range.
    pub normal: [i8; 3],
    /// Tangent scaled to the `i8` range.
    pub tangent: [i8; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl TinyVertex {
    /// Byte stride.
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;
}

/// Interleaves one full-precision frame. Meshes of this kind are not indexed,
/// so three vertices are written per triangle.
pub fn pack_full_frame(mesh: &Mesh, frame: &FullFrame) -> Result<Vec<FullVertex>, FramePackError> {
    let count = mesh.num_triangles as usize * 3;
    check_len("vertices", &frame.vertices, count * 3)?;
    check_len("normals", &frame.normals, count * 3)?;
    check_len("uvs", &mesh.uvs, count * 2)?;
    if let Some(tangents) = &frame.tangents {
        check_len("tangents", tangents, count * 3)?;
    }
    if let Some(light_uvs) = &mesh.light_uvs {
        check_len("light uvs", light_uvs, count * 2)?;
    }
    if let Some(colors) = &frame.colors {
        check_len("colors", colors, count * 4)?;
    }

    let vertices = (0..count)
        .map(|i| {
            let v3 = i * 3..i * 3 + 3;
            let v2 = i * 2..i * 2 + 2;
            let mut vertex = FullVertex {
                color: [255; 4],
                ..FullVertex::default()
            };
            vertex.position.copy_from_slice(&frame.vertices[v3.clone()]);
            vertex.normal.copy_from_slice(&frame.normals[v3.clone()]);
            vertex.uv.copy_from_slice(&mesh.uvs[v2.clone()]);
            if let Some(tangents) = &frame.tangents {
                vertex.tangent.copy_from_slice(&tangents[v3]);
            }
            if let Some(light_uvs) = &mesh.light_uvs {
                vertex.light_uv.copy_from_slice(&light_uvs[v2]);
            }
            if let Some(colors) = &frame.colors {
                vertex.color.copy_from_slice(&colors[i * 4..i * 4 + 4]);
            }
            vertex
        })
        .collect();
    Ok(vertices)
}

/// Interleaves one compressed frame, one vertex per distinct mesh vertex.
pub fn pack_tiny_frame(mesh: &Mesh, frame: &TinyFrame) -> Result<Vec<TinyVertex>, FramePackError> {
    let count = mesh.num_vertices as usize;
    check_len("vertices", &frame.vertices, count * 3)?;
    check_len("normals", &frame.normals, count * 3)?;
    check_len("uvs", &mesh.uvs, count * 2)?;
    if let Some(tangents) = &frame.tangents {
        check_len("tangents", tangents, count * 3)?;
    }

    let vertices = (0..count)
        .map(|i| {
            let v3 = i * 3..i * 3 + 3;
            let mut vertex = TinyVertex::default();
            vertex.position.copy_from_slice(&frame.vertices[v3.clone()]);
            vertex.normal.copy_from_slice(&frame.normals[v3.clone()]);
            vertex.uv.copy_from_slice(&mesh.uvs[i * 2..i * 2 + 2]);
            if let Some(tangents) = &frame.tangents {
                vertex.tangent.copy_from_slice(&tangents[v3]);
            }
            vertex
        })
        .collect();
    Ok(vertices)
}

/// How far along the current frame is, in `[0, 1]`.
///
/// Instantaneous (`0`) and infinite (`-1`) durations, and a `tics` of `-1`,
/// never interpolate. The elapsed time is taken unsigned, so a frame that has
/// overrun its duration clamps to `1`.
pub fn interpolation_fraction(duration: i32, tics: i32) -> f32 {
    if duration == 0 || duration == -1 || tics == -1 {
        return 0.0;
    }
    let elapsed = duration.wrapping_sub(tics) as u32;
    (elapsed as f32 / duration as f32).clamp(0.0, 1.0)
}

/// Scratch space for interpolated positions and normals.
///
/// Grows to the largest mesh seen and never shrinks.
#[derive(Debug, Default)]
pub struct LerpBuffers {
    positions: Vec<f32>,
    normals: Vec<f32>,
    tiny_positions: Vec<i16>,
    tiny_normals: Vec<i8>,
}

impl LerpBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Components the full-precision buffers can hold.
    pub fn full_capacity(&self) -> usize {
        self.positions.len()
    }

    /// Components the compressed buffers can hold.
    pub fn tiny_capacity(&self) -> usize {
        self.tiny_positions.len()
    }

    fn reserve_full(&mut self, components: usize) {
        if self.positions.len() >= components {
            return;
        }
        log::debug!("LerpBuffers: Growing full-precision buffers to {components} components");
        self.positions.resize(components, 0.0);
        self.normals.resize(components, 0.0);
    }

    fn reserve_tiny(&mut self, components: usize) {
        if self.tiny_positions.len() >= components {
            return;
        }
        log::debug!("LerpBuffers: Growing compressed buffers to {components} components");
        self.tiny_positions.resize(components, 0);
        self.tiny_normals.resize(components, 0);
    }

    /// Blends `vertex_count` vertices of two full-precision frames.
    ///
    /// Returns the interpolated positions and normals.
    pub fn lerp_full(
        &mut self,
        from: &FullFrame,
        to: &FullFrame,
        vertex_count: usize,
        t: f32,
    ) -> Result<(&[f32], &[f32]), FramePackError> {
        let n = vertex_count * 3;
        for frame in [from, to] {
            check_len("vertices", &frame.vertices, n)?;
            check_len("normals", &frame.normals, n)?;
        }
        self.reserve_full(n);
        for j in 0..n {
            let (a, b) = (from.vertices[j], to.vertices[j]);
            self.positions[j] = a + t * (b - a);
            let (a, b) = (from.normals[j], to.normals[j]);
            self.normals[j] = a + t * (b - a);
        }
        Ok((&self.positions[..n], &self.normals[..n]))
    }

    /// Blends `vertex_count` vertices of two compressed frames, truncating toward zero.
    pub fn lerp_tiny(
        &mut self,
        from: &TinyFrame,
        to: &TinyFrame,
        vertex_count: usize,
        t: f32,
    ) -> Result<(&[i16], &[i8]), FramePackError> {
        let n = vertex_count * 3;
        for frame in [from, to] {
            check_len("vertices", &frame.vertices, n)?;
            check_len("normals", &frame.normals, n)?;
        }
        self.reserve_tiny(n);
        for j in 0..n {
            let (a, b) = (f32::from(from.vertices[j]), f32::from(to.vertices[j]));
            self.tiny_positions[j] = (a + t * (b - a)) as i16;
            let (a, b) = (f32::from(from.normals[j]), f32::from(to.normals[j]));
            self.tiny_normals[j] = (a + t * (b - a)) as i8;
        }
        Ok((&self.tiny_positions[..n], &self.tiny_normals[..n]))
    }
}

/// Which keyframes a draw uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSelection {
    /// Current frame, taken modulo each mesh's frame count.
    pub frame: i32,
    /// Frame being blended toward, if any.
    pub next: Option<i32>,
    /// Blend weight of `next`.
    pub fraction: f32,
}

fn wrap_frame(index: i32, count: usize) -> usize {
    index.rem_euclid(count as i32) as usize
}

/// One GPU buffer per keyframe, per mesh, per model.
#[derive(Debug, Default)]
pub struct ModelBufferCache {
    models: AHashMap<ModelKey, Vec<Vec<BufferId>>>,
}

impl ModelBufferCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of models with buffers.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no model has buffers.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Returns `true` if buffers exist for `key`.
    pub fn contains(&self, key: ModelKey) -> bool {
        self.models.contains_key(&key)
    }

    /// The buffers of a model, indexed by mesh then frame.
    pub fn buffers(&self, key: ModelKey) -> Option<&[Vec<BufferId>]> {
        self.models.get(&key).map(Vec::as_slice)
    }

    /// Uploads every keyframe of `model`, replacing any buffers it already had.
    ///
    /// Returns the number of buffers created.
    ///
    /// ## Errors
    /// * `ResourceError::MalformedData` - If a frame is shorter than its mesh claims.
    /// * Whatever the backend returns when a buffer cannot be created.
    ///
    /// On error no buffers are kept for the model.
    pub fn create(&mut self, api: &mut dyn GraphicsApi, model: &Model) -> Result<usize, ResourceError> {
        self.release(api, model.key);

        let mut meshes: Vec<Vec<BufferId>> = Vec::with_capacity(model.meshes.len());
        let result = upload_model(api, model, &mut meshes);
        api.bind_buffer(None);

        match result {
            Ok(count) => {
                log::debug!(
                    "ModelBufferCache: Created {count} frame buffers for {:?}",
                    model.key
                );
                self.models.insert(model.key, meshes);
                Ok(count)
            }
            Err(e) => {
                destroy_all(api, meshes.into_iter().flatten());
                Err(e)
            }
        }
    }

    /// Destroys the buffers of one model.
    pub fn release(&mut self, api: &mut dyn GraphicsApi, key: ModelKey) {
        if let Some(meshes) = self.models.remove(&key) {
            destroy_all(api, meshes.into_iter().flatten());
        }
    }

    /// Destroys every buffer.
    pub fn clear(&mut self, api: &mut dyn GraphicsApi) {
        for (_, meshes) in self.models.drain() {
            destroy_all(api, meshes.into_iter().flatten());
        }
    }

    /// Draws every mesh of `model` with its frame buffers or the lerp buffers.
    ///
    /// The model matrix and per-draw uniforms must already be set.
    ///
    /// ## Errors
    /// * `ResourceError::NotFound` - If no buffers were created for the model.
    /// * `ResourceError::MalformedData` - If an interpolated frame is too short.
    pub fn draw(
        &self,
        api: &mut dyn GraphicsApi,
        model: &Model,
        selection: FrameSelection,
        lerp: &mut LerpBuffers,
    ) -> Result<(), ResourceError> {
        let buffers = self.models.get(&model.key).ok_or(ResourceError::NotFound)?;

        for (mesh_index, mesh) in model.meshes.iter().enumerate() {
            let frame_count = mesh.frames.len();
            if frame_count == 0 {
                continue;
            }
            let frame = wrap_frame(selection.frame, frame_count);
            let next = selection
                .next
                .filter(|_| selection.fraction != 0.0)
                .map(|n| wrap_frame(n, frame_count));

            match next {
                None => {
                    let Some(&buffer) = buffers.get(mesh_index).and_then(|m| m.get(frame)) else {
                        log::warn!(
                            "ModelBufferCache: No buffer for mesh {mesh_index} frame {frame} of {:?}",
                            model.key
                        );
                        continue;
                    };
                    draw_static(api, mesh, buffer);
                }
                Some(next) => draw_interpolated(api, mesh, frame, next, selection.fraction, lerp)?,
            }
        }
        Ok(())
    }
}

fn upload_model(
    api: &mut dyn GraphicsApi,
    model: &Model,
    meshes: &mut Vec<Vec<BufferId>>,
) -> Result<usize, ResourceError> {
    let mut count = 0;
    for mesh in &model.meshes {
        let mut frames = Vec::with_capacity(mesh.frames.len());
        let result = upload_mesh(api, mesh, &mut frames);
        count += frames.len();
        meshes.push(frames);
        result?;
    }
    Ok(count)
}

fn upload_mesh(
    api: &mut dyn GraphicsApi,
    mesh: &Mesh,
    frames: &mut Vec<BufferId>,
) -> Result<(), ResourceError> {
    match &mesh.frames {
        MeshFrames::Full(list) => {
            for frame in list {
                let packed = pack_full_frame(mesh, frame)?;
                frames.push(api.create_buffer_with_data(bytemuck::cast_slice(&packed))?);
            }
        }
        MeshFrames::Tiny(list) => {
            for frame in list {
                let packed = pack_tiny_frame(mesh, frame)?;
                frames.push(api.create_buffer_with_data(bytemuck::cast_slice(&packed))?);
            }
        }
    }
    Ok(())
}

fn destroy_all(api: &mut dyn GraphicsApi, buffers: impl Iterator<Item = BufferId>) {
    for buffer in buffers {
        if let Err(e) = api.destroy_buffer(buffer) {
            log::warn!("ModelBufferCache: Failed to destroy buffer {buffer:?}: {e}");
        }
    }
}

fn triangle_indices(mesh: &Mesh) -> &[u16] {
    let wanted = mesh.num_triangles as usize * 3;
    &mesh.indices[..wanted.min(mesh.indices.len())]
}

fn draw_static(api: &mut dyn GraphicsApi, mesh: &Mesh, buffer: BufferId) {
    api.bind_buffer(Some(buffer));
    match &mesh.frames {
        MeshFrames::Tiny(_) => {
            let stride = TinyVertex::STRIDE;
            api.vertex_attrib_pointer(
                VertexAttribute::Position,
                VertexLayout::buffer(3, VertexFormat::I16, stride, offset_of!(TinyVertex, position)),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::TexCoord,
                VertexLayout::buffer(2, VertexFormat::F32, stride, offset_of!(TinyVertex, uv)),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::Normal,
                VertexLayout::buffer(3, VertexFormat::I8, stride, offset_of!(TinyVertex, normal)),
            );
            api.draw_elements(
                PrimitiveTopology::TriangleList,
                IndexData::U16(triangle_indices(mesh)),
            );
        }
        MeshFrames::Full(_) => {
            let stride = FullVertex::STRIDE;
            api.vertex_attrib_pointer(
                VertexAttribute::Position,
                VertexLayout::buffer(3, VertexFormat::F32, stride, offset_of!(FullVertex, position)),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::TexCoord,
                VertexLayout::buffer(2, VertexFormat::F32, stride, offset_of!(FullVertex, uv)),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::Normal,
                VertexLayout::buffer(3, VertexFormat::F32, stride, offset_of!(FullVertex, normal)),
            );
            api.draw_arrays(PrimitiveTopology::TriangleList, 0, mesh.num_triangles * 3);
        }
    }
    api.bind_buffer(None);
}

fn draw_interpolated(
    api: &mut dyn GraphicsApi,
    mesh: &Mesh,
    frame: usize,
    next: usize,
    t: f32,
    lerp: &mut LerpBuffers,
) -> Result<(), ResourceError> {
    let vertex_count = mesh.num_vertices as usize;
    let uvs: &[u8] = bytemuck::cast_slice(&mesh.uvs);
    match &mesh.frames {
        MeshFrames::Tiny(list) => {
            let (positions, normals) = lerp.lerp_tiny(&list[frame], &list[next], vertex_count, t)?;
            api.vertex_attrib_pointer(
                VertexAttribute::Position,
                VertexLayout::client(3, VertexFormat::I16, bytemuck::cast_slice(positions)),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::TexCoord,
                VertexLayout::client(2, VertexFormat::F32, uvs),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::Normal,
                VertexLayout::client(3, VertexFormat::I8, bytemuck::cast_slice(normals)),
            );
            api.draw_elements(
                PrimitiveTopology::TriangleList,
                IndexData::U16(triangle_indices(mesh)),
            );
        }
        MeshFrames::Full(list) => {
            let (positions, normals) = lerp.lerp_full(&list[frame], &list[next], vertex_count, t)?;
            api.vertex_attrib_pointer(
                VertexAttribute::Position,
                VertexLayout::client(3, VertexFormat::F32, bytemuck::cast_slice(positions)),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::TexCoord,
                VertexLayout::client(2, VertexFormat::F32, uvs),
            );
            api.vertex_attrib_pointer(
                VertexAttribute::Normal,
                VertexLayout::client(3, VertexFormat::F32, bytemuck::cast_slice(normals)),
            );
            api.draw_arrays(PrimitiveTopology::TriangleList, 0, mesh.num_vertices);
        }
    }
    Ok(())
}
