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

//! Already-parsed model data consumed by the model buffer upload.
//!
//! Loading and parsing model files happens outside the backend. A model arrives
//! as a list of meshes, each holding every keyframe in one of two precisions.

/// The engine-side identity of a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey(pub u64);

/// A full-precision keyframe.
///
/// Per-vertex arrays are flat: three floats per position, normal and tangent,
/// four bytes per color.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FullFrame {
    /// `x, y, z` per vertex.
    pub vertices: Vec<f32>,
    /// `nx, ny, nz` per vertex.
    pub normals: Vec<f32>,
    /// Optional tangents.
    pub tangents: Option<Vec<f32>>,
    /// Optional per-vertex RGBA colors. White when absent.
    pub colors: Option<Vec<u8>>,
}

/// A compressed keyframe: 16-bit positions in 1/64 units and 8-bit normals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TinyFrame {
    /// `x, y, z` per vertex.
    pub vertices: Vec<i16>,
    /// `nx, ny, nz` per vertex.
    pub normals: Vec<i8>,
    /// Optional tangents.
    pub tangents: Option<Vec<i8>>,
}

/// The keyframes of one mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshFrames {
    /// Full-precision frames, drawn as non-indexed triangles.
    Full(Vec<FullFrame>),
    /// Compressed frames, drawn through the mesh's index list.
    Tiny(Vec<TinyFrame>),
}

impl MeshFrames {
    /// Number of keyframes.
    pub fn len(&self) -> usize {
        match self {
            MeshFrames::Full(f) => f.len(),
            MeshFrames::Tiny(f) => f.len(),
        }
    }

    /// Returns `true` if there are no keyframes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for compressed frames.
    pub fn is_tiny(&self) -> bool {
        matches!(self, MeshFrames::Tiny(_))
    }
}

/// One surface of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Number of triangles.
    pub num_triangles: u32,
    /// Number of distinct vertices per frame.
    pub num_vertices: u32,
    /// `s, t` per vertex.
    pub uvs: Vec<f32>,
    /// Optional lightmap coordinates.
    pub light_uvs: Option<Vec<f32>>,
    /// Triangle indices for compressed frames.
    pub indices: Vec<u16>,
    /// Keyframes.
    pub frames: MeshFrames,
}

/// A loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Cache identity.
    pub key: ModelKey,
    /// Surfaces.
    pub meshes: Vec<Mesh>,
}

impl Model {
    /// Returns `true` if the model stores compressed frames.
    ///
    /// The first mesh decides for the whole model.
    pub fn uses_tiny_frames(&self) -> bool {
        self.meshes.first().is_some_and(|m| m.frames.is_tiny())
    }
}
