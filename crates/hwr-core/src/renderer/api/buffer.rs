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

//! Vertex buffers, attribute layouts and index data.

/// An opaque handle to a vertex buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// A generic vertex attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    /// `aPos`
    Position,
    /// `aTexCoord`
    TexCoord,
    /// `aNormal`
    Normal,
    /// `aColors`
    Colors,
    /// The fade-mask coordinate of the wipe programs. Shares the normal's location.
    TexCoord1,
}

impl VertexAttribute {
    /// The `layout (location = N)` index bound in the built-in shaders.
    pub fn location(self) -> u32 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::TexCoord => 1,
            VertexAttribute::Normal | VertexAttribute::TexCoord1 => 2,
            VertexAttribute::Colors => 3,
        }
    }
}

/// The scalar type of each attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// 32-bit float.
    F32,
    /// Signed 16-bit integer, not normalized.
    I16,
    /// Signed 8-bit integer, not normalized.
    I8,
    /// Unsigned 8-bit integer, normalized.
    U8Norm,
}

impl VertexFormat {
    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            VertexFormat::F32 => 4,
            VertexFormat::I16 => 2,
            VertexFormat::I8 | VertexFormat::U8Norm => 1,
        }
    }
}

/// Where attribute data is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexSource<'a> {
    /// A byte offset into the currently bound vertex buffer.
    Buffer {
        /// Offset of the first component.
        offset: usize,
    },
    /// Client memory read at draw time.
    Client(&'a [u8]),
}

/// Describes how one attribute is laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout<'a> {
    /// Components per vertex, 1 to 4.
    pub components: u8,
    /// Scalar type.
    pub format: VertexFormat,
    /// Byte distance between vertices. `0` means tightly packed.
    pub stride: u32,
    /// Data location.
    pub source: VertexSource<'a>,
}

impl<'a> VertexLayout<'a> {
    /// An attribute read from the bound buffer.
    pub const fn buffer(components: u8, format: VertexFormat, stride: u32, offset: usize) -> Self {
        Self {
            components,
            format,
            stride,
            source: VertexSource::Buffer { offset },
        }
    }

    /// A tightly packed attribute read from client memory.
    pub const fn client(components: u8, format: VertexFormat, data: &'a [u8]) -> Self {
        Self {
            components,
            format,
            stride: 0,
            source: VertexSource::Client(data),
        }
    }
}

/// Index data for an indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexData<'a> {
    /// 16-bit indices.
    U16(&'a [u16]),
    /// 32-bit indices.
    U32(&'a [u32]),
}

impl IndexData<'_> {
    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(i) => i.len(),
            IndexData::U32(i) => i.len(),
        }
    }

    /// Returns `true` if there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_mask_coordinate_shares_the_normal_slot() {
        assert_eq!(
            VertexAttribute::TexCoord1.location(),
            VertexAttribute::Normal.location()
        );
        assert_eq!(VertexAttribute::Colors.location(), 3);
    }

    #[test]
    fn client_layout_is_tightly_packed() {
        let data = [0u8; 12];
        let layout = VertexLayout::client(3, VertexFormat::F32, &data);
        assert_eq!(layout.stride, 0);
        assert!(matches!(layout.source, VertexSource::Client(d) if d.len() == 12));
        assert_eq!(IndexData::U16(&[0, 1, 2]).len(), 3);
    }
}
