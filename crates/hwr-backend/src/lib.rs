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

//! # HWR Backend
//!
//! The render-state and resource-management core of the hardware renderer:
//! the blend state machine, the texture cache, the shader program registry,
//! the transform matrices, the sky dome and model vertex buffers, and the
//! [`RenderContext`] the scene renderer drives them through.

#![warn(missing_docs)]

pub mod blend;
pub mod config;
pub mod context;
pub mod model;
pub mod screen;
pub mod shader;
pub mod sky;
pub mod texture_cache;
pub mod transform;

pub use blend::BlendStateMachine;
pub use config::{FilterSettings, RendererConfig, TextureFilterPreset};
pub use context::{RenderContext, SpecialState};
pub use model::{FramePackError, LerpBuffers, ModelBufferCache};
pub use screen::{ScreenTexture, WarpGrid, SCREEN_VERTS};
pub use shader::{ShaderRegistry, ShaderSlot, Uniform};
pub use sky::SkyDome;
pub use texture_cache::TextureCache;
pub use transform::TransformState;
