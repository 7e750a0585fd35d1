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

//! Provides the backend-agnostic contracts of the hardware renderer.
//!
//! The data types in [`api`] describe what the engine asks the renderer to draw
//! (polygon flags, texture descriptions, model frames, view transforms). The
//! [`GraphicsApi`] trait in [`traits`] is the thin seam to the actual graphics
//! driver; the state machines that sit between the two live in `hwr-backend`.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::traits::{ApiInfo, GraphicsApi};
