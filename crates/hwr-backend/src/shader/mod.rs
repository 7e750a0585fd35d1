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

//! Shader program slots, uniform names and the program registry.

mod registry;
pub mod sources;

pub use self::registry::ShaderRegistry;

use hwr_core::math::Mat4;
use hwr_core::renderer::{ProgramId, UniformLocation};

/// The fixed set of built-in programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderSlot {
    /// The base program, used whenever shaders are disabled.
    Default,
    /// Floors and ceilings.
    Floor,
    /// Walls.
    Wall,
    /// Sprites.
    Sprite,
    /// Models.
    Model,
    /// Water surfaces.
    Water,
    /// Fog blocks.
    Fog,
    /// The sky dome.
    Sky,
    /// Screen wipe through a fade mask.
    FadeMask,
    /// Additive or subtractive tinted screen wipe.
    FadeMaskTinted,
}

impl ShaderSlot {
    /// Every slot, in index order.
    pub const ALL: [ShaderSlot; 10] = [
        ShaderSlot::Default,
        ShaderSlot::Floor,
        ShaderSlot::Wall,
        ShaderSlot::Sprite,
        ShaderSlot::Model,
        ShaderSlot::Water,
        ShaderSlot::Fog,
        ShaderSlot::Sky,
        ShaderSlot::FadeMask,
        ShaderSlot::FadeMaskTinted,
    ];

    /// The slot's index. Custom shader number `n` overrides the slot with index `n`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The slot with the given index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// The semantic uniforms resolved in every program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    /// `model`
    Model,
    /// `view`
    View,
    /// `projection`
    Projection,
    /// `StartScreen` sampler.
    StartScreen,
    /// `EndScreen` sampler.
    EndScreen,
    /// `FadeMask` sampler.
    FadeMask,
    /// `PolyColor`
    PolyColor,
    /// `TintColor`
    TintColor,
    /// `FadeColor`
    FadeColor,
    /// `Lighting`
    Lighting,
    /// `FadeStart`
    FadeStart,
    /// `FadeEnd`
    FadeEnd,
    /// `IsFadingIn`
    IsFadingIn,
    /// `IsToWhite`
    IsToWhite,
    /// `LevelTime`
    LevelTime,
}

impl Uniform {
    /// Number of semantic uniforms.
    pub const COUNT: usize = 15;

    /// Every uniform, in table order.
    pub const ALL: [Uniform; Self::COUNT] = [
        Uniform::Model,
        Uniform::View,
        Uniform::Projection,
        Uniform::StartScreen,
        Uniform::EndScreen,
        Uniform::FadeMask,
        Uniform::PolyColor,
        Uniform::TintColor,
        Uniform::FadeColor,
        Uniform::Lighting,
        Uniform::FadeStart,
        Uniform::FadeEnd,
        Uniform::IsFadingIn,
        Uniform::IsToWhite,
        Uniform::LevelTime,
    ];

    /// The GLSL identifier.
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Model => "model",
            Uniform::View => "view",
            Uniform::Projection => "projection",
            Uniform::StartScreen => "StartScreen",
            Uniform::EndScreen => "EndScreen",
            Uniform::FadeMask => "FadeMask",
            Uniform::PolyColor => "PolyColor",
            Uniform::TintColor => "TintColor",
            Uniform::FadeColor => "FadeColor",
            Uniform::Lighting => "Lighting",
            Uniform::FadeStart => "FadeStart",
            Uniform::FadeEnd => "FadeEnd",
            Uniform::IsFadingIn => "IsFadingIn",
            Uniform::IsToWhite => "IsToWhite",
            Uniform::LevelTime => "LevelTime",
        }
    }
}

/// One linked program and what the registry knows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    /// The native program. `None` if building it failed; the slot is then inert.
    pub program: Option<ProgramId>,
    /// Built from injected source.
    pub custom: bool,
    /// Resolved locations, indexed by [`Uniform`].
    pub uniforms: [Option<UniformLocation>; Uniform::COUNT],
    /// Last projection uploaded to this program.
    pub projection: Mat4,
    /// Last view uploaded to this program.
    pub view: Mat4,
    /// Last model matrix uploaded to this program.
    pub model: Mat4,
}

impl ShaderProgram {
    /// A slot whose program failed to build.
    pub fn inert() -> Self {
        Self {
            program: None,
            custom: false,
            uniforms: [None; Uniform::COUNT],
            projection: Mat4::ZERO,
            view: Mat4::ZERO,
            model: Mat4::ZERO,
        }
    }

    /// The location of a uniform, if the program uses it.
    pub fn location(&self, uniform: Uniform) -> Option<UniformLocation> {
        self.uniforms[uniform as usize]
    }
}
