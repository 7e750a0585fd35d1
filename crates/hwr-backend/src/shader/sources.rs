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

//! Built-in GLSL 330 sources.
//!
//! The software-emulation fragment programs reproduce the colormap lighting
//! of the software renderer: light level and distance pick a colormap row,
//! which is then used to fade towards `FadeColor`.

use super::ShaderSlot;

macro_rules! glsl_version {
    () => {
        "#version 330 core\n"
    };
}

macro_rules! glsl_base_io {
    () => {
        "out vec4 FragColor;\n\
         in vec2 TexCoord;\n\
         in vec3 Normal;\n\
         in vec4 Colors;\n"
    };
}

macro_rules! glsl_base_uniforms {
    () => {
        "uniform sampler2D TexSampler;\n\
         uniform vec4 PolyColor;\n"
    };
}

macro_rules! glsl_doom_uniforms {
    () => {
        concat!(
            glsl_base_uniforms!(),
            "uniform vec4 TintColor;\n\
             uniform vec4 FadeColor;\n\
             uniform float Lighting;\n\
             uniform float FadeStart;\n\
             uniform float FadeEnd;\n"
        )
    };
}

macro_rules! glsl_doom_lighting {
    () => {
        "float R_DoomColormap(float light, float z)\n\
         {\n\
             float lightnum = clamp(light / 17.0, 0.0, 15.0);\n\
             float lightz = clamp(z / 16.0, 0.0, 127.0);\n\
             float startmap = (15.0 - lightnum) * 4.0;\n\
             float scale = 160.0 / (lightz + 1.0);\n\
             return startmap - scale * 0.5;\n\
         }\n\
         float R_DoomLightingEquation(float light)\n\
         {\n\
             float z = gl_FragCoord.z / gl_FragCoord.w;\n\
             float colormap = floor(R_DoomColormap(light, z)) + 0.5;\n\
             return clamp(colormap, 0.0, 31.0) / 32.0;\n\
         }\n"
    };
}

macro_rules! glsl_tint_and_fade {
    () => {
        "if (TintColor.a > 0.0) {\n\
             float color_bright = sqrt((BaseColor.r * BaseColor.r) + (BaseColor.g * BaseColor.g) + (BaseColor.b * BaseColor.b));\n\
             float strength = sqrt(9.0 * TintColor.a);\n\
             FinalColor.r = clamp((color_bright * (TintColor.r * strength)) + (BaseColor.r * (1.0 - strength)), 0.0, 1.0);\n\
             FinalColor.g = clamp((color_bright * (TintColor.g * strength)) + (BaseColor.g * (1.0 - strength)), 0.0, 1.0);\n\
             FinalColor.b = clamp((color_bright * (TintColor.b * strength)) + (BaseColor.b * (1.0 - strength)), 0.0, 1.0);\n\
         }\n\
         float darkness = R_DoomLightingEquation(Lighting);\n\
         if (FadeStart != 0.0 || FadeEnd != 31.0) {\n\
             float fs = FadeStart / 31.0;\n\
             float fe = FadeEnd / 31.0;\n\
             float fd = fe - fs;\n\
             darkness = clamp((darkness - fs) * (1.0 / fd), 0.0, 1.0);\n\
         }\n\
         FinalColor = mix(FinalColor, FadeColor, darkness);\n"
    };
}

/// Vertex shader shared by every world program.
pub const DEFAULT_VERTEX: &str = concat!(
    glsl_version!(),
    "layout (location = 0) in vec3 aPos;\n\
     layout (location = 1) in vec2 aTexCoord;\n\
     layout (location = 2) in vec3 aNormal;\n\
     layout (location = 3) in vec4 aColors;\n\
     out vec2 TexCoord;\n\
     out vec3 Normal;\n\
     out vec4 Colors;\n\
     uniform mat4 model;\n\
     uniform mat4 view;\n\
     uniform mat4 projection;\n\
     void main()\n\
     {\n\
         gl_Position = projection * view * model * vec4(aPos, 1.0f);\n\
         TexCoord = vec2(aTexCoord.x, aTexCoord.y);\n\
         Normal = aNormal;\n\
         Colors = aColors;\n\
     }\n"
);

/// Vertex shader of the wipe programs. Positions are already in clip space.
pub const FADEMASK_VERTEX: &str = concat!(
    glsl_version!(),
    "layout (location = 0) in vec3 aPos;\n\
     layout (location = 1) in vec2 aTexCoord;\n\
     layout (location = 2) in vec2 aFadeMaskTexCoord;\n\
     out vec2 TexCoord;\n\
     out vec2 FadeMaskTexCoord;\n\
     uniform mat4 projection;\n\
     void main()\n\
     {\n\
         gl_Position = projection * vec4(aPos, 1.0f);\n\
         TexCoord = vec2(aTexCoord.x, aTexCoord.y);\n\
         FadeMaskTexCoord = vec2(aFadeMaskTexCoord.x, aFadeMaskTexCoord.y);\n\
     }\n"
);

/// Texture times poly color.
pub const DEFAULT_FRAGMENT: &str = concat!(
    glsl_version!(),
    glsl_base_io!(),
    glsl_base_uniforms!(),
    "void main(void) {\n\
         FragColor = texture(TexSampler, TexCoord) * PolyColor;\n\
     }\n"
);

/// Colormap lighting for floors, walls, sprites and models.
pub const SOFTWARE_FRAGMENT: &str = concat!(
    glsl_version!(),
    glsl_base_io!(),
    glsl_doom_uniforms!(),
    glsl_doom_lighting!(),
    "void main(void) {\n\
         vec4 texel = texture(TexSampler, TexCoord);\n\
         vec4 BaseColor = texel * PolyColor;\n\
         vec4 FinalColor = BaseColor;\n",
    glsl_tint_and_fade!(),
    "    FinalColor.a = texel.a * PolyColor.a;\n\
         FragColor = FinalColor;\n\
     }\n"
);

/// Colormap lighting with a time-based coordinate ripple.
pub const WATER_FRAGMENT: &str = concat!(
    glsl_version!(),
    "out vec4 FragColor;\n\
     in vec2 TexCoord;\n",
    glsl_doom_uniforms!(),
    "uniform float LevelTime;\n\
     const float freq = 0.025;\n\
     const float amp = 0.025;\n\
     const float speed = 2.0;\n\
     const float pi = 3.14159;\n",
    glsl_doom_lighting!(),
    "void main(void) {\n\
         float z = (gl_FragCoord.z / gl_FragCoord.w) / 2.0;\n\
         float a = -pi * (z * freq) + (LevelTime * speed);\n\
         float sdistort = sin(a) * amp;\n\
         float cdistort = cos(a) * amp;\n\
         vec4 texel = texture(TexSampler, vec2(TexCoord.s - sdistort, TexCoord.t - cdistort));\n\
         vec4 BaseColor = texel * PolyColor;\n\
         vec4 FinalColor = BaseColor;\n",
    glsl_tint_and_fade!(),
    "    FinalColor.a = texel.a * PolyColor.a;\n\
         FragColor = FinalColor;\n\
     }\n"
);

/// Untextured colormap lighting for fog blocks.
pub const FOG_FRAGMENT: &str = concat!(
    glsl_version!(),
    "out vec4 FragColor;\n\
     in vec2 TexCoord;\n",
    glsl_doom_uniforms!(),
    glsl_doom_lighting!(),
    "void main(void) {\n\
         vec4 BaseColor = PolyColor;\n\
         vec4 FinalColor = BaseColor;\n",
    glsl_tint_and_fade!(),
    "    FragColor = FinalColor;\n\
     }\n"
);

/// Mixes the start and end screens through the fade mask.
pub const FADEMASK_FRAGMENT: &str = concat!(
    glsl_version!(),
    "out vec4 FragColor;\n\
     in vec2 TexCoord;\n\
     in vec2 FadeMaskTexCoord;\n\
     uniform sampler2D StartScreen;\n\
     uniform sampler2D EndScreen;\n\
     uniform sampler2D FadeMask;\n\
     void main(void) {\n\
         vec4 StartTexel = texture(StartScreen, TexCoord);\n\
         vec4 EndTexel = texture(EndScreen, TexCoord);\n\
         vec4 MaskTexel = texture(FadeMask, FadeMaskTexCoord);\n\
         FragColor = mix(StartTexel, EndTexel, MaskTexel.r);\n\
     }\n"
);

/// Fades one screen to white or black through the fade mask.
pub const FADEMASK_TINTED_FRAGMENT: &str = concat!(
    glsl_version!(),
    "out vec4 FragColor;\n\
     in vec2 TexCoord;\n\
     in vec2 FadeMaskTexCoord;\n\
     uniform sampler2D StartScreen;\n\
     uniform sampler2D EndScreen;\n\
     uniform sampler2D FadeMask;\n\
     uniform bool IsFadingIn;\n\
     uniform bool IsToWhite;\n\
     void main(void) {\n\
         vec4 MaskTexel = texture(FadeMask, FadeMaskTexCoord);\n\
         vec4 MixTexel;\n\
         vec4 FinalColor;\n\
         float FadeAlpha = MaskTexel.r;\n\
         if (IsFadingIn == true)\n\
         {\n\
             FadeAlpha = (1.0f - FadeAlpha);\n\
             MixTexel = texture(EndScreen, TexCoord);\n\
         }\n\
         else\n\
             MixTexel = texture(StartScreen, TexCoord);\n\
         float FadeRed = clamp((FadeAlpha * 3.0f), 0.0f, 1.0f);\n\
         float FadeGreen = clamp((FadeAlpha * 2.0f), 0.0f, 1.0f);\n\
         if (IsToWhite == true)\n\
         {\n\
             FinalColor.r = MixTexel.r + FadeRed;\n\
             FinalColor.g = MixTexel.g + FadeGreen;\n\
             FinalColor.b = MixTexel.b + FadeAlpha;\n\
         }\n\
         else\n\
         {\n\
             FinalColor.r = MixTexel.r - FadeRed;\n\
             FinalColor.g = MixTexel.g - FadeGreen;\n\
             FinalColor.b = MixTexel.b - FadeAlpha;\n\
         }\n\
         FinalColor.a = 1.0f;\n\
         FragColor = FinalColor;\n\
     }\n"
);

/// The built-in `(vertex, fragment)` pair of a slot.
pub fn builtin(slot: ShaderSlot) -> (&'static str, &'static str) {
    match slot {
        ShaderSlot::Default | ShaderSlot::Sky => (DEFAULT_VERTEX, DEFAULT_FRAGMENT),
        ShaderSlot::Floor | ShaderSlot::Wall | ShaderSlot::Sprite | ShaderSlot::Model => {
            (DEFAULT_VERTEX, SOFTWARE_FRAGMENT)
        }
        ShaderSlot::Water => (DEFAULT_VERTEX, WATER_FRAGMENT),
        ShaderSlot::Fog => (DEFAULT_VERTEX, FOG_FRAGMENT),
        ShaderSlot::FadeMask => (FADEMASK_VERTEX, FADEMASK_FRAGMENT),
        ShaderSlot::FadeMaskTinted => (FADEMASK_VERTEX, FADEMASK_TINTED_FRAGMENT),
    }
}
