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

//! The camera and object placement handed to the transform setters.

/// Engine-side placement of the camera, or of a model when passed to a model draw.
///
/// Angles are in degrees. Engine coordinates are Z-up; the backend swaps Y and Z
/// when building matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// World Z (up).
    pub z: f32,
    /// Pitch.
    pub angle_x: f32,
    /// Yaw.
    pub angle_y: f32,
    /// Horizontal field of view used by the projection.
    pub fov_x: f32,
    /// X scale of the view.
    pub scale_x: f32,
    /// Y scale of the view.
    pub scale_y: f32,
    /// Z scale of the view.
    pub scale_z: f32,
    /// Applies `roll_angle`.
    pub roll: bool,
    /// Roll in degrees.
    pub roll_angle: f32,
    /// Model roll axis: `1` is Y, `2` is Z, anything else is X.
    pub rot_axis: u8,
    /// Sign applied to the model roll axis.
    pub roll_flip: f32,
    /// Model roll pivot X.
    pub center_x: f32,
    /// Model roll pivot Y.
    pub center_y: f32,
    /// The screen is flipped vertically.
    pub flip: bool,
    /// The view is one half of a horizontal split screen.
    pub splitscreen: bool,
    /// Emulate software y-shearing instead of pitching the camera.
    pub shearing: bool,
    /// Vertical aim used for shearing.
    pub view_aiming: f32,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            angle_x: 0.0,
            angle_y: 0.0,
            fov_x: 90.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
            roll: false,
            roll_angle: 0.0,
            rot_axis: 0,
            roll_flip: 1.0,
            center_x: 0.0,
            center_y: 0.0,
            flip: false,
            splitscreen: false,
            shearing: false,
            view_aiming: 0.0,
        }
    }
}
