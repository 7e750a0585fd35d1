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

//! Projection, view and model matrices shared by every program.

use hwr_core::math::{degrees_to_radians, Mat4, Vec3, PI};
use hwr_core::renderer::SceneTransform;

/// Height of the engine's base resolution, used to scale y-shearing.
const BASE_VIDEO_HEIGHT: f32 = 200.0;

/// Clip planes used when building a perspective projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlanes {
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
}

/// The three transform matrices the programs read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    /// Projection.
    pub projection: Mat4,
    /// Camera.
    pub view: Mat4,
    /// Object placement.
    pub model: Mat4,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
        }
    }
}

impl TransformState {
    /// Resets all three matrices to identity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuilds view and projection for a camera and resets the model matrix.
    ///
    /// Without a camera, all three matrices end up as identity.
    pub fn set_scene(&mut self, scene: Option<&SceneTransform>, clip: ClipPlanes) {
        self.reset();
        let Some(t) = scene else {
            return;
        };

        // Engine space is Z-up; depth points away from the camera.
        let scale = if t.flip {
            Vec3::new(t.scale_x, -t.scale_y, -t.scale_z)
        } else {
            Vec3::new(t.scale_x, t.scale_y, -t.scale_z)
        };
        self.view.scale(scale);
        if t.roll {
            self.view.rotate_z(degrees_to_radians(t.roll_angle));
        }
        self.view
            .rotate_x(degrees_to_radians(t.angle_x))
            .rotate_y(degrees_to_radians(t.angle_y + 270.0))
            .translate(Vec3::new(-t.x, -t.z, -t.y));

        if t.shearing {
            let mut fdy = t.view_aiming * 2.0;
            if t.flip {
                fdy = -fdy;
            }
            self.projection
                .translate(Vec3::new(0.0, -fdy / BASE_VIDEO_HEIGHT, 0.0));
        }

        let (fov, aspect) = if t.splitscreen {
            (splitscreen_fov(t.fov_x), 2.0)
        } else {
            (t.fov_x, 1.0)
        };
        self.projection = self.projection
            * Mat4::perspective_rh_gl(degrees_to_radians(fov), aspect, clip.near, clip.far);
    }
}

/// Narrows a field of view for a half-height viewport.
pub fn splitscreen_fov(fov: f32) -> f32 {
    (((fov * PI / 360.0).tan()) * 0.8).atan() * 360.0 / PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CLIP: ClipPlanes = ClipPlanes {
        near: 0.9,
        far: 32768.0,
    };

    #[test]
    fn no_camera_means_identity() {
        let mut state = TransformState {
            projection: Mat4::ZERO,
            view: Mat4::ZERO,
            model: Mat4::ZERO,
        };
        state.set_scene(None, CLIP);
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn camera_position_maps_to_origin() {
        let mut state = TransformState::default();
        let cam = SceneTransform {
            x: 100.0,
            y: -50.0,
            z: 25.0,
            angle_y: 33.0,
            angle_x: 12.0,
            ..SceneTransform::default()
        };
        state.set_scene(Some(&cam), CLIP);
        // Engine (x, y, z) lives at GL (x, z, y).
        let eye = state.view.transform_point3(Vec3::new(100.0, 25.0, -50.0));
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(eye.y, 0.0, epsilon = 1e-3);
        assert_relative_eq!(eye.z, 0.0, epsilon = 1e-3);
        assert_eq!(state.model, Mat4::IDENTITY);
    }

    #[test]
    fn splitscreen_narrows_the_fov() {
        assert!(splitscreen_fov(90.0) < 90.0);
        assert_relative_eq!(splitscreen_fov(90.0), 77.3196, epsilon = 1e-3);

        let mut full = TransformState::default();
        let mut split = TransformState::default();
        let cam = SceneTransform::default();
        full.set_scene(Some(&cam), CLIP);
        split.set_scene(
            Some(&SceneTransform {
                splitscreen: true,
                ..cam
            }),
            CLIP,
        );
        assert_relative_eq!(full.projection.cols[0][0], 1.0, epsilon = 1e-5);
        assert!(split.projection.cols[1][1] > full.projection.cols[1][1]);
    }

    #[test]
    fn shearing_offsets_projection_y() {
        let mut state = TransformState::default();
        let cam = SceneTransform {
            shearing: true,
            view_aiming: 50.0,
            ..SceneTransform::default()
        };
        state.set_scene(Some(&cam), CLIP);
        let mut plain = TransformState::default();
        plain.set_scene(Some(&SceneTransform::default()), CLIP);
        // The shear translation is post-multiplied by the perspective, so it
        // shows up in the third column scaled by -w.
        assert_relative_eq!(
            state.projection.cols[2][1] - plain.projection.cols[2][1],
            0.5,
            epsilon = 1e-5
        );
    }
}
