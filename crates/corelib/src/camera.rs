use crate::{Mat4, Vec3};

/// Perspective camera on the +Z axis looking at the origin (right-handed).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Distance from the origin along +Z.
    pub distance: f32,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    pub const DEFAULT_DISTANCE: f32 = 5.0;

    /// 45° vertical FOV, depth range 0.1..100, aspect from the viewport.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: Self::DEFAULT_DISTANCE,
            fov_y_rad: 45f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
            aspect: aspect_of(width, height),
        }
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    /// Depth maps to [0, 1] as wgpu expects.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.aspect = aspect_of(width, height);
        self
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_is_a_pure_translation_along_z() {
        let cam = Camera::new(800, 600);
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        assert!(cam.view().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn zero_height_viewport_is_clamped() {
        let cam = Camera::new(800, 0);
        assert_eq!(cam.aspect, 800.0);
        assert!(cam.proj().to_cols_array().iter().all(|f| f.is_finite()));
    }
}
