use crate::{Mat4, Vec3};

/// Model transform driven by keyboard input. Angles are in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in degrees, applied Y first, then X, then Z.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation_deg: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation_deg,
            scale,
        }
    }

    /// Rz * Rx * Ry.
    #[inline]
    pub fn rotation(&self) -> Mat4 {
        let r = self.rotation_deg;
        Mat4::from_rotation_z(r.z.to_radians())
            * Mat4::from_rotation_x(r.x.to_radians())
            * Mat4::from_rotation_y(r.y.to_radians())
    }

    /// Build matrix = T * S * R. Scale applies after rotation, so a
    /// non-uniform scale stretches along world axes, not model axes.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_scale(self.scale) * self.rotation()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn scale_is_applied_after_rotation() {
        let t = Transform::from_trs(Vec3::ZERO, vec3(0.0, 0.0, 90.0), vec3(2.0, 1.0, 1.0));
        let p = t.matrix().transform_point3(Vec3::X);
        // X rotates onto Y first, so the x-scale has nothing to stretch.
        assert!((p - Vec3::Y).length() < 1e-6, "{p:?}");
    }

    #[test]
    fn y_rotation_happens_before_x() {
        let t = Transform::from_trs(Vec3::ZERO, vec3(90.0, 90.0, 0.0), Vec3::ONE);
        // Ry: X -> -Z, then Rx: -Z -> +Y
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-6, "{p:?}");
    }
}
