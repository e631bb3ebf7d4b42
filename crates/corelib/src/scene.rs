//! Per-frame scene state and the pure functions that advance it.
//!
//! A [`SceneState`] is never mutated in place: input, idle ticks and
//! viewport changes each produce the next state.

use crate::{
    Mat4, Vec3,
    camera::Camera,
    input::{Key, LoopControl},
    transform::Transform,
};

pub const TRANSLATION_STEP: f32 = 0.1;
pub const ROTATION_STEP_DEG: f32 = 1.0;
pub const SCALE_STEP: f32 = 0.1;
/// Smallest scale per axis; keeps the model matrix invertible.
pub const MIN_SCALE: f32 = 0.1;

/// Degrees added per idle tick by [`Animation::Spin`].
pub const SPIN_STEP_DEG: Vec3 = Vec3::new(0.02, -0.04, 0.06);
/// Camera distance change per idle tick by [`Animation::Spin`].
pub const ZOOM_STEP: f32 = 0.001;
pub const ZOOM_NEAR: f32 = 3.0;
pub const ZOOM_FAR: f32 = 5.0;

pub const OBJECT_COLOR: Vec3 = Vec3::new(0.5, 0.1, 0.1);
pub const LIGHT_COLOR: Vec3 = Vec3::ONE;
pub const LIGHT_POSITION: Vec3 = Vec3::new(1.0, 0.0, 2.0);

/// Which component the arrow/`a`/`d` keys adjust.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformMode {
    Rotate,
    Translate,
    Scale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Faces,
    Wireframe,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Faces => Self::Wireframe,
            Self::Wireframe => Self::Faces,
        }
    }
}

/// Fragment coloring for lit meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shading {
    /// Flat object color.
    #[default]
    Color,
    /// Phong-lit object color.
    Lit,
    /// Phong-lit texture sample.
    Textured,
}

impl Shading {
    /// Value handed to shaders.
    pub fn index(self) -> u32 {
        match self {
            Self::Color => 0,
            Self::Lit => 1,
            Self::Textured => 2,
        }
    }
}

/// Idle behaviour between inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Animation {
    #[default]
    None,
    /// Slow tumble on all axes while the camera drifts in and out.
    Spin,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneState {
    pub transform: Transform,
    pub mode: Option<TransformMode>,
    pub view: ViewMode,
    pub shading: Shading,
    pub camera: Camera,
    /// Signed camera distance change applied per spin tick.
    pub zoom_step: f32,
    pub viewport: (u32, u32),
}

/// Result of feeding one key into [`SceneState::apply_input`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputOutcome {
    pub state: SceneState,
    pub control: LoopControl,
}

/// Matrices and lighting inputs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// Inverse-transpose of `model`, for transforming normals.
    pub normal_matrix: Mat4,
    pub object_color: Vec3,
    pub light_color: Vec3,
    pub light_position: Vec3,
    pub camera_position: Vec3,
    pub shading: Shading,
    pub view_mode: ViewMode,
}

impl SceneState {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            transform: Transform::identity(),
            mode: None,
            view: ViewMode::Faces,
            shading: Shading::Color,
            camera: Camera::new(width, height),
            zoom_step: -ZOOM_STEP,
            viewport: (width, height),
        }
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    /// Next state after a key press.
    pub fn apply_input(&self, key: Key) -> InputOutcome {
        let mut next = *self;

        match key {
            Key::Escape | Key::Char('q') => {
                return InputOutcome {
                    state: next,
                    control: LoopControl::Exit,
                };
            }
            Key::Char('r') => next.mode = Some(TransformMode::Rotate),
            Key::Char('t') => next.mode = Some(TransformMode::Translate),
            Key::Char('e') => next.mode = Some(TransformMode::Scale),
            Key::Char('v') => next.view = next.view.toggled(),
            Key::Char('w') => next.transform = Transform::identity(),
            Key::Char('0') => next.shading = Shading::Color,
            Key::Char('1') => next.shading = Shading::Lit,
            Key::Char('2') => next.shading = Shading::Textured,
            other => {
                if let (Some(mode), Some(delta)) = (next.mode, axis_delta(other)) {
                    let t = &mut next.transform;
                    match mode {
                        TransformMode::Translate => t.translation += delta * TRANSLATION_STEP,
                        TransformMode::Scale => {
                            t.scale = (t.scale + delta * SCALE_STEP).max(Vec3::splat(MIN_SCALE));
                        }
                        // Up/Down tilt around X, Left/Right turn around Y.
                        TransformMode::Rotate => {
                            let turn = Vec3::new(delta.y, delta.x, delta.z);
                            t.rotation_deg += turn * ROTATION_STEP_DEG;
                        }
                    }
                }
            }
        }

        InputOutcome {
            state: next,
            control: LoopControl::Continue,
        }
    }

    /// Next state after one idle tick.
    pub fn tick(&self, animation: Animation) -> Self {
        let mut next = *self;
        match animation {
            Animation::None => {}
            Animation::Spin => {
                let r = next.transform.rotation_deg + SPIN_STEP_DEG;
                next.transform.rotation_deg =
                    Vec3::new(wrap_deg(r.x), wrap_deg(r.y), wrap_deg(r.z));

                next.camera.distance += next.zoom_step;
                if next.camera.distance < ZOOM_NEAR || next.camera.distance > ZOOM_FAR {
                    next.zoom_step = -next.zoom_step;
                }
            }
        }
        next
    }

    /// Next state after the window is resized. Sizes are clamped to 1.
    pub fn reshape(&self, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            camera: self.camera.with_viewport(width, height),
            viewport: (width, height),
            ..*self
        }
    }

    pub fn frame(&self) -> FrameParams {
        let model = self.transform.matrix();
        FrameParams {
            model,
            view: self.camera.view(),
            projection: self.camera.proj(),
            normal_matrix: model.inverse().transpose(),
            object_color: OBJECT_COLOR,
            light_color: LIGHT_COLOR,
            light_position: LIGHT_POSITION,
            camera_position: self.camera.eye(),
            shading: self.shading,
            view_mode: self.view,
        }
    }
}

/// Unit step on the axis a key controls: arrows on X/Y, `a`/`d` on Z.
fn axis_delta(key: Key) -> Option<Vec3> {
    match key {
        Key::Up => Some(Vec3::Y),
        Key::Down => Some(Vec3::NEG_Y),
        Key::Right => Some(Vec3::X),
        Key::Left => Some(Vec3::NEG_X),
        Key::Char('a') => Some(Vec3::Z),
        Key::Char('d') => Some(Vec3::NEG_Z),
        _ => None,
    }
}

fn wrap_deg(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: SceneState, keys: &[Key]) -> SceneState {
        keys.iter().fold(state, |s, &k| s.apply_input(k).state)
    }

    #[test]
    fn arrows_do_nothing_until_a_mode_is_chosen() {
        let s = SceneState::new(800, 600);
        let after = press(s, &[Key::Up, Key::Left, Key::Char('a')]);
        assert_eq!(after, s);
    }

    #[test]
    fn translate_mode_moves_along_key_axes() {
        let s = press(
            SceneState::new(800, 600),
            &[Key::Char('t'), Key::Up, Key::Up, Key::Left, Key::Char('d')],
        );
        let t = s.transform.translation;
        assert!((t - Vec3::new(-0.1, 0.2, -0.1)).length() < 1e-6, "{t:?}");
    }

    #[test]
    fn rotate_mode_maps_arrows_to_x_and_y_angles() {
        let s = press(
            SceneState::new(800, 600),
            &[Key::Char('r'), Key::Up, Key::Right, Key::Right, Key::Char('a')],
        );
        assert_eq!(s.transform.rotation_deg, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn scale_mode_steps_by_a_tenth() {
        let s = press(SceneState::new(800, 600), &[Key::Char('e'), Key::Down]);
        assert!((s.transform.scale.y - 0.9).abs() < 1e-6);
        assert_eq!(s.transform.scale.x, 1.0);
    }

    #[test]
    fn scale_never_collapses_to_zero() {
        let s = press(SceneState::new(800, 600), &[Key::Char('e')]);
        let s = press(s, &[Key::Down; 15]);
        assert_eq!(s.transform.scale.y, MIN_SCALE);
        let n = s.frame().normal_matrix.to_cols_array();
        assert!(n.iter().all(|f| f.is_finite() && f.abs() < 100.0), "{n:?}");

        let s = press(s, &[Key::Up]);
        assert!((s.transform.scale.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn w_resets_the_transform_but_keeps_the_mode() {
        let s = press(
            SceneState::new(800, 600),
            &[Key::Char('t'), Key::Right, Key::Char('w')],
        );
        assert_eq!(s.transform, Transform::identity());
        assert_eq!(s.mode, Some(TransformMode::Translate));
    }

    #[test]
    fn v_toggles_and_digits_pick_shading() {
        let s = press(SceneState::new(800, 600), &[Key::Char('v'), Key::Char('2')]);
        assert_eq!(s.view, ViewMode::Wireframe);
        assert_eq!(s.shading, Shading::Textured);
        let s = press(s, &[Key::Char('v'), Key::Char('1')]);
        assert_eq!(s.view, ViewMode::Faces);
        assert_eq!(s.shading, Shading::Lit);
    }

    #[test]
    fn apply_input_leaves_the_original_untouched() {
        let s = SceneState::new(800, 600);
        let copy = s;
        let _ = s.apply_input(Key::Char('r'));
        assert_eq!(s, copy);
    }

    #[test]
    fn spin_bounces_camera_between_limits() {
        let mut s = SceneState::new(800, 600);
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..5000 {
            s = s.tick(Animation::Spin);
            min = min.min(s.camera.distance);
            max = max.max(s.camera.distance);
        }
        assert!(min < ZOOM_NEAR + 0.01 && min > ZOOM_NEAR - 0.01, "{min}");
        assert!(max <= ZOOM_FAR + 0.01, "{max}");
    }

    #[test]
    fn spin_angles_wrap_at_360() {
        let mut s = SceneState::new(800, 600);
        s.transform.rotation_deg = Vec3::new(359.99, 0.01, 359.99);
        let s = s.tick(Animation::Spin);
        let r = s.transform.rotation_deg;
        assert!(r.x >= 0.0 && r.x < 1.0, "{r:?}");
        assert!(r.y > 359.0 && r.y < 360.0, "{r:?}");
        assert!(r.z >= 0.0 && r.z < 1.0, "{r:?}");
    }

    #[test]
    fn frame_carries_normal_matrix_and_eye() {
        let s = press(SceneState::new(800, 600), &[Key::Char('e'), Key::Right]);
        let f = s.frame();
        let n = f.normal_matrix.transform_vector3(Vec3::X);
        // scale x 1.1 -> normals along x shrink by 1/1.1
        assert!((n.x - 1.0 / 1.1).abs() < 1e-5, "{n:?}");
        assert_eq!(f.camera_position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(f.shading, Shading::Color);
    }

    #[test]
    fn reshape_clamps_zero_sizes() {
        let s = SceneState::new(800, 600).reshape(0, 0);
        assert_eq!(s.viewport, (1, 1));
        assert_eq!(s.camera.aspect, 1.0);
    }
}
