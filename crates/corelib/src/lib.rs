//! Core types: math re-exports, Transform, Camera, per-frame scene state
//! and the input/handler seam between the event loop and the scene.

pub use glam::{Mat4, Vec3, vec3};

pub mod camera;
pub mod handler;
pub mod input;
pub mod scene;
pub mod transform;

pub use handler::{SceneController, SceneHandler};
pub use input::{Key, LoopControl};
pub use scene::{Animation, FrameParams, SceneState, Shading, TransformMode, ViewMode};
