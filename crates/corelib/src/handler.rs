//! The interface an event-loop driver calls into, and the stock
//! implementation backed by [`SceneState`].

use crate::{
    input::{Key, LoopControl},
    scene::{Animation, FrameParams, SceneState},
};

/// Callbacks a window driver invokes. Implementations own all scene state,
/// so they can be exercised without a window.
pub trait SceneHandler {
    fn on_key(&mut self, key: Key) -> LoopControl;
    fn on_reshape(&mut self, width: u32, height: u32);
    fn on_tick(&mut self);
    /// Everything needed to draw the current frame.
    fn frame(&self) -> FrameParams;
}

pub struct SceneController {
    state: SceneState,
    animation: Animation,
}

impl SceneController {
    pub fn new(state: SceneState, animation: Animation) -> Self {
        Self { state, animation }
    }

    #[inline]
    pub fn state(&self) -> &SceneState {
        &self.state
    }
}

impl SceneHandler for SceneController {
    fn on_key(&mut self, key: Key) -> LoopControl {
        let outcome = self.state.apply_input(key);
        if outcome.state != self.state {
            self.state = outcome.state;
            log::debug!(
                "key {:?}: mode={:?} view={:?} shading={:?} transform={:?}",
                key,
                self.state.mode,
                self.state.view,
                self.state.shading,
                self.state.transform
            );
        }
        outcome.control
    }

    fn on_reshape(&mut self, width: u32, height: u32) {
        self.state = self.state.reshape(width, height);
    }

    fn on_tick(&mut self) {
        self.state = self.state.tick(self.animation);
    }

    fn frame(&self) -> FrameParams {
        self.state.frame()
    }
}
