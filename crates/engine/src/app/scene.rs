use std::error::Error as StdError;

use thiserror::Error;

use super::input::{ActionStates, InputAction};
use super::rendering::Compositor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input for one simulation tick. Press flags are true on the first tick after
/// the key went down and are consumed by that tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    jump_pressed: bool,
    dash_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        jump_pressed: bool,
        dash_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            jump_pressed,
            dash_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn dash_pressed(&self) -> bool {
        self.dash_pressed
    }

    /// `-1`, `0` or `1` from the held left/right keys. Both held cancel out.
    pub fn horizontal_intent(&self) -> f32 {
        let right = self.is_down(InputAction::MoveRight) as i32;
        let left = self.is_down(InputAction::MoveLeft) as i32;
        (right - left) as f32
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_dash_pressed(mut self, dash_pressed: bool) -> Self {
        self.dash_pressed = dash_pressed;
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

#[derive(Debug, Error)]
#[error("scene '{scene}' failed to load: {source}")]
pub struct SceneLoadError {
    pub scene: String,
    #[source]
    pub source: Box<dyn StdError + Send + Sync + 'static>,
}

impl SceneLoadError {
    pub fn new(scene: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            scene: scene.into(),
            source: Box::new(source),
        }
    }
}

pub trait Scene {
    fn name(&self) -> &str;
    fn load(&mut self) -> Result<(), SceneLoadError>;
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, compositor: &mut Compositor);
    fn unload(&mut self) {}
}
