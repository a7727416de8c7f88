use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::scene::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Dash,
    Quit,
}

impl InputAction {
    const COUNT: usize = 5;

    const fn slot(self) -> usize {
        self as usize
    }

    /// Default binding: A/Left, D/Right, Space, E, Escape.
    fn bound_to(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
            KeyCode::Space => Some(InputAction::Jump),
            KeyCode::KeyE => Some(InputAction::Dash),
            KeyCode::Escape => Some(InputAction::Quit),
            _ => None,
        }
    }
}

/// Held state per action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    held: [bool; InputAction::COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.held[action.slot()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.held[action.slot()]
    }
}

/// Latches the first press of a key until one tick consumes it. Key repeat
/// while held does not re-arm the latch.
#[derive(Debug, Clone, Copy, Default)]
struct PressLatch {
    held: bool,
    armed: bool,
}

impl PressLatch {
    fn update(&mut self, pressed: bool) {
        if pressed && !self.held {
            self.armed = true;
        }
        self.held = pressed;
    }

    fn consume(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}

/// Turns window keyboard events into one `InputSnapshot` per tick.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    states: ActionStates,
    jump: PressLatch,
    dash: PressLatch,
    quit_requested: bool,
}

impl InputCollector {
    pub(crate) fn handle_key_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.handle_key(code, event.state);
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, state: ElementState) {
        let Some(action) = InputAction::bound_to(code) else {
            return;
        };
        let pressed = state == ElementState::Pressed;
        self.states.set(action, pressed);
        match action {
            InputAction::Jump => self.jump.update(pressed),
            InputAction::Dash => self.dash.update(pressed),
            InputAction::Quit => self.quit_requested |= pressed,
            InputAction::MoveLeft | InputAction::MoveRight => {}
        }
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Consumes pending presses.
    pub(crate) fn next_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.states,
            self.jump.consume(),
            self.dash.consume(),
        )
    }
}
