//! Raw input events and held-action tracking

use crate::Side;
use crate::bindings::{Action, KeyBindings, Slot};

/// Code that starts a rally or toggles pause
pub const START_PAUSE_CODE: &str = "Space";

/// Discrete event raised by the host's input provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(String),
    Released(String),
}

impl InputEvent {
    pub fn pressed(code: impl Into<String>) -> Self {
        InputEvent::Pressed(code.into())
    }

    pub fn released(code: impl Into<String>) -> Self {
        InputEvent::Released(code.into())
    }

    pub fn code(&self) -> &str {
        match self {
            InputEvent::Pressed(code) | InputEvent::Released(code) => code,
        }
    }
}

/// Logical input after binding resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Start or pause/resume
    StartPause,
    Press(Slot),
    Release(Slot),
}

/// Resolve a raw event to zero or more intents
pub fn resolve(bindings: &KeyBindings, event: &InputEvent) -> Vec<Intent> {
    match event {
        InputEvent::Pressed(code) => {
            let mut intents: Vec<Intent> = bindings
                .resolve(code)
                .into_iter()
                .map(Intent::Press)
                .collect();
            if code == START_PAUSE_CODE {
                intents.push(Intent::StartPause);
            }
            intents
        }
        InputEvent::Released(code) => bindings
            .resolve(code)
            .into_iter()
            .map(Intent::Release)
            .collect(),
    }
}

/// Which actions each side is currently holding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldActions {
    held: [[bool; 4]; 2],
}

impl HeldActions {
    fn action_index(action: Action) -> usize {
        match action {
            Action::Up => 0,
            Action::Down => 1,
            Action::Boost => 2,
            Action::Shield => 3,
        }
    }

    pub fn set(&mut self, slot: Slot, held: bool) {
        self.held[slot.side.index()][Self::action_index(slot.action)] = held;
    }

    pub fn is_held(&self, side: Side, action: Action) -> bool {
        self.held[side.index()][Self::action_index(action)]
    }

    /// Paddle direction: -1 for up, +1 for down, 0 when both or neither
    pub fn paddle_direction(&self, side: Side) -> f32 {
        let up = self.is_held(side, Action::Up) as i8;
        let down = self.is_held(side, Action::Down) as i8;
        (down - up) as f32
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_bindings() {
        let bindings = KeyBindings::default();
        let intents = resolve(&bindings, &InputEvent::pressed("KeyW"));
        assert_eq!(intents, vec![Intent::Press(Slot::new(Side::One, Action::Up))]);

        let intents = resolve(&bindings, &InputEvent::released("ArrowLeft"));
        assert_eq!(
            intents,
            vec![Intent::Release(Slot::new(Side::Two, Action::Shield))]
        );

        assert_eq!(
            resolve(&bindings, &InputEvent::pressed(START_PAUSE_CODE)),
            vec![Intent::StartPause]
        );
        assert!(resolve(&bindings, &InputEvent::pressed("KeyZ")).is_empty());
    }

    #[test]
    fn test_paddle_direction() {
        let mut held = HeldActions::default();
        assert_eq!(held.paddle_direction(Side::One), 0.0);
        held.set(Slot::new(Side::One, Action::Up), true);
        assert_eq!(held.paddle_direction(Side::One), -1.0);
        held.set(Slot::new(Side::One, Action::Down), true);
        assert_eq!(held.paddle_direction(Side::One), 0.0);
        held.set(Slot::new(Side::One, Action::Up), false);
        assert_eq!(held.paddle_direction(Side::One), 1.0);
        assert_eq!(held.paddle_direction(Side::Two), 0.0);
    }
}
