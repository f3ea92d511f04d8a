/// Input state read by the simulation.
///
/// `Keyboard` and `Mouse` are the two records the player looks at each
/// frame.  The terminal front-end feeds raw key events into a [`KeyTracker`],
/// which turns them into a `Keyboard` snapshot.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEventKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub left: bool,
    pub right: bool,
    pub firing: bool,
}

/// Pointer position in surface coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mouse {
    pub x: f32,
    pub y: f32,
}

impl Mouse {
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Fire,
}

/// Map a key to the game action it drives.
pub fn action_for(code: &KeyCode) -> Option<Action> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Right),
        KeyCode::Char(' ') => Some(Action::Fire),
        _ => None,
    }
}

/// A key counts as held if its last press/repeat arrived within this many
/// frames.  Terminals without release events rely on OS key-repeat (≥ 15 Hz)
/// to refresh it, which a 4-frame window at 30 FPS always covers.
pub const HOLD_WINDOW: u64 = 4;

/// Tracks the frame each action was last seen on.
///
/// Keyboard-enhanced terminals send `Release` and the action drops at once;
/// classic terminals only send `Press` and the action expires after
/// [`HOLD_WINDOW`] frames of silence.
#[derive(Debug, Default)]
pub struct KeyTracker {
    last_seen: HashMap<Action, u64>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key event.  Keys without a game action are ignored.
    pub fn record(&mut self, code: &KeyCode, kind: KeyEventKind, frame: u64) {
        let Some(action) = action_for(code) else {
            return;
        };
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.last_seen.insert(action, frame);
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&action);
            }
        }
    }

    pub fn is_held(&self, action: Action, frame: u64) -> bool {
        self.last_seen
            .get(&action)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    /// Snapshot of the held actions as of `frame`.
    pub fn keyboard(&self, frame: u64) -> Keyboard {
        Keyboard {
            left: self.is_held(Action::Left, frame),
            right: self.is_held(Action::Right, frame),
            firing: self.is_held(Action::Fire, frame),
        }
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}
