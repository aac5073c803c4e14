//! Platform-neutral input events fed to tools and shortcuts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    PointerUp { x: f32, y: f32, modifiers: Modifiers },
    KeyDown { key: String, modifiers: Modifiers },
}

impl InputEvent {
    /// Canvas position for pointer events.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            InputEvent::PointerDown { x, y, .. }
            | InputEvent::PointerMove { x, y, .. }
            | InputEvent::PointerUp { x, y, .. } => Some((*x, *y)),
            InputEvent::KeyDown { .. } => None,
        }
    }
}
