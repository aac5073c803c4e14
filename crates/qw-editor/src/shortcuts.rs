//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and native front-ends share it.
//!
//! - Single letters pick a palette kind (`h`, `x`, `c` for cnot, ...)
//! - ⌘Enter runs the circuit
//! - ⌘E flips between the canvas and the program text

use crate::input::Modifiers;
use qw_core::model::GateKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tools ──
    SelectTool,
    Palette(GateKind),

    // ── Edit ──
    DeleteSelected,
    Deselect,

    // ── Session ──
    ToggleView,
    Run,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"h"`, `"Delete"`).
    pub fn resolve(key: &str, modifiers: &Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "Enter" => Some(ShortcutAction::Run),
                "e" | "E" => Some(ShortcutAction::ToggleView),
                _ => None,
            };
        }
        if modifiers.alt {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelected),
            "Escape" => Some(ShortcutAction::Deselect),
            "v" | "V" => Some(ShortcutAction::SelectTool),
            _ => palette_key(key).map(ShortcutAction::Palette),
        }
    }
}

fn palette_key(key: &str) -> Option<GateKind> {
    let kind = match key.to_ascii_lowercase().as_str() {
        "h" => GateKind::H,
        "x" => GateKind::X,
        "y" => GateKind::Y,
        "z" => GateKind::Z,
        "s" => GateKind::S,
        "t" => GateKind::T,
        "m" => GateKind::Measure,
        "c" => GateKind::Cnot,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    #[test]
    fn resolve_palette_keys() {
        assert_eq!(
            ShortcutMap::resolve("h", &Modifiers::NONE),
            Some(ShortcutAction::Palette(GateKind::H))
        );
        assert_eq!(
            ShortcutMap::resolve("C", &Modifiers::NONE),
            Some(ShortcutAction::Palette(GateKind::Cnot))
        );
        assert_eq!(
            ShortcutMap::resolve("m", &Modifiers::NONE),
            Some(ShortcutAction::Palette(GateKind::Measure))
        );
        assert_eq!(ShortcutMap::resolve("q", &Modifiers::NONE), None);
    }

    #[test]
    fn resolve_edit_keys() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", &Modifiers::NONE),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", &Modifiers::NONE),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn command_combos_work_with_ctrl_or_meta() {
        for modifiers in [CTRL, META] {
            assert_eq!(
                ShortcutMap::resolve("Enter", &modifiers),
                Some(ShortcutAction::Run)
            );
            assert_eq!(
                ShortcutMap::resolve("e", &modifiers),
                Some(ShortcutAction::ToggleView)
            );
            assert_eq!(ShortcutMap::resolve("h", &modifiers), None);
        }
    }
}
