//! Keyboard bindings.
//!
//! Fixed, non-remappable map from key events to [`ScrubCommand`]s. The two
//! hold keys work on key-down/key-up pairs, so callers must feed release
//! events through as well (kitty keyboard protocol, or a synthesized
//! release when the terminal cannot report one).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ScrubCommand;
use crate::engine::JUMP_AMOUNTS;
use crate::player::HoldDirection;
use crate::time::StepDirection;

/// Translate one key event into a command, if it is bound.
///
/// `typing` suppresses everything except Ctrl-C: while focus is in a
/// text-entry field (pasting a link), playback keys must not fire.
pub fn map_key_event(key: &KeyEvent, typing: bool) -> Option<ScrubCommand> {
    // Ctrl-C quits regardless of focus.
    if key.kind != KeyEventKind::Release
        && key.code == KeyCode::Char('c')
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        return Some(ScrubCommand::Quit);
    }
    if typing {
        return None;
    }

    if key.kind == KeyEventKind::Release {
        return map_release(key.code);
    }

    // Auto-repeat of a held key must not restart the hold session, and a
    // repeated space/k would fight the user; jumps and steps repeat freely.
    let repeat = key.kind == KeyEventKind::Repeat;
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match normalize(key.code) {
        // === Playback ===
        KeyCode::Char(' ') if !repeat => Some(ScrubCommand::TogglePlay),
        KeyCode::Char('k') if !repeat => Some(ScrubCommand::Pause),
        KeyCode::Char('s') if !repeat => Some(ScrubCommand::ToggleSlowMo),

        // === Hold-to-scan ===
        KeyCode::Char('j') if !repeat => Some(ScrubCommand::StartHold(if shift {
            HoldDirection::RewindFast
        } else {
            HoldDirection::Rewind
        })),
        KeyCode::Char('l') if !repeat => Some(ScrubCommand::StartHold(if shift {
            HoldDirection::ForwardFast
        } else {
            HoldDirection::Forward
        })),

        // === Jumps ===
        KeyCode::Left => Some(ScrubCommand::Jump(-jump_amount(key.modifiers))),
        KeyCode::Right => Some(ScrubCommand::Jump(jump_amount(key.modifiers))),

        // === Frame steps ===
        KeyCode::Char(',') | KeyCode::Char('<') => Some(ScrubCommand::Step(StepDirection::Back)),
        KeyCode::Char('.') | KeyCode::Char('>') => {
            Some(ScrubCommand::Step(StepDirection::Forward))
        }

        // === Volume ===
        KeyCode::Up => Some(ScrubCommand::VolumeUp),
        KeyCode::Down => Some(ScrubCommand::VolumeDown),

        // === Quit ===
        KeyCode::Char('q') if !repeat => Some(ScrubCommand::Quit),

        _ => None,
    }
}

fn map_release(code: KeyCode) -> Option<ScrubCommand> {
    match normalize(code) {
        // Releasing either hold key ends whatever hold is active; with
        // only one session at a time there is no pairing to track.
        KeyCode::Char('j') | KeyCode::Char('l') => Some(ScrubCommand::StopHold),
        _ => None,
    }
}

/// Shifted hold keys arrive as uppercase; fold case so press and release
/// match even if the modifier changed in between.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Jump magnitude selected by the modifier set: plain, Shift, Ctrl/Cmd.
fn jump_amount(modifiers: KeyModifiers) -> f64 {
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) {
        JUMP_AMOUNTS[2]
    } else if modifiers.contains(KeyModifiers::SHIFT) {
        JUMP_AMOUNTS[1]
    } else {
        JUMP_AMOUNTS[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press_mod(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn release(code: KeyCode) -> KeyEvent {
        let mut key = KeyEvent::new(code, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        key
    }

    #[test]
    fn space_toggles_k_pauses() {
        assert_eq!(
            map_key_event(&press(KeyCode::Char(' ')), false),
            Some(ScrubCommand::TogglePlay)
        );
        assert_eq!(
            map_key_event(&press(KeyCode::Char('k')), false),
            Some(ScrubCommand::Pause)
        );
    }

    #[test]
    fn hold_keys_pair_press_with_release() {
        assert_eq!(
            map_key_event(&press(KeyCode::Char('j')), false),
            Some(ScrubCommand::StartHold(HoldDirection::Rewind))
        );
        assert_eq!(
            map_key_event(&press(KeyCode::Char('l')), false),
            Some(ScrubCommand::StartHold(HoldDirection::Forward))
        );
        assert_eq!(
            map_key_event(&release(KeyCode::Char('j')), false),
            Some(ScrubCommand::StopHold)
        );
        assert_eq!(
            map_key_event(&release(KeyCode::Char('l')), false),
            Some(ScrubCommand::StopHold)
        );
    }

    #[test]
    fn shifted_hold_keys_scan_fast() {
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Char('J'), KeyModifiers::SHIFT), false),
            Some(ScrubCommand::StartHold(HoldDirection::RewindFast))
        );
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Char('L'), KeyModifiers::SHIFT), false),
            Some(ScrubCommand::StartHold(HoldDirection::ForwardFast))
        );
        // Release still matches even if shift was dropped first.
        assert_eq!(
            map_key_event(&release(KeyCode::Char('J')), false),
            Some(ScrubCommand::StopHold)
        );
    }

    #[test]
    fn auto_repeat_does_not_restart_holds() {
        let mut key = press(KeyCode::Char('j'));
        key.kind = KeyEventKind::Repeat;
        assert_eq!(map_key_event(&key, false), None);
    }

    #[test]
    fn arrows_jump_by_modifier_tier() {
        assert_eq!(
            map_key_event(&press(KeyCode::Right), false),
            Some(ScrubCommand::Jump(1.0))
        );
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Right, KeyModifiers::SHIFT), false),
            Some(ScrubCommand::Jump(5.0))
        );
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Left, KeyModifiers::CONTROL), false),
            Some(ScrubCommand::Jump(-10.0))
        );
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Left, KeyModifiers::SUPER), false),
            Some(ScrubCommand::Jump(-10.0))
        );
    }

    #[test]
    fn comma_and_period_step() {
        assert_eq!(
            map_key_event(&press(KeyCode::Char(',')), false),
            Some(ScrubCommand::Step(StepDirection::Back))
        );
        assert_eq!(
            map_key_event(&press(KeyCode::Char('.')), false),
            Some(ScrubCommand::Step(StepDirection::Forward))
        );
    }

    #[test]
    fn typing_suppresses_everything_but_ctrl_c() {
        assert_eq!(map_key_event(&press(KeyCode::Char(' ')), true), None);
        assert_eq!(map_key_event(&press(KeyCode::Char('j')), true), None);
        assert_eq!(map_key_event(&press(KeyCode::Left), true), None);
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Char('c'), KeyModifiers::CONTROL), true),
            Some(ScrubCommand::Quit)
        );
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(map_key_event(&press(KeyCode::Char('x')), false), None);
        assert_eq!(map_key_event(&press(KeyCode::Enter), false), None);
        assert_eq!(map_key_event(&release(KeyCode::Char(' ')), false), None);
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        assert_eq!(
            map_key_event(&press(KeyCode::Char('q')), false),
            Some(ScrubCommand::Quit)
        );
        assert_eq!(
            map_key_event(&press_mod(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Some(ScrubCommand::Quit)
        );
    }
}
