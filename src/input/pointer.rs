//! Pointer bindings for the on-screen hold buttons.
//!
//! A pointer hold must end on up, leave, or cancel alike. Binding only the
//! up phase would leave a session scanning forever when the pointer slides
//! off the button or the platform interrupts the gesture.

use super::ScrubCommand;
use crate::player::HoldDirection;

/// On-screen control the pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    RewindFast,
    Rewind,
    Forward,
    ForwardFast,
}

impl PointerTarget {
    pub fn direction(self) -> HoldDirection {
        match self {
            PointerTarget::RewindFast => HoldDirection::RewindFast,
            PointerTarget::Rewind => HoldDirection::Rewind,
            PointerTarget::Forward => HoldDirection::Forward,
            PointerTarget::ForwardFast => HoldDirection::ForwardFast,
        }
    }
}

/// Phase of a pointer gesture on a hold button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Up,
    /// Pointer moved off the button while held.
    Leave,
    /// Gesture interrupted by the platform.
    Cancel,
}

/// Translate a pointer event on a hold button into a command.
pub fn map_pointer(target: PointerTarget, phase: PointerPhase) -> ScrubCommand {
    match phase {
        PointerPhase::Down => ScrubCommand::StartHold(target.direction()),
        PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => ScrubCommand::StopHold,
    }
}
