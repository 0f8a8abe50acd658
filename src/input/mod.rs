//! Input bindings.
//!
//! Keyboard events and pointer gestures are translated into a small
//! device-independent command vocabulary here; the shell executes the
//! commands against the engine and player without knowing which device
//! produced them.

pub mod keyboard;
pub mod pointer;

pub use keyboard::map_key_event;
pub use pointer::{map_pointer, PointerPhase, PointerTarget};

use crate::player::HoldDirection;
use crate::time::StepDirection;

/// A single user intent, already stripped of device details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubCommand {
    TogglePlay,
    Pause,
    /// Begin holding in a direction; replaces any active hold.
    StartHold(HoldDirection),
    /// Release whatever hold is active.
    StopHold,
    /// Momentary jump by a signed number of seconds.
    Jump(f64),
    /// Single frame step at the current step size.
    Step(StepDirection),
    ToggleSlowMo,
    VolumeUp,
    VolumeDown,
    Quit,
}
