//! Frame-accurate video scrub control.
//!
//! The video itself is decoded and rendered by an external backend; this
//! crate supplies everything around it: sub-second frame stepping, fixed
//! jumps, hold-to-scan in either direction at configurable speed,
//! slow-motion toggling, persisted settings, and shareable deep links.
//!
//! Layering, bottom up:
//! - [`time`]: pure clamping/stepping/jumping arithmetic.
//! - [`player`]: adapters normalizing each backend behind one
//!   command/state surface.
//! - [`engine`]: the hold/jump/step state machine driving a
//!   [`player::PlayerAdapter`].
//! - [`input`]: keyboard and pointer events to engine commands.
//! - [`video`], [`settings`], [`link`]: reference resolution, persisted
//!   configuration, deep-link state.
//! - [`shell`]: the orchestrator tying all of it together for a host UI.

pub mod engine;
pub mod input;
pub mod link;
pub mod player;
pub mod settings;
pub mod shell;
pub mod time;
pub mod video;

pub use engine::{ScrubEngine, StepPreset};
pub use input::ScrubCommand;
pub use link::ShareState;
pub use player::{HoldDirection, PlayerAdapter, PlayerSnapshot};
pub use settings::Settings;
pub use shell::{DispatchResult, Shell};
pub use video::{extract_video_id, VideoId};
