//! Player adapters.
//!
//! Each backend (network-embedded player, native media element) is wrapped
//! by an adapter exposing the same capability surface: fire-and-forget
//! commands plus a live state snapshot the host refreshes by polling. The
//! scrub engine and input bindings only ever see [`PlayerAdapter`], never a
//! backend's native API.
//!
//! Backends differ in what they can do natively. The remote backend only
//! plays forward at discrete rates and has to fake rewind with repeated
//! seeks; the local element accepts arbitrary continuous rates. Each
//! adapter advertises which scan technique a hold gesture should use via
//! [`PlayerAdapter::hold_technique`], which keeps the scrub engine
//! backend-agnostic.

pub mod local;
pub mod remote;

#[cfg(test)]
pub(crate) mod testutil;

pub use local::{LocalAdapter, MediaElement, SyntheticMedia};
pub use remote::{RemoteAdapter, RemoteApi, ScriptLoader};

/// Direction of an active hold-to-scan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldDirection {
    Rewind,
    Forward,
    RewindFast,
    ForwardFast,
}

impl HoldDirection {
    pub fn is_rewind(self) -> bool {
        matches!(self, HoldDirection::Rewind | HoldDirection::RewindFast)
    }

    pub fn is_fast(self) -> bool {
        matches!(self, HoldDirection::RewindFast | HoldDirection::ForwardFast)
    }
}

/// How a backend implements continuous scanning for a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldTechnique {
    /// Repeated throttled seeks against a paused player.
    DiscreteSeek,
    /// Altered playback rate on a playing player; no periodic seeking.
    RateBased,
}

/// Live player state, refreshed by [`PlayerAdapter::poll`].
///
/// Reads are non-blocking snapshots and may lag the backend's true internal
/// state; that staleness is expected. Before `ready`, the fields carry no
/// meaning and callers must not issue commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub ready: bool,
    pub loading: bool,
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    /// Volume as 0–100.
    pub volume: f64,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            ready: false,
            loading: false,
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            volume: 100.0,
        }
    }
}

/// Uniform command/state surface over a video backend.
///
/// Commands are fire-and-forget: the backend applies them asynchronously
/// and the result shows up in later snapshots. Every command is a silent
/// no-op while `ready()` is false.
pub trait PlayerAdapter {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    fn set_playback_rate(&mut self, rate: f64);
    /// Set volume as 0–100.
    fn set_volume(&mut self, percent: f64);

    /// Fresh position query against the backend; may be newer than the
    /// snapshot.
    fn current_time(&self) -> f64;
    fn playback_rate(&self) -> f64;
    /// Rates the backend will accept; empty until ready.
    fn available_rates(&self) -> Vec<f64>;
    fn hold_technique(&self, direction: HoldDirection) -> HoldTechnique;

    /// Refresh the snapshot from the backend. The host loop calls this once
    /// per frame.
    fn poll(&mut self);
    fn snapshot(&self) -> &PlayerSnapshot;

    fn ready(&self) -> bool {
        self.snapshot().ready
    }

    fn loading(&self) -> bool {
        self.snapshot().loading
    }

    fn duration(&self) -> f64 {
        self.snapshot().duration
    }

    fn is_playing(&self) -> bool {
        self.snapshot().is_playing
    }

    fn volume(&self) -> f64 {
        self.snapshot().volume
    }

    /// Largest advertised rate, if any. Requested scan rates are capped to
    /// this before use.
    fn max_rate(&self) -> Option<f64> {
        self.available_rates()
            .into_iter()
            .fold(None, |acc: Option<f64>, r| match acc {
                Some(m) if m >= r => Some(m),
                _ => Some(r),
            })
    }
}
