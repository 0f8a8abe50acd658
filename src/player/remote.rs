//! Adapter for the network-embedded remote player.
//!
//! The remote backend is consumed through [`RemoteApi`], a thin trait the
//! embedding layer implements over the player's native object. The backend
//! only plays forward at discrete advertised rates, so every hold direction
//! scans via repeated seeks.
//!
//! Initialization is asynchronous and cancellable: the embed API script has
//! to load once per process ([`ScriptLoader`]), then a player instance is
//! constructed for the requested video. Both phases can be torn down while
//! in flight, so completions carry a generation-tagged [`LoadTicket`] and
//! stale results are discarded instead of resurrecting a replaced player.

use tracing::{debug, trace, warn};

use super::{HoldDirection, HoldTechnique, PlayerAdapter, PlayerSnapshot};

/// Errors surfaced by remote backend initialization.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("embed API script failed to load: {0}")]
    ScriptLoad(String),

    #[error("player initialization failed: {0}")]
    Init(String),
}

/// Coarse playback state reported by the remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemotePlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl RemotePlayerState {
    /// Map the backend's numeric state codes.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RemotePlayerState::Ended,
            1 => RemotePlayerState::Playing,
            2 => RemotePlayerState::Paused,
            3 => RemotePlayerState::Buffering,
            5 => RemotePlayerState::Cued,
            _ => RemotePlayerState::Unstarted,
        }
    }
}

/// Raw capability surface of a constructed remote player instance.
///
/// Mirrors the embed API one-to-one; the adapter owns normalization.
pub trait RemoteApi {
    fn play_video(&mut self);
    fn pause_video(&mut self);
    /// `allow_seek_ahead` permits seeking past the buffered range.
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);
    fn set_playback_rate(&mut self, rate: f64);
    /// Volume as 0–100.
    fn set_volume(&mut self, percent: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn playback_rate(&self) -> f64;
    /// Discrete rates the backend accepts, in ascending order.
    fn available_playback_rates(&self) -> Vec<f64>;
    fn player_state(&self) -> RemotePlayerState;
    fn volume(&self) -> f64;
    /// Release the underlying player instance.
    fn destroy(&mut self);
}

/// Tag for one in-flight initialization; stale tickets are rejected by
/// [`RemoteAdapter::complete_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Adapter over the remote embed backend.
pub struct RemoteAdapter<R> {
    raw: Option<R>,
    snapshot: PlayerSnapshot,
    generation: u64,
}

impl<R: RemoteApi> RemoteAdapter<R> {
    pub fn new() -> Self {
        Self {
            raw: None,
            snapshot: PlayerSnapshot::default(),
            generation: 0,
        }
    }

    /// Start an initialization: tears down any current player, enters the
    /// loading state, and returns the ticket the completion must present.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.teardown_raw();
        self.generation += 1;
        self.snapshot = PlayerSnapshot {
            loading: true,
            ..PlayerSnapshot::default()
        };
        debug!(generation = self.generation, "remote load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Deliver the result of an initialization started by [`begin_load`].
    ///
    /// A ticket from a superseded load (another `begin_load` or an
    /// [`unload`] happened in between) is discarded, player and all: the
    /// adapter it was meant for no longer exists.
    ///
    /// [`begin_load`]: Self::begin_load
    /// [`unload`]: Self::unload
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<R, RemoteError>) {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale remote initialization"
            );
            if let Ok(mut raw) = result {
                raw.destroy();
            }
            return;
        }
        match result {
            Ok(raw) => {
                self.raw = Some(raw);
                self.snapshot.loading = false;
                self.snapshot.ready = true;
                self.poll();
                debug!(generation = self.generation, "remote player ready");
            }
            Err(err) => {
                // Permanently not ready; retry is a user-initiated reload.
                self.snapshot = PlayerSnapshot::default();
                warn!(error = %err, "remote player initialization failed");
            }
        }
    }

    /// Tear the backend down (video unloaded or changed). Cancels any
    /// in-flight initialization by invalidating its ticket.
    pub fn unload(&mut self) {
        self.teardown_raw();
        self.generation += 1;
        self.snapshot = PlayerSnapshot::default();
        debug!(generation = self.generation, "remote player unloaded");
    }

    fn teardown_raw(&mut self) {
        if let Some(mut raw) = self.raw.take() {
            raw.destroy();
        }
    }

    fn ready_raw(&mut self) -> Option<&mut R> {
        if self.snapshot.ready {
            self.raw.as_mut()
        } else {
            None
        }
    }
}

impl<R: RemoteApi> Default for RemoteAdapter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RemoteApi> PlayerAdapter for RemoteAdapter<R> {
    fn play(&mut self) {
        if let Some(raw) = self.ready_raw() {
            raw.play_video();
        }
    }

    fn pause(&mut self) {
        if let Some(raw) = self.ready_raw() {
            raw.pause_video();
        }
    }

    fn seek_to(&mut self, seconds: f64) {
        if let Some(raw) = self.ready_raw() {
            trace!(seconds, "remote seek");
            raw.seek_to(seconds, true);
        }
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if let Some(raw) = self.ready_raw() {
            raw.set_playback_rate(rate);
        }
    }

    fn set_volume(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        if let Some(raw) = self.ready_raw() {
            raw.set_volume(percent);
            self.snapshot.volume = percent;
        }
    }

    fn current_time(&self) -> f64 {
        match (&self.raw, self.snapshot.ready) {
            (Some(raw), true) => raw.current_time(),
            _ => 0.0,
        }
    }

    fn playback_rate(&self) -> f64 {
        match (&self.raw, self.snapshot.ready) {
            (Some(raw), true) => raw.playback_rate(),
            _ => 1.0,
        }
    }

    fn available_rates(&self) -> Vec<f64> {
        match (&self.raw, self.snapshot.ready) {
            (Some(raw), true) => raw.available_playback_rates(),
            _ => Vec::new(),
        }
    }

    fn hold_technique(&self, _direction: HoldDirection) -> HoldTechnique {
        // Forward-only backend: every scan direction is simulated seeking.
        HoldTechnique::DiscreteSeek
    }

    fn poll(&mut self) {
        let Some(raw) = &self.raw else {
            return;
        };
        if !self.snapshot.ready {
            return;
        }
        self.snapshot.current_time = raw.current_time();
        self.snapshot.duration = raw.duration();
        self.snapshot.is_playing = raw.player_state() == RemotePlayerState::Playing;
        self.snapshot.volume = raw.volume();
    }

    fn snapshot(&self) -> &PlayerSnapshot {
        &self.snapshot
    }
}

/// Phase of the process-wide embed API script load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptPhase {
    #[default]
    Idle,
    InFlight,
    Ready,
    Failed,
}

type ScriptWaiter = Box<dyn FnOnce(Result<(), RemoteError>)>;

/// One-shot loader for the embed API script.
///
/// The script is fetched at most once per process. The first request kicks
/// off the fetch; requests arriving while it is in flight join the same
/// pending load instead of starting a second one. The outcome is sticky:
/// once Ready or Failed, later requests are answered immediately.
#[derive(Default)]
pub struct ScriptLoader {
    phase: ScriptPhase,
    waiters: Vec<ScriptWaiter>,
    failure: Option<RemoteError>,
}

impl ScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScriptPhase {
        self.phase
    }

    /// Register interest in the script being loaded.
    ///
    /// Returns `true` when this call must start the actual fetch; the
    /// result is then delivered through [`resolve`](Self::resolve).
    pub fn request(&mut self, waiter: ScriptWaiter) -> bool {
        match self.phase {
            ScriptPhase::Ready => {
                waiter(Ok(()));
                false
            }
            ScriptPhase::Failed => {
                let err = self
                    .failure
                    .clone()
                    .unwrap_or(RemoteError::ScriptLoad("unknown failure".into()));
                waiter(Err(err));
                false
            }
            ScriptPhase::InFlight => {
                trace!("joining in-flight embed script load");
                self.waiters.push(waiter);
                false
            }
            ScriptPhase::Idle => {
                self.phase = ScriptPhase::InFlight;
                self.waiters.push(waiter);
                true
            }
        }
    }

    /// Deliver the fetch outcome to every joined waiter.
    pub fn resolve(&mut self, result: Result<(), RemoteError>) {
        match &result {
            Ok(()) => self.phase = ScriptPhase::Ready,
            Err(err) => {
                self.phase = ScriptPhase::Failed;
                self.failure = Some(err.clone());
            }
        }
        for waiter in self.waiters.drain(..) {
            waiter(result.clone());
        }
    }
}
