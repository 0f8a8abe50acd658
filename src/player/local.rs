//! Adapter for a locally loaded media element.
//!
//! The native element applies seeks and rate changes directly and accepts
//! arbitrary continuous playback rates, so forward holds scan by altering
//! the rate instead of re-seeking; rewind still has to seek, since no
//! mainstream element plays backwards.

use std::time::{Duration, Instant};

use tracing::trace;

use super::{HoldDirection, HoldTechnique, PlayerAdapter, PlayerSnapshot};

/// Rates offered in the UI's speed selector. The element itself accepts
/// values outside this list; these are what the adapter advertises.
const ADVERTISED_RATES: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// Raw capability surface of a native media element.
///
/// Volume is the element's 0–1 fraction; the adapter converts to the
/// uniform 0–100 scale.
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_current_time(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    /// `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    fn set_playback_rate(&mut self, rate: f64);
    fn playback_rate(&self) -> f64;
    /// Volume as 0–1.
    fn set_volume(&mut self, fraction: f64);
    fn volume(&self) -> f64;
}

/// Adapter over a native media element.
pub struct LocalAdapter<M> {
    element: M,
    snapshot: PlayerSnapshot,
}

impl<M: MediaElement> LocalAdapter<M> {
    pub fn new(element: M) -> Self {
        let mut adapter = Self {
            element,
            snapshot: PlayerSnapshot {
                loading: true,
                ..PlayerSnapshot::default()
            },
        };
        adapter.poll();
        adapter
    }

    /// Direct access to the wrapped element, for the host that drives it.
    pub fn element_mut(&mut self) -> &mut M {
        &mut self.element
    }
}

impl<M: MediaElement> PlayerAdapter for LocalAdapter<M> {
    fn play(&mut self) {
        if self.snapshot.ready {
            self.element.play();
        }
    }

    fn pause(&mut self) {
        if self.snapshot.ready {
            self.element.pause();
        }
    }

    fn seek_to(&mut self, seconds: f64) {
        if self.snapshot.ready {
            trace!(seconds, "local seek");
            self.element.set_current_time(seconds);
        }
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if self.snapshot.ready {
            self.element.set_playback_rate(rate);
        }
    }

    fn set_volume(&mut self, percent: f64) {
        if self.snapshot.ready {
            self.element.set_volume(percent.clamp(0.0, 100.0) / 100.0);
        }
    }

    fn current_time(&self) -> f64 {
        if self.snapshot.ready {
            self.element.current_time()
        } else {
            0.0
        }
    }

    fn playback_rate(&self) -> f64 {
        self.element.playback_rate()
    }

    fn available_rates(&self) -> Vec<f64> {
        if self.snapshot.ready {
            ADVERTISED_RATES.to_vec()
        } else {
            Vec::new()
        }
    }

    fn hold_technique(&self, direction: HoldDirection) -> HoldTechnique {
        if direction.is_rewind() {
            HoldTechnique::DiscreteSeek
        } else {
            HoldTechnique::RateBased
        }
    }

    fn poll(&mut self) {
        // Ready once metadata (the duration) is known.
        match self.element.duration() {
            Some(duration) => {
                self.snapshot.ready = true;
                self.snapshot.loading = false;
                self.snapshot.duration = duration;
                self.snapshot.current_time = self.element.current_time();
                self.snapshot.is_playing = !self.element.paused() && !self.element.ended();
                self.snapshot.volume = self.element.volume() * 100.0;
            }
            None => {
                self.snapshot.ready = false;
                self.snapshot.loading = true;
            }
        }
    }

    fn snapshot(&self) -> &PlayerSnapshot {
        &self.snapshot
    }
}

/// A clock-driven in-process media element.
///
/// Advances its position while playing, applies seeks and rate changes
/// immediately, and stops at the end of the timeline. The console binary
/// scrubs against it, and tests use it as a deterministic local backend
/// via [`advance`](Self::advance).
pub struct SyntheticMedia {
    duration: f64,
    position: f64,
    playing: bool,
    rate: f64,
    volume: f64,
    ended: bool,
    last_tick: Option<Instant>,
}

impl SyntheticMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            position: 0.0,
            playing: false,
            rate: 1.0,
            volume: 1.0,
            ended: false,
            last_tick: None,
        }
    }

    /// Advance the timeline by `dt` of wall time.
    pub fn advance(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }
        self.position += dt.as_secs_f64() * self.rate;
        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            self.ended = true;
        }
    }

    /// Advance by however much wall time passed since the previous call.
    /// The console loop calls this once per frame.
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_tick {
            self.advance(now.saturating_duration_since(last));
        }
        self.last_tick = Some(now);
    }
}

impl MediaElement for SyntheticMedia {
    fn play(&mut self) {
        if self.ended {
            self.position = 0.0;
            self.ended = false;
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
        self.ended = false;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn paused(&self) -> bool {
        !self.playing
    }

    fn ended(&self) -> bool {
        self.ended
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_volume(&mut self, fraction: f64) {
        self.volume = fraction.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}
