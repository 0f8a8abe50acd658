//! Orchestrator wiring settings, deep-link state, and gestures together.
//!
//! The shell owns the scrub engine and the persisted settings, routes
//! [`ScrubCommand`]s to the right collaborator, applies a deep link's start
//! position exactly once when the player becomes ready, and keeps the
//! shareable query string current with a debounce so rapid scrubbing does
//! not rebuild it on every seek.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::engine::{ScrubEngine, StepPreset};
use crate::input::ScrubCommand;
use crate::link::ShareState;
use crate::player::PlayerAdapter;
use crate::settings::{Settings, SCRUB_SPEED_FAST, SCRUB_SPEED_SLOW, SLOW_MO_SPEED, SPEED};
use crate::video::{extract_video_id, VideoId};

/// Quiet period after the last state change before the share link is
/// rebuilt.
pub const LINK_DEBOUNCE: Duration = Duration::from_millis(500);

/// Volume change per key press, in percent.
const VOLUME_STEP: f64 = 5.0;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("no video found in {input:?}: paste a watch, share, shorts, or embed link")]
    UnresolvedReference { input: String },
}

/// Control-flow outcome of dispatching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    Continue,
    Quit,
}

/// Session state above the engine: loaded video, settings, slow-motion
/// flag, pending deep-link seek, and the debounced share query.
pub struct Shell {
    settings: Settings,
    engine: ScrubEngine,
    video: Option<VideoId>,
    /// Deep-link start position, applied once the player is ready.
    pending_seek: Option<f64>,
    slow_mo: bool,
    step: StepPreset,
    /// Settings file override; `None` uses the platform config dir.
    store: Option<PathBuf>,
    link_dirty_at: Option<Instant>,
    share_query: String,
}

impl Shell {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            engine: ScrubEngine::new(),
            video: None,
            pending_seek: None,
            slow_mo: false,
            step: StepPreset::default(),
            store: None,
            link_dirty_at: None,
            share_query: String::new(),
        }
    }

    /// Persist settings to an explicit file instead of the platform
    /// config directory.
    pub fn with_store(mut self, path: PathBuf) -> Self {
        self.store = Some(path);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn video(&self) -> Option<&VideoId> {
        self.video.as_ref()
    }

    pub fn slow_mo(&self) -> bool {
        self.slow_mo
    }

    pub fn step_preset(&self) -> StepPreset {
        self.step
    }

    pub fn set_step_preset(&mut self, preset: StepPreset) {
        self.step = preset;
    }

    pub fn is_holding(&self) -> bool {
        self.engine.is_holding()
    }

    pub fn hold_direction(&self) -> Option<crate::player::HoldDirection> {
        self.engine.hold_direction()
    }

    /// The most recently built share query; empty until the first rebuild.
    pub fn share_query(&self) -> &str {
        &self.share_query
    }

    /// Resolve a pasted video reference.
    ///
    /// Rejection leaves the loaded video and everything else untouched;
    /// only the caller's pending input text is invalidated.
    pub fn load_reference(&mut self, raw: &str) -> Result<VideoId, ShellError> {
        let Some(id) = extract_video_id(raw) else {
            return Err(ShellError::UnresolvedReference {
                input: raw.trim().to_owned(),
            });
        };
        debug!(id = id.as_str(), "video reference resolved");
        // A hold session and a leftover deep-link position both belong to
        // the previous video.
        self.engine.abandon_hold();
        self.pending_seek = None;
        self.video = Some(id.clone());
        Ok(id)
    }

    /// Apply deep-link state: settings overrides are clamped and
    /// persisted, the start position is parked until the player is ready.
    pub fn apply_share_state(&mut self, state: &ShareState) {
        if let Some(id) = &state.video_id {
            self.video = Some(id.clone());
        }
        self.pending_seek = state.time.filter(|t| t.is_finite() && *t >= 0.0);
        let mut changed = false;
        if let Some(speed) = state.speed {
            self.settings.speed = SPEED.clamp(speed);
            changed = true;
        }
        if let Some(slow_mo) = state.slow_mo {
            self.settings.slow_mo_speed = SLOW_MO_SPEED.clamp(slow_mo);
            changed = true;
        }
        if let Some(slow) = state.scrub_speed_slow {
            self.settings.scrub_speed_slow = SCRUB_SPEED_SLOW.clamp(slow);
            changed = true;
        }
        if let Some(fast) = state.scrub_speed_fast {
            self.settings.scrub_speed_fast = SCRUB_SPEED_FAST.clamp(fast);
            changed = true;
        }
        if changed {
            self.persist();
        }
    }

    /// Snapshot of everything the share link carries.
    pub fn share_state(&self, player: &dyn PlayerAdapter) -> ShareState {
        ShareState {
            video_id: self.video.clone(),
            time: player.ready().then(|| player.current_time()),
            speed: Some(self.settings.speed),
            slow_mo: Some(self.settings.slow_mo_speed),
            scrub_speed_slow: Some(self.settings.scrub_speed_slow),
            scrub_speed_fast: Some(self.settings.scrub_speed_fast),
        }
    }

    /// Route one command. Returns whether the host should keep running.
    pub fn dispatch(
        &mut self,
        player: &mut dyn PlayerAdapter,
        command: ScrubCommand,
        now: Instant,
    ) -> DispatchResult {
        match command {
            ScrubCommand::TogglePlay => {
                if player.is_playing() {
                    player.pause();
                } else {
                    player.play();
                }
            }
            ScrubCommand::Pause => player.pause(),
            ScrubCommand::StartHold(direction) => {
                let multiplier = if direction.is_fast() {
                    self.settings.scrub_speed_fast
                } else {
                    self.settings.scrub_speed_slow
                };
                self.engine.start_hold(player, direction, multiplier, now);
                self.mark_link_dirty(now);
            }
            ScrubCommand::StopHold => {
                self.engine.stop_hold(player);
                self.mark_link_dirty(now);
            }
            ScrubCommand::Jump(delta) => {
                // Jumps presume no active hold.
                self.engine.stop_hold(player);
                self.engine.jump(player, delta);
                self.mark_link_dirty(now);
            }
            ScrubCommand::Step(direction) => {
                self.engine.stop_hold(player);
                self.engine.step(player, self.step.seconds(), direction);
                self.mark_link_dirty(now);
            }
            ScrubCommand::ToggleSlowMo => {
                self.slow_mo = !self.slow_mo;
                let want = if self.slow_mo {
                    self.settings.slow_mo_speed
                } else {
                    self.settings.speed
                };
                player.set_playback_rate(nearest_rate(player, want));
                self.mark_link_dirty(now);
            }
            ScrubCommand::VolumeUp => {
                player.set_volume((player.volume() + VOLUME_STEP).clamp(0.0, 100.0));
            }
            ScrubCommand::VolumeDown => {
                player.set_volume((player.volume() - VOLUME_STEP).clamp(0.0, 100.0));
            }
            ScrubCommand::Quit => return DispatchResult::Quit,
        }
        DispatchResult::Continue
    }

    /// Per-frame upkeep: refresh the player snapshot, apply a parked
    /// deep-link seek once ready, drive the engine, and rebuild the share
    /// query once the debounce window has passed.
    pub fn frame(&mut self, player: &mut dyn PlayerAdapter, now: Instant) {
        player.poll();
        if player.ready() {
            if let Some(t) = self.pending_seek.take() {
                debug!(t, "applying deep-link start position");
                player.seek_to(t);
                self.mark_link_dirty(now);
            }
        }
        self.engine.tick(player, now);
        if let Some(at) = self.link_dirty_at {
            if now.duration_since(at) >= LINK_DEBOUNCE {
                self.share_query = self.share_state(player).build_query();
                self.link_dirty_at = None;
                debug!(query = %self.share_query, "share link rebuilt");
            }
        }
    }

    pub fn set_speed(&mut self, player: &mut dyn PlayerAdapter, value: f64, now: Instant) {
        self.settings.speed = SPEED.clamp(value);
        if !self.slow_mo {
            player.set_playback_rate(nearest_rate(player, self.settings.speed));
        }
        self.persist();
        self.mark_link_dirty(now);
    }

    pub fn set_slow_mo_speed(&mut self, player: &mut dyn PlayerAdapter, value: f64, now: Instant) {
        self.settings.slow_mo_speed = SLOW_MO_SPEED.clamp(value);
        if self.slow_mo {
            player.set_playback_rate(nearest_rate(player, self.settings.slow_mo_speed));
        }
        self.persist();
        self.mark_link_dirty(now);
    }

    pub fn set_scrub_speed_slow(&mut self, value: f64, now: Instant) {
        self.settings.scrub_speed_slow = SCRUB_SPEED_SLOW.clamp(value);
        self.persist();
        self.mark_link_dirty(now);
    }

    pub fn set_scrub_speed_fast(&mut self, value: f64, now: Instant) {
        self.settings.scrub_speed_fast = SCRUB_SPEED_FAST.clamp(value);
        self.persist();
        self.mark_link_dirty(now);
    }

    fn mark_link_dirty(&mut self, now: Instant) {
        // Debounce from the *last* change, not the first.
        self.link_dirty_at = Some(now);
    }

    fn persist(&self) {
        let result = match &self.store {
            Some(path) => self.settings.save_to(path),
            None => self.settings.save(),
        };
        if let Err(err) = result {
            warn!(%err, "failed to save settings");
        }
    }
}

/// Closest rate the backend advertises, or the requested rate when it
/// advertises none.
fn nearest_rate(player: &dyn PlayerAdapter, want: f64) -> f64 {
    player
        .available_rates()
        .into_iter()
        .fold(None, |best: Option<f64>, rate| match best {
            Some(b) if (b - want).abs() <= (rate - want).abs() => Some(b),
            _ => Some(rate),
        })
        .unwrap_or(want)
}
