//! The scrub engine: hold-to-scan, jump, and frame-step state machine.
//!
//! Gestures arrive as discrete commands (from the input bindings) and come
//! out the other side as a stream of seek/play/pause/rate commands against
//! a [`PlayerAdapter`]. The player applies commands asynchronously and at
//! its own pace, so scanning is driven off wall-clock elapsed time from an
//! anchor rather than off whatever position the backend happens to report,
//! and seeks are throttled to a rate the backend can absorb.
//!
//! At most one [`HoldSession`] exists at a time; starting a new hold tears
//! the old one down first, so no stale scheduling state can leak into the
//! fresh session.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::player::{HoldDirection, HoldTechnique, PlayerAdapter};
use crate::time::{jump_time, step_time, StepDirection};

/// Minimum spacing between two seeks of the same hold session.
///
/// The backend's seek is itself asynchronous and rate-limited; issuing
/// seeks faster than it can apply them produces stutter, not smoothness.
pub const SEEK_THROTTLE: Duration = Duration::from_millis(150);

/// How far back to pre-seek when a rewind scan starts, to let a streaming
/// backend warm its cache window. A heuristic, not a correctness
/// requirement.
pub const PREBUFFER_SECONDS: f64 = 5.0;

/// Jump magnitudes in seconds: plain, Shift, Cmd/Ctrl.
pub const JUMP_AMOUNTS: [f64; 3] = [1.0, 5.0, 10.0];

/// Frame-step size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPreset {
    Fine,
    #[default]
    Medium,
    Coarse,
}

impl StepPreset {
    pub fn seconds(self) -> f64 {
        match self {
            StepPreset::Fine => 0.033,
            StepPreset::Medium => 0.05,
            StepPreset::Coarse => 0.1,
        }
    }
}

/// Technique the active session is using, with whatever must be undone at
/// teardown.
#[derive(Debug, Clone, Copy)]
enum Technique {
    Seeking,
    Rate { restore: f64 },
}

/// State of one active hold gesture.
///
/// Created on hold-start, mutated only by [`ScrubEngine::tick`], destroyed
/// on hold-stop or when a new hold replaces it.
#[derive(Debug)]
struct HoldSession {
    direction: HoldDirection,
    technique: Technique,
    multiplier: f64,
    /// Player position captured at hold-start.
    anchor_time: f64,
    /// Wall clock at hold-start.
    anchor_clock: Instant,
    /// Clock of the most recently issued seek, for throttling.
    last_seek: Option<Instant>,
    /// Playback state at hold-start, restored on release.
    was_playing: bool,
    /// Upper seek bound; infinite while the backend reports no duration.
    duration: f64,
}

/// The hold/jump/step state machine.
#[derive(Debug, Default)]
pub struct ScrubEngine {
    hold: Option<HoldSession>,
}

impl ScrubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction of the active hold, if any.
    pub fn hold_direction(&self) -> Option<HoldDirection> {
        self.hold.as_ref().map(|s| s.direction)
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    /// Momentary frame step: pause, then seek one step from the current
    /// position. No session is created.
    pub fn step(&self, player: &mut dyn PlayerAdapter, step_size: f64, direction: StepDirection) {
        if !player.ready() {
            return;
        }
        player.pause();
        let current = player.current_time();
        let target = step_time(current, step_size, direction, known_duration(player));
        player.seek_to(target);
    }

    /// Momentary jump by a signed number of seconds.
    ///
    /// Precondition: no hold is active. Callers stop any hold first; the
    /// engine does not guard this transition.
    pub fn jump(&self, player: &mut dyn PlayerAdapter, delta: f64) {
        if !player.ready() {
            return;
        }
        player.pause();
        let current = player.current_time();
        let target = jump_time(current, delta, known_duration(player));
        player.seek_to(target);
    }

    /// Begin a hold-to-scan gesture.
    ///
    /// An existing session is torn down first: its scheduling state and any
    /// altered playback rate are cleaned up, but the pre-hold play state is
    /// not restored, since the hold is continuing in a new direction.
    pub fn start_hold(
        &mut self,
        player: &mut dyn PlayerAdapter,
        direction: HoldDirection,
        multiplier: f64,
        now: Instant,
    ) {
        if !player.ready() {
            return;
        }
        self.discard_session(player);

        let was_playing = player.is_playing();
        let anchor_time = player.current_time();
        let duration = raw_duration_or_infinite(player);

        let technique = match player.hold_technique(direction) {
            HoldTechnique::DiscreteSeek => {
                player.pause();
                if direction.is_rewind() {
                    // Warm the backend's cache window behind the anchor
                    // before the scan starts pulling positions from it.
                    player.seek_to((anchor_time - PREBUFFER_SECONDS).max(0.0));
                    player.seek_to(anchor_time);
                }
                Technique::Seeking
            }
            HoldTechnique::RateBased => {
                let restore = player.playback_rate();
                let rate = match player.max_rate() {
                    Some(max) => multiplier.min(max),
                    None => multiplier,
                };
                player.set_playback_rate(rate);
                player.play();
                Technique::Rate { restore }
            }
        };

        debug!(?direction, multiplier, anchor_time, "hold started");
        self.hold = Some(HoldSession {
            direction,
            technique,
            multiplier,
            anchor_time,
            anchor_clock: now,
            last_seek: None,
            was_playing,
            duration,
        });
    }

    /// Per-frame callback while a hold may be active.
    ///
    /// Only seeking sessions do work here, and only when the throttle
    /// interval has elapsed since the previous seek: the target is the
    /// anchor displaced by elapsed wall time times the multiplier, clamped
    /// to the timeline.
    pub fn tick(&mut self, player: &mut dyn PlayerAdapter, now: Instant) {
        let Some(session) = &mut self.hold else {
            return;
        };
        if !matches!(session.technique, Technique::Seeking) {
            return;
        }
        if !player.ready() {
            return;
        }
        let due = session
            .last_seek
            .map_or(true, |last| now.duration_since(last) >= SEEK_THROTTLE);
        if !due {
            return;
        }

        let elapsed = now.duration_since(session.anchor_clock).as_secs_f64();
        let delta = elapsed * session.multiplier;
        let target = if session.direction.is_rewind() {
            (session.anchor_time - delta).max(0.0)
        } else {
            (session.anchor_time + delta).min(session.duration)
        };
        player.seek_to(target);
        session.last_seek = Some(now);
    }

    /// End the active hold and restore what the gesture displaced.
    ///
    /// Idempotent: safe to call when no session is active.
    pub fn stop_hold(&mut self, player: &mut dyn PlayerAdapter) {
        let Some(session) = self.hold.take() else {
            return;
        };
        if let Technique::Rate { restore } = session.technique {
            player.set_playback_rate(restore);
        }
        // The explicit pause matters for rate-based holds, which left the
        // player actually playing at an altered rate.
        if session.was_playing {
            player.play();
        } else {
            player.pause();
        }
        debug!(direction = ?session.direction, "hold stopped");
    }

    /// Drop the session without touching play state (direction change or
    /// player teardown). Altered playback rate is still undone.
    fn discard_session(&mut self, player: &mut dyn PlayerAdapter) {
        if let Some(old) = self.hold.take() {
            if let Technique::Rate { restore } = old.technique {
                player.set_playback_rate(restore);
            }
        }
    }

    /// Forget the session entirely; for when the player reference itself
    /// went away and no commands can be issued.
    pub fn abandon_hold(&mut self) {
        self.hold = None;
    }
}

/// Duration as a clamping bound, or `None` while the backend reports none.
fn known_duration(player: &dyn PlayerAdapter) -> Option<f64> {
    let d = player.duration();
    (d > 0.0).then_some(d)
}

/// Forward scan bound: unknown duration means unbounded, not blocked.
fn raw_duration_or_infinite(player: &dyn PlayerAdapter) -> f64 {
    let d = player.duration();
    if d > 0.0 {
        d
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::testutil::{Command, ScriptedPlayer};

    fn t0() -> Instant {
        Instant::now()
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn step_pauses_then_seeks() {
        let engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::ready(100.0).at(10.0);
        engine.step(&mut player, 0.05, StepDirection::Forward);
        assert_eq!(player.commands[0], Command::Pause);
        assert!((player.seeks()[0] - 10.05).abs() < 1e-9);
    }

    #[test]
    fn step_back_clamps_at_zero() {
        let engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::ready(100.0).at(0.01);
        engine.step(&mut player, 0.05, StepDirection::Back);
        assert_eq!(player.seeks(), vec![0.0]);
    }

    #[test]
    fn jump_clamps_at_both_ends() {
        let engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::ready(100.0).at(98.0);
        engine.jump(&mut player, 10.0);
        assert_eq!(player.seeks(), vec![100.0]);

        let mut player = ScriptedPlayer::ready(100.0).at(5.0);
        engine.jump(&mut player, -10.0);
        assert_eq!(player.seeks(), vec![0.0]);
    }

    #[test]
    fn commands_are_gated_on_ready() {
        let mut engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::not_ready();
        engine.step(&mut player, 0.05, StepDirection::Forward);
        engine.jump(&mut player, 5.0);
        engine.start_hold(&mut player, HoldDirection::Rewind, 0.5, t0());
        assert!(player.commands.is_empty());
        assert!(!engine.is_holding());
    }

    #[test]
    fn rewind_hold_prebuffers_and_returns_to_anchor() {
        let mut engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::ready(100.0).at(30.0);
        engine.start_hold(&mut player, HoldDirection::Rewind, 0.5, t0());
        assert_eq!(player.seeks(), vec![25.0, 30.0]);
        assert_eq!(player.snapshot.current_time, 30.0);
        assert_eq!(engine.hold_direction(), Some(HoldDirection::Rewind));
    }

    #[test]
    fn prebuffer_does_not_go_negative() {
        let mut engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::ready(100.0).at(2.0);
        engine.start_hold(&mut player, HoldDirection::Rewind, 0.5, t0());
        assert_eq!(player.seeks(), vec![0.0, 2.0]);
    }

    #[test]
    fn start_then_stop_before_tick_restores_everything() {
        let mut engine = ScrubEngine::new();
        let base = t0();

        // Paused before the hold: stays paused at the anchor.
        let mut player = ScriptedPlayer::ready(100.0).at(30.0);
        engine.start_hold(&mut player, HoldDirection::Rewind, 0.5, base);
        engine.stop_hold(&mut player);
        assert_eq!(player.snapshot.current_time, 30.0);
        assert!(!player.snapshot.is_playing);
        assert_eq!(player.commands.last(), Some(&Command::Pause));

        // Playing before the hold: resumes.
        let mut player = ScriptedPlayer::ready(100.0).at(30.0).playing();
        engine.start_hold(&mut player, HoldDirection::Forward, 0.5, base);
        engine.stop_hold(&mut player);
        assert_eq!(player.snapshot.current_time, 30.0);
        assert!(player.snapshot.is_playing);
    }

    #[test]
    fn first_tick_may_seek_immediately() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(50.0);
        engine.start_hold(&mut player, HoldDirection::Forward, 2.0, base);
        engine.tick(&mut player, ms(base, 16));
        // 16 ms at 2x from anchor 50.
        let last = *player.seeks().last().unwrap();
        assert!((last - 50.032).abs() < 1e-6);
    }

    #[test]
    fn ticks_are_throttled_to_the_seek_interval() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(600.0).at(300.0);
        engine.start_hold(&mut player, HoldDirection::Rewind, 1.0, base);
        let prebuffer_seeks = player.seeks().len();

        // A fast scheduler: one tick every 10 ms for a second.
        let mut issued_at = Vec::new();
        for i in 0..100 {
            let now = ms(base, i * 10);
            let before = player.seeks().len();
            engine.tick(&mut player, now);
            if player.seeks().len() > before {
                issued_at.push(i * 10);
            }
        }

        assert!(issued_at.len() > 2);
        for pair in issued_at.windows(2) {
            assert!(
                pair[1] - pair[0] >= 150,
                "seeks {}ms apart, wanted >= 150ms",
                pair[1] - pair[0]
            );
        }
        // And the scan actually moved backwards from the anchor.
        let seeks = player.seeks();
        let scan = &seeks[prebuffer_seeks..];
        assert!(scan.windows(2).all(|w| w[1] <= w[0]));
        assert!(*scan.last().unwrap() < 300.0);
    }

    #[test]
    fn rewind_scan_clamps_at_zero() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(1.0);
        engine.start_hold(&mut player, HoldDirection::RewindFast, 8.0, base);
        engine.tick(&mut player, ms(base, 1000));
        assert_eq!(*player.seeks().last().unwrap(), 0.0);
    }

    #[test]
    fn forward_scan_clamps_at_duration() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(99.0);
        engine.start_hold(&mut player, HoldDirection::ForwardFast, 8.0, base);
        engine.tick(&mut player, ms(base, 2000));
        assert_eq!(*player.seeks().last().unwrap(), 100.0);
    }

    #[test]
    fn unknown_duration_leaves_forward_unbounded() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(0.0).at(10.0);
        engine.start_hold(&mut player, HoldDirection::Forward, 4.0, base);
        engine.tick(&mut player, ms(base, 5000));
        // 5 s at 4x: way past where any zero duration would have clamped.
        assert!(*player.seeks().last().unwrap() > 10.0);
    }

    #[test]
    fn replacing_a_hold_leaves_only_the_new_sessions_effects() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(50.0);

        engine.start_hold(&mut player, HoldDirection::Rewind, 1.0, base);
        engine.tick(&mut player, ms(base, 200));
        let rewind_target = *player.seeks().last().unwrap();
        assert!(rewind_target < 50.0);

        // Direction change without an intervening stop; fresh anchor at the
        // position the rewind left behind.
        engine.start_hold(&mut player, HoldDirection::Forward, 1.0, ms(base, 300));
        assert_eq!(engine.hold_direction(), Some(HoldDirection::Forward));

        engine.tick(&mut player, ms(base, 500));
        let forward_target = *player.seeks().last().unwrap();
        // 200 ms at 1x beyond the new anchor; an A-session tick would have
        // produced a target below it.
        assert!((forward_target - (rewind_target + 0.2)).abs() < 1e-6);
    }

    #[test]
    fn rate_based_forward_hold_plays_at_capped_rate() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(20.0).with_forward_rate_holds();

        engine.start_hold(&mut player, HoldDirection::ForwardFast, 8.0, base);
        // Max advertised rate is 2.0; the request is capped, then play.
        assert_eq!(
            player.commands,
            vec![Command::Rate(2.0), Command::Play]
        );

        // No periodic seeking for rate-based sessions.
        engine.tick(&mut player, ms(base, 500));
        assert!(player.seeks().is_empty());
    }

    #[test]
    fn rate_based_hold_restores_rate_and_pauses_on_release() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).with_forward_rate_holds();
        player.rate = 0.5;

        engine.start_hold(&mut player, HoldDirection::Forward, 1.5, base);
        engine.stop_hold(&mut player);

        // Rate back to what it was, and an explicit pause: the hold left
        // the player actually playing.
        assert_eq!(player.rate, 0.5);
        assert_eq!(player.commands.last(), Some(&Command::Pause));
        assert!(!player.snapshot.is_playing);
    }

    #[test]
    fn direction_change_out_of_rate_hold_restores_rate() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(40.0).with_forward_rate_holds();
        player.rate = 1.0;

        engine.start_hold(&mut player, HoldDirection::Forward, 1.5, base);
        assert_eq!(player.rate, 1.5);

        engine.start_hold(&mut player, HoldDirection::Rewind, 0.5, ms(base, 100));
        // The replaced rate session must not leak its altered rate.
        assert_eq!(player.rate, 1.0);
        assert_eq!(engine.hold_direction(), Some(HoldDirection::Rewind));
    }

    #[test]
    fn stop_hold_is_idempotent() {
        let mut engine = ScrubEngine::new();
        let mut player = ScriptedPlayer::ready(100.0);
        engine.stop_hold(&mut player);
        engine.stop_hold(&mut player);
        assert!(player.commands.is_empty());
    }

    #[test]
    fn abandon_forgets_session_without_commands() {
        let mut engine = ScrubEngine::new();
        let base = t0();
        let mut player = ScriptedPlayer::ready(100.0).at(10.0);
        engine.start_hold(&mut player, HoldDirection::Forward, 1.0, base);
        let issued = player.commands.len();

        engine.abandon_hold();
        assert!(!engine.is_holding());
        engine.tick(&mut player, ms(base, 500));
        assert_eq!(player.commands.len(), issued);
    }

    #[test]
    fn step_preset_sizes() {
        assert_eq!(StepPreset::Fine.seconds(), 0.033);
        assert_eq!(StepPreset::Medium.seconds(), 0.05);
        assert_eq!(StepPreset::Coarse.seconds(), 0.1);
        assert_eq!(StepPreset::default(), StepPreset::Medium);
    }
}
