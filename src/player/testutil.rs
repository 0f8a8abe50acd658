//! Recording fake adapter shared by engine and shell tests.

use super::{HoldDirection, HoldTechnique, PlayerAdapter, PlayerSnapshot};

/// Every command a test player received, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    Play,
    Pause,
    Seek(f64),
    Rate(f64),
    Volume(f64),
}

/// A scripted in-memory player that applies commands instantly and records
/// them for assertions.
pub(crate) struct ScriptedPlayer {
    pub snapshot: PlayerSnapshot,
    pub commands: Vec<Command>,
    pub rates: Vec<f64>,
    pub rate: f64,
    /// Technique reported for forward directions (rewind always seeks).
    pub forward_technique: HoldTechnique,
}

impl ScriptedPlayer {
    /// A ready player positioned at 0 with the given duration.
    pub fn ready(duration: f64) -> Self {
        Self {
            snapshot: PlayerSnapshot {
                ready: true,
                duration,
                ..PlayerSnapshot::default()
            },
            commands: Vec::new(),
            rates: vec![0.25, 0.5, 1.0, 1.5, 2.0],
            rate: 1.0,
            forward_technique: HoldTechnique::DiscreteSeek,
        }
    }

    /// A backend that has not finished initializing.
    pub fn not_ready() -> Self {
        let mut player = Self::ready(0.0);
        player.snapshot.ready = false;
        player.rates.clear();
        player
    }

    pub fn at(mut self, seconds: f64) -> Self {
        self.snapshot.current_time = seconds;
        self
    }

    pub fn playing(mut self) -> Self {
        self.snapshot.is_playing = true;
        self
    }

    pub fn with_forward_rate_holds(mut self) -> Self {
        self.forward_technique = HoldTechnique::RateBased;
        self
    }

    /// Seek targets in issue order.
    pub fn seeks(&self) -> Vec<f64> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Seek(t) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl PlayerAdapter for ScriptedPlayer {
    fn play(&mut self) {
        if !self.snapshot.ready {
            return;
        }
        self.commands.push(Command::Play);
        self.snapshot.is_playing = true;
    }

    fn pause(&mut self) {
        if !self.snapshot.ready {
            return;
        }
        self.commands.push(Command::Pause);
        self.snapshot.is_playing = false;
    }

    fn seek_to(&mut self, seconds: f64) {
        if !self.snapshot.ready {
            return;
        }
        self.commands.push(Command::Seek(seconds));
        self.snapshot.current_time = seconds;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if !self.snapshot.ready {
            return;
        }
        self.commands.push(Command::Rate(rate));
        self.rate = rate;
    }

    fn set_volume(&mut self, percent: f64) {
        if !self.snapshot.ready {
            return;
        }
        self.commands.push(Command::Volume(percent));
        self.snapshot.volume = percent;
    }

    fn current_time(&self) -> f64 {
        self.snapshot.current_time
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn available_rates(&self) -> Vec<f64> {
        if self.snapshot.ready {
            self.rates.clone()
        } else {
            Vec::new()
        }
    }

    fn hold_technique(&self, direction: HoldDirection) -> HoldTechnique {
        if direction.is_rewind() {
            HoldTechnique::DiscreteSeek
        } else {
            self.forward_technique
        }
    }

    fn poll(&mut self) {}

    fn snapshot(&self) -> &PlayerSnapshot {
        &self.snapshot
    }
}
