//! Pure time arithmetic for stepping, jumping, and display formatting.
//!
//! Everything here is total and side-effect free; the scrub engine and UI
//! build on these primitives.

/// Clamp a time to `[0, duration]`.
///
/// Returns 0 for non-positive durations and negative times, `duration` for
/// anything past the end.
pub fn clamp_time(time: f64, duration: f64) -> f64 {
    if duration <= 0.0 || time < 0.0 {
        return 0.0;
    }
    if time > duration {
        return duration;
    }
    time
}

/// Direction of a single frame step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Back,
    Forward,
}

impl StepDirection {
    fn signum(self) -> f64 {
        match self {
            StepDirection::Back => -1.0,
            StepDirection::Forward => 1.0,
        }
    }
}

/// Step `current` by `step_size` in `direction`.
///
/// Clamped to `[0, duration]` when a duration is known, otherwise only
/// floored at 0 (forward stepping is unbounded while the backend has not
/// reported a duration yet).
pub fn step_time(
    current: f64,
    step_size: f64,
    direction: StepDirection,
    duration: Option<f64>,
) -> f64 {
    let next = current + direction.signum() * step_size;
    match duration {
        Some(d) => clamp_time(next, d),
        None => next.max(0.0),
    }
}

/// Jump by a signed number of seconds, with the same clamping policy as
/// [`step_time`].
pub fn jump_time(current: f64, delta: f64, duration: Option<f64>) -> f64 {
    let next = current + delta;
    match duration {
        Some(d) => clamp_time(next, d),
        None => next.max(0.0),
    }
}

/// Format seconds as `mm:ss.sss` for display.
///
/// Minutes grow without bound; seconds carry millisecond precision.
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let m = (seconds / 60.0).floor() as u64;
    let s = seconds - (m as f64) * 60.0;
    format!("{:02}:{:06.3}", m, s)
}
