//! Shareable deep-link state.
//!
//! A sparse, optional-field mirror of a subset of the settings plus the
//! loaded video identifier and last-known position, carried in URL query
//! parameters. Absent parameters leave the corresponding setting at its
//! persisted or default value.

use crate::video::VideoId;

/// Deep-link state parsed from or written to a query string.
///
/// `t` is written with 3-decimal precision; every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareState {
    pub video_id: Option<VideoId>,
    pub time: Option<f64>,
    pub speed: Option<f64>,
    pub slow_mo: Option<f64>,
    pub scrub_speed_slow: Option<f64>,
    pub scrub_speed_fast: Option<f64>,
}

impl ShareState {
    /// Parse a query string (with or without a leading `?`).
    ///
    /// Unknown keys and unparseable values are ignored.
    pub fn parse_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "v" => state.video_id = VideoId::parse(value),
                "t" => state.time = parse_number(value),
                "speed" => state.speed = parse_number(value),
                "slowMo" => state.slow_mo = parse_number(value),
                "scrubSpeedSlow" => state.scrub_speed_slow = parse_number(value),
                "scrubSpeed" => state.scrub_speed_fast = parse_number(value),
                _ => {}
            }
        }
        state
    }

    /// Build the canonical query string. Returns an empty string when no
    /// field is set.
    pub fn build_query(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(id) = &self.video_id {
            parts.push(format!("v={id}"));
        }
        if let Some(t) = finite(self.time) {
            parts.push(format!("t={t:.3}"));
        }
        if let Some(speed) = finite(self.speed) {
            parts.push(format!("speed={speed}"));
        }
        if let Some(slow_mo) = finite(self.slow_mo) {
            parts.push(format!("slowMo={slow_mo}"));
        }
        if let Some(slow) = finite(self.scrub_speed_slow) {
            parts.push(format!("scrubSpeedSlow={slow}"));
        }
        if let Some(fast) = finite(self.scrub_speed_fast) {
            parts.push(format!("scrubSpeed={fast}"));
        }
        parts.join("&")
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
