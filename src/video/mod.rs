//! Video reference resolution.
//!
//! Turns a pasted link in one of the recognized shapes into an 11-character
//! video identifier. Pure and total: anything unrecognized, including empty
//! or whitespace-only input, resolves to `None`.

use std::fmt;

/// Length of a video identifier.
const ID_LEN: usize = 11;

/// URL fragments that directly precede an identifier.
const ID_MARKERS: [&str; 4] = [
    "youtube.com/watch?v=",
    "youtu.be/",
    "youtube.com/shorts/",
    "youtube.com/embed/",
];

/// A validated 11-character video identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    /// Validate a candidate identifier: exactly 11 characters from
    /// `[A-Za-z0-9_-]`.
    pub fn parse(candidate: &str) -> Option<Self> {
        if candidate.len() != ID_LEN {
            return None;
        }
        if !candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return None;
        }
        Some(VideoId(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch link for this identifier.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a video identifier from a pasted link.
///
/// Recognizes the canonical watch link, the short-link host, the shorts
/// path, the embed path, and a bare identifier.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    for marker in ID_MARKERS {
        if let Some(pos) = trimmed.find(marker) {
            let rest = &trimmed[pos + marker.len()..];
            let candidate: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if candidate.len() >= ID_LEN {
                return VideoId::parse(&candidate[..ID_LEN]);
            }
            // A marker followed by a malformed id is a rejection, not a
            // fall-through to the next shape.
            return None;
        }
    }

    // A bare id pasted without any URL around it.
    VideoId::parse(trimmed)
}
