use podium_core::MediaKind;
use serde::Deserialize;
use std::time::Duration;

/// Tunables of a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound for every acknowledged request.
    pub request_timeout_ms: u64,
    /// Attempts to open the signaling channel before the session faults.
    pub connect_attempts: u32,
    /// Initial delay between connect attempts, doubled after each failure.
    pub connect_backoff_ms: u64,
    /// Capacity of the coordinator command queue.
    pub command_buffer: usize,
    /// Base used to derive a playlist URL when the server sends none.
    pub hls_base_url: Option<String>,
    pub publish_audio: bool,
    pub publish_video: bool,
    pub diagnostics_capacity: usize,
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_backoff(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_ms)
    }

    /// Kinds acquired and produced by the publish action.
    pub fn publish_kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.publish_audio {
            kinds.push(MediaKind::Audio);
        }
        if self.publish_video {
            kinds.push(MediaKind::Video);
        }
        kinds
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            connect_attempts: 3,
            connect_backoff_ms: 250,
            command_buffer: 32,
            hls_base_url: None,
            publish_audio: true,
            publish_video: true,
            diagnostics_capacity: 512,
        }
    }
}
