use crate::error::DeviceError;
use async_trait::async_trait;
use podium_core::MediaKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Locally captured media track.
pub trait LocalTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> MediaKind;

    /// Releases the capture source. Idempotent.
    fn stop(&self);

    fn is_stopped(&self) -> bool;
}

/// Camera/microphone acquisition.
#[async_trait]
pub trait MediaDevices: Send + Sync + 'static {
    /// Acquires one track per requested kind, or nothing at all.
    async fn acquire(&self, kinds: &[MediaKind]) -> Result<Vec<Arc<dyn LocalTrack>>, DeviceError>;
}

/// Track fed by the application with encoded samples (Opus or VP8).
///
/// Stopping only marks the source released; the sample writer owns the
/// actual capture and must check [`LocalTrack::is_stopped`].
pub struct SampleTrack {
    kind: MediaKind,
    track: Arc<TrackLocalStaticSample>,
    stopped: AtomicBool,
}

impl SampleTrack {
    pub fn new(kind: MediaKind, id: String, stream_id: String) -> Self {
        let codec = match kind {
            MediaKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            MediaKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        };

        Self {
            kind,
            track: Arc::new(TrackLocalStaticSample::new(codec, id, stream_id)),
            stopped: AtomicBool::new(false),
        }
    }

    /// The underlying webrtc track to write samples into.
    ///
    /// The embedding [`MediaBackend`](crate::negotiator::MediaBackend) reads
    /// this when it produces the track, and the application keeps writing
    /// samples until [`LocalTrack::stop`] marks the source released.
    pub fn rtc_track(&self) -> Arc<TrackLocalStaticSample> {
        self.track.clone()
    }
}

impl LocalTrack for SampleTrack {
    fn id(&self) -> &str {
        self.track.id()
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            debug!("Stopped local {} track {}", self.kind, self.id());
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// [`MediaDevices`] handing out [`SampleTrack`]s.
pub struct SampleTrackDevices {
    stream_id: String,
    available: Vec<MediaKind>,
    issued: AtomicU64,
}

impl SampleTrackDevices {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self::with_kinds(stream_id, &MediaKind::ALL)
    }

    /// Source that only has devices for `available` kinds.
    pub fn with_kinds(stream_id: impl Into<String>, available: &[MediaKind]) -> Self {
        Self {
            stream_id: stream_id.into(),
            available: available.to_vec(),
            issued: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl MediaDevices for SampleTrackDevices {
    async fn acquire(&self, kinds: &[MediaKind]) -> Result<Vec<Arc<dyn LocalTrack>>, DeviceError> {
        if let Some(missing) = kinds.iter().find(|kind| !self.available.contains(kind)) {
            return Err(DeviceError::Unavailable(missing.as_str()));
        }

        let tracks = kinds
            .iter()
            .map(|&kind| {
                let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
                let id = format!("{}-{}-{}", self.stream_id, kind, n);
                Arc::new(SampleTrack::new(kind, id, self.stream_id.clone())) as Arc<dyn LocalTrack>
            })
            .collect();

        Ok(tracks)
    }
}
