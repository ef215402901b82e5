use crate::negotiator::RemoteTrack;
use podium_core::{MediaKind, ParticipantId};

/// Everything received from one remote participant, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub participant_id: ParticipantId,
    pub audio: Option<RemoteTrack>,
    pub video: Option<RemoteTrack>,
}

impl RemoteStream {
    pub(crate) fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            audio: None,
            video: None,
        }
    }

    pub(crate) fn attach(&mut self, track: &RemoteTrack) {
        let slot = match track.kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        };
        if slot.is_none() {
            *slot = Some(track.clone());
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &RemoteTrack> {
        self.audio.iter().chain(self.video.iter())
    }
}
