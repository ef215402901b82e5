use crate::model::ids::ParticipantId;
use crate::model::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a participant joined the room with.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Guest,
    /// Watches the HLS relay only; never subscribes to SFU media on its own.
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => f.write_str("host"),
            Role::Guest => f.write_str("guest"),
            Role::Viewer => f.write_str("viewer"),
        }
    }
}

/// Room member as carried by roster pushes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_viewer: bool,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub has_audio: bool,
}

impl Participant {
    /// Entry for a freshly joined member with no published media.
    pub fn new(id: ParticipantId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            is_host: role == Role::Host,
            is_viewer: role == Role::Viewer,
            has_video: false,
            has_audio: false,
        }
    }

    pub fn has_media(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.has_audio,
            MediaKind::Video => self.has_video,
        }
    }

    /// Shallow merge: only fields present in the patch are overwritten.
    pub fn apply_patch(&mut self, patch: &ParticipantPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(is_host) = patch.is_host {
            self.is_host = is_host;
        }
        if let Some(is_viewer) = patch.is_viewer {
            self.is_viewer = is_viewer;
        }
        if let Some(has_video) = patch.has_video {
            self.has_video = has_video;
        }
        if let Some(has_audio) = patch.has_audio {
            self.has_audio = has_audio;
        }
    }
}

/// Partial update of a [`Participant`].
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_host: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_viewer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_video: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_audio: Option<bool>,
}

impl ParticipantPatch {
    /// Patch touching only the flag of the given media kind.
    pub fn media(kind: MediaKind, enabled: bool) -> Self {
        match kind {
            MediaKind::Audio => Self {
                has_audio: Some(enabled),
                ..Default::default()
            },
            MediaKind::Video => Self {
                has_video: Some(enabled),
                ..Default::default()
            },
        }
    }
}
