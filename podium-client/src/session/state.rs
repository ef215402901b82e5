use podium_core::{ParticipantId, Role, RoomId};
use std::fmt;
use tracing::warn;

/// Lifecycle of one session.
///
/// ```text
/// idle -> connecting -> joining -> active -> leaving -> idle
///            \             \          \
///             +-------------+----------+--> faulted -> idle
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Joining,
    Active,
    Leaving,
    Faulted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Joining => "joining",
            SessionState::Active => "active",
            SessionState::Leaving => "leaving",
            SessionState::Faulted => "faulted",
        }
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        match self {
            SessionState::Active => ConnectionStatus::Connected,
            SessionState::Connecting | SessionState::Joining => ConnectionStatus::Connecting,
            SessionState::Idle | SessionState::Leaving | SessionState::Faulted => {
                ConnectionStatus::Disconnected
            }
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// What the local user asked to join as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinParams {
    pub room_id: RoomId,
    pub name: String,
    pub role: Role,
}

impl JoinParams {
    pub fn new(room_id: impl Into<RoomId>, name: impl Into<String>, role: Role) -> Self {
        Self {
            room_id: room_id.into(),
            name: name.into(),
            role,
        }
    }
}

/// The local user's session record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub params: Option<JoinParams>,
    pub local_participant_id: Option<ParticipantId>,
    pub state: SessionState,
    /// Local media is published, or remote media was already live at join.
    pub streaming: bool,
    pub last_error: Option<String>,
}

impl Session {
    pub(crate) fn starting(params: JoinParams) -> Self {
        Self {
            params: Some(params),
            ..Default::default()
        }
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.params.as_ref().map(|p| &p.room_id)
    }

    pub fn role(&self) -> Option<Role> {
        self.params.as_ref().map(|p| p.role)
    }

    pub fn is_viewer(&self) -> bool {
        self.role() == Some(Role::Viewer)
    }

    pub fn is_local(&self, participant_id: &ParticipantId) -> bool {
        self.local_participant_id.as_ref() == Some(participant_id)
    }

    /// Records a failed step without changing state.
    pub(crate) fn fail(&mut self, step: &str, error: &dyn std::error::Error) {
        warn!("{} failed: {}", step, error);
        self.last_error = Some(error.to_string());
    }
}
