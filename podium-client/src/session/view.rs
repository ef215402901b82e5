use crate::registry::{ProducerInfo, Registry, RemoteStream};
use crate::session::state::{ConnectionStatus, Session};
use podium_core::{MediaKind, Participant};

/// Read-only snapshot published after every processed command or event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub session: Session,
    pub registry: Registry,
    pub remote_streams: Vec<RemoteStream>,
}

impl SessionView {
    pub(crate) fn new(session: &Session, registry: &Registry) -> Self {
        Self {
            session: session.clone(),
            registry: registry.clone(),
            remote_streams: registry.remote_streams(),
        }
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.session.state.connection_status()
    }

    pub fn is_connected(&self) -> bool {
        self.connection() == ConnectionStatus::Connected
    }

    pub fn is_streaming(&self) -> bool {
        self.session.streaming
    }

    pub fn participants(&self) -> &[Participant] {
        self.registry.participants()
    }

    pub fn local_producer(&self, kind: MediaKind) -> Option<&ProducerInfo> {
        self.registry.producer_of_kind(kind)
    }

    /// Whether the local `kind` producer exists and is not paused.
    pub fn is_sending(&self, kind: MediaKind) -> bool {
        self.local_producer(kind).is_some_and(|p| !p.paused)
    }

    pub fn hls_url(&self) -> Option<&str> {
        self.registry.hls().url.as_deref()
    }
}
