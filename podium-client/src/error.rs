use podium_core::{Direction, FrameError, ProducerId};
use std::time::Duration;
use thiserror::Error;

/// Raw signaling transport failure.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("transport closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Failure of a single request/acknowledge round trip.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("server rejected {event}: {message}")]
    Server { event: &'static str, message: String },

    #[error("{event} timed out after {after:?}")]
    Timeout {
        event: &'static str,
        after: Duration,
    },

    #[error("signaling channel closed")]
    ChannelClosed,

    #[error("failed to encode frame: {0}")]
    Encode(#[source] FrameError),

    #[error("unexpected {event} acknowledgement: {source}")]
    Decode {
        event: &'static str,
        #[source]
        source: FrameError,
    },
}

/// Failure reported by the media/transport library.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Camera/microphone acquisition failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no {0} device available")]
    Unavailable(&'static str),

    #[error("device access denied: {0}")]
    Denied(String),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("unsupported capabilities: {0}")]
    CapabilityLoad(#[source] BackendError),

    #[error("capabilities already loaded")]
    AlreadyLoaded,

    #[error("capabilities not loaded")]
    NotLoaded,

    #[error("{0} transport already exists")]
    TransportExists(Direction),

    #[error("no {0} transport")]
    NoTransport(Direction),

    #[error("already consuming producer {0}")]
    AlreadyConsuming(ProducerId),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("local media is already published")]
    AlreadyPublishing,

    #[error("no media kind is enabled for publishing")]
    NothingToPublish,

    #[error("failed to open signaling channel: {0}")]
    Connect(#[source] TransportError),

    #[error("signaling channel disconnected: {0}")]
    Disconnected(String),

    #[error("join cancelled")]
    Cancelled,

    #[error("session task is gone")]
    CoordinatorGone,

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl SessionError {
    /// Errors that tear the whole session down instead of failing one action.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Connect(_)
                | SessionError::Disconnected(_)
                | SessionError::Negotiation(NegotiationError::CapabilityLoad(_))
        )
    }
}
