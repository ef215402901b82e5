//! Client-side orchestration of an SFU media session: signaling,
//! transport negotiation, the room roster and the session lifecycle.

pub mod config;
pub mod devices;
pub mod diagnostics;
pub mod error;
pub mod hls;
pub mod negotiator;
pub mod registry;
pub mod session;
pub mod signaling;

pub use config::SessionConfig;
pub use devices::{LocalTrack, MediaDevices, SampleTrack, SampleTrackDevices};
pub use diagnostics::{DiagnosticEntry, DiagnosticEvent, Diagnostics};
pub use error::{
    BackendError, DeviceError, NegotiationError, SessionError, SignalError, TransportError,
};
pub use hls::HlsStatus;
pub use negotiator::{
    ConnectionStateListener, Consumer, ConsumerOptions, MediaBackend, Producer, RecvTransport,
    RemoteTrack, SendTransport, TransportNegotiator, TransportSignaler,
};
pub use registry::{ConsumerInfo, ProducerInfo, Registry, RegistryEvent, RemoteStream};
pub use session::{
    ConnectionStatus, JoinParams, Session, SessionCommand, SessionCoordinator, SessionDeps,
    SessionHandle, SessionState, SessionView, spawn_session,
};
pub use signaling::{ChannelEvent, Connector, SignalChannel, SignalTransport, WsConnector, WsTransport};
