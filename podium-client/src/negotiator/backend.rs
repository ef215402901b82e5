//! Seam to the capability/transport library that owns the actual media
//! engine. The negotiator only drives it; it never inspects RTP itself.

use crate::devices::LocalTrack;
use crate::error::{BackendError, SignalError};
use async_trait::async_trait;
use podium_core::{
    ConsumerId, DtlsParameters, MediaKind, ProducerId, RtpCapabilities, RtpParameters,
    TransportId, TransportOptions,
};
use std::sync::Arc;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Connection state notifications of one transport.
pub type ConnectionStateListener = Box<dyn Fn(RTCPeerConnectionState) + Send + Sync>;

/// Callbacks a transport raises while negotiating.
///
/// Returning `Ok` lets the transport proceed; returning `Err` aborts the
/// attempt that raised the callback.
#[async_trait]
pub trait TransportSignaler: Send + Sync {
    /// Raised once, before the first media flows, with the local DTLS role
    /// and fingerprints.
    async fn connect(
        &self,
        transport_id: &TransportId,
        dtls_parameters: DtlsParameters,
    ) -> Result<(), SignalError>;

    /// Raised by send transports for every new producer; resolves with the
    /// server-assigned producer id.
    async fn produce(
        &self,
        transport_id: &TransportId,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    ) -> Result<ProducerId, SignalError>;
}

#[async_trait]
pub trait MediaBackend: Send + Sync + 'static {
    /// Loads the router capabilities; resolves with the capabilities this
    /// client receives with. Fails when the environment can not handle them.
    async fn load(&self, router_capabilities: &RtpCapabilities)
    -> Result<RtpCapabilities, BackendError>;

    async fn create_send_transport(
        &self,
        options: TransportOptions,
        signaler: Arc<dyn TransportSignaler>,
    ) -> Result<Box<dyn SendTransport>, BackendError>;

    async fn create_recv_transport(
        &self,
        options: TransportOptions,
        signaler: Arc<dyn TransportSignaler>,
    ) -> Result<Box<dyn RecvTransport>, BackendError>;
}

#[async_trait]
pub trait SendTransport: Send + Sync {
    fn id(&self) -> &TransportId;

    fn on_connection_state_change(&self, listener: ConnectionStateListener);

    async fn produce(&self, track: Arc<dyn LocalTrack>) -> Result<Box<dyn Producer>, BackendError>;

    async fn close(&self);
}

#[async_trait]
pub trait RecvTransport: Send + Sync {
    fn id(&self) -> &TransportId;

    fn on_connection_state_change(&self, listener: ConnectionStateListener);

    async fn consume(&self, options: ConsumerOptions) -> Result<Box<dyn Consumer>, BackendError>;

    async fn close(&self);
}

/// Server answer to `consume`, handed to the receive transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerOptions {
    pub id: ConsumerId,
    pub producer_id: ProducerId,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
}

#[async_trait]
pub trait Producer: Send + Sync {
    fn id(&self) -> &ProducerId;

    fn kind(&self) -> MediaKind;

    fn paused(&self) -> bool;

    async fn pause(&self) -> Result<(), BackendError>;

    async fn resume(&self) -> Result<(), BackendError>;

    async fn close(&self);
}

#[async_trait]
pub trait Consumer: Send + Sync {
    fn id(&self) -> &ConsumerId;

    fn producer_id(&self) -> &ProducerId;

    fn kind(&self) -> MediaKind;

    fn track(&self) -> RemoteTrack;

    async fn close(&self);
}

/// Handle of a received track. Renderers resolve the actual media by id.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub kind: MediaKind,
}
