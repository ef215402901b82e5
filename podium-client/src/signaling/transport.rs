use crate::error::TransportError;
use async_trait::async_trait;

/// Reliable, ordered, bidirectional text-frame channel to the room service.
///
/// `recv` yields `None` once the remote side closed the channel.
#[async_trait]
pub trait SignalTransport: Send + 'static {
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens a fresh [`SignalTransport`] for every session attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn SignalTransport>, TransportError>;
}
