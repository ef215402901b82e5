mod backend;
mod signaler;

pub use backend::{
    ConnectionStateListener, Consumer, ConsumerOptions, MediaBackend, Producer, RecvTransport,
    RemoteTrack, SendTransport, TransportSignaler,
};

use crate::devices::LocalTrack;
use crate::diagnostics::Diagnostics;
use crate::error::NegotiationError;
use crate::registry::{ConsumerInfo, ProducerInfo};
use crate::signaling::SignalChannel;
use podium_core::{
    ClientRequest, ConsumeResponse, ConsumerId, CreateTransportResponse, Direction, MediaKind,
    ParticipantId, ProducerId, RtpCapabilities, TransportId,
};
use signaler::ChannelSignaler;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

struct ConsumerEntry {
    participant_id: ParticipantId,
    consumer: Box<dyn Consumer>,
}

/// Owns the client side of the media plane for one session: the loaded
/// capabilities, at most one transport per direction, and every producer
/// and consumer created on them.
pub struct TransportNegotiator {
    channel: SignalChannel,
    backend: Arc<dyn MediaBackend>,
    diagnostics: Diagnostics,
    rtp_capabilities: Option<RtpCapabilities>,
    send_transport: Option<Box<dyn SendTransport>>,
    recv_transport: Option<Box<dyn RecvTransport>>,
    producers: HashMap<ProducerId, Box<dyn Producer>>,
    consumers: HashMap<ConsumerId, ConsumerEntry>,
    closed: bool,
}

impl TransportNegotiator {
    pub fn new(
        channel: SignalChannel,
        backend: Arc<dyn MediaBackend>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            channel,
            backend,
            diagnostics,
            rtp_capabilities: None,
            send_transport: None,
            recv_transport: None,
            producers: HashMap::new(),
            consumers: HashMap::new(),
            closed: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.rtp_capabilities.is_some()
    }

    pub fn has_transport(&self, direction: Direction) -> bool {
        match direction {
            Direction::Send => self.send_transport.is_some(),
            Direction::Recv => self.recv_transport.is_some(),
        }
    }

    pub fn has_producers(&self) -> bool {
        !self.producers.is_empty()
    }

    pub fn producer_of_kind(&self, kind: MediaKind) -> Option<ProducerInfo> {
        self.producers
            .values()
            .find(|p| p.kind() == kind)
            .map(|p| producer_info(p.as_ref()))
    }

    pub fn is_consuming(&self, producer_id: &ProducerId) -> bool {
        self.consumers
            .values()
            .any(|e| e.consumer.producer_id() == producer_id)
    }

    /// Loads the router capabilities. Allowed once per session.
    pub async fn load_capabilities(
        &mut self,
        router_capabilities: &RtpCapabilities,
    ) -> Result<(), NegotiationError> {
        if self.rtp_capabilities.is_some() {
            return Err(NegotiationError::AlreadyLoaded);
        }

        let capabilities = self
            .backend
            .load(router_capabilities)
            .await
            .map_err(NegotiationError::CapabilityLoad)?;

        info!(
            "Loaded router capabilities ({} codecs)",
            capabilities.codecs.len()
        );
        self.rtp_capabilities = Some(capabilities);
        Ok(())
    }

    /// Asks the server for transport parameters and builds the local
    /// transport for `direction`.
    pub async fn create_transport(
        &mut self,
        direction: Direction,
    ) -> Result<TransportId, NegotiationError> {
        if self.rtp_capabilities.is_none() {
            return Err(NegotiationError::NotLoaded);
        }
        if self.has_transport(direction) {
            return Err(NegotiationError::TransportExists(direction));
        }

        let options: CreateTransportResponse = self
            .channel
            .request_ack(ClientRequest::CreateTransport { direction })
            .await?;

        let transport_id = options.id.clone();
        let signaler: Arc<dyn TransportSignaler> =
            Arc::new(ChannelSignaler::new(self.channel.clone()));
        let listener = self
            .diagnostics
            .transport_listener(direction, transport_id.clone());

        match direction {
            Direction::Send => {
                let transport = self.backend.create_send_transport(options, signaler).await?;
                transport.on_connection_state_change(listener);
                self.send_transport = Some(transport);
            }
            Direction::Recv => {
                let transport = self.backend.create_recv_transport(options, signaler).await?;
                transport.on_connection_state_change(listener);
                self.recv_transport = Some(transport);
            }
        }

        info!("Created {} transport {}", direction, transport_id);
        Ok(transport_id)
    }

    /// Publishes `track` over the send transport.
    pub async fn produce(
        &mut self,
        track: Arc<dyn LocalTrack>,
    ) -> Result<ProducerInfo, NegotiationError> {
        let transport = self
            .send_transport
            .as_ref()
            .ok_or(NegotiationError::NoTransport(Direction::Send))?;

        let kind = track.kind();
        let producer = transport.produce(track).await?;
        let info = producer_info(producer.as_ref());
        info!("Producing {} as {}", kind, info.id);

        self.producers.insert(info.id.clone(), producer);
        Ok(info)
    }

    /// Subscribes to a remote producer owned by `participant_id`.
    ///
    /// Fails with [`NegotiationError::AlreadyConsuming`] when a consumer
    /// for the producer exists already.
    pub async fn consume(
        &mut self,
        producer_id: &ProducerId,
        participant_id: &ParticipantId,
    ) -> Result<ConsumerInfo, NegotiationError> {
        if self.is_consuming(producer_id) {
            return Err(NegotiationError::AlreadyConsuming(producer_id.clone()));
        }
        let rtp_capabilities = self
            .rtp_capabilities
            .clone()
            .ok_or(NegotiationError::NotLoaded)?;
        let transport = self
            .recv_transport
            .as_ref()
            .ok_or(NegotiationError::NoTransport(Direction::Recv))?;

        let response: ConsumeResponse = self
            .channel
            .request_ack(ClientRequest::Consume {
                producer_id: producer_id.clone(),
                rtp_capabilities,
            })
            .await?;

        let consumer = transport
            .consume(ConsumerOptions {
                id: response.id,
                producer_id: response.producer_id,
                kind: response.kind,
                rtp_parameters: response.rtp_parameters,
            })
            .await?;

        let info = ConsumerInfo {
            id: consumer.id().clone(),
            kind: consumer.kind(),
            participant_id: participant_id.clone(),
            producer_id: consumer.producer_id().clone(),
            track: consumer.track(),
        };
        debug!(
            "Consuming {} {} of {} as {}",
            info.kind, info.producer_id, participant_id, info.id
        );

        self.consumers.insert(
            info.id.clone(),
            ConsumerEntry {
                participant_id: participant_id.clone(),
                consumer,
            },
        );
        Ok(info)
    }

    /// Pauses or resumes a local producer.
    pub async fn set_paused(
        &mut self,
        producer_id: &ProducerId,
        paused: bool,
    ) -> Result<Option<ProducerInfo>, NegotiationError> {
        let Some(producer) = self.producers.get(producer_id) else {
            return Ok(None);
        };

        if paused {
            producer.pause().await?;
        } else {
            producer.resume().await?;
        }
        Ok(Some(producer_info(producer.as_ref())))
    }

    /// Closes one local producer; returns its kind when it existed.
    pub async fn close_producer(&mut self, producer_id: &ProducerId) -> Option<MediaKind> {
        let producer = self.producers.remove(producer_id)?;
        producer.close().await;
        debug!("Closed producer {}", producer_id);
        Some(producer.kind())
    }

    pub async fn close_producers(&mut self) -> Vec<ProducerInfo> {
        let mut closed = Vec::with_capacity(self.producers.len());
        for (_, producer) in self.producers.drain() {
            producer.close().await;
            closed.push(producer_info(producer.as_ref()));
        }
        closed
    }

    /// Closes the consumer of `producer_id`, if any.
    pub async fn close_consumer_for_producer(
        &mut self,
        producer_id: &ProducerId,
    ) -> Option<ConsumerId> {
        let consumer_id = self
            .consumers
            .iter()
            .find(|(_, e)| e.consumer.producer_id() == producer_id)
            .map(|(id, _)| id.clone())?;

        if let Some(entry) = self.consumers.remove(&consumer_id) {
            entry.consumer.close().await;
        }
        debug!("Closed consumer {} of producer {}", consumer_id, producer_id);
        Some(consumer_id)
    }

    /// Closes every consumer receiving from `participant_id`.
    pub async fn close_consumers_of(&mut self, participant_id: &ParticipantId) -> Vec<ConsumerId> {
        let ids: Vec<ConsumerId> = self
            .consumers
            .iter()
            .filter(|(_, e)| &e.participant_id == participant_id)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &ids {
            if let Some(entry) = self.consumers.remove(id) {
                entry.consumer.close().await;
            }
        }
        if !ids.is_empty() {
            debug!("Closed {} consumers of {}", ids.len(), participant_id);
        }
        ids
    }

    /// Closes consumers, producers and both transports. Idempotent.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for (_, entry) in self.consumers.drain() {
            entry.consumer.close().await;
        }
        for (_, producer) in self.producers.drain() {
            producer.close().await;
        }
        if let Some(transport) = self.recv_transport.take() {
            transport.close().await;
        }
        if let Some(transport) = self.send_transport.take() {
            transport.close().await;
        }
        self.rtp_capabilities = None;

        debug!("Media plane closed");
    }
}

fn producer_info(producer: &dyn Producer) -> ProducerInfo {
    ProducerInfo {
        id: producer.id().clone(),
        kind: producer.kind(),
        paused: producer.paused(),
    }
}
