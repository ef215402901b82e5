use crate::error::SignalError;
use crate::negotiator::backend::TransportSignaler;
use crate::signaling::SignalChannel;
use async_trait::async_trait;
use podium_core::{
    ClientRequest, DtlsParameters, MediaKind, ProduceResponse, ProducerId, RtpParameters,
    TransportId,
};
use serde::de::IgnoredAny;
use tracing::debug;

/// Answers transport callbacks with signaling round trips.
pub(crate) struct ChannelSignaler {
    channel: SignalChannel,
}

impl ChannelSignaler {
    pub(crate) fn new(channel: SignalChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl TransportSignaler for ChannelSignaler {
    async fn connect(
        &self,
        transport_id: &TransportId,
        dtls_parameters: DtlsParameters,
    ) -> Result<(), SignalError> {
        self.channel
            .request_ack::<IgnoredAny>(ClientRequest::ConnectTransport {
                transport_id: transport_id.clone(),
                dtls_parameters,
            })
            .await?;

        debug!("Transport {} connected", transport_id);
        Ok(())
    }

    async fn produce(
        &self,
        transport_id: &TransportId,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    ) -> Result<ProducerId, SignalError> {
        let response: ProduceResponse = self
            .channel
            .request_ack(ClientRequest::Produce {
                transport_id: transport_id.clone(),
                kind,
                rtp_parameters,
            })
            .await?;

        Ok(response.id)
    }
}
