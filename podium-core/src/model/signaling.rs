use crate::model::ids::{ConsumerId, ParticipantId, ProducerId, RoomId, TransportId};
use crate::model::media::{Direction, MediaKind};
use crate::model::params::{DtlsParameters, RtpCapabilities, RtpParameters, TransportOptions};
use crate::model::participant::{Participant, ParticipantPatch, Role};
use crate::model::request::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Encoding or decoding failure of a signaling frame.
pub type FrameError = serde_json::Error;

/// Every event the client sends to the room service.
///
/// The same set is used for acknowledged requests and fire-and-forget
/// notifications; the caller picks the delivery mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientRequest {
    JoinRoom {
        room_id: RoomId,
        name: String,
        role: Role,
    },
    CreateTransport {
        direction: Direction,
    },
    ConnectTransport {
        transport_id: TransportId,
        dtls_parameters: DtlsParameters,
    },
    Produce {
        transport_id: TransportId,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    },
    Consume {
        producer_id: ProducerId,
        rtp_capabilities: RtpCapabilities,
    },
    StartHls {
        room_id: RoomId,
    },
    StopHls {
        room_id: RoomId,
    },
    ToggleMedia {
        room_id: RoomId,
        kind: MediaKind,
        enabled: bool,
    },
    CloseProducer {
        producer_id: ProducerId,
    },
}

impl ClientRequest {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientRequest::JoinRoom { .. } => "join-room",
            ClientRequest::CreateTransport { .. } => "create-transport",
            ClientRequest::ConnectTransport { .. } => "connect-transport",
            ClientRequest::Produce { .. } => "produce",
            ClientRequest::Consume { .. } => "consume",
            ClientRequest::StartHls { .. } => "start-hls",
            ClientRequest::StopHls { .. } => "stop-hls",
            ClientRequest::ToggleMedia { .. } => "toggle-media",
            ClientRequest::CloseProducer { .. } => "close-producer",
        }
    }
}

/// Unsolicited events pushed by the room service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerPush {
    RoomJoined(RoomJoined),
    NewParticipant {
        participant: Participant,
    },
    ParticipantLeft {
        participant_id: ParticipantId,
    },
    ParticipantUpdated {
        participant_id: ParticipantId,
        patch: ParticipantPatch,
    },
    NewProducer {
        producer_id: ProducerId,
        participant_id: ParticipantId,
    },
    ProducerClosed {
        producer_id: ProducerId,
    },
    HlsStatus {
        is_hls_enabled: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hls_url: Option<String>,
    },
}

impl ServerPush {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerPush::RoomJoined(_) => "room-joined",
            ServerPush::NewParticipant { .. } => "new-participant",
            ServerPush::ParticipantLeft { .. } => "participant-left",
            ServerPush::ParticipantUpdated { .. } => "participant-updated",
            ServerPush::NewProducer { .. } => "new-producer",
            ServerPush::ProducerClosed { .. } => "producer-closed",
            ServerPush::HlsStatus { .. } => "hls-status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoined {
    pub room: RoomSnapshot,
    pub participant_id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_rtp_capabilities: Option<RtpCapabilities>,
    #[serde(default)]
    pub existing_producers: Vec<ExistingProducer>,
    #[serde(default)]
    pub is_hls_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingProducer {
    pub producer_id: ProducerId,
    pub participant_id: ParticipantId,
}

/// Acknowledgement payload of `produce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub id: ProducerId,
}

/// Acknowledgement payload of `consume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResponse {
    pub id: ConsumerId,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
    pub producer_id: ProducerId,
}

/// Acknowledgement of the create-transport request.
pub type CreateTransportResponse = TransportOptions;

/// Outgoing frame: `{"event", "data"}` plus `"id"` when an ack is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFrame {
    pub id: Option<RequestId>,
    pub request: ClientRequest,
}

impl ClientFrame {
    pub fn request(id: RequestId, request: ClientRequest) -> Self {
        Self {
            id: Some(id),
            request,
        }
    }

    pub fn notify(request: ClientRequest) -> Self {
        Self { id: None, request }
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        let mut value = serde_json::to_value(&self.request)?;
        if let (Some(id), Value::Object(map)) = (self.id, &mut value) {
            map.insert("id".to_owned(), serde_json::to_value(id)?);
        }
        serde_json::to_string(&value)
    }

    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        let id = match value.get("id") {
            Some(id) => Some(serde_json::from_value(id.clone())?),
            None => None,
        };
        let request = serde_json::from_value(value)?;
        Ok(Self { id, request })
    }
}

/// Server acknowledgement of a correlated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckFrame {
    pub ack: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckFrame {
    pub fn ok(ack: RequestId, payload: Value) -> Self {
        Self {
            ack,
            ok: Some(payload),
            error: None,
        }
    }

    pub fn error(ack: RequestId, message: impl Into<String>) -> Self {
        Self {
            ack,
            ok: None,
            error: Some(message.into()),
        }
    }

    /// Success payload, or the server-reported message. A bare ack is `null`.
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.ok.unwrap_or(Value::Null)),
        }
    }
}

/// Incoming frame: either an acknowledgement or a push.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    Ack(AckFrame),
    Push(ServerPush),
}

impl ServerFrame {
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        if value.get("ack").is_some() {
            Ok(ServerFrame::Ack(serde_json::from_value(value)?))
        } else {
            Ok(ServerFrame::Push(serde_json::from_value(value)?))
        }
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        match self {
            ServerFrame::Ack(ack) => serde_json::to_string(ack),
            ServerFrame::Push(push) => serde_json::to_string(push),
        }
    }
}
