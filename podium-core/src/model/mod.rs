mod ids;
mod media;
mod params;
mod participant;
mod request;
mod signaling;

pub use ids::{ConsumerId, ParticipantId, ProducerId, RoomId, TransportId};
pub use media::{Direction, MediaKind};
pub use params::{
    DtlsFingerprint, DtlsParameters, DtlsRole, IceCandidate, IceParameters, RtcpFeedback,
    RtpCapabilities, RtpCodecCapability, RtpHeaderExtension, RtpParameters, TransportOptions,
};
pub use participant::{Participant, ParticipantPatch, Role};
pub use request::RequestId;
pub use signaling::{
    AckFrame, ClientFrame, ClientRequest, ConsumeResponse, CreateTransportResponse,
    ExistingProducer, FrameError, ProduceResponse, RoomJoined, RoomSnapshot, ServerFrame,
    ServerPush,
};
