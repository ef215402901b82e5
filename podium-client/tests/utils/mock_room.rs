use async_trait::async_trait;
use podium_client::{Connector, SignalTransport, TransportError};
use podium_core::{
    AckFrame, ClientFrame, ClientRequest, Direction, ExistingProducer, Participant, ParticipantId,
    ProducerId, RoomJoined, RoomSnapshot, RtpCapabilities, RtpCodecCapability, ServerFrame,
    ServerPush,
};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

/// How the fake room answers one request event.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Error(String),
    /// Never acknowledge.
    Silent,
}

struct RoomState {
    requests: Vec<ClientRequest>,
    to_client: Option<mpsc::UnboundedSender<String>>,
    connects: u32,
    refuse_connects: u32,
    local_id: ParticipantId,
    participants: Vec<Participant>,
    existing_producers: Vec<ExistingProducer>,
    capabilities: Option<RtpCapabilities>,
    hls_enabled: bool,
    hls_url: Option<String>,
    auto_room_joined: bool,
    overrides: HashMap<&'static str, Reply>,
    consume_overrides: HashMap<ProducerId, Reply>,
}

impl RoomState {
    fn send(&self, frame: ServerFrame) {
        let Some(to_client) = &self.to_client else {
            return;
        };
        let text = frame.encode().expect("encode server frame");
        let _ = to_client.send(text);
    }

    fn room_joined(&self) -> RoomJoined {
        RoomJoined {
            room: RoomSnapshot {
                participants: self.participants.clone(),
            },
            participant_id: self.local_id.clone(),
            router_rtp_capabilities: self.capabilities.clone(),
            existing_producers: self.existing_producers.clone(),
            is_hls_enabled: self.hls_enabled,
            hls_url: self.hls_url.clone(),
        }
    }
}

/// Scripted in-memory room service.
///
/// Answers every request with a plausible default unless overridden with
/// [`MockRoom::reply`], and records everything the client sent.
#[derive(Clone)]
pub struct MockRoom {
    state: Arc<Mutex<RoomState>>,
}

impl MockRoom {
    /// Room with one host `alice`; the client is assigned `me`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RoomState {
                requests: Vec::new(),
                to_client: None,
                connects: 0,
                refuse_connects: 0,
                local_id: ParticipantId::from("me"),
                participants: vec![Participant::new(
                    ParticipantId::from("alice"),
                    "Alice",
                    podium_core::Role::Host,
                )],
                existing_producers: Vec::new(),
                capabilities: Some(router_capabilities()),
                hls_enabled: false,
                hls_url: None,
                auto_room_joined: true,
                overrides: HashMap::new(),
                consume_overrides: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().expect("mock room state poisoned")
    }

    pub fn with_participants(self, participants: Vec<Participant>) -> Self {
        self.lock().participants = participants;
        self
    }

    /// `(producer, participant)` pairs already live when the client joins.
    pub fn with_existing_producers(self, producers: &[(&str, &str)]) -> Self {
        self.lock().existing_producers = producers
            .iter()
            .map(|(producer, participant)| ExistingProducer {
                producer_id: ProducerId::from(*producer),
                participant_id: ParticipantId::from(*participant),
            })
            .collect();
        self
    }

    pub fn without_capabilities(self) -> Self {
        self.lock().capabilities = None;
        self
    }

    pub fn with_hls(self, enabled: bool, url: Option<&str>) -> Self {
        {
            let mut state = self.lock();
            state.hls_enabled = enabled;
            state.hls_url = url.map(str::to_owned);
        }
        self
    }

    /// Acknowledge join-room but never send the room snapshot.
    pub fn without_room_joined(self) -> Self {
        self.lock().auto_room_joined = false;
        self
    }

    /// Fail the next `count` connection attempts.
    pub fn refuse_connects(self, count: u32) -> Self {
        self.lock().refuse_connects = count;
        self
    }

    pub fn reply(&self, event: &'static str, reply: Reply) {
        self.lock().overrides.insert(event, reply);
    }

    /// Answers `consume` of one producer differently from the rest.
    pub fn reply_consume(&self, producer_id: &str, reply: Reply) {
        self.lock()
            .consume_overrides
            .insert(ProducerId::from(producer_id), reply);
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(MockConnector { room: self.clone() })
    }

    pub fn push(&self, push: ServerPush) {
        self.lock().send(ServerFrame::Push(push));
    }

    /// Closes the connection from the server side.
    pub fn drop_connection(&self) {
        self.lock().to_client = None;
    }

    pub fn connects(&self) -> u32 {
        self.lock().connects
    }

    pub fn requests(&self) -> Vec<ClientRequest> {
        self.lock().requests.clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.event_name() == event)
            .count()
    }

    /// Waits until `event` was received at least `count` times.
    pub async fn wait_for_requests(&self, event: &str, count: usize, timeout_ms: u64) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.count(event) >= count {
                return true;
            }
            if tokio::time::Instant::now() > deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn handle(&self, text: &str) {
        let frame = ClientFrame::decode(text).expect("client sent an invalid frame");
        let event = frame.request.event_name();
        let mut state = self.lock();
        state.requests.push(frame.request.clone());

        let per_producer = match &frame.request {
            ClientRequest::Consume { producer_id, .. } => {
                state.consume_overrides.get(producer_id).cloned()
            }
            _ => None,
        };
        let reply = per_producer
            .or_else(|| state.overrides.get(event).cloned())
            .unwrap_or_else(|| default_reply(&frame.request));

        let accepted = !matches!(reply, Reply::Error(_));
        if let Some(id) = frame.id {
            match reply {
                Reply::Ok(payload) => state.send(ServerFrame::Ack(AckFrame::ok(id, payload))),
                Reply::Error(message) => {
                    state.send(ServerFrame::Ack(AckFrame::error(id, message)))
                }
                Reply::Silent => {}
            }
        }

        if matches!(frame.request, ClientRequest::JoinRoom { .. })
            && accepted
            && state.auto_room_joined
        {
            let joined = state.room_joined();
            state.send(ServerFrame::Push(ServerPush::RoomJoined(joined)));
        }
    }
}

impl Default for MockRoom {
    fn default() -> Self {
        Self::new()
    }
}

fn default_reply(request: &ClientRequest) -> Reply {
    match request {
        ClientRequest::CreateTransport { direction } => Reply::Ok(transport_options(*direction)),
        ClientRequest::Produce { kind, .. } => Reply::Ok(json!({ "id": format!("me-{kind}") })),
        ClientRequest::Consume { producer_id, .. } => Reply::Ok(json!({
            "id": format!("consumer-{producer_id}"),
            "kind": kind_of(producer_id),
            "rtpParameters": {},
            "producerId": producer_id,
        })),
        _ => Reply::Ok(Value::Null),
    }
}

/// Producer ids in tests end with their kind, e.g. `alice-audio`.
pub fn kind_of(producer_id: &ProducerId) -> &'static str {
    if producer_id.as_str().ends_with("audio") {
        "audio"
    } else {
        "video"
    }
}

pub fn transport_options(direction: Direction) -> Value {
    json!({
        "id": format!("{direction}-transport"),
        "iceParameters": {"usernameFragment": "frag", "password": "secret"},
        "iceCandidates": [{
            "foundation": "udpcandidate",
            "priority": 1076302079u32,
            "ip": "127.0.0.1",
            "protocol": "udp",
            "port": 40000,
            "type": "host"
        }],
        "dtlsParameters": {
            "role": "auto",
            "fingerprints": [{"algorithm": "sha-256", "value": "AB:CD"}]
        }
    })
}

pub fn router_capabilities() -> RtpCapabilities {
    let codec = |kind, mime: &str, clock_rate, channels| RtpCodecCapability {
        kind,
        mime_type: mime.to_owned(),
        clock_rate,
        channels,
        preferred_payload_type: None,
        parameters: Map::new(),
        rtcp_feedback: Vec::new(),
    };

    RtpCapabilities {
        codecs: vec![
            codec(podium_core::MediaKind::Audio, "audio/opus", 48000, Some(2)),
            codec(podium_core::MediaKind::Video, "video/VP8", 90000, None),
        ],
        header_extensions: Vec::new(),
    }
}

struct MockConnector {
    room: MockRoom,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn SignalTransport>, TransportError> {
        let (to_client, from_server) = mpsc::unbounded_channel();
        let (to_server, mut from_client) = mpsc::unbounded_channel::<String>();

        {
            let mut state = self.room.lock();
            state.connects += 1;
            if state.refuse_connects > 0 {
                state.refuse_connects -= 1;
                return Err(TransportError::Other("connection refused".to_owned()));
            }
            state.to_client = Some(to_client);
        }

        let room = self.room.clone();
        tokio::spawn(async move {
            while let Some(text) = from_client.recv().await {
                room.handle(&text);
            }
        });

        Ok(Box::new(MemoryTransport {
            to_server,
            from_server,
        }))
    }
}

/// Client end of an in-memory signaling connection.
pub struct MemoryTransport {
    to_server: mpsc::UnboundedSender<String>,
    from_server: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl SignalTransport for MemoryTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.to_server
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.from_server.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.from_server.close();
        Ok(())
    }
}
