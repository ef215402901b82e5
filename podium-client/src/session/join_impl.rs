use crate::diagnostics::DiagnosticEvent;
use crate::error::{SessionError, SignalError, TransportError};
use crate::hls::HlsStatus;
use crate::negotiator::TransportNegotiator;
use crate::registry::RegistryEvent;
use crate::session::command::Reply;
use crate::session::{JoinParams, Session, SessionCoordinator, SessionLink, SessionState};
use crate::signaling::{ChannelEvent, SignalChannel};
use podium_core::{ClientRequest, Direction, ExistingProducer, Participant, RoomJoined};
use serde::de::IgnoredAny;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

impl SessionCoordinator {
    /// Idle -> connecting -> joining. The reply is held until the
    /// room snapshot arrives.
    pub(super) async fn join(&mut self, params: JoinParams, reply: Reply<()>) {
        if self.session.state != SessionState::Idle {
            let _ = reply.send(Err(SessionError::InvalidState {
                action: "join",
                state: self.session.state.as_str(),
            }));
            return;
        }

        info!(
            "Joining room {} as {} ({})",
            params.room_id, params.name, params.role
        );
        let room_id = params.room_id.clone();
        let name = params.name.clone();
        let role = params.role;
        self.session = Session::starting(params);
        self.set_state(SessionState::Connecting);

        let (channel, events) = match self.open_channel().await {
            Ok(opened) => opened,
            Err(e) => {
                let err = SessionError::Connect(e);
                self.fault(&err).await;
                let _ = reply.send(Err(err));
                return;
            }
        };
        self.deps.diagnostics.record(DiagnosticEvent::ChannelConnected);

        let negotiator = TransportNegotiator::new(
            channel.clone(),
            self.deps.backend.clone(),
            self.deps.diagnostics.clone(),
        );
        self.link = Some(SessionLink {
            channel: channel.clone(),
            events,
            negotiator,
            local_tracks: Vec::new(),
        });
        self.set_state(SessionState::Joining);

        let request = ClientRequest::JoinRoom {
            room_id,
            name,
            role,
        };
        match channel.request_ack::<IgnoredAny>(request).await {
            Ok(_) => {
                debug!("Join accepted, waiting for room snapshot");
                self.pending_join = Some(reply);
                self.join_deadline = Some(Instant::now() + self.config.request_timeout());
            }
            Err(e @ SignalError::Server { .. }) => {
                let err = SessionError::Signal(e);
                self.reject_join(&err).await;
                let _ = reply.send(Err(err));
            }
            Err(e) => {
                let err = SessionError::Signal(e);
                self.fault(&err).await;
                let _ = reply.send(Err(err));
            }
        }
    }

    /// The server refused the join: back to idle, nothing left open.
    async fn reject_join(&mut self, err: &SessionError) {
        warn!("Join refused: {}", err);
        self.release().await;
        self.session.last_error = Some(err.to_string());
        self.set_state(SessionState::Idle);
    }

    /// The room snapshot never came after an accepted join.
    pub(super) async fn on_join_timeout(&mut self) {
        let Some(reply) = self.pending_join.take() else {
            return;
        };
        let err = SessionError::Signal(SignalError::Timeout {
            event: "room-joined",
            after: self.config.request_timeout(),
        });
        self.fault(&err).await;
        let _ = reply.send(Err(err));
    }

    /// Opens the signaling channel, retrying with a doubling backoff.
    async fn open_channel(
        &self,
    ) -> Result<(SignalChannel, mpsc::UnboundedReceiver<ChannelEvent>), TransportError> {
        let attempts = self.config.connect_attempts.max(1);
        let mut backoff = self.config.connect_backoff();
        let mut attempt = 1;

        loop {
            match SignalChannel::connect(
                self.deps.connector.as_ref(),
                self.config.request_timeout(),
            )
            .await
            {
                Ok(opened) => return Ok(opened),
                Err(e) if attempt < attempts => {
                    warn!(
                        "Connect attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, attempts, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Joining -> active: seeds the roster, negotiates the media plane and
    /// subscribes to everything already live in the room.
    pub(super) async fn on_room_joined(&mut self, joined: RoomJoined) {
        if self.session.state != SessionState::Joining {
            warn!("Ignoring room-joined while {}", self.session.state);
            return;
        }
        let Some(params) = self.session.params.clone() else {
            return;
        };

        let local = Participant::new(joined.participant_id.clone(), params.name, params.role);
        let hls = HlsStatus::resolve(
            joined.is_hls_enabled,
            joined.hls_url,
            self.config.hls_base_url.as_deref(),
            &params.room_id,
        );
        info!(
            "Joined room {} as {} with {} participants",
            params.room_id,
            joined.participant_id,
            joined.room.participants.len()
        );

        self.session.local_participant_id = Some(joined.participant_id.clone());
        self.registry.apply(RegistryEvent::RoomJoined {
            participants: joined.room.participants,
            local,
            hls,
        });

        if let Some(capabilities) = &joined.router_rtp_capabilities {
            let Some(link) = self.link.as_mut() else {
                return;
            };

            if let Err(e) = link.negotiator.load_capabilities(capabilities).await {
                let err = SessionError::from(e);
                self.fault(&err).await;
                if let Some(reply) = self.pending_join.take() {
                    let _ = reply.send(Err(err));
                }
                return;
            }

            for direction in [Direction::Send, Direction::Recv] {
                if let Err(e) = link.negotiator.create_transport(direction).await {
                    self.session
                        .fail(&format!("create {direction} transport"), &e);
                }
            }

            self.replay_producers(&joined.existing_producers).await;
            self.session.streaming = !joined.existing_producers.is_empty();
        }

        // A channel lost mid-negotiation is reported by its Disconnected
        // event, which also answers the pending join.
        if self.link.as_ref().is_some_and(|l| l.channel.is_connected()) {
            self.set_state(SessionState::Active);
            if let Some(reply) = self.pending_join.take() {
                let _ = reply.send(Ok(()));
            }
        }
    }

    async fn replay_producers(&mut self, existing: &[ExistingProducer]) {
        for producer in existing {
            if self.session.is_local(&producer.participant_id) {
                debug!("Skipping own producer {}", producer.producer_id);
                continue;
            }
            self.subscribe(&producer.producer_id, &producer.participant_id)
                .await;
        }
    }
}
