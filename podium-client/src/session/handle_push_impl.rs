use crate::diagnostics::DiagnosticEvent;
use crate::error::{NegotiationError, SessionError};
use crate::hls::HlsStatus;
use crate::registry::RegistryEvent;
use crate::session::{SessionCoordinator, SessionState};
use crate::signaling::ChannelEvent;
use podium_core::{ParticipantId, ParticipantPatch, ProducerId, ServerPush};
use tracing::{debug, info, warn};

impl SessionCoordinator {
    pub(super) async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Push(push) => self.handle_push(push).await,
            ChannelEvent::Disconnected { reason } => self.on_disconnected(reason).await,
        }
    }

    async fn handle_push(&mut self, push: ServerPush) {
        match push {
            ServerPush::RoomJoined(joined) => self.on_room_joined(joined).await,

            ServerPush::NewParticipant { participant } => {
                info!("{} ({}) joined", participant.name, participant.id);
                self.registry
                    .apply(RegistryEvent::ParticipantJoined(participant));
            }

            ServerPush::ParticipantLeft { participant_id } => {
                if self.session.is_local(&participant_id) {
                    warn!("Server reported the local participant as gone, ignoring");
                    return;
                }
                info!("{} left", participant_id);
                self.registry
                    .apply(RegistryEvent::ParticipantLeft(participant_id.clone()));

                if let Some(link) = self.link.as_mut() {
                    for consumer_id in link.negotiator.close_consumers_of(&participant_id).await {
                        self.registry
                            .apply(RegistryEvent::ConsumerRemoved(consumer_id));
                    }
                }
            }

            ServerPush::ParticipantUpdated {
                participant_id,
                patch,
            } => {
                self.registry.apply(RegistryEvent::ParticipantUpdated {
                    id: participant_id,
                    patch,
                });
            }

            ServerPush::NewProducer {
                producer_id,
                participant_id,
            } => {
                if self.session.state != SessionState::Active {
                    debug!("Ignoring producer {} while {}", producer_id, self.session.state);
                } else if self.session.is_local(&participant_id) {
                    debug!("Skipping own producer {}", producer_id);
                } else if self.session.is_viewer() {
                    debug!("Viewer does not subscribe to {}", producer_id);
                } else {
                    self.subscribe(&producer_id, &participant_id).await;
                }
            }

            ServerPush::ProducerClosed { producer_id } => self.on_producer_closed(producer_id).await,

            ServerPush::HlsStatus {
                is_hls_enabled,
                hls_url,
            } => {
                let Some(room_id) = self.session.room_id() else {
                    return;
                };
                let hls = HlsStatus::resolve(
                    is_hls_enabled,
                    hls_url,
                    self.config.hls_base_url.as_deref(),
                    room_id,
                );
                info!("HLS relay {}", if hls.enabled { "on" } else { "off" });
                self.registry.apply(RegistryEvent::HlsChanged(hls));
            }
        }
    }

    /// Consumes a remote producer and records the consumer.
    pub(super) async fn subscribe(&mut self, producer_id: &ProducerId, participant_id: &ParticipantId) {
        let Some(link) = self.link.as_mut() else {
            return;
        };

        match link.negotiator.consume(producer_id, participant_id).await {
            Ok(consumer) => self.registry.apply(RegistryEvent::ConsumerAdded(consumer)),
            Err(NegotiationError::AlreadyConsuming(id)) => {
                debug!("Already consuming {}", id);
            }
            Err(e) => self
                .session
                .fail(&format!("consume {producer_id}"), &e),
        }
    }

    /// Closes whatever matches a server-closed producer: a consumer of it,
    /// or our own producer.
    async fn on_producer_closed(&mut self, producer_id: ProducerId) {
        let Some(link) = self.link.as_mut() else {
            return;
        };

        if let Some(consumer_id) = link.negotiator.close_consumer_for_producer(&producer_id).await {
            debug!("Remote producer {} closed", producer_id);
            self.registry
                .apply(RegistryEvent::ConsumerRemoved(consumer_id));
            return;
        }

        let Some(kind) = link.negotiator.close_producer(&producer_id).await else {
            debug!("producer-closed for unknown producer {}", producer_id);
            return;
        };
        link.local_tracks.retain(|track| {
            if track.kind() != kind {
                return true;
            }
            track.stop();
            false
        });
        let still_producing = link.negotiator.has_producers();

        warn!("Server closed local {} producer {}", kind, producer_id);
        self.registry
            .apply(RegistryEvent::ProducerRemoved(producer_id));
        if let Some(local_id) = self.session.local_participant_id.clone() {
            self.registry.apply(RegistryEvent::ParticipantUpdated {
                id: local_id,
                patch: ParticipantPatch::media(kind, false),
            });
        }
        if !still_producing {
            self.session.streaming = false;
        }
    }

    /// Channel lost without a local leave: tear down and fault.
    async fn on_disconnected(&mut self, reason: String) {
        if self.link.is_none() {
            return;
        }

        self.deps
            .diagnostics
            .record(DiagnosticEvent::ChannelDisconnected {
                reason: reason.clone(),
            });
        let err = SessionError::Disconnected(reason.clone());
        self.fault(&err).await;

        if let Some(reply) = self.pending_join.take() {
            let _ = reply.send(Err(SessionError::Disconnected(reason)));
        }
    }
}
