use crate::error::{NegotiationError, SessionError};
use crate::registry::{ProducerInfo, RegistryEvent};
use crate::session::SessionCoordinator;
use podium_core::{ClientRequest, Direction, MediaKind, ParticipantPatch};
use tracing::{debug, info, warn};

impl SessionCoordinator {
    /// Acquires local tracks and produces each of them. Either every track
    /// ends up published or none does.
    pub(super) async fn publish(&mut self) -> Result<(), SessionError> {
        self.require_active("publish")?;
        let kinds = self.config.publish_kinds();
        if kinds.is_empty() {
            return Err(SessionError::NothingToPublish);
        }
        let Some(link) = self.link.as_mut() else {
            return Err(SessionError::Disconnected("no signaling channel".to_owned()));
        };

        if link.negotiator.has_producers() {
            return Err(SessionError::AlreadyPublishing);
        }
        if !link.negotiator.has_transport(Direction::Send) {
            return Err(NegotiationError::NoTransport(Direction::Send).into());
        }

        let tracks = self.deps.devices.acquire(&kinds).await?;

        let mut produced: Vec<ProducerInfo> = Vec::with_capacity(tracks.len());
        for track in &tracks {
            match link.negotiator.produce(track.clone()).await {
                Ok(info) => produced.push(info),
                Err(e) => {
                    warn!("Producing {} failed, rolling back publish", track.kind());
                    for info in &produced {
                        link.negotiator.close_producer(&info.id).await;
                        let request = ClientRequest::CloseProducer {
                            producer_id: info.id.clone(),
                        };
                        if let Err(err) = link.channel.emit(request) {
                            debug!("Could not announce rolled back producer {}: {}", info.id, err);
                        }
                    }
                    for track in &tracks {
                        track.stop();
                    }
                    return Err(e.into());
                }
            }
        }
        link.local_tracks.extend(tracks);

        for info in produced {
            self.set_local_media(info.kind, !info.paused);
            self.registry.apply(RegistryEvent::ProducerAdded(info));
        }
        self.session.streaming = true;
        info!("Local media published");
        Ok(())
    }

    /// Closes all local producers and releases the capture devices.
    pub(super) async fn unpublish(&mut self) -> Result<(), SessionError> {
        self.require_active("unpublish")?;
        let Some(link) = self.link.as_mut() else {
            return Ok(());
        };

        let closed = link.negotiator.close_producers().await;
        for track in link.local_tracks.drain(..) {
            track.stop();
        }
        for info in &closed {
            let request = ClientRequest::CloseProducer {
                producer_id: info.id.clone(),
            };
            if let Err(e) = link.channel.emit(request) {
                warn!("Failed to announce closed producer {}: {}", info.id, e);
            }
        }

        for info in closed {
            self.set_local_media(info.kind, false);
            self.registry.apply(RegistryEvent::ProducerRemoved(info.id));
        }
        self.session.streaming = false;
        info!("Local media unpublished");
        Ok(())
    }

    /// Pauses a running producer or resumes a paused one.
    pub(super) async fn toggle_media(
        &mut self,
        kind: MediaKind,
    ) -> Result<Option<bool>, SessionError> {
        self.require_active("toggle media")?;
        let room_id = self.session.room_id().cloned();
        let Some(link) = self.link.as_mut() else {
            return Ok(None);
        };
        let Some(current) = link.negotiator.producer_of_kind(kind) else {
            debug!("No {} producer to toggle", kind);
            return Ok(None);
        };

        let Some(updated) = link
            .negotiator
            .set_paused(&current.id, !current.paused)
            .await?
        else {
            return Ok(None);
        };
        let enabled = !updated.paused;

        if let Some(room_id) = room_id {
            let request = ClientRequest::ToggleMedia {
                room_id,
                kind,
                enabled,
            };
            if let Err(e) = link.channel.emit(request) {
                warn!("Failed to announce {} toggle: {}", kind, e);
            }
        }

        info!("Local {} {}", kind, if enabled { "resumed" } else { "paused" });
        self.registry.apply(RegistryEvent::ProducerPaused {
            id: updated.id,
            paused: updated.paused,
        });
        self.set_local_media(kind, enabled);
        Ok(Some(enabled))
    }

    /// Requests the HLS relay on or off. The outcome arrives as an
    /// `hls-status` push.
    pub(super) fn set_hls(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.require_active("toggle the HLS relay")?;
        let (Some(room_id), Some(link)) = (self.session.room_id().cloned(), self.link.as_ref())
        else {
            return Ok(());
        };

        let request = if enabled {
            ClientRequest::StartHls { room_id }
        } else {
            ClientRequest::StopHls { room_id }
        };
        link.channel.emit(request)?;
        Ok(())
    }

    fn set_local_media(&mut self, kind: MediaKind, enabled: bool) {
        if let Some(id) = self.session.local_participant_id.clone() {
            self.registry.apply(RegistryEvent::ParticipantUpdated {
                id,
                patch: ParticipantPatch::media(kind, enabled),
            });
        }
    }
}
