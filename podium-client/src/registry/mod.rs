//! Roster of participants plus the local producers and consumers.
//!
//! Every mutation goes through [`Registry::apply`], so the whole state is a
//! fold over [`RegistryEvent`]s.

mod remote_stream;

pub use remote_stream::RemoteStream;

use crate::hls::HlsStatus;
use crate::negotiator::RemoteTrack;
use podium_core::{ConsumerId, MediaKind, Participant, ParticipantId, ParticipantPatch, ProducerId};
use std::collections::BTreeMap;

/// A local producer as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerInfo {
    pub id: ProducerId,
    pub kind: MediaKind,
    pub paused: bool,
}

/// A subscription to a remote producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerInfo {
    pub id: ConsumerId,
    pub kind: MediaKind,
    pub participant_id: ParticipantId,
    pub producer_id: ProducerId,
    pub track: RemoteTrack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// Replaces the roster. `local` is added when the roster misses it.
    RoomJoined {
        participants: Vec<Participant>,
        local: Participant,
        hls: HlsStatus,
    },
    ParticipantJoined(Participant),
    ParticipantLeft(ParticipantId),
    ParticipantUpdated {
        id: ParticipantId,
        patch: ParticipantPatch,
    },
    ProducerAdded(ProducerInfo),
    ProducerPaused {
        id: ProducerId,
        paused: bool,
    },
    ProducerRemoved(ProducerId),
    ConsumerAdded(ConsumerInfo),
    ConsumerRemoved(ConsumerId),
    HlsChanged(HlsStatus),
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    participants: Vec<Participant>,
    local_participant_id: Option<ParticipantId>,
    producers: BTreeMap<ProducerId, ProducerInfo>,
    consumers: BTreeMap<ConsumerId, ConsumerInfo>,
    hls: HlsStatus,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: RegistryEvent) {
        match event {
            RegistryEvent::RoomJoined {
                participants,
                local,
                hls,
            } => {
                self.participants.clear();
                for participant in participants {
                    self.insert_participant(participant);
                }
                self.local_participant_id = Some(local.id.clone());
                self.insert_participant(local);
                self.hls = hls;
            }
            RegistryEvent::ParticipantJoined(participant) => self.insert_participant(participant),
            RegistryEvent::ParticipantLeft(id) => {
                // The local user only leaves through teardown.
                if self.local_participant_id.as_ref() != Some(&id) {
                    self.participants.retain(|p| p.id != id);
                }
            }
            RegistryEvent::ParticipantUpdated { id, patch } => {
                if let Some(participant) = self.participants.iter_mut().find(|p| p.id == id) {
                    participant.apply_patch(&patch);
                }
            }
            RegistryEvent::ProducerAdded(producer) => {
                self.producers.insert(producer.id.clone(), producer);
            }
            RegistryEvent::ProducerPaused { id, paused } => {
                if let Some(producer) = self.producers.get_mut(&id) {
                    producer.paused = paused;
                }
            }
            RegistryEvent::ProducerRemoved(id) => {
                self.producers.remove(&id);
            }
            RegistryEvent::ConsumerAdded(consumer) => {
                self.consumers.insert(consumer.id.clone(), consumer);
            }
            RegistryEvent::ConsumerRemoved(id) => {
                self.consumers.remove(&id);
            }
            RegistryEvent::HlsChanged(hls) => self.hls = hls,
            RegistryEvent::Reset => *self = Self::default(),
        }
    }

    fn insert_participant(&mut self, participant: Participant) {
        if !self.participants.iter().any(|p| p.id == participant.id) {
            self.participants.push(participant);
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn local_participant_id(&self) -> Option<&ParticipantId> {
        self.local_participant_id.as_ref()
    }

    pub fn local_participant(&self) -> Option<&Participant> {
        self.local_participant_id
            .as_ref()
            .and_then(|id| self.participant(id))
    }

    pub fn producers(&self) -> impl Iterator<Item = &ProducerInfo> {
        self.producers.values()
    }

    pub fn producer_of_kind(&self, kind: MediaKind) -> Option<&ProducerInfo> {
        self.producers.values().find(|p| p.kind == kind)
    }

    pub fn consumers(&self) -> impl Iterator<Item = &ConsumerInfo> {
        self.consumers.values()
    }

    pub fn consumer_for_producer(&self, producer_id: &ProducerId) -> Option<&ConsumerInfo> {
        self.consumers
            .values()
            .find(|c| &c.producer_id == producer_id)
    }

    pub fn consumers_of<'a>(
        &'a self,
        participant_id: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a ConsumerInfo> + 'a {
        self.consumers
            .values()
            .filter(move |c| &c.participant_id == participant_id)
    }

    pub fn hls(&self) -> &HlsStatus {
        &self.hls
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Consumed tracks grouped per remote participant, in roster order.
    /// Participants without consumers are left out.
    pub fn remote_streams(&self) -> Vec<RemoteStream> {
        let mut streams: BTreeMap<&ParticipantId, RemoteStream> = BTreeMap::new();
        for consumer in self.consumers.values() {
            streams
                .entry(&consumer.participant_id)
                .or_insert_with(|| RemoteStream::new(consumer.participant_id.clone()))
                .attach(&consumer.track);
        }

        let mut ordered = Vec::with_capacity(streams.len());
        for participant in &self.participants {
            if let Some(stream) = streams.remove(&participant.id) {
                ordered.push(stream);
            }
        }
        // Consumers can briefly outlive their roster entry.
        ordered.extend(streams.into_values());
        ordered
    }
}
