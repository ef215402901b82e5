use crate::negotiator::ConnectionStateListener;
use crate::session::SessionState;
use podium_core::{Direction, TransportId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    SessionState {
        from: SessionState,
        to: SessionState,
    },
    ChannelConnected,
    ChannelDisconnected {
        reason: String,
    },
    TransportState {
        direction: Direction,
        transport_id: TransportId,
        state: RTCPeerConnectionState,
    },
}

#[derive(Debug, Clone)]
pub struct DiagnosticEntry {
    pub at: Instant,
    pub event: DiagnosticEvent,
}

struct Log {
    capacity: usize,
    entries: VecDeque<DiagnosticEntry>,
}

/// Bounded, shared record of connection-level events. Purely observational:
/// nothing reacts to what lands here.
#[derive(Clone)]
pub struct Diagnostics {
    log: Arc<Mutex<Log>>,
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        Self {
            log: Arc::new(Mutex::new(Log {
                capacity: capacity.max(1),
                entries: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, event: DiagnosticEvent) {
        let mut log = self.lock();
        if log.entries.len() == log.capacity {
            log.entries.pop_front();
        }
        log.entries.push_back(DiagnosticEntry {
            at: Instant::now(),
            event,
        });
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.lock().entries.iter().map(|e| e.event.clone()).collect()
    }

    /// Observed states of the `direction` transports, oldest first.
    pub fn transport_states(&self, direction: Direction) -> Vec<RTCPeerConnectionState> {
        self.lock()
            .entries
            .iter()
            .filter_map(|entry| match &entry.event {
                DiagnosticEvent::TransportState {
                    direction: d, state, ..
                } if *d == direction => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub(crate) fn transport_listener(
        &self,
        direction: Direction,
        transport_id: TransportId,
    ) -> ConnectionStateListener {
        let diagnostics = self.clone();
        Box::new(move |state| {
            match state {
                RTCPeerConnectionState::Failed | RTCPeerConnectionState::Disconnected => {
                    warn!("{} transport {} is {}", direction, transport_id, state)
                }
                _ => debug!("{} transport {} is {}", direction, transport_id, state),
            }
            diagnostics.record(DiagnosticEvent::TransportState {
                direction,
                transport_id: transport_id.clone(),
                state,
            });
        })
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(512)
    }
}
