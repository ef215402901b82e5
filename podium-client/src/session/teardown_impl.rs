use crate::error::SessionError;
use crate::registry::RegistryEvent;
use crate::session::{SessionCoordinator, SessionState};
use tracing::{debug, error, info};

impl SessionCoordinator {
    /// Any state -> leaving -> idle. Safe to call repeatedly.
    pub(super) async fn leave(&mut self) {
        if self.session.state == SessionState::Idle {
            debug!("Leave while idle, nothing to do");
            return;
        }

        self.set_state(SessionState::Leaving);
        if let Some(reply) = self.pending_join.take() {
            let _ = reply.send(Err(SessionError::Cancelled));
        }
        self.release().await;

        self.session.last_error = None;
        self.set_state(SessionState::Idle);
        info!("Left the room");
    }

    /// Records a session-fatal error, releases everything and parks the
    /// session in `faulted` until the next leave.
    pub(super) async fn fault(&mut self, err: &SessionError) {
        error!("Session failed: {}", err);
        self.session.last_error = Some(err.to_string());
        self.release().await;
        self.set_state(SessionState::Faulted);
    }

    /// Releases media, devices and the channel, in that order, then
    /// clears the registry.
    pub(super) async fn release(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.negotiator.close().await;
            for track in link.local_tracks.drain(..) {
                track.stop();
            }
            link.channel.disconnect().await;
        }

        self.registry.apply(RegistryEvent::Reset);
        self.session.local_participant_id = None;
        self.session.streaming = false;
    }
}
