use crate::error::SessionError;
use crate::session::command::Reply;
use crate::session::{SessionCommand, SessionCoordinator, SessionState};

impl SessionCoordinator {
    pub(super) async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join { params, reply } => self.join(params, reply).await,

            SessionCommand::Publish { reply } => {
                let result = self.publish().await;
                self.finish("publish", result, reply);
            }

            SessionCommand::Unpublish { reply } => {
                let result = self.unpublish().await;
                self.finish("unpublish", result, reply);
            }

            SessionCommand::ToggleMedia { kind, reply } => {
                let result = self.toggle_media(kind).await;
                self.finish("toggle media", result, reply);
            }

            SessionCommand::SetHls { enabled, reply } => {
                let result = self.set_hls(enabled);
                self.finish("hls", result, reply);
            }

            SessionCommand::Leave { reply } => {
                self.leave().await;
                let _ = reply.send(Ok(()));
            }
        }
    }

    /// Records the outcome of a user action and answers the caller.
    fn finish<T>(&mut self, action: &str, result: Result<T, SessionError>, reply: Reply<T>) {
        match &result {
            Ok(_) => self.session.last_error = None,
            Err(e) => self.session.fail(action, e),
        }
        self.publish_view();
        let _ = reply.send(result);
    }

    pub(super) fn require_active(&self, action: &'static str) -> Result<(), SessionError> {
        match self.session.state {
            SessionState::Active => Ok(()),
            state => Err(SessionError::InvalidState {
                action,
                state: state.as_str(),
            }),
        }
    }
}
