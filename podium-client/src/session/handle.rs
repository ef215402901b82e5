use crate::error::SessionError;
use crate::session::command::{Reply, SessionCommand};
use crate::session::state::JoinParams;
use crate::session::view::SessionView;
use podium_core::MediaKind;
use tokio::sync::{mpsc, oneshot, watch};

/// Cloneable front of a running session task. The session tears itself
/// down once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<SessionCommand>,
        view: watch::Receiver<SessionView>,
    ) -> Self {
        Self { commands, view }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| SessionError::CoordinatorGone)?;
        rx.await.map_err(|_| SessionError::CoordinatorGone)?
    }

    pub async fn join(&self, params: JoinParams) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Join { params, reply })
            .await
    }

    pub async fn publish(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Publish { reply }).await
    }

    pub async fn unpublish(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Unpublish { reply })
            .await
    }

    pub async fn toggle_media(&self, kind: MediaKind) -> Result<Option<bool>, SessionError> {
        self.request(|reply| SessionCommand::ToggleMedia { kind, reply })
            .await
    }

    pub async fn set_hls(&self, enabled: bool) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::SetHls { enabled, reply })
            .await
    }

    pub async fn leave(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Leave { reply }).await
    }

    /// Latest published snapshot.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }
}
