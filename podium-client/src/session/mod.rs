//! The session coordinator: a single task owning all session state,
//! fed by user commands and signaling events.

mod command;
mod handle;
mod state;
mod view;

mod handle_command_impl;
mod handle_push_impl;
mod join_impl;
mod media_impl;
mod teardown_impl;

pub use command::SessionCommand;
pub use handle::SessionHandle;
pub use state::{ConnectionStatus, JoinParams, Session, SessionState};
pub use view::SessionView;

use crate::config::SessionConfig;
use crate::devices::{LocalTrack, MediaDevices};
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::negotiator::{MediaBackend, TransportNegotiator};
use crate::registry::Registry;
use crate::signaling::{ChannelEvent, Connector, SignalChannel};
use command::Reply;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::info;

/// External collaborators of a session.
#[derive(Clone)]
pub struct SessionDeps {
    pub connector: Arc<dyn Connector>,
    pub backend: Arc<dyn MediaBackend>,
    pub devices: Arc<dyn MediaDevices>,
    pub diagnostics: Diagnostics,
}

impl SessionDeps {
    /// Collaborators with a fresh diagnostics log sized by `config`.
    pub fn new(
        config: &SessionConfig,
        connector: Arc<dyn Connector>,
        backend: Arc<dyn MediaBackend>,
        devices: Arc<dyn MediaDevices>,
    ) -> Self {
        Self {
            connector,
            backend,
            devices,
            diagnostics: Diagnostics::new(config.diagnostics_capacity),
        }
    }
}

/// Resources that only exist while the signaling channel is open.
struct SessionLink {
    channel: SignalChannel,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    negotiator: TransportNegotiator,
    local_tracks: Vec<Arc<dyn LocalTrack>>,
}

pub struct SessionCoordinator {
    config: SessionConfig,
    deps: SessionDeps,
    session: Session,
    registry: Registry,
    link: Option<SessionLink>,
    pending_join: Option<Reply<()>>,
    /// When an accepted join gives up on its room snapshot.
    join_deadline: Option<Instant>,
    command_rx: mpsc::Receiver<SessionCommand>,
    view_tx: watch::Sender<SessionView>,
}

impl SessionCoordinator {
    pub fn new(config: SessionConfig, deps: SessionDeps) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (view_tx, view_rx) = watch::channel(SessionView::default());

        let coordinator = Self {
            config,
            deps,
            session: Session::default(),
            registry: Registry::new(),
            link: None,
            pending_join: None,
            join_deadline: None,
            command_rx,
            view_tx,
        };

        (coordinator, SessionHandle::new(command_tx, view_rx))
    }

    pub async fn run(mut self) {
        info!("Session event loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All session handles dropped. Shutting down session.");
                            self.leave().await;
                            break;
                        }
                    }
                }

                evt = next_event(&mut self.link) => {
                    self.handle_channel_event(evt).await;
                }

                _ = deadline(self.pending_join.as_ref().and(self.join_deadline)) => {
                    self.on_join_timeout().await;
                }
            }

            self.publish_view();
        }

        info!("Session event loop finished");
    }

    fn publish_view(&self) {
        self.view_tx
            .send_replace(SessionView::new(&self.session, &self.registry));
    }

    fn set_state(&mut self, to: SessionState) {
        let from = self.session.state;
        if from == to {
            return;
        }

        info!("Session {} -> {}", from, to);
        self.session.state = to;
        self.deps
            .diagnostics
            .record(DiagnosticEvent::SessionState { from, to });
        self.publish_view();
    }
}

/// Starts a session task and returns its handle.
pub fn spawn_session(config: SessionConfig, deps: SessionDeps) -> SessionHandle {
    let (coordinator, handle) = SessionCoordinator::new(config, deps);
    tokio::spawn(coordinator.run());
    handle
}

/// Next signaling event, or never while no channel is open.
async fn next_event(link: &mut Option<SessionLink>) -> ChannelEvent {
    match link {
        Some(link) => link
            .events
            .recv()
            .await
            .unwrap_or_else(|| ChannelEvent::Disconnected {
                reason: "event stream ended".to_owned(),
            }),
        None => std::future::pending().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
