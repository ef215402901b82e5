use crate::error::SessionError;
use crate::session::state::JoinParams;
use podium_core::MediaKind;
use tokio::sync::oneshot;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// User actions sent to the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Opens the channel and joins; answered once the room snapshot arrived.
    Join {
        params: JoinParams,
        reply: Reply<()>,
    },

    /// Acquires camera and microphone and publishes them.
    Publish { reply: Reply<()> },

    /// Closes every local producer and stops local tracks.
    Unpublish { reply: Reply<()> },

    /// Flips one local producer; answers the new enabled flag, or `None`
    /// when nothing of that kind is published.
    ToggleMedia {
        kind: MediaKind,
        reply: Reply<Option<bool>>,
    },

    /// Asks the server to start or stop the HLS relay.
    SetHls { enabled: bool, reply: Reply<()> },

    /// Tears the session down and returns to idle.
    Leave { reply: Reply<()> },
}
