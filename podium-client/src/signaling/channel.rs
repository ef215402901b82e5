use crate::error::{SignalError, TransportError};
use crate::signaling::transport::{Connector, SignalTransport};
use dashmap::DashMap;
use podium_core::{ClientFrame, ClientRequest, RequestId, ServerFrame, ServerPush};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What the adapter hands to its owner besides acknowledgements.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Push(ServerPush),
    /// The channel is gone; always the last event.
    Disconnected { reason: String },
}

type AckSender = oneshot::Sender<Result<Value, String>>;

/// Correlated requests awaiting their acknowledgement.
struct PendingRequests {
    waiting: DashMap<RequestId, AckSender>,
    closed: AtomicBool,
}

impl PendingRequests {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Rejects everything in flight. Dropping a sender fails its receiver.
    fn close_all(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.waiting.clear();
    }
}

struct ChannelInner {
    pending: Arc<PendingRequests>,
    outgoing: mpsc::UnboundedSender<String>,
    request_timeout: Duration,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    io_task: Mutex<Option<JoinHandle<()>>>,
}

/// Request/acknowledge and fire-and-forget primitives over one
/// [`SignalTransport`]. Cheap to clone; all clones share the connection.
#[derive(Clone)]
pub struct SignalChannel {
    inner: Arc<ChannelInner>,
}

impl SignalChannel {
    pub async fn connect(
        connector: &dyn Connector,
        request_timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChannelEvent>), TransportError> {
        let transport = connector.connect().await?;
        Ok(Self::open(transport, request_timeout))
    }

    /// Starts the I/O task over an already opened transport.
    pub fn open(
        transport: Box<dyn SignalTransport>,
        request_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let pending = Arc::new(PendingRequests {
            waiting: DashMap::new(),
            closed: AtomicBool::new(false),
        });

        let io_task = tokio::spawn(io_loop(
            transport,
            pending.clone(),
            outgoing_rx,
            event_tx,
            shutdown_rx,
        ));

        let channel = Self {
            inner: Arc::new(ChannelInner {
                pending,
                outgoing: outgoing_tx,
                request_timeout,
                shutdown: Mutex::new(Some(shutdown_tx)),
                io_task: Mutex::new(Some(io_task)),
            }),
        };

        (channel, event_rx)
    }

    pub fn is_connected(&self) -> bool {
        !self.inner.pending.is_closed()
    }

    /// Sends `request` and waits for the correlated acknowledgement.
    ///
    /// Resolves with the decoded success payload, or fails with the
    /// server-reported message, a timeout, or [`SignalError::ChannelClosed`]
    /// when the channel goes away first.
    pub async fn request_ack<R>(&self, request: ClientRequest) -> Result<R, SignalError>
    where
        R: DeserializeOwned,
    {
        let event = request.event_name();
        let id = RequestId::new();
        let text = ClientFrame::request(id, request)
            .encode()
            .map_err(SignalError::Encode)?;

        let (tx, rx) = oneshot::channel();
        let pending = &self.inner.pending;
        pending.waiting.insert(id, tx);

        // close_all may have drained the map right before the insert.
        if pending.is_closed() || self.inner.outgoing.send(text).is_err() {
            pending.waiting.remove(&id);
            return Err(SignalError::ChannelClosed);
        }
        debug!("-> {} ({})", event, id);

        let reply = match tokio::time::timeout(self.inner.request_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(SignalError::ChannelClosed),
            Err(_) => {
                pending.waiting.remove(&id);
                warn!("{} ({}) got no acknowledgement", event, id);
                return Err(SignalError::Timeout {
                    event,
                    after: self.inner.request_timeout,
                });
            }
        };

        let payload = reply.map_err(|message| SignalError::Server { event, message })?;
        serde_json::from_value(payload).map_err(|source| SignalError::Decode { event, source })
    }

    /// Sends `request` without expecting an acknowledgement.
    pub fn emit(&self, request: ClientRequest) -> Result<(), SignalError> {
        let event = request.event_name();
        if self.inner.pending.is_closed() {
            return Err(SignalError::ChannelClosed);
        }

        let text = ClientFrame::notify(request)
            .encode()
            .map_err(SignalError::Encode)?;
        self.inner
            .outgoing
            .send(text)
            .map_err(|_| SignalError::ChannelClosed)?;

        debug!("-> {} (no ack)", event);
        Ok(())
    }

    /// Closes the transport and rejects all pending requests. Idempotent.
    pub async fn disconnect(&self) {
        self.inner.pending.close_all();

        let shutdown = self.inner.shutdown.lock().ok().and_then(|mut s| s.take());
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }

        let io_task = self.inner.io_task.lock().ok().and_then(|mut t| t.take());
        if let Some(io_task) = io_task {
            if let Err(e) = io_task.await {
                warn!("Signaling I/O task ended abnormally: {}", e);
            }
        }
    }
}

async fn io_loop(
    mut transport: Box<dyn SignalTransport>,
    pending: Arc<PendingRequests>,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    debug!("Signaling I/O loop started");

    let reason = loop {
        tokio::select! {
            frame = outgoing.recv() => {
                match frame {
                    Some(text) => {
                        if let Err(e) = transport.send(text).await {
                            error!("Signaling send failed: {}", e);
                            break format!("send failed: {e}");
                        }
                    }
                    None => {
                        let _ = transport.close().await;
                        break "channel dropped".to_owned();
                    }
                }
            }

            _ = &mut shutdown => {
                if let Err(e) = transport.close().await {
                    debug!("Closing signaling transport: {}", e);
                }
                break "closed by client".to_owned();
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => dispatch(&text, &pending, &events),
                    Some(Err(e)) => {
                        error!("Signaling receive failed: {}", e);
                        break format!("receive failed: {e}");
                    }
                    None => break "closed by server".to_owned(),
                }
            }
        }
    };

    pending.close_all();
    info!("Signaling channel disconnected: {}", reason);
    let _ = events.send(ChannelEvent::Disconnected { reason });
}

fn dispatch(text: &str, pending: &PendingRequests, events: &mpsc::UnboundedSender<ChannelEvent>) {
    match ServerFrame::decode(text) {
        Ok(ServerFrame::Ack(ack)) => match pending.waiting.remove(&ack.ack) {
            Some((_, waiter)) => {
                let _ = waiter.send(ack.into_result());
            }
            None => debug!("Ack for unknown or expired request {}", ack.ack),
        },
        Ok(ServerFrame::Push(push)) => {
            debug!("<- {}", push.event_name());
            if events.send(ChannelEvent::Push(push)).is_err() {
                debug!("Push dropped, nobody listens");
            }
        }
        Err(e) => warn!("Invalid signaling frame: {}. Text: {}", e, text),
    }
}
