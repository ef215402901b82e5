use crate::error::TransportError;
use crate::signaling::transport::{Connector, SignalTransport};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info};

/// [`SignalTransport`] over a WebSocket carrying JSON text frames.
pub struct WsTransport<S> {
    stream: WebSocketStream<S>,
}

impl<S> WsTransport<S> {
    pub fn new(stream: WebSocketStream<S>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> SignalTransport for WsTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    debug!("WS closed by server: {:?}", frame);
                    return None;
                }
                // Pings are answered by tungstenite itself.
                Ok(_) => continue,
                Err(WsError::ConnectionClosed) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Opens a [`WsTransport`] to a fixed signaling URL.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn SignalTransport>, TransportError> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        info!("WS open: {}", self.url);
        Ok(Box::new(WsTransport::new(stream)))
    }
}
