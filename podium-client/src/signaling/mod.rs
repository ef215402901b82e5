mod channel;
mod transport;
mod ws;

pub use channel::{ChannelEvent, SignalChannel};
pub use transport::{Connector, SignalTransport};
pub use ws::{WsConnector, WsTransport};
