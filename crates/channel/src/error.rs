use thiserror::Error;
use webview_bridge_protocol::ProtocolError;

/// Errors surfaced by the channel and the remote object proxies.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No ambient transport was injected; the placeholder transport carries nothing.
    #[error("no transport available")]
    NoTransport,

    /// The handshake has not completed; remote objects cannot be reached yet.
    #[error("channel is not ready")]
    NotReady,

    /// The channel was dropped while a proxy or deferred reply still referenced it.
    #[error("channel is closed")]
    Closed,

    /// The host's registry does not expose the requested object.
    #[error("host does not expose object {0:?}")]
    UnknownObject(String),

    /// The host answered a correlated call with an error payload.
    #[error("host reported: {0}")]
    Host(String),

    /// The underlying transport failed to carry a message.
    #[error("transport error: {0}")]
    Transport(String),

    /// The host's reply did not have the shape the operation expects.
    #[error("unexpected reply payload: {0}")]
    UnexpectedReply(&'static str),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
