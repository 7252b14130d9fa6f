use rmpv::Value;

use crate::error::ChannelError;

/// Outbound half of the page-to-host connection.
///
/// A transport only carries page-to-host traffic; the embedder pushes
/// host-to-page messages into [`crate::Channel::handle_incoming`]. There is
/// no blocking receive anywhere in this model.
pub trait Transport {
    /// Send one wire value to the host.
    fn send(&self, message: &Value) -> Result<(), ChannelError>;
}

/// Placeholder transport substituted when no ambient transport is present.
///
/// Constructing a channel over it never panics; every send fails, so the
/// handshake goes nowhere and the channel stays in `Connecting` until a new
/// channel is built over a real transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, _message: &Value) -> Result<(), ChannelError> {
        Err(ChannelError::NoTransport)
    }
}
