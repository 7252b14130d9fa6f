//! The bridge object: owns the channel and hands out typed proxies.
//!
//! One bridge is constructed per page lifetime by whatever owns the root
//! context, and passed by reference to anything that needs host file
//! operations. There is no global registry here; the page glue decides what
//! (if anything) to publish globally.

use rmpv::Value;

use webview_bridge_protocol::{CODE_EXECUTOR, FILE_SYSTEM_HANDLER};

use crate::channel::{Channel, SignalEvent};
use crate::error::ChannelError;
use crate::objects::{CodeExecutorProxy, FileSystemProxy};
use crate::transport::Transport;

pub struct Bridge {
    channel: Channel,
}

impl Bridge {
    /// Build the channel over `transport` and start the handshake.
    ///
    /// Returns immediately; readiness is observed through [`Bridge::on_ready`]
    /// or by polling [`Bridge::is_ready`]. Never panics, even over a
    /// placeholder transport.
    pub fn initialize(transport: Box<dyn Transport>) -> Self {
        Self {
            channel: Channel::connect(transport),
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn is_ready(&self) -> bool {
        self.channel.is_ready()
    }

    pub fn on_ready(&self, callback: impl FnOnce() + 'static) {
        self.channel.on_ready(callback);
    }

    pub fn on_signal(&self, handler: impl Fn(&SignalEvent) + 'static) {
        self.channel.on_signal(handler);
    }

    /// Feed one host-to-page wire value into the channel.
    pub fn handle_incoming(&self, value: &Value) {
        self.channel.handle_incoming(value);
    }

    /// The host's file-system handler.
    ///
    /// Fails with [`ChannelError::NotReady`] before the handshake completes
    /// and [`ChannelError::UnknownObject`] if the host never registered it.
    pub fn file_system(&self) -> Result<FileSystemProxy, ChannelError> {
        Ok(FileSystemProxy::new(self.channel.object(FILE_SYSTEM_HANDLER)?))
    }

    /// The host's code executor.
    pub fn code_executor(&self) -> Result<CodeExecutorProxy, ChannelError> {
        Ok(CodeExecutorProxy::new(self.channel.object(CODE_EXECUTOR)?))
    }
}
