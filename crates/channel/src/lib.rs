//! Channel core for webview-bridge
//!
//! Platform-independent half of the page-side bridge: the transport seam,
//! the channel handshake and correlation-id bookkeeping, and typed proxies
//! for the objects the host exposes. The wasm page glue in
//! `webview-bridge-page` wires this to a real web view; tests drive it with
//! in-memory doubles.

pub mod bridge;
pub mod channel;
pub mod error;
pub mod objects;
pub mod transport;

pub use bridge::Bridge;
pub use channel::{Channel, ChannelState, PendingReply, SignalEvent};
pub use error::ChannelError;
pub use objects::{CodeExecution, CodeExecutorProxy, FileSystemOps, FileSystemProxy, RemoteObject};
pub use transport::{NullTransport, Transport};
