//! Shared wire types for webview-bridge
//!
//! Defines the MessagePack-RPC envelopes exchanged between the page-side
//! bridge and the native host, plus the remote method and signal names of
//! the host's exposed objects.

pub mod envelope;
pub mod messages;
pub mod registry;
pub mod rpc;

pub use envelope::*;
pub use messages::*;
pub use registry::*;
pub use rpc::*;
