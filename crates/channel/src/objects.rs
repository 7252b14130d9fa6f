//! Typed proxies for the objects the host exposes on the channel.
//!
//! Each proxy lists its capability set as a trait, so a page compiled
//! against the wrong method set fails at compile time instead of at the
//! first forwarded call.

use std::rc::{Rc, Weak};

use async_trait::async_trait;
use rmpv::Value;

use webview_bridge_protocol::RemoteMethod;

use crate::channel::{ChannelInner, PendingReply};
use crate::error::ChannelError;

/// Handle to one host-side object.
///
/// Holds a weak reference to the channel: proxies never keep a dead channel
/// alive, and calls against a dropped channel fail with
/// [`ChannelError::Closed`].
#[derive(Clone)]
pub struct RemoteObject {
    name: String,
    channel: Weak<ChannelInner>,
}

impl RemoteObject {
    pub(crate) fn new(name: &str, channel: Weak<ChannelInner>) -> Self {
        Self {
            name: name.to_string(),
            channel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> Result<Rc<ChannelInner>, ChannelError> {
        self.channel.upgrade().ok_or(ChannelError::Closed)
    }

    /// Fire-and-forget invoke of a method on this object.
    pub fn notify(&self, method: &RemoteMethod, args: Vec<Value>) -> Result<(), ChannelError> {
        self.channel()?.notify(&self.name, method, args)
    }

    /// Correlated invoke of a method on this object.
    pub fn call(&self, method: &RemoteMethod, args: Vec<Value>) -> Result<PendingReply, ChannelError> {
        self.channel()?.call(&self.name, method, args)
    }
}

/// Capability set of the host's file-system handler.
///
/// The five write operations forward without a reply channel and echo the
/// input path; the host reports their outcome only through signals. Reads
/// are correlated and resolve asynchronously.
#[async_trait(?Send)]
pub trait FileSystemOps {
    fn create_file(&self, path: &str, content: &str) -> Result<String, ChannelError>;
    fn create_directory(&self, path: &str) -> Result<String, ChannelError>;
    fn change_file_content(&self, path: &str, content: &str) -> Result<String, ChannelError>;
    fn delete_file(&self, path: &str) -> Result<String, ChannelError>;
    fn delete_directory(&self, path: &str) -> Result<String, ChannelError>;
    async fn read_file(&self, path: &str) -> Result<String, ChannelError>;
}

/// Proxy for the `fileSystemHandler` object.
#[derive(Clone)]
pub struct FileSystemProxy {
    object: RemoteObject,
}

impl FileSystemProxy {
    pub(crate) fn new(object: RemoteObject) -> Self {
        Self { object }
    }

    fn forward(
        &self,
        method: &RemoteMethod,
        path: &str,
        args: Vec<Value>,
    ) -> Result<String, ChannelError> {
        self.object.notify(method, args)?;
        Ok(path.to_string())
    }
}

#[async_trait(?Send)]
impl FileSystemOps for FileSystemProxy {
    fn create_file(&self, path: &str, content: &str) -> Result<String, ChannelError> {
        self.forward(
            &RemoteMethod::CreateFile,
            path,
            vec![Value::from(path), Value::from(content)],
        )
    }

    fn create_directory(&self, path: &str) -> Result<String, ChannelError> {
        self.forward(&RemoteMethod::CreateDirectory, path, vec![Value::from(path)])
    }

    fn change_file_content(&self, path: &str, content: &str) -> Result<String, ChannelError> {
        self.forward(
            &RemoteMethod::ChangeFileContent,
            path,
            vec![Value::from(path), Value::from(content)],
        )
    }

    fn delete_file(&self, path: &str) -> Result<String, ChannelError> {
        self.forward(&RemoteMethod::DeleteFile, path, vec![Value::from(path)])
    }

    fn delete_directory(&self, path: &str) -> Result<String, ChannelError> {
        self.forward(&RemoteMethod::DeleteDirectory, path, vec![Value::from(path)])
    }

    async fn read_file(&self, path: &str) -> Result<String, ChannelError> {
        let reply = self
            .object
            .call(&RemoteMethod::ReadFile, vec![Value::from(path)])?;
        let value = reply.await?;
        value
            .as_str()
            .map(String::from)
            .ok_or(ChannelError::UnexpectedReply("read result is not a string"))
    }
}

/// Capability set of the host's code executor.
///
/// The executor accepts an opaque payload and reports results through the
/// `codeResultReady` signal; nothing in the bridge itself calls it.
pub trait CodeExecution {
    fn execute_signal(&self, payload: Value) -> Result<(), ChannelError>;
}

/// Proxy for the `codeExecutor` object.
#[derive(Clone)]
pub struct CodeExecutorProxy {
    object: RemoteObject,
}

impl CodeExecutorProxy {
    pub(crate) fn new(object: RemoteObject) -> Self {
        Self { object }
    }
}

impl CodeExecution for CodeExecutorProxy {
    fn execute_signal(&self, payload: Value) -> Result<(), ChannelError> {
        self.object.notify(&RemoteMethod::ExecuteSignal, vec![payload])
    }
}
