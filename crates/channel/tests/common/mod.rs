//! Common test utilities
#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};
use rmpv::Value;

use webview_bridge_channel::{Bridge, ChannelError, Transport};
use webview_bridge_protocol::{
    Envelope, ObjectRegistry, CODE_EXECUTOR, FILE_SYSTEM_HANDLER, METHOD_CHANNEL_INIT,
    METHOD_INVOKE,
};

/// Transport double that records every wire value the page sends.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Rc<RefCell<Vec<Value>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything sent so far.
    pub fn take_sent(&self) -> Vec<Value> {
        self.sent.borrow_mut().drain(..).collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, message: &Value) -> Result<(), ChannelError> {
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

/// Scripted host double: answers envelopes the way the native host would,
/// against an in-memory file store.
///
/// Test-only infrastructure; it exists so the channel can be proven correct
/// without an embedded web view or a real host process.
pub struct MockHost {
    files: HashMap<String, String>,
    directories: Vec<String>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            directories: Vec::new(),
        }
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let mut host = Self::new();
        for (path, content) in files {
            host.files.insert((*path).to_string(), (*content).to_string());
        }
        host
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.directories.iter().any(|d| d == path)
    }

    /// The registry a live host advertises in its handshake response.
    pub fn registry() -> ObjectRegistry {
        let mut registry = ObjectRegistry::new();
        registry.insert(
            FILE_SYSTEM_HANDLER,
            &[
                "createFile",
                "createDirectory",
                "changeFileContent",
                "deleteFile",
                "deleteDirectory",
                "readFile",
            ],
        );
        registry.insert(CODE_EXECUTOR, &["executeSignal"]);
        registry
    }

    /// Handle one page-to-host wire value; returns the host's reply, if any.
    pub fn handle(&mut self, sent: &Value) -> Result<Option<Value>> {
        match Envelope::parse(sent)? {
            Envelope::Request {
                msgid,
                method,
                params,
            } => match method.as_str() {
                METHOD_CHANNEL_INIT => {
                    let registry = Self::registry().to_value()?;
                    Ok(Some(Envelope::response_ok(msgid, registry)))
                }
                METHOD_INVOKE => {
                    let (object, method, args) = parse_invoke(&params)?;
                    self.invoke_with_reply(msgid, &object, &method, &args)
                }
                other => bail!("unexpected request method {other}"),
            },
            Envelope::Notification { method, params } if method == METHOD_INVOKE => {
                let (object, method, args) = parse_invoke(&params)?;
                self.invoke_fire_and_forget(&object, &method, &args)?;
                Ok(None)
            }
            other => bail!("host cannot handle {other:?}"),
        }
    }

    fn invoke_with_reply(
        &mut self,
        msgid: u64,
        object: &str,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>> {
        if object != FILE_SYSTEM_HANDLER || method != "readFile" {
            bail!("unexpected correlated invoke {object}.{method}");
        }
        let path = string_arg(args, 0)?;
        match self.files.get(&path) {
            Some(content) => Ok(Some(Envelope::response_ok(msgid, Value::from(content.as_str())))),
            None => Ok(Some(Envelope::response_err(
                msgid,
                &format!("no such file: {path}"),
            ))),
        }
    }

    fn invoke_fire_and_forget(&mut self, object: &str, method: &str, args: &[Value]) -> Result<()> {
        if object == CODE_EXECUTOR {
            // Payload accepted, result reported via signal; nothing stored.
            return Ok(());
        }
        if object != FILE_SYSTEM_HANDLER {
            bail!("unexpected notification target {object}");
        }
        let path = string_arg(args, 0)?;
        match method {
            "createFile" | "changeFileContent" => {
                let content = string_arg(args, 1)?;
                self.files.insert(path, content);
            }
            "createDirectory" => self.directories.push(path),
            "deleteFile" => {
                self.files.remove(&path);
            }
            "deleteDirectory" => self.directories.retain(|d| d != &path),
            other => bail!("unexpected file-system method {other}"),
        }
        Ok(())
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_invoke(params: &[Value]) -> Result<(String, String, Vec<Value>)> {
    let object = params
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("invoke without object name"))?;
    let method = params
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("invoke without method name"))?;
    let args = match params.get(2) {
        Some(Value::Array(args)) => args.clone(),
        _ => bail!("invoke without argument array"),
    };
    Ok((object.to_string(), method.to_string(), args))
}

fn string_arg(args: &[Value], index: usize) -> Result<String> {
    args.get(index)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| anyhow!("argument {index} is not a string"))
}

/// Bring up a bridge and answer its handshake with the mock host.
pub fn ready_bridge(host: &mut MockHost) -> Result<(Bridge, RecordingTransport)> {
    let transport = RecordingTransport::new();
    let bridge = Bridge::initialize(Box::new(transport.clone()));

    let init = transport
        .take_sent()
        .pop()
        .ok_or_else(|| anyhow!("no handshake request sent"))?;
    let response = host
        .handle(&init)?
        .ok_or_else(|| anyhow!("host did not answer the handshake"))?;
    bridge.handle_incoming(&response);

    Ok((bridge, transport))
}

/// Feed every recorded outbound message to the host and deliver its replies.
pub fn pump(bridge: &Bridge, transport: &RecordingTransport, host: &mut MockHost) -> Result<()> {
    for sent in transport.take_sent() {
        if let Some(reply) = host.handle(&sent)? {
            bridge.handle_incoming(&reply);
        }
    }
    Ok(())
}
