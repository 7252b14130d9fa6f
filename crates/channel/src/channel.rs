//! Channel handshake and message dispatch.
//!
//! A channel is created over a transport, sends one `channel_init` request,
//! and becomes `Ready` when the host answers with its object registry. All
//! state lives on the page's single logical thread; interior mutability is
//! `Cell`/`RefCell` behind an `Rc`, never locks.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use rmpv::Value;
use tracing::{debug, warn};

use webview_bridge_protocol::{
    Envelope, ObjectRegistry, RemoteMethod, METHOD_CHANNEL_INIT, METHOD_INVOKE, METHOD_SIGNAL,
    SIGNAL_ERROR_OCCURRED,
};

use crate::error::ChannelError;
use crate::objects::RemoteObject;
use crate::transport::Transport;

/// Channel lifecycle: exactly two states, the transition fires once and is
/// never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Ready,
}

/// A signal emitted by a host-side object, e.g. `fileCreated` or
/// `errorOccurred` from the file-system handler.
#[derive(Debug, Clone)]
pub struct SignalEvent {
    pub object: String,
    pub name: String,
    pub args: Vec<Value>,
}

type ReplySender = oneshot::Sender<Result<Value, ChannelError>>;
type SignalHandler = Rc<dyn Fn(&SignalEvent)>;

pub(crate) struct ChannelInner {
    transport: Box<dyn Transport>,
    state: Cell<ChannelState>,
    init_msgid: Cell<Option<u64>>,
    next_msgid: Cell<u64>,
    registry: RefCell<ObjectRegistry>,
    pending: RefCell<HashMap<u64, ReplySender>>,
    ready_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
    signal_handlers: RefCell<Vec<SignalHandler>>,
}

impl ChannelInner {
    fn fresh_msgid(&self) -> u64 {
        let id = self.next_msgid.get();
        self.next_msgid.set(id + 1);
        id
    }

    fn ensure_ready(&self) -> Result<(), ChannelError> {
        match self.state.get() {
            ChannelState::Ready => Ok(()),
            ChannelState::Connecting => Err(ChannelError::NotReady),
        }
    }

    fn send_init(&self) {
        let msgid = self.fresh_msgid();
        self.init_msgid.set(Some(msgid));
        let wire = Envelope::request(msgid, METHOD_CHANNEL_INIT, vec![]);
        if let Err(err) = self.transport.send(&wire) {
            // Without a live transport the handshake never completes; the
            // channel stays in Connecting and callers observe NotReady.
            warn!("channel handshake not sent: {err}");
        }
    }

    /// Fire-and-forget invoke on a host object.
    pub(crate) fn notify(
        &self,
        object: &str,
        method: &RemoteMethod,
        args: Vec<Value>,
    ) -> Result<(), ChannelError> {
        self.ensure_ready()?;
        let wire = Envelope::notification(METHOD_INVOKE, invoke_params(object, method, args));
        self.transport.send(&wire)
    }

    /// Correlated invoke on a host object; the reply resolves the returned future.
    pub(crate) fn call(
        &self,
        object: &str,
        method: &RemoteMethod,
        args: Vec<Value>,
    ) -> Result<PendingReply, ChannelError> {
        self.ensure_ready()?;
        let msgid = self.fresh_msgid();
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().insert(msgid, tx);
        let wire = Envelope::request(msgid, METHOD_INVOKE, invoke_params(object, method, args));
        if let Err(err) = self.transport.send(&wire) {
            self.pending.borrow_mut().remove(&msgid);
            return Err(err);
        }
        Ok(PendingReply { rx })
    }

    pub(crate) fn handle_incoming(&self, value: &Value) {
        let envelope = match Envelope::parse(value) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("dropping malformed message: {err}");
                return;
            }
        };
        match envelope {
            Envelope::Response {
                msgid,
                error,
                result,
            } => {
                if self.init_msgid.get() == Some(msgid) {
                    self.finish_handshake(error, &result);
                } else {
                    self.resolve_pending(msgid, error, result);
                }
            }
            Envelope::Notification { method, params } if method == METHOD_SIGNAL => {
                self.dispatch_signal(&params);
            }
            Envelope::Notification { method, .. } => {
                warn!("dropping notification with unknown method {method}");
            }
            Envelope::Request { method, .. } => {
                warn!("dropping unexpected request from host: {method}");
            }
        }
    }

    fn finish_handshake(&self, error: Option<Value>, result: &Value) {
        self.init_msgid.set(None);
        if let Some(err) = error {
            warn!("host rejected handshake: {}", describe(&err));
            return;
        }
        let registry = match ObjectRegistry::from_value(result) {
            Ok(registry) => registry,
            Err(err) => {
                warn!("handshake response rejected: {err}");
                return;
            }
        };
        for name in registry.object_names() {
            debug!(object = name, methods = ?registry.methods_of(name), "host object registered");
        }
        *self.registry.borrow_mut() = registry;
        self.state.set(ChannelState::Ready);

        // Drain before invoking: a callback may register further callbacks.
        let callbacks: Vec<_> = self.ready_callbacks.borrow_mut().drain(..).collect();
        for callback in callbacks {
            callback();
        }
    }

    fn resolve_pending(&self, msgid: u64, error: Option<Value>, result: Value) {
        let Some(tx) = self.pending.borrow_mut().remove(&msgid) else {
            warn!(msgid, "dropping response with no pending call");
            return;
        };
        let outcome = match error {
            Some(err) => Err(ChannelError::Host(describe(&err))),
            None => Ok(result),
        };
        // The caller may have dropped its future in the meantime.
        let _ = tx.send(outcome);
    }

    fn dispatch_signal(&self, params: &[Value]) {
        let (Some(object), Some(name)) = (
            params.first().and_then(Value::as_str),
            params.get(1).and_then(Value::as_str),
        ) else {
            warn!("dropping signal without object and name");
            return;
        };
        let args = match params.get(2) {
            Some(Value::Array(args)) => args.clone(),
            _ => Vec::new(),
        };
        let event = SignalEvent {
            object: object.to_string(),
            name: name.to_string(),
            args,
        };
        if event.name == SIGNAL_ERROR_OCCURRED {
            let detail = event.args.first().map(describe).unwrap_or_default();
            warn!(object = %event.object, "host reported error: {detail}");
        }
        // Clone out so handlers can subscribe more handlers while we iterate.
        let handlers: Vec<_> = self.signal_handlers.borrow().clone();
        for handler in handlers {
            handler(&event);
        }
    }
}

fn invoke_params(object: &str, method: &RemoteMethod, args: Vec<Value>) -> Vec<Value> {
    vec![
        Value::from(object),
        Value::from(method.to_string()),
        Value::Array(args),
    ]
}

fn describe(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), String::from)
}

/// Bidirectional channel between the page and the native host.
#[derive(Clone)]
pub struct Channel {
    inner: Rc<ChannelInner>,
}

impl Channel {
    /// Build a channel over a transport and start the handshake.
    ///
    /// Never fails: a dead or placeholder transport leaves the channel in
    /// `Connecting` forever instead of erroring, so page initialization can
    /// proceed before the real transport has been injected.
    pub fn connect(transport: Box<dyn Transport>) -> Self {
        let inner = Rc::new(ChannelInner {
            transport,
            state: Cell::new(ChannelState::Connecting),
            init_msgid: Cell::new(None),
            next_msgid: Cell::new(1),
            registry: RefCell::new(ObjectRegistry::new()),
            pending: RefCell::new(HashMap::new()),
            ready_callbacks: RefCell::new(Vec::new()),
            signal_handlers: RefCell::new(Vec::new()),
        });
        inner.send_init();
        Self { inner }
    }

    pub fn state(&self) -> ChannelState {
        self.inner.state.get()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ChannelState::Ready
    }

    /// Run `callback` once the handshake completes. Registered after
    /// readiness, it runs immediately.
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) {
        if self.is_ready() {
            callback();
        } else {
            self.inner
                .ready_callbacks
                .borrow_mut()
                .push(Box::new(callback));
        }
    }

    /// Subscribe to host object signals.
    pub fn on_signal(&self, handler: impl Fn(&SignalEvent) + 'static) {
        self.inner
            .signal_handlers
            .borrow_mut()
            .push(Rc::new(handler));
    }

    /// Feed one host-to-page wire value into the channel.
    ///
    /// Malformed values, responses with no pending call, and requests from
    /// the host are logged and dropped; nothing here panics.
    pub fn handle_incoming(&self, value: &Value) {
        self.inner.handle_incoming(value);
    }

    /// Resolve a registered host object by name.
    pub fn object(&self, name: &str) -> Result<RemoteObject, ChannelError> {
        self.inner.ensure_ready()?;
        if !self.inner.registry.borrow().contains(name) {
            return Err(ChannelError::UnknownObject(name.to_string()));
        }
        Ok(RemoteObject::new(name, Rc::downgrade(&self.inner)))
    }
}

/// Deferred reply to a correlated invoke.
///
/// Resolves when the host's response arrives; never times out. Dropping the
/// channel resolves it with [`ChannelError::Closed`].
pub struct PendingReply {
    rx: oneshot::Receiver<Result<Value, ChannelError>>,
}

impl Future for PendingReply {
    type Output = Result<Value, ChannelError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ChannelError::Closed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
