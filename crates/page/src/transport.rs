//! Ambient transport discovery and the JS transport adapter.

use std::rc::Rc;

use rmpv::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use webview_bridge_channel::{Bridge, ChannelError, NullTransport, Transport};
use webview_bridge_protocol::envelope;

use crate::config::BridgeConfig;

/// Transport backed by a host-injected JS object with a `send(Uint8Array)`
/// method and an assignable `onmessage` property.
pub struct JsTransport {
    handle: JsValue,
}

impl JsTransport {
    pub fn new(handle: JsValue) -> Self {
        Self { handle }
    }
}

impl Transport for JsTransport {
    fn send(&self, message: &Value) -> Result<(), ChannelError> {
        let bytes = envelope::encode(message)?;
        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let send = js_sys::Reflect::get(&self.handle, &"send".into())
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ChannelError::Transport("transport has no send() method".into()))?;
        send.call1(&self.handle, &array)
            .map_err(|err| ChannelError::Transport(describe_js(&err)))?;
        Ok(())
    }
}

/// Resolve the ambient transport from the global object.
///
/// Absent or null, the placeholder is substituted so initialization cannot
/// throw before the host injects the real transport.
pub fn ambient_transport(
    win: &Window,
    cfg: &BridgeConfig,
) -> Result<Box<dyn Transport>, JsValue> {
    let handle = js_sys::Reflect::get(win.as_ref(), &cfg.transport_name.as_str().into())?;
    if handle.is_undefined() || handle.is_null() {
        web_sys::console::warn_1(
            &format!(
                "[bridge] no `{}` transport on window, channel stays down",
                cfg.transport_name
            )
            .into(),
        );
        return Ok(Box::new(NullTransport));
    }
    Ok(Box::new(JsTransport::new(handle)))
}

/// Route the transport's inbound messages into the channel.
pub fn hook_inbound(
    win: &Window,
    cfg: &BridgeConfig,
    bridge: &Rc<Bridge>,
) -> Result<(), JsValue> {
    let handle = js_sys::Reflect::get(win.as_ref(), &cfg.transport_name.as_str().into())?;
    if handle.is_undefined() || handle.is_null() {
        return Ok(());
    }

    let bridge = bridge.clone();
    let onmessage = Closure::wrap(Box::new(move |message: JsValue| {
        // The host delivers either raw bytes or an event with a `data` field.
        let data = js_sys::Reflect::get(&message, &"data".into())
            .ok()
            .filter(|d| !d.is_undefined() && !d.is_null())
            .unwrap_or(message);
        let bytes = js_sys::Uint8Array::new(&data).to_vec();
        match envelope::decode(&bytes) {
            Ok(value) => bridge.handle_incoming(&value),
            Err(err) => {
                web_sys::console::warn_1(&format!("[bridge] undecodable message: {err}").into());
            }
        }
    }) as Box<dyn FnMut(JsValue)>);
    js_sys::Reflect::set(&handle, &"onmessage".into(), onmessage.as_ref())?;
    onmessage.forget();

    Ok(())
}

fn describe_js(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
