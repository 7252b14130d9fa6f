//! Host signal delivery into the page.
//!
//! The host reports operation outcomes as object signals; the page re-emits
//! them as DOM CustomEvents under the same names, with the arguments in
//! `detail`, so plain page scripts can listen without touching the bridge.

use std::rc::Rc;

use rmpv::Value;
use wasm_bindgen::JsValue;
use web_sys::{window, CustomEvent, CustomEventInit};

use webview_bridge_channel::{Bridge, SignalEvent};
use webview_bridge_protocol::{SIGNAL_ERROR_OCCURRED, SIGNAL_FILE_READ};

pub fn forward_to_dom(bridge: &Rc<Bridge>) {
    bridge.on_signal(|event| {
        if let Err(err) = dispatch(event) {
            web_sys::console::error_2(&"[bridge] signal dispatch failed".into(), &err);
        }
    });
}

fn dispatch(event: &SignalEvent) -> Result<(), JsValue> {
    let document = window()
        .ok_or("no global `window` exists")?
        .document()
        .ok_or("no document")?;

    let detail = js_sys::Object::new();
    js_sys::Reflect::set(&detail, &"object".into(), &event.object.as_str().into())?;
    match event.name.as_str() {
        // fileRead carries (path, content); the rest carry a single argument.
        SIGNAL_FILE_READ => {
            js_sys::Reflect::set(&detail, &"path".into(), &arg_str(event, 0).into())?;
            js_sys::Reflect::set(&detail, &"content".into(), &arg_str(event, 1).into())?;
        }
        SIGNAL_ERROR_OCCURRED => {
            js_sys::Reflect::set(&detail, &"message".into(), &arg_str(event, 0).into())?;
        }
        _ => {
            js_sys::Reflect::set(&detail, &"path".into(), &arg_str(event, 0).into())?;
        }
    }

    let init = CustomEventInit::new();
    init.set_detail(&detail);
    let dom_event = CustomEvent::new_with_event_init_dict(&event.name, &init)?;
    document.dispatch_event(&dom_event)?;
    Ok(())
}

fn arg_str(event: &SignalEvent, index: usize) -> String {
    event
        .args
        .get(index)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Announce readiness to page scripts that loaded before the bridge.
pub fn announce_ready() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };
    if let Ok(event) = CustomEvent::new("bridge-ready") {
        let _ = document.dispatch_event(&event);
    }
}
