//! WASM page glue for webview-bridge
//!
//! On load this builds the bridge over the transport the host injected into
//! the page, and once the channel handshake completes it attaches the file
//! operation globals (`createFile`, `readFile`, …) to `window`. Page scripts
//! that run before readiness see the names as undefined; the `bridge-ready`
//! event on `document` marks the moment they appear.

mod config;
mod globals;
mod signals;
mod transport;

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::window;

use webview_bridge_channel::Bridge;

use crate::config::BridgeConfig;

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let document = window()
        .ok_or("no global `window` exists")?
        .document()
        .ok_or("should have a document on window")?;

    // Attach as soon as the DOM exists, without waiting longer than needed.
    if document.ready_state() == "loading" {
        let deferred = Closure::once(Box::new(move || {
            if let Err(err) = init_channel() {
                web_sys::console::error_2(&"[bridge] init failed".into(), &err);
            }
        }) as Box<dyn FnOnce()>);
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            deferred.as_ref().unchecked_ref(),
        )?;
        deferred.forget();
    } else {
        init_channel()?;
    }

    Ok(())
}

/// Build the channel over the ambient transport and arm the ready hook.
///
/// Exported so a page that injects its transport after load can bring the
/// bridge up manually.
#[wasm_bindgen(js_name = initChannel)]
pub fn init_channel() -> Result<(), JsValue> {
    let win = window().ok_or("no global `window` exists")?;
    let cfg = BridgeConfig::from_window(&win);

    let bridge = Rc::new(Bridge::initialize(transport::ambient_transport(&win, &cfg)?));
    transport::hook_inbound(&win, &cfg, &bridge)?;
    signals::forward_to_dom(&bridge);

    let ready_bridge = bridge.clone();
    let announce = cfg.announce_ready;
    bridge.on_ready(move || {
        if let Err(err) = globals::attach(&ready_bridge) {
            web_sys::console::error_2(&"[bridge] failed to attach globals".into(), &err);
            return;
        }
        web_sys::console::log_1(&"[bridge] file system functions attached to window".into());
        if announce {
            signals::announce_ready();
        }
    });

    Ok(())
}
