//! Page-side configuration.
//!
//! Read from the optional `window.BRIDGE_CONFIG` object the embedder can
//! define before this script loads. Every field has a default; a missing or
//! malformed config object is simply ignored.

use web_sys::Window;

/// Global property the host parks its transport object on.
pub const DEFAULT_TRANSPORT_NAME: &str = "bridgeTransport";

pub struct BridgeConfig {
    pub transport_name: String,
    /// Whether to dispatch the `bridge-ready` event on the document.
    pub announce_ready: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            transport_name: DEFAULT_TRANSPORT_NAME.to_string(),
            announce_ready: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_window(win: &Window) -> Self {
        let mut cfg = Self::default();

        let Ok(raw) = js_sys::Reflect::get(win.as_ref(), &"BRIDGE_CONFIG".into()) else {
            return cfg;
        };
        if raw.is_undefined() || raw.is_null() {
            return cfg;
        }

        if let Some(name) = js_sys::Reflect::get(&raw, &"transportName".into())
            .ok()
            .and_then(|v| v.as_string())
        {
            cfg.transport_name = name;
        }
        if let Some(flag) = js_sys::Reflect::get(&raw, &"announceReady".into())
            .ok()
            .and_then(|v| v.as_bool())
        {
            cfg.announce_ready = flag;
        }

        cfg
    }
}
