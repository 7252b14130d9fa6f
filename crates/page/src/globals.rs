//! Window-global forwarding functions.
//!
//! Attached once, when the channel handshake completes. Until then none of
//! these names exist on `window`, and early callers get the usual "is not a
//! function" failure at their own call site.
//!
//! Every forwarder logs its name and arguments to the console before
//! forwarding, matching what the host developers expect to see in devtools.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::window;

use webview_bridge_channel::{Bridge, ChannelError, FileSystemOps, FileSystemProxy};

pub fn attach(bridge: &Rc<Bridge>) -> Result<(), JsValue> {
    let fs = bridge.file_system().map_err(as_js_error)?;
    // Resolved so a missing registration surfaces at attach time; no global
    // forwards to the executor itself.
    bridge.code_executor().map_err(as_js_error)?;

    let win = window().ok_or("no global `window` exists")?;
    let target: &JsValue = win.as_ref();

    attach_path_op(target, "createDirectory", fs.clone(), |fs, path| {
        fs.create_directory(&path)
    })?;
    attach_path_op(target, "deleteFile", fs.clone(), |fs, path| {
        fs.delete_file(&path)
    })?;
    attach_path_op(target, "deleteDirectory", fs.clone(), |fs, path| {
        fs.delete_directory(&path)
    })?;
    attach_content_op(target, "createFile", fs.clone(), |fs, path, content| {
        fs.create_file(&path, &content)
    })?;
    attach_content_op(target, "changeFileContent", fs.clone(), |fs, path, content| {
        fs.change_file_content(&path, &content)
    })?;
    attach_read_file(target, fs)?;

    Ok(())
}

type PathOp = fn(&FileSystemProxy, String) -> Result<String, ChannelError>;
type ContentOp = fn(&FileSystemProxy, String, String) -> Result<String, ChannelError>;

fn attach_path_op(
    target: &JsValue,
    name: &'static str,
    fs: FileSystemProxy,
    op: PathOp,
) -> Result<(), JsValue> {
    let forward = Closure::wrap(Box::new(move |path: String| -> String {
        web_sys::console::log_2(
            &format!("[bridge] {name} called").into(),
            &path.as_str().into(),
        );
        match op(&fs, path.clone()) {
            Ok(echoed) => echoed,
            Err(err) => {
                web_sys::console::error_1(&format!("[bridge] {name} failed: {err}").into());
                path
            }
        }
    }) as Box<dyn Fn(String) -> String>);
    js_sys::Reflect::set(target, &name.into(), forward.as_ref())?;
    forward.forget();
    Ok(())
}

fn attach_content_op(
    target: &JsValue,
    name: &'static str,
    fs: FileSystemProxy,
    op: ContentOp,
) -> Result<(), JsValue> {
    let forward = Closure::wrap(Box::new(move |path: String, content: String| -> String {
        web_sys::console::log_3(
            &format!("[bridge] {name} called").into(),
            &path.as_str().into(),
            &content.as_str().into(),
        );
        match op(&fs, path.clone(), content) {
            Ok(echoed) => echoed,
            Err(err) => {
                web_sys::console::error_1(&format!("[bridge] {name} failed: {err}").into());
                path
            }
        }
    }) as Box<dyn Fn(String, String) -> String>);
    js_sys::Reflect::set(target, &name.into(), forward.as_ref())?;
    forward.forget();
    Ok(())
}

fn attach_read_file(target: &JsValue, fs: FileSystemProxy) -> Result<(), JsValue> {
    let forward = Closure::wrap(Box::new(move |path: String| -> js_sys::Promise {
        web_sys::console::log_2(&"[bridge] readFile called".into(), &path.as_str().into());
        let fs = fs.clone();
        future_to_promise(async move {
            match fs.read_file(&path).await {
                Ok(content) => Ok(JsValue::from_str(&content)),
                Err(err) => Err(JsValue::from_str(&err.to_string())),
            }
        })
    }) as Box<dyn Fn(String) -> js_sys::Promise>);
    js_sys::Reflect::set(target, &"readFile".into(), forward.as_ref())?;
    forward.forget();
    Ok(())
}

fn as_js_error(err: ChannelError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
