use anyhow::{anyhow, Result};
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure, WasmClosureFnOnce};
use wasm_bindgen::{JsCast, JsValue};

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    HtmlElement,
};

use crate::layout::Viewport;

// ==================== Constants ====================
// Constants related to HTML elements
pub mod html {
    pub const DIV: &str = "div";
    pub const SCRIPT: &str = "script";
    pub const PERCENT_100: &str = "100%";
    pub const DISPLAY_NONE: &str = "none";
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn body() -> Result<HtmlElement> {
    document()?
        .body()
        .ok_or_else(|| anyhow!("No Body Element found"))
}

pub fn element_by_id(id: &str) -> Result<HtmlElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))?
        .dyn_into::<HtmlElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlElement", element))
}

/// `document.createElement(tag)` cast to the requested element type
pub fn create_element<T: JsCast>(tag: &str) -> Result<T> {
    document()?
        .create_element(tag)
        .map_err(|err| anyhow!("Could not create <{}> element : {:#?}", tag, err))?
        .dyn_into::<T>()
        .map_err(|element| anyhow!("Error converting {:#?} to requested element", element))
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) -> Result<()> {
    element
        .style()
        .set_property(property, value)
        .map_err(|err| anyhow!("Could not set style {}={} : {:#?}", property, value, err))
}

/// window.innerWidth / window.innerHeight
pub fn viewport() -> Result<Viewport> {
    let window = window()?;
    let width = window
        .inner_width()
        .map_err(|err| anyhow!("Could not read innerWidth : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerWidth is not a number"))?;
    let height = window
        .inner_height()
        .map_err(|err| anyhow!("Could not read innerHeight : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerHeight is not a number"))?;
    Ok(Viewport { width, height })
}

pub fn origin() -> Result<String> {
    window()?
        .location()
        .origin()
        .map_err(|err| anyhow!("Could not read location.origin : {:#?}", err))
}

pub fn alert(text: &str) -> Result<()> {
    window()?
        .alert_with_message(text)
        .map_err(|err| anyhow!("Could not show alert : {:#?}", err))
}

/// Replace window.onresize, the page only ever has one resize handler
pub fn set_onresize(handler: Closure<dyn FnMut()>) -> Result<()> {
    window()?.set_onresize(Some(handler.as_ref().unchecked_ref()));
    // the page keeps calling it until unload
    handler.forget();
    Ok(())
}

/// Stringify whatever a JS call threw, preferring `Error.message`
pub fn js_error_message(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

pub fn closure_once<F, A, R>(f: F) -> Closure<F::FnMut>
where
    F: 'static + WasmClosureFnOnce<A, R>,
{
    Closure::once(f)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
