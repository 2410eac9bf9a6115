use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    Element,
    HtmlCanvasElement,
};

// ==================== Logging ====================
// console.log / console.error with format! arguments
// - only meaningful inside the browser, keep them out of pure simulation code
macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    }
}

macro_rules! error {
    ($($t:tt)*) => {
        web_sys::console::error_1(&format!($($t)*).into())
    }
}

// ==================== Constants ====================
// Constants related to HTML elements
pub mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
    pub const START_SCREEN: &str = "startScreen";
    pub const RETRY_SCREEN: &str = "retryScreen";
    pub const CONTINUE_BUTTON: &str = "continueButton";
    pub const RETRY_BUTTON: &str = "retryButton";
    // css class toggled on the overlay screens
    pub const HIDDEN_CLASS: &str = "hidden";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn element(id: &str) -> Result<Element> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))
}

pub fn canvas(canvas_id: &str) -> Result<HtmlCanvasElement> {
    element(canvas_id)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn context(canvas_id: &str) -> Result<CanvasRenderingContext2d> {
    canvas(canvas_id)?
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - map the JsValue error into anyhow
        // - map the None case into an error too
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

/// Milliseconds since page load, from `performance.now()`
pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

pub fn hide(id: &str) -> Result<()> {
    element(id)?
        .class_list()
        .add_1(html::HIDDEN_CLASS)
        .map_err(|err| anyhow!("Could not hide '{}' : {:#?}", id, err))
}

pub fn show(id: &str) -> Result<()> {
    element(id)?
        .class_list()
        .remove_1(html::HIDDEN_CLASS)
        .map_err(|err| anyhow!("Could not show '{}' : {:#?}", id, err))
}

/// Every click on the element becomes one `()` on the returned stream.
/// The listener lives for the rest of the page, so the closure is leaked.
pub fn click_stream(id: &str) -> Result<UnboundedReceiver<()>> {
    let (click_sender, click_receiver) = unbounded();
    let on_click = closure_wrap(Box::new(move |_event: web_sys::Event| {
        let _ = click_sender.unbounded_send(());
    }) as Box<dyn FnMut(web_sys::Event)>);

    element(id)?
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen for clicks on '{}' : {:#?}", id, err))?;
    on_click.forget();

    Ok(click_receiver)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f))
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Turn a JS-side failure into something `?` understands at the wasm boundary
pub fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
