use anyhow::{anyhow, Error, Result};
use futures::channel::oneshot::channel;
use js_sys::{Object, Reflect, JSON};
use log::{debug, warn};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlScriptElement};

use crate::bridge::GameHost;
use crate::browser::{self, html};
use crate::config::Config;
use crate::layout::{Geometry, Viewport};
use crate::message::{Inbound, Outbound, Payload};

/// Global object the game's jslib plugin calls into, e.g.
/// `ReactUnityWebGL.SavePlayerData(Pointer_stringify(data))`
const EVENT_OBJECT: &str = "ReactUnityWebGL";

#[wasm_bindgen]
extern "C" {
    type UnityLoader;

    #[wasm_bindgen(static_method_of = UnityLoader, catch)]
    fn instantiate(
        container_id: &str,
        build_url: &str,
        options: &JsValue,
    ) -> Result<UnityInstance, JsValue>;

    #[derive(Debug, Clone)]
    pub type UnityInstance;

    #[wasm_bindgen(method, catch, js_name = SendMessage)]
    fn send_message(this: &UnityInstance, object: &str, method: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = SendMessage)]
    fn send_message_with_str(
        this: &UnityInstance,
        object: &str,
        method: &str,
        value: &str,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = SetFullscreen)]
    fn set_fullscreen(this: &UnityInstance, fullscreen: i32) -> Result<(), JsValue>;

    /// undefined until the build's wasm module has been created
    #[wasm_bindgen(method, getter, js_name = Module)]
    fn module(this: &UnityInstance) -> Option<UnityModule>;

    #[wasm_bindgen(method, getter)]
    fn container(this: &UnityInstance) -> HtmlElement;

    type UnityModule;

    #[wasm_bindgen(method, getter)]
    fn canvas(this: &UnityModule) -> HtmlCanvasElement;

    #[wasm_bindgen(method, getter, js_name = splashScreenStyle)]
    fn splash_screen_style(this: &UnityModule) -> Option<String>;
}

/// Convert a jslib argument once, at the boundary
pub fn payload_from_js(value: &JsValue) -> Payload {
    if value.is_undefined() || value.is_null() {
        return Payload::Empty;
    }
    if let Some(number) = value.as_f64() {
        return Payload::Number(number);
    }
    if let Some(text) = value.as_string() {
        return Payload::Text(text);
    }
    JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .map(Payload::Text)
        .unwrap_or(Payload::Empty)
}

/// Install one handler per game event on `window.ReactUnityWebGL`
pub fn register_events(on_message: Rc<dyn Fn(Inbound)>) -> Result<()> {
    let events = Object::new();
    for name in Inbound::GAME_EVENTS {
        let dispatch = Rc::clone(&on_message);
        let handler = browser::closure_wrap(Box::new(move |payload: JsValue| {
            match Inbound::decode(name, payload_from_js(&payload)) {
                Ok(message) => dispatch(message),
                Err(err) => warn!("Error in event->on.{} : {:#}", name, err),
            }
        }) as Box<dyn FnMut(JsValue)>);
        Reflect::set(&events, &JsValue::from_str(name), handler.as_ref())
            .map_err(|err| anyhow!("Could not register {} : {:#?}", name, err))?;
        // lives as long as the page
        handler.forget();
    }
    let window: JsValue = browser::window()?.into();
    Reflect::set(&window, &JsValue::from_str(EVENT_OBJECT), &events)
        .map_err(|err| anyhow!("Could not install {} : {:#?}", EVENT_OBJECT, err))?;
    Ok(())
}

/// Asynchronously load a script tag, resolving once it has executed
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(())` - on load success
/// * `Err` - on load fail
pub async fn load_script(source: &str) -> Result<()> {
    let script: HtmlScriptElement = browser::create_element(html::SCRIPT)?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let source_name = source.to_string();
    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[unity.rs::load_script] Error loading {}: {:#?}",
                source_name,
                err
            )));
        }
    });

    script.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    script.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    script.set_src(source);
    browser::body()?
        .append_child(&script)
        .map_err(|err| anyhow!("Could not append script {} : {:#?}", source, err))?;

    // keep callback alive until the script is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    rx.await??;

    Ok(())
}

/// Logo and progress bar shown while the build downloads
struct Splash {
    logo: HtmlElement,
    progress: HtmlElement,
    empty: HtmlElement,
    full: HtmlElement,
}

impl Splash {
    fn create(container: &HtmlElement, style: &str) -> Result<Self> {
        let logo = div(&format!("logo {}", style))?;
        let progress = div(&format!("progress {}", style))?;
        let empty = div("empty")?;
        let full = div("full")?;
        append(&progress, &empty)?;
        append(&progress, &full)?;
        append(container, &logo)?;
        append(container, &progress)?;
        Ok(Splash {
            logo,
            progress,
            empty,
            full,
        })
    }

    fn update(&self, progress: f64) -> Result<()> {
        browser::set_style(&self.empty, "width", &format!("{}%", 100.0 * progress))?;
        browser::set_style(&self.full, "width", &format!("{}%", 100.0 * (1.0 - progress)))?;
        if progress >= 1.0 {
            browser::set_style(&self.logo, "display", html::DISPLAY_NONE)?;
            browser::set_style(&self.progress, "display", html::DISPLAY_NONE)?;
        }
        Ok(())
    }
}

fn div(class_name: &str) -> Result<HtmlElement> {
    let element: HtmlElement = browser::create_element(html::DIV)?;
    element.set_class_name(class_name);
    Ok(element)
}

fn append(parent: &HtmlElement, child: &HtmlElement) -> Result<()> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|err| anyhow!("Could not append element : {:#?}", err))
}

fn px(value: i32) -> String {
    format!("{}px", value)
}

/// The embedded Unity build and the DOM around it
pub struct UnityGame {
    config: Rc<Config>,
    instance: RefCell<Option<UnityInstance>>,
    splash: RefCell<Option<Splash>>,
}

impl UnityGame {
    pub fn new(config: Rc<Config>) -> Self {
        UnityGame {
            config,
            instance: RefCell::new(None),
            splash: RefCell::new(None),
        }
    }

    /// Build the container, load `UnityLoader.js` and instantiate the build.
    /// Loader progress is forwarded to `on_message` as `Inbound::Progress`.
    pub async fn mount(self: Rc<Self>, on_message: Rc<dyn Fn(Inbound)>) -> Result<()> {
        self.create_container()?;
        let window = browser::window()?;
        if !Reflect::has(&window, &JsValue::from_str("UnityLoader")).unwrap_or(false) {
            load_script(&self.config.loader_url).await?;
        }

        let game = Rc::clone(&self);
        let on_progress = browser::closure_wrap(Box::new(
            move |instance: UnityInstance, progress: JsValue| {
                game.attach(instance);
                match Inbound::decode(Inbound::PROGRESS, payload_from_js(&progress)) {
                    Ok(message) => on_message(message),
                    Err(err) => warn!("Error in event->on.progress : {:#}", err),
                }
            },
        ) as Box<dyn FnMut(UnityInstance, JsValue)>);
        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("onProgress"), on_progress.as_ref())
            .map_err(|err| anyhow!("Could not set onProgress : {:#?}", err))?;
        on_progress.forget();

        let instance =
            UnityLoader::instantiate(&self.config.container_id, &self.config.build_url, &options)
                .map_err(|err| {
                    anyhow!(
                        "Could not instantiate {} : {}",
                        self.config.build_url,
                        browser::js_error_message(&err)
                    )
                })?;
        self.attach(instance);
        debug!("Unity build {} instantiated", self.config.build_url);
        Ok(())
    }

    /// `div.webgl-content > div#unityContainer.unityContainer` at design size
    fn create_container(&self) -> Result<()> {
        let content = div("webgl-content")?;
        let container = div("unityContainer")?;
        container.set_id(&self.config.container_id);
        browser::set_style(&container, "width", &px(self.config.design_width as i32))?;
        browser::set_style(&container, "height", &px(self.config.design_height as i32))?;
        append(&content, &container)?;
        let parent = match &self.config.mount_id {
            Some(id) => browser::element_by_id(id)?,
            None => browser::body()?,
        };
        append(&parent, &content)
    }

    fn attach(&self, instance: UnityInstance) {
        let mut slot = self.instance.borrow_mut();
        if slot.is_none() {
            *slot = Some(instance);
        }
    }

    fn instance(&self) -> Result<UnityInstance> {
        self.instance
            .borrow()
            .clone()
            .ok_or_else(|| anyhow!("Unity instance not ready"))
    }

    pub fn set_fullscreen(&self) -> Result<()> {
        self.instance()?
            .set_fullscreen(1)
            .map_err(|err| anyhow!("SetFullscreen failed : {}", browser::js_error_message(&err)))
    }
}

impl GameHost for UnityGame {
    fn send(&self, message: Outbound) -> Result<()> {
        let instance = self
            .instance()
            .map_err(|err| err.context(format!("Dropping {}", message.method())))?;
        let object = &self.config.ui_object;
        let sent = match message.argument() {
            Some(value) => instance.send_message_with_str(object, message.method(), value),
            None => instance.send_message(object, message.method()),
        };
        sent.map_err(|err| {
            anyhow!(
                "SendMessage({}, {}) failed : {}",
                object,
                message.method(),
                browser::js_error_message(&err)
            )
        })
    }

    fn alert(&self, text: &str) {
        if let Err(err) = browser::alert(text) {
            warn!("{:#}", err);
        }
    }

    fn render_progress(&self, progress: f64) -> Result<()> {
        let Some(instance) = self.instance.borrow().clone() else {
            return Ok(());
        };
        let Some(module) = instance.module() else {
            return Ok(());
        };
        let mut splash = self.splash.borrow_mut();
        if splash.is_none() {
            let style = module.splash_screen_style().unwrap_or_default();
            *splash = Some(Splash::create(&instance.container(), &style)?);
        }
        match splash.as_ref() {
            Some(splash) => splash.update(progress),
            None => Ok(()),
        }
    }

    fn viewport(&self) -> Result<Viewport> {
        browser::viewport()
    }

    fn apply_layout(&self, geometry: &Geometry) -> Result<()> {
        let instance = self.instance()?;
        let module = instance
            .module()
            .ok_or_else(|| anyhow!("Unity module not loaded yet"))?;
        let canvas = module.canvas();
        browser::set_style(&canvas, "width", html::PERCENT_100)?;
        browser::set_style(&canvas, "height", html::PERCENT_100)?;

        let container = instance.container();
        browser::set_style(&container, "width", &px(geometry.width))?;
        browser::set_style(&container, "height", &px(geometry.height))?;
        browser::set_style(&container, "top", &px(geometry.top))?;
        browser::set_style(&container, "left", &px(geometry.left))?;
        Ok(())
    }
}
