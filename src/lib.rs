// ==================== Imports ====================
use log::{error, info, warn, Level};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

pub mod blockstack;
pub mod bridge;
pub mod browser;
pub mod config;
pub mod layout;
pub mod message;
pub mod player_data;
pub mod session;
pub mod unity;

#[cfg(test)]
mod testing;

use crate::blockstack::BlockstackSession;
use crate::bridge::Bridge;
use crate::config::Config;
use crate::message::Inbound;
use crate::unity::UnityGame;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - builds the Blockstack session and the Unity host from `options`
/// - registers the game event handlers and window.onresize
/// - mounts the Unity build
///
/// ```js
/// import init, { main_js } from "./pkg/apollos_web.js";
/// await init();
/// const app = main_js({ mountId: "root" });
/// ```
#[wasm_bindgen]
pub fn main_js(options: JsValue) -> Result<App, JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    init_logging();

    let config = Rc::new(Config::from_js(options).map_err(to_js_error)?);
    let session = Rc::new(BlockstackSession::new(&config.scopes).map_err(to_js_error)?);
    let game = Rc::new(UnityGame::new(Rc::clone(&config)));
    let bridge = Rc::new(Bridge::new(session, game.clone(), Rc::clone(&config)));

    let dispatcher = Rc::clone(&bridge);
    let on_message: Rc<dyn Fn(Inbound)> =
        Rc::new(move |message: Inbound| dispatcher.dispatch(message));
    unity::register_events(Rc::clone(&on_message)).map_err(to_js_error)?;

    let resizer = Rc::clone(&bridge);
    browser::set_onresize(browser::closure_wrap(
        Box::new(move || resizer.on_resize()) as Box<dyn FnMut()>
    ))
    .map_err(to_js_error)?;

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    let mounting = Rc::clone(&game);
    browser::spawn_local(async move {
        if let Err(err) = mounting.mount(on_message).await {
            error!("Could not start the game : {:#}", err);
        }
    });

    info!("Apollos bridge ready, loading {}", config.build_url);
    Ok(App { bridge, game })
}

/// Handle returned to the host page
#[wasm_bindgen]
pub struct App {
    bridge: Rc<Bridge>,
    game: Rc<UnityGame>,
}

#[wasm_bindgen]
impl App {
    /// Sign out and return to this page's origin
    pub fn sign_out(&self) {
        let result = browser::origin().and_then(|origin| self.bridge.sign_out_to(&origin));
        if let Err(err) = result {
            warn!("{:#}", err);
        }
    }

    pub fn set_fullscreen(&self) {
        if let Err(err) = self.game.set_fullscreen() {
            warn!("Error in setFullScreen : {:#}", err);
        }
    }

    pub fn resize(&self) {
        self.bridge.on_resize();
    }
}

fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    };
    // a second main_js call finds the logger already installed
    let _ = console_log::init_with_level(level);
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
