#![cfg(target_arch = "wasm32")]

use apollos_web::browser;
use apollos_web::config::Config;
use apollos_web::message::{Inbound, Payload};
use apollos_web::player_data::PlayerData;
use apollos_web::session::SessionError;
use apollos_web::unity::{payload_from_js, register_events};
use js_sys::{Function, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn jslib_arguments_become_payloads() {
    assert_eq!(payload_from_js(&JsValue::UNDEFINED), Payload::Empty);
    assert_eq!(payload_from_js(&JsValue::NULL), Payload::Empty);
    assert_eq!(payload_from_js(&JsValue::from_f64(0.5)), Payload::Number(0.5));
    assert_eq!(
        payload_from_js(&JsValue::from_str(r#"{"x":1}"#)),
        Payload::Text(r#"{"x":1}"#.into())
    );
}

#[wasm_bindgen_test]
fn save_event_from_js_string_decodes() {
    let payload = payload_from_js(&JsValue::from_str(r#"{"level":2}"#));
    assert_eq!(
        Inbound::decode("SavePlayerData", payload).unwrap(),
        Inbound::SavePlayerData(Some(r#"{"level":2}"#.into()))
    );
}

#[wasm_bindgen_test]
fn missing_options_use_defaults() {
    assert_eq!(Config::from_js(JsValue::UNDEFINED).unwrap(), Config::default());
}

#[wasm_bindgen_test]
fn options_object_overrides_fields() {
    let options = js_sys::JSON::parse(r#"{"uiObject":"Menu","designWidth":1024}"#).unwrap();
    let config = Config::from_js(options).unwrap();
    assert_eq!(config.ui_object, "Menu");
    assert_eq!(config.design_width, 1024);
    assert_eq!(config.design_height, 480);
}

#[wasm_bindgen_test]
fn thrown_errors_classify_existing_session() {
    let err: JsValue = js_sys::Error::new("Existing user session found").into();
    assert_eq!(
        SessionError::from_message(&browser::js_error_message(&err)),
        SessionError::ExistingSession
    );
    assert_eq!(browser::js_error_message(&JsValue::from_str("plain")), "plain");
}

#[wasm_bindgen_test]
fn viewport_reads_window_size() {
    let viewport = browser::viewport().unwrap();
    assert!(viewport.width > 0.0);
    assert!(viewport.height > 0.0);
}

#[wasm_bindgen_test]
fn styles_are_written_to_elements() {
    let element: HtmlElement = browser::create_element("div").unwrap();
    browser::set_style(&element, "width", "1500px").unwrap();
    assert_eq!(element.style().get_property_value("width").unwrap(), "1500px");
}

#[wasm_bindgen_test]
fn player_data_matches_js_stringify() {
    let data = PlayerData::parse(Some(r#"{"hp":100.0,"big":1e2,"z":-0,"2":1,"1":0}"#)).unwrap();
    assert_eq!(data.to_json(), r#"{"1":0,"2":1,"hp":100,"big":100,"z":0}"#);
    assert!(PlayerData::parse(Some("{not json")).is_err());
}

#[wasm_bindgen_test]
fn registered_events_are_callable_from_the_window() {
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    register_events(Rc::new(move |message| sink.borrow_mut().push(message))).unwrap();

    let window: JsValue = browser::window().unwrap().into();
    let events = Reflect::get(&window, &JsValue::from_str("ReactUnityWebGL")).unwrap();
    let handler: Function = Reflect::get(&events, &JsValue::from_str("IsLoggedIn"))
        .unwrap()
        .into();
    handler.call1(&JsValue::NULL, &JsValue::UNDEFINED).unwrap();

    assert_eq!(*received.borrow(), vec![Inbound::IsLoggedIn]);
}
