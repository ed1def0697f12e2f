use anyhow::{anyhow, Result};
use async_trait::async_trait;
use js_sys::{Array, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::browser;
use crate::session::{GetFileOptions, PutFileOptions, Session, SessionError, UserData};

// blockstack.js UMD bundle, loaded by the host page as `window.blockstack`
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = blockstack)]
    type AppConfig;

    #[wasm_bindgen(constructor, catch, js_namespace = blockstack)]
    fn new(scopes: &Array) -> Result<AppConfig, JsValue>;

    #[wasm_bindgen(js_namespace = blockstack)]
    type UserSession;

    #[wasm_bindgen(constructor, catch, js_namespace = blockstack)]
    fn new(options: &JsValue) -> Result<UserSession, JsValue>;

    #[wasm_bindgen(method, catch, js_name = isUserSignedIn)]
    fn is_user_signed_in(this: &UserSession) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch, js_name = isSignInPending)]
    fn is_sign_in_pending(this: &UserSession) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch, js_name = handlePendingSignIn)]
    fn handle_pending_sign_in(this: &UserSession) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = redirectToSignIn)]
    fn redirect_to_sign_in(this: &UserSession) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = signUserOut)]
    fn sign_user_out(this: &UserSession, redirect_url: Option<&str>) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = loadUserData)]
    fn load_user_data(this: &UserSession) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = putFile)]
    fn put_file(
        this: &UserSession,
        path: &str,
        content: &str,
        options: &JsValue,
    ) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getFile)]
    fn get_file(this: &UserSession, path: &str, options: &JsValue) -> Result<Promise, JsValue>;
}

/// `Session` backed by a real `blockstack.UserSession`
pub struct BlockstackSession {
    session: UserSession,
}

impl BlockstackSession {
    pub fn new(scopes: &[String]) -> Result<Self> {
        let scopes: Array = scopes.iter().map(|scope| JsValue::from_str(scope)).collect();
        let app_config = AppConfig::new(&scopes).map_err(|err| {
            anyhow!("Could not create AppConfig : {}", browser::js_error_message(&err))
        })?;
        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("appConfig"), &app_config)
            .map_err(|err| anyhow!("Could not build UserSession options : {:#?}", err))?;
        let session = UserSession::new(&options).map_err(|err| {
            anyhow!("Could not create UserSession : {}", browser::js_error_message(&err))
        })?;
        Ok(BlockstackSession { session })
    }
}

/// Turn a thrown value or rejected promise into a typed error
fn rejected(err: JsValue) -> SessionError {
    SessionError::from_message(&browser::js_error_message(&err))
}

fn to_options<T: Serialize>(options: &T) -> Result<JsValue, SessionError> {
    serde_wasm_bindgen::to_value(options)
        .map_err(|err| SessionError::Rejected(format!("Invalid file options : {}", err)))
}

fn decode_user_data(value: JsValue) -> Result<UserData, SessionError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| SessionError::Rejected(format!("Malformed user data : {}", err)))
}

#[async_trait(?Send)]
impl Session for BlockstackSession {
    fn is_user_signed_in(&self) -> Result<bool, SessionError> {
        self.session.is_user_signed_in().map_err(rejected)
    }

    fn is_sign_in_pending(&self) -> Result<bool, SessionError> {
        self.session.is_sign_in_pending().map_err(rejected)
    }

    async fn handle_pending_sign_in(&self) -> Result<UserData, SessionError> {
        let promise = self.session.handle_pending_sign_in().map_err(rejected)?;
        let value = JsFuture::from(promise).await.map_err(rejected)?;
        decode_user_data(value)
    }

    fn redirect_to_sign_in(&self) -> Result<(), SessionError> {
        // navigation happens as a side effect, the returned promise never matters
        self.session.redirect_to_sign_in().map(|_| ()).map_err(rejected)
    }

    fn sign_user_out(&self, redirect_url: Option<&str>) -> Result<(), SessionError> {
        self.session.sign_user_out(redirect_url).map_err(rejected)
    }

    fn load_user_data(&self) -> Result<Option<UserData>, SessionError> {
        let value = self.session.load_user_data().map_err(rejected)?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        decode_user_data(value).map(Some)
    }

    async fn put_file(
        &self,
        path: &str,
        content: &str,
        options: PutFileOptions,
    ) -> Result<(), SessionError> {
        let promise = self
            .session
            .put_file(path, content, &to_options(&options)?)
            .map_err(rejected)?;
        JsFuture::from(promise).await.map(|_| ()).map_err(rejected)
    }

    async fn get_file(
        &self,
        path: &str,
        options: GetFileOptions,
    ) -> Result<Option<String>, SessionError> {
        let promise = self
            .session
            .get_file(path, &to_options(&options)?)
            .map_err(rejected)?;
        let value = JsFuture::from(promise).await.map_err(rejected)?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        value
            .as_string()
            .map(Some)
            .ok_or_else(|| SessionError::Rejected(format!("{} is not a text file", path)))
    }
}
