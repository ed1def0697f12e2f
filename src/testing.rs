//! In-memory `Session` and `GameHost` doubles for native unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::bridge::GameHost;
use crate::layout::{Geometry, Viewport};
use crate::message::Outbound;
use crate::session::{GetFileOptions, PutFileOptions, Session, SessionError, UserData};

pub struct RecordingHost {
    pub sent: RefCell<Vec<Outbound>>,
    pub alerts: RefCell<Vec<String>>,
    pub progress: RefCell<Vec<f64>>,
    layouts: RefCell<Vec<Geometry>>,
    viewport: Cell<Viewport>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        RecordingHost {
            sent: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
            progress: RefCell::new(Vec::new()),
            layouts: RefCell::new(Vec::new()),
            viewport: Cell::new(Viewport {
                width: 1600.0,
                height: 900.0,
            }),
        }
    }
}

impl RecordingHost {
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set(Viewport { width, height });
    }

    pub fn last_layout(&self) -> Option<Geometry> {
        self.layouts.borrow().last().copied()
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.borrow().len()
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.borrow().clone()
    }
}

impl GameHost for RecordingHost {
    fn send(&self, message: Outbound) -> Result<()> {
        self.sent.borrow_mut().push(message);
        Ok(())
    }

    fn alert(&self, text: &str) {
        self.alerts.borrow_mut().push(text.to_string());
    }

    fn render_progress(&self, progress: f64) -> Result<()> {
        self.progress.borrow_mut().push(progress);
        Ok(())
    }

    fn viewport(&self) -> Result<Viewport> {
        Ok(self.viewport.get())
    }

    fn apply_layout(&self, geometry: &Geometry) -> Result<()> {
        self.layouts.borrow_mut().push(*geometry);
        Ok(())
    }
}

/// Scriptable stand-in for blockstack's `UserSession`
#[derive(Default)]
pub struct FakeSession {
    pub signed_in: Cell<bool>,
    pub pending: Cell<bool>,
    pub pending_result: RefCell<Option<Result<UserData, SessionError>>>,
    pub stored_user: RefCell<Option<UserData>>,
    pub files: RefCell<HashMap<String, String>>,
    pub storage_error: RefCell<Option<SessionError>>,
    pub query_error: RefCell<Option<SessionError>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeSession {
    pub fn signed_in_as(user: UserData) -> Self {
        let session = FakeSession::default();
        session.signed_in.set(true);
        *session.stored_user.borrow_mut() = Some(user);
        session
    }

    pub fn pending_with(result: Result<UserData, SessionError>) -> Self {
        let session = FakeSession::default();
        session.pending.set(true);
        *session.pending_result.borrow_mut() = Some(result);
        session
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.borrow().iter().any(|call| call == name)
    }

    fn record(&self, name: &str) {
        self.calls.borrow_mut().push(name.to_string());
    }

    fn query(&self, value: bool) -> Result<bool, SessionError> {
        match self.query_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    fn storage(&self) -> Result<(), SessionError> {
        match self.storage_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl Session for FakeSession {
    fn is_user_signed_in(&self) -> Result<bool, SessionError> {
        self.query(self.signed_in.get())
    }

    fn is_sign_in_pending(&self) -> Result<bool, SessionError> {
        self.query(self.pending.get())
    }

    async fn handle_pending_sign_in(&self) -> Result<UserData, SessionError> {
        self.record("handlePendingSignIn");
        self.pending.set(false);
        let result = self
            .pending_result
            .borrow_mut()
            .take()
            .unwrap_or(Err(SessionError::Rejected("no pending sign-in".into())));
        if let Ok(user) = &result {
            self.signed_in.set(true);
            *self.stored_user.borrow_mut() = Some(user.clone());
        }
        result
    }

    fn redirect_to_sign_in(&self) -> Result<(), SessionError> {
        self.record("redirectToSignIn");
        Ok(())
    }

    fn sign_user_out(&self, redirect_url: Option<&str>) -> Result<(), SessionError> {
        match redirect_url {
            Some(url) => self.record(&format!("signUserOut({url})")),
            None => self.record("signUserOut"),
        }
        self.signed_in.set(false);
        Ok(())
    }

    fn load_user_data(&self) -> Result<Option<UserData>, SessionError> {
        Ok(self.stored_user.borrow().clone())
    }

    async fn put_file(
        &self,
        path: &str,
        content: &str,
        options: PutFileOptions,
    ) -> Result<(), SessionError> {
        self.record(&format!("putFile(encrypt={})", options.encrypt));
        self.storage()?;
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn get_file(
        &self,
        path: &str,
        options: GetFileOptions,
    ) -> Result<Option<String>, SessionError> {
        self.record(&format!("getFile(decrypt={})", options.decrypt));
        self.storage()?;
        Ok(self.files.borrow().get(path).cloned())
    }
}

/// Host whose every DOM call fails, for error-path tests
pub struct BrokenHost;

impl GameHost for BrokenHost {
    fn send(&self, _message: Outbound) -> Result<()> {
        Err(anyhow!("game instance not ready"))
    }

    fn alert(&self, _text: &str) {}

    fn render_progress(&self, _progress: f64) -> Result<()> {
        Err(anyhow!("no progress bar"))
    }

    fn viewport(&self) -> Result<Viewport> {
        Err(anyhow!("Window not found"))
    }

    fn apply_layout(&self, _geometry: &Geometry) -> Result<()> {
        Err(anyhow!("no container"))
    }
}
