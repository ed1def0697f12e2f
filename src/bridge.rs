use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::rc::Rc;

use crate::browser;
use crate::config::Config;
use crate::layout::{Geometry, LayoutManager, Viewport};
use crate::message::{Inbound, Outbound};
use crate::player_data::PlayerData;
use crate::session::{DisplayUser, GetFileOptions, PutFileOptions, Session, SessionError, UserData};

/// The page around the embedded game, as seen by the bridge
pub trait GameHost {
    /// SendMessage into the game
    fn send(&self, message: Outbound) -> Result<()>;
    fn alert(&self, text: &str);
    fn render_progress(&self, progress: f64) -> Result<()>;
    fn viewport(&self) -> Result<Viewport>;
    fn apply_layout(&self, geometry: &Geometry) -> Result<()>;
}

const MISSING_LOGIN_ALERT: &str = "Unable to get login information. Try again later.";

/// TABLE
/// ┌────────────────────────── Event Flow ───────────────────────────┐
/// │                                                                 │
/// │  ┌──────────┐  Inbound   ┌──────────┐  Session   ┌───────────┐  │
/// │  │  Unity   ├───────────►│  Bridge  ├───────────►│ Blockstack│  │
/// │  │  jslib   │            │ dispatch │◄───────────┤ (async)   │  │
/// │  └────▲─────┘            └────┬─────┘  Result    └───────────┘  │
/// │       │        Outbound       │                                 │
/// │       └───────────────────────┘                                 │
/// │                                                                 │
/// └─────────────────────────────────────────────────────────────────┘
pub struct Bridge {
    session: Rc<dyn Session>,
    host: Rc<dyn GameHost>,
    layout: LayoutManager,
    config: Rc<Config>,
}

impl Bridge {
    pub fn new(session: Rc<dyn Session>, host: Rc<dyn GameHost>, config: Rc<Config>) -> Self {
        Bridge {
            layout: LayoutManager::new(config.design_size(), config.scale_to_fit),
            session,
            host,
            config,
        }
    }

    /// Entry point for every game event. Never fails and never blocks:
    /// progress runs inline, everything else is spawned.
    pub fn dispatch(self: &Rc<Self>, message: Inbound) {
        debug!("Dispatching game event '{}'", message.name());
        if let Inbound::Progress(progress) = message {
            self.progress(progress);
            return;
        }
        let bridge = Rc::clone(self);
        browser::spawn_local(async move {
            let name = message.name();
            if let Err(err) = bridge.handle(message).await {
                warn!("Error in event->on.{} : {:#}", name, err);
            }
        });
    }

    pub async fn handle(&self, message: Inbound) -> Result<()> {
        match message {
            Inbound::Progress(progress) => {
                self.progress(progress);
                Ok(())
            }
            Inbound::Login => self.login().await,
            Inbound::IsLoggedIn => self.is_logged_in().await,
            Inbound::Logout => self.logout(),
            Inbound::SavePlayerData(data) => self.save_player_data(data).await,
            Inbound::RequestPlayerData => self.request_player_data().await,
        }
    }

    // ==================== Layout ====================
    pub fn resize(&self) -> Result<Geometry> {
        self.layout.resize(self.host.as_ref())
    }

    /// window.onresize
    pub fn on_resize(&self) {
        if let Err(err) = self.resize() {
            warn!("Error in resizeWindow : {:#}", err);
        }
    }

    fn progress(&self, progress: f64) {
        if let Err(err) = self.host.render_progress(progress) {
            warn!("Error in event->on.progress : {:#}", err);
        }
        match self.layout.on_progress(self.host.as_ref(), progress) {
            Ok(Some(geometry)) => debug!("Initial layout {:?}", geometry),
            Ok(None) => {}
            Err(err) => warn!("Error in initial resize : {:#}", err),
        }
    }

    // ==================== Session ====================
    async fn is_logged_in(&self) -> Result<()> {
        let message = match self.current_user().await {
            Ok(Some(user)) => self.logged_in(&user),
            Ok(None) => Outbound::UserNotLoggedIn,
            Err(SessionError::MissingUserData) => {
                self.abandon_session();
                Outbound::UserNotLoggedIn
            }
            Err(err) => {
                warn!("Error in event->on.IsLoggedIn : {}", err);
                Outbound::UserNotLoggedIn
            }
        };
        self.host.send(message)
    }

    async fn login(&self) -> Result<()> {
        match self.current_user().await {
            Ok(Some(user)) => self.host.send(self.logged_in(&user)),
            Ok(None) => self.restart_sign_in(),
            Err(SessionError::MissingUserData) => {
                self.abandon_session();
                Ok(())
            }
            Err(err) => {
                warn!("Error in handleSignIn->handlePendingSignIn : {}", err);
                self.restart_sign_in()
            }
        }
    }

    fn logout(&self) -> Result<()> {
        info!("Signing user out");
        self.session
            .sign_user_out(None)
            .map_err(|err| anyhow!("Could not sign out : {}", err))
    }

    /// Sign out and send the browser back to `origin`
    pub fn sign_out_to(&self, origin: &str) -> Result<()> {
        self.session
            .sign_user_out(Some(origin))
            .map_err(|err| anyhow!("Error in handleSignOut : {}", err))
    }

    /// ┌──────────── Session State → User ──────────────────────────┐
    /// │  signed in          → stored user data                     │
    /// │  pending            → handlePendingSignIn()                │
    /// │    └─ ExistingSession → stored user data                   │
    /// │  neither            → None                                 │
    /// └────────────────────────────────────────────────────────────┘
    async fn current_user(&self) -> Result<Option<UserData>, SessionError> {
        if self.session.is_user_signed_in()? {
            return self.stored_user().map(Some);
        }
        if !self.session.is_sign_in_pending()? {
            return Ok(None);
        }
        match self.session.handle_pending_sign_in().await {
            Ok(user) => {
                info!("Pending sign-in completed");
                Ok(Some(user))
            }
            Err(SessionError::ExistingSession) => {
                info!("Pending sign-in found an existing session");
                self.stored_user().map(Some)
            }
            Err(err) => Err(err),
        }
    }

    fn stored_user(&self) -> Result<UserData, SessionError> {
        self.session
            .load_user_data()?
            .ok_or(SessionError::MissingUserData)
    }

    fn logged_in(&self, user: &UserData) -> Outbound {
        let display = DisplayUser::from_user_data(user, &self.config.anonymous_name);
        Outbound::UserLoggedIn(display.payload())
    }

    fn restart_sign_in(&self) -> Result<()> {
        // clear whatever half-finished session is left before redirecting
        if let Err(err) = self.session.sign_user_out(None) {
            warn!("Could not clear stale session : {}", err);
        }
        info!("Redirecting to sign-in");
        self.session
            .redirect_to_sign_in()
            .map_err(|err| anyhow!("Could not redirect to sign-in : {}", err))
    }

    fn abandon_session(&self) {
        self.host.alert(MISSING_LOGIN_ALERT);
        if let Err(err) = self.session.sign_user_out(None) {
            warn!("Error in sendUserData : {}", err);
        }
    }

    // ==================== Player Data ====================
    async fn save_player_data(&self, data: Option<String>) -> Result<()> {
        let Some(data) = data else {
            debug!("SavePlayerData without payload, nothing saved");
            return Ok(());
        };
        if !self.session.is_user_signed_in()? || self.session.is_sign_in_pending()? {
            debug!("No signed in user, player data not saved");
            return Ok(());
        }
        self.session
            .put_file(
                &self.config.player_data_key,
                &data,
                PutFileOptions { encrypt: false },
            )
            .await
            .map_err(|err| anyhow!("Could not save player data : {}", err))
    }

    async fn request_player_data(&self) -> Result<()> {
        let payload = match self.load_player_data().await {
            Ok(data) => data.to_json(),
            Err(err) => {
                warn!("Error in event->on.RequestPlayerData : {:#}", err);
                String::new()
            }
        };
        self.host.send(Outbound::ReceivePlayerData(payload))
    }

    async fn load_player_data(&self) -> Result<PlayerData> {
        if !self.session.is_user_signed_in()? {
            return Err(anyhow!("No signed in user"));
        }
        let file = self
            .session
            .get_file(&self.config.player_data_key, GetFileOptions { decrypt: false })
            .await?;
        PlayerData::parse(file.as_deref())
    }
}
