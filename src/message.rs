use anyhow::{anyhow, Result};

/// Raw argument a Unity jslib call hands to `ReactUnityWebGL.<Name>(...)`,
/// converted once from `JsValue` (see `unity::payload_from_js`)
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Number(f64),
    Text(String),
}

/// Everything the embedded game can ask of the page
///
/// ┌──────────────────── Inbound Messages ────────────────────┐
/// │  Event name          →  Variant                          │
/// ├──────────────────────────────────────────────────────────┤
/// │  progress(f64)       →  Progress(f64)                    │
/// │  Login()             →  Login                            │
/// │  IsLoggedIn()        →  IsLoggedIn                       │
/// │  Logout()            →  Logout                           │
/// │  SavePlayerData(s)   →  SavePlayerData(Option<String>)   │
/// │  RequestPlayerData() →  RequestPlayerData                │
/// └──────────────────────────────────────────────────────────┘
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Progress(f64),
    Login,
    IsLoggedIn,
    Logout,
    SavePlayerData(Option<String>),
    RequestPlayerData,
}

impl Inbound {
    pub const PROGRESS: &'static str = "progress";

    /// Events the game's jslib emits by name. `progress` is not here because
    /// it comes from the loader's `onProgress` callback instead.
    pub const GAME_EVENTS: [&'static str; 5] = [
        "Login",
        "IsLoggedIn",
        "Logout",
        "SavePlayerData",
        "RequestPlayerData",
    ];

    pub fn decode(name: &str, payload: Payload) -> Result<Inbound> {
        match (name, payload) {
            (Self::PROGRESS, Payload::Number(progress)) if !progress.is_nan() => {
                Ok(Inbound::Progress(progress.clamp(0.0, 1.0)))
            }
            ("Login", _) => Ok(Inbound::Login),
            ("IsLoggedIn", _) => Ok(Inbound::IsLoggedIn),
            ("Logout", _) => Ok(Inbound::Logout),
            ("SavePlayerData", Payload::Text(data)) => Ok(Inbound::SavePlayerData(Some(data))),
            ("SavePlayerData", Payload::Empty) => Ok(Inbound::SavePlayerData(None)),
            ("RequestPlayerData", _) => Ok(Inbound::RequestPlayerData),
            (name, payload) => Err(anyhow!(
                "Unexpected game event '{}' with payload {:?}",
                name,
                payload
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Inbound::Progress(_) => Self::PROGRESS,
            Inbound::Login => "Login",
            Inbound::IsLoggedIn => "IsLoggedIn",
            Inbound::Logout => "Logout",
            Inbound::SavePlayerData(_) => "SavePlayerData",
            Inbound::RequestPlayerData => "RequestPlayerData",
        }
    }
}

/// Everything the page sends back into the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// "<name>;<avatarUrl>"
    UserLoggedIn(String),
    UserNotLoggedIn,
    /// canonical JSON, or "" when there is nothing usable
    ReceivePlayerData(String),
}

impl Outbound {
    /// C# method on the receiving game object
    pub fn method(&self) -> &'static str {
        match self {
            Outbound::UserLoggedIn(_) => "OnUserLoggedIn",
            Outbound::UserNotLoggedIn => "OnUserNotLoggedIn",
            Outbound::ReceivePlayerData(_) => "ReceivePlayerData",
        }
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            Outbound::UserLoggedIn(payload) | Outbound::ReceivePlayerData(payload) => {
                Some(payload)
            }
            Outbound::UserNotLoggedIn => None,
        }
    }
}
