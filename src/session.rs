use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message blockstack.js rejects `handlePendingSignIn` with when a session
/// already exists in local storage
pub const EXISTING_SESSION_MESSAGE: &str = "Existing user session";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Pending sign-in found a live session already, which is a success
    #[error("existing user session")]
    ExistingSession,
    /// Signed in, but the library returned no user data
    #[error("unable to load user data")]
    MissingUserData,
    #[error("session call rejected: {0}")]
    Rejected(String),
}

impl SessionError {
    /// Classify a rejection message coming out of the JS library
    pub fn from_message(message: &str) -> Self {
        if message.contains(EXISTING_SESSION_MESSAGE) {
            SessionError::ExistingSession
        } else {
            SessionError::Rejected(message.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PutFileOptions {
    pub encrypt: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GetFileOptions {
    pub decrypt: bool,
}

/// Subset of blockstack's `UserData` the page cares about
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// schema.org `Person` as stored in a Blockstack profile
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// full display name, e.g. "Alice Smith"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub image: Vec<ProfileImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_url: Option<String>,
}

impl Profile {
    /// `givenName`, else derived from `name`: every word but the last
    /// ("Mary Jane Watson" -> "Mary Jane"), or the only word
    pub fn given_name(&self) -> Option<String> {
        if let Some(given_name) = non_empty(self.given_name.as_deref()) {
            return Some(given_name.to_string());
        }
        let words: Vec<&str> = non_empty(self.name.as_deref())?.split(' ').collect();
        let given_name = match words.split_last() {
            Some((_, rest)) if !rest.is_empty() => rest.join(" "),
            _ => words[0].to_string(),
        };
        non_empty(Some(given_name.as_str())).map(str::to_string)
    }

    /// `contentUrl` of the image named "avatar", the last one when there
    /// are several
    pub fn avatar_url(&self) -> Option<&str> {
        self.image
            .iter()
            .rev()
            .find(|image| image.name.as_deref() == Some("avatar"))
            .and_then(|image| non_empty(image.content_url.as_deref()))
    }
}

/// Name and avatar shown in the game's UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUser {
    pub name: String,
    pub avatar: String,
}

impl DisplayUser {
    pub const SEPARATOR: char = ';';

    /// username, else given name, else `anonymous`
    pub fn from_user_data(user: &UserData, anonymous: &str) -> Self {
        let profile = user.profile.as_ref();
        let name = non_empty(user.username.as_deref())
            .map(str::to_string)
            .or_else(|| profile.and_then(Profile::given_name))
            .unwrap_or_else(|| anonymous.to_string());
        let avatar = profile.and_then(Profile::avatar_url).unwrap_or("");
        DisplayUser {
            name,
            avatar: avatar.to_string(),
        }
    }

    pub fn payload(&self) -> String {
        format!("{}{}{}", self.name, Self::SEPARATOR, self.avatar)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// The identity/storage client the bridge drives
///
/// ELI5: web assembly is single threaded, so `?Send` lets implementors hold
/// `JsValue`s across awaits
#[async_trait(?Send)]
pub trait Session {
    fn is_user_signed_in(&self) -> Result<bool, SessionError>;
    fn is_sign_in_pending(&self) -> Result<bool, SessionError>;
    async fn handle_pending_sign_in(&self) -> Result<UserData, SessionError>;
    fn redirect_to_sign_in(&self) -> Result<(), SessionError>;
    fn sign_user_out(&self, redirect_url: Option<&str>) -> Result<(), SessionError>;
    fn load_user_data(&self) -> Result<Option<UserData>, SessionError>;
    async fn put_file(
        &self,
        path: &str,
        content: &str,
        options: PutFileOptions,
    ) -> Result<(), SessionError>;
    /// `Ok(None)` when the file does not exist
    async fn get_file(
        &self,
        path: &str,
        options: GetFileOptions,
    ) -> Result<Option<String>, SessionError>;
}
