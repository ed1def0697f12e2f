use anyhow::{anyhow, Result};
use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::layout::DesignSize;

// ==================== Defaults ====================
mod defaults {
    pub const SCOPES: [&str; 2] = ["store_write", "publish_data"];
    pub const BUILD_URL: &str = "Build/Apollos WebGL Build.json";
    pub const LOADER_URL: &str = "Build/UnityLoader.js";
    pub const CONTAINER_ID: &str = "unityContainer";
    pub const DESIGN_WIDTH: u32 = 800;
    pub const DESIGN_HEIGHT: u32 = 480;
    pub const PLAYER_DATA_KEY: &str = "apollos_player_data.json";
    pub const UI_OBJECT: &str = "UI";
    pub const ANONYMOUS_NAME: &str = "Anonymous";
}

/// Runtime settings for the host page.
///
/// Every field has a default, so the page may pass `undefined`, `{}` or
/// only the keys it wants to override:
/// ```js
/// main_js({ buildUrl: "Build/Staging.json", scaleToFit: false });
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Blockstack permission scopes requested at sign-in
    pub scopes: Vec<String>,
    pub build_url: String,
    pub loader_url: String,
    /// element the game is appended to, `<body>` when absent
    pub mount_id: Option<String>,
    pub container_id: String,
    pub design_width: u32,
    pub design_height: u32,
    pub scale_to_fit: bool,
    pub player_data_key: String,
    /// Unity game object receiving every outbound message
    pub ui_object: String,
    pub anonymous_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scopes: defaults::SCOPES.iter().map(|s| s.to_string()).collect(),
            build_url: defaults::BUILD_URL.to_string(),
            loader_url: defaults::LOADER_URL.to_string(),
            mount_id: None,
            container_id: defaults::CONTAINER_ID.to_string(),
            design_width: defaults::DESIGN_WIDTH,
            design_height: defaults::DESIGN_HEIGHT,
            scale_to_fit: true,
            player_data_key: defaults::PLAYER_DATA_KEY.to_string(),
            ui_object: defaults::UI_OBJECT.to_string(),
            anonymous_name: defaults::ANONYMOUS_NAME.to_string(),
        }
    }
}

impl Config {
    /// Decode the optional options object handed to `main_js`
    pub fn from_js(options: JsValue) -> Result<Self> {
        if options.is_undefined() || options.is_null() {
            return Ok(Config::default());
        }
        let config: Config = serde_wasm_bindgen::from_value(options)
            .map_err(|err| anyhow!("Invalid options passed to main_js : {:#?}", err))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if self.design_width == 0 || self.design_height == 0 {
            return Err(anyhow!(
                "Design size must be positive, got {}x{}",
                self.design_width,
                self.design_height
            ));
        }
        Ok(self)
    }

    pub fn design_size(&self) -> DesignSize {
        DesignSize {
            width: self.design_width,
            height: self.design_height,
        }
    }
}
