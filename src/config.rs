use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::nav::DEFAULT_BREAKPOINT_PX;
use crate::theme::THEME_STORAGE_KEY;

/// Element ids, selectors and texts the client code relies on.
///
/// Every field has a default matching the pages this crate renders, so a
/// partial JSON file only overrides what it names.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub main_selector: String,
    pub form_id: String,
    pub cta_id: String,
    pub menu_toggle_id: String,
    pub nav_menu_id: String,
    pub theme_toggle_id: String,
    pub theme_icon_id: String,
    pub theme_key: String,
    pub nav_breakpoint: u32,
    /// Used when a fetched page has no usable `<title>`.
    pub default_title: String,
    pub error_notice: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            main_selector: "main".to_string(),
            form_id: "formCadastro".to_string(),
            cta_id: "hero-cta".to_string(),
            menu_toggle_id: "menu-toggle".to_string(),
            nav_menu_id: "nav-menu".to_string(),
            theme_toggle_id: "theme-toggle".to_string(),
            theme_icon_id: "theme-icon".to_string(),
            theme_key: THEME_STORAGE_KEY.to_string(),
            nav_breakpoint: DEFAULT_BREAKPOINT_PX,
            default_title: "Portal Solidário".to_string(),
            error_notice: "Não foi possível carregar o conteúdo. Verifique sua conexão e tente novamente."
                .to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Selector(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid config: {err}"),
            ConfigError::Selector(selector) => write!(f, "invalid selector {selector:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Parse(value)
    }
}
