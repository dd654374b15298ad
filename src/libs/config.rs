//! Configuration management for dincharya.
//!
//! Settings are kept as pretty-printed JSON in `config.json` inside the
//! platform data directory ([`DataStorage`]). Two modules exist:
//!
//! - **Firebase**: web API key and realtime database URL, plus the identity
//!   and token endpoints (overridable for local emulators)
//! - **Dashboard**: the category shown when none is given on the command line
//!
//! `DINCHARYA_API_KEY` and `DINCHARYA_DATABASE_URL` (also read from a
//! `.env` file) override the Firebase values of the file, which makes the
//! client usable without running `dincharya init`.
//!
//! Passwords are never written here; the session token has its own
//! encrypted file.
//!
//! ```rust,no_run
//! use dincharya::libs::config::Config;
//!
//! let config = Config::read()?.apply_env();
//! let firebase = config.firebase()?;
//! println!("database: {}", firebase.database_url);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::task::Category;
use crate::{msg_bail_anyhow, msg_print};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ENV_API_KEY: &str = "DINCHARYA_API_KEY";
pub const ENV_DATABASE_URL: &str = "DINCHARYA_DATABASE_URL";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Represents a configurable module in the interactive setup.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

/// Connection settings for the identity API and the realtime database.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub database_url: String,
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl FirebaseConfig {
    pub fn new(api_key: &str, database_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            database_url: database_url.to_string(),
            identity_url: default_identity_url(),
            token_url: default_token_url(),
        }
    }

    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "firebase".to_string(),
            name: "Firebase".to_string(),
        }
    }

    pub fn init(config: &Option<FirebaseConfig>) -> Result<Self> {
        let default = config.clone().unwrap_or_else(|| FirebaseConfig::new("", ""));
        msg_print!(Message::ConfigModuleFirebase);
        Ok(Self {
            api_key: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptApiKey.to_string())
                .default(default.api_key)
                .interact_text()?,
            database_url: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptDatabaseUrl.to_string())
                .default(default.database_url)
                .interact_text()?,
            identity_url: default.identity_url,
            token_url: default.token_url,
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub default_category: Category,
}

impl DashboardConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "dashboard".to_string(),
            name: "Dashboard".to_string(),
        }
    }

    pub fn init(config: &Option<DashboardConfig>) -> Result<Self> {
        let default = config.clone().unwrap_or_default();
        msg_print!(Message::ConfigModuleDashboard);
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.title()).collect();
        let current = Category::ALL.iter().position(|c| *c == default.default_category).unwrap_or(0);
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptDefaultCategory.to_string())
            .items(&names)
            .default(current)
            .interact()?;
        Ok(Self {
            default_category: Category::ALL[selection],
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardConfig>,
}

impl Config {
    /// Reads the configuration from the data directory, or the default when no file exists.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Applies the `DINCHARYA_*` environment overrides, loading `.env` first.
    pub fn apply_env(self) -> Self {
        let _ = dotenv::dotenv();
        self.with_overrides(std::env::var(ENV_API_KEY).ok(), std::env::var(ENV_DATABASE_URL).ok())
    }

    /// Overrides the Firebase settings. A module is created only when both values are known.
    pub fn with_overrides(mut self, api_key: Option<String>, database_url: Option<String>) -> Self {
        let api_key = api_key.filter(|v| !v.trim().is_empty());
        let database_url = database_url.filter(|v| !v.trim().is_empty());

        match (self.firebase.as_mut(), api_key, database_url) {
            (Some(firebase), api_key, database_url) => {
                if let Some(api_key) = api_key {
                    firebase.api_key = api_key;
                }
                if let Some(database_url) = database_url {
                    firebase.database_url = database_url;
                }
            }
            (None, Some(api_key), Some(database_url)) => {
                self.firebase = Some(FirebaseConfig::new(&api_key, &database_url));
            }
            _ => {}
        }
        self
    }

    /// The Firebase module, or an error telling the user to run `init`.
    pub fn firebase(&self) -> Result<FirebaseConfig> {
        match &self.firebase {
            Some(firebase) if !firebase.api_key.is_empty() && !firebase.database_url.is_empty() => Ok(firebase.clone()),
            _ => msg_bail_anyhow!(Message::ConfigMissingFirebase),
        }
    }

    pub fn default_category(&self) -> Category {
        self.dashboard.as_ref().map(|d| d.default_category).unwrap_or_default()
    }

    /// Interactive setup wizard, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![FirebaseConfig::module(), DashboardConfig::module()];
        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "firebase" => config.firebase = Some(FirebaseConfig::init(&config.firebase)?),
                "dashboard" => config.dashboard = Some(DashboardConfig::init(&config.dashboard)?),
                _ => {}
            }
        }

        Ok(config)
    }
}
