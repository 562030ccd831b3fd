//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `group-relay.toml` in the working directory
//! 3. Defaults
//!
//! Inside the config file `${VAR_NAME}` is replaced with the value of the
//! environment variable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::allowlist::AllowList;
use crate::Error;

/// Default config file name looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "group-relay.toml";

/// Where an accepted message is delivered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Send into the matching WhatsApp group
    #[default]
    WhatsApp,
    /// Forward to the Hangouts incoming webhook only
    Hangouts,
    /// WhatsApp group first, then the Hangouts webhook
    Both,
}

impl DeliveryMode {
    /// Whether this mode needs a WhatsApp session
    pub fn uses_whatsapp(self) -> bool {
        matches!(self, Self::WhatsApp | Self::Both)
    }

    /// Whether this mode forwards to the Hangouts webhook
    pub fn uses_hangouts(self) -> bool {
        matches!(self, Self::Hangouts | Self::Both)
    }
}

impl FromStr for DeliveryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whatsapp" => Ok(Self::WhatsApp),
            "hangouts" | "gchat" => Ok(Self::Hangouts),
            "both" => Ok(Self::Both),
            other => Err(Error::Config(format!("Unknown delivery mode: {}", other))),
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhatsApp => write!(f, "whatsapp"),
            Self::Hangouts => write!(f, "hangouts"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// WhatsApp sidecar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Base URL of the WhatsApp Web HTTP sidecar
    #[serde(default = "default_whatsapp_api_url")]
    pub api_url: String,

    /// Session name on the sidecar
    #[serde(default = "default_whatsapp_session")]
    pub session: String,

    /// Sidecar API key, sent as `X-Api-Key`
    pub api_key: Option<String>,

    /// Seconds between session status polls during authentication
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_url: default_whatsapp_api_url(),
            session: default_whatsapp_session(),
            api_key: None,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Hangouts (Google Chat) webhook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HangoutsConfig {
    /// Incoming webhook URL
    pub webhook_url: Option<String>,
}

/// Main configuration for group-relay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Group names messages may be sent to
    #[serde(default)]
    pub allowed_groups: Vec<String>,

    #[serde(default)]
    pub delivery: DeliveryMode,

    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    #[serde(default)]
    pub hangouts: HangoutsConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_whatsapp_api_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_whatsapp_session() -> String {
    "default".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}

impl Config {
    /// Replace `${VAR_NAME}` with the environment variable's value
    ///
    /// Unknown variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file
    ///
    /// `${VAR_NAME}` references are expanded before parsing and environment
    /// variables still take precedence over file values.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&Self::expand_env_vars(&toml_content))?;
        cfg.apply_env_overrides()?;

        Ok(cfg)
    }

    /// Load from `group-relay.toml` if present, otherwise from the environment
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            tracing::debug!("Loading configuration from {}", CONFIG_FILE);
            return Self::from_toml_file(CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn from_toml_str(content: &str) -> crate::Result<Self> {
        let toml: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let server = toml.server.unwrap_or_default();
        let groups = toml.groups.unwrap_or_default();
        let delivery = toml.delivery.unwrap_or_default();
        let whatsapp = toml.whatsapp.unwrap_or_default();
        let hangouts = toml.hangouts.unwrap_or_default();

        let delivery = match delivery.mode {
            Some(mode) => mode.parse()?,
            None => DeliveryMode::default(),
        };

        Ok(Config {
            server: ServerConfig {
                host: server.host.unwrap_or_else(default_host),
                port: server.port.unwrap_or_else(default_port),
            },
            allowed_groups: groups.allowed.unwrap_or_default(),
            delivery,
            whatsapp: WhatsAppConfig {
                api_url: whatsapp.api_url.unwrap_or_else(default_whatsapp_api_url),
                session: whatsapp.session.unwrap_or_else(default_whatsapp_session),
                api_key: whatsapp.api_key.filter(|k| !k.is_empty()),
                poll_interval_secs: whatsapp
                    .poll_interval_secs
                    .unwrap_or_else(default_poll_interval_secs),
            },
            hangouts: HangoutsConfig {
                webhook_url: hangouts.webhook_url.filter(|u| !u.is_empty()),
            },
        })
    }

    fn apply_env_overrides(&mut self) -> crate::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from a key lookup (the process environment in production)
    fn apply_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(groups) = lookup("ALLOWED_GROUPS") {
            self.allowed_groups = groups.split(',').map(|s| s.to_string()).collect();
        }

        if let Some(mode) = lookup("DELIVERY_MODE") {
            self.delivery = mode.parse()?;
        }

        if let Some(url) = lookup("WHATSAPP_API_URL") {
            self.whatsapp.api_url = url;
        }
        if let Some(session) = lookup("WHATSAPP_SESSION") {
            self.whatsapp.session = session;
        }
        if let Some(key) = lookup("WHATSAPP_API_KEY") {
            self.whatsapp.api_key = Some(key);
        }
        if let Some(secs) = lookup("WHATSAPP_POLL_INTERVAL_SECS") {
            self.whatsapp.poll_interval_secs = secs.trim().parse().map_err(|_| {
                Error::Config(format!("Invalid WHATSAPP_POLL_INTERVAL_SECS: {}", secs))
            })?;
        }

        if let Some(url) = lookup("HANGOUTS_WEBHOOK_URL") {
            self.hangouts.webhook_url = Some(url);
        }

        Ok(())
    }

    /// Build the allow-list from the configured group names
    pub fn allow_list(&self) -> AllowList {
        AllowList::new(&self.allowed_groups)
    }
}

// ============================================================================
// TOML file layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    server: Option<TomlServerConfig>,
    groups: Option<TomlGroupsConfig>,
    delivery: Option<TomlDeliveryConfig>,
    whatsapp: Option<TomlWhatsAppConfig>,
    hangouts: Option<TomlHangoutsConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlServerConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlGroupsConfig {
    #[serde(default)]
    allowed: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDeliveryConfig {
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlWhatsAppConfig {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    poll_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlHangoutsConfig {
    #[serde(default)]
    webhook_url: Option<String>,
}
