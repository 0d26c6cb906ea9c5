//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default port used by the Bot Framework Emulator templates.
pub const DEFAULT_PORT: u16 = 3978;

/// Transport configuration. Only the HTTP boundary and the channel adapter
/// read this; the classifier never does.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Host to bind the listener on.
    pub host: String,
    /// Port to bind the listener on.
    pub port: u16,
    /// Channel app id. Empty means anonymous (emulator) traffic is accepted.
    pub app_id: String,
    /// Channel app password, used as the bearer credential.
    pub app_password: SecretString,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            app_id: String::new(),
            app_password: SecretString::from(String::new()),
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// - `PORT` (default 3978)
    /// - `ECHO_BOT_HOST` (default `localhost`)
    /// - `MICROSOFT_APP_ID` / `MICROSOFT_APP_PASSWORD` (default empty)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "PORT".to_string(),
                    message: format!("{raw:?}: {e}"),
                })?,
            None => defaults.port,
        };

        let host = lookup("ECHO_BOT_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let app_id = lookup("MICROSOFT_APP_ID").unwrap_or_default();
        let app_password = SecretString::from(lookup("MICROSOFT_APP_PASSWORD").unwrap_or_default());

        Ok(Self {
            host,
            port,
            app_id,
            app_password,
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
