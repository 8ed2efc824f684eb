use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Deployment environment, mirrors `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Local,
    Testing,
    Production,
}

impl AppEnv {
    pub fn is_production(self) -> bool {
        matches!(self, AppEnv::Production)
    }
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Ok(AppEnv::Local),
            "testing" | "test" => Ok(AppEnv::Testing),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("API_TOKENS contains a malformed token (tokens need 32+ chars of [A-Za-z0-9_-])")]
    MalformedToken,
}

/// Runtime configuration, loaded from the process environment (after `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub app_env: AppEnv,
    pub api_tokens: Vec<String>,
    pub storage_dir: PathBuf,
    pub signup_conference_id: i64,
    pub signup_ticket_price: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::from("sqlite://confadmin.db"),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            app_env: AppEnv::Production,
            api_tokens: Vec::new(),
            storage_dir: PathBuf::from("storage"),
            signup_conference_id: 1,
            signup_ticket_price: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = parse_value("BIND_ADDR", &addr)?;
        }
        if let Some(app_env) = lookup("APP_ENV") {
            config.app_env = app_env.parse()?;
        }
        if let Some(tokens) = lookup("API_TOKENS") {
            config.api_tokens = parse_tokens(&tokens)?;
        }
        if let Some(dir) = lookup("STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(id) = lookup("SIGNUP_CONFERENCE_ID") {
            config.signup_conference_id = parse_value("SIGNUP_CONFERENCE_ID", &id)?;
        }
        if let Some(price) = lookup("SIGNUP_TICKET_PRICE") {
            config.signup_ticket_price = parse_value("SIGNUP_TICKET_PRICE", &price)?;
        }

        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

/// Split `API_TOKENS` and check each token's shape.
fn parse_tokens(raw: &str) -> Result<Vec<String>, ConfigError> {
    let tokens: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if tokens.iter().any(|t| !is_well_formed_token(t)) {
        return Err(ConfigError::MalformedToken);
    }
    Ok(tokens)
}

/// Tokens must be at least 32 characters of alphanumerics, hyphens and underscores.
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() >= 32
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.signup_conference_id, 1);
        assert_eq!(config.signup_ticket_price, 500);
        assert_eq!(config.app_env, AppEnv::Production);
        assert!(config.api_tokens.is_empty());
    }

    #[test]
    fn test_overrides() {
        let token = "a".repeat(40);
        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "local"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SIGNUP_TICKET_PRICE", "750"),
            ("API_TOKENS", &format!("{token}, ")),
        ]))
        .unwrap();
        assert_eq!(config.app_env, AppEnv::Local);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.signup_ticket_price, 750);
        assert_eq!(config.api_tokens, vec![token]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("APP_ENV", "staging")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SIGNUP_TICKET_PRICE", "free")])).is_err());
        assert!(matches!(
            Config::from_lookup(lookup(&[("API_TOKENS", "short")])),
            Err(ConfigError::MalformedToken)
        ));
    }
}
