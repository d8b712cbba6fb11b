use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// How bearer credentials are verified.
///
/// `Dev` trusts the raw credential as an opaque identity and must be opted
/// into explicitly; the default is `Google`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Google,
    Dev,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,

    // Identity
    pub auth_mode: AuthMode,
    pub auth_issuer: String,
    pub auth_client_id: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth_mode = parse_auth_mode(&env_or_default("AUTH_MODE", "google"))?;
        Ok(Self {
            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8787)?,
            static_dir: PathBuf::from(env_or_default("STATIC_DIR", "./static")),
            max_upload_bytes: parse_env_usize("MAX_UPLOAD_BYTES", 32 * 1024 * 1024)?,

            // Identity
            auth_mode,
            auth_issuer: env_or_default("AUTH_ISSUER", "accounts.google.com"),
            auth_client_id: match auth_mode {
                AuthMode::Google => required_env("AUTH_CLIENT_ID")?,
                AuthMode::Dev => env_or_default("AUTH_CLIENT_ID", "dev-client"),
            },
            jwks_url: env_or_default("JWKS_URL", "https://www.googleapis.com/oauth2/v3/certs"),
            jwks_cache_ttl: Duration::from_secs(parse_env_u64("JWKS_CACHE_SECS", 3600)?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_mode == AuthMode::Google && self.auth_client_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "AUTH_CLIENT_ID".to_string(),
                message: "cannot be empty in google auth mode".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_UPLOAD_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_auth_mode(value: &str) -> Result<AuthMode, ConfigError> {
    match value.to_lowercase().as_str() {
        "google" => Ok(AuthMode::Google),
        "dev" => Ok(AuthMode::Dev),
        _ => Err(ConfigError::InvalidValue {
            name: "AUTH_MODE".to_string(),
            message: format!("must be 'google' or 'dev', got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_mode() {
        assert_eq!(parse_auth_mode("google").unwrap(), AuthMode::Google);
        assert_eq!(parse_auth_mode("GOOGLE").unwrap(), AuthMode::Google);
        assert_eq!(parse_auth_mode("dev").unwrap(), AuthMode::Dev);
        assert!(parse_auth_mode("staging").is_err());
    }

    #[test]
    fn google_mode_requires_client_id() {
        let config = Config {
            web_host: "127.0.0.1".into(),
            web_port: 0,
            static_dir: PathBuf::from("./static"),
            max_upload_bytes: 1024,
            auth_mode: AuthMode::Google,
            auth_issuer: "accounts.google.com".into(),
            auth_client_id: String::new(),
            jwks_url: "https://example.com/certs".into(),
            jwks_cache_ttl: Duration::from_secs(60),
        };
        assert!(config.validate().is_err());
    }
}
