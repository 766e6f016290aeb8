//! Client configuration.
//!
//! `ClientConfig` tunes the HTTP transport. `Config` gathers everything needed
//! to open a session from `FORCE_*` environment variables, optionally loaded
//! from a `.env` file.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::auth::{BearerToken, Credentials, PasswordGrant, RefreshGrant};

/// HTTP request timeout in seconds.
/// The core has no deadline of its own; this is the transport's.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v61.0";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Session settings read from the environment
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_version: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_name: String,
    pub password: String,
    pub security_token: String,
    pub environment: String,
    pub login_url: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub instance_url: String,
    pub timeout_secs: Option<u64>,
}

fn var(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load from `FORCE_*` variables. A `.env` file in the working directory
    /// is read first if present.
    pub fn from_env() -> Result<Self> {
        // Silently ignore a missing .env
        let _ = dotenvy::dotenv();

        let timeout_secs = non_empty_var("FORCE_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("FORCE_TIMEOUT_SECS must be a whole number of seconds")?;

        let config = Self {
            api_version: non_empty_var("FORCE_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            client_id: var("FORCE_CLIENT_ID"),
            client_secret: var("FORCE_CLIENT_SECRET"),
            user_name: var("FORCE_USERNAME"),
            password: var("FORCE_PASSWORD"),
            security_token: var("FORCE_SECURITY_TOKEN"),
            environment: var("FORCE_ENVIRONMENT"),
            login_url: var("FORCE_LOGIN_URL"),
            access_token: non_empty_var("FORCE_ACCESS_TOKEN"),
            refresh_token: non_empty_var("FORCE_REFRESH_TOKEN"),
            instance_url: var("FORCE_INSTANCE_URL"),
            timeout_secs,
        };

        if config.client_id.is_empty() {
            bail!("FORCE_CLIENT_ID is not set");
        }
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        match self.timeout_secs {
            Some(secs) => ClientConfig {
                request_timeout: Duration::from_secs(secs),
            },
            None => ClientConfig::default(),
        }
    }

    /// Pick a flow: refresh token, then access token, then password grant
    pub fn credentials(&self) -> Credentials {
        if let Some(ref refresh_token) = self.refresh_token {
            Credentials::Refresh(RefreshGrant {
                client_id: self.client_id.clone(),
                refresh_token: refresh_token.clone(),
                instance_url: self.instance_url.clone(),
            })
        } else if let Some(ref access_token) = self.access_token {
            Credentials::Bearer(BearerToken {
                client_id: self.client_id.clone(),
                access_token: access_token.clone(),
                instance_url: self.instance_url.clone(),
            })
        } else {
            Credentials::Password(PasswordGrant {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                user_name: self.user_name.clone(),
                password: self.password.clone(),
                security_token: self.security_token.clone(),
                environment: self.environment.clone(),
                login_url: self.login_url.clone(),
            })
        }
    }
}

/// Normalise an API version to the `vNN.N` form used in resource paths
pub fn normalize_version(version: &str) -> String {
    let version = version.trim();
    if version.starts_with('v') || version.starts_with('V') {
        format!("v{}", &version[1..])
    } else {
        format!("v{}", version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("61.0"), "v61.0");
        assert_eq!(normalize_version("v61.0"), "v61.0");
        assert_eq!(normalize_version(" V58.0 "), "v58.0");
    }

    #[test]
    fn test_refresh_token_takes_precedence() {
        let config = Config {
            client_id: "cid".to_string(),
            access_token: Some("at".to_string()),
            refresh_token: Some("rt".to_string()),
            instance_url: "https://na1.salesforce.com".to_string(),
            ..Default::default()
        };
        match config.credentials() {
            Credentials::Refresh(r) => {
                assert_eq!(r.refresh_token, "rt");
                assert_eq!(r.instance_url, "https://na1.salesforce.com");
            }
            other => panic!("expected refresh flow, got {}", other.flow_name()),
        }
    }

    #[test]
    fn test_access_token_selects_bearer() {
        let config = Config {
            access_token: Some("at".to_string()),
            ..Default::default()
        };
        assert_eq!(config.credentials().flow_name(), "bearer");
    }

    #[test]
    fn test_password_is_the_fallback() {
        let config = Config {
            user_name: "user@example.com".to_string(),
            environment: "sandbox".to_string(),
            ..Default::default()
        };
        match config.credentials() {
            Credentials::Password(g) => {
                assert_eq!(g.user_name, "user@example.com");
                assert_eq!(g.login_host(), crate::auth::credentials::SANDBOX_LOGIN_URL);
            }
            other => panic!("expected password flow, got {}", other.flow_name()),
        }
    }

    #[test]
    fn test_client_config_timeout() {
        let config = Config {
            timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.client_config().request_timeout, Duration::from_secs(5));
        assert_eq!(
            Config::default().client_config().request_timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }
}
