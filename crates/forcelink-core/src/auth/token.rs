use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ForceError, Result};

/// An access token and the instance it is valid against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    /// Base URL for every API call made with this token
    pub instance_url: String,
    /// Identity URL returned by the token endpoint
    pub id: Option<String>,
    pub token_type: Option<String>,
    pub signature: Option<String>,
    pub scope: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// Check that `instance_url` is a non-empty absolute http(s) URL with a host
pub fn validate_instance_url(instance_url: &str) -> Result<()> {
    if instance_url.trim().is_empty() {
        return Err(ForceError::Validation("instance URL is empty".to_string()));
    }

    let url = Url::parse(instance_url).map_err(|e| {
        ForceError::Validation(format!("instance URL {:?} is malformed: {}", instance_url, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ForceError::Validation(format!(
            "instance URL {:?} is not an http(s) URL",
            instance_url
        )));
    }
    Ok(())
}

impl SessionToken {
    pub fn new(access_token: impl Into<String>, instance_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            instance_url: instance_url.into(),
            id: None,
            token_type: None,
            signature: None,
            scope: None,
            issued_at: Utc::now(),
        }
    }

    /// Structural check only; the remote service is not consulted.
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(ForceError::Validation("access token is empty".to_string()));
        }
        // The token ends up in an Authorization header
        if self.access_token.chars().any(|c| c.is_ascii_control())
            || HeaderValue::from_str(&format!("Bearer {}", self.access_token)).is_err()
        {
            return Err(ForceError::Validation(
                "access token contains characters not allowed in a header".to_string(),
            ));
        }
        validate_instance_url(&self.instance_url)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Join an absolute API path onto the instance URL
    pub fn url_for(&self, path: &str) -> String {
        let base = self.instance_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}
