//! OAuth exchanges against the token endpoint.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::{ForceError, Result};

use super::credentials::{PasswordGrant, RefreshGrant};
use super::token::{validate_instance_url, SessionToken};

/// Token endpoint, relative to the login host or instance URL
pub const TOKEN_PATH: &str = "/services/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    instance_url: Option<String>,
    id: Option<String>,
    /// Milliseconds since the epoch, sent as a string
    issued_at: Option<String>,
    signature: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
            .as_deref()
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now)
    }

    /// Build a session token, keeping `fallback_instance` when the response
    /// does not name an instance at all.
    fn into_token(self, fallback_instance: &str) -> SessionToken {
        let issued_at = self.issued_at();
        SessionToken {
            instance_url: self
                .instance_url
                .unwrap_or_else(|| fallback_instance.to_string()),
            access_token: self.access_token,
            id: self.id,
            token_type: self.token_type,
            signature: self.signature,
            scope: self.scope,
            issued_at,
        }
    }
}

fn token_url(host: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), TOKEN_PATH)
}

/// Username-password flow. A response without a usable token or instance URL
/// counts as an authentication failure.
pub async fn password_grant(client: &ApiClient, grant: &PasswordGrant) -> Result<SessionToken> {
    let url = token_url(grant.login_host());
    let password = grant.password_with_token();
    let form = [
        ("grant_type", "password"),
        ("client_id", grant.client_id.as_str()),
        ("client_secret", grant.client_secret.as_str()),
        ("username", grant.user_name.as_str()),
        ("password", password.as_str()),
    ];

    info!(user = %grant.user_name, url = %url, "Requesting password grant");
    let response: TokenResponse = client
        .post_form(&url, &form)
        .await
        .map_err(|source| ForceError::Authentication { step: "password grant", source })?;

    let token = response.into_token("");
    if let Err(e) = token.validate() {
        warn!(error = %e, "Password grant returned an unusable token");
        return Err(ForceError::Authentication {
            step: "password grant",
            source: ApiError::InvalidResponse(format!("malformed token response: {}", e)),
        });
    }

    debug!(instance_url = %token.instance_url, "Password grant succeeded");
    Ok(token)
}

/// Refresh-token flow against `instance_url`. The returned token is not
/// validated here; callers decide how a malformed pair is reported.
pub async fn refresh_grant(
    client: &ApiClient,
    client_id: &str,
    refresh_token: &str,
    instance_url: &str,
) -> Result<SessionToken> {
    let url = token_url(instance_url);
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id),
    ];

    info!(url = %url, "Requesting refresh grant");
    let response: TokenResponse = client
        .post_form(&url, &form)
        .await
        .map_err(|source| ForceError::Authentication { step: "refresh grant", source })?;

    let token = response.into_token(instance_url);
    debug!(instance_url = %token.instance_url, "Refresh grant completed");
    Ok(token)
}

/// Refresh flow used at construction time: exchange first, then validate.
/// The caller-supplied instance URL is checked up front since the exchange
/// is sent to it.
pub async fn exchange_refresh_grant(client: &ApiClient, grant: &RefreshGrant) -> Result<SessionToken> {
    validate_instance_url(&grant.instance_url)?;
    let token = refresh_grant(client, &grant.client_id, &grant.refresh_token, &grant.instance_url).await?;
    token.validate()?;
    Ok(token)
}
