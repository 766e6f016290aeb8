use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - session token rejected: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - request limit exceeded")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body returned by the OAuth token endpoint.
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// One entry of the error list returned by the REST endpoints.
#[derive(Debug, Deserialize)]
struct RestErrorEntry {
    message: String,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull a readable message out of an OAuth or REST error body,
    /// falling back to the (truncated) raw body.
    fn describe_body(body: &str) -> String {
        if let Ok(oauth) = serde_json::from_str::<OAuthErrorBody>(body) {
            return match oauth.error_description {
                Some(desc) if !desc.is_empty() => format!("{}: {}", oauth.error, desc),
                _ => oauth.error,
            };
        }

        if let Ok(entries) = serde_json::from_str::<Vec<RestErrorEntry>>(body) {
            if !entries.is_empty() {
                return entries
                    .iter()
                    .map(|e| match e.error_code {
                        Some(ref code) => format!("{}: {}", code, e.message),
                        None => e.message.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
            }
        }

        Self::truncate_body(body)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::describe_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_oauth_error_body_is_decoded() {
        let body = r#"{"error":"invalid_grant","error_description":"authentication failure"}"#;
        match ApiError::from_status(StatusCode::BAD_REQUEST, body) {
            ApiError::BadRequest(msg) => assert_eq!(msg, "invalid_grant: authentication failure"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rest_error_list_is_decoded() {
        let body = r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#;
        match ApiError::from_status(StatusCode::UNAUTHORIZED, body) {
            ApiError::Unauthorized(msg) => {
                assert_eq!(msg, "INVALID_SESSION_ID: Session expired or invalid")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_keeps_raw_body() {
        let err = ApiError::from_status(StatusCode::IM_A_TEAPOT, "short and stout");
        assert_eq!(
            err.to_string(),
            "Invalid response: Status 418 I'm a teapot: short and stout"
        );
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("(truncated, {} total bytes)", body.len())));
    }

    #[test]
    fn test_rate_limit_maps_without_body() {
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ApiError::RateLimited
        ));
    }
}
