use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced by session construction and catalog operations.
///
/// `step` names the stage that failed, e.g. "password grant" or
/// "list resources".
#[derive(Error, Debug)]
pub enum ForceError {
    #[error("Authentication failed during {step}: {source}")]
    Authentication {
        step: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Session created with the {0} flow has no refresh credential")]
    NoRefreshCredential(&'static str),

    #[error("Invalid session credentials: {0}")]
    Validation(String),

    #[error("Catalog request failed during {step}: {source}")]
    Catalog {
        step: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Unknown sobject: {0}")]
    NotFound(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ForceError {
    /// True for failures of the remote trust exchange, including a refresh
    /// attempted without a refresh credential
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            ForceError::Authentication { .. } | ForceError::NoRefreshCredential(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ForceError::Validation(_))
    }

    pub fn is_catalog(&self) -> bool {
        matches!(self, ForceError::Catalog { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ForceError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ForceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_step() {
        let err = ForceError::Catalog {
            step: "list resources",
            source: ApiError::ServerError("boom".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Catalog request failed during list resources: Server error: boom"
        );
        assert!(err.is_catalog());
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_classification() {
        assert!(ForceError::NoRefreshCredential("bearer").is_authentication());
        assert!(ForceError::Validation("x".to_string()).is_validation());
        assert!(ForceError::NotFound("Widget__c".to_string()).is_not_found());
    }
}
