use super::token::SessionToken;

/// Default production login host
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default sandbox login host
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";

/// Inputs for the OAuth username-password flow.
#[derive(Debug, Clone, Default)]
pub struct PasswordGrant {
    pub client_id: String,
    pub client_secret: String,
    pub user_name: String,
    pub password: String,
    pub security_token: String,
    /// `"sandbox"` selects the sandbox login host when no login URL is given.
    pub environment: String,
    pub login_url: String,
}

impl PasswordGrant {
    /// Host the token request is sent to. An explicit login URL wins.
    pub fn login_host(&self) -> &str {
        if !self.login_url.trim().is_empty() {
            self.login_url.trim_end_matches('/')
        } else if self.environment.eq_ignore_ascii_case("sandbox") {
            SANDBOX_LOGIN_URL
        } else {
            PRODUCTION_LOGIN_URL
        }
    }

    /// The password grant expects the security token appended to the password
    pub(crate) fn password_with_token(&self) -> String {
        format!("{}{}", self.password, self.security_token)
    }
}

/// A pre-issued access token, trusted as-is once it passes validation.
#[derive(Debug, Clone, Default)]
pub struct BearerToken {
    pub client_id: String,
    pub access_token: String,
    pub instance_url: String,
}

/// A refresh token that must be exchanged before the session can be used.
#[derive(Debug, Clone, Default)]
pub struct RefreshGrant {
    pub client_id: String,
    pub refresh_token: String,
    pub instance_url: String,
}

/// The trust-establishment flow a session was created with.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password(PasswordGrant),
    Bearer(BearerToken),
    Refresh(RefreshGrant),
}

impl Credentials {
    pub fn flow_name(&self) -> &'static str {
        match self {
            Credentials::Password(_) => "password",
            Credentials::Bearer(_) => "bearer",
            Credentials::Refresh(_) => "refresh",
        }
    }

    pub fn client_id(&self) -> &str {
        match self {
            Credentials::Password(g) => &g.client_id,
            Credentials::Bearer(b) => &b.client_id,
            Credentials::Refresh(r) => &r.client_id,
        }
    }

    /// The refresh credential, if this flow carries one
    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Credentials::Refresh(r) => Some(&r.refresh_token),
            Credentials::Password(_) | Credentials::Bearer(_) => None,
        }
    }
}

/// Raw credentials plus the session token they produced.
///
/// The credential variant is fixed for the life of the store; a refresh only
/// replaces the token.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    credentials: Credentials,
    token: SessionToken,
}

impl CredentialStore {
    pub fn new(credentials: Credentials, token: SessionToken) -> Self {
        Self { credentials, token }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Swap in a freshly exchanged token
    pub fn replace_token(&mut self, token: SessionToken) {
        self.token = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_login_url_wins() {
        let grant = PasswordGrant {
            environment: "sandbox".to_string(),
            login_url: "https://mycompany.sandbox.my.salesforce.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(grant.login_host(), "https://mycompany.sandbox.my.salesforce.com");
    }

    #[test]
    fn test_environment_selects_default_host() {
        let sandbox = PasswordGrant {
            environment: "Sandbox".to_string(),
            ..Default::default()
        };
        assert_eq!(sandbox.login_host(), SANDBOX_LOGIN_URL);

        let production = PasswordGrant {
            environment: "production".to_string(),
            ..Default::default()
        };
        assert_eq!(production.login_host(), PRODUCTION_LOGIN_URL);
    }

    #[test]
    fn test_security_token_is_appended() {
        let grant = PasswordGrant {
            password: "hunter2".to_string(),
            security_token: "XYZ".to_string(),
            ..Default::default()
        };
        assert_eq!(grant.password_with_token(), "hunter2XYZ");
    }

    #[test]
    fn test_only_refresh_flow_has_refresh_token() {
        let refresh = Credentials::Refresh(RefreshGrant {
            refresh_token: "5Aep861".to_string(),
            ..Default::default()
        });
        assert_eq!(refresh.refresh_token(), Some("5Aep861"));
        assert_eq!(refresh.flow_name(), "refresh");

        let bearer = Credentials::Bearer(BearerToken::default());
        assert_eq!(bearer.refresh_token(), None);
    }

    #[test]
    fn test_replace_token_keeps_variant() {
        let creds = Credentials::Refresh(RefreshGrant {
            client_id: "cid".to_string(),
            ..Default::default()
        });
        let mut store = CredentialStore::new(
            creds,
            SessionToken::new("tok1", "https://na1.salesforce.com"),
        );
        store.replace_token(SessionToken::new("tok2", "https://na2.salesforce.com"));
        assert_eq!(store.token().access_token, "tok2");
        assert_eq!(store.credentials().flow_name(), "refresh");
        assert_eq!(store.credentials().client_id(), "cid");
    }
}
