//! The session handle held by callers.
//!
//! A `ForceSession` is only ever returned fully built: a validated token plus
//! populated resource and sobject summary maps. Any failure along the way
//! drops the half-built session and returns the error instead.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::auth::{oauth, BearerToken, CredentialStore, Credentials, PasswordGrant, RefreshGrant, SessionToken};
use crate::cache::{CatalogCache, ResourceMap, SObjectMap};
use crate::config::{normalize_version, ClientConfig, Config};
use crate::error::{ForceError, Result};
use crate::models::{SObjectDescription, SObjectListing, SObjectMetaData};
use crate::trace::TraceSink;

/// Resource catalog key for the sobject listing
const SOBJECTS_RESOURCE: &str = "sobjects";

pub struct ForceSession {
    api_version: String,
    client: ApiClient,
    store: RwLock<CredentialStore>,
    catalog: CatalogCache,
    /// Serialises token refreshes; never held while reading the catalog
    refresh_lock: Mutex<()>,
}

impl ForceSession {
    // ===== Construction =====

    /// Open a session with the OAuth username-password flow.
    ///
    /// The seven password-flow inputs (client id and secret, user name,
    /// password, security token, environment, login URL) travel together in a
    /// [`PasswordGrant`] rather than as positional arguments like the other
    /// constructors take. An empty `login_url` selects the login host from
    /// `environment`.
    pub async fn create(version: &str, grant: PasswordGrant) -> Result<Self> {
        Self::connect(version, Credentials::Password(grant), &ClientConfig::default()).await
    }

    /// Open a session with a pre-issued access token. No token request is
    /// made; the token is only checked structurally.
    pub async fn create_with_access_token(
        version: &str,
        client_id: &str,
        access_token: &str,
        instance_url: &str,
    ) -> Result<Self> {
        let credentials = Credentials::Bearer(BearerToken {
            client_id: client_id.to_string(),
            access_token: access_token.to_string(),
            instance_url: instance_url.to_string(),
        });
        Self::connect(version, credentials, &ClientConfig::default()).await
    }

    /// Open a session by exchanging a refresh token for an access token
    pub async fn create_with_refresh_token(
        version: &str,
        client_id: &str,
        refresh_token: &str,
        instance_url: &str,
    ) -> Result<Self> {
        let credentials = Credentials::Refresh(RefreshGrant {
            client_id: client_id.to_string(),
            refresh_token: refresh_token.to_string(),
            instance_url: instance_url.to_string(),
        });
        Self::connect(version, credentials, &ClientConfig::default()).await
    }

    /// Open a session with whichever flow the environment configures
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::connect(&config.api_version, config.credentials(), &config.client_config()).await
    }

    /// Authenticate with `credentials`, then bootstrap the catalog.
    pub async fn connect(version: &str, credentials: Credentials, config: &ClientConfig) -> Result<Self> {
        let client = ApiClient::new(config)?;

        let token = match &credentials {
            Credentials::Password(grant) => oauth::password_grant(&client, grant).await?,
            Credentials::Bearer(bearer) => {
                let token = SessionToken::new(bearer.access_token.clone(), bearer.instance_url.clone());
                token.validate()?;
                token
            }
            Credentials::Refresh(grant) => oauth::exchange_refresh_grant(&client, grant).await?,
        };

        let flow = credentials.flow_name();
        let session = Self {
            api_version: normalize_version(version),
            client,
            store: RwLock::new(CredentialStore::new(credentials, token)),
            catalog: CatalogCache::new(),
            refresh_lock: Mutex::new(()),
        };

        session.list_resources().await?;
        session.list_sobjects().await?;

        info!(
            flow = flow,
            instance_url = %session.instance_url(),
            resources = session.catalog.resources().len(),
            sobjects = session.catalog.sobjects().len(),
            "Session established"
        );
        Ok(session)
    }

    fn read_store(&self) -> RwLockReadGuard<'_, CredentialStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, CredentialStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Token =====

    /// Exchange the stored refresh credential for a new access token and
    /// replace the token and instance URL in place. The catalog is left as is.
    pub async fn refresh_token(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        let (client_id, refresh_token, instance_url) = {
            let store = self.read_store();
            let credentials = store.credentials();
            match credentials.refresh_token() {
                Some(refresh_token) => (
                    credentials.client_id().to_string(),
                    refresh_token.to_string(),
                    store.token().instance_url.clone(),
                ),
                None => return Err(ForceError::NoRefreshCredential(credentials.flow_name())),
            }
        };

        let token = oauth::refresh_grant(&self.client, &client_id, &refresh_token, &instance_url).await?;
        if let Err(e) = token.validate() {
            return Err(ForceError::Authentication {
                step: "token refresh",
                source: ApiError::InvalidResponse(format!("malformed token response: {}", e)),
            });
        }

        info!(instance_url = %token.instance_url, "Session token refreshed");
        self.write_store().replace_token(token);
        Ok(())
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Snapshot of the current token
    pub fn token(&self) -> SessionToken {
        self.read_store().token().clone()
    }

    pub fn access_token(&self) -> String {
        self.read_store().token().access_token.clone()
    }

    pub fn instance_url(&self) -> String {
        self.read_store().token().instance_url.clone()
    }

    /// Name of the flow this session was created with
    pub fn flow(&self) -> &'static str {
        self.read_store().credentials().flow_name()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_store().token().is_valid()
    }

    // ===== Tracing =====

    /// Send a line per traced field of every request to `sink`, each
    /// starting with `prefix`. Replaces any sink already installed.
    pub fn trace_on<S: TraceSink + 'static>(&self, prefix: &str, sink: S) {
        self.client.trace_on(prefix, Arc::new(sink));
    }

    pub fn trace_off(&self) {
        self.client.trace_off();
    }

    // ===== Catalog =====

    fn data_path(&self) -> String {
        format!("/services/data/{}", self.api_version)
    }

    fn sobjects_path(&self) -> String {
        self.catalog
            .resource_path(SOBJECTS_RESOURCE)
            .unwrap_or_else(|| format!("{}/sobjects", self.data_path()))
    }

    async fn get_catalog_json<T: DeserializeOwned>(&self, path: &str, step: &'static str) -> Result<T> {
        let token = self.token();
        self.client
            .get_json(&token.url_for(path), &token.access_token)
            .await
            .map_err(|source| ForceError::Catalog { step, source })
    }

    /// Fetch the resource directory and replace the cached map
    pub async fn list_resources(&self) -> Result<Arc<ResourceMap>> {
        let resources: ResourceMap = self.get_catalog_json(&self.data_path(), "list resources").await?;
        debug!(count = resources.len(), "Resource catalog loaded");
        self.catalog.replace_resources(resources);
        Ok(self.catalog.resources())
    }

    /// Fetch the sobject summaries and replace the cached map
    pub async fn list_sobjects(&self) -> Result<Arc<SObjectMap>> {
        let listing: SObjectListing = self.get_catalog_json(&self.sobjects_path(), "list sobjects").await?;
        debug!(count = listing.sobjects.len(), "SObject summaries loaded");
        self.catalog.replace_sobjects(listing.sobjects);
        Ok(self.catalog.sobjects())
    }

    /// Full describe of `name`, fetched once and cached for the session.
    /// Names missing from the summary listing fail without a request.
    pub async fn describe_sobject(&self, name: &str) -> Result<Arc<SObjectDescription>> {
        let summary = self
            .catalog
            .sobject(name)
            .ok_or_else(|| ForceError::NotFound(name.to_string()))?;

        if let Some(cached) = self.catalog.description(name) {
            debug!(sobject = name, "Describe cache hit");
            return Ok(cached);
        }

        let path = summary
            .describe_path()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}/describe", self.sobjects_path(), name));
        let description: SObjectDescription = self.get_catalog_json(&path, "describe sobject").await?;
        debug!(sobject = name, fields = description.fields.len(), "Describe cached");

        Ok(self.catalog.insert_description(name, description))
    }

    pub fn resources(&self) -> Arc<ResourceMap> {
        self.catalog.resources()
    }

    pub fn resource_path(&self, name: &str) -> Option<String> {
        self.catalog.resource_path(name)
    }

    pub fn sobjects(&self) -> Arc<SObjectMap> {
        self.catalog.sobjects()
    }

    pub fn sobject(&self, name: &str) -> Option<SObjectMetaData> {
        self.catalog.sobject(name)
    }

    /// Cached describe for `name`, without touching the network
    pub fn cached_description(&self, name: &str) -> Option<Arc<SObjectDescription>> {
        self.catalog.description(name)
    }

    // ===== Pass-through requests =====

    /// Authenticated GET of an instance-relative path
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, None::<&()>).await
    }

    /// Authenticated request of an instance-relative path with an optional
    /// JSON body
    pub async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let token = self.token();
        let value = self
            .client
            .send_json(method, &token.url_for(path), &token.access_token, body)
            .await?;
        Ok(value)
    }
}

impl std::fmt::Debug for ForceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceSession")
            .field("api_version", &self.api_version)
            .field("flow", &self.flow())
            .field("instance_url", &self.instance_url())
            .field("resources", &self.catalog.resources().len())
            .field("sobjects", &self.catalog.sobjects().len())
            .field("tracing", &self.client.is_tracing())
            .finish()
    }
}
