//! Session core for the Force.com REST API.
//!
//! A [`ForceSession`] is the handle every downstream call goes through. It is
//! created by one of three flows:
//!
//! - [`ForceSession::create`]: OAuth username-password grant
//! - [`ForceSession::create_with_access_token`]: pre-issued access token
//! - [`ForceSession::create_with_refresh_token`]: refresh-token exchange
//!
//! Once authenticated, the session loads the resource directory and the
//! sobject summaries. Full sobject describes are fetched on first use and
//! cached for the life of the session.
//!
//! ```rust,ignore
//! use forcelink_core::{ForceSession, MemorySink};
//!
//! let session = ForceSession::create_with_access_token(
//!     "v61.0",
//!     "client-id",
//!     "00Dxx0000001gPL!AR8AQJXg",
//!     "https://example.my.salesforce.com",
//! )
//! .await?;
//!
//! let sink = MemorySink::new();
//! session.trace_on("REQ", sink.clone());
//! let account = session.describe_sobject("Account").await?;
//! session.trace_off();
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod trace;

pub use api::ApiError;
pub use auth::{BearerToken, Credentials, PasswordGrant, RefreshGrant, SessionToken};
pub use config::{ClientConfig, Config};
pub use error::{ForceError, Result};
pub use models::{SObjectDescription, SObjectField, SObjectMetaData};
pub use reqwest::Method;
pub use session::ForceSession;
pub use trace::{MemorySink, TraceSink, TracingSink};
