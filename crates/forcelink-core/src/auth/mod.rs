//! Authentication module for establishing and renewing trust.
//!
//! This module provides:
//! - `Credentials`: the three supported flows (password, bearer, refresh)
//! - `CredentialStore`: the chosen flow plus the token it produced
//! - `SessionToken`: access token, instance URL and structural validation
//! - `oauth`: the password and refresh-token exchanges
//!
//! Tokens are held in memory only; nothing is written to disk.

pub mod credentials;
pub mod oauth;
pub mod token;

pub use credentials::{BearerToken, CredentialStore, Credentials, PasswordGrant, RefreshGrant};
pub use token::SessionToken;
