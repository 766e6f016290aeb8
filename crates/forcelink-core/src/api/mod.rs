//! REST transport for the Force.com API.
//!
//! This module provides the `ApiClient` used for the OAuth token endpoint,
//! the catalog bootstrap calls and any downstream request built on a session.
//! Responses are checked for status and decoded from JSON; failures map to
//! `ApiError`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
