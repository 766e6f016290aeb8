//! Process-held catalog of remote resources.
//!
//! This module provides the `CatalogCache` holding, for one session:
//! - resource name -> relative path
//! - entity-type name -> summary (filled at startup)
//! - entity-type name -> full describe (filled lazily, never evicted)
//!
//! Nothing here is persisted; the cache lives and dies with its session.

pub mod catalog;

pub use catalog::{CatalogCache, ResourceMap, SObjectMap};
