//! Data models for the remote schema catalog.
//!
//! - `SObjectMetaData`: the lightweight per-type summary from the sobject listing
//! - `SObjectDescription`: the full describe (fields, relationships, operations)

pub mod sobject;

pub use sobject::{
    ChildRelationship, Operation, PicklistValue, SObjectDescription, SObjectField, SObjectListing,
    SObjectMetaData,
};
