use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lightweight summary of one entity type, as returned by the sobject listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SObjectMetaData {
    pub name: String,
    pub label: String,
    #[serde(rename = "labelPlural")]
    pub label_plural: String,
    #[serde(rename = "keyPrefix")]
    pub key_prefix: Option<String>,
    pub custom: bool,
    #[serde(rename = "customSetting")]
    pub custom_setting: bool,
    pub createable: bool,
    pub updateable: bool,
    pub deletable: bool,
    pub queryable: bool,
    pub searchable: bool,
    pub retrieveable: bool,
    pub undeletable: bool,
    pub triggerable: bool,
    #[serde(rename = "deprecatedAndHidden")]
    pub deprecated_and_hidden: bool,
    /// Named links such as `sobject`, `describe` and `rowTemplate`
    pub urls: HashMap<String, String>,
}

impl SObjectMetaData {
    /// Path of the full describe for this type, when the listing supplied one
    pub fn describe_path(&self) -> Option<&str> {
        self.urls.get("describe").map(String::as_str)
    }
}

/// Envelope of the sobject listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SObjectListing {
    pub encoding: Option<String>,
    #[serde(rename = "maxBatchSize")]
    pub max_batch_size: Option<i64>,
    pub sobjects: Vec<SObjectMetaData>,
}

/// Full describe of one entity type: fields, relationships and the
/// operations the type supports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SObjectDescription {
    pub name: String,
    pub label: String,
    #[serde(rename = "labelPlural")]
    pub label_plural: String,
    #[serde(rename = "keyPrefix")]
    pub key_prefix: Option<String>,
    pub custom: bool,
    pub createable: bool,
    pub updateable: bool,
    pub deletable: bool,
    pub queryable: bool,
    pub searchable: bool,
    pub retrieveable: bool,
    pub undeletable: bool,
    pub mergeable: bool,
    pub replicateable: bool,
    pub layoutable: bool,
    #[serde(rename = "feedEnabled")]
    pub feed_enabled: bool,
    pub fields: Vec<SObjectField>,
    #[serde(rename = "childRelationships")]
    pub child_relationships: Vec<ChildRelationship>,
    pub urls: HashMap<String, String>,
}

/// Operations an entity type may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Undelete,
    Query,
    Search,
    Merge,
}

impl SObjectDescription {
    /// Look up a field by API name, ignoring case like the platform does
    pub fn field(&self, name: &str) -> Option<&SObjectField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn operations(&self) -> Vec<Operation> {
        [
            (self.createable, Operation::Create),
            (self.retrieveable, Operation::Read),
            (self.updateable, Operation::Update),
            (self.deletable, Operation::Delete),
            (self.undeletable, Operation::Undelete),
            (self.queryable, Operation::Query),
            (self.searchable, Operation::Search),
            (self.mergeable, Operation::Merge),
        ]
        .into_iter()
        .filter_map(|(supported, op)| supported.then_some(op))
        .collect()
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SObjectField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub length: Option<i64>,
    pub nillable: bool,
    pub createable: bool,
    pub updateable: bool,
    pub unique: bool,
    pub custom: bool,
    #[serde(rename = "externalId")]
    pub external_id: bool,
    #[serde(rename = "referenceTo")]
    pub reference_to: Vec<String>,
    #[serde(rename = "relationshipName")]
    pub relationship_name: Option<String>,
    #[serde(rename = "picklistValues")]
    pub picklist_values: Vec<PicklistValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PicklistValue {
    pub value: String,
    pub label: Option<String>,
    pub active: bool,
    #[serde(rename = "defaultValue")]
    pub default_value: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildRelationship {
    #[serde(rename = "childSObject")]
    pub child_sobject: String,
    pub field: String,
    #[serde(rename = "relationshipName")]
    pub relationship_name: Option<String>,
    #[serde(rename = "cascadeDelete")]
    pub cascade_delete: bool,
}
