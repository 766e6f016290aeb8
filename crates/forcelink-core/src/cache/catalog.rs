use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{SObjectDescription, SObjectMetaData};

/// Resource name to relative path, e.g. `sobjects` -> `/services/data/v61.0/sobjects`
pub type ResourceMap = HashMap<String, String>;

/// Entity-type name to its summary
pub type SObjectMap = HashMap<String, SObjectMetaData>;

/// In-memory catalog for one session.
///
/// The resource and summary maps are replaced wholesale and handed out as
/// `Arc` snapshots. The describe map only ever grows: entity types are bounded
/// by the remote catalog, so there is no eviction.
#[derive(Debug, Default)]
pub struct CatalogCache {
    resources: RwLock<Arc<ResourceMap>>,
    sobjects: RwLock<Arc<SObjectMap>>,
    descriptions: RwLock<HashMap<String, Arc<SObjectDescription>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Resources =====

    pub fn resources(&self) -> Arc<ResourceMap> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace_resources(&self, resources: ResourceMap) {
        *self.resources.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(resources);
    }

    pub fn resource_path(&self, name: &str) -> Option<String> {
        self.resources().get(name).cloned()
    }

    // ===== SObject summaries =====

    pub fn sobjects(&self) -> Arc<SObjectMap> {
        self.sobjects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the summary map with `summaries`, keyed by name
    pub fn replace_sobjects(&self, summaries: Vec<SObjectMetaData>) {
        let map: SObjectMap = summaries
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();
        *self.sobjects.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(map);
    }

    pub fn sobject(&self, name: &str) -> Option<SObjectMetaData> {
        self.sobjects().get(name).cloned()
    }

    // ===== Full descriptions =====

    pub fn description(&self, name: &str) -> Option<Arc<SObjectDescription>> {
        self.descriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Store a description unless one is already cached, returning whichever
    /// ends up in the cache.
    pub fn insert_description(
        &self,
        name: &str,
        description: SObjectDescription,
    ) -> Arc<SObjectDescription> {
        self.descriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(description))
            .clone()
    }

    pub fn description_count(&self) -> usize {
        self.descriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> SObjectMetaData {
        SObjectMetaData {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resources_replaced_wholesale() {
        let cache = CatalogCache::new();
        cache.replace_resources(HashMap::from([
            ("sobjects".to_string(), "/services/data/v61.0/sobjects".to_string()),
            ("query".to_string(), "/services/data/v61.0/query".to_string()),
        ]));
        let before = cache.resources();

        cache.replace_resources(HashMap::from([(
            "limits".to_string(),
            "/services/data/v61.0/limits".to_string(),
        )]));

        assert_eq!(cache.resources().len(), 1);
        assert_eq!(cache.resource_path("sobjects"), None);
        assert_eq!(cache.resource_path("limits").as_deref(), Some("/services/data/v61.0/limits"));
        // Old snapshots stay intact for whoever holds them
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn test_sobjects_keyed_by_name() {
        let cache = CatalogCache::new();
        cache.replace_sobjects(vec![summary("Account"), summary("Contact")]);
        assert!(cache.sobject("Account").is_some());
        assert!(cache.sobject("Lead").is_none());

        cache.replace_sobjects(vec![summary("Lead")]);
        assert!(cache.sobject("Account").is_none());
        assert_eq!(cache.sobjects().len(), 1);
    }

    #[test]
    fn test_first_description_wins() {
        let cache = CatalogCache::new();
        let first = SObjectDescription {
            name: "Account".to_string(),
            label: "first".to_string(),
            ..Default::default()
        };
        let second = SObjectDescription {
            name: "Account".to_string(),
            label: "second".to_string(),
            ..Default::default()
        };

        let stored = cache.insert_description("Account", first);
        let again = cache.insert_description("Account", second);

        assert!(Arc::ptr_eq(&stored, &again));
        assert_eq!(again.label, "first");
        assert_eq!(cache.description_count(), 1);
    }

    #[test]
    fn test_empty_cache() {
        let cache = CatalogCache::new();
        assert!(cache.resources().is_empty());
        assert!(cache.sobjects().is_empty());
        assert!(cache.description("Account").is_none());
    }
}
