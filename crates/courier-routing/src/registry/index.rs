use std::collections::{BTreeMap, HashMap};

use super::catalog::{CatalogDocument, ServiceDescriptor};

/// Immutable registry: declaration-ordered services plus lookup indexes.
///
/// Built in a single pass over the validated catalog. Member lists preserve
/// declaration order, which is what makes the scorer's first-declared-wins
/// tie-break deterministic.
#[derive(Debug)]
pub struct Registry {
    /// Catalog version string.
    version: String,
    /// Hex SHA-256 of the catalog bytes this registry was built from.
    checksum: String,
    /// Services in declaration order.
    services: Vec<ServiceDescriptor>,
    /// `id -> declaration index`.
    by_id: HashMap<String, usize>,
    /// `category -> declaration indexes`, keys sorted for stable iteration.
    by_category: BTreeMap<String, Vec<usize>>,
    /// `capability -> declaration indexes`, keys sorted for stable iteration.
    by_capability: BTreeMap<String, Vec<usize>>,
}

impl Registry {
    /// Builds a registry from a validated catalog document.
    #[must_use]
    pub fn build(document: CatalogDocument, checksum: String) -> Self {
        let mut by_id = HashMap::new();
        let mut by_category: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_capability: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (index, service) in document.services.iter().enumerate() {
            by_id.insert(service.id.clone(), index);

            for category in &service.categories {
                by_category.entry(category.clone()).or_default().push(index);
            }

            for capability in &service.capabilities {
                by_capability
                    .entry(capability.clone())
                    .or_default()
                    .push(index);
            }
        }

        Self {
            version: document.version,
            checksum,
            services: document.services,
            by_id,
            by_category,
            by_capability,
        }
    }

    /// Looks up a service by id.
    #[must_use]
    pub fn service(&self, service_id: &str) -> Option<&ServiceDescriptor> {
        self.by_id
            .get(service_id)
            .map(|&index| &self.services[index])
    }

    /// Whether the registry contains the given id.
    #[must_use]
    pub fn has_service(&self, service_id: &str) -> bool {
        self.by_id.contains_key(service_id)
    }

    /// Whether the given service advertises the given capability.
    #[must_use]
    pub fn has_capability(&self, service_id: &str, capability: &str) -> bool {
        self.service(service_id)
            .is_some_and(|service| service.capabilities.iter().any(|name| name == capability))
    }

    /// Declaration position of a service within the catalog.
    #[must_use]
    pub fn declaration_index(&self, service_id: &str) -> Option<usize> {
        self.by_id.get(service_id).copied()
    }

    /// Services declared under a category, in declaration order.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&ServiceDescriptor> {
        self.category_member_indexes(category)
            .iter()
            .map(|&index| &self.services[index])
            .collect()
    }

    /// Services advertising a capability, in declaration order.
    #[must_use]
    pub fn by_capability(&self, capability: &str) -> Vec<&ServiceDescriptor> {
        self.by_capability
            .get(capability)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&index| &self.services[index])
            .collect()
    }

    /// Declaration indexes of a category's members.
    #[must_use]
    pub fn category_member_indexes(&self, category: &str) -> &[usize] {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All services in declaration order.
    #[must_use]
    pub fn all_services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// All category names, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.by_category.keys().map(String::as_str).collect()
    }

    /// All capability names, sorted.
    #[must_use]
    pub fn capabilities(&self) -> Vec<&str> {
        self.by_capability.keys().map(String::as_str).collect()
    }

    /// Catalog version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Hex SHA-256 of the source bytes.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the registry holds no services.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_registry() -> Registry {
        let bytes = json!({
            "version": "2.0.0",
            "services": [
                {
                    "id": "svc-code",
                    "name": "Code Service",
                    "endpoint": "https://code.test/v1",
                    "categories": ["coding"],
                    "capabilities": ["code_generation", "reasoning"],
                },
                {
                    "id": "svc-reason",
                    "name": "Reasoning Service",
                    "endpoint": "https://reason.test/v1",
                    "categories": ["reasoning", "coding"],
                    "capabilities": ["reasoning"],
                },
            ]
        })
        .to_string();

        let document = match CatalogDocument::parse(bytes.as_bytes()) {
            Ok(document) => document,
            Err(error) => panic!("parse failed: {error}"),
        };
        Registry::build(document, "checksum".to_owned())
    }

    #[test]
    fn test_lookup_by_id() {
        let registry = sample_registry();

        assert!(registry.has_service("svc-code"));
        assert!(!registry.has_service("svc-missing"));
        assert_eq!(registry.declaration_index("svc-reason"), Some(1));

        let service = match registry.service("svc-code") {
            Some(service) => service,
            None => panic!("svc-code missing"),
        };
        assert_eq!(service.name, "Code Service");
    }

    #[test]
    fn test_index_completeness() {
        let registry = sample_registry();

        // Every service appears in exactly the categories and capabilities
        // it declares, and in no others.
        for service in registry.all_services() {
            for category in &service.categories {
                assert!(
                    registry
                        .by_category(category)
                        .iter()
                        .any(|member| member.id == service.id),
                    "{} missing from category {category}",
                    service.id
                );
            }
            for capability in &service.capabilities {
                assert!(registry.has_capability(&service.id, capability));
            }
        }

        let coding_ids: Vec<&str> = registry
            .by_category("coding")
            .iter()
            .map(|service| service.id.as_str())
            .collect();
        assert_eq!(coding_ids, vec!["svc-code", "svc-reason"]);

        assert!(registry.by_category("multimodal").is_empty());
        assert!(!registry.has_capability("svc-reason", "code_generation"));
    }

    #[test]
    fn test_category_and_capability_listings_sorted() {
        let registry = sample_registry();
        assert_eq!(registry.categories(), vec!["coding", "reasoning"]);
        assert_eq!(
            registry.capabilities(),
            vec!["code_generation", "reasoning"]
        );
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_member_order_is_declaration_order() {
        let registry = sample_registry();
        assert_eq!(registry.category_member_indexes("coding"), &[0, 1]);
        assert_eq!(registry.category_member_indexes("reasoning"), &[1]);
    }
}
