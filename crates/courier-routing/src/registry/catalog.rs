use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use courier_core::RouterConfig;

use crate::error::{Result, RouteError};

/// Auth configuration for one provider; bearer-token style.
///
/// The token resolves from the literal `token` value first, then from the
/// environment variable named by `token_env`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Literal token value. Prefer `token_env` outside of tests.
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable holding the token.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl AuthConfig {
    /// Resolves the effective token, if any.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| {
                self.token_env
                    .as_deref()
                    .and_then(RouterConfig::env_secret)
            })
    }
}

/// One provider entry from the catalog.
///
/// Immutable for the process lifetime; a registry reload replaces the whole
/// set, never patches descriptors in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Unique id across the registry.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Provider endpoint URL.
    pub endpoint: String,
    /// Coarse task-domain groupings this provider belongs to.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Named skills this provider advertises; must be non-empty.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Language tags this provider claims support for.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Auth configuration, when the provider requires it.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Per-provider attempt deadline override in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ServiceDescriptor {
    /// Resolves the bearer token for this provider, if configured.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.auth.as_ref().and_then(AuthConfig::resolve_token)
    }
}

/// The parsed and validated catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Catalog version string.
    pub version: String,
    /// Provider entries in declaration order.
    pub services: Vec<ServiceDescriptor>,
}

impl CatalogDocument {
    /// Parses and validates a catalog from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Schema`] naming the offending entry when the
    /// document is malformed, a required field is missing or empty, an
    /// endpoint is not a well-formed URL, or two entries share an id.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let document: Self = serde_json::from_slice(bytes).map_err(|error| RouteError::Schema {
            entry: "document".to_owned(),
            reason: error.to_string(),
        })?;

        document.validate()?;
        Ok(document)
    }

    /// Validates every entry and the pairwise-distinct id invariant.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Schema`] naming the first offending entry.
    pub fn validate(&self) -> Result<()> {
        let mut seen_ids = HashSet::new();

        for (position, service) in self.services.iter().enumerate() {
            let entry = if service.id.is_empty() {
                format!("services[{position}]")
            } else {
                format!("services[{position}] ({})", service.id)
            };

            if service.id.trim().is_empty() {
                return Err(RouteError::Schema {
                    entry,
                    reason: "missing required field `id`".to_owned(),
                });
            }

            if service.name.trim().is_empty() {
                return Err(RouteError::Schema {
                    entry,
                    reason: "missing required field `name`".to_owned(),
                });
            }

            if Url::parse(&service.endpoint).is_err() {
                return Err(RouteError::Schema {
                    entry,
                    reason: format!("endpoint is not a well-formed URL: {}", service.endpoint),
                });
            }

            if service.capabilities.is_empty() {
                return Err(RouteError::Schema {
                    entry,
                    reason: "`capabilities` must be a non-empty list".to_owned(),
                });
            }

            if !seen_ids.insert(service.id.clone()) {
                return Err(RouteError::Schema {
                    entry,
                    reason: format!("duplicate service id `{}`", service.id),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_bytes(services: serde_json::Value) -> Vec<u8> {
        json!({ "version": "1.0.0", "services": services })
            .to_string()
            .into_bytes()
    }

    fn service(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Service {id}"),
            "endpoint": format!("https://{id}.test/v1"),
            "categories": ["coding"],
            "capabilities": ["code_generation"],
        })
    }

    #[test]
    fn test_parse_valid_catalog() {
        let bytes = catalog_bytes(json!([service("svc-a"), service("svc-b")]));
        let document = match CatalogDocument::parse(&bytes) {
            Ok(document) => document,
            Err(error) => panic!("parse failed: {error}"),
        };

        assert_eq!(document.version, "1.0.0");
        assert_eq!(document.services.len(), 2);
        assert_eq!(document.services[0].id, "svc-a");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let bytes = catalog_bytes(json!([service("svc-a"), service("svc-a")]));
        let error = match CatalogDocument::parse(&bytes) {
            Ok(_) => panic!("expected schema error"),
            Err(error) => error,
        };

        match error {
            RouteError::Schema { entry, reason } => {
                assert!(entry.contains("services[1]"), "entry was {entry}");
                assert!(reason.contains("duplicate"), "reason was {reason}");
            }
            other => panic!("expected Schema error, got {other}"),
        }
    }

    #[test]
    fn test_empty_capabilities_rejected() {
        let mut entry = service("svc-a");
        entry["capabilities"] = json!([]);
        let bytes = catalog_bytes(json!([entry]));

        let error = match CatalogDocument::parse(&bytes) {
            Ok(_) => panic!("expected schema error"),
            Err(error) => error,
        };
        assert!(error.to_string().contains("capabilities"));
    }

    #[test]
    fn test_malformed_endpoint_rejected() {
        let mut entry = service("svc-a");
        entry["endpoint"] = json!("not a url");
        let bytes = catalog_bytes(json!([entry]));

        let error = match CatalogDocument::parse(&bytes) {
            Ok(_) => panic!("expected schema error"),
            Err(error) => error,
        };
        assert!(error.to_string().contains("well-formed URL"));
    }

    #[test]
    fn test_invalid_json_names_document() {
        let error = match CatalogDocument::parse(b"{ not json") {
            Ok(_) => panic!("expected schema error"),
            Err(error) => error,
        };
        assert!(error.to_string().contains("document"));
    }

    #[test]
    fn test_auth_token_literal_wins() {
        let auth = AuthConfig {
            token: Some("literal-token".to_owned()),
            token_env: Some("COURIER_TEST_TOKEN_UNSET".to_owned()),
        };
        assert_eq!(auth.resolve_token().as_deref(), Some("literal-token"));

        let empty = AuthConfig::default();
        assert!(empty.resolve_token().is_none());
    }
}
