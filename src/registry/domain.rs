use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Handler, RegistryError};

/// Handler scoped under a domain (an entity type or plain string tag).
///
/// The composite (domain, name) key is unique per registry; the same name
/// may appear under different domains.
pub trait DomainHandler: Handler {
    fn domain(&self) -> &str;
}

/// Registry keyed by (domain, name).
pub struct DomainRegistry<H: DomainHandler + ?Sized> {
    domains: BTreeMap<String, BTreeMap<String, Arc<H>>>,
}

impl<H: DomainHandler + ?Sized> DomainRegistry<H> {
    pub fn new() -> Self {
        Self {
            domains: BTreeMap::new(),
        }
    }

    /// Register a handler under its own (domain, name) key.
    ///
    /// Uniqueness and replace semantics match [`super::Registry::register`],
    /// applied per composite key. The domain must be non-empty as well.
    pub fn register(&mut self, handler: Arc<H>, replace: bool) -> Result<(), RegistryError> {
        let domain = handler.domain().trim();
        let name = handler.name().trim();
        if domain.is_empty() || name.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        handler
            .validate_registration()
            .map_err(|reason| RegistryError::Rejected {
                name: format!("{domain}.{name}"),
                reason,
            })?;

        let entries = self.domains.entry(domain.to_string()).or_default();
        if entries.contains_key(name) {
            if !replace {
                return Err(RegistryError::Duplicate {
                    name: format!("{domain}.{name}"),
                });
            }
            tracing::warn!(domain, handler = name, "Replacing registered handler");
        }

        entries.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn get(&self, domain: &str, name: &str) -> Result<Arc<H>, RegistryError> {
        self.domains
            .get(domain)
            .and_then(|entries| entries.get(name))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("{domain}.{name}")))
    }

    pub fn has(&self, domain: &str, name: &str) -> bool {
        self.domains
            .get(domain)
            .is_some_and(|entries| entries.contains_key(name))
    }

    /// All handlers registered under a domain. An unknown domain yields an
    /// empty map, not an error.
    pub fn get_domain(&self, domain: &str) -> BTreeMap<String, Arc<H>> {
        self.domains.get(domain).cloned().unwrap_or_default()
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Every handler across all domains, ordered by domain then name.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<H>> {
        self.domains.values().flat_map(BTreeMap::values)
    }

    pub fn len(&self) -> usize {
        self.domains.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl<H: DomainHandler + ?Sized> Default for DomainRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
