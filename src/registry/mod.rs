//! Named-handler registries.
//!
//! Every pluggable subsystem (hashing, tokens, validators, admin pages)
//! extends the application the same way: implement the subsystem's handler
//! trait and register the instance under a unique name during unit load.
//! Registries enforce that uniqueness and are the sole extension point.
//!
//! ## Key Components
//!
//! - [`Handler`] - Capability contract every registered instance satisfies
//! - [`Registry`] - Store mapping a unique name to one handler instance
//! - [`DomainRegistry`] - Variant keyed by a composite (domain, name)
//!
//! Registries are populated during startup and shared read-only afterwards.
//! Replacing a handler after boot is an administrative operation and needs
//! external synchronization; readers do not coordinate with writers.

mod domain;

pub use domain::{DomainHandler, DomainRegistry};

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("handler has an empty name and cannot be registered")]
    InvalidName,

    #[error("handler '{name}' rejected registration: {reason}")]
    Rejected { name: String, reason: String },

    #[error("handler '{name}' is already registered and replace was not requested")]
    Duplicate { name: String },

    #[error("handler not found: {0}")]
    NotFound(String),
}

/// Capability contract for registrable handlers.
///
/// A handler is identified by its name, unique within one registry. It is
/// constructed once at startup and never mutated after registration, only
/// replaced wholesale.
pub trait Handler: Send + Sync {
    /// Unique name within the owning registry.
    fn name(&self) -> &str;

    /// Pre-registration self check. A handler that cannot operate (missing
    /// key material, unusable options) refuses here instead of failing on
    /// first use.
    fn validate_registration(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Registry mapping handler names to instances.
pub struct Registry<H: Handler + ?Sized> {
    handlers: BTreeMap<String, Arc<H>>,
}

impl<H: Handler + ?Sized> Registry<H> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register a handler under its own name.
    ///
    /// Fails if the name is empty, if the handler refuses registration, or
    /// if the name is taken and `replace` is false. Replacing an existing
    /// handler logs a warning; lookups observe the new instance immediately.
    pub fn register(&mut self, handler: Arc<H>, replace: bool) -> Result<(), RegistryError> {
        let name = handler.name().trim();
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        handler
            .validate_registration()
            .map_err(|reason| RegistryError::Rejected {
                name: name.to_string(),
                reason,
            })?;

        if self.handlers.contains_key(name) {
            if !replace {
                return Err(RegistryError::Duplicate {
                    name: name.to_string(),
                });
            }
            tracing::warn!(handler = name, "Replacing registered handler");
        }

        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<H>, RegistryError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Handler + ?Sized> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}
