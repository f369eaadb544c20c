//! Named hashing handlers.
//!
//! A hash handler turns plain text into a self-describing envelope
//! (`$name$rounds$salt$digest`) and verifies text against one. Handlers are
//! registered by name; callers pick one explicitly or fall back to the
//! configured default.

mod handlers;

pub use handlers::{Sha256Hash, Sha512Hash};

use std::sync::Arc;
use thiserror::Error;

use crate::config::HashingConfig;
use crate::registry::{Handler, Registry, RegistryError};

#[derive(Debug, Error)]
pub enum HashingError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("hash envelope is malformed: {0}")]
    MalformedEnvelope(String),

    #[error("hash envelope was produced by '{actual}', not '{expected}'")]
    EnvelopeMismatch { expected: String, actual: String },
}

/// Capability contract for hashing handlers.
pub trait HashHandler: Handler {
    /// Hash the text with a fresh random salt, returning the envelope.
    fn hash(&self, text: &str) -> Result<String, HashingError>;

    /// Whether the text matches a previously produced envelope.
    fn verify(&self, text: &str, envelope: &str) -> Result<bool, HashingError>;
}

/// Hashing manager owning the handler registry and the configured default.
pub struct HashingManager {
    handlers: Registry<dyn HashHandler>,
    default_handler: String,
}

impl HashingManager {
    /// Manager with the built-in SHA-256/SHA-512 handlers registered using
    /// the configured rounds and salt length.
    ///
    /// Fails when the built-ins refuse the configured rounds or salt length;
    /// registration failures are fatal, never deferred to first use.
    pub fn new(config: &HashingConfig) -> Result<Self, HashingError> {
        let mut manager = Self::empty(&config.default_handler);

        let sha256 = Arc::new(Sha256Hash::new(config.rounds, config.salt_length));
        let sha512 = Arc::new(Sha512Hash::new(config.rounds, config.salt_length));

        manager.handlers.register(sha256, false)?;
        manager.handlers.register(sha512, false)?;

        Ok(manager)
    }

    /// Manager with no handlers, for hosts that bring their own.
    pub fn empty(default_handler: &str) -> Self {
        Self {
            handlers: Registry::new(),
            default_handler: default_handler.to_string(),
        }
    }

    /// Register a hashing handler, optionally replacing an existing one.
    pub fn register(
        &mut self,
        handler: Arc<dyn HashHandler>,
        replace: bool,
    ) -> Result<(), RegistryError> {
        self.handlers.register(handler, replace)
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn HashHandler>, RegistryError> {
        self.handlers.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.has(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Hash text with the named handler, or the default when `None`.
    pub fn generate_hash(&self, handler: Option<&str>, text: &str) -> Result<String, HashingError> {
        let handler = self.resolve(handler)?;
        handler.hash(text)
    }

    /// Whether text matches the envelope, using the named handler or default.
    pub fn is_match(
        &self,
        handler: Option<&str>,
        text: &str,
        envelope: &str,
    ) -> Result<bool, HashingError> {
        let handler = self.resolve(handler)?;
        handler.verify(text, envelope)
    }

    fn resolve(&self, handler: Option<&str>) -> Result<Arc<dyn HashHandler>, HashingError> {
        let name = handler.unwrap_or(&self.default_handler);
        Ok(self.handlers.get(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Handler;

    fn manager() -> HashingManager {
        HashingManager::new(&HashingConfig {
            default_handler: "sha512".to_string(),
            rounds: 8,
            salt_length: 16,
        })
        .unwrap()
    }

    #[test]
    fn zero_rounds_fail_construction() {
        let result = HashingManager::new(&HashingConfig {
            default_handler: "sha512".to_string(),
            rounds: 0,
            salt_length: 16,
        });
        assert!(matches!(
            result,
            Err(HashingError::Registry(RegistryError::Rejected { .. }))
        ));
    }

    #[test]
    fn built_ins_are_registered() {
        let manager = manager();
        assert!(manager.has("sha256"));
        assert!(manager.has("sha512"));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let manager = manager();

        let envelope = manager.generate_hash(None, "hunter2").unwrap();
        assert!(envelope.starts_with("$sha512$"));
        assert!(manager.is_match(None, "hunter2", &envelope).unwrap());
        assert!(!manager.is_match(None, "hunter3", &envelope).unwrap());
    }

    #[test]
    fn explicit_handler_selection() {
        let manager = manager();

        let envelope = manager.generate_hash(Some("sha256"), "hunter2").unwrap();
        assert!(envelope.starts_with("$sha256$"));
        assert!(manager
            .is_match(Some("sha256"), "hunter2", &envelope)
            .unwrap());
    }

    #[test]
    fn unknown_handler_is_an_error() {
        let manager = manager();
        let err = manager.generate_hash(Some("bcrypt"), "x").unwrap_err();
        assert!(matches!(
            err,
            HashingError::Registry(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn wrong_handler_for_envelope_is_an_error() {
        let manager = manager();

        let envelope = manager.generate_hash(Some("sha256"), "x").unwrap();
        let err = manager
            .is_match(Some("sha512"), "x", &envelope)
            .unwrap_err();
        assert!(matches!(err, HashingError::EnvelopeMismatch { .. }));
    }

    #[test]
    fn custom_handler_replaces_built_in() {
        struct Fixed;

        impl Handler for Fixed {
            fn name(&self) -> &str {
                "sha512"
            }
        }

        impl HashHandler for Fixed {
            fn hash(&self, _text: &str) -> Result<String, HashingError> {
                Ok("$sha512$0$00$fixed".to_string())
            }

            fn verify(&self, _text: &str, envelope: &str) -> Result<bool, HashingError> {
                Ok(envelope.ends_with("fixed"))
            }
        }

        let mut manager = manager();
        assert!(manager.register(Arc::new(Fixed), false).is_err());
        manager.register(Arc::new(Fixed), true).unwrap();

        assert_eq!(manager.generate_hash(None, "x").unwrap(), "$sha512$0$00$fixed");
    }
}
