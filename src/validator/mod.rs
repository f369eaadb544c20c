//! Field validation.
//!
//! Validators are domain-scoped handlers: `("users", "email")` and
//! `("orders", "email")` are independent registrations. The manager validates
//! single fields or whole maps, either failing on the first bad field or
//! aggregating every failure into one error.

pub mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ValidatorConfig;
use crate::observability::Metrics;
use crate::registry::{DomainHandler, DomainRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("no validator registered for field '{field}' in domain '{domain}'")]
    ValidatorNotFound { domain: String, field: String },

    #[error("field '{field}' in domain '{domain}' failed validation: {reason}")]
    FieldFailed {
        domain: String,
        field: String,
        reason: String,
    },

    #[error("{} field(s) failed validation in domain '{domain}'", failures.len())]
    AggregateFailed {
        domain: String,
        /// Field name to failure message.
        failures: BTreeMap<String, String>,
    },
}

/// Knobs for a single validation call.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Treat a missing validator as an error instead of skipping the field.
    pub force: bool,
    /// Collect every field failure instead of stopping at the first one.
    pub lazy: bool,
    /// Accept JSON null without consulting the validator.
    pub nullable: bool,
    /// Accept blank strings without consulting the validator.
    pub allow_blank: bool,
    /// Override a range validator's lower-bound inclusivity.
    pub inclusive_minimum: Option<bool>,
    /// Override a range validator's upper-bound inclusivity.
    pub inclusive_maximum: Option<bool>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            force: false,
            lazy: false,
            nullable: true,
            allow_blank: false,
            inclusive_minimum: None,
            inclusive_maximum: None,
        }
    }
}

impl From<&ValidatorConfig> for ValidationOptions {
    fn from(config: &ValidatorConfig) -> Self {
        Self {
            force: config.force,
            lazy: config.lazy,
            nullable: config.nullable,
            ..Self::default()
        }
    }
}

/// A validator for one named field within a domain.
pub trait ValueValidator: DomainHandler {
    /// Check one value, returning a human-readable reason on failure.
    fn validate(&self, value: &Value, options: &ValidationOptions) -> Result<(), String>;
}

/// Domain-scoped validator registry plus the validation entry points.
pub struct ValidatorManager {
    validators: DomainRegistry<dyn ValueValidator>,
    defaults: ValidationOptions,
    metrics: Arc<Metrics>,
}

impl ValidatorManager {
    pub fn new(config: &ValidatorConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            validators: DomainRegistry::new(),
            defaults: ValidationOptions::from(config),
            metrics,
        }
    }

    /// Options seeded from configuration, for callers that want to tweak
    /// a single knob per call.
    pub fn default_options(&self) -> ValidationOptions {
        self.defaults.clone()
    }

    pub fn register(
        &mut self,
        validator: Arc<dyn ValueValidator>,
        replace: bool,
    ) -> Result<(), ValidatorError> {
        self.validators.register(validator, replace)?;
        Ok(())
    }

    pub fn get(&self, domain: &str, field: &str) -> Result<Arc<dyn ValueValidator>, ValidatorError> {
        Ok(self.validators.get(domain, field)?)
    }

    pub fn has(&self, domain: &str, field: &str) -> bool {
        self.validators.has(domain, field)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validate one field.
    ///
    /// Returns `Ok(true)` when a validator accepted the value, `Ok(false)`
    /// when no validator is registered and `force` is off.
    pub fn validate_field(
        &self,
        domain: &str,
        field: &str,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<bool, ValidatorError> {
        let Ok(validator) = self.validators.get(domain, field) else {
            if options.force {
                return Err(ValidatorError::ValidatorNotFound {
                    domain: domain.to_string(),
                    field: field.to_string(),
                });
            }
            return Ok(false);
        };

        match Self::check(validator.as_ref(), value, options) {
            Ok(()) => Ok(true),
            Err(reason) => {
                self.metrics.validation_failed();
                Err(ValidatorError::FieldFailed {
                    domain: domain.to_string(),
                    field: field.to_string(),
                    reason,
                })
            }
        }
    }

    /// Validate every key of `values` that has a registered validator.
    ///
    /// Returns the keys nothing validated. With `lazy` set, all failing
    /// fields are gathered into a single [`ValidatorError::AggregateFailed`];
    /// otherwise the first failure aborts the pass.
    pub fn validate_map(
        &self,
        domain: &str,
        values: &Map<String, Value>,
        options: &ValidationOptions,
    ) -> Result<Vec<String>, ValidatorError> {
        let mut unvalidated = Vec::new();
        let mut failures = BTreeMap::new();

        for (field, value) in values {
            let Ok(validator) = self.validators.get(domain, field) else {
                if options.force {
                    return Err(ValidatorError::ValidatorNotFound {
                        domain: domain.to_string(),
                        field: field.clone(),
                    });
                }
                unvalidated.push(field.clone());
                continue;
            };

            if let Err(reason) = Self::check(validator.as_ref(), value, options) {
                self.metrics.validation_failed();
                if options.lazy {
                    failures.insert(field.clone(), reason);
                } else {
                    return Err(ValidatorError::FieldFailed {
                        domain: domain.to_string(),
                        field: field.clone(),
                        reason,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(ValidatorError::AggregateFailed {
                domain: domain.to_string(),
                failures,
            });
        }
        Ok(unvalidated)
    }

    fn check(
        validator: &dyn ValueValidator,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<(), String> {
        if value.is_null() {
            return if options.nullable {
                Ok(())
            } else {
                Err("value must not be null".to_string())
            };
        }
        if let Value::String(text) = value
            && text.trim().is_empty()
        {
            return if options.allow_blank {
                Ok(())
            } else {
                Err("value must not be blank".to_string())
            };
        }
        validator.validate(value, options)
    }
}

#[cfg(test)]
mod tests {
    use super::handlers::{LengthValidator, PatternValidator, RangeValidator};
    use super::*;
    use serde_json::json;

    fn manager() -> ValidatorManager {
        manager_with(Arc::new(Metrics::new()))
    }

    fn manager_with(metrics: Arc<Metrics>) -> ValidatorManager {
        let mut manager = ValidatorManager::new(&ValidatorConfig::default(), metrics);
        manager
            .register(Arc::new(LengthValidator::new("users", "name", 2, 32)), false)
            .unwrap();
        manager
            .register(
                Arc::new(RangeValidator::new("users", "age", 0.0, 150.0)),
                false,
            )
            .unwrap();
        manager
            .register(
                Arc::new(
                    PatternValidator::new("users", "email", r"^[^@\s]+@[^@\s]+$").unwrap(),
                ),
                false,
            )
            .unwrap();
        manager
    }

    #[test]
    fn field_passes_and_fails() {
        let manager = manager();
        let opts = ValidationOptions::default();

        assert!(manager
            .validate_field("users", "name", &json!("ada"), &opts)
            .unwrap());
        assert!(matches!(
            manager.validate_field("users", "name", &json!("a"), &opts),
            Err(ValidatorError::FieldFailed { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn missing_validator_skipped_unless_forced() {
        let manager = manager();
        let mut opts = ValidationOptions::default();

        assert!(!manager
            .validate_field("users", "nickname", &json!("x"), &opts)
            .unwrap());

        opts.force = true;
        assert!(matches!(
            manager.validate_field("users", "nickname", &json!("x"), &opts),
            Err(ValidatorError::ValidatorNotFound { .. })
        ));
    }

    #[test]
    fn unknown_domain_behaves_like_missing_validator() {
        let manager = manager();
        let opts = ValidationOptions::default();

        assert!(!manager
            .validate_field("orders", "name", &json!("ada"), &opts)
            .unwrap());
    }

    #[test]
    fn null_respects_nullable() {
        let manager = manager();
        let mut opts = ValidationOptions::default();

        assert!(manager
            .validate_field("users", "name", &Value::Null, &opts)
            .unwrap());

        opts.nullable = false;
        assert!(manager
            .validate_field("users", "name", &Value::Null, &opts)
            .is_err());
    }

    #[test]
    fn blank_respects_allow_blank() {
        let manager = manager();
        let mut opts = ValidationOptions::default();

        assert!(manager
            .validate_field("users", "name", &json!("   "), &opts)
            .is_err());

        opts.allow_blank = true;
        assert!(manager
            .validate_field("users", "name", &json!("   "), &opts)
            .unwrap());
    }

    #[test]
    fn map_reports_unvalidated_keys() {
        let manager = manager();
        let opts = ValidationOptions::default();

        let values = json!({
            "name": "ada",
            "age": 36,
            "nickname": "countess",
        });
        let unvalidated = manager
            .validate_map("users", values.as_object().unwrap(), &opts)
            .unwrap();
        assert_eq!(unvalidated, vec!["nickname".to_string()]);
    }

    #[test]
    fn eager_map_stops_at_first_failure() {
        let manager = manager();
        let opts = ValidationOptions::default();

        let values = json!({"age": 200, "name": "a"});
        // map iterates in insertion order, so "age" fails first
        assert!(matches!(
            manager.validate_map("users", values.as_object().unwrap(), &opts),
            Err(ValidatorError::FieldFailed { field, .. }) if field == "age"
        ));
    }

    #[test]
    fn failures_are_counted() {
        let metrics = Arc::new(Metrics::new());
        let manager = manager_with(metrics.clone());
        let mut opts = ValidationOptions::default();

        assert!(manager
            .validate_field("users", "name", &json!("a"), &opts)
            .is_err());

        opts.lazy = true;
        let values = json!({"name": "a", "age": 200});
        assert!(manager
            .validate_map("users", values.as_object().unwrap(), &opts)
            .is_err());

        // one field failure plus two lazy map failures
        assert_eq!(metrics.snapshot().validations_failed, 3);
    }

    #[test]
    fn lazy_map_aggregates_every_failure() {
        let manager = manager();
        let mut opts = ValidationOptions::default();
        opts.lazy = true;

        let values = json!({"name": "a", "age": 200, "email": "not-an-email"});
        let err = manager
            .validate_map("users", values.as_object().unwrap(), &opts)
            .unwrap_err();

        match err {
            ValidatorError::AggregateFailed { failures, .. } => {
                assert_eq!(failures.len(), 3);
                assert!(failures.contains_key("name"));
                assert!(failures.contains_key("age"));
                assert!(failures.contains_key("email"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
