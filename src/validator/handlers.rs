//! Stock field validators.

use regex::Regex;
use serde_json::Value;

use super::{ValidationOptions, ValueValidator};
use crate::registry::{DomainHandler, Handler};

/// String length bounds, measured in characters.
pub struct LengthValidator {
    domain: String,
    name: String,
    min: usize,
    max: usize,
}

impl LengthValidator {
    pub fn new(domain: impl Into<String>, name: impl Into<String>, min: usize, max: usize) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            min,
            max,
        }
    }
}

impl Handler for LengthValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_registration(&self) -> Result<(), String> {
        if self.min > self.max {
            return Err(format!(
                "minimum length {} exceeds maximum length {}",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

impl DomainHandler for LengthValidator {
    fn domain(&self) -> &str {
        &self.domain
    }
}

impl ValueValidator for LengthValidator {
    fn validate(&self, value: &Value, _options: &ValidationOptions) -> Result<(), String> {
        let Value::String(text) = value else {
            return Err("value must be a string".to_string());
        };
        let length = text.chars().count();
        if length < self.min || length > self.max {
            return Err(format!(
                "length must be between {} and {}, got {length}",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Numeric bounds, inclusive on both ends unless overridden per call.
pub struct RangeValidator {
    domain: String,
    name: String,
    minimum: f64,
    maximum: f64,
    inclusive_minimum: bool,
    inclusive_maximum: bool,
}

impl RangeValidator {
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        minimum: f64,
        maximum: f64,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            minimum,
            maximum,
            inclusive_minimum: true,
            inclusive_maximum: true,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.inclusive_minimum = false;
        self.inclusive_maximum = false;
        self
    }
}

impl Handler for RangeValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_registration(&self) -> Result<(), String> {
        if self.minimum > self.maximum {
            return Err(format!(
                "minimum {} exceeds maximum {}",
                self.minimum, self.maximum
            ));
        }
        Ok(())
    }
}

impl DomainHandler for RangeValidator {
    fn domain(&self) -> &str {
        &self.domain
    }
}

impl ValueValidator for RangeValidator {
    fn validate(&self, value: &Value, options: &ValidationOptions) -> Result<(), String> {
        let Some(number) = value.as_f64() else {
            return Err("value must be a number".to_string());
        };

        let inclusive_min = options.inclusive_minimum.unwrap_or(self.inclusive_minimum);
        let inclusive_max = options.inclusive_maximum.unwrap_or(self.inclusive_maximum);

        let below = if inclusive_min {
            number < self.minimum
        } else {
            number <= self.minimum
        };
        let above = if inclusive_max {
            number > self.maximum
        } else {
            number >= self.maximum
        };

        if below || above {
            return Err(format!(
                "value must be between {} and {}, got {number}",
                self.minimum, self.maximum
            ));
        }
        Ok(())
    }
}

/// Full-string regular expression match.
pub struct PatternValidator {
    domain: String,
    name: String,
    pattern: Regex,
}

impl PatternValidator {
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            domain: domain.into(),
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Handler for PatternValidator {
    fn name(&self) -> &str {
        &self.name
    }
}

impl DomainHandler for PatternValidator {
    fn domain(&self) -> &str {
        &self.domain
    }
}

impl ValueValidator for PatternValidator {
    fn validate(&self, value: &Value, _options: &ValidationOptions) -> Result<(), String> {
        let Value::String(text) = value else {
            return Err("value must be a string".to_string());
        };
        if !self.pattern.is_match(text) {
            return Err(format!("value does not match pattern '{}'", self.pattern));
        }
        Ok(())
    }
}
