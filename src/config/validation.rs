use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("app.name must not be empty")]
    EmptyAppName,

    #[error("app.timezone '{value}' is not a fixed offset like '+03:30'")]
    InvalidTimezone { value: String },

    #[error("security.hashing.rounds must be at least 1")]
    InvalidHashingRounds,

    #[error("security.hashing.salt_length ({actual}) must be between {min} and {max}")]
    InvalidSaltLength { actual: usize, min: usize, max: usize },

    #[error("security.hashing.default_handler must not be empty")]
    EmptyHashingHandler,

    #[error("security.token.default_handler must not be empty")]
    EmptyTokenHandler,

    #[error("security.token TTL must be positive: {field} = {value}")]
    InvalidTokenTtl { field: String, value: i64 },

    #[error("token signing key must be at least {min} bytes, got {actual}")]
    WeakSigningKey { actual: usize, min: usize },

    #[error("admin.base_route '{value}' must start with '/'")]
    InvalidAdminRoute { value: String },
}

const MIN_SALT_LENGTH: usize = 8;
const MAX_SALT_LENGTH: usize = 64;
const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_app(config)?;
    validate_hashing(config)?;
    validate_token(config)?;
    validate_admin(config)?;
    Ok(())
}

fn validate_app(config: &Config) -> Result<(), ValidationError> {
    if config.app.name.trim().is_empty() {
        return Err(ValidationError::EmptyAppName);
    }

    if crate::datetime::parse_offset(&config.app.timezone).is_none() {
        return Err(ValidationError::InvalidTimezone {
            value: config.app.timezone.clone(),
        });
    }

    Ok(())
}

fn validate_hashing(config: &Config) -> Result<(), ValidationError> {
    let hashing = &config.security.hashing;

    if hashing.default_handler.trim().is_empty() {
        return Err(ValidationError::EmptyHashingHandler);
    }

    if hashing.rounds == 0 {
        return Err(ValidationError::InvalidHashingRounds);
    }

    if !(MIN_SALT_LENGTH..=MAX_SALT_LENGTH).contains(&hashing.salt_length) {
        return Err(ValidationError::InvalidSaltLength {
            actual: hashing.salt_length,
            min: MIN_SALT_LENGTH,
            max: MAX_SALT_LENGTH,
        });
    }

    Ok(())
}

fn validate_token(config: &Config) -> Result<(), ValidationError> {
    let token = &config.security.token;

    if token.default_handler.trim().is_empty() {
        return Err(ValidationError::EmptyTokenHandler);
    }

    if token.access_ttl_secs <= 0 {
        return Err(ValidationError::InvalidTokenTtl {
            field: "access_ttl_secs".to_string(),
            value: token.access_ttl_secs,
        });
    }

    if token.refresh_ttl_secs <= 0 {
        return Err(ValidationError::InvalidTokenTtl {
            field: "refresh_ttl_secs".to_string(),
            value: token.refresh_ttl_secs,
        });
    }

    if let Some(key) = &token.signing_key {
        if key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ValidationError::WeakSigningKey {
                actual: key.len(),
                min: MIN_SIGNING_KEY_BYTES,
            });
        }
    }

    Ok(())
}

fn validate_admin(config: &Config) -> Result<(), ValidationError> {
    if config.admin.enabled && !config.admin.base_route.starts_with('/') {
        return Err(ValidationError::InvalidAdminRoute {
            value: config.admin.base_route.clone(),
        });
    }

    Ok(())
}
