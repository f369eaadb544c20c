//! Per-request session context.
//!
//! The hosting web layer builds one `Session` per request after token
//! verification and hands it to whatever serves the request. It is a plain
//! owned value; nothing here touches thread-locals or request globals.

use serde_json::{Map, Value};
use thiserror::Error;

use super::token::claims;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session context key must not be empty")]
    InvalidContextKey,
}

/// Context of one authenticated (or anonymous) request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    context: Map<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session carrying a verified token payload.
    pub fn with_payload(payload: Map<String, Value>) -> Self {
        let mut session = Self::new();
        session
            .context
            .insert("payload".to_string(), Value::Object(payload));
        session
    }

    /// Add a key/value pair to the request context.
    pub fn add_context(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), SessionError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(SessionError::InvalidContextKey);
        }
        self.context.insert(key, value);
        Ok(())
    }

    pub fn context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Current user value, if a caller stored one.
    pub fn current_user(&self) -> Option<&Value> {
        self.context.get("user")
    }

    pub fn set_current_user(&mut self, user: Value) {
        self.context.insert("user".to_string(), user);
    }

    /// Verified token payload, empty when the request is anonymous.
    pub fn payload(&self) -> Map<String, Value> {
        match self.context.get("payload") {
            Some(Value::Object(payload)) => payload.clone(),
            _ => Map::new(),
        }
    }

    /// Whether the request carries a fresh token, one generated from
    /// credentials rather than from a refresh token.
    pub fn is_fresh(&self) -> bool {
        matches!(self.payload().get(claims::IS_FRESH), Some(Value::Bool(true)))
    }
}
