//! Named token handlers.
//!
//! A token handler signs and verifies self-contained tokens. Each handler
//! carries a key id (`kid`) stamped into every token header; decoding routes
//! a token back to its handler through the kid index, so the handler name
//! never travels on the wire.
//!
//! The manager also keeps the blacklist: tokens revoked before expiry are
//! remembered by their `jti` claim. The blacklist is the only store that
//! mutates after startup and carries its own lock.

mod handlers;

pub use handlers::Hs256Token;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::TokenConfig;
use crate::observability::Metrics;
use crate::registry::{Handler, Registry, RegistryError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("token handler '{name}' declares kid '{kid}' already used by '{existing}'")]
    DuplicateKid {
        name: String,
        kid: String,
        existing: String,
    },

    #[error("token handler '{0}' declares an empty kid")]
    EmptyKid(String),

    #[error("token header does not carry a kid")]
    MissingKid,

    #[error("no token handler registered for kid '{0}'")]
    UnknownKid(String),

    #[error("token is blacklisted")]
    Blacklisted,

    #[error("token rejected: {0}")]
    Invalid(String),

    #[error("no signing key configured; set ARMATURE_TOKEN_KEY")]
    MissingSigningKey,
}

/// Claims the manager stamps into every generated payload.
pub mod claims {
    pub const JTI: &str = "jti";
    pub const IAT: &str = "iat";
    pub const EXP: &str = "exp";
    pub const IS_FRESH: &str = "is_fresh";
    pub const TOKEN_TYPE: &str = "token_type";

    pub const TYPE_ACCESS: &str = "access";
    pub const TYPE_REFRESH: &str = "refresh";
}

/// Capability contract for token handlers.
pub trait TokenHandler: Handler {
    /// Key id stamped into generated token headers; unique per manager.
    fn kid(&self) -> &str;

    /// Sign the payload into a token string.
    fn generate(&self, payload: &Map<String, Value>) -> Result<String, TokenError>;

    /// Verify the signature and expiry, returning the payload.
    fn decode(&self, token: &str) -> Result<Map<String, Value>, TokenError>;

    /// Payload without signature verification. Never trust the result for
    /// anything critical.
    fn decode_unverified(&self, token: &str) -> Result<Map<String, Value>, TokenError>;
}

/// Options for token generation beyond the payload itself.
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    /// Handler to use; the configured default when `None`.
    pub handler: Option<String>,
    /// Token was produced from fresh credentials, not a refresh token.
    pub is_fresh: bool,
}

/// Token manager owning the handler registry, kid index, and blacklist.
pub struct TokenManager {
    handlers: Registry<dyn TokenHandler>,
    kids: BTreeMap<String, String>,
    default_handler: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    blacklist: RwLock<HashSet<String>>,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("kids", &self.kids)
            .field("default_handler", &self.default_handler)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Manager with the built-in HS256 handler when a signing key is
    /// configured; without a key the manager starts empty and handlers
    /// must be registered by a unit.
    ///
    /// Fails when the configured key is unusable (the built-in handler
    /// refuses registration); a silently empty manager would defer the
    /// failure to the first token operation.
    pub fn new(config: &TokenConfig, metrics: Arc<Metrics>) -> Result<Self, TokenError> {
        let mut manager = Self::empty(config, metrics);

        if let Some(key) = &config.signing_key {
            let handler = Arc::new(Hs256Token::new("hs256", "hs256-default", key.as_bytes()));
            manager.register(handler, false)?;
        }

        Ok(manager)
    }

    /// Manager with no handlers registered.
    pub fn empty(config: &TokenConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            handlers: Registry::new(),
            kids: BTreeMap::new(),
            default_handler: config.default_handler.clone(),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
            blacklist: RwLock::new(HashSet::new()),
            metrics,
        }
    }

    /// Register a token handler, optionally replacing an existing one.
    ///
    /// The handler's kid must be unique among registered handlers. On a
    /// successful replace the old handler's kid mapping is dropped; a failed
    /// registration leaves the manager exactly as it was.
    pub fn register(
        &mut self,
        handler: Arc<dyn TokenHandler>,
        replace: bool,
    ) -> Result<(), TokenError> {
        let name = handler.name().trim().to_string();
        let kid = handler.kid().trim().to_string();
        if kid.is_empty() {
            return Err(TokenError::EmptyKid(name));
        }

        if let Some(existing) = self.kids.get(&kid) {
            let replacing_self = replace && existing == &name;
            if !replacing_self {
                return Err(TokenError::DuplicateKid {
                    name,
                    kid,
                    existing: existing.clone(),
                });
            }
        }

        self.handlers.register(handler, replace)?;

        // touch the kid index only once the registry accepted the handler;
        // a rejected replacement must leave the old handler's tokens decodable
        if replace {
            self.kids.retain(|_, handler_name| handler_name != &name);
        }
        self.kids.insert(kid, name);
        Ok(())
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

    /// Generate a short-lived access token around the payload.
    pub fn generate_access_token(
        &self,
        payload: &Map<String, Value>,
        options: &TokenOptions,
    ) -> Result<String, TokenError> {
        self.generate(payload, options, claims::TYPE_ACCESS, self.access_ttl_secs)
    }

    /// Generate a refresh token around the payload.
    pub fn generate_refresh_token(
        &self,
        payload: &Map<String, Value>,
        options: &TokenOptions,
    ) -> Result<String, TokenError> {
        self.generate(payload, options, claims::TYPE_REFRESH, self.refresh_ttl_secs)
    }

    fn generate(
        &self,
        payload: &Map<String, Value>,
        options: &TokenOptions,
        token_type: &str,
        ttl_secs: i64,
    ) -> Result<String, TokenError> {
        let name = options.handler.as_deref().unwrap_or(&self.default_handler);
        let handler = self.handlers.get(name)?;

        let now = Utc::now().timestamp();
        let mut claims = payload.clone();
        claims.insert(
            claims::JTI.into(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
        claims.insert(claims::IAT.into(), Value::from(now));
        claims.insert(claims::EXP.into(), Value::from(now + ttl_secs));
        claims.insert(claims::IS_FRESH.into(), Value::Bool(options.is_fresh));
        claims.insert(
            claims::TOKEN_TYPE.into(),
            Value::String(token_type.to_string()),
        );

        let token = handler.generate(&claims)?;
        self.metrics.token_issued();
        Ok(token)
    }

    /// Decode and verify a token, returning its payload.
    ///
    /// Routes through the kid header to the issuing handler, verifies the
    /// signature and expiry, then refuses blacklisted tokens.
    pub fn get_payload(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        let handler = self.handler_for(token)?;
        let payload = handler.decode(token)?;

        if let Some(Value::String(jti)) = payload.get(claims::JTI) {
            if self.blacklist.read().contains(jti) {
                return Err(TokenError::Blacklisted);
            }
        }

        Ok(payload)
    }

    /// Payload without signature verification; for diagnostics only.
    pub fn get_unverified_payload(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        self.handler_for(token)?.decode_unverified(token)
    }

    /// Token header (alg, kid) without signature verification.
    pub fn get_unverified_header(&self, token: &str) -> Result<jsonwebtoken::Header, TokenError> {
        handlers::peek_header(token)
    }

    /// Revoke a token before its expiry.
    ///
    /// The token is verified first; revoking a token nobody signed is
    /// meaningless and would let garbage grow the blacklist.
    pub fn add_to_blacklist(&self, token: &str) -> Result<(), TokenError> {
        let handler = self.handler_for(token)?;
        let payload = handler.decode(token)?;

        match payload.get(claims::JTI) {
            Some(Value::String(jti)) => {
                self.blacklist.write().insert(jti.clone());
                Ok(())
            }
            _ => Err(TokenError::Invalid("token has no jti claim".to_string())),
        }
    }

    pub fn is_blacklisted(&self, token: &str) -> Result<bool, TokenError> {
        let payload = self.get_unverified_payload(token)?;
        match payload.get(claims::JTI) {
            Some(Value::String(jti)) => Ok(self.blacklist.read().contains(jti)),
            _ => Ok(false),
        }
    }

    fn handler_for(&self, token: &str) -> Result<Arc<dyn TokenHandler>, TokenError> {
        let kid = handlers::peek_kid(token)?.ok_or(TokenError::MissingKid)?;
        let name = self
            .kids
            .get(&kid)
            .ok_or_else(|| TokenError::UnknownKid(kid.clone()))?;
        Ok(self.handlers.get(name)?)
    }
}
