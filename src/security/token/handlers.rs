use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde_json::{Map, Value};

use super::{TokenError, TokenHandler};
use crate::registry::Handler;

/// Token header without verifying anything.
pub(super) fn peek_header(token: &str) -> Result<Header, TokenError> {
    decode_header(token).map_err(|e| TokenError::Invalid(e.to_string()))
}

/// Kid from a token header, without verifying anything else.
pub(super) fn peek_kid(token: &str) -> Result<Option<String>, TokenError> {
    Ok(peek_header(token)?.kid)
}

/// HMAC-SHA256 JWT handler.
pub struct Hs256Token {
    name: String,
    kid: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_len: usize,
}

impl Hs256Token {
    pub fn new(name: impl Into<String>, kid: impl Into<String>, key: &[u8]) -> Self {
        Self {
            name: name.into(),
            kid: kid.into(),
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            key_len: key.len(),
        }
    }

    fn validation(verify_signature: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        if !verify_signature {
            validation.insecure_disable_signature_validation();
            validation.validate_exp = false;
            validation.required_spec_claims.clear();
        }
        validation
    }
}

impl Handler for Hs256Token {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_registration(&self) -> Result<(), String> {
        if self.key_len < 32 {
            return Err(format!(
                "HS256 signing key must be at least 32 bytes, got {}",
                self.key_len
            ));
        }
        Ok(())
    }
}

impl TokenHandler for Hs256Token {
    fn kid(&self) -> &str {
        &self.kid
    }

    fn generate(&self, payload: &Map<String, Value>) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.kid.clone());

        encode(&header, payload, &self.encoding_key)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &Self::validation(true))
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }

    fn decode_unverified(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        let data =
            decode::<Map<String, Value>>(token, &self.decoding_key, &Self::validation(false))
                .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn claims(exp_offset: i64) -> Map<String, Value> {
        let now = Utc::now().timestamp();
        let mut map = Map::new();
        map.insert("sub".into(), Value::String("user-1".into()));
        map.insert("iat".into(), Value::from(now));
        map.insert("exp".into(), Value::from(now + exp_offset));
        map
    }

    #[test]
    fn kid_travels_in_the_header() {
        let handler = Hs256Token::new("hs256", "key-1", KEY);
        let token = handler.generate(&claims(60)).unwrap();

        assert_eq!(peek_kid(&token).unwrap(), Some("key-1".to_string()));
    }

    #[test]
    fn decode_verifies_signature() {
        let signer = Hs256Token::new("hs256", "key-1", KEY);
        let other = Hs256Token::new("hs256", "key-1", b"another-secret-key-32-bytes-long!");

        let token = signer.generate(&claims(60)).unwrap();
        assert!(signer.decode(&token).is_ok());
        assert!(other.decode(&token).is_err());
    }

    #[test]
    fn expired_token_rejected_but_still_inspectable() {
        let handler = Hs256Token::new("hs256", "key-1", KEY);
        let token = handler.generate(&claims(-3600)).unwrap();

        assert!(handler.decode(&token).is_err());
        // unverified decode still reads the payload for diagnostics
        let payload = handler.decode_unverified(&token).unwrap();
        assert_eq!(payload["sub"], Value::String("user-1".into()));
    }

    #[test]
    fn short_key_refuses_registration() {
        let handler = Hs256Token::new("hs256", "key-1", b"short");
        assert!(handler.validate_registration().is_err());
    }
}
