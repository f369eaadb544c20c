use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use sha2::{Digest, Sha256, Sha512};
use uuid::Uuid;

use super::{HashHandler, HashingError};
use crate::registry::Handler;

/// Envelope layout: `$name$rounds$salt_hex$digest_b64`.
fn envelope(name: &str, rounds: u32, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "${name}${rounds}${}${}",
        hex::encode(salt),
        STANDARD_NO_PAD.encode(digest)
    )
}

struct ParsedEnvelope {
    name: String,
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn parse_envelope(value: &str) -> Result<ParsedEnvelope, HashingError> {
    let malformed = || HashingError::MalformedEnvelope(value.to_string());

    let mut parts = value.split('$');
    if parts.next() != Some("") {
        return Err(malformed());
    }

    let name = parts.next().ok_or_else(malformed)?;
    let rounds: u32 = parts
        .next()
        .and_then(|r| r.parse().ok())
        .ok_or_else(malformed)?;
    let salt = parts
        .next()
        .and_then(|s| hex::decode(s).ok())
        .ok_or_else(malformed)?;
    let digest = parts
        .next()
        .and_then(|d| STANDARD_NO_PAD.decode(d).ok())
        .ok_or_else(malformed)?;

    if parts.next().is_some() || name.is_empty() || rounds == 0 {
        return Err(malformed());
    }

    Ok(ParsedEnvelope {
        name: name.to_string(),
        rounds,
        salt,
        digest,
    })
}

/// Random salt built from v4 UUID bytes; enough entropy for a hash salt
/// without pulling in a dedicated RNG dependency.
fn random_salt(length: usize) -> Vec<u8> {
    let mut salt = Vec::with_capacity(length);
    while salt.len() < length {
        salt.extend_from_slice(Uuid::new_v4().as_bytes());
    }
    salt.truncate(length);
    salt
}

macro_rules! sha_handler {
    ($handler:ident, $algo:ty, $name:literal) => {
        /// Salted, iterated hash handler over the named SHA-2 digest.
        pub struct $handler {
            rounds: u32,
            salt_length: usize,
        }

        impl $handler {
            pub fn new(rounds: u32, salt_length: usize) -> Self {
                Self {
                    rounds,
                    salt_length,
                }
            }

            fn digest(text: &str, salt: &[u8], rounds: u32) -> Vec<u8> {
                let mut hasher = <$algo>::new();
                hasher.update(salt);
                hasher.update(text.as_bytes());
                let mut digest = hasher.finalize_reset().to_vec();

                for _ in 1..rounds {
                    hasher.update(&digest);
                    hasher.update(salt);
                    digest = hasher.finalize_reset().to_vec();
                }

                digest
            }

            /// Deterministic variant used when the caller supplies the salt.
            pub fn hash_with_salt(&self, text: &str, salt: &[u8]) -> String {
                let digest = Self::digest(text, salt, self.rounds);
                envelope($name, self.rounds, salt, &digest)
            }
        }

        impl Handler for $handler {
            fn name(&self) -> &str {
                $name
            }

            fn validate_registration(&self) -> Result<(), String> {
                if self.rounds == 0 {
                    return Err("rounds must be at least 1".to_string());
                }
                if self.salt_length == 0 {
                    return Err("salt length must be at least 1".to_string());
                }
                Ok(())
            }
        }

        impl HashHandler for $handler {
            fn hash(&self, text: &str) -> Result<String, HashingError> {
                let salt = random_salt(self.salt_length);
                Ok(self.hash_with_salt(text, &salt))
            }

            fn verify(&self, text: &str, envelope_str: &str) -> Result<bool, HashingError> {
                let parsed = parse_envelope(envelope_str)?;
                if parsed.name != $name {
                    return Err(HashingError::EnvelopeMismatch {
                        expected: $name.to_string(),
                        actual: parsed.name,
                    });
                }

                // rounds come from the envelope so old hashes stay
                // verifiable after a config change
                let digest = Self::digest(text, &parsed.salt, parsed.rounds);
                Ok(digest == parsed.digest)
            }
        }
    };
}

sha_handler!(Sha256Hash, Sha256, "sha256");
sha_handler!(Sha512Hash, Sha512, "sha512");
