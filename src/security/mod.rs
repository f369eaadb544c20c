//! Security subsystems: hashing, tokens, sessions.
//!
//! Hashing and token handlers are pluggable through the registry; the
//! session type is a plain per-request value filled in by the hosting web
//! layer. Encryption primitives themselves live in their crates
//! (`sha2`, `jsonwebtoken`); this module only wires them behind named
//! handlers.

pub mod hashing;
pub mod session;
pub mod token;
