//! Employee sign-in backend
//!
//! Layers:
//! - `domain/` - entities, value objects, repository and directory traits
//! - `application/` - credential decoding, directory verification, sessions,
//!   tokens, OTPs and the per-request access gate
//! - `infra/` - PostgreSQL, LDAP and in-memory implementations
//! - `presentation/` - extractor, middleware, handlers, DTOs, router
//!
//! Login credentials arrive AES-encrypted and are checked by binding to the
//! LDAP directory. Each employee holds at most one active session; a new
//! login supersedes the previous one. Every response payload is sealed with
//! AES-256-GCM, and plaintext passwords are wiped after the directory bind.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{LdapConnector, PgAuthRepository};
#[cfg(any(test, feature = "test-util"))]
pub use infra::{MemoryAuthStore, StaticDirectory};
pub use presentation::router::{auth_router, auth_router_generic};

pub mod config {
    pub use crate::application::config::*;
}
