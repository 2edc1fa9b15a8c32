//! Infrastructure Layer
//!
//! Database and directory implementations. The in-memory doubles are only
//! built for tests or with the `test-util` feature.

pub mod ldap;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgres;

pub use ldap::LdapConnector;
#[cfg(any(test, feature = "test-util"))]
pub use memory::{MemoryAuthStore, StaticDirectory};
pub use postgres::PgAuthRepository;
