//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the directory port.

pub mod directory;
pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use directory::{DirectoryConnection, DirectoryConnector};
pub use entity::{employee::EmployeeProfile, otp::OtpRecord, session::SessionRecord};
pub use repository::{
    ApiPolicyRepository, AuthStore, EmployeeRepository, OtpRepository, SessionRepository,
};
