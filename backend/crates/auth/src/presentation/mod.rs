//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use gate::Gated;
pub use handlers::AuthAppState;
pub use middleware::require_bearer;
pub use router::{auth_router, auth_router_generic};
