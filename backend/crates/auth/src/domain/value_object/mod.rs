//! Value Object Module

pub mod api_access;
pub mod credentials;
pub mod directory_scope;
pub mod idle_timeout;
