//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Symmetric cipher for the response envelope and inbound credentials
//! - Client identification helpers (IP, API name, access key format)

pub mod client;
pub mod crypto;
