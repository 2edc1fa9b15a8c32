//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod credential_decoder;
pub mod directory_verifier;
pub mod gatekeeper;
pub mod otp_ledger;
pub mod session_register;
pub mod sign_in;
pub mod token_issuer;

// Re-exports
pub use config::{AuthConfig, DirectoryConfig, SupersedePolicy};
pub use credential_decoder::{CredentialDecoder, CredentialError, CredentialField};
pub use directory_verifier::{DirectoryMatch, DirectoryVerifier};
pub use gatekeeper::Gatekeeper;
pub use otp_ledger::{OtpLedger, OtpValidation};
pub use session_register::SessionRegister;
pub use sign_in::{SignInInput, SignInOutcome, SignInUseCase};
pub use token_issuer::{Claims, TokenIssuer};
