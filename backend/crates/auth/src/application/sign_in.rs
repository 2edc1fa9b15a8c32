//! Sign In Use Case
//!
//! Decrypts the submitted credentials, verifies them against the directory,
//! loads the employee profile, registers the session and issues a token.

use std::sync::Arc;

use platform::crypto::SymmetricCipher;

use crate::application::config::AuthConfig;
use crate::application::credential_decoder::{CredentialDecoder, CredentialError};
use crate::application::directory_verifier::{DirectoryMatch, DirectoryVerifier};
use crate::application::session_register::SessionRegister;
use crate::application::token_issuer::TokenIssuer;
use crate::domain::directory::DirectoryConnector;
use crate::domain::repository::{EmployeeRepository, SessionRepository};
use crate::error::{AuthError, AuthResult};

/// Sign in input (hex ciphertext as received)
pub struct SignInInput {
    pub username: String,
    pub password: String,
}

/// Sign in outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Authenticated {
        session_id: String,
        username: String,
        employee_id: String,
        mobile_number: String,
        token: String,
    },
    Rejected {
        username: Option<String>,
        error: Option<String>,
    },
}

/// Sign in use case
pub struct SignInUseCase<D, E, S>
where
    D: DirectoryConnector,
    E: EmployeeRepository,
    S: SessionRepository,
{
    directory: Arc<D>,
    employee_repo: Arc<E>,
    session_repo: Arc<S>,
    cipher: Arc<SymmetricCipher>,
    issuer: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<D, E, S> SignInUseCase<D, E, S>
where
    D: DirectoryConnector,
    E: EmployeeRepository,
    S: SessionRepository,
{
    pub fn new(
        directory: Arc<D>,
        employee_repo: Arc<E>,
        session_repo: Arc<S>,
        cipher: Arc<SymmetricCipher>,
        issuer: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            directory,
            employee_repo,
            session_repo,
            cipher,
            issuer,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutcome> {
        let decoder = CredentialDecoder::new(self.cipher.clone());
        let credentials = match decoder.decode(&input.username, &input.password) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::info!(error = %e, "Credential validation failed");
                let username = match e {
                    CredentialError::DecryptionFailed(_) => Some("Invalid".to_string()),
                    _ => None,
                };
                return Ok(SignInOutcome::Rejected {
                    username,
                    error: Some(e.to_string()),
                });
            }
        };

        let verifier = DirectoryVerifier::new(self.directory.clone(), self.config.clone());
        let scope = match verifier.verify(&credentials).await? {
            DirectoryMatch::Matched(scope) => scope,
            DirectoryMatch::NoMatch { username } => {
                return Ok(SignInOutcome::Rejected {
                    username: Some(username),
                    error: None,
                });
            }
        };

        let username = credentials.username();
        let profile = self
            .employee_repo
            .find_profile(username)
            .await?
            .ok_or(AuthError::EmployeeNotFound)?;

        let register = SessionRegister::new(self.session_repo.clone(), self.config.clone());
        let session_id = register
            .open_session(&profile.employee_id, username, &scope.tag)
            .await?
            .to_string();

        let token = self
            .issuer
            .issue(&session_id, username, &profile.employee_id)?;

        tracing::info!(
            session_id = %session_id,
            employee_id = %profile.employee_id,
            scope = %scope,
            "User signed in"
        );

        Ok(SignInOutcome::Authenticated {
            session_id,
            username: username.to_string(),
            employee_id: profile.employee_id,
            mobile_number: profile.mobile_number,
            token,
        })
    }
}
