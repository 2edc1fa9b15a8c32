//! Directory Verifier
//!
//! Confirms a username/password pair against the directory service by
//! binding as each candidate entry found in the configured scopes.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::directory::{DirectoryConnection, DirectoryConnector};
use crate::domain::value_object::{
    credentials::PlainCredentials, directory_scope::DirectoryScope,
};
use crate::error::{AuthError, AuthResult};

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryMatch {
    /// A user bind succeeded under this scope
    Matched(DirectoryScope),
    /// No scope accepted the password
    NoMatch { username: String },
}

/// Directory verifier
pub struct DirectoryVerifier<D>
where
    D: DirectoryConnector,
{
    connector: Arc<D>,
    config: Arc<AuthConfig>,
}

impl<D> DirectoryVerifier<D>
where
    D: DirectoryConnector,
{
    pub fn new(connector: Arc<D>, config: Arc<AuthConfig>) -> Self {
        Self { connector, config }
    }

    pub async fn verify(&self, credentials: &PlainCredentials) -> AuthResult<DirectoryMatch> {
        let mut conn = self.connector.connect().await?;

        let outcome = self.scan(&mut conn, credentials).await;

        if let Err(e) = conn.unbind().await {
            tracing::debug!(error = %e, "Directory unbind failed");
        }

        outcome
    }

    async fn scan(
        &self,
        conn: &mut D::Connection,
        credentials: &PlainCredentials,
    ) -> AuthResult<DirectoryMatch> {
        self.bind_service(conn).await?;

        let username = credentials.username();
        let password = credentials.password();
        let mut needs_rebind = false;

        for scope in &self.config.directory.scopes {
            if needs_rebind {
                self.bind_service(conn).await?;
                needs_rebind = false;
            }

            let entries = match conn.search_uid(&scope.base_dn, username).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(scope = %scope, error = %e, "Directory search failed");
                    continue;
                }
            };

            for dn in entries {
                if dn.is_empty() || password.is_empty() {
                    tracing::debug!(scope = %scope, "DN or password empty, skipping entry");
                    continue;
                }

                match conn.bind(&dn, password).await {
                    Ok(true) => {
                        tracing::info!(scope = %scope, username = %username, "Directory bind succeeded");
                        return Ok(DirectoryMatch::Matched(scope.clone()));
                    }
                    Ok(false) => {
                        tracing::debug!(scope = %scope, "Directory bind rejected");
                        needs_rebind = true;
                    }
                    Err(e) => {
                        tracing::warn!(scope = %scope, error = %e, "Directory bind failed");
                        needs_rebind = true;
                    }
                }
            }
        }

        tracing::info!(username = %username, "No directory entry accepted the credentials");

        Ok(DirectoryMatch::NoMatch {
            username: username.to_string(),
        })
    }

    async fn bind_service(&self, conn: &mut D::Connection) -> AuthResult<()> {
        let directory = &self.config.directory;
        if conn.bind(&directory.bind_dn, &directory.bind_password).await? {
            Ok(())
        } else {
            Err(AuthError::Directory("service bind rejected".to_string()))
        }
    }
}
