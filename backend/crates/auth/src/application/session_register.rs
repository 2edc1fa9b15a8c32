//! Session Register
//!
//! Keeps at most one active session per employee.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::SessionId;

use crate::application::config::{AuthConfig, SupersedePolicy};
use crate::domain::entity::session::SessionRecord;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::idle_timeout::IdleTimeout;
use crate::error::AuthResult;

/// Session register
pub struct SessionRegister<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionRegister<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Supersede the employee's active sessions and open a new one
    pub async fn open_session(
        &self,
        employee_id: &str,
        username: &str,
        scope_tag: &str,
    ) -> AuthResult<SessionId> {
        self.open_session_at(employee_id, username, scope_tag, Utc::now())
            .await
    }

    pub async fn open_session_at(
        &self,
        employee_id: &str,
        username: &str,
        scope_tag: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<SessionId> {
        let session = SessionRecord::open(employee_id, username, scope_tag, now);

        match self.config.supersede_policy {
            SupersedePolicy::Strict => {
                let superseded = self.session_repo.replace_active(&session).await?;
                tracing::info!(
                    employee_id = %employee_id,
                    superseded,
                    "Previous active sessions superseded"
                );
            }
            SupersedePolicy::Lenient => {
                match self.session_repo.supersede_active(employee_id, now).await {
                    Ok(superseded) => tracing::info!(
                        employee_id = %employee_id,
                        superseded,
                        "Previous active sessions superseded"
                    ),
                    Err(e) => tracing::warn!(
                        employee_id = %employee_id,
                        error = %e,
                        "Failed to supersede previous sessions, continuing"
                    ),
                }
                self.session_repo.insert(&session).await?;
            }
        }

        tracing::info!(
            employee_id = %employee_id,
            session_id = %session.session_id,
            scope = %scope_tag,
            "New session created"
        );

        Ok(session.session_id)
    }

    /// Deactivate a session. Unknown ids are not an error.
    pub async fn close_session(
        &self,
        session_id: &SessionId,
        idle_timeout: IdleTimeout,
    ) -> AuthResult<u64> {
        let affected = self
            .session_repo
            .close(session_id, idle_timeout, Utc::now())
            .await?;

        tracing::info!(
            session_id = %session_id,
            idle_timeout = idle_timeout.id(),
            rows_affected = affected,
            "Session closed"
        );

        Ok(affected)
    }

    /// Session rows stored under an id
    pub async fn find(&self, session_id: &SessionId) -> AuthResult<Vec<SessionRecord>> {
        self.session_repo.find_by_id(session_id).await
    }
}
