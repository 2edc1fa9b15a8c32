//! Login Session Entity
//!
//! One row per successful directory login. Rows are never deleted: they are
//! deactivated on logout, on idle timeout, or when the next login of the
//! same employee supersedes them.

use chrono::{DateTime, Utc};
use kernel::id::SessionId;

use crate::domain::value_object::idle_timeout::IdleTimeout;

/// Login session record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session ID (UUID v4), also handed to the client as `userId`
    pub session_id: SessionId,
    /// Employee identifier from the HR profile
    pub employee_id: String,
    /// Directory login name
    pub username: String,
    /// Tag of the directory scope that matched (staff, faculty, ...)
    pub scope_tag: String,
    /// At most one active record per employee
    pub active: bool,
    /// Set when the session ended by idle timeout or was superseded
    pub idle_timeout: IdleTimeout,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Create a new active session
    pub fn open(
        employee_id: impl Into<String>,
        username: impl Into<String>,
        scope_tag: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            employee_id: employee_id.into(),
            username: username.into(),
            scope_tag: scope_tag.into(),
            active: true,
            idle_timeout: IdleTimeout::NotIdle,
            login_at: now,
            logout_at: None,
        }
    }

    /// Deactivate the session
    pub fn close(&mut self, idle_timeout: IdleTimeout, now: DateTime<Utc>) {
        self.active = false;
        self.idle_timeout = idle_timeout;
        self.logout_at = Some(now);
    }

    /// Deactivate because a newer login of the same employee took over
    pub fn supersede(&mut self, now: DateTime<Utc>) {
        self.close(IdleTimeout::Idle, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let now = Utc::now();
        let mut session = SessionRecord::open("E100", "jdoe", "faculty", now);
        assert!(session.active);
        assert_eq!(session.idle_timeout, IdleTimeout::NotIdle);
        assert!(session.logout_at.is_none());

        session.close(IdleTimeout::NotIdle, now);
        assert!(!session.active);
        assert_eq!(session.logout_at, Some(now));
    }

    #[test]
    fn test_supersede_marks_idle() {
        let now = Utc::now();
        let mut session = SessionRecord::open("E100", "jdoe", "staff", now);
        session.supersede(now);
        assert!(!session.active);
        assert_eq!(session.idle_timeout, IdleTimeout::Idle);
    }
}
