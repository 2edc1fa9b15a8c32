//! In-memory implementations
//!
//! Test doubles for the PostgreSQL store and the LDAP directory, with hooks
//! for injecting failures and counting binds. Behaviour mirrors the real
//! implementations.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use kernel::id::SessionId;
use tokio::sync::Mutex;

use crate::domain::directory::{DirectoryConnection, DirectoryConnector};
use crate::domain::entity::{
    employee::EmployeeProfile,
    otp::{NewOtp, OtpLookup, OtpRecord, OtpStatus},
    session::SessionRecord,
};
use crate::domain::repository::{
    ApiPolicyRepository, EmployeeRepository, OtpRepository, SessionRepository,
};
use crate::domain::value_object::{api_access::ApiAccessRequest, idle_timeout::IdleTimeout};
use crate::error::{AuthError, AuthResult};

/// One audited gate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub client_ip: String,
    pub request_url: String,
    pub status: String,
}

#[derive(Default)]
struct State {
    sessions: Vec<SessionRecord>,
    otps: Vec<OtpRecord>,
    employees: HashMap<String, EmployeeProfile>,
    /// access key -> status message returned by the policy check
    policies: HashMap<String, String>,
    audit: Vec<AuditEntry>,
}

/// In-memory auth store
#[derive(Clone, Default)]
pub struct MemoryAuthStore {
    state: Arc<Mutex<State>>,
    fail_supersede: Arc<AtomicBool>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_employee(&self, login_name: &str, profile: EmployeeProfile) {
        self.state
            .lock()
            .await
            .employees
            .insert(login_name.to_string(), profile);
    }

    /// Make the policy check answer `status` for `access_key`.
    /// Unknown keys answer `Invalid_Key`.
    pub async fn set_policy(&self, access_key: &str, status: &str) {
        self.state
            .lock()
            .await
            .policies
            .insert(access_key.to_string(), status.to_string());
    }

    /// Make `supersede_active` fail, to exercise the supersede policies
    pub fn fail_supersede(&self, fail: bool) {
        self.fail_supersede.store(fail, Ordering::SeqCst);
    }

    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.state.lock().await.sessions.clone()
    }

    pub async fn otps(&self) -> Vec<OtpRecord> {
        self.state.lock().await.otps.clone()
    }

    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.state.lock().await.audit.clone()
    }

    fn supersede_locked(state: &mut State, employee_id: &str, at: DateTime<Utc>) -> u64 {
        let mut count = 0;
        for session in state
            .sessions
            .iter_mut()
            .filter(|s| s.active && s.employee_id == employee_id)
        {
            session.supersede(at);
            count += 1;
        }
        count
    }

    fn insert_otp_locked(
        state: &mut State,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
        resend: i32,
    ) -> OtpRecord {
        let record = OtpRecord {
            id: state.otps.len() as i64 + 1,
            username: otp.username.clone(),
            mobile_no: otp.mobile_no.clone(),
            otp: otp.otp,
            sent_at,
            verified_at: None,
            status: OtpStatus::Pending,
            valid_until,
            session_id: otp.session_id.clone(),
            resend,
        };
        state.otps.push(record.clone());
        record
    }
}

impl SessionRepository for MemoryAuthStore {
    async fn replace_active(&self, session: &SessionRecord) -> AuthResult<u64> {
        if self.fail_supersede.load(Ordering::SeqCst) {
            return Err(AuthError::Internal("supersede failed".to_string()));
        }
        let mut state = self.state.lock().await;
        let superseded = Self::supersede_locked(&mut state, &session.employee_id, session.login_at);
        state.sessions.push(session.clone());
        Ok(superseded)
    }

    async fn supersede_active(&self, employee_id: &str, at: DateTime<Utc>) -> AuthResult<u64> {
        if self.fail_supersede.load(Ordering::SeqCst) {
            return Err(AuthError::Internal("supersede failed".to_string()));
        }
        let mut state = self.state.lock().await;
        Ok(Self::supersede_locked(&mut state, employee_id, at))
    }

    async fn insert(&self, session: &SessionRecord) -> AuthResult<()> {
        self.state.lock().await.sessions.push(session.clone());
        Ok(())
    }

    async fn close(
        &self,
        session_id: &SessionId,
        idle_timeout: IdleTimeout,
        at: DateTime<Utc>,
    ) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let mut count = 0;
        for session in state
            .sessions
            .iter_mut()
            .filter(|s| s.session_id == *session_id)
        {
            session.close(idle_timeout, at);
            count += 1;
        }
        Ok(count)
    }

    async fn find_by_id(&self, session_id: &SessionId) -> AuthResult<Vec<SessionRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.session_id == *session_id)
            .cloned()
            .collect())
    }
}

impl OtpRepository for MemoryAuthStore {
    async fn create(
        &self,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> AuthResult<OtpRecord> {
        let mut state = self.state.lock().await;
        Ok(Self::insert_otp_locked(&mut state, otp, sent_at, valid_until, 1))
    }

    async fn create_resend(
        &self,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> AuthResult<OtpRecord> {
        let mut state = self.state.lock().await;
        let previous = state
            .otps
            .iter()
            .filter(|r| {
                r.session_id == otp.session_id
                    && r.username == otp.username
                    && r.mobile_no == otp.mobile_no
            })
            .map(|r| r.resend)
            .max()
            .unwrap_or(0);
        Ok(Self::insert_otp_locked(
            &mut state,
            otp,
            sent_at,
            valid_until,
            previous + 1,
        ))
    }

    async fn consume_latest(
        &self,
        lookup: &OtpLookup,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<OtpRecord>> {
        let mut state = self.state.lock().await;
        let Some(latest) = state
            .otps
            .iter_mut()
            .filter(|r| r.matches(lookup) && r.is_consumable(now))
            .max_by_key(|r| (r.sent_at, r.id))
        else {
            return Ok(None);
        };

        latest.mark_verified(now);
        let consumed = latest.clone();

        for sibling in state
            .otps
            .iter_mut()
            .filter(|r| r.id != consumed.id && r.status == OtpStatus::Pending)
            .filter(|r| r.is_sibling_of(&consumed))
        {
            sibling.status = OtpStatus::Superseded;
        }

        Ok(Some(consumed))
    }
}

impl EmployeeRepository for MemoryAuthStore {
    async fn find_profile(&self, login_name: &str) -> AuthResult<Option<EmployeeProfile>> {
        Ok(self.state.lock().await.employees.get(login_name).cloned())
    }
}

impl ApiPolicyRepository for MemoryAuthStore {
    async fn check(&self, request: &ApiAccessRequest) -> AuthResult<String> {
        let state = self.state.lock().await;
        Ok(state
            .policies
            .get(&request.access_key)
            .cloned()
            .unwrap_or_else(|| "Invalid_Key".to_string()))
    }

    async fn record(&self, request: &ApiAccessRequest, status: &str) -> AuthResult<()> {
        self.state.lock().await.audit.push(AuditEntry {
            client_ip: request.client_ip.clone(),
            request_url: request.request_url.clone(),
            status: status.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Static directory
// ============================================================================

#[derive(Debug, Clone)]
struct DirectoryEntry {
    base_dn: String,
    uid: String,
    dn: String,
    password: String,
}

#[derive(Debug, Default)]
struct DirectoryState {
    service_dn: String,
    service_password: String,
    entries: Vec<DirectoryEntry>,
    unreachable: bool,
    failing_bases: Vec<String>,
    connections: usize,
    unbinds: usize,
    user_binds: usize,
}

/// Directory with a fixed set of entries
#[derive(Clone, Default)]
pub struct StaticDirectory {
    state: Arc<std::sync::Mutex<DirectoryState>>,
}

impl StaticDirectory {
    pub fn new(service_dn: &str, service_password: &str) -> Self {
        let directory = Self::default();
        directory.with_state(|s| {
            s.service_dn = service_dn.to_string();
            s.service_password = service_password.to_string();
        });
        directory
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut DirectoryState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Add an entry `uid=<uid>,<base_dn>` with the given password
    pub fn add_entry(&self, base_dn: &str, uid: &str, password: &str) {
        self.with_state(|s| {
            s.entries.push(DirectoryEntry {
                base_dn: base_dn.to_string(),
                uid: uid.to_string(),
                dn: format!("uid={uid},{base_dn}"),
                password: password.to_string(),
            })
        });
    }

    /// Make `connect` fail
    pub fn set_unreachable(&self, unreachable: bool) {
        self.with_state(|s| s.unreachable = unreachable);
    }

    /// Make searches under `base_dn` fail
    pub fn fail_search(&self, base_dn: &str) {
        self.with_state(|s| s.failing_bases.push(base_dn.to_string()));
    }

    pub fn connections(&self) -> usize {
        self.with_state(|s| s.connections)
    }

    pub fn unbinds(&self) -> usize {
        self.with_state(|s| s.unbinds)
    }

    /// Binds attempted with an entry DN (service binds excluded)
    pub fn user_binds(&self) -> usize {
        self.with_state(|s| s.user_binds)
    }
}

impl DirectoryConnector for StaticDirectory {
    type Connection = StaticConnection;

    async fn connect(&self) -> AuthResult<StaticConnection> {
        self.with_state(|s| {
            if s.unreachable {
                return Err(AuthError::Directory("connection refused".to_string()));
            }
            s.connections += 1;
            Ok(())
        })?;

        Ok(StaticConnection {
            directory: self.clone(),
            bound_as_service: false,
        })
    }
}

/// Connection to a [`StaticDirectory`]
pub struct StaticConnection {
    directory: StaticDirectory,
    bound_as_service: bool,
}

impl DirectoryConnection for StaticConnection {
    async fn bind(&mut self, dn: &str, password: &str) -> AuthResult<bool> {
        let (is_service, accepted) = self.directory.with_state(|s| {
            if dn == s.service_dn {
                return (true, password == s.service_password);
            }
            s.user_binds += 1;
            let accepted = s
                .entries
                .iter()
                .any(|e| e.dn == dn && e.password == password);
            (false, accepted)
        });

        self.bound_as_service = is_service && accepted;
        Ok(accepted)
    }

    async fn search_uid(&mut self, base_dn: &str, uid: &str) -> AuthResult<Vec<String>> {
        if !self.bound_as_service {
            return Err(AuthError::Directory("insufficient access rights".to_string()));
        }

        self.directory.with_state(|s| {
            if s.failing_bases.iter().any(|b| b == base_dn) {
                return Err(AuthError::Directory(format!("no such object: {base_dn}")));
            }
            Ok(s.entries
                .iter()
                .filter(|e| e.uid == uid && e.base_dn.ends_with(base_dn))
                .map(|e| e.dn.clone())
                .collect())
        })
    }

    async fn unbind(&mut self) -> AuthResult<()> {
        self.directory.with_state(|s| s.unbinds += 1);
        Ok(())
    }
}
