//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::SessionId;

use crate::domain::entity::{
    employee::EmployeeProfile,
    otp::{NewOtp, OtpLookup, OtpRecord},
    session::SessionRecord,
};
use crate::domain::value_object::{api_access::ApiAccessRequest, idle_timeout::IdleTimeout};
use crate::error::AuthResult;

/// Login session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Deactivate every active session of the employee and insert `session`,
    /// in one transaction. Returns the number of superseded sessions.
    async fn replace_active(&self, session: &SessionRecord) -> AuthResult<u64>;

    /// Deactivate every active session of the employee
    async fn supersede_active(&self, employee_id: &str, at: DateTime<Utc>) -> AuthResult<u64>;

    /// Insert a new session
    async fn insert(&self, session: &SessionRecord) -> AuthResult<()>;

    /// Deactivate one session. Returns the number of rows touched.
    async fn close(
        &self,
        session_id: &SessionId,
        idle_timeout: IdleTimeout,
        at: DateTime<Utc>,
    ) -> AuthResult<u64>;

    /// All records stored under a session id
    async fn find_by_id(&self, session_id: &SessionId) -> AuthResult<Vec<SessionRecord>>;
}

/// OTP repository trait
#[trait_variant::make(OtpRepository: Send)]
pub trait LocalOtpRepository {
    /// Insert a first-issue OTP (resend counter 1)
    async fn create(
        &self,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> AuthResult<OtpRecord>;

    /// Insert a resent OTP with the counter one above the previous maximum
    /// for the same session, username and mobile number
    async fn create_resend(
        &self,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> AuthResult<OtpRecord>;

    /// Atomically mark the most recently sent consumable match as verified
    async fn consume_latest(
        &self,
        lookup: &OtpLookup,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<OtpRecord>>;
}

/// HR master data repository trait
#[trait_variant::make(EmployeeRepository: Send)]
pub trait LocalEmployeeRepository {
    /// Find the employee profile for a directory login name
    async fn find_profile(&self, login_name: &str) -> AuthResult<Option<EmployeeProfile>>;
}

/// API policy store trait
#[trait_variant::make(ApiPolicyRepository: Send)]
pub trait LocalApiPolicyRepository {
    /// Ask the policy store about a caller. Returns its raw status message.
    async fn check(&self, request: &ApiAccessRequest) -> AuthResult<String>;

    /// Append the request and its outcome to the audit trail
    async fn record(&self, request: &ApiAccessRequest, status: &str) -> AuthResult<()>;
}

/// Everything the HTTP layer needs from storage
pub trait AuthStore:
    SessionRepository + OtpRepository + EmployeeRepository + ApiPolicyRepository + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: SessionRepository
        + OtpRepository
        + EmployeeRepository
        + ApiPolicyRepository
        + Send
        + Sync
        + 'static
{
}
