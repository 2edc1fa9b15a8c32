//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

use kernel::id::SessionId;
use platform::crypto::SymmetricCipher;

use crate::application::config::AuthConfig;
use crate::application::{
    OtpLedger, OtpValidation, SessionRegister, SignInInput, SignInOutcome, SignInUseCase,
    TokenIssuer,
};
use crate::domain::directory::DirectoryConnector;
use crate::domain::entity::otp::{NewOtp, OtpLookup};
use crate::domain::repository::AuthStore;
use crate::domain::value_object::idle_timeout::IdleTimeout;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    Envelope, LoginPayload, LoginRequest, OtpIssuedPayload, OtpRequest, OtpValidationEnvelope,
    OtpValidationPayload, SessionDataPayload, SessionDataRequest, SessionRecordDto,
    SessionRecords, SessionTimeoutPayload, SessionTimeoutRequest,
};
use crate::presentation::gate::Gated;

/// Shared state for auth handlers
pub struct AuthAppState<R, D>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    pub repo: Arc<R>,
    pub directory: Arc<D>,
    pub config: Arc<AuthConfig>,
    pub cipher: Arc<SymmetricCipher>,
    pub issuer: Arc<TokenIssuer>,
}

// Manual impl: derive would require `R: Clone` and `D: Clone`.
impl<R, D> Clone for AuthAppState<R, D>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            directory: self.directory.clone(),
            config: self.config.clone(),
            cipher: self.cipher.clone(),
            issuer: self.issuer.clone(),
        }
    }
}

impl<R, D> AuthAppState<R, D>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    pub fn new(repo: R, directory: D, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            directory: Arc::new(directory),
            cipher: Arc::new(config.cipher()),
            issuer: Arc::new(TokenIssuer::from_config(&config)),
            config: Arc::new(config),
        }
    }

    /// Serialize and encrypt a response payload
    pub fn seal<T: Serialize>(&self, payload: &T) -> AuthResult<Envelope> {
        let plaintext = serde_json::to_vec(payload)?;
        Ok(Envelope {
            data: self.cipher.seal(&plaintext)?,
        })
    }
}

const OTP_INSERTED: &str = "OTP record inserted successfully";
const OTP_REQUIRED_FIELDS: &str = "username, mobileno, session_id and otp are required";

// ============================================================================
// Login
// ============================================================================

/// POST /HRldap
pub async fn hr_ldap<R, D>(
    State(state): State<AuthAppState<R, D>>,
    Gated(req): Gated<LoginRequest>,
) -> AuthResult<Json<Envelope>>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let use_case = SignInUseCase::new(
        state.directory.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.cipher.clone(),
        state.issuer.clone(),
        state.config.clone(),
    );

    let input = SignInInput {
        username: req.username,
        password: req.password,
    };

    let payload = match use_case.execute(input).await? {
        SignInOutcome::Authenticated {
            session_id,
            username,
            employee_id,
            mobile_number,
            token,
        } => LoginPayload {
            valid: true,
            user_id: Some(session_id),
            username: Some(username),
            employee_id: Some(employee_id),
            mobile_number: Some(mobile_number),
            token: Some(token),
            error: None,
        },
        SignInOutcome::Rejected { username, error } => LoginPayload {
            username,
            error,
            ..Default::default()
        },
    };

    Ok(Json(state.seal(&payload)?))
}

// ============================================================================
// OTP
// ============================================================================

fn new_otp(req: OtpRequest) -> NewOtp {
    NewOtp {
        username: req.username,
        mobile_no: req.mobileno,
        otp: req.otp,
        session_id: req.session_id,
    }
}

/// POST /Loginotp
pub async fn login_otp<R, D>(
    State(state): State<AuthAppState<R, D>>,
    Gated(req): Gated<OtpRequest>,
) -> AuthResult<Json<Envelope>>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let ledger = OtpLedger::new(state.repo.clone(), state.config.clone());
    let record = ledger.issue(&new_otp(req)).await?;

    Ok(Json(state.seal(&OtpIssuedPayload {
        message: OTP_INSERTED.to_string(),
        id: record.id,
        session_id: record.session_id,
    })?))
}

/// POST /Loginotpresend
pub async fn login_otp_resend<R, D>(
    State(state): State<AuthAppState<R, D>>,
    Gated(req): Gated<OtpRequest>,
) -> AuthResult<Json<Envelope>>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let ledger = OtpLedger::new(state.repo.clone(), state.config.clone());
    let record = ledger.resend(&new_otp(req)).await?;

    Ok(Json(state.seal(&OtpIssuedPayload {
        message: OTP_INSERTED.to_string(),
        id: record.id,
        session_id: record.session_id,
    })?))
}

/// POST /Loginotpupdate
pub async fn login_otp_update<R, D>(
    State(state): State<AuthAppState<R, D>>,
    Gated(req): Gated<OtpRequest>,
) -> AuthResult<Json<OtpValidationEnvelope>>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    if req.username.is_empty()
        || req.mobileno.is_empty()
        || req.mobileno == "0"
        || req.session_id.is_empty()
        || req.otp == 0
    {
        return Err(AuthError::MissingField(OTP_REQUIRED_FIELDS));
    }

    let lookup = OtpLookup {
        username: req.username,
        mobile_no: req.mobileno,
        session_id: req.session_id,
        otp: req.otp,
    };

    let ledger = OtpLedger::new(state.repo.clone(), state.config.clone());
    let payload = match ledger.validate(&lookup).await? {
        OtpValidation::Verified(record) => OtpValidationPayload {
            success: true,
            message: "OTP verified successfully".to_string(),
            validcheck: "1".to_string(),
            username: Some(record.username),
            mobileno: Some(record.mobile_no),
            session_id: Some(record.session_id),
        },
        OtpValidation::InvalidOrExpired => OtpValidationPayload {
            success: false,
            message: "OTP expired or invalid".to_string(),
            validcheck: "0".to_string(),
            username: None,
            mobileno: None,
            session_id: None,
        },
    };

    let validcheck = payload.validcheck.clone();
    let envelope = state.seal(&payload)?;

    Ok(Json(OtpValidationEnvelope {
        data: envelope.data,
        validcheck,
    }))
}

// ============================================================================
// Session (bearer protected)
// ============================================================================

/// POST /SessionTimeout
pub async fn session_timeout<R, D>(
    State(state): State<AuthAppState<R, D>>,
    Gated(req): Gated<SessionTimeoutRequest>,
) -> AuthResult<Json<Envelope>>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    if req.session_id.is_empty() {
        return Err(AuthError::MissingField("Missing required field: session_id"));
    }

    let idle_timeout = IdleTimeout::from_flag(req.idletimeout);

    // An id that is not a UUID cannot match any session
    match req.session_id.parse::<SessionId>() {
        Ok(session_id) => {
            let register = SessionRegister::new(state.repo.clone(), state.config.clone());
            register.close_session(&session_id, idle_timeout).await?;
        }
        Err(_) => {
            tracing::info!(session_id = %req.session_id, "Session id is not a UUID, nothing to close");
        }
    }

    Ok(Json(state.seal(&SessionTimeoutPayload {
        status: 200,
        message: format!(
            "Session updated successfully with idletimeout={}",
            idle_timeout.id()
        ),
    })?))
}

/// POST /Sessiondata
pub async fn session_data<R, D>(
    State(state): State<AuthAppState<R, D>>,
    Gated(req): Gated<SessionDataRequest>,
) -> AuthResult<Json<Envelope>>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let records = match req.session_id.parse::<SessionId>() {
        Ok(session_id) => {
            let register = SessionRegister::new(state.repo.clone(), state.config.clone());
            register.find(&session_id).await?
        }
        Err(_) => Vec::new(),
    };

    let records: Vec<SessionRecordDto> = records.into_iter().map(Into::into).collect();

    Ok(Json(state.seal(&SessionDataPayload {
        status: 200,
        message: "Success".to_string(),
        data: SessionRecords {
            count: records.len(),
            records,
        },
    })?))
}
