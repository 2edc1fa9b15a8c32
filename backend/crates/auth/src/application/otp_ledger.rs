//! OTP Ledger
//!
//! Issues, re-issues and validates short-lived numeric codes tied to a
//! login session.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::application::config::AuthConfig;
use crate::domain::entity::otp::{NewOtp, OtpLookup, OtpRecord};
use crate::domain::repository::OtpRepository;
use crate::error::AuthResult;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpValidation {
    /// The code matched and is now consumed
    Verified(OtpRecord),
    /// No pending, unexpired record matched
    InvalidOrExpired,
}

/// OTP ledger
pub struct OtpLedger<O>
where
    O: OtpRepository,
{
    otp_repo: Arc<O>,
    config: Arc<AuthConfig>,
}

impl<O> OtpLedger<O>
where
    O: OtpRepository,
{
    pub fn new(otp_repo: Arc<O>, config: Arc<AuthConfig>) -> Self {
        Self { otp_repo, config }
    }

    fn validity(&self) -> Duration {
        Duration::milliseconds(self.config.otp_validity_ms())
    }

    pub async fn issue(&self, otp: &NewOtp) -> AuthResult<OtpRecord> {
        self.issue_at(otp, Utc::now()).await
    }

    pub async fn issue_at(&self, otp: &NewOtp, now: DateTime<Utc>) -> AuthResult<OtpRecord> {
        let record = self
            .otp_repo
            .create(otp, now, now + self.validity())
            .await?;

        tracing::info!(otp_id = record.id, session_id = %record.session_id, "OTP issued");

        Ok(record)
    }

    pub async fn resend(&self, otp: &NewOtp) -> AuthResult<OtpRecord> {
        self.resend_at(otp, Utc::now()).await
    }

    pub async fn resend_at(&self, otp: &NewOtp, now: DateTime<Utc>) -> AuthResult<OtpRecord> {
        let record = self
            .otp_repo
            .create_resend(otp, now, now + self.validity())
            .await?;

        tracing::info!(
            otp_id = record.id,
            session_id = %record.session_id,
            resend = record.resend,
            "OTP resent"
        );

        Ok(record)
    }

    pub async fn validate(&self, lookup: &OtpLookup) -> AuthResult<OtpValidation> {
        self.validate_at(lookup, Utc::now()).await
    }

    pub async fn validate_at(
        &self,
        lookup: &OtpLookup,
        now: DateTime<Utc>,
    ) -> AuthResult<OtpValidation> {
        match self.otp_repo.consume_latest(lookup, now).await? {
            Some(record) => {
                tracing::info!(otp_id = record.id, session_id = %record.session_id, "OTP verified");
                Ok(OtpValidation::Verified(record))
            }
            None => {
                tracing::info!(session_id = %lookup.session_id, "OTP invalid or expired");
                Ok(OtpValidation::InvalidOrExpired)
            }
        }
    }
}
