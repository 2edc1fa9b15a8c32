//! One-Time Passcode Entity
//!
//! A pending record ends either `Verified` or, when a sibling for the same
//! session, username and mobile number is verified first, `Superseded`.
//! Expiry is lazy: a pending record past its validity window simply never
//! matches again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OTP status as stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum OtpStatus {
    #[default]
    Pending = 0,
    Verified = 1,
    Superseded = 2,
}

impl OtpStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Create from numeric ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Pending),
            1 => Some(Self::Verified),
            2 => Some(Self::Superseded),
            _ => None,
        }
    }
}

/// Stored OTP record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: i64,
    pub username: String,
    pub mobile_no: String,
    pub otp: i32,
    pub sent_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub status: OtpStatus,
    pub valid_until: DateTime<Utc>,
    pub session_id: String,
    /// 1 for the first issue, previous max + 1 for each resend
    pub resend: i32,
}

impl OtpRecord {
    /// Whether this record may still be consumed at `now`
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        self.verified_at.is_none() && self.status == OtpStatus::Pending && now <= self.valid_until
    }

    /// Same session, username and mobile number, whatever the code
    pub fn is_sibling_of(&self, other: &OtpRecord) -> bool {
        self.username == other.username
            && self.mobile_no == other.mobile_no
            && self.session_id == other.session_id
    }

    /// Whether this record belongs to the given lookup triple and code
    pub fn matches(&self, lookup: &OtpLookup) -> bool {
        self.username == lookup.username
            && self.mobile_no == lookup.mobile_no
            && self.session_id == lookup.session_id
            && self.otp == lookup.otp
    }

    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.status = OtpStatus::Verified;
        self.verified_at = Some(now);
    }
}

/// Data for a new OTP row
#[derive(Debug, Clone)]
pub struct NewOtp {
    pub username: String,
    pub mobile_no: String,
    pub otp: i32,
    pub session_id: String,
}

/// Key for validating a submitted code
#[derive(Debug, Clone)]
pub struct OtpLookup {
    pub username: String,
    pub mobile_no: String,
    pub session_id: String,
    pub otp: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(sent_at: DateTime<Utc>) -> OtpRecord {
        OtpRecord {
            id: 1,
            username: "jdoe".into(),
            mobile_no: "9876543210".into(),
            otp: 4321,
            sent_at,
            verified_at: None,
            status: OtpStatus::Pending,
            valid_until: sent_at + Duration::seconds(45),
            session_id: "s-1".into(),
            resend: 1,
        }
    }

    #[test]
    fn test_consumable_window() {
        let t = Utc::now();
        let otp = record(t);
        assert!(otp.is_consumable(t));
        assert!(otp.is_consumable(t + Duration::seconds(45)));
        assert!(!otp.is_consumable(t + Duration::seconds(46)));
    }

    #[test]
    fn test_verified_is_terminal() {
        let t = Utc::now();
        let mut otp = record(t);
        otp.mark_verified(t);
        assert_eq!(otp.status, OtpStatus::Verified);
        assert!(!otp.is_consumable(t));
    }

    #[test]
    fn test_superseded_is_terminal() {
        let t = Utc::now();
        let mut otp = record(t);
        otp.status = OtpStatus::Superseded;
        assert!(!otp.is_consumable(t));
    }

    #[test]
    fn test_sibling_ignores_code() {
        let t = Utc::now();
        let first = record(t);
        let mut resent = record(t);
        resent.id = 2;
        resent.otp = 9999;
        assert!(resent.is_sibling_of(&first));

        resent.session_id = "s-2".into();
        assert!(!resent.is_sibling_of(&first));
    }

    #[test]
    fn test_status_ids() {
        assert_eq!(OtpStatus::Pending.id(), 0);
        assert_eq!(OtpStatus::from_id(1), Some(OtpStatus::Verified));
        assert_eq!(OtpStatus::from_id(2), Some(OtpStatus::Superseded));
        assert_eq!(OtpStatus::from_id(7), None);
    }
}
