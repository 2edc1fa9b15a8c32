//! API DTOs (Data Transfer Objects)
//!
//! Every response payload is sealed into an [`Envelope`] before it leaves
//! the service; the payload structs here describe the plaintext.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entity::session::SessionRecord;

/// Request bodies that may carry the API access key
pub trait AccessKeyBody {
    fn access_key(&self) -> Option<&str>;
}

/// Accepts a JSON string or number and keeps its textual form
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

// ============================================================================
// Envelope
// ============================================================================

/// Sealed response body: `{"Data": "<base64>"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Data")]
    pub data: String,
}

/// Sealed OTP validation body with the outcome flag in clear
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpValidationEnvelope {
    #[serde(rename = "Data")]
    pub data: String,
    pub validcheck: String,
}

/// Policy rejection: `{Status, Message, Data: []}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionPayload {
    #[serde(rename = "Status")]
    pub status: u16,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Data")]
    pub data: Vec<String>,
}

// ============================================================================
// Login
// ============================================================================

/// Login request (username and password are hex ciphertext)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "Hrtoken")]
    pub token: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl AccessKeyBody for LoginRequest {
    fn access_key(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Login outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginPayload {
    pub valid: bool,
    /// Session id of the new login
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "EmployeeId", default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(rename = "MobileNumber", default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// OTP
// ============================================================================

/// OTP issue / resend / validate request
#[derive(Debug, Clone, Deserialize)]
pub struct OtpRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: String,
    /// Sent as a string by some clients and as a number by others
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobileno: String,
    #[serde(default)]
    pub otp: i32,
    #[serde(default)]
    pub session_id: String,
}

impl AccessKeyBody for OtpRequest {
    fn access_key(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// OTP issue / resend response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpIssuedPayload {
    pub message: String,
    pub id: i64,
    pub session_id: String,
}

/// OTP validation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpValidationPayload {
    pub success: bool,
    pub message: String,
    /// "1" on success, "0" otherwise
    pub validcheck: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobileno: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// ============================================================================
// Session
// ============================================================================

/// Session timeout request
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTimeoutRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub idletimeout: i64,
}

impl AccessKeyBody for SessionTimeoutRequest {
    fn access_key(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Session timeout response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimeoutPayload {
    pub status: u16,
    pub message: String,
}

/// Session lookup request
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDataRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "Session_id", default)]
    pub session_id: String,
}

impl AccessKeyBody for SessionDataRequest {
    fn access_key(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// One stored session row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecordDto {
    pub session_id: String,
    pub department: String,
    pub username: String,
    pub user_id: String,
    pub employee_id: String,
    pub is_active: i16,
    pub idletimeout: i16,
    pub login_date: String,
    pub logout_date: Option<String>,
}

impl From<SessionRecord> for SessionRecordDto {
    fn from(record: SessionRecord) -> Self {
        let session_id = record.session_id.to_string();
        Self {
            user_id: session_id.clone(),
            session_id,
            department: record.scope_tag,
            username: record.username,
            employee_id: record.employee_id,
            is_active: i16::from(record.active),
            idletimeout: record.idle_timeout.id(),
            login_date: record.login_at.to_rfc3339(),
            logout_date: record.logout_at.map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecords {
    #[serde(rename = "No Of Records")]
    pub count: usize,
    #[serde(rename = "Records")]
    pub records: Vec<SessionRecordDto>,
}

/// Session lookup response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDataPayload {
    #[serde(rename = "Status")]
    pub status: u16,
    pub message: String,
    #[serde(rename = "Data")]
    pub data: SessionRecords,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_accepts_hrtoken_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"Hrtoken":"abc123","username":"aa","password":"bb"}"#)
                .unwrap();
        assert_eq!(req.access_key(), Some("abc123"));
    }

    #[test]
    fn test_mobileno_string_or_number() {
        let text: OtpRequest =
            serde_json::from_str(r#"{"mobileno":"9876543210","otp":1234}"#).unwrap();
        let number: OtpRequest =
            serde_json::from_str(r#"{"mobileno":9876543210,"otp":1234}"#).unwrap();
        assert_eq!(text.mobileno, "9876543210");
        assert_eq!(number.mobileno, "9876543210");
        assert!(serde_json::from_str::<OtpRequest>(r#"{"mobileno":true}"#).is_err());
    }

    #[test]
    fn test_failed_login_payload_omits_absent_fields() {
        let payload = LoginPayload {
            username: Some("jdoe".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"valid": false, "username": "jdoe"}));
    }

    #[test]
    fn test_session_records_keys() {
        let json = serde_json::to_value(SessionRecords {
            count: 0,
            records: vec![],
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"No Of Records": 0, "Records": []}));
    }
}
