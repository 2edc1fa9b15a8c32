//! API Access Value Objects
//!
//! The triple checked by the policy store before any endpoint logic runs,
//! and the verdict it returns.

use std::fmt;

/// Caller identity presented to the policy store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiAccessRequest {
    /// First path segment, e.g. `HRldap`
    pub api_name: String,
    pub client_ip: String,
    pub access_key: String,
    /// Full request URI, stored in the audit trail
    pub request_url: String,
}

/// Named reasons the policy store may give for refusing a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidKey,
    InvalidApiName,
    InvalidIpAddress,
    InactiveApiName,
    InactiveVendor,
    InactiveIpAddress,
    UnauthorizedUser,
    InvalidRollNo,
    /// Any status message the store returns that is not listed above
    Other(String),
}

impl RejectionReason {
    /// Parse a non-success status message from the policy store
    pub fn from_status(status: &str) -> Self {
        match status {
            "Invalid_Key" => Self::InvalidKey,
            "Invalid_APIName" => Self::InvalidApiName,
            "Invalid_IPAddress" => Self::InvalidIpAddress,
            "Inactive_APIName" => Self::InactiveApiName,
            "Inactive_Vendor" => Self::InactiveVendor,
            "Inactive_Ip_Address" => Self::InactiveIpAddress,
            "UnauthorizedUser" => Self::UnauthorizedUser,
            "Invalid_RollNo" => Self::InvalidRollNo,
            other => Self::Other(other.to_string()),
        }
    }

    /// Status message as the policy store spells it
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidKey => "Invalid_Key",
            Self::InvalidApiName => "Invalid_APIName",
            Self::InvalidIpAddress => "Invalid_IPAddress",
            Self::InactiveApiName => "Inactive_APIName",
            Self::InactiveVendor => "Inactive_Vendor",
            Self::InactiveIpAddress => "Inactive_Ip_Address",
            Self::UnauthorizedUser => "UnauthorizedUser",
            Self::InvalidRollNo => "Invalid_RollNo",
            Self::Other(message) => message,
        }
    }

    /// Code clients already key on, carried in the body `Status` field
    pub const fn legacy_code(&self) -> u16 {
        match self {
            Self::InvalidKey => 400,
            Self::InvalidApiName => 401,
            Self::InvalidIpAddress => 402,
            Self::InactiveApiName => 403,
            Self::InactiveVendor => 404,
            Self::InactiveIpAddress => 405,
            Self::UnauthorizedUser => 406,
            Self::InvalidRollNo => 407,
            Self::Other(_) => 403,
        }
    }

    /// HTTP status of the rejection response: 401 when the caller's own
    /// credentials are wrong, 403 for everything else the store refuses.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidKey | Self::UnauthorizedUser => 401,
            _ => 403,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyVerdict {
    Allowed,
    Rejected(RejectionReason),
}

impl PolicyVerdict {
    pub const SUCCESS: &'static str = "Success";

    pub fn from_status(status: &str) -> Self {
        if status == Self::SUCCESS {
            Self::Allowed
        } else {
            Self::Rejected(RejectionReason::from_status(status))
        }
    }
}
