//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::crypto::{KEY_LEN, SymmetricCipher, random_bytes};

use crate::domain::value_object::directory_scope::DirectoryScope;

/// How a new login treats the employee's previous active sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupersedePolicy {
    /// Supersede and insert in one transaction; any failure aborts the login
    #[default]
    Strict,
    /// Supersede failure is logged and the new session is inserted anyway
    Lenient,
}

impl FromStr for SupersedePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown supersede policy: {other}")),
        }
    }
}

/// Directory service connection settings
#[derive(Clone)]
pub struct DirectoryConfig {
    /// e.g. `ldap://ldap.example.org:389`
    pub url: String,
    /// Service identity used for searches
    pub bind_dn: String,
    pub bind_password: String,
    /// Searched in order; the first scope with a successful user bind wins
    pub scopes: Vec<DirectoryScope>,
    pub connect_timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: "ldap://localhost:389".to_string(),
            bind_dn: String::new(),
            bind_password: String::new(),
            scopes: DirectoryScope::defaults("dc=example,dc=org"),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// AES-256 key for credential decryption and response envelopes
    pub encryption_key: [u8; KEY_LEN],
    /// HMAC secret for identity assertions
    pub jwt_secret: Vec<u8>,
    /// Assertion lifetime (2 hours)
    pub token_ttl: Duration,
    /// OTP validity window (45 seconds)
    pub otp_validity: Duration,
    pub supersede_policy: SupersedePolicy,
    pub directory: DirectoryConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            encryption_key: [0u8; KEY_LEN],
            jwt_secret: Vec::new(),
            token_ttl: Duration::from_secs(2 * 3600), // 2 hours
            otp_validity: Duration::from_secs(45),
            supersede_policy: SupersedePolicy::Strict,
            directory: DirectoryConfig::default(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("encryption_key", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("otp_validity", &self.otp_validity)
            .field("supersede_policy", &self.supersede_policy)
            .field("directory", &self.directory)
            .finish()
    }
}

impl AuthConfig {
    /// Create config with random keys (for development and tests)
    pub fn with_random_secret() -> Self {
        let mut encryption_key = [0u8; KEY_LEN];
        encryption_key.copy_from_slice(&random_bytes(KEY_LEN));
        Self {
            encryption_key,
            jwt_secret: random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development (lenient supersede, local directory)
    pub fn development() -> Self {
        Self {
            supersede_policy: SupersedePolicy::Lenient,
            ..Self::with_random_secret()
        }
    }

    /// Cipher bound to the configured key
    pub fn cipher(&self) -> SymmetricCipher {
        SymmetricCipher::new(self.encryption_key)
    }

    /// Get token TTL in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.as_secs() as i64
    }

    /// Get OTP validity in milliseconds
    pub fn otp_validity_ms(&self) -> i64 {
        self.otp_validity.as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl_secs(), 7200);
        assert_eq!(config.otp_validity_ms(), 45_000);
        assert_eq!(config.supersede_policy, SupersedePolicy::Strict);
        assert_eq!(config.directory.scopes.len(), 3);
    }

    #[test]
    fn test_random_secret_differs() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_ne!(a.encryption_key, b.encryption_key);
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("strict".parse(), Ok(SupersedePolicy::Strict));
        assert_eq!(" Lenient ".parse(), Ok(SupersedePolicy::Lenient));
        assert!("loose".parse::<SupersedePolicy>().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AuthConfig::with_random_secret();
        config.directory.bind_password = "hunter2".into();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }
}
