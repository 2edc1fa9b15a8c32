//! Token Issuer
//!
//! HS256 identity assertions handed out after a successful login and
//! checked by the bearer guard.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Claims embedded in every assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Session id of the login
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies assertions with the process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs())
    }

    pub fn issue(&self, user_id: &str, username: &str, employee_id: &str) -> AuthResult<String> {
        self.issue_at(user_id, username, employee_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        username: &str,
        employee_id: &str,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<String> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            employee_id: employee_id.to_string(),
            iat,
            exp: iat + self.ttl_secs,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature, algorithm and expiry (no leeway)
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Assertion rejected");
                AuthError::Unauthorized("Invalid or expired token")
            })
    }
}
