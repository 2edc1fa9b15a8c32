//! Credential Decoder
//!
//! Clients send username and password as hex-encoded AES-256 blocks. Both
//! fields are format-checked before either is decrypted.

use std::fmt;
use std::sync::Arc;

use platform::crypto::SymmetricCipher;
use zeroize::Zeroizing;

use crate::domain::value_object::credentials::PlainCredentials;

/// Which credential field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Username,
    Password,
}

impl CredentialField {
    fn title(&self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Password => "Password",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Password => f.write_str("password"),
        }
    }
}

/// Decoder failures. The messages are shown to the caller inside the
/// encrypted envelope and never include ciphertext or key material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid {0} format - must be encrypted (hex-encoded)")]
    InvalidFormat(CredentialField),

    #[error("{} decryption failed", .0.title())]
    DecryptionFailed(CredentialField),
}

/// Turns hex ciphertext fields into plaintext credentials
#[derive(Debug, Clone)]
pub struct CredentialDecoder {
    cipher: Arc<SymmetricCipher>,
}

impl CredentialDecoder {
    pub fn new(cipher: Arc<SymmetricCipher>) -> Self {
        Self { cipher }
    }

    pub fn decode(&self, username: &str, password: &str) -> Result<PlainCredentials, CredentialError> {
        let username_bytes = decode_hex(username, CredentialField::Username)?;
        let password_bytes = Zeroizing::new(decode_hex(password, CredentialField::Password)?);

        let username = self.decrypt(&username_bytes, CredentialField::Username)?;
        let password = self.decrypt(&password_bytes, CredentialField::Password)?;

        Ok(PlainCredentials::new(username.to_string(), password))
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        field: CredentialField,
    ) -> Result<Zeroizing<String>, CredentialError> {
        let plain = self.cipher.decrypt_blocks(ciphertext).map_err(|e| {
            tracing::warn!(field = %field, error = %e, "Credential decryption failed");
            CredentialError::DecryptionFailed(field)
        })?;

        let text = std::str::from_utf8(&plain).map_err(|_| {
            tracing::warn!(field = %field, "Decrypted credential is not UTF-8");
            CredentialError::DecryptionFailed(field)
        })?;

        Ok(Zeroizing::new(text.to_string()))
    }
}

/// Non-empty, even-length, valid hex
fn decode_hex(value: &str, field: CredentialField) -> Result<Vec<u8>, CredentialError> {
    if value.is_empty() || value.len() % 2 != 0 {
        return Err(CredentialError::InvalidFormat(field));
    }
    hex::decode(value).map_err(|_| CredentialError::InvalidFormat(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn cipher() -> Arc<SymmetricCipher> {
        Arc::new(SymmetricCipher::new(*KEY))
    }

    fn encrypt_hex(plain: &str) -> String {
        hex::encode(cipher().encrypt_blocks(plain.as_bytes()))
    }

    #[test]
    fn test_roundtrip_under_configured_key() {
        let decoder = CredentialDecoder::new(cipher());
        let creds = decoder
            .decode(&encrypt_hex("jdoe"), &encrypt_hex("s3cret!"))
            .unwrap();
        assert_eq!(creds.username(), "jdoe");
        assert_eq!(creds.password(), "s3cret!");
    }

    #[test]
    fn test_empty_field_is_a_format_error() {
        let decoder = CredentialDecoder::new(cipher());
        let good = encrypt_hex("jdoe");

        assert_eq!(
            decoder.decode("", &good).unwrap_err(),
            CredentialError::InvalidFormat(CredentialField::Username)
        );
        assert_eq!(
            decoder.decode(&good, "").unwrap_err(),
            CredentialError::InvalidFormat(CredentialField::Password)
        );
        assert_eq!(
            decoder.decode("", "").unwrap_err(),
            CredentialError::InvalidFormat(CredentialField::Username)
        );
    }

    #[test]
    fn test_format_errors_name_the_field() {
        let decoder = CredentialDecoder::new(cipher());
        let good = encrypt_hex("jdoe");

        let err = decoder.decode("xyz1", &good).unwrap_err();
        assert_eq!(err, CredentialError::InvalidFormat(CredentialField::Username));
        assert_eq!(
            err.to_string(),
            "Invalid username format - must be encrypted (hex-encoded)"
        );

        let err = decoder.decode(&good, "abc").unwrap_err();
        assert_eq!(err, CredentialError::InvalidFormat(CredentialField::Password));
        assert_eq!(
            err.to_string(),
            "Invalid password format - must be encrypted (hex-encoded)"
        );
    }

    #[test]
    fn test_format_checked_before_any_decryption() {
        // The username is valid hex but not decryptable. A format error on the
        // password must win, so decryption was never attempted.
        let decoder = CredentialDecoder::new(cipher());
        let err = decoder.decode(&"00".repeat(15), "zz").unwrap_err();
        assert_eq!(err, CredentialError::InvalidFormat(CredentialField::Password));
    }

    #[test]
    fn test_decryption_failures_are_per_field() {
        let decoder = CredentialDecoder::new(cipher());
        let good = encrypt_hex("jdoe");

        // 15 bytes is not a whole block
        let err = decoder.decode(&"ab".repeat(15), &good).unwrap_err();
        assert_eq!(err, CredentialError::DecryptionFailed(CredentialField::Username));
        assert_eq!(err.to_string(), "Username decryption failed");

        let err = decoder.decode(&good, &"ab".repeat(15)).unwrap_err();
        assert_eq!(err, CredentialError::DecryptionFailed(CredentialField::Password));
        assert_eq!(err.to_string(), "Password decryption failed");
    }

    #[test]
    fn test_wrong_key_fails() {
        let other = CredentialDecoder::new(Arc::new(SymmetricCipher::new([3u8; 32])));
        // A foreign key may still yield valid padding, but never the original
        match other.decode(&encrypt_hex("jdoe"), &encrypt_hex("pw")) {
            Err(e) => assert!(matches!(e, CredentialError::DecryptionFailed(_))),
            Ok(creds) => assert_ne!(creds.username(), "jdoe"),
        }
    }
}
