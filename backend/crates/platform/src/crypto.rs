//! Cryptographic Utilities
//!
//! One process-wide key serves two directions:
//! - outbound payloads are sealed with AES-256-GCM, the random nonce is
//!   prepended and the result base64 encoded (`seal` / `open`)
//! - inbound credential fields arrive as AES-256 blocks with PKCS#7 padding
//!   (`decrypt_blocks` / `encrypt_blocks`)

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Required key length (AES-256)
pub const KEY_LEN: usize = 32;
/// AES-GCM standard nonce size
pub const NONCE_LEN: usize = 12;
/// AES block size
pub const BLOCK_LEN: usize = 16;

/// Cipher failures. Messages never contain key or ciphertext bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("cipher key must be exactly {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("ciphertext is not a multiple of the block size")]
    BlockAlignment,

    #[error("invalid padding")]
    Padding,

    #[error("envelope encryption failed")]
    Seal,

    #[error("envelope decryption failed")]
    Open,

    #[error("envelope is not valid base64")]
    Encoding,
}

/// Symmetric cipher bound to the process-wide key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricCipher {
    key: [u8; KEY_LEN],
}

impl SymmetricCipher {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Build from raw key material, e.g. the `ENCRYPTION_KEY` string bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; KEY_LEN] = key
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
        Ok(Self::new(key))
    }

    /// Encrypt with AES-256-GCM and return `base64(nonce || ciphertext || tag)`.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let nonce_bytes = random_bytes(NONCE_LEN);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::Seal)?;

        let mut combined = nonce_bytes;
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(combined))
    }

    /// Reverse of [`seal`](Self::seal).
    pub fn open(&self, envelope: &str) -> Result<Vec<u8>, CipherError> {
        let combined = general_purpose::STANDARD
            .decode(envelope)
            .map_err(|_| CipherError::Encoding)?;

        if combined.len() <= NONCE_LEN {
            return Err(CipherError::Open);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::Open)
    }

    /// Decrypt AES-256 blocks and strip the PKCS#7 padding.
    pub fn decrypt_blocks(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CipherError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::BlockAlignment);
        }

        let cipher = Aes256::new(GenericArray::from_slice(&self.key));
        let mut buf = Zeroizing::new(ciphertext.to_vec());
        for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
            cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
        }

        strip_padding(&mut buf)?;
        Ok(buf)
    }

    /// Pad with PKCS#7 and encrypt as AES-256 blocks, the way clients
    /// prepare credential fields.
    pub fn encrypt_blocks(&self, plaintext: &[u8]) -> Vec<u8> {
        let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
        let mut buf = Vec::with_capacity(plaintext.len() + pad);
        buf.extend_from_slice(plaintext);
        buf.extend(std::iter::repeat_n(pad as u8, pad));

        let cipher = Aes256::new(GenericArray::from_slice(&self.key));
        for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
            cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        buf
    }
}

impl fmt::Debug for SymmetricCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

fn strip_padding(buf: &mut Vec<u8>) -> Result<(), CipherError> {
    let pad = *buf.last().ok_or(CipherError::Padding)? as usize;
    if pad == 0 || pad > BLOCK_LEN || pad > buf.len() {
        return Err(CipherError::Padding);
    }

    let start = buf.len() - pad;
    if !buf[start..].iter().all(|&b| b as usize == pad) {
        return Err(CipherError::Padding);
    }

    buf.truncate(start);
    Ok(())
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn cipher() -> SymmetricCipher {
        SymmetricCipher::from_slice(KEY).unwrap()
    }

    #[test]
    fn test_key_length_enforced() {
        assert_eq!(
            SymmetricCipher::from_slice(b"short").unwrap_err(),
            CipherError::InvalidKeyLength(5)
        );
        assert!(SymmetricCipher::from_slice(KEY).is_ok());
    }

    #[test]
    fn test_seal_open() {
        let cipher = cipher();
        let sealed = cipher.seal(br#"{"valid":true}"#).unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), br#"{"valid":true}"#);
    }

    #[test]
    fn test_seal_uses_fresh_nonce() {
        let cipher = cipher();
        assert_ne!(cipher.seal(b"same").unwrap(), cipher.seal(b"same").unwrap());
    }

    #[test]
    fn test_open_rejects_other_key_and_garbage() {
        let sealed = cipher().seal(b"payload").unwrap();
        let other = SymmetricCipher::new([7u8; 32]);
        assert_eq!(other.open(&sealed).unwrap_err(), CipherError::Open);
        assert_eq!(cipher().open("***").unwrap_err(), CipherError::Encoding);
        assert_eq!(cipher().open("AAAA").unwrap_err(), CipherError::Open);
    }

    #[test]
    fn test_block_roundtrip_known_lengths() {
        let cipher = cipher();
        for plain in [&b""[..], b"jdoe", b"exactly16bytes!!", b"a longer secret phrase"] {
            let encrypted = cipher.encrypt_blocks(plain);
            assert_eq!(encrypted.len() % BLOCK_LEN, 0);
            assert_eq!(cipher.decrypt_blocks(&encrypted).unwrap().as_slice(), plain);
        }
    }

    #[test]
    fn test_decrypt_blocks_rejects_misaligned() {
        assert_eq!(
            cipher().decrypt_blocks(&[0u8; 15]).unwrap_err(),
            CipherError::BlockAlignment
        );
        assert_eq!(
            cipher().decrypt_blocks(&[]).unwrap_err(),
            CipherError::BlockAlignment
        );
    }

    #[test]
    fn test_decrypt_blocks_wrong_key() {
        let encrypted = cipher().encrypt_blocks(b"jdoe");
        let other = SymmetricCipher::new([9u8; 32]);
        match other.decrypt_blocks(&encrypted) {
            Ok(plain) => assert_ne!(plain.as_slice(), b"jdoe"),
            Err(e) => assert_eq!(e, CipherError::Padding),
        }
    }

    #[test]
    fn test_strip_padding_rules() {
        let mut ok = vec![b'a', b'b', 2, 2];
        strip_padding(&mut ok).unwrap();
        assert_eq!(ok, b"ab");

        let mut zero = vec![b'a', 0];
        assert_eq!(strip_padding(&mut zero).unwrap_err(), CipherError::Padding);

        let mut mixed = vec![b'a', 1, 2];
        assert_eq!(strip_padding(&mut mixed).unwrap_err(), CipherError::Padding);

        let mut too_long = vec![17u8; 17];
        assert_eq!(strip_padding(&mut too_long).unwrap_err(), CipherError::Padding);
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", cipher());
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("0123456789abcdef"));
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));
    }
}
