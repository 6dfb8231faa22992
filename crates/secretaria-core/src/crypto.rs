//! Authenticated encryption for stored message text.
//!
//! Sealed blob layout: `hex(nonce(12) || ciphertext || tag)`. A fresh random
//! nonce is generated per encryption; decryption splits the first 12 bytes
//! and refuses anything that fails the Poly1305 tag check.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

use crate::error::SecretariaError;

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;

/// Codec sealing message plaintext under a fixed process-wide key.
#[derive(Clone)]
pub struct MessageCodec {
    key: [u8; KEY_SIZE],
}

impl MessageCodec {
    /// Build a codec from the configured key: exactly 64 hex characters.
    ///
    /// This is a startup precondition — a missing or malformed key must
    /// prevent the process from starting.
    pub fn new(hex_key: &str) -> Result<Self, SecretariaError> {
        let trimmed = hex_key.trim();
        if trimmed.len() != KEY_SIZE * 2 {
            return Err(SecretariaError::Config(format!(
                "message key must be {} hex characters (32 bytes), got {}",
                KEY_SIZE * 2,
                trimmed.len()
            )));
        }
        let bytes = hex::decode(trimmed)
            .map_err(|e| SecretariaError::Config(format!("message key is not valid hex: {e}")))?;
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Encrypt plaintext into a hex sealed blob with a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, SecretariaError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

        let aead = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let ciphertext = aead
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| SecretariaError::Authentication(format!("encryption failed: {e}")))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(hex::encode(blob))
    }

    /// Decrypt a hex sealed blob. Tag mismatch is a hard error — a tampered
    /// blob never yields altered plaintext.
    pub fn decrypt(&self, sealed: &str) -> Result<String, SecretariaError> {
        let blob = hex::decode(sealed.trim())
            .map_err(|e| SecretariaError::Authentication(format!("blob is not valid hex: {e}")))?;
        if blob.len() < NONCE_SIZE {
            return Err(SecretariaError::Authentication(
                "blob shorter than nonce".into(),
            ));
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);

        let aead = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let plaintext = aead
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                SecretariaError::Authentication("tag mismatch: blob tampered or wrong key".into())
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| SecretariaError::Authentication(format!("plaintext is not UTF-8: {e}")))
    }
}

impl std::fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the key.
        f.debug_struct("MessageCodec").finish_non_exhaustive()
    }
}
