//! At-rest sealing of chat provider API keys.
//!
//! Keys live base64-sealed inside the settings file; the sealing key is a
//! random per-install secret kept in a separate `device.key` file under the
//! config directory. AES-256-GCM via `ring`, with the IV and auth tag
//! packed into the sealed blob (`iv || ciphertext || tag`).

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroize;

use crate::types::errors::CryptoError;

/// AES-256-GCM key length in bytes.
const KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce/IV length in bytes.
const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
const TAG_LENGTH: usize = 16;

const KEY_FILE: &str = "device.key";

/// A nonce sequence that uses a single nonce value.
/// Used for one-shot encryption/decryption operations.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_LENGTH]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Seals and opens small secrets with a per-install device key.
pub struct SecretStore {
    key: Vec<u8>,
    rng: SystemRandom,
}

impl SecretStore {
    /// Opens the store rooted at `dir`, creating the device key file on
    /// first use.
    pub fn open_at(dir: &Path) -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let key_path = dir.join(KEY_FILE);

        let key = if key_path.exists() {
            let key = fs::read(&key_path)
                .map_err(|e| CryptoError::KeyStore(format!("Failed to read device key: {}", e)))?;
            if key.len() != KEY_LENGTH {
                return Err(CryptoError::KeyStore(format!(
                    "Device key must be {} bytes, got {}",
                    KEY_LENGTH,
                    key.len()
                )));
            }
            key
        } else {
            let mut key = vec![0u8; KEY_LENGTH];
            rng.fill(&mut key).map_err(|_| {
                CryptoError::RandomGeneration("Failed to generate device key".to_string())
            })?;
            fs::create_dir_all(dir).map_err(|e| {
                CryptoError::KeyStore(format!("Failed to create config directory: {}", e))
            })?;
            fs::write(&key_path, &key)
                .map_err(|e| CryptoError::KeyStore(format!("Failed to write device key: {}", e)))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600));
            }
            key
        };

        Ok(Self { key, rng })
    }

    /// Seal a secret into a base64 blob (`iv || ciphertext || tag`).
    pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate nonce".to_string()))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;
        let mut sealing_key = aead::SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        // ring appends the auth tag to the ciphertext in place.
        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LENGTH + in_out.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&in_out);
        Ok(BASE64.encode(blob))
    }

    /// Open a blob produced by [`seal`](Self::seal).
    pub fn open(&self, sealed: &str) -> Result<String, CryptoError> {
        let blob = BASE64
            .decode(sealed)
            .map_err(|e| CryptoError::Decryption(format!("Invalid base64 blob: {}", e)))?;
        if blob.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::Decryption("Sealed blob too short".to_string()));
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(&blob[..NONCE_LENGTH]);

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| CryptoError::Decryption("Failed to create decryption key".to_string()))?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = blob[NONCE_LENGTH..].to_vec();
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| {
                CryptoError::Decryption("Decryption failed: invalid key or corrupted data".to_string())
            })?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| CryptoError::Decryption(format!("Sealed data is not UTF-8: {}", e)))
    }
}

impl Drop for SecretStore {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
