//! Encryption of the entry database for the encrypted storage backend.
//!
//! Keys are derived from the database secret with Argon2id; data is sealed
//! with ChaCha20-Poly1305 under a fresh salt and nonce on every save.

use anyhow::{Result, anyhow};
use argon2::Argon2;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, KeyInit, Nonce};
use rand::{TryRngCore, rngs::OsRng};

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;

/// Ciphertext together with the parameters needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

fn derive_key(secret: &str, salt: &[u8]) -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), salt, &mut key)
        .map_err(|e| anyhow!("Failed to derive database key using Argon2id: {}", e))?;
    Ok(key)
}

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

pub fn seal(plaintext: &[u8], secret: &str) -> Result<Sealed> {
    let salt = random_bytes::<SALT_LEN>()?;
    let nonce = random_bytes::<NONCE_LEN>()?;
    let key = derive_key(secret, &salt)?;

    let ciphertext = ChaCha20Poly1305::new(&key.into())
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| anyhow!("Encryption failed"))?;

    Ok(Sealed {
        salt,
        nonce,
        ciphertext,
    })
}

pub fn open(sealed: &Sealed, secret: &str) -> Result<Vec<u8>> {
    let key = derive_key(secret, &sealed.salt)?;
    ChaCha20Poly1305::new(&key.into())
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
        .map_err(|_| anyhow!("Decryption failed - invalid secret"))
}
