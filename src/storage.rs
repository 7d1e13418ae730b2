//! Storage backends for password entries.
//!
//! Only entry descriptors are stored; passwords are never written anywhere.

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::crypto::{self, NONCE_LEN, SALT_LEN, Sealed};
use crate::entry::PasswordEntry;

const STORE_VERSION: u8 = 1;

/// Saves and loads entry collections.
pub trait Loader {
    fn save(&self, entries: &[PasswordEntry], destination: &Path, secret: Option<&str>) -> Result<()>;

    fn load(&self, destination: &Path, secret: Option<&str>) -> Result<Vec<PasswordEntry>>;
}

/// Plain JSON file. The secret is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainLoader;

impl Loader for PlainLoader {
    fn save(&self, entries: &[PasswordEntry], destination: &Path, _secret: Option<&str>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(destination, json)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        log::debug!("Saved {} entries to {}", entries.len(), destination.display());
        Ok(())
    }

    fn load(&self, destination: &Path, _secret: Option<&str>) -> Result<Vec<PasswordEntry>> {
        let contents = fs::read_to_string(destination)
            .with_context(|| format!("Failed to read {}", destination.display()))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[derive(Serialize, Deserialize)]
struct EncryptedStore {
    version: u8,
    argon2_salt: String,      // Base64 encoded
    encryption_nonce: String, // Base64 encoded
    encrypted_data: String,   // Base64 encoded
}

/// JSON sealed with a key derived from the secret.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncryptedLoader;

impl Loader for EncryptedLoader {
    fn save(&self, entries: &[PasswordEntry], destination: &Path, secret: Option<&str>) -> Result<()> {
        let secret = secret.ok_or_else(|| anyhow!("A secret is required to encrypt the database"))?;
        let sealed = crypto::seal(&serde_json::to_vec(entries)?, secret)?;

        let store = EncryptedStore {
            version: STORE_VERSION,
            argon2_salt: general_purpose::STANDARD.encode(sealed.salt),
            encryption_nonce: general_purpose::STANDARD.encode(sealed.nonce),
            encrypted_data: general_purpose::STANDARD.encode(&sealed.ciphertext),
        };
        fs::write(destination, serde_json::to_string_pretty(&store)?)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        log::debug!(
            "Saved {} encrypted entries to {}",
            entries.len(),
            destination.display()
        );
        Ok(())
    }

    fn load(&self, destination: &Path, secret: Option<&str>) -> Result<Vec<PasswordEntry>> {
        let secret = secret.ok_or_else(|| anyhow!("A secret is required to decrypt the database"))?;
        let contents = fs::read_to_string(destination)
            .with_context(|| format!("Failed to read {}", destination.display()))?;
        if contents.trim().is_empty() {
            return Err(anyhow!("Database file is empty"));
        }

        let store: EncryptedStore = serde_json::from_str(&contents)?;
        if store.version != STORE_VERSION {
            return Err(anyhow!("Unsupported database version {}", store.version));
        }

        let sealed = Sealed {
            salt: decode_array::<SALT_LEN>(&store.argon2_salt, "salt")?,
            nonce: decode_array::<NONCE_LEN>(&store.encryption_nonce, "nonce")?,
            ciphertext: general_purpose::STANDARD.decode(&store.encrypted_data)?,
        };
        let plaintext = crypto::open(&sealed, secret)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

fn decode_array<const N: usize>(encoded: &str, what: &str) -> Result<[u8; N]> {
    let bytes = general_purpose::STANDARD.decode(encoded)?;
    bytes
        .try_into()
        .map_err(|_| anyhow!("Invalid {} length in database", what))
}
