//! Oplop-compatible generator.
//!
//! The password is the base64url encoding of `MD5(passphrase + username)`,
//! anchored so that it contains at least one digit within the requested
//! length. The entry name and nonce do not take part, which keeps passwords
//! interchangeable with other Oplop implementations.

use base64::{Engine as _, engine::general_purpose};
use md5::{Digest, Md5};
use rand::RngCore;

use crate::error::Result;
use crate::rng::SharedRng;

use super::{LENGTH_EPSILON, check_length};

/// Bits carried by one base64 character.
const BITS_PER_CHAR: f64 = 6.0;

#[derive(Debug)]
pub struct OplopGenerator {
    rng: SharedRng,
}

impl OplopGenerator {
    pub fn new(rng: SharedRng) -> Self {
        Self { rng }
    }

    /// `log2(64^(length - 1) * 10)`: one position is pinned to a digit.
    pub fn get_entropy(&self, length: usize) -> f64 {
        (length as f64 - 1.0) * BITS_PER_CHAR + 10f64.log2()
    }

    pub fn get_length(&self, entropy: f64) -> f64 {
        (entropy - 10f64.log2()) / BITS_PER_CHAR + 1.0
    }

    pub fn get_minimum_length(&self, entropy: f64) -> usize {
        let exact = self.get_length(entropy);
        if exact <= 1.0 {
            return 1;
        }
        (exact - LENGTH_EPSILON).ceil() as usize
    }

    pub fn get_password(
        &self,
        _name: &str,
        username: &str,
        _nonce: &str,
        passphrase: &str,
        length: usize,
    ) -> Result<String> {
        check_length(length)?;
        let digest = Md5::digest(format!("{passphrase}{username}").as_bytes());
        Ok(anchor_digit(&general_purpose::URL_SAFE.encode(digest), length))
    }

    /// Shapes 16 random bytes the same way a digest is shaped.
    pub fn get_random_password(&self, length: usize) -> Result<String> {
        check_length(length)?;
        let mut bytes = [0u8; 16];
        self.rng.with_current(|rng| rng.fill_bytes(&mut bytes));
        Ok(anchor_digit(&general_purpose::URL_SAFE.encode(bytes), length))
    }
}

/// Ensures a digit appears within the first `length` characters, then truncates.
fn anchor_digit(encoded: &str, length: usize) -> String {
    let anchored = match encoded.find(|c: char| c.is_ascii_digit()) {
        None => format!("1{encoded}"),
        Some(start) if start >= length => {
            let run: String = encoded[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            format!("{run}{encoded}")
        }
        Some(_) => encoded.to_string(),
    };
    anchored.chars().take(length).collect()
}
