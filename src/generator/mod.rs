//! Password generators.
//!
//! Every generator converts between password length and entropy, derives a
//! deterministic password from stable identifiers plus a passphrase, and
//! produces random passwords. The variant set is closed and dispatched
//! explicitly by [`PasswordGenerator`].

pub mod charset;
pub mod manager;
pub mod oplop;

pub use charset::{Charset, CharsetGenerator};
pub use manager::GeneratorManager;
pub use oplop::OplopGenerator;

use crate::error::{Error, Result};

pub const OPLOP: &str = "oplop";
pub const SUPERGENPASS: &str = "supergenpass";
pub const PASSWORDCOMPOSER: &str = "passwordcomposer";

/// Identifiers that do not name a charset file.
pub const RESERVED_IDS: [&str; 3] = [OPLOP, SUPERGENPASS, PASSWORDCOMPOSER];

/// Longest password, in symbols, any generator produces.
pub const MAX_LENGTH: usize = 4096;

/// Tolerance applied before rounding a fractional length up.
pub(crate) const LENGTH_EPSILON: f64 = 1e-9;

pub(crate) fn check_length(length: usize) -> Result<()> {
    if length == 0 || length > MAX_LENGTH {
        return Err(Error::InvalidLength(length));
    }
    Ok(())
}

#[derive(Debug)]
pub enum PasswordGenerator {
    Charset(CharsetGenerator),
    Oplop(OplopGenerator),
    /// Reserved; every operation fails with [`Error::NotImplemented`].
    SuperGenPass,
    /// Reserved; every operation fails with [`Error::NotImplemented`].
    PasswordComposer,
}

impl PasswordGenerator {
    /// Entropy in bits of a password of `length` symbols.
    pub fn get_entropy(&self, length: usize) -> Result<f64> {
        match self {
            PasswordGenerator::Charset(g) => Ok(g.get_entropy(length)),
            PasswordGenerator::Oplop(g) => Ok(g.get_entropy(length)),
            _ => Err(self.not_implemented()),
        }
    }

    /// Exact inverse of [`get_entropy`](Self::get_entropy), possibly fractional.
    pub fn get_length(&self, entropy: f64) -> Result<f64> {
        match self {
            PasswordGenerator::Charset(g) => Ok(g.get_length(entropy)),
            PasswordGenerator::Oplop(g) => Ok(g.get_length(entropy)),
            _ => Err(self.not_implemented()),
        }
    }

    /// Smallest length providing at least `entropy` bits.
    ///
    /// The target must be finite, non-negative and reachable within
    /// [`MAX_LENGTH`] symbols.
    pub fn get_minimum_length(&self, entropy: f64) -> Result<usize> {
        let length = match self {
            PasswordGenerator::Charset(g) => g.get_minimum_length(entropy),
            PasswordGenerator::Oplop(g) => g.get_minimum_length(entropy),
            _ => return Err(self.not_implemented()),
        };
        if !entropy.is_finite() || entropy < 0.0 || length > MAX_LENGTH {
            return Err(Error::InvalidEntropy(entropy));
        }
        Ok(length)
    }

    /// Derives the password for an entry. Identical inputs always give
    /// identical output.
    pub fn get_password(
        &self,
        name: &str,
        username: &str,
        nonce: &str,
        passphrase: &str,
        length: usize,
    ) -> Result<String> {
        match self {
            PasswordGenerator::Charset(g) => {
                g.get_password(name, username, nonce, passphrase, length)
            }
            PasswordGenerator::Oplop(g) => g.get_password(name, username, nonce, passphrase, length),
            _ => Err(self.not_implemented()),
        }
    }

    pub fn get_random_password(&self, length: usize) -> Result<String> {
        match self {
            PasswordGenerator::Charset(g) => g.get_random_password(length),
            PasswordGenerator::Oplop(g) => g.get_random_password(length),
            _ => Err(self.not_implemented()),
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(
            self,
            PasswordGenerator::Charset(_) | PasswordGenerator::Oplop(_)
        )
    }

    fn not_implemented(&self) -> Error {
        match self {
            PasswordGenerator::PasswordComposer => Error::NotImplemented(PASSWORDCOMPOSER),
            PasswordGenerator::SuperGenPass => Error::NotImplemented(SUPERGENPASS),
            PasswordGenerator::Charset(_) => Error::NotImplemented("charset"),
            PasswordGenerator::Oplop(_) => Error::NotImplemented(OPLOP),
        }
    }
}
