//! Charset-based generator: symbols drawn from an ordered alphabet file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::Rng;

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::rng::{SharedRng, seed_from_digest};

use super::{LENGTH_EPSILON, check_length};

/// Ordered alphabet of symbol tokens.
///
/// The order matters: every derived password indexes into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    symbols: Vec<String>,
    separator: String,
}

impl Charset {
    /// Builds a charset from tokens, dropping blank and repeated tokens.
    ///
    /// Word alphabets (any token longer than one character) are joined with
    /// a single space; character alphabets are joined with nothing.
    pub fn new<I, S>(tokens: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (symbols, repeated) = collect_symbols(tokens);
        for token in &repeated {
            log::warn!("Dropping repeated charset symbol '{}'", token);
        }

        if symbols.len() < 2 {
            return Err(format!(
                "expected at least 2 distinct symbols, found {}",
                symbols.len()
            ));
        }

        let separator = if symbols.iter().any(|s| s.chars().count() > 1) {
            " ".to_string()
        } else {
            String::new()
        };

        Ok(Self { symbols, separator })
    }

    /// Reads a charset file: one token per line, blank lines ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::InvalidCharset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::new(text.lines()).map_err(|reason| {
            log::warn!("Rejected charset {}: {}", path.display(), reason);
            Error::InvalidCharset {
                path: path.to_path_buf(),
                reason,
            }
        })
    }

    /// Overrides the string placed between drawn symbols.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false: a charset holds at least two symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Bits contributed by one symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        (self.symbols.len() as f64).log2()
    }
}

/// Splits tokens into the distinct symbols, in order, and the repeats that
/// were dropped.
fn collect_symbols<I, S>(tokens: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    let mut repeated = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        if token.is_empty() {
            continue;
        }
        if seen.insert(token.to_string()) {
            symbols.push(token.to_string());
        } else {
            repeated.push(token.to_string());
        }
    }
    (symbols, repeated)
}

#[derive(Debug)]
pub struct CharsetGenerator {
    algorithm: HashAlgorithm,
    charset: Charset,
    rng: SharedRng,
}

impl CharsetGenerator {
    pub fn new(algorithm: HashAlgorithm, charset: Charset, rng: SharedRng) -> Self {
        Self {
            algorithm,
            charset,
            rng,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn get_entropy(&self, length: usize) -> f64 {
        length as f64 * self.charset.bits_per_symbol()
    }

    pub fn get_length(&self, entropy: f64) -> f64 {
        entropy / self.charset.bits_per_symbol()
    }

    pub fn get_minimum_length(&self, entropy: f64) -> usize {
        let exact = self.get_length(entropy);
        if exact <= 1.0 {
            return 1;
        }
        (exact - LENGTH_EPSILON).ceil() as usize
    }

    /// Derives the password for the given identifiers and passphrase.
    ///
    /// The shared sequence is reseeded from
    /// `hash(name + username + nonce + passphrase)` for the duration of the
    /// draw and then restored.
    pub fn get_password(
        &self,
        name: &str,
        username: &str,
        nonce: &str,
        passphrase: &str,
        length: usize,
    ) -> Result<String> {
        check_length(length)?;
        let material = format!("{name}{username}{nonce}{passphrase}");
        let seed = seed_from_digest(&self.algorithm.digest(material.as_bytes()));
        Ok(self.rng.with_reseeded(seed, |rng| self.draw(rng, length)))
    }

    pub fn get_random_password(&self, length: usize) -> Result<String> {
        check_length(length)?;
        Ok(self.rng.with_current(|rng| self.draw(rng, length)))
    }

    fn draw<R: Rng>(&self, rng: &mut R, length: usize) -> String {
        let symbols = self.charset.symbols();
        (0..length)
            .map(|_| symbols[rng.random_range(0..symbols.len())].as_str())
            .collect::<Vec<_>>()
            .join(self.charset.separator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SEED_LEN;

    fn printable_ascii() -> Charset {
        Charset::new((33u8..127).map(|b| (b as char).to_string())).unwrap()
    }

    fn generator(seed: u8) -> CharsetGenerator {
        CharsetGenerator::new(
            HashAlgorithm::Sha512,
            printable_ascii(),
            SharedRng::from_seed([seed; SEED_LEN]),
        )
    }

    #[test]
    fn test_charset_rejects_too_small() {
        assert!(Charset::new(["a"]).is_err());
        assert!(Charset::new(["a", "a", "  ", ""]).is_err());
        assert!(Charset::new(["a", "b"]).is_ok());
    }

    #[test]
    fn test_charset_keeps_order_and_drops_duplicates() {
        let charset = Charset::new(["z", "a", "z", "", "m"]).unwrap();
        assert_eq!(charset.symbols(), &["z", "a", "m"]);
        assert_eq!(charset.separator(), "");
    }

    #[test]
    fn test_repeated_symbols_are_reported() {
        let (symbols, repeated) = collect_symbols(["z", "a", "z", " a ", "m", "z"]);
        assert_eq!(symbols, ["z", "a", "m"]);
        assert_eq!(repeated, ["z", "a", "z"]);

        let (_, repeated) = collect_symbols(["x", "y", ""]);
        assert!(repeated.is_empty());
    }

    #[test]
    fn test_word_charset_uses_space_separator() {
        let charset = Charset::new(["apple", "b", "cherry"]).unwrap();
        assert_eq!(charset.separator(), " ");
    }

    #[test]
    fn test_custom_separator() {
        let charset = Charset::new(["alpha", "bravo"]).unwrap().with_separator("-");
        let generator =
            CharsetGenerator::new(HashAlgorithm::Md5, charset, SharedRng::from_seed([0; SEED_LEN]));
        let password = generator.get_password("n", "u", "", "p", 3).unwrap();
        assert_eq!(password.split('-').count(), 3);
    }

    #[test]
    fn test_entropy_for_94_symbols() {
        let generator = generator(0);
        assert_eq!(generator.charset().len(), 94);
        assert!((generator.get_entropy(16) - 104.873421627).abs() < 1e-6);
        assert_eq!(generator.get_minimum_length(104.87), 16);
    }

    #[test]
    fn test_entropy_length_inversion() {
        let generator = generator(0);
        for length in 1..=156 {
            let entropy = generator.get_entropy(length);
            assert!((generator.get_length(entropy) - length as f64).abs() < 1e-9);
            assert_eq!(generator.get_minimum_length(entropy), length);
        }
        assert_eq!(generator.get_minimum_length(0.0), 1);
    }

    #[test]
    fn test_password_is_deterministic() {
        let a = generator(1)
            .get_password("name", "username", "nonce", "passphrase", 15)
            .unwrap();
        let b = generator(2)
            .get_password("name", "username", "nonce", "passphrase", 15)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.chars().count(), 15);

        let other = generator(1)
            .get_password("name", "username", "nonce", "other", 15)
            .unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_password_does_not_disturb_random_sequence() {
        let reference = generator(42).get_random_password(15).unwrap();

        let generator = generator(42);
        generator
            .get_password("name", "username", "nonce", "passphrase", 15)
            .unwrap();
        assert_eq!(generator.get_random_password(15).unwrap(), reference);
    }

    #[test]
    fn test_random_passwords_differ() {
        let generator = generator(42);
        let first = generator.get_random_password(20).unwrap();
        let second = generator.get_random_password(20).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_word_password_is_space_separated() {
        let charset = Charset::new(["alpha", "bravo", "charlie", "delta"]).unwrap();
        let generator =
            CharsetGenerator::new(HashAlgorithm::Sha256, charset, SharedRng::from_seed([0; SEED_LEN]));
        let password = generator.get_password("n", "u", "", "p", 5).unwrap();
        assert_eq!(password.split(' ').count(), 5);
    }

    #[test]
    fn test_zero_length_is_rejected() {
        let err = generator(0).get_password("n", "u", "", "p", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidLength(0)));
    }
}
