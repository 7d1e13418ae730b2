//! Password entries: everything needed to recompute a password except the
//! passphrase.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{GeneratorManager, PasswordGenerator};

pub const DEFAULT_LENGTH: usize = 15;

/// Primary key of an entry. Two entries are the same entry iff their names
/// are equal, whatever their other attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryName(String);

impl EntryName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordEntry {
    name: EntryName,
    pub username: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub nonce: String,
    pub generator: String,
    length: usize,
    /// Target entropy not yet folded into `length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entropy: Option<f64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl PasswordEntry {
    pub fn new(
        generator: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            name: EntryName::new(name),
            username: username.into(),
            comment: String::new(),
            nonce: String::new(),
            generator: generator.into(),
            length: DEFAULT_LENGTH,
            entropy: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = nonce.into();
        self
    }

    /// Sets the length; zero is raised to one.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length.max(1);
        self
    }

    /// Sets a target entropy, resolved into a length on first use.
    pub fn with_entropy(mut self, entropy: f64) -> Self {
        self.entropy = Some(entropy);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn key(&self) -> &EntryName {
        &self.name
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Target entropy still pending resolution, if any.
    pub fn entropy(&self) -> Option<f64> {
        self.entropy
    }

    /// True when both values describe the same entry.
    pub fn same_entry(&self, other: &PasswordEntry) -> bool {
        self.name == other.name
    }

    /// Length the entry will use with `generator`, without recording it.
    pub fn pending_length(&self, generator: &PasswordGenerator) -> Result<usize> {
        match self.entropy {
            Some(entropy) => Ok(generator.get_minimum_length(entropy)?.max(self.length)),
            None => Ok(self.length),
        }
    }

    /// Folds a pending target entropy into `length` and clears it.
    ///
    /// Once resolved the length is the durable state; later calls are no-ops.
    pub fn resolve_length(&mut self, generator: &PasswordGenerator) -> Result<usize> {
        let length = self.pending_length(generator)?;
        self.length = length;
        self.entropy = None;
        Ok(length)
    }

    /// Recomputes the password of this entry.
    ///
    /// A pending target entropy is resolved into the length only once the
    /// password has been derived successfully.
    pub fn get_password(
        &mut self,
        generators: &mut GeneratorManager,
        passphrase: &str,
    ) -> Result<String> {
        let generator = generators.get_generator(&self.generator)?;
        let length = self.pending_length(&generator)?;
        let password = generator.get_password(
            self.name.as_str(),
            &self.username,
            &self.nonce,
            passphrase,
            length,
        )?;
        self.resolve_length(&generator)?;
        Ok(password)
    }

    /// Entropy of the password: at least what the current length provides.
    pub fn get_entropy(&self, generators: &mut GeneratorManager) -> Result<f64> {
        let generator = generators.get_generator(&self.generator)?;
        let entropy = generator.get_entropy(self.length)?;
        Ok(entropy.max(self.entropy.unwrap_or(0.0)))
    }

    /// True iff every keyword matches the name, username, nonce, comment or a tag.
    pub fn matches(&self, keywords: &KeywordFilter) -> bool {
        keywords.is_match(self)
    }

    fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.name.as_str(),
            self.username.as_str(),
            self.nonce.as_str(),
            self.comment.as_str(),
        ]
        .into_iter()
        .chain(self.tags.iter().map(String::as_str))
    }
}

impl fmt::Display for PasswordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.generator, self.username)?;
        if !self.nonce.is_empty() {
            write!(f, " ({})", self.nonce)?;
        }
        if !self.comment.is_empty() {
            write!(f, " ({})", self.comment)?;
        }
        write!(f, " {}", self.length)
    }
}

/// Compiled keyword list: case-insensitive regular expressions, all of
/// which must match somewhere in an entry.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    patterns: Vec<Regex>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = keywords
            .into_iter()
            .map(|keyword| {
                let keyword = keyword.as_ref();
                RegexBuilder::new(keyword)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| Error::InvalidPattern {
                        pattern: keyword.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_match(&self, entry: &PasswordEntry) -> bool {
        self.patterns
            .iter()
            .all(|pattern| entry.searchable_fields().any(|field| pattern.is_match(field)))
    }
}
