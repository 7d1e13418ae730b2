//! Builds diceware word lists from a text corpus.
//!
//! The resulting file is a charset usable as `<algo>:<file>` by the
//! generator manager.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::logging::timed;

/// Number of words in a classic diceware list (6^5).
pub const DEFAULT_MAX_WORDS: usize = 7776;

/// ASCII symbols plus any Unicode punctuation or numeric character.
const SEPARATOR_PATTERN: &str = r"[[:punct:]\p{P}\p{N}]";

static SEPARATORS: OnceLock<Regex> = OnceLock::new();

fn separators() -> Result<&'static Regex> {
    if let Some(re) = SEPARATORS.get() {
        return Ok(re);
    }
    let re = Regex::new(SEPARATOR_PATTERN).map_err(|source| Error::InvalidPattern {
        pattern: SEPARATOR_PATTERN.to_string(),
        source,
    })?;
    Ok(SEPARATORS.get_or_init(|| re))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DicewareBuilder {
    pub max_words: usize,
    pub min_word_length: usize,
}

impl Default for DicewareBuilder {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            min_word_length: 1,
        }
    }
}

impl DicewareBuilder {
    pub fn new(max_words: usize, min_word_length: usize) -> Self {
        Self {
            max_words,
            min_word_length,
        }
    }

    /// Lowercases the text and turns punctuation and digits into spaces.
    ///
    /// Contractions split in two: `can't` and `can’t` become `can t`.
    pub fn normalize(text: &str) -> Result<String> {
        let lowered = text.to_lowercase();
        Ok(separators()?.replace_all(&lowered, " ").into_owned())
    }

    /// Counts whitespace-separated words of already normalized text.
    pub fn word_counts(text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for word in text.split_whitespace() {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Selects the most frequent words that are long enough, then orders
    /// the selection by ascending length.
    ///
    /// Ties in frequency, and then in length, are broken alphabetically.
    pub fn select(&self, counts: &HashMap<String, usize>) -> Vec<String> {
        let mut words: Vec<(&String, usize)> = counts
            .iter()
            .filter(|(word, _)| word.chars().count() >= self.min_word_length)
            .map(|(word, count)| (word, *count))
            .collect();
        words.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
        words.truncate(self.max_words);

        let mut selected: Vec<String> = words.into_iter().map(|(w, _)| w.clone()).collect();
        // Stable: equal lengths keep their frequency order.
        selected.sort_by_key(|w| w.chars().count());
        selected
    }

    /// Runs the whole pipeline on corpus text.
    pub fn build_from_text(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.select(&Self::word_counts(&Self::normalize(text)?)))
    }

    /// Reads `corpus`, writes the word list to `output` and returns it.
    pub fn build(&self, corpus: &Path, output: &Path) -> Result<Vec<String>> {
        let text = fs::read_to_string(corpus)?;
        let words = timed("diceware selection", || self.build_from_text(&text))?;
        Self::write(&words, output)?;
        log::info!(
            "Wrote {} words from {} to {}",
            words.len(),
            corpus.display(),
            output.display()
        );
        Ok(words)
    }

    /// Writes one word per line.
    pub fn write(words: &[String], output: &Path) -> Result<()> {
        let mut contents = words.join("\n");
        contents.push('\n');
        fs::write(output, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> HashMap<String, usize> {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    #[test]
    fn test_normalize_splits_contractions() {
        assert_eq!(DicewareBuilder::normalize("Can't stop!").unwrap(), "can t stop ");
        assert_eq!(DicewareBuilder::normalize("R2D2, go.").unwrap(), "r d   go ");
        assert_eq!(DicewareBuilder::normalize("a+b=c $5").unwrap(), "a b c   ");
    }

    #[test]
    fn test_normalize_unicode_punctuation() {
        assert_eq!(
            DicewareBuilder::normalize("Can’t “stop”—now").unwrap(),
            "can t  stop  now"
        );
        assert_eq!(
            DicewareBuilder::new(10, 2)
                .build_from_text("Can’t “stop”—now, can’t…")
                .unwrap(),
            ["can", "now", "stop"]
        );
    }

    #[test]
    fn test_word_counts() {
        let counts = DicewareBuilder::word_counts("the cat the  hat\nthe");
        assert_eq!(counts.get("the"), Some(&3));
        assert_eq!(counts.get("cat"), Some(&1));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_select_by_frequency_then_length() {
        let counts = counts(&[("the", 5), ("cat", 3), ("sat", 3), ("ab", 9)]);
        let builder = DicewareBuilder::new(3, 3);
        assert_eq!(builder.select(&counts), ["the", "cat", "sat"]);
    }

    #[test]
    fn test_select_orders_by_length() {
        let counts = counts(&[("elephant", 10), ("dog", 4), ("a", 20), ("bird", 7)]);
        let builder = DicewareBuilder::new(3, 2);
        assert_eq!(builder.select(&counts), ["dog", "bird", "elephant"]);
    }

    #[test]
    fn test_select_respects_max_words() {
        let counts = counts(&[("one", 1), ("two", 2), ("three", 3)]);
        assert_eq!(DicewareBuilder::new(10, 1).select(&counts).len(), 3);
        assert_eq!(DicewareBuilder::new(1, 1).select(&counts), ["three"]);
        assert!(DicewareBuilder::new(0, 1).select(&counts).is_empty());
    }

    #[test]
    fn test_default_builder() {
        let builder = DicewareBuilder::default();
        assert_eq!(builder.max_words, 7776);
        assert_eq!(builder.min_word_length, 1);
    }
}
