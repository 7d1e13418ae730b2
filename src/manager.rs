use std::collections::{BTreeMap, BTreeSet};

use crate::entry::{EntryName, KeywordFilter, PasswordEntry};
use crate::error::{Error, Result};
use crate::generator::GeneratorManager;

/// Which entries a bulk operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Tag(String),
    /// Entries matching every keyword.
    Keywords(Vec<String>),
}

/// Name-keyed collection of password entries with a tag index.
///
/// The tag index is derived data: it is rebuilt from the entries after every
/// mutation and never patched in place.
#[derive(Debug)]
pub struct PasswordManager {
    generators: GeneratorManager,
    entries: BTreeMap<EntryName, PasswordEntry>,
    tags: BTreeMap<String, BTreeSet<EntryName>>,
}

impl PasswordManager {
    pub fn new(generators: GeneratorManager) -> Self {
        Self {
            generators,
            entries: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Builds a manager from loaded entries; later duplicates win.
    pub fn from_entries(
        generators: GeneratorManager,
        entries: impl IntoIterator<Item = PasswordEntry>,
    ) -> Self {
        let mut manager = Self::new(generators);
        for entry in entries {
            manager.entries.insert(entry.key().clone(), entry);
        }
        manager.compute_tags();
        manager
    }

    pub fn generators(&self) -> &GeneratorManager {
        &self.generators
    }

    pub fn generators_mut(&mut self) -> &mut GeneratorManager {
        &mut self.generators
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries ordered by name, for handing to a storage backend.
    pub fn entries(&self) -> impl Iterator<Item = &PasswordEntry> {
        self.entries.values()
    }

    pub fn get_entry(&self, name: &str) -> Option<&PasswordEntry> {
        self.entries.get(name)
    }

    /// Inserts or replaces the entry with the same name.
    ///
    /// Returns the replaced entry, if any.
    pub fn set_entry(&mut self, entry: PasswordEntry) -> Option<PasswordEntry> {
        log::debug!("Setting entry: {}", entry.name());
        let previous = self.entries.insert(entry.key().clone(), entry);
        self.compute_tags();
        previous
    }

    pub fn remove_entry(&mut self, name: &str) -> Result<PasswordEntry> {
        let removed = self
            .entries
            .remove(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        log::debug!("Removed entry: {}", name);
        self.compute_tags();
        Ok(removed)
    }

    /// All entries, or only those carrying `tag`.
    pub fn get_entries(&self, tag: Option<&str>) -> Vec<&PasswordEntry> {
        match tag {
            None => self.entries.values().collect(),
            Some(tag) => self
                .entries
                .values()
                .filter(|e| e.tags.contains(tag))
                .collect(),
        }
    }

    /// Entries matching every keyword (case-insensitive regular expressions).
    pub fn filter<I, S>(&self, keywords: I) -> Result<Vec<&PasswordEntry>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filter = KeywordFilter::new(keywords)?;
        Ok(self.entries.values().filter(|e| e.matches(&filter)).collect())
    }

    pub fn add_tag(&mut self, name: &str, tag: &str) -> Result<()> {
        self.entry_mut(name)?.tags.insert(tag.to_string());
        self.compute_tags();
        Ok(())
    }

    pub fn remove_tag(&mut self, name: &str, tag: &str) -> Result<()> {
        self.entry_mut(name)?.tags.remove(tag);
        self.compute_tags();
        Ok(())
    }

    /// Replaces the whole tag set of an entry.
    pub fn set_entry_tags<I, S>(&mut self, name: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry_mut(name)?.tags = tags.into_iter().map(Into::into).collect();
        self.compute_tags();
        Ok(())
    }

    /// Tags referenced by at least one entry, in sorted order.
    pub fn get_tags(&self) -> Vec<&str> {
        self.tags.keys().map(String::as_str).collect()
    }

    /// Names of the entries carrying `tag`, from the index.
    pub fn tagged(&self, tag: &str) -> Option<&BTreeSet<EntryName>> {
        self.tags.get(tag)
    }

    pub fn select(&self, selection: &Selection) -> Result<Vec<&PasswordEntry>> {
        match selection {
            Selection::All => Ok(self.get_entries(None)),
            Selection::Tag(tag) => Ok(self.get_entries(Some(tag.as_str()))),
            Selection::Keywords(keywords) => self.filter(keywords),
        }
    }

    /// Removes every selected entry and returns them.
    pub fn remove_selected(&mut self, selection: &Selection) -> Result<Vec<PasswordEntry>> {
        let names = self.selected_names(selection)?;
        let removed: Vec<PasswordEntry> = names
            .iter()
            .filter_map(|name| self.entries.remove(name))
            .collect();
        log::debug!("Removed {} selected entries", removed.len());
        self.compute_tags();
        Ok(removed)
    }

    /// Adds `tag` to every selected entry; returns how many were selected.
    pub fn add_tag_selected(&mut self, selection: &Selection, tag: &str) -> Result<usize> {
        let names = self.selected_names(selection)?;
        for name in &names {
            if let Some(entry) = self.entries.get_mut(name) {
                entry.tags.insert(tag.to_string());
            }
        }
        self.compute_tags();
        Ok(names.len())
    }

    /// Removes `tag` from every selected entry; returns how many were selected.
    pub fn remove_tag_selected(&mut self, selection: &Selection, tag: &str) -> Result<usize> {
        let names = self.selected_names(selection)?;
        for name in &names {
            if let Some(entry) = self.entries.get_mut(name) {
                entry.tags.remove(tag);
            }
        }
        self.compute_tags();
        Ok(names.len())
    }

    /// Recomputes the password of entry `name`.
    pub fn get_password(&mut self, name: &str, passphrase: &str) -> Result<String> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        entry.get_password(&mut self.generators, passphrase)
    }

    pub fn get_entropy(&mut self, name: &str) -> Result<f64> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        entry.get_entropy(&mut self.generators)
    }

    /// Generates a random password with `generator_id`.
    ///
    /// With a target entropy the length is raised to the minimum that
    /// provides it. Returns the password and its entropy.
    pub fn generate(
        &mut self,
        generator_id: &str,
        length: usize,
        entropy: Option<f64>,
    ) -> Result<(String, f64)> {
        let generator = self.generators.get_generator(generator_id)?;
        let length = match entropy {
            Some(entropy) => generator.get_minimum_length(entropy)?.max(length),
            None => length,
        };
        let password = generator.get_random_password(length)?;
        Ok((password, generator.get_entropy(length)?))
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut PasswordEntry> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }

    fn selected_names(&self, selection: &Selection) -> Result<Vec<EntryName>> {
        Ok(self
            .select(selection)?
            .into_iter()
            .map(|e| e.key().clone())
            .collect())
    }

    fn compute_tags(&mut self) {
        self.tags.clear();
        for entry in self.entries.values() {
            for tag in &entry.tags {
                self.tags
                    .entry(tag.clone())
                    .or_default()
                    .insert(entry.key().clone());
            }
        }
        log::debug!("Tag index rebuilt: {} tags", self.tags.len());
    }
}
