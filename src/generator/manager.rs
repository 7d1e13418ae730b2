//! Resolution of generator identifiers to generator instances.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::rng::SharedRng;

use super::{
    Charset, CharsetGenerator, OPLOP, OplopGenerator, PASSWORDCOMPOSER, PasswordGenerator,
    SUPERGENPASS,
};

/// Resolves `<algo>:<charset>` identifiers and the reserved keywords.
///
/// Charset files are read from `symbols_dir` on first request only; later
/// requests for the same identifier return the cached instance.
#[derive(Debug)]
pub struct GeneratorManager {
    symbols_dir: PathBuf,
    rng: SharedRng,
    cache: HashMap<String, Arc<PasswordGenerator>>,
}

impl GeneratorManager {
    /// Creates a manager whose shared sequence is seeded by the OS.
    pub fn new(symbols_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_rng(symbols_dir, SharedRng::from_os_entropy()?))
    }

    pub fn with_rng(symbols_dir: impl Into<PathBuf>, rng: SharedRng) -> Self {
        let mut cache = HashMap::new();
        cache.insert(
            OPLOP.to_string(),
            Arc::new(PasswordGenerator::Oplop(OplopGenerator::new(rng.clone()))),
        );
        cache.insert(
            SUPERGENPASS.to_string(),
            Arc::new(PasswordGenerator::SuperGenPass),
        );
        cache.insert(
            PASSWORDCOMPOSER.to_string(),
            Arc::new(PasswordGenerator::PasswordComposer),
        );

        Self {
            symbols_dir: symbols_dir.into(),
            rng,
            cache,
        }
    }

    pub fn symbols_dir(&self) -> &Path {
        &self.symbols_dir
    }

    pub fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Returns the generator for `id`, loading its charset on first use.
    ///
    /// Failures are not cached.
    pub fn get_generator(&mut self, id: &str) -> Result<Arc<PasswordGenerator>> {
        if let Some(generator) = self.cache.get(id) {
            return Ok(Arc::clone(generator));
        }

        let (algorithm, charset_name) = parse_charset_id(id)?;
        let path = self.symbols_dir.join(charset_name);
        log::debug!("Loading charset for '{}' from {}", id, path.display());

        let charset = Charset::from_file(&path)?;
        log::debug!("Loaded {} symbols for '{}'", charset.len(), id);

        let generator = Arc::new(PasswordGenerator::Charset(CharsetGenerator::new(
            algorithm,
            charset,
            self.rng.clone(),
        )));
        self.cache.insert(id.to_string(), Arc::clone(&generator));
        Ok(generator)
    }

    /// Identifiers resolved so far, reserved keywords included.
    pub fn cached_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Splits `<algo>:<charset>` and validates both halves.
fn parse_charset_id(id: &str) -> Result<(HashAlgorithm, &str)> {
    let (algo, name) = id
        .split_once(':')
        .ok_or_else(|| Error::Configuration(format!("unknown generator identifier '{}'", id)))?;

    if algo.is_empty() || name.is_empty() {
        return Err(Error::Configuration(format!(
            "generator identifier '{}' must look like <algo>:<charset>",
            id
        )));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::Configuration(format!(
            "charset name '{}' must be a plain file name",
            name
        )));
    }

    Ok((algo.parse()?, name))
}

/// Class used to pick a default length: `diceware` for word-list charsets.
pub fn generator_class(id: &str) -> &'static str {
    match id.split_once(':') {
        Some((_, name)) if name.starts_with("diceware") => "diceware",
        _ => "normal",
    }
}
