use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::GeneratorManager;
use crate::generator::manager::generator_class;

/// Settings the core needs from its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub symbols_dir: PathBuf,
    pub default_generator: String,
    /// Keyed by generator identifier or by class (`normal`, `diceware`).
    pub default_password_length: BTreeMap<String, usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let base = dirs_next::home_dir()
            .map(|home| home.join(".passman"))
            .unwrap_or_else(|| PathBuf::from(".passman"));

        let mut default_password_length = BTreeMap::new();
        default_password_length.insert("normal".to_string(), 15);
        default_password_length.insert("diceware".to_string(), 6);
        default_password_length.insert("oplop".to_string(), 8);

        Self {
            symbols_dir: base.join("symbols"),
            default_generator: "sha512:default".to_string(),
            default_password_length,
        }
    }
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        dirs_next::home_dir()
            .map(|home| home.join(".passman").join("config.json"))
            .ok_or_else(|| Error::Configuration("could not determine home directory".to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Default length for `generator_id`: its own key first, then its class.
    pub fn default_length_for(&self, generator_id: &str) -> Result<usize> {
        let class = generator_class(generator_id);
        self.default_password_length
            .get(generator_id)
            .or_else(|| self.default_password_length.get(class))
            .copied()
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no default password length for '{}' or class '{}'",
                    generator_id, class
                ))
            })
    }

    pub fn generator_manager(&self) -> Result<GeneratorManager> {
        GeneratorManager::new(&self.symbols_dir)
    }
}
