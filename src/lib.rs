//! Passman - a password manager that never stores passwords.
//!
//! Each password is recomputed on demand from a master passphrase and a few
//! stable entry identifiers. This library provides the generators, the
//! identifier cache, the entry collection and the diceware list builder,
//! plus storage and configuration collaborators.

pub mod config;
pub mod crypto;
pub mod diceware;
pub mod entry;
pub mod error;
pub mod generator;
pub mod hash;
pub mod logging;
pub mod manager;
pub mod rng;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use diceware::DicewareBuilder;
pub use entry::{EntryName, KeywordFilter, PasswordEntry};
pub use error::{Error, Result};
pub use generator::{GeneratorManager, PasswordGenerator};
pub use logging::{LogConfig, init_logging};
pub use manager::{PasswordManager, Selection};
pub use storage::{EncryptedLoader, Loader, PlainLoader};
