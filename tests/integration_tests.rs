//! Integration tests for passman.
//!
//! These tests exercise the full flow: corpus to word list, charset files to
//! generators, entries to passwords, and collections through storage.

use std::fs;
use std::sync::Arc;

use passman::rng::{SEED_LEN, SharedRng};
use passman::{
    DicewareBuilder, EncryptedLoader, Error, GeneratorManager, Loader, PasswordEntry,
    PasswordManager, PlainLoader, Selection,
};
use tempfile::TempDir;

/// Creates a symbols directory holding the 94 printable ASCII characters.
fn setup_symbols() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let symbols: Vec<String> = (33u8..127).map(|b| (b as char).to_string()).collect();
    fs::write(temp_dir.path().join("default"), symbols.join("\n")).unwrap();
    temp_dir
}

fn generators(temp_dir: &TempDir, seed: u8) -> GeneratorManager {
    GeneratorManager::with_rng(temp_dir.path(), SharedRng::from_seed([seed; SEED_LEN]))
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_password_survives_restart() {
    let temp_dir = setup_symbols();

    let first = {
        let mut generators = generators(&temp_dir, 1);
        let mut entry = PasswordEntry::new("sha512:default", "github", "octocat").with_nonce("1");
        entry.get_password(&mut generators, "correct horse").unwrap()
    };

    // A new manager with a different random state reproduces the password.
    let mut generators = GeneratorManager::new(temp_dir.path()).unwrap();
    let mut entry = PasswordEntry::new("sha512:default", "github", "octocat").with_nonce("1");
    assert_eq!(
        entry.get_password(&mut generators, "correct horse").unwrap(),
        first
    );
}

#[test]
fn test_every_identifier_changes_the_password() {
    let temp_dir = setup_symbols();
    let mut generators = generators(&temp_dir, 0);
    let generator = generators.get_generator("sha512:default").unwrap();

    let base = generator.get_password("name", "user", "nonce", "pass", 20).unwrap();
    for variant in [
        generator.get_password("other", "user", "nonce", "pass", 20),
        generator.get_password("name", "other", "nonce", "pass", 20),
        generator.get_password("name", "user", "other", "pass", 20),
        generator.get_password("name", "user", "nonce", "other", 20),
    ] {
        assert_ne!(variant.unwrap(), base);
    }

    let sha256 = generators.get_generator("sha256:default").unwrap();
    assert_ne!(
        sha256.get_password("name", "user", "nonce", "pass", 20).unwrap(),
        base
    );
}

#[test]
fn test_interleaved_random_and_deterministic_calls() {
    let temp_dir = setup_symbols();

    let mut reference = generators(&temp_dir, 9);
    let reference = reference.get_generator("sha512:default").unwrap();
    let expected_random: Vec<String> = (0..3)
        .map(|_| reference.get_random_password(12).unwrap())
        .collect();

    let mut generators = generators(&temp_dir, 9);
    let charset = generators.get_generator("sha512:default").unwrap();
    let oplop = generators.get_generator("oplop").unwrap();
    let expected_password = charset.get_password("n", "u", "", "p", 12).unwrap();

    let mut random = Vec::new();
    for _ in 0..3 {
        assert_eq!(
            charset.get_password("n", "u", "", "p", 12).unwrap(),
            expected_password
        );
        oplop.get_password("n", "u", "", "p", 12).unwrap();
        random.push(charset.get_random_password(12).unwrap());
    }

    assert_eq!(random, expected_random);
    assert_ne!(random[0], random[1]);
}

// ============================================================================
// Generator resolution
// ============================================================================

#[test]
fn test_cache_and_reserved_generators() {
    let temp_dir = setup_symbols();
    let mut generators = generators(&temp_dir, 0);

    let a = generators.get_generator("sha1:default").unwrap();
    let b = generators.get_generator("sha1:default").unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let oplop = generators.get_generator("oplop").unwrap();
    assert_eq!(
        oplop.get_password("", "username", "", "passphrase", 8).unwrap(),
        "6rWI_aOE"
    );

    let stub = generators.get_generator("passwordcomposer").unwrap();
    assert!(matches!(
        stub.get_password("", "username", "", "passphrase", 8),
        Err(Error::NotImplemented(_))
    ));

    assert!(matches!(
        generators.get_generator("unknown"),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        generators.get_generator("blake9:default"),
        Err(Error::UnsupportedAlgorithm(_))
    ));
}

// ============================================================================
// Diceware
// ============================================================================

#[test]
fn test_diceware_list_feeds_a_generator() {
    let temp_dir = setup_symbols();
    let corpus = temp_dir.path().join("corpus.txt");
    fs::write(
        &corpus,
        "The cat sat on the mat. The cat can't stop; the dog sat too!\n\
         In 1999 the dog ran, the cat sat again.",
    )
    .unwrap();

    let output = temp_dir.path().join("diceware_test");
    let words = DicewareBuilder::new(4, 3).build(&corpus, &output).unwrap();
    assert_eq!(words, ["the", "cat", "sat", "dog"]);
    assert_eq!(fs::read_to_string(&output).unwrap(), "the\ncat\nsat\ndog\n");

    let mut generators = generators(&temp_dir, 0);
    let generator = generators.get_generator("sha512:diceware_test").unwrap();
    assert!((generator.get_entropy(3).unwrap() - 6.0).abs() < 1e-9);

    let passphrase = generator.get_password("name", "user", "", "secret", 5).unwrap();
    let drawn: Vec<&str> = passphrase.split(' ').collect();
    assert_eq!(drawn.len(), 5);
    assert!(drawn.iter().all(|w| words.iter().any(|x| x == w)));
}

#[test]
fn test_diceware_missing_corpus() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = DicewareBuilder::default().build(
        &temp_dir.path().join("missing.txt"),
        &temp_dir.path().join("out"),
    );
    assert!(matches!(result, Err(Error::Io(_))));
}

// ============================================================================
// Collection and storage
// ============================================================================

fn populated_manager(temp_dir: &TempDir) -> PasswordManager {
    let mut manager = PasswordManager::new(generators(temp_dir, 0));
    manager.set_entry(
        PasswordEntry::new("sha512:default", "github", "octocat")
            .with_comment("Work account")
            .with_entropy(80.0)
            .with_tags(["work", "dev"]),
    );
    manager.set_entry(
        PasswordEntry::new("oplop", "mail", "me@example.com").with_tags(["personal"]),
    );
    manager
}

#[test]
fn test_manager_workflow() {
    let temp_dir = setup_symbols();
    let mut manager = populated_manager(&temp_dir);

    assert_eq!(manager.get_tags(), ["dev", "personal", "work"]);
    let work: Vec<&str> = manager
        .filter(["work"])
        .unwrap()
        .into_iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(work, ["github"]);

    let password = manager.get_password("github", "master").unwrap();
    assert_eq!(password.chars().count(), 15);
    assert_eq!(manager.get_entry("github").unwrap().entropy(), None);
    assert_eq!(manager.get_entry("github").unwrap().length(), 15);

    manager.remove_selected(&Selection::Tag("personal".to_string())).unwrap();
    assert_eq!(manager.get_tags(), ["dev", "work"]);
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_entries_round_trip_through_storage() {
    let temp_dir = setup_symbols();
    let mut manager = populated_manager(&temp_dir);
    let before = manager.get_password("github", "master").unwrap();
    let entries: Vec<PasswordEntry> = manager.entries().cloned().collect();

    let plain = temp_dir.path().join("db.json");
    PlainLoader.save(&entries, &plain, None).unwrap();
    let sealed = temp_dir.path().join("db.enc");
    EncryptedLoader.save(&entries, &sealed, Some("db secret")).unwrap();

    for loaded in [
        PlainLoader.load(&plain, None).unwrap(),
        EncryptedLoader.load(&sealed, Some("db secret")).unwrap(),
    ] {
        let mut restored = PasswordManager::from_entries(generators(&temp_dir, 5), loaded);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get_tags(), ["dev", "personal", "work"]);
        assert_eq!(restored.get_password("github", "master").unwrap(), before);
    }

    let stored = fs::read_to_string(&plain).unwrap();
    assert!(!stored.contains(&before));
}
