//! The pseudo-random sequence shared by every generator of a manager.
//!
//! Deterministic derivation temporarily reseeds the sequence and puts the
//! previous state back when it is done, so random generation never observes
//! a reseed and deterministic output never depends on earlier random draws.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;

use crate::error::{Error, Result};

/// Seed width of the underlying ChaCha20 generator.
pub const SEED_LEN: usize = 32;

/// Handle to a shared ChaCha20 sequence. Clones refer to the same state.
#[derive(Clone, Debug)]
pub struct SharedRng {
    inner: Arc<Mutex<ChaCha20Rng>>,
}

impl SharedRng {
    /// Creates a sequence seeded from the operating system entropy source.
    pub fn from_os_entropy() -> Result<Self> {
        let mut seed = [0u8; SEED_LEN];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        Ok(Self::from_seed(seed))
    }

    /// Creates a sequence from a fixed seed.
    pub fn from_seed(seed: [u8; SEED_LEN]) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChaCha20Rng::from_seed(seed))),
        }
    }

    /// Runs `f` against the current state of the sequence.
    pub fn with_current<T>(&self, f: impl FnOnce(&mut ChaCha20Rng) -> T) -> T {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Runs `f` against the sequence reseeded with `seed`.
    ///
    /// The state held before the call is restored when `f` returns, including
    /// when it panics.
    pub fn with_reseeded<T>(
        &self,
        seed: [u8; SEED_LEN],
        f: impl FnOnce(&mut ChaCha20Rng) -> T,
    ) -> T {
        let mut guard = self.lock();
        let saved = std::mem::replace(&mut *guard, ChaCha20Rng::from_seed(seed));
        let mut scope = RestoreOnDrop {
            guard,
            saved: Some(saved),
        };
        f(&mut *scope)
    }

    fn lock(&self) -> MutexGuard<'_, ChaCha20Rng> {
        // A panic inside `with_reseeded` has already restored the state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct RestoreOnDrop<'a> {
    guard: MutexGuard<'a, ChaCha20Rng>,
    saved: Option<ChaCha20Rng>,
}

impl Deref for RestoreOnDrop<'_> {
    type Target = ChaCha20Rng;

    fn deref(&self) -> &ChaCha20Rng {
        &self.guard
    }
}

impl DerefMut for RestoreOnDrop<'_> {
    fn deref_mut(&mut self) -> &mut ChaCha20Rng {
        &mut self.guard
    }
}

impl Drop for RestoreOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.guard = saved;
        }
    }
}

/// Folds an arbitrary-length digest into a ChaCha20 seed.
///
/// Every digest byte contributes; digests shorter than the seed repeat.
pub fn seed_from_digest(digest: &[u8]) -> [u8; SEED_LEN] {
    let mut seed = [0u8; SEED_LEN];
    if digest.is_empty() {
        return seed;
    }
    let rounds = SEED_LEN.max(digest.len());
    for i in 0..rounds {
        seed[i % SEED_LEN] ^= digest[i % digest.len()];
    }
    seed
}
