//! Reviewer selection
//!
//! Reviewers are drawn from the active members of the author's team. When
//! more candidates exist than the cap allows, a uniformly random subset is
//! chosen by shuffling the pool and truncating it. The random source is
//! owned by a [`ReviewerSelector`] so callers can seed it for deterministic
//! tests.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::domain::Member;

/// Choose up to `cap` reviewers from `candidates`, never including `excluding`.
///
/// If the pool fits under the cap it is returned whole; order carries no
/// meaning. An empty pool yields an empty result.
pub fn select_reviewers<R: Rng + ?Sized>(
    candidates: &[Member],
    excluding: &str,
    cap: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pool: Vec<String> = candidates
        .iter()
        .filter(|m| m.id != excluding && seen.insert(m.id.as_str()))
        .map(|m| m.id.clone())
        .collect();

    if pool.len() <= cap {
        return pool;
    }

    pool.shuffle(rng);
    pool.truncate(cap);
    pool
}

/// Pick one replacement uniformly from `pool`
pub fn pick_replacement<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Option<String> {
    pool.choose(rng).cloned()
}

/// Injectable source of randomness for reviewer selection
pub struct ReviewerSelector {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ReviewerSelector {
    /// Use the given random number generator
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Seed from operating system entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic selector for tests and reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn select(&self, candidates: &[Member], excluding: &str, cap: usize) -> Vec<String> {
        self.with_rng(|rng| select_reviewers(candidates, excluding, cap, rng))
    }

    pub fn pick(&self, pool: &[String]) -> Option<String> {
        self.with_rng(|rng| pick_replacement(pool, rng))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut (dyn RngCore + Send)) -> T) -> T {
        // A panic while shuffling cannot leave the generator in a bad state
        let mut guard = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **guard)
    }
}

impl Default for ReviewerSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for ReviewerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewerSelector").finish_non_exhaustive()
    }
}
