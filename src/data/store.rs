//! Published dataset snapshot and load generations
//!
//! Every load takes a [`LoadToken`] from the store. Starting a newer load bumps
//! the generation, which turns every older token stale: stale ingestors stop at
//! their next chunk boundary and their results are refused by [`SeriesStore::publish`].

use super::Dataset;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one load attempt
#[derive(Debug, Clone)]
pub struct LoadToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl LoadToken {
    /// A token with no store behind it; it never goes stale
    pub fn detached() -> Self {
        Self {
            generation: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

/// Owns the most recently completed dataset
#[derive(Debug, Default)]
pub struct SeriesStore {
    latest: Arc<AtomicU64>,
    current: Option<Arc<Dataset>>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, invalidating all outstanding tokens
    pub fn begin_load(&mut self) -> LoadToken {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        LoadToken {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Install `dataset` if `token` still belongs to the latest load.
    ///
    /// Returns false, leaving the current snapshot untouched, for stale tokens
    /// or tokens issued by another store.
    pub fn publish(&mut self, token: &LoadToken, dataset: Arc<Dataset>) -> bool {
        if !Arc::ptr_eq(&token.latest, &self.latest) || !token.is_current() {
            tracing::warn!(
                "Discarding stale dataset from load #{} (latest is #{})",
                token.generation,
                self.latest.load(Ordering::Acquire)
            );
            return false;
        }
        tracing::info!(
            "Published load #{}: {} rows",
            token.generation,
            dataset.metadata().row_count
        );
        self.current = Some(dataset);
        true
    }

    pub fn current(&self) -> Option<&Arc<Dataset>> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}
