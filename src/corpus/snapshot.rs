//! Immutable corpus snapshots and atomic reload

use super::{load_index, SegmentStore};
use crate::config::{Config, ConfigValidator, RankingConfig};
use crate::embedding::{load_embeddings, EmbeddingMatrix};
use crate::error::Result;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Everything a query reads: segments, their embeddings and the ranking tunables
#[derive(Debug, Clone)]
pub struct Snapshot {
    store: SegmentStore,
    embeddings: Option<EmbeddingMatrix>,
    ranking: RankingConfig,
}

impl Snapshot {
    /// Assemble a snapshot, discarding embeddings that do not match the store
    pub fn new(
        store: SegmentStore,
        embeddings: Option<EmbeddingMatrix>,
        ranking: RankingConfig,
    ) -> Self {
        let embeddings = embeddings.filter(|matrix| {
            let aligned = matrix.len() == store.len();
            if !aligned {
                warn!(
                    "Discarding embeddings: {} rows for {} segments",
                    matrix.len(),
                    store.len()
                );
            }
            aligned
        });

        Self {
            store,
            embeddings,
            ranking,
        }
    }

    /// Load the corpus and embeddings named by `config`
    ///
    /// Missing or mismatched embeddings degrade to keyword-only; an invalid
    /// configuration or an unreadable index is an error so a bad reload never
    /// replaces a good snapshot.
    pub fn load(config: &Config) -> Result<Self> {
        ConfigValidator::validate(config)?;

        let loaded = load_index(&config.corpus.index_path)?;
        let embeddings = if config.embedding.enabled {
            load_embeddings(&config.corpus.embeddings_path, &loaded.store)
        } else {
            None
        };
        Ok(Self::new(loaded.store, embeddings, config.ranking.clone()))
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn embeddings(&self) -> Option<&EmbeddingMatrix> {
        self.embeddings.as_ref()
    }

    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }
}

/// Shared handle to the active snapshot
///
/// Readers clone the inner `Arc`, so a reload never changes the data seen by
/// a query that already started.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The active snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Load a fresh snapshot from `config` and install it
    ///
    /// On error the active snapshot is left untouched.
    pub fn reload(&self, config: &Config) -> Result<Arc<Snapshot>> {
        let snapshot = Snapshot::load(config)?;
        info!(
            "Reloaded corpus: {} segments, embeddings {}",
            snapshot.store().len(),
            if snapshot.embeddings().is_some() {
                "available"
            } else {
                "unavailable"
            }
        );
        Ok(self.replace(snapshot))
    }

    /// Atomically install `snapshot`, returning the one it replaced
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
