//! Engine facade.

use crate::config::Config;
use crate::sequencer::Sequencer;
use crate::stats::SequencerStats;
use crate::transaction::Transaction;
use juggler_storage::ResourceBackend;
use std::sync::Arc;

/// The main engine handle.
///
/// `Juggler` pairs a resource backend with a sequencer and opens
/// transactions against them. Cloning is cheap: clones share the backend
/// and the sequencer, so a clone can be handed to each worker thread.
///
/// # Example
///
/// ```rust
/// use juggler_core::Juggler;
/// use juggler_storage::InMemoryBackend;
///
/// let juggler = Juggler::new(InMemoryBackend::with_data([(1, b"v1".to_vec())]));
///
/// let mut tx = juggler.begin();
/// let value = tx.read(1)?;
/// tx.write(1, &[value, b"+".to_vec()].concat())?;
/// tx.finish()?;
/// # Ok::<(), juggler_core::CoreError>(())
/// ```
pub struct Juggler<B: ResourceBackend + ?Sized> {
    backend: Arc<B>,
    sequencer: Arc<Sequencer>,
}

impl<B: ResourceBackend> Juggler<B> {
    /// Creates an engine over `backend` with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &Config::default())
    }

    /// Creates an engine over `backend` with `config`.
    pub fn with_config(backend: B, config: &Config) -> Self {
        Self::from_shared(Arc::new(backend), config)
    }
}

impl<B: ResourceBackend + ?Sized> Juggler<B> {
    /// Creates an engine over an already shared backend.
    pub fn from_shared(backend: Arc<B>, config: &Config) -> Self {
        Self {
            backend,
            sequencer: Arc::new(Sequencer::with_config(config)),
        }
    }

    /// Opens a new transaction.
    pub fn begin(&self) -> Transaction<B> {
        Transaction::new(Arc::clone(&self.backend), self.sequencer.new_process())
    }

    /// Returns the shared backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Returns the sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &Arc<Sequencer> {
        &self.sequencer
    }

    /// Returns the sequencer statistics.
    #[must_use]
    pub fn stats(&self) -> &SequencerStats {
        self.sequencer.stats()
    }

    /// Returns the number of live transactions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sequencer.active_count()
    }
}

impl<B: ResourceBackend + ?Sized> Clone for Juggler<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            sequencer: Arc::clone(&self.sequencer),
        }
    }
}

impl<B: ResourceBackend + ?Sized> std::fmt::Debug for Juggler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Juggler")
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}
