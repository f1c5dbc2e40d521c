//! Record lifecycle signals.
//!
//! Owner records expose three signals (pre-save, post-save,
//! pre-delete) with explicitly managed subscriptions. Observers run
//! sequentially in subscription order and the first error aborts the
//! emission, cancelling the owner operation in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::blob::BlobError;

/// Observer invoked when a lifecycle signal fires.
#[async_trait::async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// React to the signal. An error cancels the owner operation.
    async fn notify(&self) -> Result<(), BlobError>;
}

/// Token identifying one subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Identifies one of the three lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Before the record row is written.
    PreSave,
    /// After the record row is written.
    PostSave,
    /// Before the record row is removed.
    PreDelete,
}

/// One lifecycle signal with explicitly managed subscriptions.
#[derive(Default)]
pub struct LifecycleSignal {
    next_id: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn LifecycleObserver>)>>,
}

impl LifecycleSignal {
    /// Create a signal with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Returns the token needed to unsubscribe.
    pub fn subscribe(&self, observer: Arc<dyn LifecycleObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        id
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() < before
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Fire the signal.
    ///
    /// Observers run one at a time in subscription order; the first
    /// error propagates and later observers are not invoked.
    ///
    /// # Errors
    ///
    /// Returns the first observer error.
    pub async fn emit(&self) -> Result<(), BlobError> {
        let observers: Vec<Arc<dyn LifecycleObserver>> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer.notify().await?;
        }
        Ok(())
    }
}

/// The lifecycle signal hub an owner record exposes.
#[derive(Default)]
pub struct LifecycleSignals {
    /// Fires before the record row is written.
    pub pre_save: LifecycleSignal,
    /// Fires after the record row is written.
    pub post_save: LifecycleSignal,
    /// Fires before the record row is removed.
    pub pre_delete: LifecycleSignal,
}

impl LifecycleSignals {
    /// Create a hub with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access a signal by kind.
    #[must_use]
    pub fn signal(&self, kind: SignalKind) -> &LifecycleSignal {
        match kind {
            SignalKind::PreSave => &self.pre_save,
            SignalKind::PostSave => &self.post_save,
            SignalKind::PreDelete => &self.pre_delete,
        }
    }
}
