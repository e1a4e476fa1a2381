//! Zip-code lookup coordination.
//!
//! Only the most recently started lookup may write into the form. Ordering is
//! enforced twice: starting a lookup aborts the previous task, and every
//! outcome carries its generation, which is compared with the active one
//! before it is handed back to the app.

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;

use signup_providers::{LookupError, PostalAddress, PostalClient};

/// Result of one finished lookup task.
#[derive(Debug)]
pub(crate) struct LookupOutcome {
    pub(crate) generation: u64,
    pub(crate) zipcode: String,
    pub(crate) result: Result<PostalAddress, LookupError>,
}

#[derive(Debug)]
struct ActiveLookup {
    generation: u64,
    abort_handle: AbortHandle,
}

#[derive(Debug)]
pub(crate) struct ZipLookup {
    client: PostalClient,
    generation: u64,
    active: Option<ActiveLookup>,
    tx: mpsc::UnboundedSender<LookupOutcome>,
    rx: mpsc::UnboundedReceiver<LookupOutcome>,
}

impl ZipLookup {
    pub(crate) fn new(client: PostalClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            generation: 0,
            active: None,
            tx,
            rx,
        }
    }

    /// Abort any in-flight lookup and spawn a new one for `zipcode`.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(&mut self, zipcode: &str) -> u64 {
        self.cancel();

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let (abort_handle, abort_registration) = AbortHandle::new_pair();

        let client = self.client.clone();
        let tx = self.tx.clone();
        let zipcode = zipcode.to_string();
        let task = async move {
            let result = client.lookup(&zipcode).await;
            let _ = tx.send(LookupOutcome {
                generation,
                zipcode,
                result,
            });
        };

        tokio::spawn(async move {
            let _ = Abortable::new(task, abort_registration).await;
        });

        self.active = Some(ActiveLookup {
            generation,
            abort_handle,
        });
        tracing::debug!(generation, "Zip lookup started");
        generation
    }

    /// Abort the in-flight lookup, if any. Returns whether one was pending.
    pub(crate) fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.abort_handle.abort();
        tracing::debug!(generation = active.generation, "Zip lookup superseded");
        true
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    /// Next outcome belonging to the active lookup. Stale outcomes that raced
    /// past their abort are dropped here.
    pub(crate) fn try_next(&mut self) -> Option<LookupOutcome> {
        while let Ok(outcome) = self.rx.try_recv() {
            match &self.active {
                Some(active) if active.generation == outcome.generation => {
                    self.active = None;
                    return Some(outcome);
                }
                _ => {
                    tracing::debug!(
                        generation = outcome.generation,
                        current = self.generation,
                        "Discarding stale zip lookup result"
                    );
                }
            }
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn abort_handle(&self) -> Option<AbortHandle> {
        self.active.as_ref().map(|active| active.abort_handle.clone())
    }

    #[cfg(test)]
    pub(crate) fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Deliver an outcome as if a task had produced it.
    #[cfg(test)]
    pub(crate) fn inject(&self, outcome: LookupOutcome) {
        let _ = self.tx.send(outcome);
    }
}

impl Drop for ZipLookup {
    fn drop(&mut self) {
        self.cancel();
    }
}
