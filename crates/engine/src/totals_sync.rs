//! Debounced persistence of session totals.
//!
//! Every item change marks its session dirty. Once the session has been
//! quiet for the configured delay its totals are recomputed from the live
//! items and written; a newer schedule for the same session aborts the
//! pending one. There is one slot per session, never a queue.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::{Engine, ResultEngine};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Destination of debounced totals writes.
///
/// Implementations read the session's items when called, so the result does
/// not depend on the order in which edits were scheduled.
pub trait TotalsWriter: Send + Sync + 'static {
    fn persist_totals(
        &self,
        user_id: &str,
        session_id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
}

impl TotalsWriter for Engine {
    async fn persist_totals(&self, user_id: &str, session_id: Uuid) -> ResultEngine<()> {
        self.recompute_session_totals(user_id, session_id)
            .await
            .map(|_| ())
    }
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slots {
    next_generation: u64,
    pending: HashMap<Uuid, Pending>,
}

pub struct TotalsSync<W: TotalsWriter> {
    writer: Arc<W>,
    delay: Duration,
    slots: Arc<Mutex<Slots>>,
}

impl<W: TotalsWriter> TotalsSync<W> {
    pub fn new(writer: Arc<W>, delay: Duration) -> Self {
        Self {
            writer,
            delay,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Marks the session dirty, superseding its pending write if any. Must be
    /// called from within a tokio runtime.
    pub async fn schedule(&self, user_id: &str, session_id: Uuid) {
        let mut slots = self.slots.lock().await;
        slots.next_generation += 1;
        let generation = slots.next_generation;

        if let Some(previous) = slots.pending.remove(&session_id) {
            previous.handle.abort();
            tracing::trace!("superseded pending totals write of session {session_id}");
        }

        let writer = Arc::clone(&self.writer);
        let shared_slots = Arc::clone(&self.slots);
        let delay = self.delay;
        let user_id = user_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Leave the slot before writing: from here on the write is no
            // longer abortable.
            {
                let mut slots = shared_slots.lock().await;
                match slots.pending.get(&session_id) {
                    Some(current) if current.generation == generation => {
                        slots.pending.remove(&session_id);
                    }
                    _ => return,
                }
            }

            match writer.persist_totals(&user_id, session_id).await {
                Ok(()) => tracing::debug!("persisted totals of session {session_id}"),
                Err(err) => {
                    tracing::error!("failed to persist totals of session {session_id}: {err}");
                }
            }
        });

        slots
            .pending
            .insert(session_id, Pending { generation, handle });
    }

    /// Drops the pending write of a session. Returns whether one was pending.
    pub async fn cancel(&self, session_id: Uuid) -> bool {
        let mut slots = self.slots.lock().await;
        match slots.pending.remove(&session_id) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of sessions with a write waiting for its delay.
    pub async fn pending(&self) -> usize {
        self.slots.lock().await.pending.len()
    }
}

impl<W: TotalsWriter> Drop for TotalsSync<W> {
    fn drop(&mut self) {
        if let Ok(slots) = self.slots.try_lock() {
            for pending in slots.pending.values() {
                pending.handle.abort();
            }
        }
    }
}
