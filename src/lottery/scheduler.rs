use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use teloxide::types::{ChatId, MessageId};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::bot::gateway::MessagingGateway;

/// How long the status message survives after the draw
pub const WINNER_ANNOUNCEMENT_TTL: Duration = Duration::from_secs(600);
/// Pause and cancel notices
pub const NOTICE_TTL: Duration = Duration::from_secs(30);
/// Join messages, join replies and command leftovers
pub const JOIN_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Handle to one pending deletion.
#[derive(Debug, Clone)]
pub struct ScheduledDeletion {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub delay: Duration,
    done: Arc<AtomicBool>,
    handle: AbortHandle,
}

impl ScheduledDeletion {
    pub fn cancel(&self) {
        self.handle.abort();
        self.done.store(true, Ordering::SeqCst);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

/// Deletes transient messages after a delay on the tokio runtime.
///
/// Failures are ignored: the message may already be gone.
pub struct DeletionScheduler<G> {
    gateway: Arc<G>,
    pending: Mutex<Vec<ScheduledDeletion>>,
}

impl<G: MessagingGateway> DeletionScheduler<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn schedule(&self, chat_id: ChatId, message_id: MessageId, delay: Duration) -> ScheduledDeletion {
        let gateway = self.gateway.clone();
        let done = Arc::new(AtomicBool::new(false));
        let task_done = done.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = gateway.delete_message(chat_id, message_id).await {
                debug!("Delayed delete of message {} in chat {} failed: {}", message_id.0, chat_id.0, e);
            }
            task_done.store(true, Ordering::SeqCst);
        });

        let deletion = ScheduledDeletion {
            chat_id,
            message_id,
            delay,
            done,
            handle: task.abort_handle(),
        };

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|d| !d.is_done());
        pending.push(deletion.clone());
        deletion
    }

    /// Deletions that have neither run nor been cancelled.
    pub fn pending(&self) -> Vec<ScheduledDeletion> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|d| !d.is_done());
        pending.clone()
    }

    pub fn cancel_all(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let cancelled = pending.iter().filter(|d| !d.is_done()).count();
        for deletion in pending.drain(..) {
            deletion.cancel();
        }
        cancelled
    }
}
