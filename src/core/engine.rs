//! Ties a [`Conversation`] to a completion client and the reveal scheduler.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::core::completion::CompletionClient;
use crate::core::conversation::{
    Conversation, ConversationSnapshot, ConversationState, RequestId, SubmitError,
};
use crate::core::message::TurnId;
use crate::core::reveal::{CancelHandle, RevealHandle, RevealScheduler};

fn lock(conversation: &Mutex<Conversation>) -> MutexGuard<'_, Conversation> {
    // Every mutation leaves the conversation consistent before returning, so
    // a panic elsewhere cannot leave it half-written.
    conversation.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ChatEngine {
    conversation: Arc<Mutex<Conversation>>,
    client: Arc<dyn CompletionClient>,
    scheduler: RevealScheduler,
    active_reveal: Mutex<Option<CancelHandle>>,
}

impl ChatEngine {
    pub fn new(client: Arc<dyn CompletionClient>, scheduler: RevealScheduler) -> Self {
        Self::with_conversation(Conversation::new(), client, scheduler)
    }

    pub fn with_conversation(
        conversation: Conversation,
        client: Arc<dyn CompletionClient>,
        scheduler: RevealScheduler,
    ) -> Self {
        Self {
            conversation: Arc::new(Mutex::new(conversation)),
            client,
            scheduler,
            active_reveal: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConversationState {
        lock(&self.conversation).state()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        lock(&self.conversation).snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        lock(&self.conversation).subscribe()
    }

    /// Runs one exchange: records the user turn, waits for the completion and
    /// starts revealing the reply. Returns once the reveal is running; await
    /// [`RevealHandle::finished`] to wait for the last tick.
    ///
    /// Dropping the future while the completion is outstanding abandons the
    /// request: the user turn stays without a reply and the conversation
    /// returns to `Idle`.
    pub async fn submit(&self, text: &str) -> Result<RevealHandle, SubmitError> {
        let pending = lock(&self.conversation).begin_submit(text)?;
        let mut guard = PendingGuard {
            conversation: &self.conversation,
            request: Some(pending.id),
        };

        let outcome = self
            .client
            .complete(&pending.prompt, &pending.history)
            .await;
        guard.disarm();

        // The reveal starts and its cancel handle is stored before the lock is
        // released, so `cancel_reveal` never sees a revealing turn whose
        // handle is missing.
        let mut conversation = lock(&self.conversation);
        let Some(target) = conversation.resolve(pending.id, outcome) else {
            return Err(SubmitError::Busy(conversation.state()));
        };

        debug!(turn = target.turn.position(), "Revealing reply");

        let shared = Arc::clone(&self.conversation);
        let session = target.session;
        let mut progress = 0;
        let handle = self.scheduler.start(target.full_text, move |prefix, done| {
            lock(&shared).apply_tick(session, prefix, progress, done);
            progress += 1;
        });

        *self
            .active_reveal
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle.cancel_handle());
        drop(conversation);

        Ok(handle)
    }

    /// Stops the running reveal, leaving its turn partially revealed. Returns
    /// the interrupted turn, or `None` if nothing was being revealed.
    pub fn cancel_reveal(&self) -> Option<TurnId> {
        let mut conversation = lock(&self.conversation);
        let interrupted = conversation.cancel_reveal();
        let handle = self
            .active_reveal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(conversation);

        if let Some(handle) = handle {
            handle.cancel();
        }
        if let Some(turn) = interrupted {
            debug!(turn = turn.position(), "Reveal interrupted");
        }
        interrupted
    }
}

/// Abandons the pending request unless disarmed once the completion settles.
struct PendingGuard<'a> {
    conversation: &'a Mutex<Conversation>,
    request: Option<RequestId>,
}

impl PendingGuard<'_> {
    fn disarm(&mut self) {
        self.request = None;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            lock(self.conversation).abandon(request);
        }
    }
}
