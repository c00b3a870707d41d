//! Conversation state machine.
//!
//! [`Conversation`] owns the append-only turn log and the
//! `Idle → AwaitingCompletion → Revealing → Idle` cycle. It performs no I/O
//! and never waits: the engine feeds it completion results and reveal ticks,
//! and every accepted mutation publishes a fresh [`ConversationSnapshot`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::core::completion::CompletionError;
use crate::core::constants::COMPLETION_FAILURE_TEXT;
use crate::core::message::{Turn, TurnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingCompletion,
    Revealing,
}

/// Why a submission did not start a new exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The text was empty after trimming. Callers usually ignore this.
    EmptyInput,
    /// A completion or reveal is still in flight.
    Busy(ConversationState),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptyInput => write!(f, "Nothing to send"),
            SubmitError::Busy(ConversationState::AwaitingCompletion) => {
                write!(f, "Still waiting for the previous reply")
            }
            SubmitError::Busy(_) => write!(f, "Still showing the previous reply"),
        }
    }
}

impl StdError for SubmitError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealSessionId(u64);

/// An outstanding completion call, handed to the engine by
/// [`Conversation::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub prompt: String,
    /// Every turn before the new user turn.
    pub history: Vec<Turn>,
}

/// What the engine should reveal, and into which turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTarget {
    pub session: RevealSessionId,
    pub turn: TurnId,
    pub full_text: String,
}

/// Read-only view published after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub revision: u64,
    pub state: ConversationState,
    pub turns: Arc<[Turn]>,
}

impl ConversationSnapshot {
    pub fn last_assistant_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_assistant())
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveReveal {
    session: RevealSessionId,
    turn: TurnId,
}

pub struct Conversation {
    turns: Vec<Turn>,
    state: ConversationState,
    pending: Option<RequestId>,
    active_reveal: Option<ActiveReveal>,
    next_request: u64,
    next_session: u64,
    revision: u64,
    failure_text: String,
    snapshots: watch::Sender<ConversationSnapshot>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_failure_text(COMPLETION_FAILURE_TEXT)
    }

    /// `failure_text` replaces the reply whenever the completion fails.
    pub fn with_failure_text(failure_text: impl Into<String>) -> Self {
        let initial = ConversationSnapshot {
            revision: 0,
            state: ConversationState::Idle,
            turns: Arc::from(Vec::new()),
        };
        let (snapshots, _) = watch::channel(initial);
        Self {
            turns: Vec::new(),
            state: ConversationState::Idle,
            pending: None,
            active_reveal: None,
            next_request: 0,
            next_session: 0,
            revision: 0,
            failure_text: failure_text.into(),
            snapshots,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, id: TurnId) -> Option<&Turn> {
        self.turns.get(id.0 as usize)
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshots.subscribe()
    }

    /// Validates `text`, appends the user turn and moves to
    /// `AwaitingCompletion`. The returned request must be settled with
    /// [`Conversation::resolve`].
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingRequest, SubmitError> {
        if self.state != ConversationState::Idle {
            debug!(state = ?self.state, "Submission rejected while busy");
            return Err(SubmitError::Busy(self.state));
        }

        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        let history = self.turns.clone();
        let turn_id = self.next_turn_id();
        self.turns.push(Turn::user(turn_id, prompt));

        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.pending = Some(id);
        self.transition(ConversationState::AwaitingCompletion);
        self.publish();

        Ok(PendingRequest {
            id,
            prompt: prompt.to_string(),
            history,
        })
    }

    /// Settles the pending request. Success and failure both append an empty
    /// assistant turn and move to `Revealing`; a failure reveals the fixed
    /// failure text instead of a reply.
    ///
    /// Returns `None` when `request` is not the pending one.
    pub fn resolve(
        &mut self,
        request: RequestId,
        outcome: Result<String, CompletionError>,
    ) -> Option<RevealTarget> {
        if self.pending != Some(request) {
            debug!(?request, "Ignoring result for a request that is not pending");
            return None;
        }
        self.pending = None;

        let full_text = match outcome {
            Ok(text) => text,
            Err(err) => {
                debug!(error = %err, "Substituting failure text for the reply");
                self.failure_text.clone()
            }
        };

        let turn = self.next_turn_id();
        self.turns.push(Turn::pending_assistant(turn));

        let session = RevealSessionId(self.next_session);
        self.next_session += 1;
        self.active_reveal = Some(ActiveReveal { session, turn });
        self.transition(ConversationState::Revealing);
        self.publish();

        Some(RevealTarget {
            session,
            turn,
            full_text,
        })
    }

    /// Drops the pending request without a reply, for when the caller stopped
    /// waiting on the completion. The user turn stays and the conversation
    /// returns to `Idle`. Returns false when `request` is not the pending one.
    pub fn abandon(&mut self, request: RequestId) -> bool {
        if self.pending != Some(request) {
            return false;
        }
        self.pending = None;
        debug!(?request, "Completion abandoned");
        self.transition(ConversationState::Idle);
        self.publish();
        true
    }

    /// Writes one reveal step into the target turn. Ticks from a session that
    /// is no longer active are dropped; returns whether the tick was applied.
    pub fn apply_tick(
        &mut self,
        session: RevealSessionId,
        prefix: &str,
        progress: usize,
        done: bool,
    ) -> bool {
        let Some(active) = self.active_reveal else {
            return false;
        };
        if active.session != session {
            return false;
        }
        let Some(turn) = self.turns.get_mut(active.turn.0 as usize) else {
            return false;
        };

        turn.text.clear();
        turn.text.push_str(prefix);
        turn.reveal_progress = progress;

        if done {
            turn.complete = true;
            self.active_reveal = None;
            self.transition(ConversationState::Idle);
        }
        self.publish();
        true
    }

    /// Stops the running reveal. The target turn keeps its partial text, is
    /// flagged as interrupted and never completes. Returns the turn, if a
    /// reveal was running.
    pub fn cancel_reveal(&mut self) -> Option<TurnId> {
        let active = self.active_reveal.take()?;
        if let Some(turn) = self.turns.get_mut(active.turn.0 as usize) {
            turn.interrupted = true;
        }
        self.transition(ConversationState::Idle);
        self.publish();
        Some(active.turn)
    }

    fn next_turn_id(&self) -> TurnId {
        TurnId(self.turns.len() as u64)
    }

    fn transition(&mut self, next: ConversationState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "Conversation state changed");
            self.state = next;
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = ConversationSnapshot {
            revision: self.revision,
            state: self.state,
            turns: Arc::from(self.turns.as_slice()),
        };
        self.snapshots.send_replace(snapshot);
    }
}
