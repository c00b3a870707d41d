//! Typewriter reveal of a finished reply.
//!
//! A reveal takes a complete string and exposes it one grapheme cluster at a
//! time. [`RevealCursor`] is the pure stepping logic; [`RevealScheduler`]
//! drives a cursor from a tokio task at a fixed cadence and hands every
//! prefix to a tick callback.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::constants::DEFAULT_TICK_INTERVAL_MS;

/// Number of user-perceived characters in `text`.
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// One step of a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTick<'a> {
    pub prefix: &'a str,
    /// Grapheme clusters in `prefix`.
    pub progress: usize,
    pub done: bool,
}

/// Walks the prefixes of a string, shortest first.
///
/// The first tick carries the empty prefix and the last carries the whole
/// string with `done` set, so a string of `n` graphemes yields `n + 1` ticks.
#[derive(Debug, Clone)]
pub struct RevealCursor {
    source: String,
    // Byte offset of every prefix end, starting with 0.
    boundaries: Vec<usize>,
    cursor: usize,
}

impl RevealCursor {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut boundaries = Vec::with_capacity(source.len() + 1);
        boundaries.push(0);
        boundaries.extend(
            source
                .grapheme_indices(true)
                .map(|(offset, grapheme)| offset + grapheme.len()),
        );
        Self {
            source,
            boundaries,
            cursor: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Grapheme clusters in the full source.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ticks emitted so far.
    pub fn ticks_emitted(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor > self.len()
    }

    pub fn next_tick(&mut self) -> Option<RevealTick<'_>> {
        let progress = self.cursor;
        let end = *self.boundaries.get(progress)?;
        self.cursor += 1;
        Some(RevealTick {
            prefix: &self.source[..end],
            progress,
            done: progress == self.len(),
        })
    }
}

/// How a reveal run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed { ticks: usize },
    Cancelled { ticks: usize },
}

/// Cloneable handle that stops a reveal. Cancelling twice, or after the run
/// has finished, does nothing.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A running reveal.
#[derive(Debug)]
pub struct RevealHandle {
    cancel: CancelHandle,
    join: JoinHandle<RevealOutcome>,
}

impl RevealHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the run to stop, either because it completed or because it
    /// was cancelled.
    pub async fn finished(self) -> RevealOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            // The task only goes away early if the runtime is shutting down or
            // the tick callback panicked; neither leaves a reveal running.
            Err(err) => {
                debug!(error = %err, "Reveal task ended abnormally");
                RevealOutcome::Cancelled { ticks: 0 }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RevealScheduler {
    interval: Duration,
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
    }
}

impl RevealScheduler {
    /// A zero interval is clamped to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts revealing `full_text`, calling `on_tick(prefix, done)` once per
    /// interval. The first tick fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, full_text: impl Into<String>, on_tick: F) -> RevealHandle
    where
        F: FnMut(&str, bool) + Send + 'static,
    {
        start_reveal(full_text, on_tick, self.interval)
    }
}

/// Free-standing form of [`RevealScheduler::start`].
pub fn start_reveal<F>(full_text: impl Into<String>, mut on_tick: F, interval: Duration) -> RevealHandle
where
    F: FnMut(&str, bool) + Send + 'static,
{
    let interval = interval.max(Duration::from_millis(1));
    let token = CancellationToken::new();
    let task_token = token.clone();
    let mut cursor = RevealCursor::new(full_text);

    debug!(
        graphemes = cursor.len(),
        interval_ms = interval.as_millis() as u64,
        "Starting reveal"
    );

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {}
                _ = ticker.tick() => {}
            }

            if task_token.is_cancelled() {
                let ticks = cursor.ticks_emitted();
                debug!(ticks, "Reveal cancelled");
                return RevealOutcome::Cancelled { ticks };
            }

            match cursor.next_tick() {
                Some(tick) => {
                    let done = tick.done;
                    on_tick(tick.prefix, done);
                    if done {
                        break;
                    }
                }
                None => break,
            }
        }

        let ticks = cursor.ticks_emitted();
        debug!(ticks, "Reveal completed");
        RevealOutcome::Completed { ticks }
    });

    RevealHandle {
        cancel: CancelHandle { token },
        join,
    }
}
