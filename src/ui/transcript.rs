//! Line-oriented renderer for conversation snapshots.
//!
//! The printer remembers how much of the transcript it has already written
//! and only emits the difference, so feeding it every snapshot the engine
//! publishes produces a typewriter effect on a plain terminal.

use std::io::{self, Write};

use crate::core::conversation::{ConversationSnapshot, ConversationState};
use crate::core::message::Turn;
use crate::ui::markdown::{code_blocks, CodeBlock};

pub const ASSISTANT_LABEL: &str = "ProDev AI";

pub struct TranscriptPrinter<W: Write> {
    out: W,
    /// Turns fully written so far.
    finished: usize,
    /// Bytes of the current assistant turn already written, once its label
    /// has been printed.
    written: Option<usize>,
    /// Turn count at which the thinking indicator was last shown.
    thinking_shown_at: Option<usize>,
    echo_user: bool,
    code_block_hints: bool,
    last_code_blocks: Vec<CodeBlock>,
}

impl<W: Write> TranscriptPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            finished: 0,
            written: None,
            thinking_shown_at: None,
            echo_user: false,
            code_block_hints: true,
            last_code_blocks: Vec::new(),
        }
    }

    /// Also print user turns. Off by default since the terminal already
    /// shows what was typed.
    pub fn echo_user(mut self, enabled: bool) -> Self {
        self.echo_user = enabled;
        self
    }

    /// List the code blocks of every finished reply with their `/copy` index.
    pub fn code_block_hints(mut self, enabled: bool) -> Self {
        self.code_block_hints = enabled;
        self
    }

    /// Code blocks of the most recently finished reply.
    pub fn last_code_blocks(&self) -> &[CodeBlock] {
        &self.last_code_blocks
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, snapshot: &ConversationSnapshot) -> io::Result<()> {
        while let Some(turn) = snapshot.turns.get(self.finished) {
            if turn.is_user() {
                if self.echo_user {
                    writeln!(self.out, "You: {}", turn.text)?;
                }
                self.finished += 1;
                continue;
            }

            if !self.render_assistant(turn)? {
                break;
            }
            self.finished += 1;
        }

        if snapshot.state == ConversationState::AwaitingCompletion
            && self.thinking_shown_at != Some(snapshot.turns.len())
        {
            self.thinking_shown_at = Some(snapshot.turns.len());
            writeln!(self.out, "… thinking")?;
        }

        self.out.flush()
    }

    /// Writes whatever is new in `turn`. Returns true once the turn will not
    /// change again.
    fn render_assistant(&mut self, turn: &Turn) -> io::Result<bool> {
        let written = match self.written {
            Some(written) => written,
            None => {
                writeln!(self.out)?;
                writeln!(self.out, "{ASSISTANT_LABEL}:")?;
                0
            }
        };

        // Reveal prefixes only ever grow, so the unwritten part is a suffix.
        let fresh = turn.text.get(written..).unwrap_or_default();
        self.out.write_all(fresh.as_bytes())?;
        self.written = Some(written + fresh.len());

        if turn.complete {
            writeln!(self.out)?;
            self.finish_reply(turn)?;
            return Ok(true);
        }
        if turn.interrupted {
            writeln!(self.out, " [stopped]")?;
            self.finish_reply(turn)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn finish_reply(&mut self, turn: &Turn) -> io::Result<()> {
        self.written = None;
        self.last_code_blocks = code_blocks(&turn.text);

        if self.code_block_hints && !self.last_code_blocks.is_empty() {
            writeln!(self.out)?;
            for block in &self.last_code_blocks {
                let language = block.language.as_deref().unwrap_or("text");
                let lines = block.line_count();
                let noun = if lines == 1 { "line" } else { "lines" };
                writeln!(
                    self.out,
                    "  [{}] {language}, {lines} {noun}  (/copy {})",
                    block.index, block.index
                )?;
            }
        }
        writeln!(self.out)
    }
}
