//! Interactive terminal session.
//!
//! Reads prompts from stdin, hands them to the engine and renders every
//! published snapshot through a [`TranscriptPrinter`]. Submissions run in
//! their own task so the loop keeps rendering (and accepting `/stop`) while
//! a reply is being fetched or revealed.

use std::error::Error;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::debug;

use crate::core::conversation::SubmitError;
use crate::core::engine::ChatEngine;
use crate::ui::transcript::{TranscriptPrinter, ASSISTANT_LABEL};
use crate::utils::clipboard::copy_to_clipboard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Prompt(String),
    /// Copy a code block of the last reply; `None` means the first one.
    Copy(Option<usize>),
    Stop,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Prompt(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "copy" => match parts.next() {
            None => ChatInput::Copy(None),
            Some(index) => match index.parse::<usize>() {
                Ok(index) if index > 0 => ChatInput::Copy(Some(index)),
                _ => ChatInput::Unknown(trimmed.to_string()),
            },
        },
        "stop" => ChatInput::Stop,
        "help" => ChatInput::Help,
        "quit" | "exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(trimmed.to_string()),
    }
}

fn print_banner() {
    println!("{ASSISTANT_LABEL} - Full Stack Coding Assistant");
    println!("Type a question and press Enter. /help lists commands.");
    println!();
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  /copy [N]   Copy code block N of the last reply (default 1)");
    eprintln!("  /stop       Stop revealing the current reply");
    eprintln!("  /help       Show this help");
    eprintln!("  /quit       Leave the chat");
}

fn copy_block<W: io::Write>(printer: &TranscriptPrinter<W>, index: Option<usize>) {
    let index = index.unwrap_or(1);
    let blocks = printer.last_code_blocks();
    match blocks.iter().find(|block| block.index == index) {
        Some(block) => match copy_to_clipboard(block.copy_text()) {
            Ok(()) => eprintln!("✅ Copied code block {index} to the clipboard"),
            Err(err) => eprintln!("❌ {err}"),
        },
        None if blocks.is_empty() => eprintln!("⚠️  The last reply has no code blocks"),
        None => eprintln!(
            "⚠️  No code block {index}; the last reply has {}",
            blocks.len()
        ),
    }
}

async fn submit_and_wait(
    engine: Arc<ChatEngine>,
    text: String,
    notices: mpsc::UnboundedSender<SubmitError>,
) {
    match engine.submit(&text).await {
        Ok(handle) => {
            let outcome = handle.finished().await;
            debug!(?outcome, "Reply finished");
        }
        Err(SubmitError::EmptyInput) => {}
        Err(err) => {
            let _ = notices.send(err);
        }
    }
}

fn print_notice(err: &SubmitError) {
    eprintln!("⚠️  {err}; your message was not sent");
}

pub async fn run_chat(engine: Arc<ChatEngine>) -> Result<(), Box<dyn Error>> {
    print_banner();
    let input = BufReader::new(tokio::io::stdin());
    run_session(engine, input, io::stdout()).await?;
    Ok(())
}

/// Drives one chat session from `input`, rendering into `out`.
///
/// Prompts already sent when `input` ends are still answered and revealed
/// before returning. `/quit` returns at once and stops any running reveal.
pub async fn run_session<R, W>(
    engine: Arc<ChatEngine>,
    input: R,
    out: W,
) -> Result<W, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: io::Write,
{
    let mut snapshots = engine.subscribe();
    let mut printer = TranscriptPrinter::new(out);
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let mut lines = input.lines();
    let mut submissions = JoinSet::new();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                None => {
                    debug!(pending = submissions.len(), "Input closed");
                    input_open = false;
                }
                Some(line) => match parse_input(&line) {
                    ChatInput::Prompt(text) => {
                        submissions.spawn(submit_and_wait(
                            Arc::clone(&engine),
                            text,
                            notice_tx.clone(),
                        ));
                    }
                    ChatInput::Copy(index) => copy_block(&printer, index),
                    ChatInput::Stop => {
                        if engine.cancel_reveal().is_none() {
                            eprintln!("⚠️  Nothing is being revealed");
                        }
                    }
                    ChatInput::Help => print_help(),
                    ChatInput::Quit => {
                        engine.cancel_reveal();
                        break;
                    }
                    ChatInput::Unknown(command) => {
                        eprintln!("❌ Unknown command: {command} (try /help)");
                    }
                },
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                printer.render(&snapshot)?;
            }
            Some(joined) = submissions.join_next() => {
                joined?;
            }
            Some(err) = notice_rx.recv() => print_notice(&err),
        }

        if !input_open && submissions.is_empty() {
            break;
        }
    }

    let snapshot = snapshots.borrow_and_update().clone();
    printer.render(&snapshot)?;
    while let Ok(err) = notice_rx.try_recv() {
        print_notice(&err);
    }
    Ok(printer.into_inner())
}
