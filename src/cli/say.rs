//! Single-question mode: reveal one reply on stdout and exit.

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use crate::core::conversation::SubmitError;
use crate::core::engine::ChatEngine;
use crate::ui::transcript::TranscriptPrinter;

/// Submits `prompt` and renders every snapshot into `out` until the reply has
/// been fully revealed.
pub async fn reveal_one<W: Write>(
    engine: Arc<ChatEngine>,
    prompt: String,
    out: W,
) -> Result<W, Box<dyn Error>> {
    let mut snapshots = engine.subscribe();
    let mut printer = TranscriptPrinter::new(out).code_block_hints(false);

    // `engine` stays alive for the whole loop; it owns the snapshot sender.
    let submitter = Arc::clone(&engine);
    let mut submit = tokio::spawn(async move {
        let handle = submitter.submit(&prompt).await?;
        handle.finished().await;
        Ok::<(), SubmitError>(())
    });

    loop {
        tokio::select! {
            biased;
            changed = snapshots.changed() => {
                changed?;
                let snapshot = snapshots.borrow_and_update().clone();
                printer.render(&snapshot)?;
            }
            joined = &mut submit => {
                let snapshot = snapshots.borrow_and_update().clone();
                printer.render(&snapshot)?;
                joined??;
                break;
            }
        }
    }

    Ok(printer.into_inner())
}

pub async fn run_say(engine: Arc<ChatEngine>, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: prodev say <prompt>");
        std::process::exit(1);
    }

    let mut stdout = reveal_one(engine, prompt, io::stdout()).await?;
    stdout.flush()?;
    Ok(())
}
