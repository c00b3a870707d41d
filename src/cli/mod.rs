//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, assembles the engine from the
//! config file and the environment, and dispatches to the chosen front end.

pub mod say;

use std::error::Error;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cli::say::run_say;
use crate::core::completion::{ApiKey, GeminiClient, GeminiSettings};
use crate::core::config::data::Config;
use crate::core::conversation::Conversation;
use crate::core::engine::ChatEngine;
use crate::core::reveal::RevealScheduler;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging;

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "prodev", version)]
#[command(about = "ProDev AI - a terminal coding assistant backed by Gemini")]
#[command(
    long_about = "ProDev AI is a terminal coding assistant. Each question is sent to the Gemini \
generateContent API and the answer is typed out as it is revealed.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (required)\n\
  PRODEV_LOG        Diagnostic log filter, e.g. 'prodev=debug' (optional)\n\n\
Chat commands:\n\
  /copy [N]         Copy code block N of the last reply\n\
  /stop             Stop revealing the current reply\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use, overriding the config file
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Milliseconds between two revealed characters
    #[arg(long, global = true, value_name = "MS")]
    pub tick_ms: Option<u64>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Ask a single question and print the reply
    Say {
        /// The question; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub struct MissingApiKey;

impl fmt::Display for MissingApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{API_KEY_ENV_VAR} environment variable not set")
    }
}

impl Error for MissingApiKey {}

/// Turns the raw environment value into a key. Blank values count as unset.
pub fn api_key_from(value: Option<OsString>) -> Result<ApiKey, MissingApiKey> {
    value
        .and_then(|value| value.into_string().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(ApiKey::new)
        .ok_or(MissingApiKey)
}

/// Command-line flags win over config file values.
pub fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(model) = &args.model {
        config.model = Some(model.clone());
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_interval_ms = Some(tick_ms);
    }
}

pub fn build_engine(config: &Config, api_key: ApiKey) -> ChatEngine {
    let client = GeminiClient::new(
        api_key,
        GeminiSettings {
            base_url: config.base_url().to_string(),
            model: config.model().to_string(),
            system_instruction: config.system_instruction().to_string(),
            timeout: config.request_timeout(),
        },
    );
    ChatEngine::with_conversation(
        Conversation::with_failure_text(config.failure_message()),
        Arc::new(client),
        RevealScheduler::new(config.tick_interval()),
    )
}

pub fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &args);

    let api_key = match api_key_from(std::env::var_os(API_KEY_ENV_VAR)) {
        Ok(key) => key,
        Err(err) => {
            eprintln!("❌ Error: {err}");
            eprintln!();
            eprintln!("Please set your Gemini API key:");
            eprintln!("export {API_KEY_ENV_VAR}=\"your-api-key-here\"");
            std::process::exit(1);
        }
    };

    let engine = Arc::new(build_engine(&config, api_key));

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(engine).await,
        Commands::Say { prompt } => run_say(engine, prompt).await,
    }
}

#[cfg(test)]
mod tests;
