//! ProDev is a terminal coding-assistant client for the Gemini
//! `generateContent` API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation log, the single-request completion
//!   client and the typewriter reveal that exposes each reply gradually.
//! - [`ui`] renders conversation snapshots to the terminal and runs the
//!   interactive loop.
//! - [`api`] defines the request and response payloads of the endpoint.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
