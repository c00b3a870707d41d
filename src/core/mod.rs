//! Conversation engine: turn log, completion client and reveal scheduling.

pub mod completion;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod engine;
pub mod message;
pub mod reveal;
