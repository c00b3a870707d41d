//! Terminal rendering of conversation snapshots.

pub mod chat_loop;
pub mod markdown;
pub mod transcript;
