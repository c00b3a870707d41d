pub mod clipboard;
pub mod logging;
pub mod url;
