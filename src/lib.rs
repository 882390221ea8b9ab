//! Stage files, order them, and prefix them with sequential numbers.

pub mod config;
pub mod error;
pub mod events;
pub mod file_list;
pub mod numbering;
pub mod rename_engine;
pub mod tui;
