//! Terminal front-end driving the [`FileManager`](crate::rename_engine::FileManager).

pub mod app;
pub mod events;
pub mod models;
pub mod rendering;

pub use app::App;
pub use events::run_tui;
