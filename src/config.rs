//! Application-wide constants.

pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "File Counter";
    pub const DEFAULT_START_NUMBER: i64 = 1;
    /// Written to the system temp directory; the terminal is in raw mode
    /// while the UI runs.
    pub const LOG_FILE_NAME: &'static str = "file-counter.log";
    pub const EVENT_LOG_CAPACITY: usize = 200;
    /// How many report rows the numbering banner lists inline.
    pub const NUMBERING_DETAILS_LIMIT: usize = 3;
}
