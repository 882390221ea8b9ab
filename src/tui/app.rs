use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::config::AppConfig;
use crate::events::EventLog;
use crate::rename_engine::{ConfigBuilder, FileManager, RenumberConfig, RenumberReport};
use super::models::{InputMode, StatusLevel, StatusMessage};

pub struct App {
    pub manager: FileManager,
    pub event_log: EventLog,
    pub list_state: ListState,
    pub start_number: i64,
    pub output_dir: Option<PathBuf>,
    pub input_mode: InputMode,
    pub input: String,
    pub show_help: bool,
    pub status_message: Option<StatusMessage>,
    pub status_message_time: Option<Instant>,
    pub should_quit: bool,
}

impl App {
    /// `manager` should already have `event_log` subscribed.
    pub fn new(manager: FileManager, event_log: EventLog, config: RenumberConfig) -> Self {
        let mut list_state = ListState::default();
        if !manager.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            manager,
            event_log,
            list_state,
            start_number: config.start_number,
            output_dir: config.output_dir,
            input_mode: InputMode::Normal,
            input: String::new(),
            show_help: false,
            status_message: None,
            status_message_time: None,
            should_quit: false,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state
            .selected()
            .filter(|&i| i < self.manager.count())
    }

    pub fn next(&mut self) {
        let count = self.manager.count();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let count = self.manager.count();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i > 0 && i < count => i - 1,
            _ => count - 1,
        };
        self.list_state.select(Some(i));
    }

    fn sync_selection(&mut self) {
        let count = self.manager.count();
        let selected = match self.list_state.selected() {
            _ if count == 0 => None,
            Some(i) => Some(i.min(count - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            level,
        });
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let (Some(_), Some(time)) = (&self.status_message, self.status_message_time) {
            if time.elapsed() > Duration::from_secs(5) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn begin_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input = match (mode, &self.output_dir) {
            (InputMode::OutputDir, Some(dir)) => dir.to_string_lossy().into_owned(),
            _ => String::new(),
        };
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn submit_input(&mut self) {
        let value = clean_path_input(&self.input);
        let mode = self.input_mode;
        self.cancel_input();

        match mode {
            InputMode::AddPath if !value.is_empty() => self.add_paths(vec![value]),
            InputMode::OutputDir if value.is_empty() => self.clear_output_dir(),
            InputMode::OutputDir => self.set_output_dir(PathBuf::from(value)),
            _ => {}
        }
    }

    pub fn add_paths(&mut self, paths: Vec<String>) {
        let added = self.manager.add_files(&paths);
        self.sync_selection();
        if added > 0 {
            self.set_status(StatusLevel::Info, format!("Files added: {added}"));
        } else {
            self.set_status(
                StatusLevel::Warning,
                "Could not add the files or they are already in the list",
            );
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(i) = self.selected() {
            if self.manager.remove_at(i) {
                self.sync_selection();
            }
        }
    }

    pub fn move_selected_up(&mut self) {
        if let Some(i) = self.selected() {
            if self.manager.move_up(i) {
                self.list_state.select(Some(i - 1));
            }
        }
    }

    pub fn move_selected_down(&mut self) {
        if let Some(i) = self.selected() {
            if self.manager.move_down(i) {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    pub fn clear_files(&mut self) {
        self.manager.clear();
        self.sync_selection();
    }

    pub fn increment_start(&mut self) {
        self.start_number = self.start_number.saturating_add(1);
    }

    pub fn decrement_start(&mut self) {
        self.start_number = self.start_number.saturating_sub(1);
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) {
        match ConfigBuilder::new().output_dir(Some(&dir)).build() {
            Ok(_) => {
                self.set_status(StatusLevel::Info, format!("Copies go to {}", dir.display()));
                self.output_dir = Some(dir);
            }
            Err(e) => self.set_status(StatusLevel::Error, e.to_string()),
        }
    }

    pub fn clear_output_dir(&mut self) {
        self.output_dir = None;
        self.set_status(StatusLevel::Info, "Renaming in place");
    }

    /// Text for the numbering banner, listing a few conversions inline.
    pub fn numbering_info(&self) -> Option<String> {
        let report = self.manager.numbered_files_report();
        if report.is_empty() {
            return None;
        }

        let mut text = format!(
            "Existing numbering found: {} file(s) will be renumbered",
            report.len()
        );
        if report.len() <= AppConfig::NUMBERING_DETAILS_LIMIT {
            let details: Vec<String> = report.iter().map(ToString::to_string).collect();
            text.push_str(&format!(" ({})", details.join("; ")));
        }
        Some(text)
    }

    /// Starts a rename pass, asking first when numbered files are staged.
    pub fn request_rename(&mut self) {
        if self.manager.is_empty() {
            self.set_status(StatusLevel::Warning, "No files to rename!");
            return;
        }
        if self.manager.has_numbered_files() {
            self.input_mode = InputMode::ConfirmRename;
        } else {
            self.run_rename();
        }
    }

    pub fn confirm_rename(&mut self, accepted: bool) {
        self.input_mode = InputMode::Normal;
        if accepted {
            self.run_rename();
        }
    }

    pub fn run_rename(&mut self) {
        let config = match ConfigBuilder::new()
            .start_number(self.start_number)
            .output_dir(self.output_dir.as_ref())
            .build()
        {
            Ok(config) => config,
            Err(e) => {
                self.set_status(StatusLevel::Error, e.to_string());
                return;
            }
        };

        let report = self.manager.execute(&config);
        self.sync_selection();
        self.report_outcome(&report);
    }

    fn report_outcome(&mut self, report: &RenumberReport) {
        if report.is_noop() {
            self.set_status(
                StatusLevel::Warning,
                "Nothing renamed: the staged files are no longer on disk",
            );
        } else if report.success {
            self.set_status(
                StatusLevel::Info,
                format!("Renamed {} file(s) successfully!", report.processed),
            );
        } else if report.is_partial() {
            self.set_status(
                StatusLevel::Warning,
                format!(
                    "Partially done! {} file(s) processed, then: {}",
                    report.processed,
                    report.error.as_deref().unwrap_or("unknown error")
                ),
            );
        } else {
            let reason = report.error.as_deref().unwrap_or("no files to rename");
            self.set_status(
                StatusLevel::Error,
                format!("Could not rename the files: {reason}"),
            );
        }
    }
}

/// Trims whitespace and the quotes terminals add around dropped paths.
fn clean_path_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(trimmed);
    unquoted.to_string()
}
