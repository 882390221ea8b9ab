use std::ffi::{OsStr, OsString};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{ConfigError, RenameError};
use crate::events::{RenameEvent, RenameObserver, TracingObserver};
use crate::file_list::{FileEntry, FileList};
use crate::numbering::{self, NumberedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberConfig {
    pub start_number: i64,
    /// Copy into this directory instead of renaming in place.
    pub output_dir: Option<PathBuf>,
}

impl Default for RenumberConfig {
    fn default() -> Self {
        Self {
            start_number: AppConfig::DEFAULT_START_NUMBER,
            output_dir: None,
        }
    }
}

pub struct ConfigBuilder {
    start_number: Option<i64>,
    output_dir: Option<PathBuf>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            start_number: None,
            output_dir: None,
        }
    }

    pub fn start_number(mut self, start: i64) -> Self {
        self.start_number = Some(start);
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        self.output_dir = dir.map(|d| d.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<RenumberConfig, ConfigError> {
        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::OutputNotDirectory(dir.clone()));
            }
        }

        Ok(RenumberConfig {
            start_number: self.start_number.unwrap_or(AppConfig::DEFAULT_START_NUMBER),
            output_dir: self.output_dir,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedFile {
    pub number: i64,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of a rename pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenumberReport {
    /// False when the pass aborted on an error or the list was empty.
    pub success: bool,
    /// Files renamed or copied before the pass ended.
    pub processed: usize,
    pub renamed: Vec<RenamedFile>,
    /// Sources that no longer existed when their turn came.
    pub skipped: Vec<PathBuf>,
    pub error: Option<String>,
}

impl RenumberReport {
    /// The pass ran cleanly but every source had vanished.
    pub fn is_noop(&self) -> bool {
        self.success && self.processed == 0
    }

    /// Some files were processed before an error stopped the pass.
    pub fn is_partial(&self) -> bool {
        !self.success && self.processed > 0
    }
}

/// Owns the staged file list and performs the numbering pass.
pub struct FileManager {
    files: FileList,
    observers: Vec<Box<dyn RenameObserver>>,
}

impl FileManager {
    /// A manager that reports to `tracing`.
    pub fn new() -> Self {
        let mut manager = Self::without_observers();
        manager.subscribe(Box::new(TracingObserver));
        manager
    }

    pub fn without_observers() -> Self {
        Self {
            files: FileList::new(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn RenameObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: RenameEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    /// Adds every existing regular file not already staged; returns how
    /// many were accepted.
    pub fn add_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: Vec<P> = paths.into_iter().collect();
        let requested = paths.len();
        let outcome = self.files.add(paths);

        for (path, reason) in outcome.rejected {
            self.emit(RenameEvent::CandidateRejected { path, reason });
        }
        self.emit(RenameEvent::FilesAdded {
            requested,
            added: outcome.added,
        });

        outcome.added
    }

    pub fn clear(&mut self) {
        let count = self.files.clear();
        self.emit(RenameEvent::ListCleared { count });
    }

    pub fn remove_at(&mut self, index: usize) -> bool {
        match self.files.remove_at(index) {
            Some(entry) => {
                self.emit(RenameEvent::EntryRemoved {
                    index,
                    name: entry.display_name().to_string(),
                });
                true
            }
            None => false,
        }
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if !self.files.move_up(index) {
            return false;
        }
        self.emit_moved(index, index - 1);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if !self.files.move_down(index) {
            return false;
        }
        self.emit_moved(index, index + 1);
        true
    }

    fn emit_moved(&mut self, from: usize, to: usize) {
        let name = self
            .files
            .get(to)
            .map(|entry| entry.display_name().to_string())
            .unwrap_or_default();
        self.emit(RenameEvent::EntryMoved { from, to, name });
    }

    pub fn count(&self) -> usize {
        self.files.count()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        self.files.entries()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.files.display_names()
    }

    /// Staged files whose display name already carries a number, with the
    /// name they will be numbered from.
    pub fn numbered_files_report(&self) -> Vec<NumberedFile> {
        self.files
            .entries()
            .iter()
            .filter_map(|entry| numbering::classify(entry.display_name()))
            .collect()
    }

    pub fn has_numbered_files(&self) -> bool {
        self.files
            .entries()
            .iter()
            .any(|entry| numbering::is_numbered(entry.display_name()))
    }

    /// Names a pass starting at `start_number` would aim for, before
    /// collision handling and ignoring files that have since vanished.
    /// Entries past `i64::MAX` get a `?` in place of the number.
    pub fn preview_names(&self, start_number: i64) -> Vec<String> {
        let mut next_number = Some(start_number);
        self.files
            .entries()
            .iter()
            .map(|entry| {
                let clean = numbering::strip_numbering(entry.display_name());
                match next_number {
                    Some(number) => {
                        next_number = number.checked_add(1);
                        format!("{number}. {clean}")
                    }
                    None => format!("?. {clean}"),
                }
            })
            .collect()
    }

    pub fn execute(&mut self, config: &RenumberConfig) -> RenumberReport {
        self.execute_renumbering(config.start_number, config.output_dir.as_deref())
    }

    /// Numbers every staged file in order, starting at `start_number`.
    ///
    /// With `output_dir` the files are copied there; otherwise they are
    /// renamed next to the original. Vanished sources are skipped without
    /// consuming a number. The first error stops the pass; files already
    /// handled keep their new names. The list is cleared once at least one
    /// file was processed.
    pub fn execute_renumbering(
        &mut self,
        start_number: i64,
        output_dir: Option<&Path>,
    ) -> RenumberReport {
        let mut report = RenumberReport::default();
        if self.files.is_empty() {
            return report;
        }

        let entries = self.files.entries().to_vec();
        // `None` once the previous file used `i64::MAX`.
        let mut next_number = Some(start_number);
        let mut last_number = start_number;

        for entry in &entries {
            let source = entry.source_path();
            if !source.is_file() {
                report.skipped.push(source.to_path_buf());
                self.emit(RenameEvent::SourceVanished {
                    path: source.to_path_buf(),
                });
                continue;
            }

            let outcome = match next_number {
                Some(number) => self
                    .renumber_one(source, number, output_dir)
                    .map(|target| (number, target)),
                None => Err(RenameError::NumbersExhausted {
                    path: source.to_path_buf(),
                    last: last_number,
                }),
            };

            match outcome {
                Ok((number, target)) => {
                    let event = if output_dir.is_some() {
                        RenameEvent::FileCopied {
                            number,
                            from: source.to_path_buf(),
                            to: target.clone(),
                        }
                    } else {
                        RenameEvent::FileRenamed {
                            number,
                            from: source.to_path_buf(),
                            to: target.clone(),
                        }
                    };
                    self.emit(event);
                    report.renamed.push(RenamedFile {
                        number,
                        from: source.to_path_buf(),
                        to: target,
                    });
                    report.processed += 1;
                    last_number = number;
                    next_number = number.checked_add(1);
                }
                Err(e) => {
                    let error = e.to_string();
                    self.emit(RenameEvent::PassFailed {
                        processed: report.processed,
                        error: error.clone(),
                    });
                    report.error = Some(error);
                    return report;
                }
            }
        }

        report.success = true;
        self.emit(RenameEvent::PassCompleted {
            processed: report.processed,
            skipped: report.skipped.len(),
        });
        if report.processed > 0 {
            self.clear();
        }

        report
    }

    fn renumber_one(
        &mut self,
        source: &Path,
        number: i64,
        output_dir: Option<&Path>,
    ) -> Result<PathBuf, RenameError> {
        let file_name = source.file_name().ok_or_else(|| RenameError::NoFileName {
            path: source.to_path_buf(),
        })?;
        let clean_name = self.clean_name(file_name);

        let mut candidate = OsString::from(format!("{number}. "));
        candidate.push(&clean_name);

        match output_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|source| RenameError::CreateOutputDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
                let target = unique_destination(&dir.join(&candidate));
                copy_preserving_metadata(source, &target).map_err(|e| RenameError::Copy {
                    from: source.to_path_buf(),
                    to: target.clone(),
                    source: e,
                })?;
                Ok(target)
            }
            None => {
                let parent = source.parent().ok_or_else(|| RenameError::NoParent {
                    path: source.to_path_buf(),
                })?;
                let target = unique_destination(&parent.join(&candidate));
                fs::rename(source, &target).map_err(|e| RenameError::Rename {
                    from: source.to_path_buf(),
                    to: target.clone(),
                    source: e,
                })?;
                Ok(target)
            }
        }
    }

    /// Strips one numbering prefix from the current on-disk name.
    fn clean_name(&mut self, file_name: &OsStr) -> OsString {
        // Names that are not valid UTF-8 cannot match any pattern.
        let Some(name) = file_name.to_str() else {
            return file_name.to_os_string();
        };
        match numbering::classify(name) {
            Some(row) => {
                let stripped = OsString::from(&row.stripped);
                self.emit(RenameEvent::NumberingStripped {
                    original: row.original,
                    stripped: row.stripped,
                    pattern: row.pattern,
                });
                stripped
            }
            None => file_name.to_os_string(),
        }
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything at `path` counts as taken, including a dangling symlink.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Returns `path` if it is free, otherwise the first `stem_N.ext` sibling
/// (N = 1, 2, ...) that does not exist yet.
pub fn unique_destination(path: &Path) -> PathBuf {
    if !is_taken(path) {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| OsString::from("file"));
    let extension = path.extension();

    let mut counter: u64 = 1;
    loop {
        let mut name = stem.clone();
        name.push(format!("_{counter}"));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = parent.join(name);
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Copies contents and permissions, then carries over access and
/// modification times.
pub fn copy_preserving_metadata(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::metadata(from)?;
    fs::copy(from, to)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    // A read-only copy can still have its times set through a read handle
    // on Unix.
    let file = File::options()
        .write(true)
        .open(to)
        .or_else(|_| File::open(to))?;
    file.set_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_destination() {
        let dir = tempfile::tempdir().unwrap();
        let wanted = dir.path().join("report.txt");
        assert_eq!(unique_destination(&wanted), wanted);

        fs::write(&wanted, "x").unwrap();
        assert_eq!(unique_destination(&wanted), dir.path().join("report_1.txt"));

        fs::write(dir.path().join("report_1.txt"), "x").unwrap();
        assert_eq!(unique_destination(&wanted), dir.path().join("report_2.txt"));
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let wanted = dir.path().join("1. README");
        fs::write(&wanted, "x").unwrap();
        assert_eq!(unique_destination(&wanted), dir.path().join("1. README_1"));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config, RenumberConfig::default());
        assert_eq!(config.start_number, 1);

        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new()
            .start_number(-2)
            .output_dir(Some(dir.path().join("out")))
            .build()
            .unwrap();
        assert_eq!(config.start_number, -2);
        assert_eq!(config.output_dir, Some(dir.path().join("out")));

        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = ConfigBuilder::new().output_dir(Some(&file)).build();
        assert!(matches!(err, Err(ConfigError::OutputNotDirectory(_))));
    }

    #[test]
    fn test_preview_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("04_a.mp3");
        let b = dir.path().join("b.mp3");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let mut manager = FileManager::without_observers();
        manager.add_files([&a, &b]);
        assert_eq!(manager.preview_names(9), vec!["9. a.mp3", "10. b.mp3"]);
        assert!(manager.has_numbered_files());
    }

    #[test]
    fn test_preview_names_past_the_last_number() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = ["a.txt", "2. b.txt", "c.txt"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, name).unwrap();
                path
            })
            .collect();

        let mut manager = FileManager::without_observers();
        manager.add_files(&paths);
        assert_eq!(
            manager.preview_names(i64::MAX),
            vec![format!("{}. a.txt", i64::MAX), "?. b.txt".to_string(), "?. c.txt".to_string()]
        );
        assert_eq!(manager.preview_names(i64::MAX - 1)[1], format!("{}. b.txt", i64::MAX));
    }

    #[cfg(unix)]
    #[test]
    fn test_unique_destination_skips_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let wanted = dir.path().join("1. a.txt");
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), &wanted).unwrap();
        assert!(!wanted.exists());

        assert_eq!(unique_destination(&wanted), dir.path().join("1. a_1.txt"));
    }

    #[test]
    fn test_empty_list_reports_failure() {
        let mut manager = FileManager::without_observers();
        let report = manager.execute_renumbering(1, None);
        assert!(!report.success);
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn test_copy_keeps_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("b.txt");
        fs::write(&from, "data").unwrap();
        copy_preserving_metadata(&from, &to).unwrap();

        let original = fs::metadata(&from).unwrap().modified().unwrap();
        let copied = fs::metadata(&to).unwrap().modified().unwrap();
        assert_eq!(original, copied);
        assert_eq!(fs::read_to_string(&to).unwrap(), "data");
    }
}
