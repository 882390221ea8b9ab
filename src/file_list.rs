//! The ordered list of files staged for numbering.

use std::path::{Path, PathBuf};

use crate::events::RejectReason;

/// One staged file: where it lives and the name it had when it was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    source_path: PathBuf,
    display_name: String,
}

impl FileEntry {
    fn new(source_path: PathBuf) -> Self {
        let display_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_path.to_string_lossy().into_owned());
        Self {
            source_path,
            display_name,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Base name captured at add time. Not refreshed if the file changes.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub rejected: Vec<(PathBuf, RejectReason)>,
}

#[derive(Debug, Default, Clone)]
pub struct FileList {
    entries: Vec<FileEntry>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every candidate that is an existing regular file not already
    /// in the list, keeping input order. Everything else is skipped and
    /// reported in the outcome.
    pub fn add<I, P>(&mut self, paths: I) -> AddOutcome
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut outcome = AddOutcome::default();

        for candidate in paths {
            let candidate = candidate.as_ref();
            match self.check_candidate(candidate) {
                Ok(path) => {
                    self.entries.push(FileEntry::new(path));
                    outcome.added += 1;
                }
                Err(reason) => outcome.rejected.push((candidate.to_path_buf(), reason)),
            }
        }

        outcome
    }

    fn check_candidate(&self, candidate: &Path) -> Result<PathBuf, RejectReason> {
        if !candidate.exists() {
            return Err(RejectReason::NotFound);
        }
        if !candidate.is_file() {
            return Err(RejectReason::NotAFile);
        }
        let path = std::path::absolute(candidate).map_err(|_| RejectReason::NotFound)?;
        if self.contains(&path) {
            return Err(RejectReason::Duplicate);
        }
        Ok(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry.source_path == path)
    }

    /// Empties the list, returning how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn remove_at(&mut self, index: usize) -> Option<FileEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Swaps `index` with its predecessor. Fails for the first entry.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index > 0 && index < self.entries.len() {
            self.entries.swap(index, index - 1);
            true
        } else {
            false
        }
    }

    /// Swaps `index` with its successor. Fails for the last entry.
    pub fn move_down(&mut self, index: usize) -> bool {
        match index.checked_add(1) {
            Some(next) if next < self.entries.len() => {
                self.entries.swap(index, next);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.display_name.clone())
            .collect()
    }
}
