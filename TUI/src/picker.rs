//! In-terminal PDF picker: directories and `.pdf` files only.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// What Enter did in the picker.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// Moved into another directory
    Entered,
    /// Chose a PDF
    Picked(PathBuf),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct FilePicker {
    pub current_dir: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub cursor: usize,
    pub error: Option<String>,
}

impl FilePicker {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        // A relative path runs out of parents at "" and strands the picker
        let start_dir = start_dir.into();
        let current_dir = std::path::absolute(&start_dir).unwrap_or(start_dir);
        let mut picker = Self {
            current_dir,
            entries: Vec::new(),
            cursor: 0,
            error: None,
        };
        picker.refresh();
        picker
    }

    /// Re-read the current directory.
    pub fn refresh(&mut self) {
        let mut entries = Vec::new();

        if let Some(parent) = self.current_dir.parent() {
            entries.push(PickerEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }

        self.error = None;
        match std::fs::read_dir(&self.current_dir) {
            Ok(read_dir) => {
                let mut dirs = Vec::new();
                let mut files = Vec::new();

                for entry in read_dir.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().to_string();
                    if name.starts_with('.') {
                        continue;
                    }

                    if path.is_dir() {
                        dirs.push(PickerEntry { name, path, is_dir: true });
                    } else if is_pdf(&path) {
                        files.push(PickerEntry { name, path, is_dir: false });
                    }
                }

                dirs.sort_by_key(|e| e.name.to_lowercase());
                files.sort_by_key(|e| e.name.to_lowercase());
                entries.extend(dirs);
                entries.extend(files);
            }
            Err(e) => {
                tracing::warn!(dir = %self.current_dir.display(), error = %e, "cannot list directory");
                self.error = Some(e.to_string());
            }
        }

        self.entries = entries;
        self.cursor = 0;
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.entries.get(self.cursor)
    }

    pub fn enter(&mut self) -> PickOutcome {
        let Some(entry) = self.selected().cloned() else {
            return PickOutcome::Nothing;
        };
        if entry.is_dir {
            self.current_dir = entry.path;
            self.refresh();
            PickOutcome::Entered
        } else {
            PickOutcome::Picked(entry.path)
        }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
