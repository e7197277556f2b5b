use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::theme::ThemeMode;

pub const INITIAL_STATUS: &str = "Upload a Book to start...";

/// The PDF chosen in the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with a trailing `.pdf` removed.
    pub fn display_name(&self) -> &str {
        self.name.strip_suffix(".pdf").unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    Narrow,
    #[default]
    Wide,
}

impl LayoutMode {
    pub fn for_width(width: u16, narrow_max_width: u16) -> Self {
        if width <= narrow_max_width {
            LayoutMode::Narrow
        } else {
            LayoutMode::Wide
        }
    }
}

/// Everything the screen renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub selected_file: Option<SelectedFile>,
    pub question: String,
    pub answer: String,
    pub status_message: String,
    pub is_loading: bool,
    pub theme_mode: ThemeMode,
    pub drawer_open: bool,
}

impl ViewState {
    pub fn new(theme_mode: ThemeMode) -> Self {
        Self {
            selected_file: None,
            question: String::new(),
            answer: String::new(),
            status_message: INITIAL_STATUS.to_string(),
            is_loading: false,
            theme_mode,
            drawer_open: false,
        }
    }

    /// The answer panel is only shown once something has been answered.
    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_pdf_suffix() {
        let file = SelectedFile::new("/books/book.pdf");
        assert_eq!(file.name, "book.pdf");
        assert_eq!(file.display_name(), "book");
    }

    #[test]
    fn test_display_name_only_strips_trailing_suffix() {
        assert_eq!(SelectedFile::new("my.pdf.notes.pdf").display_name(), "my.pdf.notes");
        assert_eq!(SelectedFile::new("scan.PDF").display_name(), "scan.PDF");
        assert_eq!(SelectedFile::new("readme.txt").display_name(), "readme.txt");
    }

    #[test]
    fn test_layout_breakpoint_is_inclusive() {
        assert_eq!(LayoutMode::for_width(79, 79), LayoutMode::Narrow);
        assert_eq!(LayoutMode::for_width(80, 79), LayoutMode::Wide);
    }

    #[test]
    fn test_view_state_snapshot_serializes() {
        let mut state = ViewState::new(ThemeMode::Dark);
        state.selected_file = Some(SelectedFile::new("book.pdf"));
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["status_message"], INITIAL_STATUS);
        assert_eq!(json["theme_mode"], "dark");
        assert_eq!(json["selected_file"]["name"], "book.pdf");

        let back: ViewState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
