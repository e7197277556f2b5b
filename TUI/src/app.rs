use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::action::{Action, Effect};
use crate::config::Config;
use crate::picker::{FilePicker, PickOutcome};
use crate::theme::{theme_for, Theme, ThemeMode};
use crate::ui_state::{LayoutMode, SelectedFile, ViewState};

pub const SELECT_FILE_FIRST: &str = "Please select a file first.";
pub const ENTER_QUESTION: &str = "Please enter a question.";
pub const FILE_SELECTED: &str = "Book selected. Click Upload to process and Chat🤖.";
pub const UPLOAD_FAILED: &str = "Error uploading file. Please try again.";
pub const ASK_FAILED: &str = "Sorry, I couldn't get an answer at this time. Please try again later.";

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn upload_succeeded(file: &SelectedFile) -> String {
    format!(
        "{} book uploaded and processed successfully. You can chat with the book now 📖😁",
        file.display_name()
    )
}

pub struct App {
    pub config: Config,
    pub state: ViewState,
    pub layout: LayoutMode,
    pub picker: Option<FilePicker>,
    pub answered_at: Option<DateTime<Utc>>,
    pub answer_scroll: u16,
    pub animation_tick: u64,
    pub should_quit: bool,
    start_dir: PathBuf,
}

impl App {
    pub fn new(config: Config, theme_mode: ThemeMode) -> Self {
        let start_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            config,
            state: ViewState::new(theme_mode),
            layout: LayoutMode::default(),
            picker: None,
            answered_at: None,
            answer_scroll: 0,
            animation_tick: 0,
            should_quit: false,
            start_dir,
        }
    }

    /// Directory the file picker opens in.
    pub fn with_start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = dir.into();
        self
    }

    pub fn theme(&self) -> Theme {
        theme_for(self.state.theme_mode)
    }

    pub fn is_narrow(&self) -> bool {
        self.layout == LayoutMode::Narrow
    }

    pub fn tick(&mut self) {
        self.animation_tick = self.animation_tick.wrapping_add(1);
    }

    pub fn spinner(&self) -> &'static str {
        let per_frame = self.config.spinner_ticks_per_frame.max(1);
        SPINNER[((self.animation_tick / per_frame) % SPINNER.len() as u64) as usize]
    }

    /// Apply an action to the view state. Returns the network call to make, if any.
    pub fn update(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::SelectFile(file) => {
                info!(file = %file.path.display(), "book selected");
                self.state.selected_file = Some(file);
                self.state.status_message = FILE_SELECTED.to_string();
                None
            }
            Action::Upload => self.start_upload(),
            Action::Ask => self.start_ask(),
            Action::ToggleTheme => {
                self.state.theme_mode = self.state.theme_mode.toggled();
                None
            }
            Action::SetDrawer(open) => {
                // The drawer only exists in the narrow layout
                self.state.drawer_open = open && self.is_narrow();
                None
            }
            Action::InputChar(c) => {
                self.state.question.push(c);
                None
            }
            Action::Backspace => {
                self.state.question.pop();
                None
            }
            Action::Paste(text) => {
                let flattened: String = text
                    .chars()
                    .filter(|c| *c != '\r')
                    .map(|c| if c == '\n' { ' ' } else { c })
                    .collect();
                self.state.question.push_str(&flattened);
                None
            }
            Action::ClearQuestion => {
                self.state.question.clear();
                None
            }
            Action::ScrollUp => {
                self.answer_scroll = self.answer_scroll.saturating_sub(self.config.scroll_step);
                None
            }
            Action::ScrollDown => {
                self.answer_scroll = self.answer_scroll.saturating_add(self.config.scroll_step);
                None
            }
            Action::Resize { width } => {
                self.layout = LayoutMode::for_width(width, self.config.narrow_max_width);
                if !self.is_narrow() {
                    self.state.drawer_open = false;
                }
                None
            }
            Action::OpenPicker => {
                self.picker = Some(FilePicker::new(self.start_dir.clone()));
                None
            }
            Action::ClosePicker => {
                self.close_picker();
                None
            }
            Action::PickerUp => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.up();
                }
                None
            }
            Action::PickerDown => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.down();
                }
                None
            }
            Action::PickerEnter => {
                let outcome = self.picker.as_mut().map(|p| p.enter());
                match outcome {
                    Some(PickOutcome::Picked(path)) => {
                        self.close_picker();
                        self.update(Action::SelectFile(SelectedFile::new(path)))
                    }
                    _ => None,
                }
            }
            Action::UploadFinished { file, result } => {
                match result {
                    Ok(response) => {
                        info!(
                            file = %file.name,
                            server_message = response.message.as_deref().unwrap_or(""),
                            server_status = response.status.as_deref().unwrap_or(""),
                            "upload finished"
                        );
                        self.state.status_message = upload_succeeded(&file);
                    }
                    Err(e) => {
                        error!(file = %file.name, error = %e, "upload failed");
                        self.state.status_message =
                            e.server_message().unwrap_or(UPLOAD_FAILED).to_string();
                    }
                }
                self.state.is_loading = false;
                None
            }
            Action::AskFinished(result) => {
                match result {
                    Ok(response) => {
                        info!(chars = response.answer.chars().count(), "answer received");
                        self.state.answer = response.answer;
                    }
                    Err(e) => {
                        error!(error = %e, "ask failed");
                        self.state.answer = ASK_FAILED.to_string();
                    }
                }
                self.answered_at = Some(Utc::now());
                self.answer_scroll = 0;
                self.state.is_loading = false;
                None
            }
            Action::Quit => {
                self.should_quit = true;
                None
            }
        }
    }

    fn start_upload(&mut self) -> Option<Effect> {
        if self.state.is_loading {
            debug!("upload ignored while a request is in flight");
            return None;
        }
        let Some(file) = self.state.selected_file.clone() else {
            self.state.status_message = SELECT_FILE_FIRST.to_string();
            return None;
        };
        self.state.is_loading = true;
        Some(Effect::Upload(file))
    }

    fn start_ask(&mut self) -> Option<Effect> {
        if self.state.is_loading {
            debug!("ask ignored while a request is in flight");
            return None;
        }
        if self.state.question.trim().is_empty() {
            self.state.status_message = ENTER_QUESTION.to_string();
            return None;
        }
        self.state.is_loading = true;
        Some(Effect::Ask(self.state.question.clone()))
    }

    fn close_picker(&mut self) {
        if let Some(picker) = self.picker.take() {
            self.start_dir = picker.current_dir;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default(), ThemeMode::default())
    }
}
