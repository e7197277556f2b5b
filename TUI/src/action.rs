use crate::backend::{AskResponse, BackendError, UploadResponse};
use crate::ui_state::SelectedFile;

/// Every state transition the application knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the selected book
    SelectFile(SelectedFile),
    /// Send the selected book to the service
    Upload,
    /// Send the current question to the service
    Ask,
    ToggleTheme,
    /// Open or close the navigation drawer
    SetDrawer(bool),
    /// Append a character to the question
    InputChar(char),
    Backspace,
    /// Append pasted text to the question
    Paste(String),
    ClearQuestion,
    /// Scroll the answer panel
    ScrollUp,
    ScrollDown,
    /// Terminal was resized
    Resize { width: u16 },
    OpenPicker,
    ClosePicker,
    PickerUp,
    PickerDown,
    PickerEnter,
    /// An upload request settled
    UploadFinished {
        file: SelectedFile,
        result: Result<UploadResponse, BackendError>,
    },
    /// An ask request settled
    AskFinished(Result<AskResponse, BackendError>),
    Quit,
}

/// Network work requested by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Upload(SelectedFile),
    Ask(String),
}
