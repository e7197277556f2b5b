//! Translate terminal events into actions.

use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::action::Action;
use crate::app::App;
use crate::ui::{ScreenLayout, Target};

pub fn map_key(app: &App, key: KeyEvent) -> Vec<Action> {
    if key.kind != KeyEventKind::Press {
        return vec![];
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    if app.picker.is_some() {
        return match key.code {
            KeyCode::Esc => vec![Action::ClosePicker],
            KeyCode::Up => vec![Action::PickerUp],
            KeyCode::Down => vec![Action::PickerDown],
            KeyCode::Enter => vec![Action::PickerEnter],
            _ => vec![],
        };
    }

    if app.state.drawer_open {
        return match key.code {
            // Focus navigation never dismisses the drawer
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Modifier(_) => vec![],
            KeyCode::Enter | KeyCode::Char(' ') => {
                vec![Action::ToggleTheme, Action::SetDrawer(false)]
            }
            _ => vec![Action::SetDrawer(false)],
        };
    }

    match key.code {
        KeyCode::Esc => {
            if app.state.question.is_empty() {
                vec![Action::Quit]
            } else {
                vec![Action::ClearQuestion]
            }
        }
        KeyCode::Enter => vec![Action::Ask],
        KeyCode::Backspace => vec![Action::Backspace],
        KeyCode::PageUp => vec![Action::ScrollUp],
        KeyCode::PageDown => vec![Action::ScrollDown],
        KeyCode::F(1) if app.is_narrow() => vec![Action::SetDrawer(true)],
        KeyCode::F(3) => vec![Action::OpenPicker],
        KeyCode::F(4) => vec![Action::Upload],
        KeyCode::Char('o') if ctrl => vec![Action::OpenPicker],
        KeyCode::Char('u') if ctrl => vec![Action::Upload],
        KeyCode::Char('l') if ctrl => vec![Action::ClearQuestion],
        KeyCode::Char('t') if ctrl && !app.is_narrow() => vec![Action::ToggleTheme],
        KeyCode::Char('v') if ctrl => clipboard_text().map(Action::Paste).into_iter().collect(),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            vec![Action::InputChar(c)]
        }
        _ => vec![],
    }
}

/// A bracketed paste follows the same rules as typing.
pub fn map_paste(app: &App, text: String) -> Vec<Action> {
    if app.picker.is_some() {
        vec![]
    } else if app.state.drawer_open {
        vec![Action::SetDrawer(false)]
    } else {
        vec![Action::Paste(text)]
    }
}

pub fn map_mouse(app: &App, layout: &ScreenLayout, mouse: MouseEvent) -> Vec<Action> {
    if app.picker.is_some() {
        return vec![];
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let target = layout.hit_test(mouse.column, mouse.row);
            if app.state.drawer_open {
                // Any click dismisses the drawer; the item also toggles the theme
                return match target {
                    Some(Target::DrawerItem) => vec![Action::ToggleTheme, Action::SetDrawer(false)],
                    _ => vec![Action::SetDrawer(false)],
                };
            }
            match target {
                Some(Target::MenuIcon) => vec![Action::SetDrawer(true)],
                Some(Target::ThemeIcon) => vec![Action::ToggleTheme],
                Some(Target::ChooseButton) => vec![Action::OpenPicker],
                Some(Target::UploadButton) => vec![Action::Upload],
                Some(Target::AskButton) => vec![Action::Ask],
                Some(Target::QuestionField) | Some(Target::DrawerItem) | None => vec![],
            }
        }
        MouseEventKind::ScrollUp if layout.answer_panel.is_some() => vec![Action::ScrollUp],
        MouseEventKind::ScrollDown if layout.answer_panel.is_some() => vec![Action::ScrollDown],
        _ => vec![],
    }
}

fn clipboard_text() -> Option<String> {
    match Clipboard::new().and_then(|mut c| c.get_text()) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(error = %e, "clipboard unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    use super::*;
    use crate::ui_state::SelectedFile;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn narrow_with_drawer() -> App {
        let mut app = App::default();
        app.update(Action::Resize { width: 60 });
        app.update(Action::SetDrawer(true));
        assert!(app.state.drawer_open);
        app
    }

    #[test]
    fn test_typing_builds_question() {
        let app = App::default();
        assert_eq!(map_key(&app, key(KeyCode::Char('W'))), vec![Action::InputChar('W')]);
        assert_eq!(map_key(&app, key(KeyCode::Enter)), vec![Action::Ask]);
        assert_eq!(map_key(&app, ctrl('u')), vec![Action::Upload]);
        assert_eq!(map_key(&app, ctrl('o')), vec![Action::OpenPicker]);
    }

    #[test]
    fn test_key_release_ignored() {
        let app = App::default();
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        release.state = KeyEventState::NONE;
        assert!(map_key(&app, release).is_empty());
    }

    #[test]
    fn test_esc_clears_then_quits() {
        let mut app = App::default();
        assert_eq!(map_key(&app, key(KeyCode::Esc)), vec![Action::Quit]);
        app.update(Action::InputChar('x'));
        assert_eq!(map_key(&app, key(KeyCode::Esc)), vec![Action::ClearQuestion]);
    }

    #[test]
    fn test_theme_shortcut_depends_on_layout() {
        let mut app = App::default();
        app.update(Action::Resize { width: 120 });
        assert_eq!(map_key(&app, ctrl('t')), vec![Action::ToggleTheme]);
        assert!(map_key(&app, key(KeyCode::F(1))).is_empty());

        app.update(Action::Resize { width: 60 });
        assert!(map_key(&app, ctrl('t')).is_empty());
        assert_eq!(map_key(&app, key(KeyCode::F(1))), vec![Action::SetDrawer(true)]);
    }

    #[test]
    fn test_tab_and_shift_keep_drawer_open() {
        let app = narrow_with_drawer();
        assert!(map_key(&app, key(KeyCode::Tab)).is_empty());
        assert!(map_key(&app, KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)).is_empty());
        assert!(map_key(
            &app,
            key(KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftShift))
        )
        .is_empty());
    }

    #[test]
    fn test_other_keys_close_drawer() {
        let app = narrow_with_drawer();
        assert_eq!(map_key(&app, key(KeyCode::Esc)), vec![Action::SetDrawer(false)]);
        assert_eq!(map_key(&app, key(KeyCode::Char('x'))), vec![Action::SetDrawer(false)]);
        assert_eq!(
            map_key(&app, key(KeyCode::Enter)),
            vec![Action::ToggleTheme, Action::SetDrawer(false)]
        );
    }

    #[test]
    fn test_picker_captures_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::default().with_start_dir(dir.path());
        app.update(Action::OpenPicker);

        assert_eq!(map_key(&app, key(KeyCode::Down)), vec![Action::PickerDown]);
        assert_eq!(map_key(&app, key(KeyCode::Enter)), vec![Action::PickerEnter]);
        assert_eq!(map_key(&app, key(KeyCode::Esc)), vec![Action::ClosePicker]);
        assert!(map_key(&app, key(KeyCode::Char('q'))).is_empty());
    }

    #[test]
    fn test_click_drawer_item_toggles_and_closes() {
        let app = narrow_with_drawer();
        let layout = ScreenLayout::compute(Rect::new(0, 0, 60, 30), &app);
        let item = layout.drawer_item.unwrap();

        assert_eq!(
            map_mouse(&app, &layout, click(item.x + 2, item.y)),
            vec![Action::ToggleTheme, Action::SetDrawer(false)]
        );
        assert_eq!(map_mouse(&app, &layout, click(55, 20)), vec![Action::SetDrawer(false)]);
    }

    #[test]
    fn test_click_buttons() {
        let mut app = App::default();
        app.update(Action::Resize { width: 100 });
        app.update(Action::SelectFile(SelectedFile::new("/books/book.pdf")));
        let layout = ScreenLayout::compute(Rect::new(0, 0, 100, 30), &app);

        let upload = layout.upload_button.unwrap();
        assert_eq!(map_mouse(&app, &layout, click(upload.x, upload.y)), vec![Action::Upload]);
        let theme = layout.theme_icon.unwrap();
        assert_eq!(map_mouse(&app, &layout, click(theme.x, theme.y)), vec![Action::ToggleTheme]);
        let field = layout.question_field;
        assert!(map_mouse(&app, &layout, click(field.x + 1, field.y + 1)).is_empty());
    }

    #[test]
    fn test_click_menu_icon_opens_drawer() {
        let mut app = App::default();
        app.update(Action::Resize { width: 60 });
        let layout = ScreenLayout::compute(Rect::new(0, 0, 60, 30), &app);
        let menu = layout.menu_icon.unwrap();

        assert_eq!(map_mouse(&app, &layout, click(menu.x, menu.y)), vec![Action::SetDrawer(true)]);
    }

    #[test]
    fn test_paste_closes_drawer_instead_of_typing() {
        let app = narrow_with_drawer();
        assert_eq!(map_paste(&app, "hello".to_string()), vec![Action::SetDrawer(false)]);

        let app = App::default();
        assert_eq!(
            map_paste(&app, "hello".to_string()),
            vec![Action::Paste("hello".to_string())]
        );
    }
}
