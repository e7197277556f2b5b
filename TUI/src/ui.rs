use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::config::KEY_HINTS;
use crate::theme::Theme;

const TITLE: &str = "LiberLens";
const MENU_ICON: &str = "[≡]";
const CHOOSE_LABEL: &str = "Choose Book";

/// Something on screen a mouse click can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    MenuIcon,
    ThemeIcon,
    ChooseButton,
    UploadButton,
    QuestionField,
    AskButton,
    DrawerItem,
}

/// Where every widget goes for the current terminal size and state.
/// Shared by drawing and mouse hit-testing so the two never disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenLayout {
    pub app_bar: Rect,
    pub menu_icon: Option<Rect>,
    pub theme_icon: Option<Rect>,
    pub status: Rect,
    pub upload_panel: Rect,
    pub choose_button: Rect,
    pub file_name: Option<Rect>,
    pub upload_button: Option<Rect>,
    pub question_panel: Rect,
    pub question_field: Rect,
    pub ask_button: Rect,
    pub answer_panel: Option<Rect>,
    pub hints: Rect,
    pub drawer: Option<Rect>,
    pub drawer_item: Option<Rect>,
}

fn button_label(text: &str, spinner: Option<&str>) -> String {
    match spinner {
        Some(s) => format!("[ {} {} ]", s, text),
        None => format!("[ {} ]", text),
    }
}

fn label_rect(x: u16, y: u16, label: &str, max_width: u16) -> Rect {
    Rect {
        x,
        y,
        width: (label.width() as u16).min(max_width),
        height: 1,
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

impl ScreenLayout {
    pub fn compute(area: Rect, app: &App) -> Self {
        let state = &app.state;
        let upload_height = if state.selected_file.is_some() { 5 } else { 3 };
        let answer_constraint = if state.has_answer() {
            Constraint::Min(3)
        } else {
            Constraint::Min(0)
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // App bar
                Constraint::Length(3),             // Status
                Constraint::Length(upload_height), // Upload panel
                Constraint::Length(6),             // Question panel
                answer_constraint,                 // Answer panel
                Constraint::Length(1),             // Key hints
            ])
            .split(area);

        let app_bar = rows[0];
        let bar_row = app_bar.y + 1;
        let (menu_icon, theme_icon) = if app.is_narrow() {
            (Some(label_rect(app_bar.x + 1, bar_row, MENU_ICON, app_bar.width)), None)
        } else {
            let icon = format!("[{}]", state.theme_mode.toggle_icon());
            let width = icon.width() as u16;
            let x = (app_bar.x + app_bar.width).saturating_sub(width + 2);
            (None, Some(label_rect(x, bar_row, &icon, app_bar.width)))
        };

        let upload_panel = rows[2];
        let upload_inner = Block::default().borders(Borders::ALL).inner(upload_panel);
        let spinner = state.is_loading.then(|| app.spinner());
        let choose_button = label_rect(
            upload_inner.x,
            upload_inner.y,
            &button_label(CHOOSE_LABEL, None),
            upload_inner.width,
        );
        let (file_name, upload_button) = match &state.selected_file {
            Some(_) => (
                Some(Rect { y: upload_inner.y + 1, height: 1, ..upload_inner }),
                Some(label_rect(
                    upload_inner.x,
                    upload_inner.y + 2,
                    &button_label("Upload", spinner),
                    upload_inner.width,
                )),
            ),
            None => (None, None),
        };

        let question_panel = rows[3];
        let question_inner = Block::default().borders(Borders::ALL).inner(question_panel);
        let question_field = Rect { height: 3, ..question_inner };
        let ask_button = label_rect(
            question_inner.x,
            question_inner.y + 3,
            &button_label("Ask", spinner),
            question_inner.width,
        );

        let answer_panel = state.has_answer().then_some(rows[4]);

        let (drawer, drawer_item) = if app.is_narrow() && state.drawer_open {
            let drawer = Rect {
                width: app.config.drawer_width.min(area.width),
                ..area
            };
            let inner = Block::default().borders(Borders::ALL).inner(drawer);
            (Some(drawer), Some(Rect { height: 1, ..inner }))
        } else {
            (None, None)
        };

        Self {
            app_bar,
            menu_icon,
            theme_icon,
            status: rows[1],
            upload_panel,
            choose_button,
            file_name,
            upload_button,
            question_panel,
            question_field,
            ask_button,
            answer_panel,
            hints: rows[5],
            drawer,
            drawer_item,
        }
    }

    /// What sits under the given cell. The drawer covers everything beneath it.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Target> {
        if let Some(drawer) = self.drawer {
            if self.drawer_item.is_some_and(|r| contains(r, column, row)) {
                return Some(Target::DrawerItem);
            }
            if contains(drawer, column, row) {
                return None;
            }
        }

        let candidates = [
            (self.menu_icon, Target::MenuIcon),
            (self.theme_icon, Target::ThemeIcon),
            (Some(self.choose_button), Target::ChooseButton),
            (self.upload_button, Target::UploadButton),
            (Some(self.question_field), Target::QuestionField),
            (Some(self.ask_button), Target::AskButton),
        ];
        candidates
            .into_iter()
            .find(|(rect, _)| rect.is_some_and(|r| contains(r, column, row)))
            .map(|(_, target)| target)
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = frame.area();
    let layout = ScreenLayout::compute(area, app);

    // Fill entire background
    let bg = Block::default().style(Style::default().bg(theme.background).fg(theme.text));
    frame.render_widget(bg, area);

    draw_app_bar(frame, app, &theme, &layout);
    draw_status(frame, app, &theme, layout.status);
    draw_upload_panel(frame, app, &theme, &layout);
    draw_question_panel(frame, app, &theme, &layout);
    if let Some(answer_area) = layout.answer_panel {
        draw_answer(frame, app, &theme, answer_area);
    }
    draw_hints(frame, app, &theme, layout.hints);

    if let Some(drawer) = layout.drawer {
        draw_drawer(frame, app, &theme, drawer);
    }
    if app.picker.is_some() {
        draw_picker(frame, app, &theme, area);
    }
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.panel))
}

fn button_style(theme: &Theme, enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(theme.app_bar_text)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted).bg(theme.border)
    }
}

fn draw_app_bar(frame: &mut Frame, app: &App, theme: &Theme, layout: &ScreenLayout) {
    let bar = Block::default().style(Style::default().bg(theme.app_bar).fg(theme.app_bar_text));
    frame.render_widget(bar, layout.app_bar);

    let bar_style = Style::default().fg(theme.app_bar_text).add_modifier(Modifier::BOLD);
    if let Some(menu) = layout.menu_icon {
        frame.render_widget(Paragraph::new(MENU_ICON).style(bar_style), menu);
    }

    let title_x = layout
        .menu_icon
        .map(|r| r.x + r.width + 1)
        .unwrap_or(layout.app_bar.x + 2);
    let title_area = Rect {
        x: title_x,
        y: layout.app_bar.y + 1,
        width: layout.app_bar.width.saturating_sub(title_x - layout.app_bar.x),
        height: 1,
    };
    frame.render_widget(Paragraph::new(TITLE).style(bar_style), title_area);

    if let Some(icon) = layout.theme_icon {
        let label = format!("[{}]", app.state.theme_mode.toggle_icon());
        frame.render_widget(Paragraph::new(label).style(bar_style), icon);
    }
}

fn draw_status(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let inner = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(1),
    };
    let status = Paragraph::new(app.state.status_message.as_str())
        .style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, inner);
}

fn draw_upload_panel(frame: &mut Frame, app: &App, theme: &Theme, layout: &ScreenLayout) {
    frame.render_widget(panel("Upload PDF", theme), layout.upload_panel);

    let choose = Paragraph::new(button_label(CHOOSE_LABEL, None)).style(button_style(theme, true));
    frame.render_widget(choose, layout.choose_button);

    if let (Some(file), Some(name_area)) = (&app.state.selected_file, layout.file_name) {
        let name = truncate(&file.name, name_area.width as usize);
        frame.render_widget(
            Paragraph::new(name).style(Style::default().fg(theme.text_secondary)),
            name_area,
        );
    }

    if let Some(button) = layout.upload_button {
        let spinner = app.state.is_loading.then(|| app.spinner());
        let upload = Paragraph::new(button_label("Upload", spinner))
            .style(button_style(theme, !app.state.is_loading));
        frame.render_widget(upload, button);
    }
}

fn draw_question_panel(frame: &mut Frame, app: &App, theme: &Theme, layout: &ScreenLayout) {
    frame.render_widget(panel("Ask a Question", theme), layout.question_panel);

    let field = Block::default()
        .title(Span::styled(" Question ", Style::default().fg(theme.text_muted)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_focus));
    let field_inner = field.inner(layout.question_field);
    frame.render_widget(field, layout.question_field);

    // Keep the tail of long questions visible
    let cursor = if app.animation_tick % 60 < 30 { "|" } else { " " };
    let visible = tail(&app.state.question, (field_inner.width as usize).saturating_sub(1));
    let input = Paragraph::new(format!("{}{}", visible, cursor)).style(Style::default().fg(theme.text));
    frame.render_widget(input, field_inner);

    let spinner = app.state.is_loading.then(|| app.spinner());
    let ask = Paragraph::new(button_label("Ask", spinner))
        .style(button_style(theme, !app.state.is_loading));
    frame.render_widget(ask, layout.ask_button);
}

fn draw_answer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let title = match app.answered_at {
        Some(at) => format!("Answer · {}", at.with_timezone(&chrono::Local).format("%H:%M")),
        None => "Answer".to_string(),
    };
    let block = panel(&title, theme);

    let lines: Vec<Line> = app
        .state
        .answer
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.text))))
        .collect();
    let answer = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll, 0));
    frame.render_widget(answer, area);
}

fn draw_hints(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut spans = Vec::new();
    let theme_hint = if app.is_narrow() {
        ("F1", "menu")
    } else {
        ("Ctrl+T", app.state.theme_mode.toggle_label())
    };
    for (key, desc) in KEY_HINTS.iter().copied().chain(std::iter::once(theme_hint)) {
        spans.push(Span::styled(format!(" {} ", key), Style::default().fg(theme.accent)));
        spans.push(Span::styled(format!("{} ", desc), Style::default().fg(theme.text_muted)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_drawer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    frame.render_widget(Clear, area);
    let block = panel(TITLE, theme).border_style(Style::default().fg(theme.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mode = app.state.theme_mode;
    let item = Line::from(vec![
        Span::styled(format!(" {} ", mode.toggle_icon()), Style::default().fg(theme.accent)),
        Span::styled(
            mode.toggle_label(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(item), Rect { height: 1, ..inner });
}

fn draw_picker(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(picker) = app.picker.as_ref() else {
        return;
    };

    let width = scaled(area.width, 4, 5).max(20).min(area.width);
    let height = scaled(area.height, 7, 10).max(6).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let block = panel(CHOOSE_LABEL, theme).border_style(Style::default().fg(theme.accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = vec![Line::from(Span::styled(
        truncate(&picker.current_dir.display().to_string(), inner.width as usize),
        Style::default().fg(theme.text_muted),
    ))];
    if let Some(err) = &picker.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(theme.error))));
    }
    if picker.entries.is_empty() {
        lines.push(Line::from(Span::styled(
            "No PDF files here",
            Style::default().fg(theme.text_muted).add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the cursor inside the visible window
    let visible = (inner.height as usize).saturating_sub(lines.len() + 1).max(1);
    let first = picker.cursor.saturating_sub(visible - 1);
    for (i, entry) in picker.entries.iter().enumerate().skip(first).take(visible) {
        let selected = i == picker.cursor;
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let style = match (selected, entry.is_dir) {
            (true, _) => Style::default().fg(theme.border_focus).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(theme.accent),
            (false, false) => Style::default().fg(theme.text),
        };
        let indicator = if selected { ">" } else { " " };
        lines.push(Line::from(Span::styled(format!("{} {}", indicator, name), style)));
    }

    frame.render_widget(Paragraph::new(lines), inner);

    let footer = Rect {
        y: inner.y + inner.height.saturating_sub(1),
        height: 1,
        ..inner
    };
    frame.render_widget(
        Paragraph::new("Enter open/select · Esc cancel")
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.text_muted)),
        footer,
    );
}

/// `value * num / den` without overflowing on huge terminals.
fn scaled(value: u16, num: u32, den: u32) -> u16 {
    (u32::from(value) * num / den) as u16
}

/// Cut `text` to at most `max` columns, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

/// The last `max` columns of `text`.
fn tail(text: &str, max: usize) -> String {
    let mut width = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max {
            break;
        }
        width += w;
        start = idx;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::action::Action;
    use crate::backend::AskResponse;
    use crate::ui_state::SelectedFile;

    fn sized_app(width: u16) -> App {
        let mut app = App::default();
        app.update(Action::Resize { width });
        app
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..height {
            for x in 0..width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_wide_layout_shows_theme_icon_not_menu() {
        let app = sized_app(100);
        let screen = render(&app, 100, 30);

        assert!(screen.contains("LiberLens"));
        assert!(screen.contains("Upload PDF"));
        assert!(screen.contains("Ask a Question"));
        assert!(!screen.contains(MENU_ICON));

        let layout = ScreenLayout::compute(Rect::new(0, 0, 100, 30), &app);
        assert!(layout.menu_icon.is_none());
        assert!(layout.theme_icon.is_some());
    }

    #[test]
    fn test_narrow_layout_shows_menu_icon() {
        let app = sized_app(60);
        let screen = render(&app, 60, 30);

        assert!(screen.contains(MENU_ICON));
        let layout = ScreenLayout::compute(Rect::new(0, 0, 60, 30), &app);
        assert!(layout.theme_icon.is_none());
        assert!(layout.drawer.is_none());
    }

    #[test]
    fn test_drawer_renders_toggle_item() {
        let mut app = sized_app(60);
        app.update(Action::SetDrawer(true));

        let screen = render(&app, 60, 30);

        assert!(screen.contains("Dark Mode"));
    }

    #[test]
    fn test_upload_button_only_with_file() {
        let mut app = sized_app(100);
        let area = Rect::new(0, 0, 100, 30);
        assert!(ScreenLayout::compute(area, &app).upload_button.is_none());
        assert!(!render(&app, 100, 30).contains("[ Upload ]"));

        app.update(Action::SelectFile(SelectedFile::new("/books/book.pdf")));

        assert!(ScreenLayout::compute(area, &app).upload_button.is_some());
        let screen = render(&app, 100, 30);
        assert!(screen.contains("[ Upload ]"));
        assert!(screen.contains("book.pdf"));
    }

    #[test]
    fn test_answer_panel_appears_after_answer() {
        let mut app = sized_app(100);
        assert!(!render(&app, 100, 30).contains("Answer"));

        app.update(Action::InputChar('?'));
        app.update(Action::Ask);
        app.update(Action::AskFinished(Ok(AskResponse {
            answer: "It covers the basics.".to_string(),
        })));

        let screen = render(&app, 100, 30);
        assert!(screen.contains("Answer"));
        assert!(screen.contains("It covers the basics."));
    }

    #[test]
    fn test_picker_overlay_renders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manual.pdf"), "%PDF").unwrap();
        let mut app = sized_app(100).with_start_dir(dir.path());
        app.update(Action::OpenPicker);

        let screen = render(&app, 100, 30);

        assert!(screen.contains("manual.pdf"));
        assert!(screen.contains("Esc cancel"));
    }

    #[test]
    fn test_hit_test_buttons() {
        let mut app = sized_app(100);
        app.update(Action::SelectFile(SelectedFile::new("/books/book.pdf")));
        let layout = ScreenLayout::compute(Rect::new(0, 0, 100, 30), &app);

        let theme = layout.theme_icon.unwrap();
        assert_eq!(layout.hit_test(theme.x, theme.y), Some(Target::ThemeIcon));
        let choose = layout.choose_button;
        assert_eq!(layout.hit_test(choose.x + 2, choose.y), Some(Target::ChooseButton));
        let upload = layout.upload_button.unwrap();
        assert_eq!(layout.hit_test(upload.x, upload.y), Some(Target::UploadButton));
        let ask = layout.ask_button;
        assert_eq!(layout.hit_test(ask.x + ask.width - 1, ask.y), Some(Target::AskButton));
        assert_eq!(layout.hit_test(99, 29), None);
    }

    #[test]
    fn test_hit_test_drawer_covers_content() {
        let mut app = sized_app(60);
        app.update(Action::SetDrawer(true));
        let layout = ScreenLayout::compute(Rect::new(0, 0, 60, 30), &app);

        let item = layout.drawer_item.unwrap();
        assert_eq!(layout.hit_test(item.x, item.y), Some(Target::DrawerItem));
        // The choose button lies beneath the drawer
        let choose = layout.choose_button;
        assert_eq!(layout.hit_test(choose.x + 1, choose.y), None);
    }

    #[test]
    fn test_truncate_and_tail() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-name.pdf", 8), "a-very-…");
        assert_eq!(tail("hello world", 5), "world");
        assert_eq!(tail("hi", 5), "hi");
    }

    #[test]
    fn test_popup_scaling_on_huge_terminal() {
        assert_eq!(scaled(u16::MAX, 4, 5), 52428);
        assert_eq!(scaled(20000, 7, 10), 14000);
        assert_eq!(scaled(100, 4, 5), 80);
    }
}
